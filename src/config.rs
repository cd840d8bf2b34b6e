//! Process configuration, loaded once from `kore.cfg` at the server root.
//!
//! The file is UTF-8 with LF or CRLF line endings. Lines starting with `#`
//! are comments; everything else is `key=value`, split at the first `=` with
//! both sides trimmed.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::mime::MimeTable;

pub const CONFIG_FILE: &str = "kore.cfg";

#[derive(Debug, Clone)]
pub struct Config {
    /// Short hostname: the label before the first dot of `fqdn`.
    pub host: String,
    /// Fully qualified hostname, also the default virtual host.
    pub fqdn: String,
    /// Shared secret for Titan uploads; `None` disables the token check.
    pub titan_token: Option<String>,
    /// Opaque token handed to the dynamic-DNS collaborator.
    pub ddns_token: Option<String>,
    /// TZ string for localtime conversions.
    pub timezone: String,
    pub mdns_enabled: bool,
    /// Ordered `(ssid, password)` pairs for the WiFi association service.
    pub wifi_aps: Vec<(String, String)>,
    /// Configured MIME entries, ahead of the built-in defaults.
    pub mime: MimeTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            fqdn: "localhost".to_string(),
            titan_token: None,
            ddns_token: None,
            timezone: String::new(),
            mdns_enabled: true,
            wifi_aps: Vec::new(),
            mime: MimeTable::new().with_defaults(),
        }
    }
}

impl Config {
    /// Load `<root>/kore.cfg`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Self {
        let path = root.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                warn!("no {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut host = "localhost".to_string();
        let mut fqdn = "localhost".to_string();
        let mut titan_token = None;
        let mut ddns_token = None;
        let mut timezone = String::new();
        let mut mdns_enabled = true;
        let mut wifi_aps = Vec::new();
        let mut mime = MimeTable::new();

        for raw in text.lines() {
            let line = raw.trim_end_matches('\r').trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("config line without '=': {:?}", line);
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "hostname" => {
                    fqdn = value.to_string();
                    host = value.split('.').next().unwrap_or(value).to_string();
                }
                "titan" => titan_token = Some(value.to_string()),
                "ddns" => ddns_token = Some(value.to_string()),
                "tz" => timezone = value.to_string(),
                "wifi" => {
                    if let Some((ssid, pass)) = value.split_once(',') {
                        wifi_aps.push((ssid.trim().to_string(), pass.trim().to_string()));
                    } else {
                        warn!("wifi entry without password: {:?}", value);
                    }
                }
                "mime" => {
                    let mut parts = value.splitn(3, ',');
                    match (parts.next(), parts.next(), parts.next()) {
                        (Some(ext), Some(gopher), Some(mime_type)) => {
                            let gopher = gopher.trim().chars().next().unwrap_or('9');
                            mime.push(ext.trim(), gopher, mime_type.trim());
                        }
                        _ => warn!("malformed mime entry: {:?}", value),
                    }
                }
                "mdns" => {
                    mdns_enabled = !matches!(value.chars().next(), Some('n') | Some('N') | Some('0'));
                }
                other => warn!("unknown config key {:?}", other),
            }
        }

        Self {
            host,
            fqdn,
            titan_token,
            ddns_token,
            timezone,
            mdns_enabled,
            wifi_aps,
            mime: mime.with_defaults(),
        }
    }
}

/// Server root directory: `KORE_ROOT`, defaulting to the current directory.
pub fn server_root() -> PathBuf {
    std::env::var("KORE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
