//! Virtual-host resolution and the path-safety filter.
//!
//! Maps a request `(host, path)` onto a filesystem location under a per-host
//! document root. Traversal sequences are rejected before any filesystem
//! access.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A request path mapped onto the filesystem.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The virtual host that won: the requested one if its directory exists,
    /// otherwise the fqdn.
    pub vhost: String,
    /// `<root>/<vhost>` — the safe root generators climb back to.
    pub vhost_root: PathBuf,
    /// Full target path, with the default index appended for directories.
    pub fs_path: PathBuf,
    /// The directory itself when the request hit one.
    pub dir_path: Option<PathBuf>,
    /// Whether `fs_path` exists as a regular file.
    pub file_exists: bool,
    /// Final path component of `fs_path`.
    pub basename: String,
    /// Extension of `basename`, without the dot. Empty if none.
    pub ext: String,
}

/// Outcome of resolution: either a filesystem target or a mandatory redirect.
#[derive(Debug, Clone)]
pub enum Resolved {
    Path(Resolution),
    /// Directory requested without a trailing slash; redirect target carries
    /// the slash. No body may be produced.
    Moved(String),
}

/// True if the path carries a traversal or empty-segment sequence.
pub fn is_unsafe(path: &str) -> bool {
    path.contains("..") || path.contains("/./") || path.contains("//")
}

/// Resolve a request path against the document tree at `root`.
///
/// `host_label` is the short hostname; a request host of `<host_label>.local`
/// is treated as `<host_label>`. A requested vhost whose directory does not
/// exist falls back to `fqdn`.
pub fn resolve(
    root: &Path,
    fqdn: &str,
    host_label: &str,
    req_host: Option<&str>,
    req_path: &str,
    default_index: &str,
) -> Result<Resolved> {
    if is_unsafe(req_path) {
        return Err(Error::InvalidRequest("Invalid path".to_string()));
    }

    let dot_local = format!("{host_label}.local");
    let mut vhost = match req_host {
        None => fqdn.to_string(),
        Some(h) if h == dot_local => host_label.to_string(),
        Some(h) => h.to_string(),
    };

    if !root.join(&vhost).is_dir() {
        vhost = fqdn.to_string();
    }
    let vhost_root = root.join(&vhost);

    let rel = req_path.trim_start_matches('/');
    let mut fs_path = if rel.is_empty() {
        vhost_root.clone()
    } else {
        vhost_root.join(rel)
    };

    let mut dir_path = None;
    if fs_path.is_dir() {
        if !req_path.ends_with('/') {
            return Ok(Resolved::Moved(format!("{req_path}/")));
        }
        dir_path = Some(fs_path.clone());
        fs_path = fs_path.join(default_index);
    }

    let basename = fs_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = match basename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
        _ => String::new(),
    };
    let file_exists = fs_path.is_file();

    Ok(Resolved::Path(Resolution {
        vhost,
        vhost_root,
        fs_path,
        dir_path,
        file_exists,
        basename,
        ext,
    }))
}
