//! TLS material loading for the two Gemini listeners.
//!
//! Certificates live at fixed paths under the server root. A missing server
//! certificate or key disables both Gemini listeners; a missing CA disables
//! only the client-certificate listener.

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use tracing::warn;

pub const CA_CERT: &str = "ssl/ca-cert.pem";
pub const SRV_CERT: &str = "ssl/srv-cert.pem";
pub const SRV_KEY: &str = "ssl/srv-key.pem";

/// The rustls configurations the listener set needs.
#[derive(Clone)]
pub struct TlsMaterials {
    /// Plain Gemini (server auth only). `None` disables both listeners.
    pub server: Option<Arc<ServerConfig>>,
    /// Client-certificate Gemini. `None` disables the authenticated listener.
    pub auth: Option<Arc<ServerConfig>>,
}

/// Load certificates and build both server configurations, downgrading
/// gracefully when material is missing.
pub fn load(root: &Path) -> TlsMaterials {
    let certs = match load_certs(&root.join(SRV_CERT)) {
        Ok(c) => c,
        Err(e) => {
            warn!("no server certificate ({e}); gemini listeners disabled");
            return TlsMaterials {
                server: None,
                auth: None,
            };
        }
    };
    let key = match load_key(&root.join(SRV_KEY)) {
        Ok(k) => k,
        Err(e) => {
            warn!("no server key ({e}); gemini listeners disabled");
            return TlsMaterials {
                server: None,
                auth: None,
            };
        }
    };

    let server = match ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs.clone(), key.clone_key())
    {
        Ok(cfg) => Some(Arc::new(cfg)),
        Err(e) => {
            warn!("bad server certificate/key: {e}; gemini listeners disabled");
            return TlsMaterials {
                server: None,
                auth: None,
            };
        }
    };

    let auth = match load_certs(&root.join(CA_CERT)) {
        Ok(ca_certs) => {
            let mut roots = RootCertStore::empty();
            for cert in ca_certs {
                if let Err(e) = roots.add(cert) {
                    warn!("unusable CA certificate: {e}");
                }
            }
            match WebPkiClientVerifier::builder(Arc::new(roots)).build() {
                Ok(verifier) => ServerConfig::builder()
                    .with_client_cert_verifier(verifier)
                    .with_single_cert(certs, key)
                    .map(Arc::new)
                    .map_err(|e| warn!("client-auth config failed: {e}"))
                    .ok(),
                Err(e) => {
                    warn!("client verifier build failed: {e}; authenticated listener disabled");
                    None
                }
            }
        }
        Err(e) => {
            warn!("no CA certificate ({e}); authenticated listener disabled");
            None
        }
    };

    TlsMaterials { server, auth }
}

fn load_certs(path: &Path) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()?;
    if certs.is_empty() {
        anyhow::bail!("no certificates in {}", path.display());
    }
    Ok(certs)
}

fn load_key(path: &Path) -> anyhow::Result<PrivateKeyDer<'static>> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)?
        .ok_or_else(|| anyhow::anyhow!("no private key in {}", path.display()))
}
