//! Protocol adapters.
//!
//! Each adapter parses the request syntax of one protocol, canonicalizes it
//! into a [`Request`], and drives the shared content dispatcher. The
//! adapters are the only code that knows a protocol's wire shapes; everything
//! downstream works on the canonical tuple.

pub mod gemini;
pub mod gopher;
pub mod http;
pub mod spartan;

/// The four protocols this server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proto {
    Gemini,
    Spartan,
    Gopher,
    Http,
}

impl Proto {
    /// The index file synthesized for directory requests.
    pub fn default_index(&self) -> &'static str {
        match self {
            Proto::Gopher => "gopher.map",
            _ => "index.gmi",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Proto::Gemini => "gemini",
            Proto::Spartan => "spartan",
            Proto::Gopher => "gopher",
            Proto::Http => "http",
        }
    }
}

/// Titan upload parameters, parsed from `;key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitanParams {
    pub mime: String,
    pub size: usize,
    pub token: String,
}

/// The canonical request every adapter produces.
#[derive(Debug, Clone)]
pub struct Request {
    pub proto: Proto,
    /// True only on the client-certificate Gemini listener.
    pub authenticated: bool,
    /// Requested virtual host; `None` falls back to the configured fqdn.
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Case-folded, leading-slash normalized.
    pub path: String,
    /// Percent-decoded where the protocol calls for it; possibly empty.
    pub query: String,
    pub titan: Option<TitanParams>,
}

impl Request {
    pub fn new(proto: Proto) -> Self {
        Self {
            proto,
            authenticated: false,
            host: None,
            port: None,
            path: "/".to_string(),
            query: String::new(),
            titan: None,
        }
    }
}

/// What the server loop needs for the access-log line.
#[derive(Debug, Clone, Default)]
pub struct ConnLog {
    /// The raw request line as received, terminators stripped.
    pub raw: String,
    pub code: u16,
    pub bytes: u64,
}
