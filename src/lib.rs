//! kore - multi-protocol smolnet content server
//!
//! One filesystem tree served over Gemini (with Titan uploads), Spartan,
//! Gopher, and HTTP/1.0, sharing a single request-dispatch and
//! content-generation core.

pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod line;
pub mod mime;
pub mod proto;
pub mod resolver;
pub mod response;
pub mod server;
pub mod status;
pub mod tls;
pub mod uri;
