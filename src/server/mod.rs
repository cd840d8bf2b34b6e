//! Server state and the listener loop.

pub mod listener;

use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::proto::Proto;

/// Per-protocol request counters for the status page.
#[derive(Debug, Default)]
pub struct Counters {
    pub gemini_auth: u64,
    pub gemini: u64,
    pub spartan: u64,
    pub gopher: u64,
    pub http: u64,
}

impl Counters {
    pub fn bump(&mut self, proto: Proto, authenticated: bool) {
        match proto {
            Proto::Gemini if authenticated => self.gemini_auth += 1,
            Proto::Gemini => self.gemini += 1,
            Proto::Spartan => self.spartan += 1,
            Proto::Gopher => self.gopher += 1,
            Proto::Http => self.http += 1,
        }
    }
}

/// Everything a request handler needs, owned by the single server loop.
///
/// The loop is strictly sequential, so handlers borrow this without any
/// synchronization. Config and the MIME table are read-only after startup.
#[derive(Debug)]
pub struct ServerCtx {
    pub config: Config,
    pub root: PathBuf,
    pub started: Instant,
    pub counters: Counters,
}

impl ServerCtx {
    pub fn new(root: PathBuf, config: Config) -> Self {
        Self {
            config,
            root,
            started: Instant::now(),
            counters: Counters::default(),
        }
    }
}
