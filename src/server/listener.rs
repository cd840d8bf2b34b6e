//! The accept loop.
//!
//! Up to five listeners are polled in a fixed priority order — authenticated
//! Gemini, Gemini, Spartan, Gopher, HTTP — accepting one connection per pass
//! and servicing it to completion before anything else. There is no
//! interleaving of clients; per-request state lives entirely inside the
//! adapters, so this loop owns the server context without synchronization.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tracing::{info, warn};

use crate::clock;
use crate::proto::{self, ConnLog, Proto};
use crate::server::ServerCtx;
use crate::status::Status;
use crate::tls::TlsMaterials;

/// Whole-connection deadline, measured from acceptance.
const CONN_TIMEOUT: Duration = Duration::from_secs(5);

struct Listeners {
    gemini_auth: Option<TcpListener>,
    gemini: Option<TcpListener>,
    spartan: Option<TcpListener>,
    gopher: Option<TcpListener>,
    http: Option<TcpListener>,
}

fn port(var: &str, default: u16) -> u16 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

async fn bind(name: &str, port: u16) -> Option<TcpListener> {
    match TcpListener::bind(("0.0.0.0", port)).await {
        Ok(l) => {
            info!("{name} listening on :{port}");
            Some(l)
        }
        Err(e) => {
            warn!("{name} listener on :{port} failed: {e}");
            None
        }
    }
}

async fn accept_on(listener: &Option<TcpListener>) -> std::io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some(l) => l.accept().await,
        None => std::future::pending().await,
    }
}

/// Run the server loop forever.
pub async fn run(mut ctx: ServerCtx, tls: TlsMaterials) -> anyhow::Result<()> {
    let acceptor = tls.server.clone().map(TlsAcceptor::from);
    let auth_acceptor = tls.auth.clone().map(TlsAcceptor::from);

    let listeners = Listeners {
        gemini_auth: if auth_acceptor.is_some() {
            bind("gemini (auth)", port("KORE_PORT_GEMINI_AUTH", 1969)).await
        } else {
            None
        },
        gemini: if acceptor.is_some() {
            bind("gemini", port("KORE_PORT_GEMINI", 1965)).await
        } else {
            None
        },
        spartan: bind("spartan", port("KORE_PORT_SPARTAN", 300)).await,
        gopher: bind("gopher", port("KORE_PORT_GOPHER", 70)).await,
        http: bind("http", port("KORE_PORT_HTTP", 80)).await,
    };

    loop {
        let (proto, authenticated, accepted) = tokio::select! {
            biased;
            r = accept_on(&listeners.gemini_auth) => (Proto::Gemini, true, r),
            r = accept_on(&listeners.gemini) => (Proto::Gemini, false, r),
            r = accept_on(&listeners.spartan) => (Proto::Spartan, false, r),
            r = accept_on(&listeners.gopher) => (Proto::Gopher, false, r),
            r = accept_on(&listeners.http) => (Proto::Http, false, r),
        };

        let (stream, peer) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };

        ctx.counters.bump(proto, authenticated);

        let acceptor = if authenticated { &auth_acceptor } else { &acceptor };
        let outcome = tokio::time::timeout(
            CONN_TIMEOUT,
            service(&ctx, proto, authenticated, stream, acceptor),
        )
        .await;

        let log = match outcome {
            Ok(Ok(log)) => log,
            Ok(Err(e)) => {
                warn!("{} connection error: {e}", proto.label());
                error_log(proto)
            }
            Err(_) => error_log(proto), // deadline expired; closed silently
        };

        access_log(peer, authenticated, &log);
    }
}

/// Service one accepted connection in the requesting protocol.
async fn service(
    ctx: &ServerCtx,
    proto: Proto,
    authenticated: bool,
    stream: TcpStream,
    acceptor: &Option<TlsAcceptor>,
) -> std::io::Result<ConnLog> {
    match proto {
        Proto::Gemini => {
            let Some(acceptor) = acceptor else {
                return Ok(ConnLog::default());
            };
            let mut tls_stream = acceptor.accept(stream).await?;
            let log = proto::gemini::serve(ctx, &mut tls_stream, authenticated).await?;
            let _ = tls_stream.shutdown().await;
            Ok(log)
        }
        Proto::Spartan => {
            let mut stream = stream;
            let log = proto::spartan::serve(ctx, &mut stream).await?;
            let _ = stream.shutdown().await;
            Ok(log)
        }
        Proto::Gopher => {
            let mut stream = stream;
            let log = proto::gopher::serve(ctx, &mut stream).await?;
            let _ = stream.shutdown().await;
            Ok(log)
        }
        Proto::Http => {
            let mut stream = stream;
            let log = proto::http::serve(ctx, &mut stream).await?;
            let _ = stream.shutdown().await;
            Ok(log)
        }
    }
}

fn error_log(proto: Proto) -> ConnLog {
    ConnLog {
        raw: String::new(),
        code: Status::ServerError.code(proto),
        bytes: 0,
    }
}

/// One line per request, after the response.
fn access_log(peer: SocketAddr, authenticated: bool, log: &ConnLog) {
    info!(
        "LOG: {} - {} - [{}] \"{}\" {} {}",
        peer.ip(),
        if authenticated { "a" } else { "-" },
        clock::access_log_stamp(&clock::now()),
        log.raw,
        log.code,
        log.bytes
    );
}
