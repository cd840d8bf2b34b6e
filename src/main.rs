use kore::config::{self, Config};
use kore::server::ServerCtx;
use kore::{clock, server, tls};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let root = config::server_root();
    let cfg = Config::load(&root);
    clock::set_timezone(&cfg.timezone);

    tracing::info!(
        "{} {} serving {} from {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        cfg.fqdn,
        root.display()
    );

    let tls_materials = tls::load(&root);
    let ctx = ServerCtx::new(root, cfg);

    tokio::select! {
        res = server::listener::run(ctx, tls_materials) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
