//! The `/status` page.

use tokio::io::AsyncWrite;

use crate::error::Result;
use crate::response::Responder;
use crate::server::ServerCtx;

pub async fn generate<S>(sink: &mut Responder<'_, S>, ctx: &ServerCtx) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let uptime = ctx.started.elapsed().as_secs();
    let c = &ctx.counters;

    let mut page = String::new();
    page.push_str(&format!(
        "# {} {}\r\n\r\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    page.push_str(&format!("Host: {}\r\n", ctx.config.fqdn));
    page.push_str(&format!("Uptime: {uptime}s\r\n\r\n"));
    page.push_str("## Requests served\r\n\r\n");
    page.push_str(&format!("* gemini (auth): {}\r\n", c.gemini_auth));
    page.push_str(&format!("* gemini: {}\r\n", c.gemini));
    page.push_str(&format!("* spartan: {}\r\n", c.spartan));
    page.push_str(&format!("* gopher: {}\r\n", c.gopher));
    page.push_str(&format!("* http: {}\r\n", c.http));

    sink.write_str(&page).await?;
    Ok(())
}
