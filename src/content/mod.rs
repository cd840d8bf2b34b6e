//! Content dispatch.
//!
//! Given a resolved request, pick exactly one branch: static file, directory
//! listing, one of the virtual endpoints, or not-found. Side-effectful
//! endpoints are gated on client authentication.

pub mod archive;
pub mod cpio;
pub mod feed;
pub mod fortune;
pub mod listing;
pub mod statuspage;
pub mod tinylog;
pub mod titan;

use tokio::io::AsyncWrite;
use tracing::debug;

use crate::clock;
use crate::error::Error;
use crate::proto::{Proto, Request};
use crate::resolver::{self, Resolution, Resolved};
use crate::response::Responder;
use crate::server::ServerCtx;
use crate::status::Status;

const AUTH_TEXT: &str = "Client identification is required.";
const GEMINI_MIME: &str = "text/gemini";

/// Service a canonical request end to end: resolve, branch, respond.
pub async fn dispatch<S>(
    ctx: &ServerCtx,
    req: &Request,
    sink: &mut Responder<'_, S>,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let resolved = resolver::resolve(
        &ctx.root,
        &ctx.config.fqdn,
        &ctx.config.host,
        req.host.as_deref(),
        &req.path,
        req.proto.default_index(),
    );

    let res = match resolved {
        Err(_) => {
            sink.send_header(Status::Invalid, "Invalid path").await?;
            return Ok(());
        }
        Ok(Resolved::Moved(target)) => {
            sink.send_header(Status::Moved, &target).await?;
            return Ok(());
        }
        Ok(Resolved::Path(res)) => res,
    };

    // 1. a real file wins, unless the query forces generation
    if res.file_exists && req.query != "nofile" {
        return serve_file(ctx, &res, sink).await;
    }

    // 2. a directory with no index gets a listing
    if let (Some(dir), false) = (&res.dir_path, res.file_exists) {
        sink.send_header(Status::Ok, GEMINI_MIME).await?;
        if let Err(e) = listing::generate(sink, dir, &req.path, &ctx.config.fqdn, &ctx.config.mime).await
        {
            debug!("listing failed: {e}");
        }
        return Ok(());
    }

    // 3. virtual endpoints, first match wins
    if req.path == "/status" && req.proto == Proto::Gemini {
        sink.send_header(Status::Ok, GEMINI_MIME).await?;
        if let Err(e) = statuspage::generate(sink, ctx).await {
            debug!("status page failed: {e}");
        }
        return Ok(());
    }

    if let Some(name) = fortune_name(&req.path) {
        return serve_fortune(ctx, &name, sink).await;
    }

    if req.path == "/input" && req.proto == Proto::Gemini {
        if !req.authenticated {
            sink.send_header(Status::AuthRequired, AUTH_TEXT).await?;
        } else {
            sink.send_header(Status::Password, "Password:").await?;
        }
        return Ok(());
    }

    if req.path == "/admin/create-directory" && req.proto == Proto::Gemini {
        return create_directory(req, &res, sink).await;
    }

    if req.path == "/cpio" {
        if !req.authenticated {
            sink.send_header(Status::AuthRequired, AUTH_TEXT).await?;
            return Ok(());
        }
        let target = format!(
            "/{}-{}.cpio",
            ctx.config.host,
            clock::archive_stamp(&clock::now())
        );
        sink.send_header(Status::Redir, &target).await?;
        return Ok(());
    }

    if res.ext == "cpio" {
        if !req.authenticated {
            sink.send_header(Status::AuthRequired, AUTH_TEXT).await?;
            return Ok(());
        }
        let (mime, _) = ctx.config.mime.lookup(&res.ext);
        sink.send_header(Status::Ok, mime).await?;
        let parent = res.fs_path.parent().unwrap_or(&res.vhost_root).to_path_buf();
        if let Err(e) = cpio::write_archive(sink, &parent).await {
            debug!("cpio archive failed: {e}");
        }
        return Ok(());
    }

    if res.basename == "feed.gmi" {
        if !req.authenticated {
            sink.send_header(Status::AuthRequired, AUTH_TEXT).await?;
            return Ok(());
        }
        sink.send_header(Status::Ok, GEMINI_MIME).await?;
        let parent = res.fs_path.parent().unwrap_or(&res.vhost_root).to_path_buf();
        let link_base = req.path.strip_suffix(res.basename.as_str()).unwrap_or("/");
        if let Err(e) = feed::generate(sink, &parent, link_base, &ctx.config.fqdn).await {
            debug!("feed failed: {e}");
        }
        return Ok(());
    }

    if req.path == "/tinylog/new" && req.proto == Proto::Gemini {
        return tinylog_new(ctx, req, &res, sink).await;
    }

    // 4. nothing matched
    sink.send_header(Status::NotFound, "Not found").await?;
    Ok(())
}

/// `/fortunes` and `/fortunes/<name>`; nested names are not a thing.
fn fortune_name(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/fortunes")?;
    match rest.trim_matches('/') {
        "" => Some("fortunes".to_string()),
        name if !name.contains('/') => Some(name.to_string()),
        _ => None,
    }
}

async fn serve_file<S>(
    ctx: &ServerCtx,
    res: &Resolution,
    sink: &mut Responder<'_, S>,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    if sink.proto() != Proto::Gopher {
        let (mime, _) = ctx.config.mime.lookup(&res.ext);
        sink.send_header(Status::Ok, mime).await?;
    } else {
        // body only; gopher menus carry their own type prefixes
        sink.send_header(Status::Ok, "").await?;
    }

    let mut file = match tokio::fs::File::open(&res.fs_path).await {
        Ok(f) => f,
        Err(e) => {
            debug!("open {} failed: {e}", res.fs_path.display());
            return Ok(());
        }
    };

    let mut buf = [0u8; 8192];
    loop {
        let n = tokio::io::AsyncReadExt::read(&mut file, &mut buf).await?;
        if n == 0 {
            break;
        }
        sink.write(&buf[..n]).await?;
    }
    sink.flush().await?;
    Ok(())
}

async fn serve_fortune<S>(
    ctx: &ServerCtx,
    name: &str,
    sink: &mut Responder<'_, S>,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let dir = ctx.root.join("fortunes");
    let mut rng = rand::rng();
    match fortune::pick(&dir, name, &mut rng) {
        Ok(block) => {
            sink.send_header(Status::Ok, GEMINI_MIME).await?;
            sink.write_str(&block).await?;
            sink.write_str("\r\n").await?;
        }
        Err(Error::NotFound) => {
            sink.send_header(Status::NotFound, "Not found").await?;
        }
        Err(e) => {
            debug!("fortune failed: {e}");
            sink.send_header(Status::ServerError, "Internal error").await?;
        }
    }
    Ok(())
}

async fn create_directory<S>(
    req: &Request,
    res: &Resolution,
    sink: &mut Responder<'_, S>,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    if !req.authenticated {
        sink.send_header(Status::AuthRequired, AUTH_TEXT).await?;
        return Ok(());
    }
    if req.query.is_empty() {
        sink.send_header(Status::Input, "Directory (absolute path):").await?;
        return Ok(());
    }
    if resolver::is_unsafe(&req.query) {
        sink.send_header(Status::Invalid, "Invalid path").await?;
        return Ok(());
    }

    let rel = req.query.trim_start_matches('/');
    match std::fs::create_dir(res.vhost_root.join(rel)) {
        Ok(()) => {
            let target = format!("/{rel}");
            sink.send_header(Status::Redir, &target).await?;
        }
        Err(e) => {
            debug!("create-directory failed: {e}");
            sink.send_header(Status::Invalid, "Unable to create directory").await?;
        }
    }
    Ok(())
}

async fn tinylog_new<S>(
    ctx: &ServerCtx,
    req: &Request,
    res: &Resolution,
    sink: &mut Responder<'_, S>,
) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    if !req.authenticated {
        sink.send_header(Status::AuthRequired, AUTH_TEXT).await?;
        return Ok(());
    }
    if req.query.is_empty() {
        sink.send_header(Status::Input, "Tinylog entry:").await?;
        return Ok(());
    }

    match tinylog::append_entry(&ctx.root, &res.vhost_root, &req.query, &clock::now()) {
        Ok(()) => {
            sink.send_header(Status::Redir, "/tinylog.gmi").await?;
        }
        Err(e) => {
            debug!("tinylog append failed: {e}");
            sink.send_header(Status::Invalid, "Unable to update tinylog").await?;
        }
    }
    Ok(())
}
