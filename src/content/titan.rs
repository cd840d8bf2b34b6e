//! Titan upload receiver.
//!
//! The body arrives immediately after the request line; it is staged into a
//! scratch file, the current destination is archived, and the scratch file
//! is renamed into place. The response redirects the client to the uploaded
//! resource under `gemini://`.

use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite};
use tracing::debug;

use crate::clock;
use crate::content::archive;
use crate::proto::Request;
use crate::resolver::Resolution;
use crate::response::Responder;
use crate::server::ServerCtx;
use crate::status::Status;

const TMP_FILE: &str = "~titan~.tmp";
/// Capacity of the request staging buffer the payload must fit through.
pub const BUFFER_CAPACITY: usize = 1028;

/// Receive a Titan upload. `line_len` is the length of the raw request line,
/// already consumed from the same buffer the payload streams through.
pub async fn receive<R, S>(
    ctx: &ServerCtx,
    req: &Request,
    res: &Resolution,
    reader: &mut R,
    sink: &mut Responder<'_, S>,
    line_len: usize,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    S: AsyncWrite + Unpin,
{
    let Some(params) = &req.titan else {
        sink.send_header(Status::Invalid, "Missing titan parameters").await?;
        return Ok(());
    };

    if let Some(expected) = &ctx.config.titan_token {
        if !params.token.starts_with(expected.as_str()) {
            sink.send_header(Status::Invalid, "Invalid token").await?;
            return Ok(());
        }
    }

    if params.size == 0 {
        sink.send_header(Status::Invalid, "Invalid payload size").await?;
        return Ok(());
    }
    if params.size > BUFFER_CAPACITY.saturating_sub(line_len) {
        sink.send_header(Status::Invalid, "Insufficient buffer").await?;
        return Ok(());
    }

    let mut body = vec![0u8; params.size];
    if reader.read_exact(&mut body).await.is_err() {
        sink.send_header(Status::Invalid, "Error reading payload").await?;
        return Ok(());
    }

    let tmp_path = ctx.root.join(TMP_FILE);
    if let Err(e) = tokio::fs::write(&tmp_path, &body).await {
        debug!("titan scratch write failed: {e}");
        sink.send_header(Status::Invalid, "Error writing file").await?;
        return Ok(());
    }

    let now = clock::now();
    archive::snapshot(&ctx.root, &res.fs_path, &now)?;
    if let Err(e) = std::fs::rename(&tmp_path, &res.fs_path) {
        debug!("titan rename failed: {e}");
        sink.send_header(Status::Invalid, "Error writing file").await?;
        return Ok(());
    }

    let host = req.host.as_deref().unwrap_or(&ctx.config.fqdn);
    let target = format!("gemini://{host}{}", req.path);
    sink.send_header(Status::Redir, &target).await?;
    Ok(())
}
