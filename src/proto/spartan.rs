//! Spartan request handling.
//!
//! A request is `host path content-length\r\n` followed by exactly
//! `content-length` body bytes, which become the query. The body is not
//! percent-decoded.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, BufReader};

use crate::content;
use crate::line::{read_line_stream, LineOutcome};
use crate::proto::{ConnLog, Proto, Request};
use crate::response::Responder;
use crate::server::ServerCtx;
use crate::status::Status;
use crate::uri;

const MAX_LINE: usize = 1024;
const BUFFER_CAPACITY: usize = 1028;

pub async fn serve<S>(ctx: &ServerCtx, stream: &mut S) -> std::io::Result<ConnLog>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let mut sink = Responder::new(&mut write_half, Proto::Spartan, &ctx.config.fqdn);

    let raw = match read_line_stream(&mut reader, MAX_LINE).await? {
        LineOutcome::Line(l) => String::from_utf8_lossy(&l).into_owned(),
        LineOutcome::Overflow(l) => {
            sink.send_header(Status::Invalid, "Invalid request").await?;
            return Ok(ConnLog {
                raw: String::from_utf8_lossy(&l).into_owned(),
                code: sink.code(),
                bytes: sink.bytes(),
            });
        }
        LineOutcome::Eof => return Ok(ConnLog::default()),
    };

    let mut parts = raw.split_whitespace();
    let (host, path, len) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(l)) => (h, p, l),
        _ => {
            sink.send_header(Status::Invalid, "Invalid request").await?;
            return Ok(ConnLog {
                raw,
                code: sink.code(),
                bytes: sink.bytes(),
            });
        }
    };

    let Ok(len) = len.parse::<usize>() else {
        sink.send_header(Status::Invalid, "Invalid content length").await?;
        return Ok(ConnLog {
            raw,
            code: sink.code(),
            bytes: sink.bytes(),
        });
    };
    if len > BUFFER_CAPACITY.saturating_sub(raw.len() + 1) {
        sink.send_header(Status::Invalid, "Insufficient buffer").await?;
        return Ok(ConnLog {
            raw,
            code: sink.code(),
            bytes: sink.bytes(),
        });
    }

    let mut query = vec![0u8; len];
    if len > 0 && reader.read_exact(&mut query).await.is_err() {
        sink.send_header(Status::Invalid, "Error reading payload").await?;
        return Ok(ConnLog {
            raw,
            code: sink.code(),
            bytes: sink.bytes(),
        });
    }

    let mut req = Request::new(Proto::Spartan);
    req.host = Some(host.to_string());
    req.path = normalize(path);
    req.query = String::from_utf8_lossy(&query).into_owned();

    content::dispatch(ctx, &req, &mut sink).await?;

    Ok(ConnLog {
        raw,
        code: sink.code(),
        bytes: sink.bytes(),
    })
}

fn normalize(path: &str) -> String {
    let folded = uri::fold_path(path);
    if folded.starts_with('/') {
        folded
    } else {
        format!("/{folded}")
    }
}
