//! HTTP/1.0 request handling.
//!
//! Only the request line matters: `METHOD SP PATH SP PROTO`. Headers are
//! drained and discarded — in particular there is no Host parsing, so the
//! configured fqdn is always the virtual host. Every response closes the
//! connection.

use tokio::io::{AsyncRead, AsyncWrite, BufReader};

use crate::content;
use crate::line::{read_line_stream, LineOutcome};
use crate::proto::{ConnLog, Proto, Request};
use crate::response::Responder;
use crate::server::ServerCtx;
use crate::status::Status;
use crate::uri;

const MAX_LINE: usize = 1024;

pub async fn serve<S>(ctx: &ServerCtx, stream: &mut S) -> std::io::Result<ConnLog>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let mut sink = Responder::new(&mut write_half, Proto::Http, &ctx.config.fqdn);

    let raw = match read_line_stream(&mut reader, MAX_LINE).await? {
        LineOutcome::Line(l) => String::from_utf8_lossy(&l).into_owned(),
        LineOutcome::Overflow(l) => {
            sink.send_header(Status::Invalid, "Bad request").await?;
            return Ok(ConnLog {
                raw: String::from_utf8_lossy(&l).into_owned(),
                code: sink.code(),
                bytes: sink.bytes(),
            });
        }
        LineOutcome::Eof => return Ok(ConnLog::default()),
    };

    let mut parts = raw.split_whitespace();
    let (_method, target, _version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) => (m, t, v),
        _ => {
            sink.send_header(Status::Invalid, "Bad request").await?;
            return Ok(ConnLog {
                raw,
                code: sink.code(),
                bytes: sink.bytes(),
            });
        }
    };

    // drain the header block
    loop {
        match read_line_stream(&mut reader, MAX_LINE).await? {
            LineOutcome::Line(l) if l.is_empty() => break,
            LineOutcome::Eof => break,
            _ => {}
        }
    }

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, q),
        None => (target, ""),
    };

    let mut req = Request::new(Proto::Http);
    req.path = normalize(path);
    req.query = uri::percent_decode_str(query);

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
