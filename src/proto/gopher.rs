//! Gopher request handling.
//!
//! A request is one selector line; an empty selector means the root. An
//! optional tab-separated search string follows the selector. There is no
//! host and no percent-decoding.

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
    let mut sink = Responder::new(&mut write_half, Proto::Gopher, &ctx.config.fqdn);

    let raw = match read_line_stream(&mut reader, MAX_LINE).await? {
        LineOutcome::Line(l) => String::from_utf8_lossy(&l).into_owned(),
        LineOutcome::Overflow(l) => {
            sink.send_header(Status::Invalid, "Invalid selector").await?;
            return Ok(ConnLog {
                raw: String::from_utf8_lossy(&l).into_owned(),
                code: sink.code(),
                bytes: sink.bytes(),
            });
        }
        LineOutcome::Eof => return Ok(ConnLog::default()),
    };

    let (selector, query) = match raw.split_once('\t') {
        Some((s, q)) => (s, q),
        None => (raw.as_str(), ""),
    };

    let mut req = Request::new(Proto::Gopher);
    req.path = normalize(selector);
    req.query = query.to_string();

    content::dispatch(ctx, &req, &mut sink).await?;

    Ok(ConnLog {
        raw,
        code: sink.code(),
        bytes: sink.bytes(),
    })
}

fn normalize(selector: &str) -> String {
    if selector.is_empty() {
        return "/".to_string();
    }
    let folded = uri::fold_path(selector);
    if folded.starts_with('/') {
        folded
    } else {
        format!("/{folded}")
    }
}
