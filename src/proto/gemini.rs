//! Gemini and Titan request handling.
//!
//! A request is a single CRLF-terminated URL of at most 1024 bytes. The
//! `titan://` scheme reuses the same parser but carries `;key=value` upload
//! parameters and a body immediately after the request line.

use tokio::io::{AsyncRead, AsyncWrite, BufReader};

use crate::content::{self, titan};
use crate::error::{Error, Result};
use crate::line::{read_line_stream, LineOutcome};
use crate::proto::{ConnLog, Proto, Request, TitanParams};
use crate::resolver::{self, Resolved};
use crate::response::Responder;
use crate::server::ServerCtx;
use crate::status::Status;
use crate::uri;

pub const MAX_URL: usize = 1024;

#[derive(Debug, PartialEq, Eq)]
pub struct ParsedUrl {
    pub titan: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: String,
    /// Raw query / parameter string, undecoded.
    pub params: String,
}

/// Split a `gemini://` or `titan://` URL into its parts.
///
/// A Gemini URL must carry a host; a Titan URL without one falls back to
/// the configured fqdn downstream.
pub fn parse_url(line: &str) -> Result<ParsedUrl> {
    let invalid = || Error::InvalidRequest("Invalid URL".to_string());

    let (scheme, rest) = line.split_once(':').ok_or_else(invalid)?;
    let titan = match scheme {
        "gemini" => false,
        "titan" => true,
        other => return Err(Error::UnsupportedScheme(other.to_string())),
    };
    let rest = rest.strip_prefix("//").ok_or_else(invalid)?;

    let host_end = rest
        .find(|c: char| c == '/' || c == '?' || (titan && c == ';'))
        .unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(host_end);

    let (host, port) = match authority.split_once(':') {
        Some((h, p)) => (h, p.parse::<u16>().ok()),
        None => (authority, None),
    };
    if host.is_empty() && !titan {
        return Err(invalid());
    }

    let (path, params) = match tail.find(|c: char| c == '?' || (titan && c == ';')) {
        Some(i) => (&tail[..i], &tail[i + 1..]),
        None => (tail, ""),
    };
    let path = if path.is_empty() { "/" } else { path };

    Ok(ParsedUrl {
        titan,
        host: (!host.is_empty()).then(|| host.to_string()),
        port,
        path: path.to_string(),
        params: params.to_string(),
    })
}

/// Parse `;`-separated Titan parameters. Unknown keys are ignored.
pub fn parse_titan_params(params: &str) -> TitanParams {
    let mut out = TitanParams::default();
    for pair in params.split(';') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "mime" => out.mime = uri::percent_decode_str(value),
            "token" => out.token = uri::percent_decode_str(value),
            "size" => out.size = value.parse().unwrap_or(0),
            _ => {}
        }
    }
    out
}

/// Service one Gemini or Titan connection.
pub async fn serve<S>(
    ctx: &ServerCtx,
    stream: &mut S,
    authenticated: bool,
) -> std::io::Result<ConnLog>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let mut sink = Responder::new(&mut write_half, Proto::Gemini, &ctx.config.fqdn);

    let raw = match read_line_stream(&mut reader, MAX_URL).await? {
        LineOutcome::Line(l) => String::from_utf8_lossy(&l).into_owned(),
        LineOutcome::Overflow(l) => {
            sink.send_header(Status::Invalid, "Invalid URL").await?;
            return Ok(ConnLog {
                raw: String::from_utf8_lossy(&l).into_owned(),
                code: sink.code(),
                bytes: sink.bytes(),
            });
        }
        LineOutcome::Eof => return Ok(ConnLog::default()),
    };

    let url = match parse_url(&raw) {
        Ok(u) => u,
        Err(e) => {
            let text = match &e {
                Error::UnsupportedScheme(_) => "Unsupported scheme",
                _ => "Invalid URL",
            };
            sink.send_header(Status::Invalid, text).await?;
            return Ok(ConnLog {
                raw,
                code: sink.code(),
                bytes: sink.bytes(),
            });
        }
    };

    let mut req = Request::new(Proto::Gemini);
    req.authenticated = authenticated;
    req.host = url.host;
    req.port = url.port;
    req.path = uri::fold_path(&url.path);

    if url.titan {
        if url.params.is_empty() {
            sink.send_header(Status::Invalid, "Missing titan parameters").await?;
            return Ok(ConnLog {
                raw,
                code: sink.code(),
                bytes: sink.bytes(),
            });
        }
        req.titan = Some(parse_titan_params(&url.params));

        let resolved = resolver::resolve(
            &ctx.root,
            &ctx.config.fqdn,
            &ctx.config.host,
            req.host.as_deref(),
            &req.path,
            Proto::Gemini.default_index(),
        );
        match resolved {
            Ok(Resolved::Path(res)) if res.dir_path.is_none() => {
                // request line plus its CRLF already went through the buffer
                let line_len = raw.len() + 2;
                titan::receive(ctx, &req, &res, &mut reader, &mut sink, line_len).await?;
            }
            _ => {
                sink.send_header(Status::Invalid, "Invalid path").await?;
            }
        }
    } else {
        req.query = uri::percent_decode_str(&url.params);
        content::dispatch(ctx, &req, &mut sink).await?;
    }

    Ok(ConnLog {
        raw,
        code: sink.code(),
        bytes: sink.bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_gemini_url() {
        let u = parse_url("gemini://example.org/docs/page.gmi?q%20x").unwrap();
        assert!(!u.titan);
        assert_eq!(u.host.as_deref(), Some("example.org"));
        assert_eq!(u.port, None);
        assert_eq!(u.path, "/docs/page.gmi");
        assert_eq!(u.params, "q%20x");
    }

    #[test]
    fn parses_port_and_bare_host() {
        let u = parse_url("gemini://example.org:1965").unwrap();
        assert_eq!(u.host.as_deref(), Some("example.org"));
        assert_eq!(u.port, Some(1965));
        assert_eq!(u.path, "/");
    }

    #[test]
    fn rejects_empty_gemini_host() {
        assert!(parse_url("gemini:///etc/passwd").is_err());
        assert!(parse_url("gemini://").is_err());
    }

    #[test]
    fn rejects_foreign_schemes_and_junk() {
        assert!(matches!(
            parse_url("https://example.org/"),
            Err(Error::UnsupportedScheme(_))
        ));
        assert!(parse_url("no-scheme-here").is_err());
        assert!(parse_url("gemini:example.org").is_err());
    }

    #[test]
    fn titan_url_splits_semicolon_params() {
        let u = parse_url("titan://example.org/notes/x.gmi;mime=text/gemini;size=5;token=secret")
            .unwrap();
        assert!(u.titan);
        assert_eq!(u.path, "/notes/x.gmi");
        let p = parse_titan_params(&u.params);
        assert_eq!(p.mime, "text/gemini");
        assert_eq!(p.size, 5);
        assert_eq!(p.token, "secret");
    }

    #[test]
    fn titan_host_may_be_absent() {
        let u = parse_url("titan:///x.gmi;size=1").unwrap();
        assert_eq!(u.host, None);
        assert_eq!(u.path, "/x.gmi");
    }
}
