//! Gemini feed generation for a directory of pages.
//!
//! The feed title comes from `feed-hdr.gmi` when present, otherwise from the
//! first heading of `index.gmi`. Each page contributes one dated entry line;
//! `feed-ftr.gmi` is appended verbatim when present.

use std::io::BufReader;
use std::path::Path;
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Local};
use tokio::io::AsyncWrite;

use crate::clock;
use crate::error::Result;
use crate::line::{read_line_file, LineOutcome};
use crate::proto::Proto;
use crate::response::Responder;

const TITLE_SCAN_LINES: usize = 5;
const MAX_TITLE_LINE: usize = 1024;

/// Read up to the first five lines of a page and return its `#` heading,
/// stripped of leading hashes and whitespace.
pub fn title_of(path: &Path) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);

    for _ in 0..TITLE_SCAN_LINES {
        let line = match read_line_file(&mut reader, MAX_TITLE_LINE, false).ok()? {
            LineOutcome::Line(l) | LineOutcome::Overflow(l) => l,
            LineOutcome::Eof => break,
        };
        if line.first() == Some(&b'#') {
            let text = String::from_utf8_lossy(&line);
            let title = text.trim_start_matches('#').trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}

/// Skip rule for feed candidates.
fn skipped(name: &str) -> bool {
    name.starts_with('.')
        || name.starts_with("index.")
        || name.starts_with("gopher.")
        || name.starts_with("feed")
}

/// Generate the feed for `dir`, linking entries under `link_base`
/// (the request path with the `feed.gmi` basename removed).
pub async fn generate<S>(
    sink: &mut Responder<'_, S>,
    dir: &Path,
    link_base: &str,
    fqdn: &str,
) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let hdr = dir.join("feed-hdr.gmi");
    if hdr.is_file() {
        let body = tokio::fs::read(&hdr).await?;
        sink.write(&body).await?;
    } else {
        let title = title_of(&dir.join("index.gmi")).unwrap_or_else(|| "No title".to_string());
        sink.write_str(&format!("# {title}\r\n\r\n")).await?;
    }

    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| !skipped(n))
        .collect();
    // newest-first for date-prefixed page names
    names.sort_by(|a, b| b.cmp(a));

    let base = link_base.trim_end_matches('/');
    for name in names {
        let path = dir.join(&name);
        let date = mtime_date(&path);
        let title = title_of(&path).unwrap_or_else(|| name.clone());

        let line = match sink.proto() {
            Proto::Gopher => format!("{date} {title}\t{base}/{name}\t{fqdn}\t70\r\n"),
            _ => format!("=> {base}/{name}\t{date} {title}\r\n"),
        };
        sink.write_str(&line).await?;
    }

    let ftr = dir.join("feed-ftr.gmi");
    if ftr.is_file() {
        let body = tokio::fs::read(&ftr).await?;
        sink.write(&body).await?;
    }
    Ok(())
}

fn mtime_date(path: &Path) -> String {
    let stamp = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    let t: DateTime<Local> = DateTime::from_timestamp(stamp, 0)
        .unwrap_or_default()
        .with_timezone(&Local);
    clock::feed_date(&t)
}
