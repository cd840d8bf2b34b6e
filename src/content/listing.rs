//! Directory listing for directories without an index file.

use std::path::Path;

use tokio::io::AsyncWrite;

use crate::error::Result;
use crate::mime::MimeTable;
use crate::proto::Proto;
use crate::response::Responder;

/// Emit one line per visible entry of `dir`.
///
/// Gopher lines are full menu records typed from the MIME table;
/// everything else gets gemtext-style link lines. Subdirectories carry a
/// trailing slash.
pub async fn generate<S>(
    sink: &mut Responder<'_, S>,
    dir: &Path,
    req_path: &str,
    fqdn: &str,
    mime: &MimeTable,
) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut entries: Vec<(String, bool)> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| {
            let is_dir = e.path().is_dir();
            (e.file_name().to_string_lossy().into_owned(), is_dir)
        })
        .filter(|(name, _)| !name.starts_with('.'))
        .collect();
    entries.sort();

    let base = req_path.trim_end_matches('/');
    for (name, is_dir) in entries {
        let shown = if is_dir { format!("{name}/") } else { name.clone() };
        let line = match sink.proto() {
            Proto::Gopher => {
                let item = if is_dir {
                    '1'
                } else {
                    let ext = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
                    mime.lookup(ext).1
                };
                format!("{item}{shown}\t{base}/{name}\t{fqdn}\t70\r\n")
            }
            _ => format!("=> {base}/{shown}\t{shown}\r\n"),
        };
        sink.write_str(&line).await?;
    }

    if sink.proto() == Proto::Gopher {
        sink.write_str(".\r\n").await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gopher_listing_is_tab_separated_and_terminated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hi").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join(".secret"), b"x").unwrap();

        let table = MimeTable::new().with_defaults();
        let mut out = Vec::new();
        let mut sink = Responder::new(&mut out, Proto::Gopher, "example.org");
        generate(&mut sink, dir.path(), "/", "example.org", &table).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("0hello.txt\t/hello.txt\texample.org\t70\r\n"));
        assert!(text.contains("1sub/\t/sub\texample.org\t70\r\n"));
        assert!(!text.contains(".secret"));
        assert!(text.ends_with("\r\n.\r\n"));
    }

    #[tokio::test]
    async fn gemini_listing_uses_link_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.gmi"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();

        let table = MimeTable::new().with_defaults();
        let mut out = Vec::new();
        let mut sink = Responder::new(&mut out, Proto::Gemini, "example.org");
        generate(&mut sink, dir.path(), "/pub/", "example.org", &table).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("=> /pub/a.gmi\ta.gmi\r\n"));
        assert!(text.contains("=> /pub/docs/\tdocs/\r\n"));
    }
}
