//! Tinylog insertion.
//!
//! A tinylog is a microblog page where the newest entry is prepended under a
//! `## <date>` header. New entries are inserted immediately before the first
//! existing second-level header (or at end of file for a fresh log), via a
//! temp file that replaces the original after an archive snapshot.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, Local};

use crate::clock;
use crate::content::archive;
use crate::error::Result;
use crate::line::{read_line_file, LineOutcome};

pub const TINYLOG_FILE: &str = "tinylog.gmi";
const TMP_FILE: &str = "~tinylog.tmp";
const MAX_LINE: usize = 1024;

#[derive(PartialEq)]
enum State {
    Before,
    After,
}

/// Insert `entry` into `<vhost_root>/tinylog.gmi`.
///
/// The original is archived, then atomically replaced by the rewritten copy.
/// A missing log starts empty.
pub fn append_entry(
    root: &Path,
    vhost_root: &Path,
    entry: &str,
    now: &DateTime<Local>,
) -> Result<()> {
    let log_path = vhost_root.join(TINYLOG_FILE);
    let tmp_path = root.join(TMP_FILE);

    let tmp = std::fs::File::create(&tmp_path)?;
    let mut out = BufWriter::new(tmp);

    let header = format!("## {}\r\n", clock::tinylog_stamp(now));

    match std::fs::File::open(&log_path) {
        Ok(src) => {
            let mut reader = BufReader::new(src);
            let mut state = State::Before;

            while state == State::Before {
                match read_line_file(&mut reader, MAX_LINE, false)? {
                    LineOutcome::Line(line) => {
                        if line.starts_with(b"## ") {
                            write_entry(&mut out, &header, entry)?;
                            state = State::After;
                        }
                        out.write_all(&line)?;
                        out.write_all(b"\r\n")?;
                    }
                    LineOutcome::Overflow(chunk) => {
                        // mid-line: keep copying without a terminator
                        out.write_all(&chunk)?;
                    }
                    LineOutcome::Eof => {
                        write_entry(&mut out, &header, entry)?;
                        state = State::After;
                    }
                }
            }

            // bulk-copy the remainder
            let mut rest = Vec::new();
            reader.read_to_end(&mut rest)?;
            out.write_all(&rest)?;
        }
        Err(_) => {
            write_entry(&mut out, &header, entry)?;
        }
    }
    out.flush()?;
    drop(out);

    archive::snapshot(root, &log_path, now)?;
    std::fs::rename(&tmp_path, &log_path)?;
    Ok(())
}

fn write_entry<W: Write>(out: &mut W, header: &str, entry: &str) -> std::io::Result<()> {
    out.write_all(header.as_bytes())?;
    out.write_all(entry.as_bytes())?;
    out.write_all(b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 2, 10, 30, 0).unwrap()
    }

    #[test]
    fn inserts_before_first_existing_header() {
        let root = tempfile::tempdir().unwrap();
        let vhost = root.path().join("example.org");
        std::fs::create_dir_all(&vhost).unwrap();
        std::fs::write(
            vhost.join(TINYLOG_FILE),
            b"# My tinylog\r\n\r\n## 2026-07-01 09:00 +00:00\r\nolder entry\r\n",
        )
        .unwrap();

        append_entry(root.path(), &vhost, "fresh entry", &now()).unwrap();

        let text = std::fs::read_to_string(vhost.join(TINYLOG_FILE)).unwrap();
        // prefix untouched
        assert!(text.starts_with("# My tinylog\r\n\r\n"));
        // new header + entry + blank line, then the old header
        let idx = text.find("## ").unwrap();
        let tail = &text[idx..];
        assert!(tail.contains("fresh entry\r\n\r\n## 2026-07-01 09:00"));
        assert!(text.ends_with("older entry\r\n"));
    }

    #[test]
    fn appends_at_eof_when_no_header_exists() {
        let root = tempfile::tempdir().unwrap();
        let vhost = root.path().join("example.org");
        std::fs::create_dir_all(&vhost).unwrap();
        std::fs::write(vhost.join(TINYLOG_FILE), b"# Title only\r\n").unwrap();

        append_entry(root.path(), &vhost, "first entry", &now()).unwrap();

        let text = std::fs::read_to_string(vhost.join(TINYLOG_FILE)).unwrap();
        assert!(text.starts_with("# Title only\r\n## "));
        assert!(text.ends_with("first entry\r\n\r\n"));
    }

    #[test]
    fn missing_log_is_created() {
        let root = tempfile::tempdir().unwrap();
        let vhost = root.path().join("example.org");
        std::fs::create_dir_all(&vhost).unwrap();

        append_entry(root.path(), &vhost, "hello", &now()).unwrap();

        let text = std::fs::read_to_string(vhost.join(TINYLOG_FILE)).unwrap();
        assert!(text.starts_with("## "));
        assert!(text.ends_with("hello\r\n\r\n"));
    }

    #[test]
    fn original_is_archived_before_replacement() {
        let root = tempfile::tempdir().unwrap();
        let vhost = root.path().join("example.org");
        std::fs::create_dir_all(&vhost).unwrap();
        std::fs::write(vhost.join(TINYLOG_FILE), b"## 2026-07-01 09:00 +00:00\r\nold\r\n").unwrap();

        append_entry(root.path(), &vhost, "new", &now()).unwrap();

        let archived = root
            .path()
            .join("archive/example.org/tinylog.gmi/20260802-103000");
        let text = std::fs::read_to_string(archived).unwrap();
        assert!(text.contains("old"));
        assert!(!text.contains("new"));
    }
}
