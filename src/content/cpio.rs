//! Streaming CPIO "new ASCII" archiver.
//!
//! Emits `070701` records for every regular file under a directory,
//! depth-first. Directory entries themselves produce no records. Each header
//! plus NUL-terminated name is padded to a 4-byte boundary, as is each file
//! body, and the archive ends with a zero-sized `TRAILER!!!` record.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tokio::io::AsyncWrite;

use crate::error::Result;
use crate::response::Responder;

const MAGIC: &str = "070701";
/// Regular file, mode 0644.
const FILE_MODE: u32 = 0x81A4;
const TRAILER: &str = "TRAILER!!!";

/// Archive every regular file under `dir` into the responder.
pub async fn write_archive<S>(sink: &mut Responder<'_, S>, dir: &Path) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let files = collect_files(dir)?;
    for path in files {
        let name = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        let meta = std::fs::metadata(&path)?;
        let mtime = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);

        let body = tokio::fs::read(&path).await?;
        sink.write(&header(&name, body.len() as u32, mtime)).await?;
        sink.write(&body).await?;
        sink.write(pad4(body.len())).await?;
    }

    sink.write(&header(TRAILER, 0, 0)).await?;
    Ok(())
}

/// Depth-first listing of regular files, directories recursed but not
/// recorded. Entries are sorted per directory for a stable archive.
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut dirs = vec![dir.to_path_buf()];

    while let Some(d) = dirs.pop() {
        let mut entries: Vec<_> = std::fs::read_dir(&d)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        entries.sort();

        for path in entries {
            if path.is_dir() {
                dirs.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }
    Ok(files)
}

/// Build one record header: 110 bytes of fields, the NUL-terminated name,
/// and NUL padding to a 4-byte boundary.
fn header(name: &str, filesize: u32, mtime: u32) -> Vec<u8> {
    let name = name.strip_prefix('/').unwrap_or(name);
    let namesize = name.len() as u32 + 1;
    let (mode, nlink) = if name == TRAILER { (0, 0) } else { (FILE_MODE, 1) };

    let mut out = Vec::with_capacity(110 + name.len() + 4);
    out.extend_from_slice(MAGIC.as_bytes());
    for field in [
        0,        // ino
        mode,     // mode
        0,        // uid
        0,        // gid
        nlink,    // nlink
        mtime,    // mtime
        filesize, // filesize
        0,        // devmajor
        0,        // devminor
        0,        // rdevmajor
        0,        // rdevminor
        namesize, // namesize
        0,        // check
    ] {
        out.extend_from_slice(format!("{field:08x}").as_bytes());
    }
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    let pad = (4 - out.len() % 4) % 4;
    out.extend(std::iter::repeat(0u8).take(pad));
    out
}

fn pad4(len: usize) -> &'static [u8] {
    const ZEROS: [u8; 3] = [0; 3];
    &ZEROS[..(4 - len % 4) % 4]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::Proto;

    #[tokio::test]
    async fn archive_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.txt"), b"world!!").unwrap();

        let mut out = Vec::new();
        let mut sink = Responder::new(&mut out, Proto::Gemini, "example.org");
        write_archive(&mut sink, dir.path()).await.unwrap();

        let entries = parse_newc(&out);
        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"a.txt"));
        assert!(names.contains(&"sub/b.txt"));
        assert_eq!(entries.iter().find(|(n, _)| n == "a.txt").unwrap().1, b"hello");
        assert_eq!(
            entries.iter().find(|(n, _)| n == "sub/b.txt").unwrap().1,
            b"world!!"
        );
    }

    #[tokio::test]
    async fn records_are_four_byte_aligned() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x"), b"ab").unwrap();

        let mut out = Vec::new();
        let mut sink = Responder::new(&mut out, Proto::Gemini, "example.org");
        write_archive(&mut sink, dir.path()).await.unwrap();

        assert_eq!(out.len() % 4, 0);
        assert!(out.starts_with(b"070701"));
    }

    /// Minimal conforming newc reader, used only to verify our writer.
    fn parse_newc(mut data: &[u8]) -> Vec<(String, Vec<u8>)> {
        fn hex(field: &[u8]) -> usize {
            usize::from_str_radix(std::str::from_utf8(field).unwrap(), 16).unwrap()
        }
        let mut entries = Vec::new();
        loop {
            assert_eq!(&data[..6], b"070701");
            let filesize = hex(&data[54..62]);
            let namesize = hex(&data[94..102]);
            let name_end = 110 + namesize - 1;
            let name = String::from_utf8(data[110..name_end].to_vec()).unwrap();
            let hdr_len = (110 + namesize + 3) / 4 * 4;
            if name == "TRAILER!!!" {
                break;
            }
            let body = data[hdr_len..hdr_len + filesize].to_vec();
            let advance = hdr_len + (filesize + 3) / 4 * 4;
            entries.push((name, body));
            data = &data[advance..];
        }
        entries
    }
}
