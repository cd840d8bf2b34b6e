//! Fortune cookies in the classic strfile format.
//!
//! A cookie file `<name>` is paired with an index `<name>.dat`: a 24-byte
//! big-endian header followed by one `u32` offset per stored fortune.

use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use rand::RngCore;

use crate::error::{Error, Result};
use crate::line::{read_line_file, LineOutcome};
use crate::uri;

/// The original strfile flag for ROT13-obscured cookie files.
const STR_ROTATED: u32 = 0x4;

const HEADER_LEN: u64 = 24;
const MAX_COOKIE_LINE: usize = 1024;

#[derive(Debug, Clone)]
pub struct StrfileHeader {
    pub version: u32,
    pub numstr: u32,
    pub longlen: u32,
    pub shortlen: u32,
    pub flags: u32,
    pub delim: u8,
}

impl StrfileHeader {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let version = reader.read_u32::<BigEndian>()?;
        let numstr = reader.read_u32::<BigEndian>()?;
        let longlen = reader.read_u32::<BigEndian>()?;
        let shortlen = reader.read_u32::<BigEndian>()?;
        let flags = reader.read_u32::<BigEndian>()?;
        let delim = reader.read_u8()?;
        let mut pad = [0u8; 3];
        reader.read_exact(&mut pad)?;
        Ok(Self {
            version,
            numstr,
            longlen,
            shortlen,
            flags,
            delim,
        })
    }
}

/// Pick a random cookie from `<dir>/<name>` and format it as a Gemini quote
/// block.
///
/// The index is `next_u32() % numstr`, so a fixed generator yields the
/// `(k mod numstr)`-th entry.
pub fn pick<R: RngCore>(dir: &Path, name: &str, rng: &mut R) -> Result<String> {
    let dat = dir.join(format!("{name}.dat"));
    let mut index_file = std::fs::File::open(&dat).map_err(|_| Error::NotFound)?;
    let header = StrfileHeader::read(&mut index_file)?;
    if header.numstr == 0 {
        return Err(Error::NotFound);
    }

    let index = rng.next_u32() % header.numstr;
    cookie_at(dir, name, &header, index)
}

/// Read the `index`-th cookie and format it as a quote block.
pub fn cookie_at(dir: &Path, name: &str, header: &StrfileHeader, index: u32) -> Result<String> {
    let dat = dir.join(format!("{name}.dat"));
    let mut index_file = std::fs::File::open(&dat).map_err(|_| Error::NotFound)?;
    index_file.seek(SeekFrom::Start(HEADER_LEN + 4 * u64::from(index)))?;
    let offset = index_file.read_u32::<BigEndian>()?;
    drop(index_file);

    let cookie_file = std::fs::File::open(dir.join(name)).map_err(|_| Error::NotFound)?;
    let mut reader = BufReader::new(cookie_file);
    reader.seek(SeekFrom::Start(u64::from(offset)))?;

    // The original gated ROT13 on `flags && 0x4`, which fires for any
    // nonzero flags; the intent is the STR_ROTATED bit.
    let rotated = header.flags & STR_ROTATED != 0;

    let mut block = String::new();
    loop {
        let line = match read_line_file(&mut reader, MAX_COOKIE_LINE, false)? {
            LineOutcome::Line(l) => l,
            LineOutcome::Overflow(l) => l,
            LineOutcome::Eof => break,
        };
        let mut text = String::from_utf8_lossy(&line).into_owned();
        if text.len() == 1 && text.as_bytes()[0] == header.delim {
            break;
        }
        if rotated {
            text = uri::rot13(&text);
        }
        if continues_previous(&block) {
            block.push(' ');
        } else {
            block.push_str("\r\n> ");
        }
        block.push_str(&text);
    }
    Ok(block)
}

/// A line is joined onto the previous one when the previous line ends in a
/// character that suggests a wrapped sentence.
fn continues_previous(block: &str) -> bool {
    match block.chars().last() {
        Some(c) => c.is_ascii_lowercase() || matches!(c, ' ' | ',' | ';' | '-'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, WriteBytesExt};
    use std::io::Write;

    fn write_strfile(dir: &Path, name: &str, cookies: &[&str], flags: u32) {
        let mut body = Vec::new();
        let mut offsets = Vec::new();
        for c in cookies {
            offsets.push(body.len() as u32);
            body.extend_from_slice(c.as_bytes());
            body.extend_from_slice(b"\n%\n");
        }
        std::fs::write(dir.join(name), &body).unwrap();

        let mut dat = Vec::new();
        dat.write_u32::<BigEndian>(2).unwrap(); // version
        dat.write_u32::<BigEndian>(cookies.len() as u32).unwrap();
        dat.write_u32::<BigEndian>(80).unwrap();
        dat.write_u32::<BigEndian>(1).unwrap();
        dat.write_u32::<BigEndian>(flags).unwrap();
        dat.write_all(&[b'%', 0, 0, 0]).unwrap();
        for off in offsets {
            dat.write_u32::<BigEndian>(off).unwrap();
        }
        std::fs::write(dir.join(format!("{name}.dat")), &dat).unwrap();
    }

    struct FixedRng(u32);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.0
        }
        fn next_u64(&mut self) -> u64 {
            u64::from(self.0)
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
    }

    #[test]
    fn fixed_rng_selects_k_mod_numstr() {
        let dir = tempfile::tempdir().unwrap();
        write_strfile(dir.path(), "tao", &["first", "second", "third"], 0);

        let block = pick(dir.path(), "tao", &mut FixedRng(1)).unwrap();
        assert_eq!(block, "\r\n> second");

        // wraps around
        let block = pick(dir.path(), "tao", &mut FixedRng(4)).unwrap();
        assert_eq!(block, "\r\n> second");
    }

    #[test]
    fn rotated_flag_applies_rot13() {
        let dir = tempfile::tempdir().unwrap();
        write_strfile(dir.path(), "rot", &["uryyb"], STR_ROTATED);

        let block = pick(dir.path(), "rot", &mut FixedRng(0)).unwrap();
        assert_eq!(block, "\r\n> hello");
    }

    #[test]
    fn wrapped_lines_join_with_a_space() {
        let dir = tempfile::tempdir().unwrap();
        write_strfile(dir.path(), "wrap", &["a sentence that\nwraps here\nDone."], 0);

        let block = pick(dir.path(), "wrap", &mut FixedRng(0)).unwrap();
        // "that" ends lowercase: join; "here" ends lowercase: join
        assert_eq!(block, "\r\n> a sentence that wraps here Done.");
    }

    #[test]
    fn missing_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            pick(dir.path(), "nope", &mut FixedRng(0)),
            Err(Error::NotFound)
        ));
    }
}
