//! Bounded line reading with distinct overflow and end-of-input outcomes.
//!
//! Several state machines in this crate (the tinylog inserter, the feed
//! title scan, the request parsers) branch on the difference between "a line
//! arrived", "the line did not fit", and "the input is exhausted". That
//! three-way split is load-bearing, so it is encoded as a dedicated type
//! rather than a sentinel integer.

use std::io::BufRead;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Outcome of one bounded line read. Terminators are never included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A complete line, ended by CR, LF, CRLF, or end of input.
    Line(Vec<u8>),
    /// `max` bytes accumulated without a terminator. The carried bytes belong
    /// to the current line; the caller decides whether to reject the request
    /// or write the partial chunk and keep reading.
    Overflow(Vec<u8>),
    /// No bytes read and no more data available.
    Eof,
}

/// Read one line from a network stream, up to `max` content bytes.
///
/// Stops at CR or LF and consumes an optional paired LF after CR.
pub async fn read_line_stream<R>(reader: &mut R, max: usize) -> std::io::Result<LineOutcome>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();

    loop {
        let byte = {
            let buf = reader.fill_buf().await?;
            if buf.is_empty() {
                if line.is_empty() {
                    return Ok(LineOutcome::Eof);
                }
                return Ok(LineOutcome::Line(line));
            }
            buf[0]
        };
        reader.consume(1);

        match byte {
            b'\r' => {
                // paired LF, if any
                let buf = reader.fill_buf().await?;
                if buf.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                return Ok(LineOutcome::Line(line));
            }
            b'\n' => return Ok(LineOutcome::Line(line)),
            other => {
                if line.len() == max {
                    return Ok(LineOutcome::Overflow(line));
                }
                line.push(other);
            }
        }
    }
}

/// Read one line from an open file, up to `max` content bytes.
///
/// Unless `allow_ctrl` is set, control bytes at the start of a line are
/// skipped rather than collected.
pub fn read_line_file<R>(reader: &mut R, max: usize, allow_ctrl: bool) -> std::io::Result<LineOutcome>
where
    R: BufRead,
{
    let mut line = Vec::new();

    loop {
        let byte = {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                if line.is_empty() {
                    return Ok(LineOutcome::Eof);
                }
                return Ok(LineOutcome::Line(line));
            }
            buf[0]
        };
        reader.consume(1);

        match byte {
            b'\r' => {
                let buf = reader.fill_buf()?;
                if buf.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                return Ok(LineOutcome::Line(line));
            }
            b'\n' => return Ok(LineOutcome::Line(line)),
            other => {
                if other < 0x20 && line.is_empty() && !allow_ctrl {
                    continue;
                }
                if line.len() == max {
                    return Ok(LineOutcome::Overflow(line));
                }
                line.push(other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn file_variant_handles_terminators_and_eof() {
        let mut r = Cursor::new(b"one\r\ntwo\nthree".to_vec());
        assert_eq!(read_line_file(&mut r, 64, false).unwrap(), LineOutcome::Line(b"one".to_vec()));
        assert_eq!(read_line_file(&mut r, 64, false).unwrap(), LineOutcome::Line(b"two".to_vec()));
        assert_eq!(read_line_file(&mut r, 64, false).unwrap(), LineOutcome::Line(b"three".to_vec()));
        assert_eq!(read_line_file(&mut r, 64, false).unwrap(), LineOutcome::Eof);
    }

    #[test]
    fn file_variant_reports_overflow_with_partial_data() {
        let mut r = Cursor::new(b"abcdefgh\r\n".to_vec());
        assert_eq!(
            read_line_file(&mut r, 4, false).unwrap(),
            LineOutcome::Overflow(b"abcd".to_vec())
        );
        // the rest of the oversized line is still readable
        assert_eq!(read_line_file(&mut r, 64, false).unwrap(), LineOutcome::Line(b"efgh".to_vec()));
    }

    #[test]
    fn file_variant_skips_leading_control_bytes() {
        let mut r = Cursor::new(b"\x01\x02abc\n".to_vec());
        assert_eq!(read_line_file(&mut r, 64, false).unwrap(), LineOutcome::Line(b"abc".to_vec()));

        let mut r = Cursor::new(b"\x01abc\n".to_vec());
        assert_eq!(
            read_line_file(&mut r, 64, true).unwrap(),
            LineOutcome::Line(b"\x01abc".to_vec())
        );
    }

    #[test]
    fn blank_lines_survive() {
        let mut r = Cursor::new(b"a\r\n\r\nb\r\n".to_vec());
        assert_eq!(read_line_file(&mut r, 64, false).unwrap(), LineOutcome::Line(b"a".to_vec()));
        assert_eq!(read_line_file(&mut r, 64, false).unwrap(), LineOutcome::Line(b"".to_vec()));
        assert_eq!(read_line_file(&mut r, 64, false).unwrap(), LineOutcome::Line(b"b".to_vec()));
    }

    #[tokio::test]
    async fn stream_variant_matches_file_variant() {
        let data: &[u8] = b"gemini://host/\r\nrest";
        let mut r = tokio::io::BufReader::new(data);
        assert_eq!(
            read_line_stream(&mut r, 1024).await.unwrap(),
            LineOutcome::Line(b"gemini://host/".to_vec())
        );
        // bytes after the terminator stay buffered for the caller
        assert_eq!(
            read_line_stream(&mut r, 1024).await.unwrap(),
            LineOutcome::Line(b"rest".to_vec())
        );
        assert_eq!(read_line_stream(&mut r, 1024).await.unwrap(), LineOutcome::Eof);
    }
}
