//! Per-protocol response emission.
//!
//! A [`Responder`] wraps the connection's write half, knows which dialect to
//! speak, and counts everything it sends so the server loop can produce the
//! access-log line afterwards.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::proto::Proto;
use crate::status::Status;

pub struct Responder<'a, S> {
    stream: &'a mut S,
    proto: Proto,
    fqdn: &'a str,
    code: u16,
    bytes: u64,
}

impl<'a, S: AsyncWrite + Unpin> Responder<'a, S> {
    pub fn new(stream: &'a mut S, proto: Proto, fqdn: &'a str) -> Self {
        Self {
            stream,
            proto,
            fqdn,
            code: 0,
            bytes: 0,
        }
    }

    pub fn proto(&self) -> Proto {
        self.proto
    }

    /// Numeric status of the last header sent, for the access log.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Total bytes written, headers included.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Emit the status header in the requesting protocol's dialect and
    /// return the numeric code.
    ///
    /// - Gemini/Spartan: `<code> <text>\r\n`
    /// - HTTP: one of three HTTP/1.0 shapes depending on the status
    /// - Gopher: OK emits nothing (the body carries item prefixes);
    ///   redirects and errors become menu lines
    pub async fn send_header(&mut self, status: Status, text: &str) -> std::io::Result<u16> {
        let code = status.code(self.proto);
        self.code = code;

        match self.proto {
            Proto::Gemini | Proto::Spartan => {
                let line = format!("{code} {text}\r\n");
                self.write(line.as_bytes()).await?;
            }
            Proto::Http => {
                let head = if status == Status::Ok {
                    format!(
                        "HTTP/1.0 200 OK\r\nContent-Type: {text}; encoding=utf8\r\nConnection: close\r\n\r\n"
                    )
                } else if status.is_redirect() {
                    format!("HTTP/1.0 301 Moved\r\nLocation: {text}\r\nConnection: close\r\n\r\n")
                } else {
                    format!("HTTP/1.0 {code} {text}\r\nConnection: close\r\n\r\n")
                };
                self.write(head.as_bytes()).await?;
            }
            Proto::Gopher => {
                if status.is_redirect() {
                    let line = format!("1Redirect to {text}\t{text}\t{}\t70\r\n", self.fqdn);
                    self.write(line.as_bytes()).await?;
                } else if status != Status::Ok {
                    let line = format!("i{text}\t\t{}\t70\r\n", self.fqdn);
                    self.write(line.as_bytes()).await?;
                }
            }
        }
        Ok(code)
    }

    /// Write body bytes, counting them.
    pub async fn write(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(buf).await?;
        self.bytes += buf.len() as u64;
        Ok(())
    }

    pub async fn write_str(&mut self, s: &str) -> std::io::Result<()> {
        self.write(s.as_bytes()).await
    }

    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush().await
    }
}
