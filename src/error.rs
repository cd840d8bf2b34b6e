use thiserror::Error;

use crate::status::Status;

/// Errors that can occur while parsing or servicing a request.
#[derive(Error, Debug)]
pub enum Error {
    /// The request line, path, or parameters are malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The resolved path names no file, directory, or virtual endpoint
    #[error("not found")]
    NotFound,

    /// A protected action was attempted without client authentication
    #[error("client identification is required")]
    AuthRequired,

    /// An I/O operation on the filesystem or socket failed
    #[error("i/o error: {0}")]
    InternalIo(#[from] std::io::Error),

    /// The per-connection deadline expired
    #[error("connection timed out")]
    Timeout,

    /// A request line exceeded the line buffer
    #[error("request line overflows buffer")]
    BufferOverflow,

    /// The request URL carried a scheme this server does not speak
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
}

impl Error {
    /// Map the error onto the protocol-agnostic status set.
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidRequest(_) => Status::Invalid,
            Error::NotFound => Status::NotFound,
            Error::AuthRequired => Status::AuthRequired,
            Error::InternalIo(_) => Status::ServerError,
            Error::Timeout => Status::ServerError,
            Error::BufferOverflow => Status::Invalid,
            Error::UnsupportedScheme(_) => Status::Invalid,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
