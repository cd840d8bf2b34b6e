use crate::proto::Proto;

/// Protocol-agnostic response status.
///
/// Every response is classified into one of these before the writer maps it
/// onto the requesting protocol's own numbering:
///
/// | Status | Gemini | Spartan | HTTP | Gopher |
/// |---|---|---|---|---|
/// | `Ok` | 20 | 2 | 200 | (inline) |
/// | `Input` | 10 | 2 | 200 | (inline) |
/// | `Password` | 11 | 2 | 200 | (inline) |
/// | `Redir` | 30 | 3 | 301 | redirect line |
/// | `Moved` | 31 | 3 | 301 | redirect line |
/// | `NotFound` | 51 | 4 | 404 | info line |
/// | `Invalid` | 59 | 4 | 500 | info line |
/// | `ServerError` | 59 | 5 | 500 | info line |
/// | `AuthRequired` | 61 | 5 | 403 | info line |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Input,
    Password,
    Redir,
    Moved,
    NotFound,
    Invalid,
    ServerError,
    AuthRequired,
}

impl Status {
    /// Returns the numeric wire code for the given protocol.
    ///
    /// Gopher has no status line on the wire; for logging purposes it shares
    /// the HTTP numbering.
    pub fn code(&self, proto: Proto) -> u16 {
        match proto {
            Proto::Gemini => match self {
                Status::Ok => 20,
                Status::Input => 10,
                Status::Password => 11,
                Status::Redir => 30,
                Status::Moved => 31,
                Status::NotFound => 51,
                Status::Invalid => 59,
                Status::ServerError => 59,
                Status::AuthRequired => 61,
            },
            Proto::Spartan => match self {
                Status::Ok | Status::Input | Status::Password => 2,
                Status::Redir | Status::Moved => 3,
                Status::NotFound | Status::Invalid => 4,
                Status::ServerError | Status::AuthRequired => 5,
            },
            Proto::Http | Proto::Gopher => match self {
                Status::Ok | Status::Input | Status::Password => 200,
                Status::Redir | Status::Moved => 301,
                Status::NotFound => 404,
                Status::Invalid | Status::ServerError => 500,
                Status::AuthRequired => 403,
            },
        }
    }

    /// True for the two redirect statuses.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Status::Redir | Status::Moved)
    }
}
