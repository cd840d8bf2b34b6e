use kore::proto::Proto;
use kore::status::Status;

const TABLE: &[(Status, u16, u16, u16)] = &[
    // (status, gemini, spartan, http)
    (Status::Ok, 20, 2, 200),
    (Status::Input, 10, 2, 200),
    (Status::Password, 11, 2, 200),
    (Status::Redir, 30, 3, 301),
    (Status::Moved, 31, 3, 301),
    (Status::NotFound, 51, 4, 404),
    (Status::Invalid, 59, 4, 500),
    (Status::ServerError, 59, 5, 500),
    (Status::AuthRequired, 61, 5, 403),
];

#[test]
fn test_per_protocol_codes_are_bit_exact() {
    for (status, gemini, spartan, http) in TABLE {
        assert_eq!(status.code(Proto::Gemini), *gemini, "{status:?} gemini");
        assert_eq!(status.code(Proto::Spartan), *spartan, "{status:?} spartan");
        assert_eq!(status.code(Proto::Http), *http, "{status:?} http");
    }
}

#[test]
fn test_redirect_classification() {
    assert!(Status::Redir.is_redirect());
    assert!(Status::Moved.is_redirect());
    assert!(!Status::Ok.is_redirect());
    assert!(!Status::NotFound.is_redirect());
}
