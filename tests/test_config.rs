use kore::config::Config;

#[test]
fn test_parse_full_config() {
    let text = "\
# kore configuration
hostname=capsule.example.org
titan=sekrit
ddns=abcdef123456
tz=Europe/Berlin
wifi=homenet,hunter2
mime=gmi,0,text/gemini
mime=flac,s,audio/flac
mdns=yes
";
    let cfg = Config::parse(text);

    assert_eq!(cfg.fqdn, "capsule.example.org");
    assert_eq!(cfg.host, "capsule");
    assert_eq!(cfg.titan_token.as_deref(), Some("sekrit"));
    assert_eq!(cfg.ddns_token.as_deref(), Some("abcdef123456"));
    assert_eq!(cfg.timezone, "Europe/Berlin");
    assert!(cfg.mdns_enabled);
    assert_eq!(cfg.wifi_aps.len(), 1);
    assert_eq!(cfg.wifi_aps[0], ("homenet".to_string(), "hunter2".to_string()));
    assert_eq!(cfg.mime.lookup("flac"), ("audio/flac", 's'));
}

#[test]
fn test_parse_crlf_and_comments() {
    let cfg = Config::parse("# comment\r\nhostname=box.lan\r\n\r\n# more\r\nmdns=no\r\n");
    assert_eq!(cfg.fqdn, "box.lan");
    assert_eq!(cfg.host, "box");
    assert!(!cfg.mdns_enabled);
}

#[test]
fn test_mdns_truthiness() {
    for (value, expected) in [
        ("yes", true),
        ("1", true),
        ("true", true),
        ("no", false),
        ("Never", false),
        ("0", false),
    ] {
        let cfg = Config::parse(&format!("mdns={value}"));
        assert_eq!(cfg.mdns_enabled, expected, "mdns={value}");
    }
}

#[test]
fn test_value_may_contain_equals() {
    let cfg = Config::parse("titan=a=b=c");
    assert_eq!(cfg.titan_token.as_deref(), Some("a=b=c"));
}

#[test]
fn test_defaults_when_empty() {
    let cfg = Config::parse("");
    assert_eq!(cfg.fqdn, "localhost");
    assert_eq!(cfg.host, "localhost");
    assert!(cfg.titan_token.is_none());
    assert!(cfg.mdns_enabled);
    // built-in MIME defaults still present
    assert_eq!(cfg.mime.lookup("gmi"), ("text/gemini", '0'));
}

#[test]
fn test_configured_mime_precedes_defaults() {
    let cfg = Config::parse("mime=gmi,1,application/x-custom");
    assert_eq!(cfg.mime.lookup("gmi"), ("application/x-custom", '1'));
}

#[test]
fn test_single_label_hostname() {
    let cfg = Config::parse("hostname=box");
    assert_eq!(cfg.fqdn, "box");
    assert_eq!(cfg.host, "box");
}
