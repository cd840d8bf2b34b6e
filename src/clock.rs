//! Wall-clock access and the timestamp formats used across the server.

use chrono::{DateTime, Local};

/// Export the configured zone so `chrono::Local` conversions track it.
///
/// Must run before the first `now()` call; libc caches the zone on first use.
pub fn set_timezone(tz: &str) {
    if !tz.is_empty() {
        std::env::set_var("TZ", tz);
    }
}

pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Access-log timestamp: `02/Aug/2026:10:30:00 +0200`.
pub fn access_log_stamp(t: &DateTime<Local>) -> String {
    t.format("%d/%b/%Y:%H:%M:%S %z").to_string()
}

/// Archive snapshot name: `20260802-103000`.
pub fn archive_stamp(t: &DateTime<Local>) -> String {
    t.format("%Y%m%d-%H%M%S").to_string()
}

/// Tinylog entry header: `2026-08-02 10:30 +02:00`.
pub fn tinylog_stamp(t: &DateTime<Local>) -> String {
    t.format("%Y-%m-%d %H:%M %Z").to_string()
}

/// Feed entry date: `2026-08-02`.
pub fn feed_date(t: &DateTime<Local>) -> String {
    t.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamps_have_expected_shape() {
        let t = Local.with_ymd_and_hms(2026, 8, 2, 10, 30, 0).unwrap();
        assert_eq!(archive_stamp(&t), "20260802-103000");
        assert_eq!(feed_date(&t), "2026-08-02");
        assert!(access_log_stamp(&t).starts_with("02/Aug/2026:10:30:00"));
    }
}
