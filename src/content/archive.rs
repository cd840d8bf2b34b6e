//! Pre-replacement snapshots.
//!
//! Before the tinylog inserter or the Titan receiver replaces a file, the
//! current version is copied under `<root>/archive/<orig-rel-path>/<stamp>`.
//! Rename-over-archive keeps an older copy reachable if a write is
//! interrupted.

use std::path::Path;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::clock;

/// Snapshot `target` (a path under `root`) into the archive tree.
///
/// A missing target is not an error; there is simply nothing to snapshot.
pub fn snapshot(root: &Path, target: &Path, now: &DateTime<Local>) -> std::io::Result<()> {
    if !target.is_file() {
        return Ok(());
    }

    let rel = target.strip_prefix(root).unwrap_or(target);
    let slot = root.join("archive").join(rel);
    std::fs::create_dir_all(&slot)?;

    let copy = slot.join(clock::archive_stamp(now));
    std::fs::copy(target, &copy)?;
    debug!("archived {} -> {}", target.display(), copy.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snapshot_lands_under_archive_with_stamp_name() {
        let root = tempfile::tempdir().unwrap();
        let vhost = root.path().join("example.org/notes");
        std::fs::create_dir_all(&vhost).unwrap();
        let target = vhost.join("x.gmi");
        std::fs::write(&target, b"old contents").unwrap();

        let t = Local.with_ymd_and_hms(2026, 8, 2, 10, 30, 0).unwrap();
        snapshot(root.path(), &target, &t).unwrap();

        let copy = root
            .path()
            .join("archive/example.org/notes/x.gmi/20260802-103000");
        assert_eq!(std::fs::read(copy).unwrap(), b"old contents");
    }

    #[test]
    fn missing_target_is_a_noop() {
        let root = tempfile::tempdir().unwrap();
        let t = Local.with_ymd_and_hms(2026, 8, 2, 10, 30, 0).unwrap();
        snapshot(root.path(), &root.path().join("absent.gmi"), &t).unwrap();
        assert!(!root.path().join("archive").exists());
    }
}
