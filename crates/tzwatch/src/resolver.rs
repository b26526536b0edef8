//! Resolution of a localtime-style symlink into a loaded time zone.

use std::path::MAIN_SEPARATOR;

use camino::{Utf8Path, Utf8PathBuf};
use chrono_tz::Tz;

use crate::error::WatchError;
use crate::events::ZoneUpdate;

/// Resolves the symlink at `path` into the time zone it points at.
///
/// Reads the raw link text (the target is deliberately not canonicalized)
/// and takes its last two path segments as the candidate zone identifier,
/// so a target such as `/usr/share/zoneinfo/America/New_York` resolves to
/// `America/New_York` without knowing where the zone-info tree lives.
///
/// # Known limitation
///
/// Zones with three-segment identifiers (for example
/// `America/Argentina/Buenos_Aires`) lose their first segment under this
/// scheme and fail the lookup with [`WatchError::UnknownZone`].
///
/// # Errors
///
/// - [`WatchError::LinkRead`] if `path` is missing or not a symlink.
/// - [`WatchError::NonUtf8Path`] if the link target is not valid UTF-8.
/// - [`WatchError::MalformedLink`] if the target has fewer than two path
///   segments.
/// - [`WatchError::UnknownZone`] if the candidate identifier is not in the
///   time-zone database.
pub fn resolve_symlink(path: &Utf8Path) -> Result<ZoneUpdate, WatchError> {
    let target = std::fs::read_link(path)
        .map_err(|source| WatchError::link_read(path.to_owned(), source))?;
    let target = Utf8PathBuf::try_from(target)
        .map_err(|error| WatchError::NonUtf8Path(error.into_path_buf()))?;

    let segments: Vec<&str> = target.as_str().split(MAIN_SEPARATOR).collect();
    let [.., region, city] = segments.as_slice() else {
        return Err(WatchError::MalformedLink(target));
    };

    let candidate = format!("{region}{MAIN_SEPARATOR}{city}");
    let zone = candidate
        .parse::<Tz>()
        .map_err(|_| WatchError::UnknownZone(candidate))?;

    Ok(ZoneUpdate::new(zone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn link_to(dir: &TempDir, name: &str, target: &str) -> Utf8PathBuf {
        let link = Utf8PathBuf::try_from(dir.path().join(name)).expect("non-UTF-8 temp path");
        symlink(target, &link).expect("failed to create symlink");
        link
    }

    #[test]
    fn test_resolves_zone_from_absolute_target() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let link = link_to(&dir, "localtime", "/usr/share/zoneinfo/America/New_York");

        let update = resolve_symlink(&link).expect("resolution failed");
        assert_eq!(update.zone, chrono_tz::America::New_York);
        assert_eq!(update.zone_id(), "America/New_York");
    }

    #[test]
    fn test_resolves_zone_from_relative_target() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let link = link_to(&dir, "localtime", "../usr/share/zoneinfo/Europe/Berlin");

        let update = resolve_symlink(&link).expect("resolution failed");
        assert_eq!(update.zone_id(), "Europe/Berlin");
    }

    #[test]
    fn test_resolves_zone_from_bare_two_segment_target() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let link = link_to(&dir, "localtime", "Australia/Sydney");

        let update = resolve_symlink(&link).expect("resolution failed");
        assert_eq!(update.zone_id(), "Australia/Sydney");
    }

    #[test]
    fn test_single_segment_target_is_malformed() {
        let dir = TempDir::new().expect("failed to create temp directory");
        // "UTC" is a real zone, but a one-segment target cannot be split
        // into Region/City and is rejected before any lookup.
        let link = link_to(&dir, "localtime", "UTC");

        let error = resolve_symlink(&link).expect_err("expected failure");
        assert!(matches!(error, WatchError::MalformedLink(_)));
        assert!(error.is_transient());
    }

    #[test]
    fn test_unknown_zone_is_rejected() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let link = link_to(&dir, "localtime", "/usr/share/zoneinfo/Nowhere/Atlantis");

        let error = resolve_symlink(&link).expect_err("expected failure");
        match error {
            WatchError::UnknownZone(zone) => assert_eq!(zone, "Nowhere/Atlantis"),
            other => panic!("expected UnknownZone, got {other:?}"),
        }
    }

    #[test]
    fn test_three_segment_identifier_loses_its_region() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let link = link_to(
            &dir,
            "localtime",
            "/usr/share/zoneinfo/America/Argentina/Buenos_Aires",
        );

        // Only the last two segments survive, and "Argentina/Buenos_Aires"
        // names no zone.
        let error = resolve_symlink(&link).expect_err("expected failure");
        match error {
            WatchError::UnknownZone(zone) => assert_eq!(zone, "Argentina/Buenos_Aires"),
            other => panic!("expected UnknownZone, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_path_is_a_link_read_error() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let missing = Utf8PathBuf::try_from(dir.path().join("localtime")).expect("non-UTF-8 path");

        let error = resolve_symlink(&missing).expect_err("expected failure");
        assert!(matches!(error, WatchError::LinkRead { .. }));
        assert!(error.is_transient());
    }

    #[test]
    fn test_regular_file_is_a_link_read_error() {
        let dir = TempDir::new().expect("failed to create temp directory");
        let file = Utf8PathBuf::try_from(dir.path().join("localtime")).expect("non-UTF-8 path");
        fs::write(&file, "TZif2").expect("failed to write file");

        let error = resolve_symlink(&file).expect_err("expected failure");
        assert!(matches!(error, WatchError::LinkRead { .. }));
    }
}
