//! Minimum-version gate for commands that talk to versioned backends

use crate::error::{Error, Result};
use semver::Version;

/// Current CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fail when `current` is older than `required`; no requirement passes
pub fn check_min_required_version(required: Option<&str>, current: &str) -> Result<()> {
    let Some(required) = required else {
        return Ok(());
    };

    let min = Version::parse(required).map_err(|_| Error::invalid_version(required))?;
    let have = Version::parse(current).map_err(|_| Error::invalid_version(current))?;

    if have < min {
        return Err(Error::VersionTooOld {
            required: required.to_string(),
            current: current.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_requirement_passes() {
        assert!(check_min_required_version(None, "0.0.1").is_ok());
    }

    #[test]
    fn test_older_version_fails() {
        let err = check_min_required_version(Some("2.0.0"), "1.9.9").unwrap_err();
        assert!(matches!(err, Error::VersionTooOld { .. }));
    }

    #[test]
    fn test_equal_and_newer_pass() {
        assert!(check_min_required_version(Some("1.2.3"), "1.2.3").is_ok());
        assert!(check_min_required_version(Some("1.2.3"), "1.10.0").is_ok());
    }

    #[test]
    fn test_garbage_version_is_reported() {
        assert!(matches!(
            check_min_required_version(Some("latest"), "1.0.0"),
            Err(Error::InvalidVersion { .. })
        ));
    }
}
