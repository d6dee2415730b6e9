//! Utility functions shared across CLI commands

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use chrono::DateTime;

/// Current working directory as a UTF-8 path
pub fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("Current directory is not valid UTF-8: {}", p.display()))
}

/// Render an RFC3339 timestamp as `YYYY-MM-DD HH:MM:SS`
///
/// Unparseable input keeps its date and time, minus fractional seconds.
pub fn format_timestamp(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => timestamp
            .split('.')
            .next()
            .unwrap_or(timestamp)
            .replace('T', " "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2023-05-01T12:30:45.123456Z"),
            "2023-05-01 12:30:45"
        );
        assert_eq!(
            format_timestamp("2023-05-01T14:30:45+02:00"),
            "2023-05-01 12:30:45"
        );
    }

    #[test]
    fn test_format_timestamp_fallback() {
        assert_eq!(format_timestamp("2023-05-01T12:30:45.5"), "2023-05-01 12:30:45");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
