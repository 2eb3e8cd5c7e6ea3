//! Build metadata injected by `build.rs`.

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build number (from CI or default to 0)
pub const BUILD_NUMBER: &str = env!("BUILD_NUMBER");

/// Git commit hash (short form)
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

/// Build timestamp (RFC3339 format)
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");

/// Version line printed by `statusgen version`.
///
/// ```
/// use statusgen::version::full_version;
///
/// assert!(full_version().starts_with("statusgen v"));
/// ```
pub fn full_version() -> String {
    format!(
        "statusgen v{} (build {}, commit {}, built {})",
        VERSION, BUILD_NUMBER, GIT_COMMIT, BUILD_TIMESTAMP
    )
}

/// `User-Agent` sent to the issue tracker.
pub fn user_agent() -> String {
    format!("statusgen/{}", VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_metadata_present() {
        assert!(!VERSION.is_empty());
        assert!(!BUILD_NUMBER.is_empty());
        assert!(!GIT_COMMIT.is_empty());
        assert!(!BUILD_TIMESTAMP.is_empty());
    }

    #[test]
    fn test_full_version_mentions_commit() {
        let version = full_version();
        assert!(version.contains(VERSION));
        assert!(version.contains(GIT_COMMIT));
    }

    #[test]
    fn test_user_agent() {
        assert_eq!(user_agent(), format!("statusgen/{}", VERSION));
    }
}
