//! Compile-time build metadata for the CLI and outbound requests.

/// Package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short commit hash captured by `build.rs`.
pub const GIT_COMMIT: &str = env!("BOOKVAULT_BUILD_GIT_HASH");

/// UTC build timestamp captured by `build.rs`.
pub const BUILD_TIMESTAMP: &str = env!("BOOKVAULT_BUILD_TIMESTAMP");

/// `User-Agent` value sent with every backend request.
pub fn user_agent() -> String {
    format!("bookvault/{VERSION} ({GIT_COMMIT})")
}

/// Version block printed by `bookvault --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("BOOKVAULT_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("BOOKVAULT_BUILD_TIMESTAMP")
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_names_crate_and_commit() {
        let ua = user_agent();
        assert!(ua.starts_with("bookvault/"));
        assert!(ua.contains(GIT_COMMIT));
    }

    #[test]
    fn long_version_lists_metadata_lines() {
        let text = LONG_VERSION;
        assert!(text.starts_with(VERSION));
        assert!(text.contains("commit:"));
        assert!(text.contains("built:"));
    }
}
