//! Host platform detection.
//!
//! Maps the running host to the canonical (OS, architecture) key used to
//! address artifacts in the prebuilt distribution tree. The matcher never
//! fails: unrecognized names pass through verbatim and downstream lookups
//! treat them as "not found".

use std::env;
use std::fmt;

/// Canonical (OS, architecture) pair.
///
/// The same key addresses both halves of the pipeline: reading an existing
/// prebuilt artifact and placing a freshly built one. Constructing the key
/// in one place keeps those halves from diverging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformKey {
    /// OS name in the distribution tree's spelling (`Linux`, `Darwin`, ...).
    pub os: String,
    /// Machine architecture name (`x86_64`, `arm64`, ...).
    pub arch: String,
}

impl PlatformKey {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Resolve the key for the running host. Pure, infallible.
    pub fn from_host() -> Self {
        Self::from_parts(env::consts::OS, env::consts::ARCH)
    }

    fn from_parts(os: &str, arch: &str) -> Self {
        // The distribution tree uses uname-style OS spellings.
        let os = match os {
            "linux" => "Linux",
            "macos" => "Darwin",
            "windows" => "Windows",
            other => other,
        };
        // Apple silicon reports arm64 in the tree, not aarch64.
        let arch = match (os, arch) {
            ("Darwin", "aarch64") => "arm64",
            (_, other) => other,
        };
        Self::new(os, arch)
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_os_names_are_canonicalized() {
        assert_eq!(PlatformKey::from_parts("linux", "x86_64").os, "Linux");
        assert_eq!(PlatformKey::from_parts("macos", "x86_64").os, "Darwin");
        assert_eq!(PlatformKey::from_parts("windows", "x86_64").os, "Windows");
    }

    #[test]
    fn apple_silicon_maps_to_arm64() {
        let key = PlatformKey::from_parts("macos", "aarch64");
        assert_eq!(key.os, "Darwin");
        assert_eq!(key.arch, "arm64");
    }

    #[test]
    fn unknown_names_pass_through_verbatim() {
        let key = PlatformKey::from_parts("plan9", "mips64");
        assert_eq!(key.os, "plan9");
        assert_eq!(key.arch, "mips64");
    }

    #[test]
    fn from_host_never_panics() {
        let key = PlatformKey::from_host();
        assert!(!key.os.is_empty());
        assert!(!key.arch.is_empty());
    }
}
