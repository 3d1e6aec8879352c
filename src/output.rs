//! Build output resolution.
//!
//! A zero exit status from the external build tool only means the process
//! ran cleanly. Whether a usable artifact exists is verified here, against
//! the tool's filesystem contract: a build-output root containing one
//! `libnova_{arch}` directory per built architecture. Each verification
//! step has its own failure kind so an operator can tell "the tool lied
//! about success" from "it built, but not for this architecture" from "the
//! directory is there but the binary is not".

use std::path::{Path, PathBuf};

use crate::error::AcquireError;
use crate::platform::PlatformKey;
use crate::tree;

/// Prefix of per-architecture directories inside the build-output root.
pub const ARCH_DIR_PREFIX: &str = "libnova_";

/// Per-architecture directory name for a key.
pub fn arch_output_dir(build_root: &Path, key: &PlatformKey) -> PathBuf {
    build_root.join(format!("{ARCH_DIR_PREFIX}{}", key.arch))
}

/// Locate the linkable binary produced by a successful build.
///
/// Only called after the build tool exited zero. Fails with
/// [`AcquireError::SourceBuildIncomplete`] if the output root itself is
/// missing, [`AcquireError::NoArtifactForArchitecture`] if the root exists
/// but holds nothing for this architecture, and the stem-scan errors from
/// [`tree::linkable_in`] if the directory exists but its contents break
/// the one-linkable-binary contract.
pub fn resolve_built_artifact(
    build_root: &Path,
    key: &PlatformKey,
) -> Result<PathBuf, AcquireError> {
    if !build_root.is_dir() {
        return Err(AcquireError::SourceBuildIncomplete {
            build_root: build_root.to_path_buf(),
        });
    }

    let arch_dir = arch_output_dir(build_root, key);
    if !arch_dir.is_dir() {
        return Err(AcquireError::NoArtifactForArchitecture {
            arch: key.arch.clone(),
            dir: arch_dir,
        });
    }

    tree::linkable_in(&arch_dir)
}
