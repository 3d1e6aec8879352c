//! Prebuilt binary distribution tree.
//!
//! Layout contract:
//!
//! ```text
//! nova-binaries/
//! ├── include/              platform-independent headers, stored once
//! ├── Linux/
//! │   └── lib/
//! │       ├── x86_64/       libnova.so plus auxiliary files
//! │       └── arm64/
//! └── Windows/
//!     └── lib/
//!         └── x86_64/       libnova.dll
//! ```
//!
//! The tree is read by the acquisition hot path and mutated only by the
//! distribution updater. Lookups decide by directory existence alone: the
//! locator never errors, it answers "present" or "absent" and leaves the
//! precise diagnostic to [`BinaryTree::classify_miss`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AcquireError;
use crate::platform::PlatformKey;

/// Default tree directory name next to the package root.
pub const DEFAULT_TREE_DIR: &str = "nova-binaries";

/// Fixed path segment between the OS directory and the arch directories.
pub const LIB_SEGMENT: &str = "lib";

/// Directory holding the platform-independent header tree.
pub const INCLUDE_DIR: &str = "include";

/// Filename stem identifying the linkable binary, extension-independent
/// (`libnova.so`, `libnova.dll`, `libnova.dylib` all qualify).
pub const LINKABLE_STEM: &str = "libnova";

/// Handle on a prebuilt distribution tree rooted at one directory.
#[derive(Debug, Clone)]
pub struct BinaryTree {
    root: PathBuf,
}

impl BinaryTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// OS-level directory for a key, whether or not it exists.
    pub fn os_dir(&self, key: &PlatformKey) -> PathBuf {
        self.root.join(&key.os)
    }

    /// Architecture-level directory for a key, whether or not it exists.
    pub fn arch_dir(&self, key: &PlatformKey) -> PathBuf {
        self.os_dir(key).join(LIB_SEGMENT).join(&key.arch)
    }

    /// Header destination at the tree root.
    pub fn include_dir(&self) -> PathBuf {
        self.root.join(INCLUDE_DIR)
    }

    /// Locate the prebuilt artifact directory for a key.
    ///
    /// Some iff both the OS directory and the architecture directory exist.
    /// Never errors: unknown keys simply miss.
    pub fn find_prebuilt(&self, key: &PlatformKey) -> Option<PathBuf> {
        if !self.os_dir(key).is_dir() {
            return None;
        }
        let arch_dir = self.arch_dir(key);
        arch_dir.is_dir().then_some(arch_dir)
    }

    /// Every (OS, arch) pair currently present in the tree, sorted.
    ///
    /// Maintenance/diagnostic view only; the acquisition path never
    /// enumerates, it looks up the one key it was given.
    pub fn installed_keys(&self) -> Vec<PlatformKey> {
        let mut keys = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root)
            .min_depth(3)
            .max_depth(3)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            // Only {root}/{os}/lib/{arch} shapes count.
            let Some(lib) = path.parent() else { continue };
            if lib.file_name() != Some(std::ffi::OsStr::new(LIB_SEGMENT)) {
                continue;
            }
            let Some(os) = lib.parent().and_then(|p| p.file_name()) else {
                continue;
            };
            let Some(arch) = path.file_name() else { continue };
            keys.push(PlatformKey::new(
                os.to_string_lossy(),
                arch.to_string_lossy(),
            ));
        }
        keys.sort_by(|a, b| (&a.os, &a.arch).cmp(&(&b.os, &b.arch)));
        keys
    }

    /// Diagnose a [`BinaryTree::find_prebuilt`] miss precisely.
    ///
    /// An OS directory that exists without the architecture subtree is
    /// "unsupported architecture", a different operator problem from
    /// "unsupported OS entirely".
    pub fn classify_miss(&self, key: &PlatformKey) -> AcquireError {
        if self.os_dir(key).is_dir() {
            AcquireError::UnsupportedArchitecture {
                os: key.os.clone(),
                arch: key.arch.clone(),
            }
        } else {
            AcquireError::UnsupportedPlatform { os: key.os.clone() }
        }
    }
}

/// Pick the single linkable binary out of an artifact directory.
///
/// Scans immediate entries only, matching by filename stem so the
/// platform-specific extension is irrelevant. Zero candidates is an
/// internal-consistency violation (the layout promised a binary), and more
/// than one is ambiguous rather than first-match-wins: filesystem
/// enumeration order is not stable across platforms.
pub fn linkable_in(dir: &Path) -> Result<PathBuf, AcquireError> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if path.file_stem().is_some_and(|stem| stem == LINKABLE_STEM) {
            candidates.push(path);
        }
    }

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(AcquireError::ArtifactDirectoryEmpty {
            dir: dir.to_path_buf(),
            stem: LINKABLE_STEM,
        }),
        count => Err(AcquireError::AmbiguousArtifact {
            dir: dir.to_path_buf(),
            stem: LINKABLE_STEM,
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn tree_with(entries: &[&str]) -> (TempDir, BinaryTree) {
        let temp = TempDir::new().unwrap();
        for entry in entries {
            fs::create_dir_all(temp.path().join(entry)).unwrap();
        }
        let tree = BinaryTree::new(temp.path());
        (temp, tree)
    }

    #[test]
    fn find_prebuilt_hits_when_both_levels_exist() {
        let (_temp, tree) = tree_with(&["Linux/lib/x86_64"]);
        let key = PlatformKey::new("Linux", "x86_64");
        let found = tree.find_prebuilt(&key).unwrap();
        assert!(found.ends_with("Linux/lib/x86_64"));
    }

    #[test]
    fn find_prebuilt_misses_without_error() {
        let (_temp, tree) = tree_with(&["Linux/lib/x86_64"]);
        assert!(tree
            .find_prebuilt(&PlatformKey::new("Windows", "x86_64"))
            .is_none());
        assert!(tree
            .find_prebuilt(&PlatformKey::new("Linux", "arm64"))
            .is_none());
    }

    #[test]
    fn miss_with_os_tree_is_unsupported_architecture() {
        let (_temp, tree) = tree_with(&["Linux/lib/x86_64"]);
        let err = tree.classify_miss(&PlatformKey::new("Linux", "arm64"));
        assert!(matches!(
            err,
            AcquireError::UnsupportedArchitecture { .. }
        ));
    }

    #[test]
    fn miss_without_os_tree_is_unsupported_platform() {
        let (_temp, tree) = tree_with(&["Linux/lib/x86_64"]);
        let err = tree.classify_miss(&PlatformKey::new("Haiku", "x86_64"));
        assert!(matches!(err, AcquireError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn installed_keys_lists_only_well_shaped_entries() {
        let (_temp, tree) = tree_with(&[
            "Linux/lib/x86_64",
            "Linux/lib/arm64",
            "Windows/lib/x86_64",
            "include/novaphysics",
            "Linux/doc/extra",
        ]);
        let keys = tree.installed_keys();
        assert_eq!(
            keys,
            vec![
                PlatformKey::new("Linux", "arm64"),
                PlatformKey::new("Linux", "x86_64"),
                PlatformKey::new("Windows", "x86_64"),
            ]
        );
    }

    #[test]
    fn linkable_matches_by_stem_regardless_of_extension() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("libnova.dll")).unwrap();
        File::create(temp.path().join("README.txt")).unwrap();
        File::create(temp.path().join("nova.lib")).unwrap();

        let found = linkable_in(temp.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "libnova.dll");
    }

    #[test]
    fn linkable_ignores_subdirectories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("libnova")).unwrap();
        File::create(temp.path().join("libnova.so")).unwrap();

        let found = linkable_in(temp.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "libnova.so");
    }

    #[test]
    fn empty_directory_is_a_distinct_error() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("unrelated.o")).unwrap();

        let err = linkable_in(temp.path()).unwrap_err();
        assert!(matches!(err, AcquireError::ArtifactDirectoryEmpty { .. }));
    }

    #[test]
    fn two_candidates_are_ambiguous_not_first_match() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("libnova.so")).unwrap();
        File::create(temp.path().join("libnova.a")).unwrap();

        let err = linkable_in(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            AcquireError::AmbiguousArtifact { count: 2, .. }
        ));
    }
}
