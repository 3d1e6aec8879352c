//! Refresh manifest for the prebuilt distribution tree.
//!
//! `manifest.json` at the tree root records, per (OS, architecture), the
//! digest of the linkable binary last installed by a distribution refresh.
//! It is informational only: the locator decides by directory existence,
//! never by the manifest. Merging is additive, mirroring the tree's own
//! invariant that refreshing one platform must not disturb the others.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Manifest filename at the tree root.
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub binary: String,
    pub sha256: String,
    pub size_bytes: u64,
    pub stored_at_unix: u64,
}

/// OS name -> architecture name -> latest installed binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub platforms: BTreeMap<String, BTreeMap<String, ManifestEntry>>,
}

impl Manifest {
    /// Load the manifest from a tree root, empty if none exists yet.
    pub fn load(tree_root: &Path) -> Result<Self> {
        let path = tree_root.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&path)
            .with_context(|| format!("reading manifest '{}'", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing manifest '{}'", path.display()))
    }

    /// Write the manifest back to the tree root.
    pub fn save(&self, tree_root: &Path) -> Result<()> {
        let path = tree_root.join(MANIFEST_FILE);
        let bytes = serde_json::to_vec_pretty(self).context("serializing manifest")?;
        fs::write(&path, bytes)
            .with_context(|| format!("writing manifest '{}'", path.display()))
    }

    /// Record the linkable binary installed for (os, arch). Additive: other
    /// platforms' entries are untouched.
    pub fn record(&mut self, os: &str, arch: &str, binary: &Path) -> Result<()> {
        let (sha256, size_bytes) = sha256_file(binary)?;
        let name = binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.platforms.entry(os.to_string()).or_default().insert(
            arch.to_string(),
            ManifestEntry {
                binary: name,
                sha256,
                size_bytes,
                stored_at_unix: unix_now(),
            },
        );
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Hash a file, returning (hex digest, size in bytes).
pub fn sha256_file(path: &Path) -> Result<(String, u64)> {
    let file =
        File::open(path).with_context(|| format!("opening '{}' for hashing", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut total: u64 = 0;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((format!("{:x}", hasher.finalize()), total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_of_missing_manifest_is_empty() {
        let temp = TempDir::new().unwrap();
        let manifest = Manifest::load(temp.path()).unwrap();
        assert!(manifest.platforms.is_empty());
    }

    #[test]
    fn record_merges_without_disturbing_other_platforms() {
        let temp = TempDir::new().unwrap();
        let binary = temp.path().join("libnova.so");
        fs::write(&binary, b"elf bytes").unwrap();

        let mut manifest = Manifest::default();
        manifest.record("Linux", "x86_64", &binary).unwrap();
        manifest.record("Linux", "arm64", &binary).unwrap();
        manifest.save(temp.path()).unwrap();

        let mut reloaded = Manifest::load(temp.path()).unwrap();
        reloaded.record("Windows", "x86_64", &binary).unwrap();

        assert_eq!(reloaded.platforms["Linux"].len(), 2);
        assert_eq!(
            reloaded.platforms["Linux"]["x86_64"].binary,
            "libnova.so"
        );
        assert!(reloaded.platforms.contains_key("Windows"));
    }

    #[test]
    fn sha256_file_reports_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob");
        fs::write(&path, b"0123456789").unwrap();
        let (digest, size) = sha256_file(&path).unwrap();
        assert_eq!(size, 10);
        assert_eq!(digest.len(), 64);
    }
}
