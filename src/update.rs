//! Distribution tree refresh (maintenance flow).
//!
//! Operator-triggered counterpart to the acquisition hot path: optionally
//! runs a fresh build, then installs every architecture the build produced
//! into the canonical prebuilt tree and re-extracts the header archives.
//! The refresh is strictly additive. Installing arm64 output must never
//! delete or alter an existing x86_64 entry in the same OS directory, and
//! header extraction lands once at the tree root, not per architecture.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::archive::{self, HEADER_PREFIX};
use crate::builder::BuilderConfig;
use crate::error::AcquireError;
use crate::manifest::Manifest;
use crate::output::ARCH_DIR_PREFIX;
use crate::platform::PlatformKey;
use crate::tree::{self, BinaryTree};

/// Refresh the distribution tree from a build-output root.
///
/// With `build_binaries`, the external build runs first and
/// unconditionally; this flow always produces fresh output and is not
/// gated by any prebuilt check. The `key` supplies the OS segment the
/// copied architectures are filed under.
pub fn refresh(
    tree: &BinaryTree,
    builder: &BuilderConfig,
    build_root: &Path,
    key: &PlatformKey,
    build_binaries: bool,
) -> Result<()> {
    if build_binaries {
        println!("Building Nova physics from source...");
        builder.invoke_build()?;
    }

    if !build_root.is_dir() {
        return Err(AcquireError::SourceBuildIncomplete {
            build_root: build_root.to_path_buf(),
        }
        .into());
    }

    // The tree is created on demand, never assumed to pre-exist.
    fs::create_dir_all(tree.root())
        .with_context(|| format!("creating tree root '{}'", tree.root().display()))?;

    let mut manifest = Manifest::load(tree.root())?;
    let mut installed = 0usize;

    for entry in fs::read_dir(build_root)
        .with_context(|| format!("reading build output '{}'", build_root.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if path.is_dir() {
            let Some(arch) = name.strip_prefix(ARCH_DIR_PREFIX) else {
                continue;
            };
            let dest = tree.arch_dir(&PlatformKey::new(key.os.clone(), arch));
            fs::create_dir_all(&dest)
                .with_context(|| format!("creating '{}'", dest.display()))?;
            let copied = copy_dir_merge(&path, &dest)?;
            println!("  {}/{}: {} files installed", key.os, arch, copied);

            match tree::linkable_in(&dest) {
                Ok(binary) => manifest.record(&key.os, arch, &binary)?,
                Err(err) => eprintln!("  warning: {arch} not recorded in manifest: {err}"),
            }
            installed += 1;
        } else if path.extension().is_some_and(|ext| ext == "gz") {
            println!("  extracting headers from {}", name);
            archive::extract_headers(&path, HEADER_PREFIX, tree.root())?;
        }
    }

    manifest.save(tree.root())?;
    println!(
        "Refreshed {} architecture(s) under '{}'",
        installed,
        tree.root().display()
    );
    Ok(())
}

/// Recursively copy `src` into `dst`, merging with whatever is already
/// there. Existing files are overwritten one by one; files and directories
/// present only in `dst` are left alone, which is what makes successive
/// per-architecture refreshes safe against each other.
pub fn copy_dir_merge(src: &Path, dst: &Path) -> Result<usize> {
    if !dst.exists() {
        fs::create_dir_all(dst)
            .with_context(|| format!("creating directory '{}'", dst.display()))?;
    }

    let mut copied = 0usize;
    for entry in
        fs::read_dir(src).with_context(|| format!("reading directory '{}'", src.display()))?
    {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            let target = fs::read_link(&src_path)?;
            if dst_path.exists() || dst_path.is_symlink() {
                fs::remove_file(&dst_path)?;
            }
            #[cfg(unix)]
            std::os::unix::fs::symlink(&target, &dst_path)
                .with_context(|| format!("creating symlink '{}'", dst_path.display()))?;
            #[cfg(not(unix))]
            fs::copy(&src_path, &dst_path)
                .with_context(|| format!("copying '{}'", src_path.display()))?;
            copied += 1;
        } else if file_type.is_dir() {
            copied += copy_dir_merge(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)
                .with_context(|| format!("copying '{}'", src_path.display()))?;
            copied += 1;
        }
    }

    Ok(copied)
}
