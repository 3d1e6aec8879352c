//! Acquisition policy.
//!
//! The one decision function the rest of the pipeline exists for: "use the
//! existing prebuilt artifact", "build from source", or "fail with a
//! diagnosed reason". All inputs arrive in an explicit [`AcquireConfig`];
//! the only place ambient process state is read is the
//! [`AcquireConfig::from_env`] constructor at the CLI boundary, which keeps
//! the policy itself testable with injected configurations.
//!
//! There are no retries: every failure is terminal for the run and carries
//! its own diagnostic (see [`crate::error::AcquireError`]).

use std::env;
use std::path::{Path, PathBuf};

use crate::builder::BuilderConfig;
use crate::error::AcquireError;
use crate::output;
use crate::platform::PlatformKey;
use crate::tree::{self, BinaryTree, DEFAULT_TREE_DIR};

/// Environment directive forcing prebuilt binaries (no build fallback).
pub const FORCE_BINARIES_ENV: &str = "FORCE_NOVA_BINARIES";

/// Environment directive forcing a source build (prebuilt check skipped).
pub const FORCE_SOURCE_ENV: &str = "NOVA_BUILD_FROM_SOURCE";

/// Directory of the Nova physics checkout next to the package root.
pub const SOURCE_DIR: &str = "nova-physics";

/// Build-output root produced by the external build tool, relative to the
/// source checkout.
pub const BUILD_OUTPUT_DIR: &str = "build";

/// How a miss in the prebuilt tree is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireMode {
    /// Default: use a prebuilt artifact when present, build otherwise.
    PreferPrebuilt,
    /// Prebuilt only; a miss is terminal and the build tool never runs.
    ForcePrebuilt,
    /// Build only; the prebuilt tree is not consulted.
    ForceBuild,
}

/// Everything one acquisition run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    pub mode: AcquireMode,
    pub key: PlatformKey,
    pub tree: BinaryTree,
    pub builder: BuilderConfig,
    pub build_root: PathBuf,
}

impl AcquireConfig {
    /// Resolve a configuration for `package_dir` from the process
    /// environment. The force directives are mutually exclusive; if both
    /// are set, forcing prebuilt wins (the stricter, non-mutating choice).
    pub fn from_env(package_dir: &Path) -> Self {
        let mode = if env::var_os(FORCE_BINARIES_ENV).is_some() {
            AcquireMode::ForcePrebuilt
        } else if env::var_os(FORCE_SOURCE_ENV).is_some() {
            AcquireMode::ForceBuild
        } else {
            AcquireMode::PreferPrebuilt
        };
        Self::for_package_dir(package_dir, mode)
    }

    /// Standard layout rooted at `package_dir`: the prebuilt tree in
    /// `nova-binaries/` and the source checkout in `nova-physics/`.
    pub fn for_package_dir(package_dir: &Path, mode: AcquireMode) -> Self {
        let source_dir = package_dir.join(SOURCE_DIR);
        Self {
            mode,
            key: PlatformKey::from_host(),
            tree: BinaryTree::new(package_dir.join(DEFAULT_TREE_DIR)),
            builder: BuilderConfig::for_source_dir(&source_dir),
            build_root: source_dir.join(BUILD_OUTPUT_DIR),
        }
    }
}

/// Where a resolved artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOrigin {
    Prebuilt,
    FreshlyBuilt,
}

/// Successful outcome of an acquisition run.
#[derive(Debug, Clone)]
pub struct Acquired {
    /// The linkable binary to hand to the extension linker.
    pub path: PathBuf,
    pub origin: ArtifactOrigin,
}

/// Run the acquisition state machine to completion.
///
/// The prebuilt branch has no side effects on disk; the build branch shells
/// out to the external tool and then verifies its filesystem contract. A
/// forced-prebuilt miss reports precisely which half of the platform key is
/// unsupported.
pub fn acquire(config: &AcquireConfig) -> Result<Acquired, AcquireError> {
    match config.mode {
        AcquireMode::ForcePrebuilt => {
            let dir = config
                .tree
                .find_prebuilt(&config.key)
                .ok_or_else(|| config.tree.classify_miss(&config.key))?;
            resolve_prebuilt(&dir)
        }
        AcquireMode::ForceBuild => build_and_resolve(config),
        AcquireMode::PreferPrebuilt => match config.tree.find_prebuilt(&config.key) {
            Some(dir) => resolve_prebuilt(&dir),
            None => build_and_resolve(config),
        },
    }
}

fn resolve_prebuilt(dir: &Path) -> Result<Acquired, AcquireError> {
    let path = tree::linkable_in(dir)?;
    Ok(Acquired {
        path,
        origin: ArtifactOrigin::Prebuilt,
    })
}

fn build_and_resolve(config: &AcquireConfig) -> Result<Acquired, AcquireError> {
    config.builder.invoke_build()?;
    let path = output::resolve_built_artifact(&config.build_root, &config.key)?;
    Ok(Acquired {
        path,
        origin: ArtifactOrigin::FreshlyBuilt,
    })
}
