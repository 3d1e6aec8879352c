use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use nova_acquire::policy::{acquire, AcquireConfig, AcquireMode};
use nova_acquire::update::refresh;
use nova_acquire::{preflight, ArtifactOrigin};

fn usage() -> &'static str {
    "Usage:\n  nova-acquire acquire\n  nova-acquire update-binaries [--no-build]\n  nova-acquire status\n\nEnvironment:\n  FORCE_NOVA_BINARIES      require a prebuilt binary, never build\n  NOVA_BUILD_FROM_SOURCE   always build, skip the prebuilt tree"
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [cmd] if cmd == "acquire" => cmd_acquire(),
        [cmd] if cmd == "update-binaries" => cmd_update_binaries(true),
        [cmd, flag] if cmd == "update-binaries" && flag == "--no-build" => {
            cmd_update_binaries(false)
        }
        [cmd] if cmd == "status" => cmd_status(),
        _ => bail!(usage()),
    }
}

fn package_dir() -> Result<PathBuf> {
    std::env::current_dir().context("resolving current directory")
}

fn cmd_acquire() -> Result<()> {
    let config = AcquireConfig::from_env(&package_dir()?);

    // Fail with an install hint before shelling out, but only when this
    // run can actually reach the build step.
    let may_build = config.mode != AcquireMode::ForcePrebuilt
        && (config.mode == AcquireMode::ForceBuild
            || config.tree.find_prebuilt(&config.key).is_none());
    if may_build {
        preflight::check_builder_available(&config.builder.program, &config.builder.script)?;
    }

    let acquired = acquire(&config)?;
    match acquired.origin {
        ArtifactOrigin::Prebuilt => println!("Using prebuilt binary for {}", config.key),
        ArtifactOrigin::FreshlyBuilt => println!("Built Nova physics for {}", config.key),
    }
    println!("{}", acquired.path.display());
    Ok(())
}

fn cmd_update_binaries(build_binaries: bool) -> Result<()> {
    let config = AcquireConfig::from_env(&package_dir()?);
    if build_binaries {
        preflight::check_builder_available(&config.builder.program, &config.builder.script)?;
    }
    refresh(
        &config.tree,
        &config.builder,
        &config.build_root,
        &config.key,
        build_binaries,
    )
}

fn cmd_status() -> Result<()> {
    let config = AcquireConfig::from_env(&package_dir()?);
    println!("Prebuilt tree: {}", config.tree.root().display());

    let keys = config.tree.installed_keys();
    if keys.is_empty() {
        println!("  (no prebuilt binaries installed)");
    }
    for key in &keys {
        println!("  {key}");
    }

    let host = &config.key;
    if config.tree.find_prebuilt(host).is_some() {
        println!("Host {host}: prebuilt binary available");
    } else {
        println!("Host {host}: no prebuilt binary (acquire would build from source)");
    }
    Ok(())
}
