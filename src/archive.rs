//! Header extraction from gzip-compressed tar archives.
//!
//! The build tool ships its public headers as `.tar.gz` files at the top of
//! the build-output root. Only the include tree is wanted; everything else
//! in the archive is ignored. There is no partial-failure recovery: an
//! interrupted extraction may leave a partial tree, which is safe because a
//! rerun extracts into created-if-absent directories, never wiping.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;

/// Include-tree prefix as the build tool writes it into its archives.
pub const HEADER_PREFIX: &str = "./include";

/// Extract the members of `archive` whose path starts with `include_prefix`
/// into `destination`, preserving each member's relative path.
///
/// Prefix comparison is component-wise with a leading `./` ignored on both
/// sides, so `include/nova.h` and `./include/nova.h` select identically.
pub fn extract_headers(archive: &Path, include_prefix: &str, destination: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("opening header archive '{}'", archive.display()))?;
    let decoder = GzDecoder::new(file);
    let mut tar = tar::Archive::new(decoder);

    std::fs::create_dir_all(destination)
        .with_context(|| format!("creating destination '{}'", destination.display()))?;

    let prefix = Path::new(include_prefix);
    let prefix = prefix.strip_prefix(".").unwrap_or(prefix);

    for entry in tar
        .entries()
        .with_context(|| format!("reading header archive '{}'", archive.display()))?
    {
        let mut entry =
            entry.with_context(|| format!("reading entry in '{}'", archive.display()))?;
        let member = entry.path()?.into_owned();
        let relative = member.strip_prefix(".").unwrap_or(&member);
        if !relative.starts_with(prefix) {
            continue;
        }
        entry.unpack_in(destination).with_context(|| {
            format!(
                "extracting '{}' from '{}'",
                member.display(),
                archive.display()
            )
        })?;
    }

    Ok(())
}
