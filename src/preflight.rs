//! Preflight checks before shelling out.
//!
//! Validates that the external build tool's interpreter is present on the
//! host before invoking it. This turns a cryptic spawn failure into an
//! actionable message up front.

use anyhow::{bail, Result};
use std::path::Path;

/// Check if a command exists on the host PATH.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Require the builder interpreter and the build tool script to exist.
pub fn check_builder_available(program: &Path, script: &Path) -> Result<()> {
    let program_str = program.to_string_lossy();
    if !command_exists(&program_str) {
        bail!(
            "build tool interpreter '{}' not found on PATH (install it or set FORCE_NOVA_BINARIES to use prebuilt binaries)",
            program_str
        );
    }
    if !script.is_file() {
        bail!(
            "build tool script not found: {} (is the nova-physics checkout present?)",
            script.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_exists_finds_common_tools() {
        assert!(command_exists("ls"));
        assert!(!command_exists("definitely_not_a_real_command_12345"));
    }

    #[test]
    fn missing_interpreter_is_reported_before_the_script() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("nova_builder.py");
        fs::write(&script, "").unwrap();
        let err = check_builder_available(
            Path::new("definitely_not_a_real_command_12345"),
            &script,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not found on PATH"));
    }

    #[test]
    fn missing_script_is_reported() {
        let temp = TempDir::new().unwrap();
        let err = check_builder_available(Path::new("sh"), &temp.path().join("nova_builder.py"))
            .unwrap_err();
        assert!(err.to_string().contains("nova_builder.py"));
    }

    #[test]
    fn present_interpreter_and_script_pass() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("nova_builder.py");
        fs::write(&script, "").unwrap();
        check_builder_available(Path::new("sh"), &script).unwrap();
    }
}
