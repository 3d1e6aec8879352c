//! Error taxonomy for the acquisition pipeline.
//!
//! Every variant is terminal for the run that raised it: there is no retry
//! or local recovery anywhere in the pipeline. Diagnosing a failure is an
//! operator task, so each message embeds a stable pointer to the
//! troubleshooting guide and enough detail to act on without reading source.

use std::path::PathBuf;
use thiserror::Error;

/// Stable troubleshooting pointer included in every failure message.
pub const TROUBLESHOOTING_GUIDE: &str =
    "https://github.com/nova-physics/nova-acquire/blob/master/troubleshooting-guide.md";

/// Terminal failures of the acquisition pipeline.
///
/// The first two variants diagnose a prebuilt-distribution miss precisely:
/// a missing OS tree and a missing architecture subtree are different
/// operator problems and must never be conflated. The last three diagnose
/// the gap between "the build tool exited zero" and "a usable artifact
/// exists on disk".
#[derive(Debug, Error)]
pub enum AcquireError {
    /// No binary distribution tree exists for the host operating system.
    #[error("no binary distribution found for the {os} operating system; troubleshooting guide: {}", TROUBLESHOOTING_GUIDE)]
    UnsupportedPlatform { os: String },

    /// The OS tree exists but has no subtree for the host architecture.
    #[error("the {arch} architecture is not supported by the {os} binary distribution; troubleshooting guide: {}", TROUBLESHOOTING_GUIDE)]
    UnsupportedArchitecture { os: String, arch: String },

    /// The external build tool exited non-zero. Carries the exact code.
    #[error("builder returned non-zero ({status}) exit code; troubleshooting guide: {}", TROUBLESHOOTING_GUIDE)]
    BuildFailed { status: i32 },

    /// The external build tool exceeded the configured deadline and was
    /// killed. Classified with [`AcquireError::BuildFailed`] severity.
    #[error("builder exceeded the {limit_secs}s deadline and was terminated; troubleshooting guide: {}", TROUBLESHOOTING_GUIDE)]
    BuildTimedOut { limit_secs: u64 },

    /// The build tool claimed success but the build-output root is absent.
    #[error("build reported success but output root '{build_root}' does not exist; troubleshooting guide: {}", TROUBLESHOOTING_GUIDE)]
    SourceBuildIncomplete { build_root: PathBuf },

    /// The build-output root exists but holds no subdirectory for the
    /// requested architecture.
    #[error("build produced no output for the {arch} architecture (expected '{dir}'); troubleshooting guide: {}", TROUBLESHOOTING_GUIDE)]
    NoArtifactForArchitecture { arch: String, dir: PathBuf },

    /// An artifact directory exists but contains no file with the linkable
    /// stem. Internal-consistency violation: the layout promised a binary
    /// and delivered none.
    #[error("artifact directory '{dir}' contains no {stem} binary; troubleshooting guide: {}", TROUBLESHOOTING_GUIDE)]
    ArtifactDirectoryEmpty { dir: PathBuf, stem: &'static str },

    /// More than one file in an artifact directory matches the linkable
    /// stem. Filesystem enumeration order is not a tie-break; the layout
    /// contract requires exactly one candidate.
    #[error("artifact directory '{dir}' contains {count} files with the {stem} stem, expected exactly one; troubleshooting guide: {}", TROUBLESHOOTING_GUIDE)]
    AmbiguousArtifact {
        dir: PathBuf,
        stem: &'static str,
        count: usize,
    },

    /// Filesystem or process-spawn failure outside the taxonomy above.
    #[error("i/o failure during acquisition: {0}; troubleshooting guide: {guide}", guide = TROUBLESHOOTING_GUIDE)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_message_carries_the_troubleshooting_pointer() {
        let errors: Vec<AcquireError> = vec![
            AcquireError::UnsupportedPlatform {
                os: "Plan9".into(),
            },
            AcquireError::UnsupportedArchitecture {
                os: "Linux".into(),
                arch: "riscv64".into(),
            },
            AcquireError::BuildFailed { status: 2 },
            AcquireError::BuildTimedOut { limit_secs: 600 },
            AcquireError::SourceBuildIncomplete {
                build_root: "/tmp/build".into(),
            },
            AcquireError::NoArtifactForArchitecture {
                arch: "arm64".into(),
                dir: "/tmp/build/libnova_arm64".into(),
            },
            AcquireError::ArtifactDirectoryEmpty {
                dir: "/tmp/build/libnova_arm64".into(),
                stem: "libnova",
            },
            AcquireError::AmbiguousArtifact {
                dir: "/tmp/build/libnova_arm64".into(),
                stem: "libnova",
                count: 2,
            },
            AcquireError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read denied",
            )),
        ];

        for err in errors {
            assert!(
                err.to_string().contains(TROUBLESHOOTING_GUIDE),
                "missing pointer in: {err}"
            );
        }
    }

    #[test]
    fn build_failed_carries_exact_status() {
        let err = AcquireError::BuildFailed { status: 42 };
        assert!(err.to_string().contains("(42)"));
    }

    #[test]
    fn io_errors_convert_through_question_mark() {
        fn read_missing() -> Result<String, AcquireError> {
            Ok(std::fs::read_to_string("/definitely/not/a/real/path")?)
        }
        let err = read_missing().unwrap_err();
        assert!(matches!(err, AcquireError::Io(_)));
        assert!(err.to_string().contains("i/o failure"));
    }
}
