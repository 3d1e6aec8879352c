//! External build tool invocation.
//!
//! The Nova physics build tool is a separate program driven over a process
//! boundary: this module only cares about its exit status and its
//! filesystem side effect (a build-output root). It runs with the current
//! working directory switched to the tool's own directory, restored on
//! every exit path by a drop guard, so later steps that resolve relative
//! paths are never left in a moved process.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::AcquireError;

/// Quiet flag passed to the build tool on every invocation.
pub const QUIET_FLAG: &str = "-q";

/// Build subcommand of the external tool.
pub const BUILD_SUBCOMMAND: &str = "build";

/// Position-independent-code flag. Always appended: the produced binary is
/// linked into a dynamically loaded extension module, so PIC is a fixed
/// build requirement, not an option.
pub const PIC_FLAG: &str = "-fPIC";

/// How often a deadline-bounded child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for one external builder invocation.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Directory the process switches into for the duration of the call.
    pub working_dir: PathBuf,
    /// Interpreter running the build tool (normally `python3`).
    pub program: PathBuf,
    /// The build tool itself, resolved relative to `working_dir`.
    pub script: PathBuf,
    /// Optional deadline; `None` lets the tool run to completion.
    pub timeout: Option<Duration>,
}

impl BuilderConfig {
    /// Standard configuration for a Nova physics checkout at `source_dir`.
    pub fn for_source_dir(source_dir: impl Into<PathBuf>) -> Self {
        let working_dir = source_dir.into();
        Self {
            program: PathBuf::from("python3"),
            script: working_dir.join("nova_builder.py"),
            working_dir,
            timeout: None,
        }
    }

    /// Run the build tool with `flags`, appending [`PIC_FLAG`].
    ///
    /// A non-zero exit is [`AcquireError::BuildFailed`] with the exact
    /// status code; the caller must not proceed to output resolution. The
    /// tool's own output passes through to the operator's terminal.
    pub fn invoke(&self, flags: &[&str]) -> Result<(), AcquireError> {
        let _cwd = CwdGuard::change_to(&self.working_dir)?;

        let mut cmd = Command::new(&self.program);
        cmd.arg(&self.script)
            .args(flags)
            .arg(PIC_FLAG)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = match self.timeout {
            None => cmd.status()?,
            Some(limit) => wait_with_deadline(cmd.spawn()?, limit)?,
        };

        if !status.success() {
            return Err(AcquireError::BuildFailed {
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }

    /// Run the standard build flag set (`-q build`, plus [`PIC_FLAG`]).
    pub fn invoke_build(&self) -> Result<(), AcquireError> {
        self.invoke(&[QUIET_FLAG, BUILD_SUBCOMMAND])
    }
}

/// Scoped working-directory change.
///
/// Saves the current directory on construction and restores it on drop, so
/// restoration happens on every exit path, including early `?` returns and
/// panics inside the scope.
#[derive(Debug)]
pub struct CwdGuard {
    previous: PathBuf,
}

impl CwdGuard {
    pub fn change_to(dir: &Path) -> std::io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        Ok(Self { previous })
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        // Nothing useful to do if the previous directory vanished.
        let _ = env::set_current_dir(&self.previous);
    }
}

fn wait_with_deadline(mut child: Child, limit: Duration) -> Result<ExitStatus, AcquireError> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if start.elapsed() > limit {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AcquireError::BuildTimedOut {
                limit_secs: limit.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Invoking the builder mutates the process-wide working directory, so
/// tests that do it must not run concurrently with each other, in this
/// module or any other.
#[cfg(test)]
pub(crate) fn test_cwd_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::Mutex;
    static CWD_LOCK: Mutex<()> = Mutex::new(());
    CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn serial() -> std::sync::MutexGuard<'static, ()> {
        test_cwd_lock()
    }

    /// Builder that runs a shell snippet instead of the real build tool.
    /// The snippet arrives as the single flag, and `sh -c` treats the
    /// appended PIC flag as `$0`, so the fixed flag handling stays intact
    /// without requiring python in the test environment.
    fn shell_builder(working_dir: &Path) -> BuilderConfig {
        BuilderConfig {
            working_dir: working_dir.to_path_buf(),
            program: PathBuf::from("sh"),
            script: PathBuf::from("-c"),
            timeout: None,
        }
    }

    #[test]
    fn zero_exit_is_success() {
        let _serial = serial();
        let temp = TempDir::new().unwrap();
        shell_builder(temp.path()).invoke(&["exit 0"]).unwrap();
    }

    #[test]
    fn nonzero_exit_carries_the_exact_code() {
        let _serial = serial();
        let temp = TempDir::new().unwrap();
        let err = shell_builder(temp.path()).invoke(&["exit 7"]).unwrap_err();
        assert!(matches!(err, AcquireError::BuildFailed { status: 7 }));
    }

    #[test]
    fn working_directory_is_restored_after_failure() {
        let _serial = serial();
        let before = env::current_dir().unwrap();
        let temp = TempDir::new().unwrap();
        let _ = shell_builder(temp.path()).invoke(&["exit 1"]).unwrap_err();
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn builder_runs_in_its_working_directory() {
        let _serial = serial();
        let temp = TempDir::new().unwrap();
        shell_builder(temp.path())
            .invoke(&["touch ran-here"])
            .unwrap();
        assert!(temp.path().join("ran-here").exists());
    }

    #[test]
    fn deadline_overrun_is_a_timeout_not_a_build_failure() {
        let _serial = serial();
        let temp = TempDir::new().unwrap();
        let mut builder = shell_builder(temp.path());
        builder.timeout = Some(Duration::from_millis(200));
        let err = builder.invoke(&["sleep 30"]).unwrap_err();
        assert!(matches!(err, AcquireError::BuildTimedOut { .. }));
    }
}
