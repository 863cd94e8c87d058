//! External command execution.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{debug, info};

use crate::environment::EnvOverlay;
use crate::error::{ProvisionError, Result};

/// A fully specified subprocess: argv, working directory and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run (argv[0]).
    pub program: PathBuf,

    /// Remaining arguments.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: PathBuf,

    /// Environment the child sees. Replaces, not extends, the parent's.
    pub env: EnvOverlay,
}

impl Invocation {
    /// Create an invocation with no arguments.
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>, env: EnvOverlay) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env,
        }
    }

    /// Append arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Human-readable command line for logs and errors.
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs subprocesses to completion.
pub trait ProcessRunner {
    /// Run and wait. A non-zero exit is an error.
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Runs subprocesses with `std::process::Command`, inheriting stdio so
/// tool output streams to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        let start = Instant::now();
        let command_line = invocation.display();
        info!("Running {}", command_line);
        debug!("  in {}", invocation.cwd.display());
        for (key, value) in invocation.env.overrides() {
            debug!("  with {}={}", key, value);
        }

        let status = command_for(&invocation.program, &invocation.cwd)
            .args(&invocation.args)
            .env_clear()
            .envs(invocation.env.vars())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| ProvisionError::CommandSpawn {
                command: command_line.clone(),
                message: e.to_string(),
            })?;

        debug!("{} finished in {:?}", command_line, start.elapsed());

        if status.success() {
            Ok(())
        } else {
            Err(ProvisionError::CommandFailed {
                command: command_line,
                code: status.code(),
            })
        }
    }
}

/// Batch files cannot be spawned directly on Windows.
fn command_for(program: &Path, cwd: &Path) -> Command {
    let is_batch = program
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bat") || ext.eq_ignore_ascii_case("cmd"));

    let mut cmd = if cfg!(target_os = "windows") && is_batch {
        let mut cmd = Command::new("cmd.exe");
        cmd.arg("/C").arg(program);
        cmd
    } else {
        Command::new(program)
    };
    cmd.current_dir(cwd);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvSnapshot;
    use tempfile::TempDir;

    fn ambient() -> EnvOverlay {
        EnvOverlay::new(&EnvSnapshot::capture())
    }

    #[test]
    fn display_joins_program_and_args() {
        let inv = Invocation::new("/opt/vcpkg/vcpkg", "/opt/vcpkg", EnvOverlay::default())
            .args(["install", "--triplet", "x64-linux"]);
        assert_eq!(inv.display(), "/opt/vcpkg/vcpkg install --triplet x64-linux");
    }

    #[cfg(unix)]
    #[test]
    fn successful_command() {
        let temp = TempDir::new().unwrap();
        let inv = Invocation::new("true", temp.path(), ambient());
        SystemRunner.run(&inv).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_exit_code() {
        let temp = TempDir::new().unwrap();
        let inv = Invocation::new("sh", temp.path(), ambient()).args(["-c", "exit 3"]);

        let err = SystemRunner.run(&inv).unwrap_err();

        match err {
            ProvisionError::CommandFailed { code, command } => {
                assert_eq!(code, Some(3));
                assert!(command.contains("exit 3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_cwd_with_overlay_env() {
        let temp = TempDir::new().unwrap();
        let env = ambient().with("DEPSMITH_TEST_VALUE", "overlay");
        let inv = Invocation::new("sh", temp.path(), env)
            .args(["-c", "printf %s \"$DEPSMITH_TEST_VALUE\" > out.txt"]);

        SystemRunner.run(&inv).unwrap();

        assert_eq!(
            std::fs::read_to_string(temp.path().join("out.txt")).unwrap(),
            "overlay"
        );
    }

    #[test]
    fn missing_program_reports_spawn_error() {
        let temp = TempDir::new().unwrap();
        let inv = Invocation::new(temp.path().join("no-such-tool"), temp.path(), ambient());

        let err = SystemRunner.run(&inv).unwrap_err();

        match err {
            ProvisionError::CommandSpawn { command, message } => {
                assert!(command.ends_with("no-such-tool"));
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
