//! Process execution.
//!
//! Every external tool goes through the [`CommandRunner`] trait.  The real
//! implementation, [`SystemRunner`], blocks on `std::process::Command`; tests
//! substitute a recording fake so no restic or MySQL binaries are needed.
//!
//! There are two ways to run something:
//!
//! - [`CommandRunner::capture`] buffers stdout and stderr so they can be logged (or, for
//!   `mysqldump`, written to the dump file).  A spinner runs while the command does.
//! - [`CommandRunner::pipe`] feeds bytes on stdin and lets the child write straight to our own
//!   stdout/stderr.  Used for the `mysql` load step.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::{Command, Stdio},
};

use tracing::info;

use crate::{
    error::{Error, Result},
    runner::Invocation,
    ui,
};

/// What a finished command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub success: bool,
    /// Human-readable exit status, e.g. `exit status: 1`.
    pub status: String,
    pub stdout: Vec<u8>,
    /// Empty when the command wrote to our stderr directly.
    pub stderr: Vec<u8>,
}

impl Captured {
    /// stdout followed by stderr, lossily decoded.
    pub fn combined(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&self.stderr));
        text
    }
}

/// Log whatever a command printed, verbatim.  Nothing is logged for silent
/// commands.
pub fn log_output(out: &Captured) {
    let text = out.combined();
    if !text.is_empty() {
        info!("{text}");
    }
}

pub trait CommandRunner {
    /// Run `inv` to completion with stdout and stderr captured.
    fn capture(&mut self, inv: &Invocation) -> Result<Captured>;

    /// Run `inv` with `stdin` written to its standard input and its output
    /// going to ours.  The returned [`Captured`] has empty buffers.
    fn pipe(&mut self, inv: &Invocation, stdin: &[u8]) -> Result<Captured>;
}

/// Runs commands for real.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(inv: &Invocation) -> Command {
        let mut cmd = Command::new(&inv.program);
        cmd.args(&inv.args)
            .envs(inv.envs.iter().map(|(k, v)| (k, v)));
        cmd
    }

    fn spawn_error(inv: &Invocation) -> impl FnOnce(io::Error) -> Error + '_ {
        move |source| Error::Spawn {
            program: inv.program.clone(),
            source,
        }
    }
}

impl CommandRunner for SystemRunner {
    fn capture(&mut self, inv: &Invocation) -> Result<Captured> {
        let spinner = ui::spinner(&inv.to_string());

        let output = Self::command(inv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();
        spinner.finish_and_clear();

        let output = output.map_err(Self::spawn_error(inv))?;
        Ok(Captured {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn pipe(&mut self, inv: &Invocation, stdin: &[u8]) -> Result<Captured> {
        let mut child = Self::command(inv)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(Self::spawn_error(inv))?;

        // A child that exits early closes its end; its exit status says why.
        let written = match child.stdin.take() {
            Some(mut pipe) => match pipe.write_all(stdin) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            },
            None => Ok(()),
        };

        let status = child.wait().map_err(|source| Error::Io {
            action: "Failed to wait for",
            path: PathBuf::from(&inv.program),
            source,
        })?;
        written.map_err(|source| Error::Io {
            action: "Failed to write stdin of",
            path: PathBuf::from(&inv.program),
            source,
        })?;

        Ok(Captured {
            success: status.success(),
            status: status.to_string(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

// ─── Test double ──────────────────────────────────────────────────────────────


// ─── Tests ────────────────────────────────────────────────────────────────────
