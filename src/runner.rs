//! Command construction helpers.
//!
//! This module *builds* the invocations handed to restic, mysqldump and mysql.
//! It does not execute anything; execution goes through
//! [`crate::process::CommandRunner`] so tests can swap in a recording fake.
//!
//! Keeping construction separate from execution means every function here is
//! pure and unit-testable without spawning child processes.
//!
//! # Credentials
//!
//! Secrets never go on the argument list.  restic reads its password and the
//! object-store keys from its environment, and the MySQL clients read
//! `MYSQL_PWD`, so both are passed through [`Invocation::envs`].  The
//! [`fmt::Display`] impl used for logging prints only the program and its
//! arguments.

use std::fmt;

use crate::config::{
    AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, Config, MysqlConfig, RESTIC_PASSWORD,
};

/// Environment variable the MySQL client tools read their password from.
pub const MYSQL_PWD: &str = "MYSQL_PWD";

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment for the child, on top of the inherited one.
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

// ─── restic base command ──────────────────────────────────────────────────────

/// The part shared by every restic call:
///
/// ```text
/// restic -r <repository>
/// ```
///
/// with `RESTIC_PASSWORD`, `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY` set
/// in the child's environment.  Callers append the subcommand.
pub fn restic_base(cfg: &Config) -> Invocation {
    Invocation::new("restic")
        .args(["-r", cfg.repo.repository.as_str()])
        .env(RESTIC_PASSWORD, cfg.repo.password.expose())
        .env(AWS_ACCESS_KEY_ID, cfg.aws.access_key_id.expose())
        .env(AWS_SECRET_ACCESS_KEY, cfg.aws.secret_access_key.expose())
}

// ─── MySQL base command ───────────────────────────────────────────────────────

/// `<program> -h <host> -P <port> -u <user>` with `MYSQL_PWD` in the environment.
pub fn mysql_base(program: &str, db: &MysqlConfig) -> Invocation {
    Invocation::new(program)
        .args(["-h", db.host.as_str(), "-P"])
        .arg(db.port.to_string())
        .args(["-u", db.user.as_str()])
        .env(MYSQL_PWD, db.password.expose())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
