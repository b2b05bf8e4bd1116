//! `ACTION=backup`.
//!
//! # Steps
//!
//! | # | Step    | Payload | Description                                    |
//! |---|---------|---------|------------------------------------------------|
//! | 1 | Dump    | `db`    | `mysqldump --all-databases` into memory        |
//! | 2 | Stage   | `db`    | Write the dump to the dump file                |
//! | 3 | Archive | both    | `restic backup <BACKUP_MOUNT_PATH>`            |
//! | 4 | List    | both    | Log the host's snapshots                       |
//!
//! An empty dump is treated as a failure: archiving it would look like a good
//! backup while holding nothing.

use std::fs;

use tracing::{info, warn};

use super::log_mysql;
use crate::{
    config::{Config, MysqlConfig},
    error::{Error, Result},
    process::{CommandRunner, log_output},
    repository,
    runner::{Invocation, mysql_base, restic_base},
};

// ─── Entry points ─────────────────────────────────────────────────────────────

/// Dump every database, stage the dump, then archive `source`.
pub fn database(
    cfg: &Config,
    db: &MysqlConfig,
    source: &str,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    info!("Performing database backup...");
    log_mysql(db);

    let dump = runner.capture(&build_dump_args(db))?;
    if !dump.success {
        log_output(&dump);
        return Err(Error::tool("Backup", dump.status));
    }
    if dump.stdout.is_empty() {
        log_output(&dump);
        return Err(Error::EmptyArtifact("Backup failed: mysqldump output is empty"));
    }
    if !dump.stderr.is_empty() {
        warn!("{}", String::from_utf8_lossy(&dump.stderr));
    }

    fs::write(&cfg.dump_file, &dump.stdout).map_err(|err| Error::Io {
        action: "Failed to write backup file",
        path: cfg.dump_file.clone(),
        source: err,
    })?;
    info!("Database backup completed successfully.");

    archive(cfg, source, runner)
}

/// Archive the mounted volume as-is.
pub fn volume(cfg: &Config, source: &str, runner: &mut dyn CommandRunner) -> Result<()> {
    info!("Starting PVC backup...");
    archive(cfg, source, runner)
}

fn archive(cfg: &Config, source: &str, runner: &mut dyn CommandRunner) -> Result<()> {
    info!(
        "Starting backup of {source} to {} with host {}",
        cfg.repo.repository, cfg.repo.hostname
    );

    let out = runner.capture(&build_backup_args(cfg, source))?;
    if !out.success {
        log_output(&out);
        return Err(Error::tool("Restic backup", out.status));
    }
    info!("Backup completed successfully.");
    log_output(&out);

    repository::log_snapshots(cfg, runner)
}

// ─── Argument builders ────────────────────────────────────────────────────────

/// `mysqldump -h <host> -P <port> -u <user> --all-databases`.
pub fn build_dump_args(db: &MysqlConfig) -> Invocation {
    mysql_base("mysqldump", db).arg("--all-databases")
}

/// `restic -r <repo> backup <source> --host <host>`.
pub fn build_backup_args(cfg: &Config, source: &str) -> Invocation {
    restic_base(cfg).args(["backup", source, "--host", cfg.repo.hostname.as_str()])
}

// ─── Tests ────────────────────────────────────────────────────────────────────
