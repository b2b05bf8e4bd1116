//! `ACTION=restore`.
//!
//! Both payloads start by extracting one snapshot (`SNAPSHOT_ID`, or `latest`)
//! into `RESTORE_MOUNT_PATH`.  For `db` the extracted dump file is then fed to
//! `mysql` on stdin; `mysql`'s own output goes straight to ours.

use std::fs;

use tracing::info;

use super::log_mysql;
use crate::{
    config::{Config, MysqlConfig, SnapshotRef},
    error::{Error, Result},
    process::{CommandRunner, log_output},
    repository,
    runner::{Invocation, mysql_base, restic_base},
};

/// Extract the snapshot, then load the dump file into MySQL.
pub fn database(
    cfg: &Config,
    db: &MysqlConfig,
    target: &str,
    snapshot: &SnapshotRef,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    info!("Performing database restore...");
    extract(cfg, target, snapshot, runner)?;

    let input = fs::read(&cfg.dump_file).map_err(|source| Error::Io {
        action: "Failed to read backup file",
        path: cfg.dump_file.clone(),
        source,
    })?;
    if input.is_empty() {
        return Err(Error::EmptyArtifact("Restore failed: backup file is empty"));
    }
    info!("Backup file validated successfully.");

    log_mysql(db);
    let out = runner.pipe(&build_load_args(db), &input)?;
    if !out.success {
        return Err(Error::tool("Restore", out.status));
    }

    info!("Restore successful");
    Ok(())
}

/// Extract the snapshot into the mounted volume.
pub fn volume(
    cfg: &Config,
    target: &str,
    snapshot: &SnapshotRef,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    info!("Starting PVC restore...");
    extract(cfg, target, snapshot, runner)?;
    repository::log_snapshots(cfg, runner)
}

fn extract(
    cfg: &Config,
    target: &str,
    snapshot: &SnapshotRef,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    info!(
        "Starting restore of {snapshot} to {target} with host {}",
        cfg.repo.hostname
    );

    let out = runner.capture(&build_restore_args(cfg, snapshot, target))?;
    if !out.success {
        log_output(&out);
        return Err(Error::tool("Restic restore", out.status));
    }
    info!("Restore completed successfully.");
    log_output(&out);
    Ok(())
}

/// `restic -r <repo> restore <snapshot> --target <target> --host <host>`.
pub fn build_restore_args(cfg: &Config, snapshot: &SnapshotRef, target: &str) -> Invocation {
    restic_base(cfg).args([
        "restore",
        snapshot.as_str(),
        "--target",
        target,
        "--host",
        cfg.repo.hostname.as_str(),
    ])
}

/// `mysql -h <host> -P <port> -u <user>`, fed the dump on stdin.
pub fn build_load_args(db: &MysqlConfig) -> Invocation {
    mysql_base("mysql", db)
}
