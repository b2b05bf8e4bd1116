//! Action handlers.
//!
//! | File         | `ACTION`  | Payloads         |
//! |--------------|-----------|------------------|
//! | `backup.rs`  | `backup`  | `db`, `pvc`      |
//! | `restore.rs` | `restore` | `db`, `pvc`      |
//!
//! [`run`] is the single entry point: it makes sure the repository exists
//! (backup only), logs the current snapshots, and hands off to the matching
//! handler.  Every step either succeeds or aborts the whole job.

pub mod backup;
pub mod restore;

use tracing::info;

use crate::{
    config::{Action, Config, MysqlConfig, Payload},
    error::Result,
    process::CommandRunner,
    repository,
};

/// Execute the configured action from start to finish.
pub fn run(cfg: &Config, runner: &mut dyn CommandRunner) -> Result<()> {
    info!(
        "Environment Variables: BACKUP_TYPE={}, ACTION={}",
        cfg.action.payload().name(),
        cfg.action.name()
    );

    match &cfg.action {
        Action::Backup { payload, source } => {
            repository::ensure(cfg, runner)?;
            repository::log_snapshots(cfg, runner)?;
            match payload {
                Payload::Database(db) => backup::database(cfg, db, source, runner),
                Payload::Volume => backup::volume(cfg, source, runner),
            }
        },
        Action::Restore {
            payload,
            target,
            snapshot,
        } => {
            repository::log_snapshots(cfg, runner)?;
            match payload {
                Payload::Database(db) => restore::database(cfg, db, target, snapshot, runner),
                Payload::Volume => restore::volume(cfg, target, snapshot, runner),
            }
        },
    }
}

/// Log the database connection settings, password redacted.
fn log_mysql(db: &MysqlConfig) {
    info!(
        "Environment Variables: MYSQL_HOST={}, MYSQL_PORT={}, MYSQL_USER={}, MYSQL_PASSWORD={:?}",
        db.host, db.port, db.user, db.password
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SnapshotRef,
        error::Error,
        process::fake::{FakeRunner, failed, ok},
        runner::tests::{backup, make_db, restore},
    };

    /// Program plus first non-repository argument, e.g. `restic snapshots`.
    fn steps(runner: &FakeRunner) -> Vec<String> {
        runner
            .calls
            .iter()
            .map(|c| {
                let inv = &c.invocation;
                match inv.program.as_str() {
                    "restic" => format!("restic {}", inv.args[2]),
                    other => other.to_string(),
                }
            })
            .collect()
    }

    #[test]
    fn db_backup_runs_every_step_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = backup(Payload::Database(make_db()));
        cfg.dump_file = dir.path().join("all_databases_backup.sql");
        let mut runner = FakeRunner::new().on("mysqldump", "--all-databases", ok(b"-- dump\n"));

        run(&cfg, &mut runner).unwrap();

        assert_eq!(steps(&runner), vec![
            "restic snapshots",
            "restic snapshots",
            "mysqldump",
            "restic backup",
            "restic snapshots",
        ]);
    }

    #[test]
    fn pvc_backup_initialises_missing_repository() {
        let mut runner = FakeRunner::new().on("restic", "snapshots", failed(b"no repo"));

        run(&backup(Payload::Volume), &mut runner).unwrap();

        assert_eq!(steps(&runner), vec![
            "restic snapshots",
            "restic init",
            "restic snapshots",
            "restic backup",
            "restic snapshots",
        ]);
    }

    #[test]
    fn backup_stops_when_init_fails() {
        let mut runner = FakeRunner::new()
            .on("restic", "snapshots", failed(b"no repo"))
            .on("restic", "init", failed(b"bucket missing"));

        let err = run(&backup(Payload::Volume), &mut runner).unwrap_err();

        assert!(matches!(err, Error::ToolFailed { .. }));
        assert_eq!(steps(&runner), vec!["restic snapshots", "restic init"]);
    }

    #[test]
    fn pvc_restore_lists_before_and_after() {
        let mut runner = FakeRunner::new();

        run(&restore(Payload::Volume, SnapshotRef::Latest), &mut runner).unwrap();

        assert_eq!(steps(&runner), vec![
            "restic snapshots",
            "restic restore",
            "restic snapshots",
        ]);
    }

    #[test]
    fn restore_never_initialises() {
        let mut runner = FakeRunner::new().on("restic", "snapshots", failed(b"no repo"));

        let err = run(&restore(Payload::Volume, SnapshotRef::Latest), &mut runner).unwrap_err();

        assert!(matches!(err, Error::ToolFailed { .. }));
        assert_eq!(steps(&runner), vec!["restic snapshots"]);
    }
}
