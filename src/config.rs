//! Configuration types and loading logic.
//!
//! The job is configured almost entirely through environment variables, the
//! way a Kubernetes `Job` or `CronJob` passes settings to a container.  The
//! environment is read exactly once, validated exhaustively, and turned into a
//! [`Config`] that is passed by reference to every step.  Nothing runs until
//! validation has succeeded.
//!
//! # Environment
//!
//! | Variable                | Required when          |
//! |-------------------------|------------------------|
//! | `AWS_ACCESS_KEY_ID`     | always                 |
//! | `AWS_SECRET_ACCESS_KEY` | always                 |
//! | `RESTIC_REPOSITORY`     | always                 |
//! | `RESTIC_PASSWORD`       | always                 |
//! | `ACTION`                | always (`backup`/`restore`) |
//! | `RESTIC_HOSTNAME`       | always                 |
//! | `BACKUP_TYPE`           | always (`db`/`pvc`)    |
//! | `BACKUP_MOUNT_PATH`     | `ACTION=backup`        |
//! | `RESTORE_MOUNT_PATH`    | `ACTION=restore`       |
//! | `SNAPSHOT_ID`           | never (defaults to `latest`) |
//! | `MYSQL_HOST`, `MYSQL_PORT`, `MYSQL_USER`, `MYSQL_PASSWORD` | `BACKUP_TYPE=db` |
//!
//! # Defaults file
//!
//! Non-secret settings can also come from a TOML file named with
//! `--config`.  No file is read without the flag.  Environment variables always
//! win; secrets and the per-run knobs are environment-only.
//!
//! ```toml
//! [restic]
//! repository = "s3:s3.amazonaws.com/backups/orders"
//! hostname   = "orders-db"
//!
//! [paths]
//! backup_mount  = "/backup"
//! restore_mount = "/"
//! dump_file     = "/backup/all_databases_backup.sql"
//!
//! [mysql]
//! host = "mysql.default.svc"
//! port = 3306
//! user = "root"
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result as AnyResult};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Where the database dump lives between `mysqldump` and `restic`.
pub const DEFAULT_DUMP_FILE: &str = "/backup/all_databases_backup.sql";

// ─── Variable names ───────────────────────────────────────────────────────────

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const RESTIC_REPOSITORY: &str = "RESTIC_REPOSITORY";
pub const RESTIC_PASSWORD: &str = "RESTIC_PASSWORD";
pub const RESTIC_HOSTNAME: &str = "RESTIC_HOSTNAME";
pub const ACTION: &str = "ACTION";
pub const BACKUP_TYPE: &str = "BACKUP_TYPE";
pub const BACKUP_MOUNT_PATH: &str = "BACKUP_MOUNT_PATH";
pub const RESTORE_MOUNT_PATH: &str = "RESTORE_MOUNT_PATH";
pub const SNAPSHOT_ID: &str = "SNAPSHOT_ID";
pub const MYSQL_HOST: &str = "MYSQL_HOST";
pub const MYSQL_PORT: &str = "MYSQL_PORT";
pub const MYSQL_USER: &str = "MYSQL_USER";
pub const MYSQL_PASSWORD: &str = "MYSQL_PASSWORD";

// ─── Secret ───────────────────────────────────────────────────────────────────

/// A credential string that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for handing to a child process.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

// ─── Resolved configuration ───────────────────────────────────────────────────

/// Which snapshot a restore extracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotRef {
    Latest,
    Id(String),
}

impl SnapshotRef {
    /// `None` or an empty string means `latest`.
    pub fn from_value(value: Option<String>) -> Self {
        match value {
            Some(id) if !id.is_empty() => SnapshotRef::Id(id),
            _ => SnapshotRef::Latest,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SnapshotRef::Latest => "latest",
            SnapshotRef::Id(id) => id,
        }
    }
}

impl fmt::Display for SnapshotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings shared by `mysqldump` and `mysql`.
#[derive(Debug, Clone)]
pub struct MysqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret,
}

/// What is being backed up or restored.
#[derive(Debug, Clone)]
pub enum Payload {
    /// A full `mysqldump --all-databases`, staged through the dump file.
    Database(MysqlConfig),
    /// A mounted volume, archived as-is.
    Volume,
}

impl Payload {
    /// The `BACKUP_TYPE` value this payload was parsed from.
    pub const fn name(&self) -> &'static str {
        match self {
            Payload::Database(_) => "db",
            Payload::Volume => "pvc",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Backup {
        payload: Payload,
        /// `BACKUP_MOUNT_PATH`, handed to `restic backup`.
        source: String,
    },
    Restore {
        payload: Payload,
        /// `RESTORE_MOUNT_PATH`, handed to `restic restore --target`.
        target: String,
        snapshot: SnapshotRef,
    },
}

impl Action {
    /// The `ACTION` value this action was parsed from.
    pub const fn name(&self) -> &'static str {
        match self {
            Action::Backup { .. } => "backup",
            Action::Restore { .. } => "restore",
        }
    }

    pub const fn payload(&self) -> &Payload {
        match self {
            Action::Backup { payload, .. } | Action::Restore { payload, .. } => payload,
        }
    }
}

/// The restic repository and the host id snapshots are filed under.
#[derive(Debug, Clone)]
pub struct RepoConfig {
    pub repository: String,
    pub password: Secret,
    pub hostname: String,
}

/// Object-store credentials, forwarded to restic's environment.
#[derive(Debug, Clone)]
pub struct AwsCredentials {
    pub access_key_id: Secret,
    pub secret_access_key: Secret,
}

/// Fully validated job configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub action: Action,
    pub repo: RepoConfig,
    pub aws: AwsCredentials,
    /// Staging path for the database dump.
    pub dump_file: PathBuf,
}

// ─── Defaults file ────────────────────────────────────────────────────────────

/// Optional TOML defaults.  Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub restic: ResticDefaults,
    pub paths: PathDefaults,
    pub mysql: MysqlDefaults,
}

/// `[restic]`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResticDefaults {
    pub repository: Option<String>,
    pub hostname: Option<String>,
}

/// `[paths]`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathDefaults {
    pub backup_mount: Option<String>,
    pub restore_mount: Option<String>,
    pub dump_file: Option<PathBuf>,
}

/// `[mysql]`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MysqlDefaults {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
}

/// Read a defaults file.  Returns `Ok(None)` when `path` does not exist.
pub fn parse_partial(path: &Path) -> AnyResult<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    toml::from_str(&text)
        .map(Some)
        .with_context(|| format!("parsing {}", path.display()))
}

// ─── Validation ───────────────────────────────────────────────────────────────

/// Build a [`Config`] from the process environment.
pub fn from_env(defaults: PartialConfig, dump_file: Option<PathBuf>) -> Result<Config> {
    resolve(defaults, |name| std::env::var(name).ok(), dump_file)
}

/// Build a [`Config`] from `lookup`, falling back to `defaults` for
/// non-secret settings.
///
/// Checks run in a fixed order and stop at the first problem: the common
/// variables, then the `ACTION` and `BACKUP_TYPE` values, then whatever the
/// chosen action and payload need.  `dump_file` (from the command line) beats
/// the defaults file, which beats [`DEFAULT_DUMP_FILE`].
pub fn resolve<F>(defaults: PartialConfig, lookup: F, dump_file: Option<PathBuf>) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let env = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let require = |name: &'static str, fallback: Option<String>| {
        env(name)
            .or(fallback.filter(|v| !v.is_empty()))
            .ok_or(Error::MissingVar(name))
    };

    let PartialConfig {
        restic,
        paths,
        mysql,
    } = defaults;

    let access_key_id = require(AWS_ACCESS_KEY_ID, None)?;
    let secret_access_key = require(AWS_SECRET_ACCESS_KEY, None)?;
    let repository = require(RESTIC_REPOSITORY, restic.repository)?;
    let password = require(RESTIC_PASSWORD, None)?;
    let action = require(ACTION, None)?;
    let hostname = require(RESTIC_HOSTNAME, restic.hostname)?;
    let backup_type = require(BACKUP_TYPE, None)?;

    let is_backup = match action.as_str() {
        "backup" => true,
        "restore" => false,
        _ => return Err(Error::InvalidAction(action)),
    };
    let is_db = match backup_type.as_str() {
        "db" => true,
        "pvc" => false,
        _ => return Err(Error::InvalidBackupType(backup_type)),
    };

    let mount = if is_backup {
        require(BACKUP_MOUNT_PATH, paths.backup_mount)?
    } else {
        require(RESTORE_MOUNT_PATH, paths.restore_mount)?
    };

    let payload = if is_db {
        let host = require(MYSQL_HOST, mysql.host)?;
        let port = require(MYSQL_PORT, mysql.port.map(|p| p.to_string()))?;
        let user = require(MYSQL_USER, mysql.user)?;
        let db_password = require(MYSQL_PASSWORD, None)?;
        let port = port.parse::<u16>().map_err(|_| Error::InvalidValue {
            name: MYSQL_PORT,
            value: port.clone(),
        })?;
        Payload::Database(MysqlConfig {
            host,
            port,
            user,
            password: Secret::new(db_password),
        })
    } else {
        Payload::Volume
    };

    let action = if is_backup {
        Action::Backup {
            payload,
            source: mount,
        }
    } else {
        Action::Restore {
            payload,
            target: mount,
            snapshot: SnapshotRef::from_value(env(SNAPSHOT_ID)),
        }
    };

    Ok(Config {
        action,
        repo: RepoConfig {
            repository,
            password: Secret::new(password),
            hostname,
        },
        aws: AwsCredentials {
            access_key_id: Secret::new(access_key_id),
            secret_access_key: Secret::new(secret_access_key),
        },
        dump_file: dump_file
            .or(paths.dump_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DUMP_FILE)),
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
