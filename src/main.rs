//! `restic-job`: a one-shot restic backup/restore job.
//!
//! # Overview
//!
//! Meant to run as a container in a Kubernetes `Job`/`CronJob`.  Everything
//! it needs comes from the environment: which action to take (`ACTION`), what
//! to act on (`BACKUP_TYPE`), where the restic repository is, and how to reach
//! MySQL.  It validates all of that up front, runs one action from start to
//! finish by shelling out to `restic`, `mysqldump` and `mysql`, and exits
//! `0` on success or `1` on the first failure.
//!
//! # Usage
//!
//! ```text
//! ACTION=backup  BACKUP_TYPE=db  restic-job   # dump MySQL, archive it
//! ACTION=restore BACKUP_TYPE=pvc restic-job   # extract latest snapshot
//! restic-job --print-config                   # validate, show redacted config
//! restic-job -c job.toml                      # non-secret defaults from TOML
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                                  |
//! |--------------------------|-------------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap                   |
//! | [`config`]               | Environment validation, `Config`, TOML defaults |
//! | [`error`]                | Error taxonomy                                  |
//! | [`logging`]              | `INFO: <timestamp> <message>` log lines         |
//! | [`runner`]               | Command construction helpers                    |
//! | [`process`]              | `CommandRunner` trait and the real runner       |
//! | [`ui`]                   | Spinner while captured commands run             |
//! | [`repository`]           | Repository init and snapshot listing            |
//! | [`commands::backup`]     | `ACTION=backup`                                 |
//! | [`commands::restore`]    | `ACTION=restore`                                |

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod process;
mod repository;
mod runner;
mod ui;

use std::{path::Path, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::{PartialConfig, parse_partial};
use process::SystemRunner;
use tracing::error;

fn main() -> ExitCode {
    // Keep to exit codes 0 and 1, including for usage errors.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        },
    };

    logging::init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let defaults = load_defaults(cli.config.as_deref())?;
    let cfg = config::from_env(defaults, cli.dump_file.clone())?;

    if cli.print_config {
        println!("{cfg:#?}");
        return Ok(());
    }

    commands::run(&cfg, &mut SystemRunner)?;
    Ok(())
}

/// Load non-secret defaults from `--config <path>`, when given.
///
/// Nothing is read implicitly: without the flag every required setting must
/// come from the environment.
fn load_defaults(path: Option<&Path>) -> Result<PartialConfig> {
    let Some(path) = path else {
        return Ok(PartialConfig::default());
    };
    parse_partial(path)?.with_context(|| format!("config file '{}' not found", path.display()))
}
