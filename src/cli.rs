//! Command-line interface definition.
//!
//! The job itself is driven by environment variables (see [`crate::config`]);
//! the flags here only cover where defaults come from and dry inspection.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name    = "restic-job",
    about   = "Back up or restore a MySQL database or volume with restic, configured from the environment",
    version,
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// TOML file with defaults for non-secret settings.
    ///
    /// Only read when given.  Environment variables always win over the
    /// file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where the database dump is staged.
    ///
    /// Defaults to `/backup/all_databases_backup.sql`.
    #[arg(long, value_name = "PATH")]
    pub dump_file: Option<PathBuf>,

    /// Validate the configuration, print it with secrets redacted, and exit.
    #[arg(long)]
    pub print_config: bool,
}
