//! Repository-level restic calls shared by backup and restore.

use tracing::{info, warn};

use crate::{
    config::Config,
    error::{Error, Result},
    process::{CommandRunner, log_output},
    runner::{Invocation, restic_base},
};

/// `restic -r <repo> snapshots --host <host>`.
pub fn build_snapshots_args(cfg: &Config) -> Invocation {
    restic_base(cfg).args(["snapshots", "--host", cfg.repo.hostname.as_str()])
}

/// `restic -r <repo> init`.
pub fn build_init_args(cfg: &Config) -> Invocation {
    restic_base(cfg).arg("init")
}

/// Make sure the repository exists, creating it on first use.
///
/// A failing `snapshots` probe is taken to mean "no repository yet"; only a
/// failing `init` after that is fatal.
pub fn ensure(cfg: &Config, runner: &mut dyn CommandRunner) -> Result<()> {
    info!("Initializing Restic repository if necessary...");

    let probe = runner.capture(&build_snapshots_args(cfg))?;
    if probe.success {
        info!("Restic repository found.");
        return Ok(());
    }

    warn!("Restic repository does not exist. Initializing...");
    let init = runner.capture(&build_init_args(cfg))?;
    if !init.success {
        log_output(&init);
        return Err(Error::tool("Restic repository initialization", init.status));
    }
    info!("Restic repository initialized successfully.");
    Ok(())
}

/// List this host's snapshots and log the listing verbatim.
pub fn log_snapshots(cfg: &Config, runner: &mut dyn CommandRunner) -> Result<()> {
    info!("Listing all snapshots for host {}:", cfg.repo.hostname);

    let out = runner.capture(&build_snapshots_args(cfg))?;
    log_output(&out);
    if !out.success {
        return Err(Error::tool("Listing snapshots", out.status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Payload,
        process::fake::{FakeRunner, failed, ok},
        runner::tests::backup,
    };

    #[test]
    fn snapshot_snapshots_args() {
        insta::assert_debug_snapshot!(build_snapshots_args(&backup(Payload::Volume)).args, @r#"
        [
            "-r",
            "s3:s3.amazonaws.com/bucket/orders",
            "snapshots",
            "--host",
            "orders-db",
        ]
        "#);
    }

    #[test]
    fn init_args_end_with_init() {
        let args = build_init_args(&backup(Payload::Volume)).args;
        assert_eq!(args.last().unwrap(), "init");
        assert!(!args.contains(&"--host".to_string()));
    }

    // ── ensure ────────────────────────────────────────────────────────────────

    #[test]
    fn existing_repository_is_left_alone() {
        let mut runner = FakeRunner::new();
        ensure(&backup(Payload::Volume), &mut runner).unwrap();
        assert_eq!(runner.calls.len(), 1);
        assert!(runner.lines()[0].ends_with("snapshots --host orders-db"));
    }

    #[test]
    fn failed_probe_triggers_init() {
        let mut runner = FakeRunner::new().on("restic", "snapshots", failed(b"Is there a repository?"));
        ensure(&backup(Payload::Volume), &mut runner).unwrap();
        assert_eq!(runner.calls.len(), 2);
        assert!(runner.lines()[1].ends_with(" init"));
    }

    #[test]
    fn failed_init_is_fatal() {
        let mut runner = FakeRunner::new()
            .on("restic", "snapshots", failed(b""))
            .on("restic", "init", failed(b"permission denied"));
        let err = ensure(&backup(Payload::Volume), &mut runner).unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
        assert_eq!(runner.calls.len(), 2);
    }

    // ── log_snapshots ─────────────────────────────────────────────────────────

    #[test]
    fn listing_succeeds() {
        let mut runner = FakeRunner::new().on("restic", "snapshots", ok(b"ID  Time  Host\n"));
        log_snapshots(&backup(Payload::Volume), &mut runner).unwrap();
        assert_eq!(runner.calls.len(), 1);
    }

    #[test]
    fn listing_failure_is_fatal() {
        let mut runner = FakeRunner::new().on("restic", "snapshots", failed(b"wrong password"));
        let err = log_snapshots(&backup(Payload::Volume), &mut runner).unwrap_err();
        assert_eq!(err.to_string(), "Listing snapshots failed: exit status: 1");
    }
}
