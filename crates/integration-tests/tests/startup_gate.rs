//! Startup gate: flags -> options -> app root validation -> engine
//!
//! Nothing past validation may run when the app root is not bootable.

use clap::Parser;
use hauler_core::application::{interrupt_channel, validate_environment, Interrupt, Supervisor};
use hauler_core::domain::{DebugLevel, ShutdownPolicy, SupervisorState};
use hauler_core::error::AppError;
use hauler_core::port::engine::mocks::{EngineCall, MockEngineFactory};
use hauler_core::port::WaitKind;
use hauler_daemon::settings;
use hauler_daemon::Cli;
use std::sync::Arc;
use std::time::Duration;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("hauler").chain(args.iter().copied())).unwrap()
}

fn app_root() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::write(dir.path().join("config/boot.toml"), "name = \"shop\"\n").unwrap();
    dir
}

/// Mirrors the daemon's order: resolve, validate, then build the engine
async fn start_with(args: &[&str], factory: MockEngineFactory) -> Result<SupervisorState, AppError> {
    let options = Arc::new(settings::resolve(&cli(args), |_| None)?);
    let ctx = validate_environment(&options)?;

    let (tx, interrupts) = interrupt_channel();
    tx.send(Interrupt::Interrupt);

    let mut supervisor = Supervisor::new(factory, ctx);
    supervisor.run(options, interrupts).await?;
    Ok(supervisor.state())
}

#[tokio::test]
async fn test_missing_boot_descriptor_never_builds_engine() {
    let empty = tempfile::tempdir().unwrap();
    let root = empty.path().to_string_lossy().into_owned();
    let factory = MockEngineFactory::new();

    let err = start_with(&["-r", &root], factory.clone()).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidAppRoot { .. }));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(factory.build_count(), 0);
    assert!(factory.log().calls().is_empty());
}

#[tokio::test]
async fn test_invalid_concurrency_stops_before_validation() {
    let dir = app_root();
    let factory = MockEngineFactory::new();
    let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    std::fs::write(file.path(), "concurrency = -3\n").unwrap();
    let config = file.path().to_string_lossy().into_owned();
    let root = dir.path().to_string_lossy().into_owned();

    let err = start_with(&["-r", &root, "-C", &config], factory.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Domain(_)));
    assert_eq!(factory.build_count(), 0);
}

#[tokio::test]
async fn test_valid_root_runs_full_lifecycle() {
    let dir = app_root();
    let root = dir.path().to_string_lossy().into_owned();
    let factory = MockEngineFactory::new();

    let state = start_with(
        &["-r", &root, "-q", "critical,3", "-q", "low", "-s", "sqlite::memory:"],
        factory.clone(),
    )
    .await
    .unwrap();

    assert_eq!(state, SupervisorState::Terminated);
    assert_eq!(
        factory.log().calls(),
        vec![
            EngineCall::New("sqlite::memory:".to_string()),
            EngineCall::Start,
            EngineCall::Stop,
            EngineCall::Wait(WaitKind::Shutdown),
        ]
    );
}

#[test]
fn test_run_context_from_flags() {
    let dir = app_root();
    let root = dir.path().to_string_lossy().into_owned();

    let options = settings::resolve(&cli(&["-r", &root, "-v", "-t", "8"]), |_| None).unwrap();
    let ctx = validate_environment(&options).unwrap();

    assert_eq!(ctx.debug, DebugLevel::Verbose);
    assert_eq!(ctx.shutdown, ShutdownPolicy::Deadline(Duration::from_secs(8)));
}
