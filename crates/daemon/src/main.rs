//! Hauler - worker supervisor entry point
//!
//! parse -> resolve settings -> validate app root -> logging -> boot host app
//! -> supervise the Manager until interrupted

use anyhow::{Context, Result};
use hauler_core::application::{interrupt_channel, validate_environment};
use hauler_core::domain::{RunContext, RuntimeOptions};
use hauler_daemon::{boot_and_supervise, settings, telemetry, Cli, ManagerFactory};
use hauler_infra_system::{spawn_signal_listener, HostBootstrapper};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_or_exit();

    let options = match settings::resolve(&cli, |key| std::env::var(key).ok()) {
        Ok(options) => Arc::new(options),
        Err(e) => {
            eprintln!("hauler: {}", e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let ctx = match validate_environment(&options) {
        Ok(ctx) => ctx,
        Err(e) => {
            let _guard = telemetry::init_logging(&RunContext::from_options(&options), None);
            error!(error = %e, "Please point hauler to a host application root");
            eprintln!("{}", Cli::usage());
            return ExitCode::from(1);
        }
    };

    let _log_guard = match telemetry::init_logging(&ctx, options.logfile.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("hauler: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(options, ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = format!("{:#}", e), "Hauler exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(options: Arc<RuntimeOptions>, ctx: RunContext) -> Result<()> {
    info!(
        version = hauler_core::VERSION,
        app_root = %options.app_root.display(),
        environment = %options.environment,
        "Hauler starting"
    );

    let (interrupt_tx, interrupts) = interrupt_channel();
    let _signals = spawn_signal_listener(interrupt_tx).context("Failed to install signal handlers")?;

    // Booted once; a failure here is fatal
    boot_and_supervise(
        &HostBootstrapper::new(),
        ManagerFactory::new,
        options,
        ctx,
        interrupts,
    )
    .await?;

    Ok(())
}
