// Boot the host application, then supervise the engine built for it

use crate::pidfile::Pidfile;
use anyhow::{Context, Result};
use hauler_core::application::{Interrupts, Supervisor};
use hauler_core::domain::{HostApp, RunContext, RuntimeOptions, SupervisorState};
use hauler_core::port::{Bootstrapper, EngineFactory};
use std::sync::Arc;

/// Boot once, write the pidfile, then run the supervisor to completion.
///
/// A boot failure is returned before any engine is constructed. The pidfile
/// is removed when this returns.
pub async fn boot_and_supervise<B, F, M>(
    bootstrapper: &B,
    factory_for: M,
    options: Arc<RuntimeOptions>,
    ctx: RunContext,
    interrupts: Interrupts,
) -> Result<SupervisorState>
where
    B: Bootstrapper + ?Sized,
    F: EngineFactory,
    M: FnOnce(Arc<HostApp>) -> F,
{
    let host = bootstrapper
        .boot(&options.app_root, &options.environment)
        .context("Failed to boot host application")?;

    let _pidfile = options
        .pidfile
        .as_deref()
        .map(Pidfile::create)
        .transpose()
        .context("Failed to write pidfile")?;

    let mut supervisor = Supervisor::new(factory_for(Arc::new(host)), ctx);
    supervisor.run(options, interrupts).await?;

    Ok(supervisor.state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hauler_core::application::{interrupt_channel, Interrupt};
    use hauler_core::error::AppError;
    use hauler_core::port::bootstrapper::mocks::MockBootstrapper;
    use hauler_core::port::engine::mocks::{EngineCall, MockEngineFactory};

    #[tokio::test]
    async fn test_boot_failure_never_builds_engine() {
        let bootstrapper = MockBootstrapper::failing("config/boot.toml: missing field `name`");
        let factory = MockEngineFactory::new();
        let (tx, interrupts) = interrupt_channel();
        tx.send(Interrupt::Interrupt);

        let err = boot_and_supervise(
            &bootstrapper,
            |_| factory.clone(),
            Arc::new(RuntimeOptions::default()),
            RunContext::default(),
            interrupts,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Bootstrap(_))
        ));
        assert_eq!(bootstrapper.call_count(), 1);
        assert_eq!(factory.build_count(), 0);
        assert!(factory.log().calls().is_empty());
    }

    #[tokio::test]
    async fn test_booted_app_is_supervised() {
        let dir = tempfile::tempdir().unwrap();
        let pid_path = dir.path().join("hauler.pid");
        let options = Arc::new(
            RuntimeOptions::builder()
                .pidfile(pid_path.clone())
                .build()
                .unwrap(),
        );
        let bootstrapper = MockBootstrapper::new().with_handler("Mailer", "bin/mailer");
        let factory = MockEngineFactory::new();
        let (tx, interrupts) = interrupt_channel();
        tx.send(Interrupt::Terminate);

        let state = boot_and_supervise(
            &bootstrapper,
            |host| {
                assert_eq!(host.handler_count(), 1);
                factory.clone()
            },
            options,
            RunContext::default(),
            interrupts,
        )
        .await
        .unwrap();

        assert_eq!(state, SupervisorState::Terminated);
        assert_eq!(factory.build_count(), 1);
        assert_eq!(factory.log().count(&EngineCall::Stop), 1);
        assert!(!pid_path.exists());
    }
}
