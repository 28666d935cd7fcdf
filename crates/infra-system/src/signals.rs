//! OS signal forwarding.
//!
//! Translates process signals into [`Interrupt`] events for the supervisor.
//! Every signal is forwarded; deciding what a repeated interrupt means is the
//! supervisor's job.
//!
//! ## Unix
//! - **SIGINT** (Ctrl-C in terminal) becomes [`Interrupt::Interrupt`]
//! - **SIGTERM** (default kill signal, used by systemd/Kubernetes) becomes
//!   [`Interrupt::Terminate`]
//!
//! ## Windows
//! Only [`tokio::signal::ctrl_c`] is observed.

use hauler_core::application::{Interrupt, InterruptSender};
use tokio::task::JoinHandle;
use tracing::debug;

/// Install signal handlers and forward every signal to `tx`.
///
/// Handlers are registered before this returns. The listener exits once the
/// receiving side is dropped.
#[cfg(unix)]
pub fn spawn_signal_listener(tx: InterruptSender) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            let interrupt = tokio::select! {
                Some(()) = sigint.recv() => Interrupt::Interrupt,
                Some(()) = sigterm.recv() => Interrupt::Terminate,
                else => break,
            };

            debug!(signal = %interrupt, "Signal received");
            if !tx.send(interrupt) {
                break;
            }
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_signal_listener(tx: InterruptSender) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            debug!(signal = %Interrupt::Interrupt, "Signal received");
            if !tx.send(Interrupt::Interrupt) {
                break;
            }
        }
    }))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use hauler_core::application::interrupt_channel;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_forwarded_as_terminate() {
        let (tx, mut interrupts) = interrupt_channel();
        let _listener = spawn_signal_listener(tx).unwrap();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        let received = tokio::time::timeout(Duration::from_secs(5), interrupts.next())
            .await
            .unwrap();
        assert_eq!(received, Interrupt::Terminate);
    }
}
