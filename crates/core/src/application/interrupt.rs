// Operator interrupts as channel events observed by the supervisor

use std::fmt;
use tokio::sync::mpsc;

/// Operator-initiated stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// SIGINT / Ctrl-C
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Interrupt => write!(f, "SIGINT"),
            Interrupt::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Delivers interrupts to the supervisor
#[derive(Clone)]
pub struct InterruptSender {
    tx: mpsc::UnboundedSender<Interrupt>,
}

impl InterruptSender {
    /// Returns false once the supervisor side is gone
    pub fn send(&self, interrupt: Interrupt) -> bool {
        self.tx.send(interrupt).is_ok()
    }
}

/// Receiving side, owned by the supervisor
pub struct Interrupts {
    rx: mpsc::UnboundedReceiver<Interrupt>,
}

impl Interrupts {
    /// Wait for the next interrupt.
    ///
    /// Never resolves once every sender has been dropped.
    pub async fn next(&mut self) -> Interrupt {
        match self.rx.recv().await {
            Some(interrupt) => interrupt,
            None => std::future::pending().await,
        }
    }
}

/// Create an interrupt channel
pub fn interrupt_channel() -> (InterruptSender, Interrupts) {
    let (tx, rx) = mpsc::unbounded_channel();
    (InterruptSender { tx }, Interrupts { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_interrupts_arrive_in_order() {
        let (tx, mut rx) = interrupt_channel();
        assert!(tx.send(Interrupt::Interrupt));
        assert!(tx.send(Interrupt::Terminate));

        assert_eq!(rx.next().await, Interrupt::Interrupt);
        assert_eq!(rx.next().await, Interrupt::Terminate);
    }

    #[tokio::test]
    async fn test_closed_channel_never_resolves() {
        let (tx, mut rx) = interrupt_channel();
        drop(tx);

        let result = tokio::time::timeout(Duration::from_millis(20), rx.next()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (tx, rx) = interrupt_channel();
        drop(rx);
        assert!(!tx.send(Interrupt::Interrupt));
    }
}
