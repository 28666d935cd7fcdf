// Application Layer - Use Cases, Supervisor and the bundled Engine

pub mod client;
pub mod interrupt;
pub mod manager;
pub mod supervisor;
pub mod validator;

// Re-exports
pub use client::{Client, PushRequest, QueueStats};
pub use interrupt::{interrupt_channel, Interrupt, InterruptSender, Interrupts};
pub use manager::{shutdown_channel, Manager, ShutdownSender, ShutdownToken};
pub use supervisor::{Supervisor, FOREVER};
pub use validator::validate_environment;
