// Hauler Daemon - composition root of the `hauler` worker

pub mod cli;
pub mod factory;
pub mod pidfile;
pub mod runner;
pub mod settings;
pub mod telemetry;

pub use cli::Cli;
pub use factory::ManagerFactory;
pub use pidfile::Pidfile;
pub use runner::boot_and_supervise;
