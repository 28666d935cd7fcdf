//! Logging setup
//!
//! `RUST_LOG` wins over the level derived from the run context.
//! `HAULER_LOG_FORMAT=json` switches to JSON lines, anything else is pretty.

use anyhow::{Context, Result};
use hauler_core::domain::RunContext;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "HAULER_LOG_FORMAT";

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(ctx: &RunContext) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(ctx.debug.filter_directive()))
}

/// Install the global subscriber.
///
/// With a logfile the returned guard must live until exit; dropping it
/// flushes the non-blocking writer.
pub fn init_logging(ctx: &RunContext, logfile: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

    let (writer, guard) = match logfile {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open logfile {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };
    let ansi = logfile.is_none();

    let installed = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(default_filter(ctx))
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(default_filter(ctx))
            .with(fmt::layer().pretty().with_ansi(ansi).with_writer(writer))
            .try_init(),
    };
    installed.context("Failed to install tracing subscriber")?;

    Ok(guard)
}
