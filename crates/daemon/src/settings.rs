// Settings layering: defaults < config file < HAULER_QUEUE_URL < CLI flags

use crate::cli::Cli;
use config::{Config, File};
use hauler_core::domain::options::{DEFAULT_QUEUE_LOCATOR, QUEUE_URL_ENV};
use hauler_core::domain::{DomainError, QueueSpec, RuntimeOptions};
use hauler_core::error::{AppError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Keys accepted in a `-C` config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub verbose: Option<bool>,
    /// `NAME[,WEIGHT]` entries
    pub queues: Option<Vec<String>>,
    pub concurrency: Option<i64>,
    pub server: Option<String>,
    pub environment: Option<String>,
    pub rails: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub pidfile: Option<PathBuf>,
    pub logfile: Option<PathBuf>,
}

impl FileSettings {
    /// Load a TOML settings file
    pub fn load(path: &Path) -> Result<Self> {
        Config::builder()
            .add_source(File::from(path).required(true))
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    fn queue_specs(&self) -> Result<Option<Vec<QueueSpec>>> {
        self.queues
            .as_ref()
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| entry.parse::<QueueSpec>().map_err(AppError::from))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()
    }

    fn concurrency(&self) -> Result<Option<usize>> {
        match self.concurrency {
            Some(n) if n >= 1 => Ok(Some(n as usize)),
            Some(n) => Err(DomainError::InvalidConcurrency(n.to_string()).into()),
            None => Ok(None),
        }
    }
}

/// Expand a leading `~` in a user-supplied path
fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Merge every settings layer into validated runtime options
///
/// `lookup` reads environment variables (injected for testing).
pub fn resolve<F>(cli: &Cli, lookup: F) -> Result<RuntimeOptions>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match &cli.config {
        Some(path) => {
            let path = expand(path);
            debug!(path = %path.display(), "Loading settings file");
            FileSettings::load(&path)?
        }
        None => FileSettings::default(),
    };

    let mut builder = RuntimeOptions::builder();

    // Queues from the command line replace the file's list wholesale
    if !cli.queues.is_empty() {
        builder = builder.queues(cli.queues.clone());
    } else if let Some(specs) = file.queue_specs()? {
        if !specs.is_empty() {
            builder = builder.queues(specs);
        }
    }

    // The file value is only checked when no flag overrides it
    let concurrency = match cli.concurrency {
        Some(c) => Some(c.get()),
        None => file.concurrency()?,
    };
    if let Some(n) = concurrency {
        builder = builder.concurrency(n);
    }

    let locator = cli
        .server
        .clone()
        .or_else(|| lookup(QUEUE_URL_ENV).filter(|url| !url.trim().is_empty()))
        .or_else(|| file.server.clone())
        .unwrap_or_else(|| DEFAULT_QUEUE_LOCATOR.to_string());
    builder = builder
        .queue_locator(locator)
        .verbose(cli.verbose || file.verbose.unwrap_or(false));

    if let Some(environment) = cli.environment.clone().or(file.environment) {
        builder = builder.environment(environment);
    }
    if let Some(root) = cli.rails.as_ref().or(file.rails.as_ref()) {
        builder = builder.app_root(expand(root));
    }
    if let Some(seconds) = cli.timeout.or(file.timeout) {
        builder = builder.shutdown_timeout(Duration::from_secs(seconds));
    }
    if let Some(path) = cli.pidfile.as_ref().or(file.pidfile.as_ref()) {
        builder = builder.pidfile(expand(path));
    }
    if let Some(path) = cli.logfile.as_ref().or(file.logfile.as_ref()) {
        builder = builder.logfile(expand(path));
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hauler").chain(args.iter().copied())).unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let options = resolve(&cli(&[]), no_env).unwrap();

        assert_eq!(options.queues.as_slice(), ["default"]);
        assert_eq!(options.concurrency.get(), 25);
        assert!(!options.verbose);
        assert_eq!(options.environment, "production");
        assert_eq!(options.app_root, PathBuf::from("."));
        assert_eq!(options.queue_locator, DEFAULT_QUEUE_LOCATOR);
        assert_eq!(options.shutdown_timeout, None);
    }

    #[test]
    fn test_weighted_queues_replace_seed() {
        let options = resolve(&cli(&["-q", "critical,3", "-q", "low"]), no_env).unwrap();
        assert_eq!(
            options.queues.as_slice(),
            ["critical", "critical", "critical", "low"]
        );
    }

    #[test]
    fn test_env_locator_beats_default() {
        let env = HashMap::from([(QUEUE_URL_ENV, "sqlite:///var/lib/q.db".to_string())]);
        let options = resolve(&cli(&[]), |key| env.get(key).cloned()).unwrap();
        assert_eq!(options.queue_locator, "sqlite:///var/lib/q.db");

        let options = resolve(&cli(&["-s", "sqlite::memory:"]), |key| env.get(key).cloned())
            .unwrap();
        assert_eq!(options.queue_locator, "sqlite::memory:");
    }

    #[test]
    fn test_file_supplies_values() {
        let file = settings_file(
            r#"
            verbose = true
            queues = ["mail,2", "reports"]
            concurrency = 5
            server = "sqlite://from-file.db"
            environment = "staging"
            rails = "/srv/shop"
            timeout = 12
            "#,
        );
        let path = file.path().to_string_lossy().into_owned();

        let options = resolve(&cli(&["-C", &path]), no_env).unwrap();

        assert!(options.verbose);
        assert_eq!(options.queues.as_slice(), ["mail", "mail", "reports"]);
        assert_eq!(options.concurrency.get(), 5);
        assert_eq!(options.queue_locator, "sqlite://from-file.db");
        assert_eq!(options.environment, "staging");
        assert_eq!(options.app_root, PathBuf::from("/srv/shop"));
        assert_eq!(options.shutdown_timeout, Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = settings_file(
            r#"
            queues = ["mail"]
            concurrency = 5
            server = "sqlite://from-file.db"
            environment = "staging"
            "#,
        );
        let path = file.path().to_string_lossy().into_owned();

        let options = resolve(
            &cli(&[
                "-C", &path, "-q", "critical", "-c", "2", "-s", "sqlite::memory:", "-e",
                "production",
            ]),
            no_env,
        )
        .unwrap();

        assert_eq!(options.queues.as_slice(), ["critical"]);
        assert_eq!(options.concurrency.get(), 2);
        assert_eq!(options.queue_locator, "sqlite::memory:");
        assert_eq!(options.environment, "production");
    }

    #[test]
    fn test_file_concurrency_validated() {
        let file = settings_file("concurrency = 0\n");
        let path = file.path().to_string_lossy().into_owned();

        let err = resolve(&cli(&["-C", &path]), no_env).unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidConcurrency(_))
        ));
    }

    #[test]
    fn test_cli_concurrency_overrides_invalid_file_value() {
        let file = settings_file("concurrency = 0\n");
        let path = file.path().to_string_lossy().into_owned();

        let options = resolve(&cli(&["-C", &path, "-c", "4"]), no_env).unwrap();
        assert_eq!(options.concurrency.get(), 4);
    }

    #[test]
    fn test_file_queue_validated() {
        let file = settings_file("queues = [\"mail,0\"]\n");
        let path = file.path().to_string_lossy().into_owned();

        let err = resolve(&cli(&["-C", &path]), no_env).unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidQueueWeight { .. })
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        let file = settings_file("workers = 3\n");
        let path = file.path().to_string_lossy().into_owned();

        let err = resolve(&cli(&["-C", &path]), no_env).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = resolve(&cli(&["-C", "/nonexistent/hauler.toml"]), no_env).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(resolve(&cli(&["-t", "0"]), no_env).is_err());
    }
}
