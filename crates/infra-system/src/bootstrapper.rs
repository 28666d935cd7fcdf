// Host application bootstrapper
//
// Layers config/boot.toml, config/environments/<env>.toml and HAULER_APP__*
// variables, then resolves every declared handler to an executable file.

use config::{Config, Environment, File};
use hauler_core::domain::host::{boot_descriptor_path, ENVIRONMENTS_DIR, ENVIRONMENT_VARS};
use hauler_core::domain::{Handler, HostApp, JobClass};
use hauler_core::error::{AppError, Result};
use hauler_core::port::Bootstrapper;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of environment variables overriding host configuration
pub const ENV_PREFIX: &str = "HAULER_APP";

#[derive(Debug, Deserialize)]
struct BootConfig {
    name: Option<String>,
    /// `KEY=VALUE` entries exported to every handler
    #[serde(default)]
    env: Vec<String>,
    #[serde(default)]
    handlers: Vec<HandlerConfig>,
}

#[derive(Debug, Deserialize)]
struct HandlerConfig {
    class: String,
    command: String,
    #[serde(default)]
    args: Vec<String>,
}

/// Boots a host application laid out as `config/boot.toml` plus optional
/// per-environment overlays
#[derive(Debug, Default)]
pub struct HostBootstrapper {
    env_source: Option<HashMap<String, String>>,
}

impl HostBootstrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `vars` instead of the process environment
    pub fn with_env_source(vars: HashMap<String, String>) -> Self {
        Self {
            env_source: Some(vars),
        }
    }

    fn load(&self, root: &Path, environment: &str) -> Result<BootConfig> {
        let overlay = root
            .join(ENVIRONMENTS_DIR)
            .join(format!("{}.toml", environment));

        let settings = Config::builder()
            .add_source(File::from(boot_descriptor_path(root)).required(true))
            .add_source(File::from(overlay).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(self.env_source.clone()),
            )
            .build()
            .map_err(|e| AppError::Bootstrap(format!("Failed to load host config: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| AppError::Bootstrap(format!("Invalid host config: {}", e)))
    }
}

/// Resolve `command` against the app root; it must name an existing file
fn resolve_program(root: &Path, class: &str, command: &str) -> Result<PathBuf> {
    let candidate = root.join(command);
    if !candidate.is_file() {
        return Err(AppError::Bootstrap(format!(
            "Handler for {} not found at {}",
            class,
            candidate.display()
        )));
    }
    std::fs::canonicalize(&candidate).map_err(|e| {
        AppError::Bootstrap(format!("Cannot resolve {}: {}", candidate.display(), e))
    })
}

fn parse_env_entry(entry: &str) -> Result<(String, String)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(AppError::Bootstrap(format!(
            "Invalid env entry {:?} (expected KEY=VALUE)",
            entry
        ))),
    }
}

impl Bootstrapper for HostBootstrapper {
    fn boot(&self, root: &Path, environment: &str) -> Result<HostApp> {
        let config = self.load(root, environment)?;

        let name = config.name.unwrap_or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "app".to_string())
        });
        let mut host = HostApp::new(root, name, environment);

        for entry in &config.env {
            let (key, value) = parse_env_entry(entry)?;
            if ENVIRONMENT_VARS.contains(&key.as_str()) {
                debug!(key = %key, "Ignoring env entry, set from the environment name");
                continue;
            }
            host.env.insert(key, value);
        }

        // Eager preload: every class resolved before processing starts
        for handler in config.handlers {
            let class = handler.class.trim();
            if class.is_empty() {
                return Err(AppError::Bootstrap(
                    "Handler declared without a class".to_string(),
                ));
            }
            let class = JobClass::new(class);
            if host.handler(&class).is_some() {
                return Err(AppError::Bootstrap(format!(
                    "Handler for {} declared twice",
                    class
                )));
            }

            let program = resolve_program(root, class.as_str(), &handler.command)?;
            debug!(class = %class, program = %program.display(), "Handler resolved");
            host.register(
                class,
                Handler {
                    program,
                    args: handler.args,
                },
            );
        }

        info!(
            app = %host.name,
            environment = %host.environment,
            handlers = host.handler_count(),
            "Host application booted"
        );
        Ok(host)
    }
}
