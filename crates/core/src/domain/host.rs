// Host Application Model
//
// Produced once by the bootstrapper; read-only afterwards.

use super::job::JobClass;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Relative path whose presence marks a host application root
pub const BOOT_DESCRIPTOR: &str = "config/boot.toml";

/// Directory holding per-environment configuration overlays
pub const ENVIRONMENTS_DIR: &str = "config/environments";

/// Variables that carry the environment name into handler processes
pub const ENVIRONMENT_VARS: [&str; 2] = ["RAILS_ENV", "HAULER_ENV"];

/// A resolved job handler (an executable inside the host application)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Booted host application
#[derive(Debug, Clone, Default)]
pub struct HostApp {
    pub root: PathBuf,
    pub name: String,
    pub environment: String,
    /// Process-wide configuration handed to every handler process
    pub env: BTreeMap<String, String>,
    handlers: HashMap<JobClass, Handler>,
}

impl HostApp {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>, environment: &str) -> Self {
        let env = ENVIRONMENT_VARS
            .iter()
            .map(|key| (key.to_string(), environment.to_string()))
            .collect();

        Self {
            root: root.into(),
            name: name.into(),
            environment: environment.to_string(),
            env,
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, class: JobClass, handler: Handler) {
        self.handlers.insert(class, handler);
    }

    pub fn handler(&self, class: &JobClass) -> Option<&Handler> {
        self.handlers.get(class)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Registered classes, sorted for stable output
    pub fn classes(&self) -> Vec<&JobClass> {
        let mut classes: Vec<&JobClass> = self.handlers.keys().collect();
        classes.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        classes
    }

    pub fn boot_descriptor(&self) -> PathBuf {
        boot_descriptor_path(&self.root)
    }
}

/// `root` joined with [`BOOT_DESCRIPTOR`]
pub fn boot_descriptor_path(root: &Path) -> PathBuf {
    root.join(BOOT_DESCRIPTOR)
}
