use crate::flatten::hash::MAX_CONCURRENT_FETCHES;
use crate::flatten::ResolveOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration for the npmflat CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory whose `node_modules` tree is listed.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Native-addon mode: capture executables of root-level resources.
    pub native_addons: bool,

    /// Maximum number of tarball hashes fetched at once.
    pub max_concurrent_fetches: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            native_addons: false,
            max_concurrent_fetches: MAX_CONCURRENT_FETCHES,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Enable or disable native-addon mode.
    #[must_use]
    pub fn with_native_addons(mut self, native: bool) -> Self {
        self.native_addons = native;
        self
    }

    /// Set the hash fetch concurrency (at least 1).
    #[must_use]
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    /// Resolver options derived from this config.
    #[must_use]
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            native_addons: self.native_addons,
        }
    }
}
