//! Global context for ccgx operations.
//!
//! Carries the working directory and the per-invocation switches that
//! components need, so nothing reads process-wide state on its own.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::core::manifest::{ManifestError, MANIFEST_FILE};
use crate::util::config::{load_config, Config, PROJECT_CONFIG_FILE};

/// Project directories for ccgx
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("org", "gx", "ccgx"));

/// Global context containing configuration paths and switches.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Log every subprocess invocation at info level
    trace_commands: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext {
            cwd,
            trace_commands: false,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            trace_commands: false,
        }
    }

    /// Enable or disable subprocess tracing.
    pub fn with_trace_commands(mut self, trace: bool) -> Self {
        self.trace_commands = trace;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Whether subprocess invocations should be logged.
    pub fn trace_commands(&self) -> bool {
        self.trace_commands
    }

    /// Get the global configuration file path, if the platform has one.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the merged configuration for a module rooted at `root`.
    pub fn load_config(&self, root: &Path) -> Config {
        load_config(
            self.global_config_path().as_deref(),
            &root.join(PROJECT_CONFIG_FILE),
        )
    }

    /// Find `go.mod` starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, ManifestError> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(MANIFEST_FILE);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(ManifestError::NotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }

    /// Find the module root (directory containing go.mod).
    pub fn find_module_root(&self) -> Result<PathBuf, ManifestError> {
        let manifest = self.find_manifest()?;
        Ok(manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone()))
    }
}
