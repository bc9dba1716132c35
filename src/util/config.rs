//! Configuration file support for ccgx.
//!
//! ccgx reads two configuration files:
//! - Global: `<platform config dir>/ccgx/config.toml` - User-wide defaults
//! - Project: `ccgx.toml` next to `go.mod` - Project-specific overrides
//!
//! Project config takes precedence over global config. Both are optional.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "ccgx.toml";

/// Default name of the staging directory, relative to the module root.
pub const DEFAULT_STAGING_DIR: &str = "gxdeps";

/// Default base name of the synthesized archive files.
pub const DEFAULT_ARCHIVE_NAME: &str = "carchive";

/// Module path of the GX toolchain; it also provides the GX standard library.
pub const GX_MODULE: &str = "github.com/gx-org/gx";

/// Native-interop shims every archive needs, whether or not a GX source
/// imports them.
pub const DEFAULT_SEEDS: &[&str] = &[
    "github.com/gx-org/gx/golang/binder/cgx",
    "github.com/gx-org/xlapjrt/cgx",
];

/// GX standard library packages. They are served by the GX module itself
/// and never need a blank import in the archive.
pub const DEFAULT_STANDARD_PACKAGES: &[&str] = &["dtype", "math", "num", "rand", "shapes"];

/// ccgx configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Staging directory settings
    pub staging: StagingConfig,

    /// Binding settings
    pub bind: BindConfig,

    /// Archive synthesis settings
    pub archive: ArchiveConfig,

    /// Host toolchain settings
    pub toolchain: ToolchainSettings,
}

/// Staging directory settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Directory (relative to the module root) holding links and generated files
    pub dir: Option<String>,
}

/// Binding settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Always write a BUILD.bazel next to each package's bindings
    pub emit_build_files: Option<bool>,

    /// Module providing the GX standard library (defaults to the GX module)
    pub stdlib: Option<String>,
}

/// Archive synthesis settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Base name of the aggregation source, archive and header
    pub name: Option<String>,

    /// Packages always imported by the archive
    pub seeds: Option<Vec<String>>,

    /// Packages provided by the standard library, never imported explicitly
    pub standard: Option<Vec<String>>,
}

/// Host toolchain settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the `go` binary (defaults to the one in PATH)
    pub go: Option<PathBuf>,

    /// Module cache root (defaults to `go env GOMODCACHE`)
    pub cache_root: Option<PathBuf>,

    /// GX version to use instead of the one required by go.mod
    pub gx_version: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.staging.dir.is_some() {
            self.staging.dir = other.staging.dir;
        }

        if other.bind.emit_build_files.is_some() {
            self.bind.emit_build_files = other.bind.emit_build_files;
        }
        if other.bind.stdlib.is_some() {
            self.bind.stdlib = other.bind.stdlib;
        }

        if other.archive.name.is_some() {
            self.archive.name = other.archive.name;
        }
        if other.archive.seeds.is_some() {
            self.archive.seeds = other.archive.seeds;
        }
        if other.archive.standard.is_some() {
            self.archive.standard = other.archive.standard;
        }

        if other.toolchain.go.is_some() {
            self.toolchain.go = other.toolchain.go;
        }
        if other.toolchain.cache_root.is_some() {
            self.toolchain.cache_root = other.toolchain.cache_root;
        }
        if other.toolchain.gx_version.is_some() {
            self.toolchain.gx_version = other.toolchain.gx_version;
        }
    }

    /// Staging directory name, relative to the module root.
    pub fn staging_dir(&self) -> &str {
        self.staging.dir.as_deref().unwrap_or(DEFAULT_STAGING_DIR)
    }

    /// Whether every bind writes a BUILD file.
    pub fn emit_build_files(&self) -> bool {
        self.bind.emit_build_files.unwrap_or(false)
    }

    /// Module path providing the GX standard library.
    pub fn stdlib_module(&self) -> &str {
        self.bind.stdlib.as_deref().unwrap_or(GX_MODULE)
    }

    /// Base name of the archive files.
    pub fn archive_name(&self) -> &str {
        self.archive.name.as_deref().unwrap_or(DEFAULT_ARCHIVE_NAME)
    }

    /// Packages always imported by the archive.
    pub fn archive_seeds(&self) -> Vec<String> {
        match &self.archive.seeds {
            Some(seeds) => seeds.clone(),
            None => DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Packages provided by the standard library.
    pub fn standard_packages(&self) -> Vec<String> {
        match &self.archive.standard {
            Some(standard) => standard.clone(),
            None => DEFAULT_STANDARD_PACKAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (ccgx.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Contents written to `ccgx.toml` by `ccgx init`.
pub fn default_project_config() -> String {
    format!(
        r#"# ccgx project configuration.

[staging]
dir = "{staging}"

[bind]
# emit_build_files = true

[archive]
name = "{archive}"
"#,
        staging = DEFAULT_STAGING_DIR,
        archive = DEFAULT_ARCHIVE_NAME,
    )
}
