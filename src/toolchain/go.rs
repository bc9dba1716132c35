//! The Go toolchain as host package manager and compiler.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::toolchain::{HostToolchain, ToolchainError, CFLAGS_VAR};
use crate::util::config::ToolchainSettings;
use crate::util::process::{append_flags, find_executable, ProcessBuilder};

/// Subset of `go env -json` ccgx reads.
#[derive(Debug, Deserialize)]
struct GoEnv {
    #[serde(rename = "GOMODCACHE", default)]
    gomodcache: Option<String>,
}

/// A detected `go` binary.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    go: PathBuf,
    trace: bool,
}

impl GoToolchain {
    /// Wrap a `go` binary without checking it.
    pub fn new(go: PathBuf, trace: bool) -> Self {
        GoToolchain { go, trace }
    }

    /// Locate and verify the Go toolchain.
    ///
    /// Uses `toolchain.go` from the configuration when set, otherwise the
    /// `go` found in PATH. `trace` makes every subprocess invocation visible
    /// at info level.
    pub fn detect(settings: &ToolchainSettings, trace: bool) -> Result<Self> {
        let go = match &settings.go {
            Some(go) => go.clone(),
            None => find_executable("go").ok_or_else(|| ToolchainError::NotFound {
                tool: "go".to_string(),
            })?,
        };

        let toolchain = GoToolchain::new(go, trace);
        let output = ProcessBuilder::new(&toolchain.go)
            .arg("version")
            .trace(trace)
            .exec()
            .map_err(|e| ToolchainError::Invalid {
                path: toolchain.go.clone(),
                reason: format!("{:#}", e),
            })?;
        if !output.status.success() {
            return Err(ToolchainError::Invalid {
                path: toolchain.go.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        tracing::debug!(
            "Using {} ({})",
            toolchain.go.display(),
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(toolchain)
    }

    /// A `go` invocation running in `root`.
    pub fn command(&self, root: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.go).cwd(root).trace(self.trace)
    }

    /// `go run <tool>@<version> <args...>` running in `root`.
    pub fn run_tool<I, S>(&self, root: &Path, tool: &str, version: &str, args: I) -> ProcessBuilder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.command(root)
            .arg("run")
            .arg(format!("{}@{}", tool, version))
            .args(args)
    }

    /// A `go` invocation with `root` appended to the C include path.
    fn cgo_command(&self, root: &Path) -> ProcessBuilder {
        let existing = std::env::var(CFLAGS_VAR).ok();
        let flags = append_flags(existing.as_deref(), &format!("-I {}", root.display()));
        self.command(root).env(CFLAGS_VAR, flags)
    }
}

impl HostToolchain for GoToolchain {
    fn cache_root(&self) -> Result<PathBuf> {
        let output = ProcessBuilder::new(&self.go)
            .args(["env", "-json", "GOMODCACHE"])
            .trace(self.trace)
            .exec_and_check()?;

        let env: GoEnv = serde_json::from_slice(&output.stdout)
            .context("failed to parse `go env -json` output")?;
        match env.gomodcache {
            Some(root) if !root.is_empty() => Ok(PathBuf::from(root)),
            _ => Err(ToolchainError::MissingEnv {
                key: "GOMODCACHE".to_string(),
            }
            .into()),
        }
    }

    fn mod_init(&self, root: &Path, name: &str) -> Result<()> {
        self.command(root).args(["mod", "init", name]).run()
    }

    fn tidy(&self, root: &Path) -> Result<()> {
        self.command(root).args(["mod", "tidy"]).run()
    }

    fn build_archive(&self, root: &Path, source: &Path, output: &Path) -> Result<()> {
        self.cgo_command(root)
            .args(["build", "-buildmode=c-archive", "-o"])
            .arg(output)
            .arg(source)
            .run()
    }

    fn build_header(&self, root: &Path, source: &Path, output: &Path) -> Result<()> {
        let objdir = tempfile::Builder::new()
            .prefix("ccgx-cgo")
            .tempdir()
            .context("failed to create cgo object directory")?;

        self.cgo_command(root)
            .args(["tool", "cgo", "-objdir"])
            .arg(objdir.path())
            .arg("-exportheader")
            .arg(output)
            .arg(source)
            .run()
    }
}
