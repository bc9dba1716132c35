//! Host toolchain abstraction.
//!
//! The host toolchain owns the module cache, reconciles `go.mod`/`go.sum`
//! and compiles the synthesized aggregation source into a C archive. ccgx
//! talks to it only through [`HostToolchain`], so every pipeline stage can
//! be exercised against an in-memory double.

pub mod go;

use std::path::{Path, PathBuf};

use anyhow::Result;
use miette::Diagnostic;
use thiserror::Error;

pub use go::GoToolchain;

/// Environment variable holding flags for the native C compiler.
pub const CFLAGS_VAR: &str = "CGO_CFLAGS";

/// Errors raised by the host toolchain or by external tools it runs.
#[derive(Debug, Error, Diagnostic)]
pub enum ToolchainError {
    #[error("`{tool}` not found in PATH")]
    #[diagnostic(
        code(ccgx::toolchain::not_found),
        help("Install Go from https://go.dev/dl/ or set `toolchain.go` in ccgx.toml")
    )]
    NotFound { tool: String },

    #[error("invalid Go installation at `{}`: {reason}", path.display())]
    #[diagnostic(
        code(ccgx::toolchain::invalid),
        help("Install Go from https://go.dev/dl/ or set `toolchain.go` in ccgx.toml")
    )]
    Invalid { path: PathBuf, reason: String },

    #[error("Go environment variable `{key}` not found")]
    #[diagnostic(code(ccgx::toolchain::missing_env))]
    MissingEnv { key: String },

    #[error("unknown GX version")]
    #[diagnostic(
        code(ccgx::toolchain::unknown_gx_version),
        help("Run `go get github.com/gx-org/gx` or set `toolchain.gx_version` in ccgx.toml")
    )]
    UnknownGxVersion,

    #[error("`{command}` failed with exit code {}{}", fmt_code(.code), fmt_stderr(.stderr))]
    #[diagnostic(code(ccgx::toolchain::failed))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn fmt_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "<signal>".to_string(), |c| c.to_string())
}

fn fmt_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr.trim_end())
    }
}

/// Operations ccgx needs from the host package manager and compiler.
pub trait HostToolchain {
    /// Root directory of the shared module cache.
    fn cache_root(&self) -> Result<PathBuf>;

    /// Create a new `go.mod` for module `name` in `root`.
    fn mod_init(&self, root: &Path, name: &str) -> Result<()>;

    /// Reconcile `go.mod` and `go.sum` with the module's imports.
    fn tidy(&self, root: &Path) -> Result<()>;

    /// Compile `source` into the static archive `output`.
    ///
    /// `root` is appended to the native include path.
    fn build_archive(&self, root: &Path, source: &Path, output: &Path) -> Result<()>;

    /// Generate the C header for the exports of `source` into `output`.
    ///
    /// `root` is appended to the native include path.
    fn build_header(&self, root: &Path, source: &Path, output: &Path) -> Result<()>;
}
