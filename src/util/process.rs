//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result};

use crate::toolchain::ToolchainError;

/// Builder for subprocess execution.
///
/// Every invocation is logged before it runs: at `info` level when command
/// tracing was requested (`ccgx --debug`), at `debug` level otherwise.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
    trace: bool,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
            trace: false,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable for the child, overriding the inherited value.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Log the invocation at `info` level instead of `debug`.
    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get an environment override, if one was set.
    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(&self.env);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    fn log(&self) {
        let mut line = String::new();
        for (key, value) in &self.env {
            line.push_str(&format!("{}={:?} ", key, value));
        }
        line.push_str(&self.display_command());
        if self.trace {
            tracing::info!("exec: {}", line);
        } else {
            tracing::debug!("exec: {}", line);
        }
    }

    /// Execute the command with captured stdout/stderr and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        self.log();
        let output = self
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;
        Ok(output)
    }

    /// Execute with captured output and require success.
    ///
    /// On failure the child's stderr is carried verbatim in the error.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            return Err(ToolchainError::Failed {
                command: self.display_command(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }
        Ok(output)
    }

    /// Execute with inherited stdio, so the child's diagnostics reach the
    /// user directly, and require success.
    pub fn run(&self) -> Result<()> {
        self.log();
        let status = self
            .build_command()
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        if !status.success() {
            return Err(ToolchainError::Failed {
                command: self.display_command(),
                code: status.code(),
                stderr: String::new(),
            }
            .into());
        }
        Ok(())
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Append `flag` to a space-separated flags value, keeping whatever the
/// user already set.
pub fn append_flags(existing: Option<&str>, flag: &str) -> String {
    match existing.map(str::trim) {
        Some(existing) if !existing.is_empty() => format!("{} {}", existing, flag),
        _ => flag.to_string(),
    }
}
