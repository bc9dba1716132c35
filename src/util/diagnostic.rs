//! User-friendly diagnostic messages.
//!
//! Every fatal error is rendered with its full cause chain. Errors that
//! carry remediation advice (through `miette::Diagnostic::help`) get a
//! `help:` section so the user knows which command to re-run.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;

use crate::binder::BindError;
use crate::core::imports::ImportError;
use crate::core::manifest::ManifestError;
use crate::ops::discover::DiscoveryError;
use crate::ops::link::LinkError;
use crate::sources::cache::CacheError;
use crate::toolchain::ToolchainError;

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let prefix = if color {
            "\x1b[1;31merror\x1b[0m"
        } else {
            "error"
        };
        output.push_str(&format!("{}: {}\n", prefix, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        if !self.suggestions.is_empty() {
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            for suggestion in &self.suggestions {
                output.push_str(&format!("{}: {}\n", help_prefix, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

fn help_of(cause: &(dyn std::error::Error + 'static)) -> Option<String> {
    fn help<D: MietteDiagnostic>(d: &D) -> Option<String> {
        d.help().map(|h| h.to_string())
    }

    if let Some(e) = cause.downcast_ref::<ManifestError>() {
        return help(e);
    }
    if let Some(e) = cause.downcast_ref::<CacheError>() {
        return help(e);
    }
    if let Some(e) = cause.downcast_ref::<LinkError>() {
        return help(e);
    }
    if let Some(e) = cause.downcast_ref::<DiscoveryError>() {
        return help(e);
    }
    if let Some(e) = cause.downcast_ref::<ImportError>() {
        return help(e);
    }
    if let Some(e) = cause.downcast_ref::<BindError>() {
        return help(e);
    }
    if let Some(e) = cause.downcast_ref::<ToolchainError>() {
        return help(e);
    }
    None
}

fn location_of(cause: &(dyn std::error::Error + 'static)) -> Option<PathBuf> {
    if let Some(e) = cause.downcast_ref::<ImportError>() {
        return Some(e.file.clone());
    }
    if let Some(e) = cause.downcast_ref::<DiscoveryError>() {
        return match e {
            DiscoveryError::Walk { path, .. } | DiscoveryError::Read { path, .. } => {
                Some(path.clone())
            }
            DiscoveryError::BadImport(e) => Some(e.file.clone()),
        };
    }
    if let Some(e) = cause.downcast_ref::<CacheError>() {
        return match e {
            CacheError::NotFound { path, .. } | CacheError::NotADirectory { path, .. } => {
                Some(path.clone())
            }
        };
    }
    None
}

/// Build a diagnostic for a fatal error, collecting help text from every
/// typed error in the cause chain. The innermost path-carrying error sets
/// the location.
pub fn from_error(err: &anyhow::Error) -> Diagnostic {
    let mut diag = Diagnostic::error(format!("{:#}", err));
    for cause in err.chain() {
        if let Some(path) = location_of(cause) {
            diag = diag.with_location(path);
        }
        if let Some(help) = help_of(cause) {
            if !diag.suggestions.contains(&help) {
                diag = diag.with_suggestion(help);
            }
        }
    }
    diag
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
