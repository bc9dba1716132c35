//! `go.mod` parsing.
//!
//! ccgx only needs three things from the manifest: the module path, the Go
//! language version and the required modules. Every other directive
//! (`replace`, `exclude`, `retract`, `toolchain`, `godebug`, `tool`) is
//! skipped, including its block form.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::module::DependencyRef;

/// Name of the module manifest.
pub const MANIFEST_FILE: &str = "go.mod";

/// Errors raised while locating or parsing `go.mod`.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    #[error("could not find `go.mod` in `{}` or any parent directory", dir.display())]
    #[diagnostic(
        code(ccgx::manifest::not_found),
        help("Run `ccgx init <module name>` to create a new module")
    )]
    NotFound { dir: PathBuf },

    #[error("`{}` is not a directory", path.display())]
    #[diagnostic(code(ccgx::manifest::bad_root))]
    BadRoot { path: PathBuf },

    #[error("`go.mod` has no `module` directive")]
    #[diagnostic(code(ccgx::manifest::missing_module))]
    MissingModule,

    #[error("go.mod:{line}: malformed requirement `{text}`")]
    #[diagnostic(
        code(ccgx::manifest::bad_require),
        help("requirements have the form `<module path> <version>`")
    )]
    InvalidRequire { line: usize, text: String },

    #[error("go.mod:{line}: invalid version `{version}` for `{path}`")]
    #[diagnostic(code(ccgx::manifest::bad_version))]
    InvalidVersion {
        line: usize,
        path: String,
        version: String,
    },

    #[error("go.mod: `{directive} (` block is never closed")]
    #[diagnostic(code(ccgx::manifest::unterminated_block))]
    UnterminatedBlock { directive: String },
}

/// The parts of `go.mod` ccgx cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMod {
    /// Module path from the `module` directive
    pub module: String,

    /// Go language version from the `go` directive
    pub go: Option<String>,

    /// Required modules, in manifest order, without duplicates
    pub require: Vec<DependencyRef>,
}

/// Check a Go module version: `v` followed by a semantic version.
///
/// Pseudo-versions (`v0.0.0-20250101000000-abcdef123456`) and the
/// `+incompatible` suffix are valid semver and pass as well.
pub fn is_valid_version(version: &str) -> bool {
    version
        .strip_prefix('v')
        .is_some_and(|rest| semver::Version::parse(rest).is_ok())
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
        .unwrap_or(s)
}

fn parse_require(text: &str, line: usize) -> Result<DependencyRef, ManifestError> {
    let mut tokens = text.split_whitespace();
    let (Some(path), Some(version), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(ManifestError::InvalidRequire {
            line,
            text: text.trim().to_string(),
        });
    };

    let path = unquote(path);
    if path.is_empty() {
        return Err(ManifestError::InvalidRequire {
            line,
            text: text.trim().to_string(),
        });
    }
    if !is_valid_version(version) {
        return Err(ManifestError::InvalidVersion {
            line,
            path: path.to_string(),
            version: version.to_string(),
        });
    }

    Ok(DependencyRef::new(path, version))
}

/// Parse the contents of a `go.mod` file.
pub fn parse_go_mod(content: &str) -> Result<GoMod, ManifestError> {
    let mut module = None;
    let mut go = None;
    let mut require: Vec<DependencyRef> = Vec::new();
    let mut block: Option<&str> = None;

    for (idx, raw) in content.lines().enumerate() {
        let lineno = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(directive) = block {
            if line == ")" {
                block = None;
            } else if directive == "require" {
                let dep = parse_require(line, lineno)?;
                if !require.contains(&dep) {
                    require.push(dep);
                }
            }
            continue;
        }

        let (directive, rest) = match line.split_once(char::is_whitespace) {
            Some((directive, rest)) => (directive, rest.trim()),
            None => (line, ""),
        };

        if rest == "(" {
            block = Some(directive);
            continue;
        }

        match directive {
            "module" => module = Some(unquote(rest).to_string()),
            "go" => go = Some(rest.to_string()),
            "require" => {
                let dep = parse_require(rest, lineno)?;
                if !require.contains(&dep) {
                    require.push(dep);
                }
            }
            other => tracing::trace!("go.mod:{}: skipping `{}` directive", lineno, other),
        }
    }

    if let Some(directive) = block {
        return Err(ManifestError::UnterminatedBlock {
            directive: directive.to_string(),
        });
    }

    let module = module
        .filter(|m| !m.is_empty())
        .ok_or(ManifestError::MissingModule)?;

    Ok(GoMod {
        module,
        go,
        require,
    })
}
