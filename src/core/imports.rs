//! Import declaration parsing for GX source files.
//!
//! GX import declarations follow Go's syntax:
//!
//! ```text
//! import "num"
//! import alias "example.org/pkg"
//! import (
//!     _ "github.com/gx-org/xlapjrt/gx"
//!     "math"
//! )
//! ```
//!
//! Only the declarations are interpreted; the rest of the file is ignored.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use miette::Diagnostic;
use regex::{Captures, Regex};
use thiserror::Error;

/// A malformed import path literal.
#[derive(Debug, Error, Diagnostic)]
#[error("{}: invalid import path {literal}: {reason}", file.display())]
#[diagnostic(code(ccgx::discover::bad_import))]
pub struct ImportError {
    pub file: PathBuf,
    pub literal: String,
    pub reason: &'static str,
}

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("valid regex"));

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//[^\n]*").expect("valid regex"));

static IMPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|;)[ \t]*import\b[ \t]*(?:\(([^)]*)\)|([^\n;]*))").expect("valid regex")
});

static IMPORT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([A-Za-z_][A-Za-z0-9_]*|\.)\s+)?(\S.*)$").expect("valid regex")
});

fn strip_comments(content: &str) -> String {
    // A block comment spanning lines acts as a newline, otherwise as a space.
    let content = BLOCK_COMMENT.replace_all(content, |caps: &Captures| {
        if caps[0].contains('\n') {
            "\n"
        } else {
            " "
        }
    });
    LINE_COMMENT.replace_all(&content, "").into_owned()
}

/// Unquote an import path literal and check it is a valid import path.
fn import_path(literal: &str) -> Result<String, &'static str> {
    let inner = if let Some(rest) = literal.strip_prefix('"') {
        rest.strip_suffix('"').ok_or("unterminated string literal")?
    } else if let Some(rest) = literal.strip_prefix('`') {
        rest.strip_suffix('`').ok_or("unterminated raw string literal")?
    } else {
        return Err("expected a string literal");
    };

    if inner.is_empty() {
        return Err("empty import path");
    }
    for c in inner.chars() {
        if c.is_whitespace() || c.is_control() || c == '\u{FFFD}' {
            return Err("import path contains a space or non-graphic character");
        }
        if "!\"#$%&'()*,:;<=>?[\\]^`{|}".contains(c) {
            return Err("import path contains an invalid character");
        }
    }
    Ok(inner.to_string())
}

fn parse_spec(file: &Path, spec: &str) -> Result<String, ImportError> {
    let literal = IMPORT_SPEC
        .captures(spec)
        .and_then(|cap| cap.get(2))
        .map_or(spec, |m| m.as_str())
        .trim();

    import_path(literal).map_err(|reason| ImportError {
        file: file.to_path_buf(),
        literal: literal.to_string(),
        reason,
    })
}

/// Parse every import path declared in a GX source file, in order of appearance.
///
/// `file` is only used to name the offending file in errors.
pub fn parse_imports(file: &Path, content: &str) -> Result<Vec<String>, ImportError> {
    let content = strip_comments(content);
    let mut imports = Vec::new();

    for cap in IMPORT_DECL.captures_iter(&content) {
        if let Some(group) = cap.get(1) {
            for spec in group.as_str().split(['\n', ';']) {
                let spec = spec.trim();
                if !spec.is_empty() {
                    imports.push(parse_spec(file, spec)?);
                }
            }
        } else if let Some(single) = cap.get(2) {
            let spec = single.as_str().trim();
            if spec.is_empty() {
                return Err(ImportError {
                    file: file.to_path_buf(),
                    literal: String::new(),
                    reason: "missing import path",
                });
            }
            imports.push(parse_spec(file, spec)?);
        }
    }

    Ok(imports)
}
