//! Logical GX package identifiers.

use std::fmt;
use std::path::PathBuf;

/// Logical identifier of a GX package.
///
/// Derived from the directory holding the package's `.gx` files: the module
/// path followed by the directory's location relative to the module root,
/// always `/`-separated. Every file in a directory maps to the same
/// `PackagePath`, and distinct directories map to distinct paths.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackagePath(String);

impl PackagePath {
    /// Wrap an already-formed package path.
    pub fn new(path: impl Into<String>) -> Self {
        PackagePath(path.into())
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path element, which is also the GX package name.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The package path as a relative filesystem path.
    pub fn to_rel_path(&self) -> PathBuf {
        self.0.split('/').collect()
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackagePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
