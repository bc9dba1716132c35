//! Core data structures for ccgx.
//!
//! This module contains the fundamental types: the module model, package
//! paths, go.mod parsing and import declaration parsing.

pub mod imports;
pub mod manifest;
pub mod module;
pub mod package_path;
pub mod workspace;

pub use manifest::{GoMod, ManifestError};
pub use module::{DependencyRef, Module};
pub use package_path::PackagePath;
pub use workspace::Workspace;
