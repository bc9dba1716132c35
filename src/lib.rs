//! ccgx - build orchestrator for GX packages consumed from C and C++
//!
//! This crate provides the library behind the `ccgx` command: package
//! discovery, dependency linking from the Go module cache, the binding
//! pass and C archive synthesis.

pub mod binder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod toolchain;
pub mod util;

/// Test utilities and mocks for ccgx unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides doubles for the host toolchain and the GX
/// tools, and on-disk module fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{Module, PackagePath, Workspace};
pub use util::context::GlobalContext;
