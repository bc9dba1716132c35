//! High-level operations.
//!
//! This module contains the implementation of ccgx commands.

pub mod bind;
pub mod carchive;
pub mod discover;
pub mod init;
pub mod link;
pub mod pack;
pub mod pipeline;

pub use bind::{bind_all, bind_packages, BindServices};
pub use carchive::{synthesize, ArchiveOutput};
pub use discover::{discover_imports, discover_packages};
pub use init::{init_project, InitOptions};
pub use link::link_all;
pub use pack::{pack_all, tidy};
pub use pipeline::{Pipeline, PipelineOutput, Stage};
