//! Command implementations

pub mod bind;
pub mod build;
pub mod carchive;
pub mod completions;
pub mod init;
pub mod link;
pub mod pack;
pub mod tidy;

use anyhow::Result;

use ccgx::core::Workspace;
use ccgx::sources::ModuleCache;
use ccgx::toolchain::{GoToolchain, HostToolchain};
use ccgx::util::GlobalContext;

/// Locate and verify the Go toolchain configured for `ws`.
pub fn go_toolchain(ctx: &GlobalContext, ws: &Workspace) -> Result<GoToolchain> {
    GoToolchain::detect(&ws.config().toolchain, ctx.trace_commands())
}

/// The module cache of `ws`. Go is only run when no cache root is configured.
pub fn module_cache(ctx: &GlobalContext, ws: &Workspace) -> Result<ModuleCache> {
    ModuleCache::locate(&ws.config().toolchain, || {
        go_toolchain(ctx, ws)?.cache_root()
    })
}
