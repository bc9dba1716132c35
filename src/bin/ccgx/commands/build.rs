//! `ccgx build` command

use anyhow::Result;

use super::go_toolchain;
use crate::cli::BindArgs;
use ccgx::binder::{BuildFileHook, GxTool};
use ccgx::core::Workspace;
use ccgx::ops::{BindServices, Pipeline};
use ccgx::sources::ModuleCache;
use ccgx::toolchain::HostToolchain;
use ccgx::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: BindArgs) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let go = go_toolchain(ctx, &ws)?;
    let cache = ModuleCache::locate(&ws.config().toolchain, || go.cache_root())?;
    let gx = GxTool::new(go.clone());

    let mut pipeline = Pipeline::new(
        &ws,
        &cache,
        BindServices {
            builder: &gx,
            binder: &gx,
        },
        &go,
    );
    if args.emit_build_files || ws.config().emit_build_files() {
        pipeline = pipeline.hook(Box::new(BuildFileHook));
    }

    let output = pipeline.run()?;
    eprintln!(
        "    Finished {} GX package(s) -> {}",
        output.packages.len(),
        output.archive.archive.display()
    );
    Ok(())
}
