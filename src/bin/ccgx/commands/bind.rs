//! `ccgx bind` command

use anyhow::{Context, Result};

use super::go_toolchain;
use crate::cli::BindArgs;
use ccgx::binder::{BuildFileHook, GxTool, PostBindHook};
use ccgx::core::Workspace;
use ccgx::ops::{bind_all, link_all, BindServices};
use ccgx::sources::ModuleCache;
use ccgx::toolchain::HostToolchain;
use ccgx::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: BindArgs) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let roots = ws.import_roots()?;
    let go = go_toolchain(ctx, &ws)?;
    let cache = ModuleCache::locate(&ws.config().toolchain, || go.cache_root())?;

    let staging = link_all(ws.module(), &cache, ws.staging_dir())
        .context("failed to link dependencies")?;

    let mut hooks: Vec<Box<dyn PostBindHook>> = Vec::new();
    if args.emit_build_files || ws.config().emit_build_files() {
        hooks.push(Box::new(BuildFileHook));
    }

    let gx = GxTool::new(go);
    let services = BindServices {
        builder: &gx,
        binder: &gx,
    };
    let outputs = bind_all(ws.module(), &staging, &roots, &services, &hooks)?;

    eprintln!(
        "    Finished binding {} GX package(s) into {}",
        outputs.len(),
        staging.display()
    );
    Ok(())
}
