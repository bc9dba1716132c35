//! `ccgx init` command

use anyhow::Result;

use crate::cli::InitArgs;
use ccgx::binder::GxTool;
use ccgx::ops::{init_project, InitOptions};
use ccgx::toolchain::GoToolchain;
use ccgx::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: InitArgs) -> Result<()> {
    // No module yet: only the global configuration applies.
    let config = ctx.load_config(ctx.cwd());
    let go = GoToolchain::detect(&config.toolchain, ctx.trace_commands())?;
    let gx = GxTool::new(go.clone());

    let opts = InitOptions { name: args.name };
    let ws = init_project(ctx, ctx.cwd(), &opts, &go, &gx)?;

    eprintln!(
        "     Created GX module `{}` in {}",
        ws.module().name(),
        ws.root().display()
    );
    Ok(())
}
