//! `ccgx pack` command

use anyhow::Result;

use super::go_toolchain;
use ccgx::binder::GxTool;
use ccgx::core::Workspace;
use ccgx::ops::pack_all;
use ccgx::util::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let roots = ws.import_roots()?;
    let gx = GxTool::new(go_toolchain(ctx, &ws)?);

    let packed = pack_all(ws.module(), ws.staging_dir(), &roots, &gx)?;
    eprintln!("    Finished packing {} GX package(s)", packed.len());
    Ok(())
}
