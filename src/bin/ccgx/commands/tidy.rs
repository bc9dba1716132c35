//! `ccgx tidy` command

use anyhow::Result;

use super::go_toolchain;
use ccgx::binder::GxTool;
use ccgx::core::Workspace;
use ccgx::ops::tidy;
use ccgx::util::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let go = go_toolchain(ctx, &ws)?;
    tidy(&ws, &GxTool::new(go.clone()), &go)
}
