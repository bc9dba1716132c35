//! `ccgx link` command

use anyhow::{Context, Result};

use super::module_cache;
use ccgx::core::Workspace;
use ccgx::ops::link_all;
use ccgx::util::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let cache = module_cache(ctx, &ws)?;

    let staging = link_all(ws.module(), &cache, ws.staging_dir())
        .context("failed to link dependencies")?;
    eprintln!(
        "    Finished linking {} module(s) into {}",
        ws.module().dependencies().len(),
        staging.display()
    );
    Ok(())
}
