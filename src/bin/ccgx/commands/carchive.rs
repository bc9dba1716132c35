//! `ccgx carchive` command

use anyhow::Result;

use super::go_toolchain;
use ccgx::core::Workspace;
use ccgx::ops::synthesize;
use ccgx::util::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let go = go_toolchain(ctx, &ws)?;

    let output = synthesize(&ws, &go)?;
    eprintln!("    Finished {}", output.archive.display());
    eprintln!("    Finished {}", output.header.display());
    Ok(())
}
