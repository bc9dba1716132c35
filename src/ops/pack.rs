//! Packing GX packages into Go packages, and module tidying.

use std::path::Path;

use anyhow::Result;

use crate::binder::{ImportRoots, Packager};
use crate::core::{Module, PackagePath, Workspace};
use crate::ops::discover::discover_packages;
use crate::toolchain::{HostToolchain, ToolchainError};

/// Run the packager on every GX package of the module.
pub fn pack_all(
    module: &Module,
    staging: &Path,
    roots: &ImportRoots,
    packager: &dyn Packager,
) -> Result<Vec<PackagePath>> {
    let packages = discover_packages(module, staging)?;
    for package in &packages {
        tracing::info!("Packing {}", package);
        packager.pack(package, roots)?;
    }
    Ok(packages)
}

/// Pack every package, then let the host toolchain reconcile go.mod and go.sum.
///
/// Before the module requires GX there is no version to run the packager
/// at; packing is skipped with a warning so that tidying can add the
/// requirement.
pub fn tidy(ws: &Workspace, packager: &dyn Packager, toolchain: &dyn HostToolchain) -> Result<()> {
    match ws.import_roots() {
        Ok(roots) => {
            pack_all(ws.module(), ws.staging_dir(), &roots, packager)?;
        }
        Err(e) if is_unknown_gx_version(&e) => {
            tracing::warn!("Module does not require GX yet, skipping packing");
        }
        Err(e) => return Err(e),
    }

    tracing::info!("Tidying {}", ws.module().name());
    toolchain.tidy(ws.root())
}

fn is_unknown_gx_version(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ToolchainError>(),
        Some(ToolchainError::UnknownGxVersion)
    )
}
