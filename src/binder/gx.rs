//! The GX tools, run through the Go toolchain.

use std::path::Path;

use anyhow::{Context, Result};

use crate::binder::{
    BindError, Binder, BindingFile, BuildService, ImportRoots, PackageIr, Packager,
};
use crate::core::PackagePath;
use crate::toolchain::{GoToolchain, ToolchainError};

/// Tool generating the Go package that embeds a GX package.
pub const PACKAGER_TOOL: &str = "golang/packager";

/// Tool generating C++ bindings for a GX package.
pub const BINDER_TOOL: &str = "golang/binder/genbind";

/// Runs `go run <gx module>/<tool>@<version>` at the GX standard library's version.
#[derive(Debug, Clone)]
pub struct GxTool {
    go: GoToolchain,
}

impl GxTool {
    pub fn new(go: GoToolchain) -> Self {
        GxTool { go }
    }

    fn tool(roots: &ImportRoots, tool: &str) -> String {
        format!("{}/{}", roots.stdlib.path(), tool)
    }
}

impl BuildService for GxTool {
    fn build(&self, package: &PackagePath, roots: &ImportRoots) -> Result<PackageIr> {
        let workdir = tempfile::Builder::new()
            .prefix("ccgx-bind")
            .tempdir()
            .context("failed to create binder output directory")?;

        let result = self
            .go
            .run_tool(
                &roots.local,
                &Self::tool(roots, BINDER_TOOL),
                roots.stdlib.version(),
                [
                    "--language=cc".to_string(),
                    format!("--gx_package={}", package),
                    format!("--target_folder={}", workdir.path().display()),
                ],
            )
            .exec_and_check();

        match result {
            Ok(_) => Ok(PackageIr::with_workdir(package.clone(), workdir)),
            Err(e) => match e.downcast::<ToolchainError>() {
                Ok(ToolchainError::Failed { stderr, .. }) => Err(BindError::Build {
                    package: package.clone(),
                    diagnostic: stderr,
                }
                .into()),
                Ok(other) => Err(other.into()),
                Err(e) => Err(e),
            },
        }
    }
}

impl Binder for GxTool {
    fn bind(&self, ir: &PackageIr) -> Result<Vec<BindingFile>> {
        let Some(dir) = ir.workdir() else {
            return Err(BindError::Bind {
                package: ir.package().clone(),
                diagnostic: "package was not built by the GX binder".to_string(),
            }
            .into());
        };
        read_outputs(dir).with_context(|| format!("failed to read bindings of `{}`", ir.package()))
    }
}

impl Packager for GxTool {
    fn pack(&self, package: &PackagePath, roots: &ImportRoots) -> Result<()> {
        self.go
            .run_tool(
                &roots.local,
                &Self::tool(roots, PACKAGER_TOOL),
                roots.stdlib.version(),
                [format!("--gx_package_module={}", package)],
            )
            .run()
    }
}

/// Every regular file the binder left in `dir`, sorted by name.
fn read_outputs(dir: &Path) -> Result<Vec<BindingFile>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .into_owned();
        let contents = std::fs::read(entry.path())
            .with_context(|| format!("failed to read {}", entry.path().display()))?;
        files.push(BindingFile::new(name, contents));
    }
    Ok(files)
}
