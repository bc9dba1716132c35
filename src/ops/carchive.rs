//! C archive synthesis.
//!
//! A single Go `main` package blank-imports every package the GX code
//! needs at run time: the C runtime shims, everything the GX sources import
//! and the generated binding of each package. Compiling it with
//! `-buildmode=c-archive` yields one static library plus its header.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::Workspace;
use crate::ops::discover::{discover_imports, discover_packages};
use crate::toolchain::HostToolchain;
use crate::util::fs::{ensure_dir, write_string};

/// Files produced by [`synthesize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutput {
    /// The aggregation source.
    pub source: PathBuf,
    /// The static archive.
    pub archive: PathBuf,
    /// The C header for the archive's exports.
    pub header: PathBuf,
    /// Packages blank-imported by the aggregation source.
    pub imports: BTreeSet<String>,
}

/// Union of the seed, parsed and wrapper identifiers, without the ones the
/// standard library provides.
pub fn collect_imports<I, J, K>(
    seeds: I,
    parsed: J,
    wrappers: K,
    standard: &[String],
) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
    J: IntoIterator<Item = String>,
    K: IntoIterator<Item = String>,
{
    seeds
        .into_iter()
        .chain(parsed)
        .chain(wrappers)
        .filter(|import| !standard.contains(import))
        .collect()
}

/// Render the aggregation source for `imports`.
pub fn render_aggregation_source(imports: &BTreeSet<String>) -> String {
    let mut out = String::new();
    out.push_str("// Code generated by ccgx. DO NOT EDIT.\n\n");
    out.push_str("package main\n\n");
    out.push_str("import \"C\"\n\n");

    if !imports.is_empty() {
        out.push_str("import (\n");
        for import in imports {
            out.push_str(&format!("\t_ \"{}\"\n", import));
        }
        out.push_str(")\n\n");
    }

    out.push_str("//export InitGX\n");
    out.push_str("func InitGX() {}\n\n");
    out.push_str("func main() {}\n");
    out
}

/// Compute the import set of the workspace and write its aggregation source.
///
/// Returns the source path and the imports it contains.
pub fn write_aggregation_source(ws: &Workspace) -> Result<(PathBuf, BTreeSet<String>)> {
    let module = ws.module();
    let staging = ws.staging_dir();

    let packages = discover_packages(module, staging)?;
    let parsed = discover_imports(module, staging)?;
    let wrappers = packages.iter().map(|pkg| ws.binding_import_path(pkg));

    let imports = collect_imports(
        ws.config().archive_seeds(),
        parsed,
        wrappers,
        &ws.config().standard_packages(),
    );

    ensure_dir(staging)?;
    let source = staging.join(format!("{}.go", ws.config().archive_name()));
    write_string(&source, &render_aggregation_source(&imports))?;
    tracing::debug!(
        "Wrote {} ({} imports)",
        source.display(),
        imports.len()
    );
    Ok((source, imports))
}

/// Write the aggregation source and compile it into a C archive and header.
pub fn synthesize(ws: &Workspace, toolchain: &dyn HostToolchain) -> Result<ArchiveOutput> {
    let (source, imports) = write_aggregation_source(ws)?;
    let staging = ws.staging_dir();
    let name = ws.config().archive_name();
    let archive = staging.join(format!("{}.a", name));
    let header = staging.join(format!("{}.h", name));

    tracing::info!("Compiling {}", archive.display());
    toolchain
        .build_archive(ws.root(), &source, &archive)
        .with_context(|| format!("failed to build {}", archive.display()))?;

    tracing::info!("Generating {}", header.display());
    toolchain
        .build_header(ws.root(), &source, &header)
        .with_context(|| format!("failed to generate {}", header.display()))?;

    Ok(ArchiveOutput {
        source,
        archive,
        header,
        imports,
    })
}
