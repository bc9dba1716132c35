//! GX package discovery.
//!
//! Discovery is split in two: [`source_files`] walks the module tree and
//! yields candidate files lazily, and the classifiers turn each file into a
//! package path or into the imports it declares.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::imports::{parse_imports, ImportError};
use crate::core::{Module, PackagePath};

/// Extension of GX source files.
pub const SOURCE_EXTENSION: &str = "gx";

/// Errors walking the module tree or reading its sources.
#[derive(Debug, Error, Diagnostic)]
pub enum DiscoveryError {
    #[error("failed to walk {}", path.display())]
    #[diagnostic(code(ccgx::discover::walk))]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(ccgx::discover::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    BadImport(#[from] ImportError),
}

/// Whether `path` names a GX source file.
pub fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Every GX source file under `root`, in a stable order.
///
/// The `staging` subtree is never entered and symbolic links are not
/// followed, so linked dependencies and generated files are not mistaken
/// for project sources.
pub fn source_files<'a>(
    root: &Path,
    staging: &'a Path,
) -> impl Iterator<Item = Result<PathBuf, DiscoveryError>> + 'a {
    let root_path = root.to_path_buf();
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| entry.path() != staging)
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let path = entry.into_path();
                is_source_file(&path).then_some(Ok(path))
            }
            Err(source) => Some(Err(DiscoveryError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root_path.clone()),
                source,
            })),
        })
}

/// Sorted, deduplicated packages of the module.
pub fn discover_packages(
    module: &Module,
    staging: &Path,
) -> Result<Vec<PackagePath>, DiscoveryError> {
    let mut packages = BTreeSet::new();
    for file in source_files(module.root(), staging) {
        let file = file?;
        if let Some(package) = file.parent().and_then(|dir| module.package_path_for(dir)) {
            packages.insert(package);
        }
    }

    tracing::debug!("Discovered {} GX packages", packages.len());
    Ok(packages.into_iter().collect())
}

/// Every package imported by the module's GX sources.
pub fn discover_imports(
    module: &Module,
    staging: &Path,
) -> Result<BTreeSet<String>, DiscoveryError> {
    let mut imports = BTreeSet::new();
    for file in source_files(module.root(), staging) {
        let file = file?;
        let content = std::fs::read_to_string(&file).map_err(|source| DiscoveryError::Read {
            path: file.clone(),
            source,
        })?;
        imports.extend(parse_imports(&file, &content)?);
    }
    Ok(imports)
}
