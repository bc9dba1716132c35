//! Dependency linking.
//!
//! Every module the project requires is made visible under the staging
//! directory as a symbolic link into the module cache, at a path mirroring
//! the module path: `gxdeps/github.com/gx-org/gx -> $GOMODCACHE/github.com/gx-org/gx@v0.3.0`.
//! Links are always replaced, so re-running converges on the current go.mod.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use miette::Diagnostic;
use thiserror::Error;

use crate::core::{DependencyRef, Module};
use crate::sources::cache::CacheResolver;
use crate::util::fs::{ensure_dir, remove_entry, symlink_dir};

/// Errors creating dependency links.
#[derive(Debug, Error, Diagnostic)]
pub enum LinkError {
    #[error("cannot link `{inner}` inside `{outer}`: module paths are nested")]
    #[diagnostic(
        code(ccgx::link::nested),
        help("Nested modules cannot both be linked into the staging directory; require only one of them")
    )]
    Nested { outer: String, inner: String },

    #[error("failed to link {} -> {}", link.display(), target.display())]
    #[diagnostic(code(ccgx::link::create))]
    Create {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Link every dependency of `module` under `staging`.
///
/// Returns the staging directory.
pub fn link_all(module: &Module, resolver: &dyn CacheResolver, staging: &Path) -> Result<PathBuf> {
    check_nested(module.dependencies())?;
    ensure_dir(staging)?;

    for dependency in module.dependencies() {
        let entry = resolver.resolve(dependency)?;
        let link = link_path(staging, dependency);

        tracing::info!("Linking {} -> {}", dependency, entry.path.display());

        clear_stale_ancestors(staging, &link)?;
        remove_entry(&link)?;
        if let Some(parent) = link.parent() {
            ensure_dir(parent)?;
        }
        symlink_dir(&entry.path, &link).map_err(|source| LinkError::Create {
            link: link.clone(),
            target: entry.path.clone(),
            source,
        })?;
    }

    Ok(staging.to_path_buf())
}

/// Where the link for `dependency` lives under `staging`.
pub fn link_path(staging: &Path, dependency: &DependencyRef) -> PathBuf {
    let mut path = staging.to_path_buf();
    for part in dependency.path().split('/').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path
}

fn check_nested(dependencies: &[DependencyRef]) -> Result<(), LinkError> {
    for outer in dependencies {
        let prefix = format!("{}/", outer.path());
        if let Some(inner) = dependencies.iter().find(|d| d.path().starts_with(&prefix)) {
            return Err(LinkError::Nested {
                outer: outer.path().to_string(),
                inner: inner.path().to_string(),
            });
        }
    }
    Ok(())
}

/// Remove links left at ancestors of `link` by an earlier run, so the new
/// link is never created inside the module cache.
fn clear_stale_ancestors(staging: &Path, link: &Path) -> Result<()> {
    let Ok(rel) = link.strip_prefix(staging) else {
        return Ok(());
    };

    let mut current = staging.to_path_buf();
    let mut components = rel.components().peekable();
    while let Some(component) = components.next() {
        if components.peek().is_none() {
            break;
        }
        current.push(component);
        let is_link = std::fs::symlink_metadata(&current)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if is_link {
            tracing::debug!("Removing stale link {}", current.display());
            remove_entry(&current)
                .with_context(|| format!("failed to replace stale link: {}", current.display()))?;
        }
    }
    Ok(())
}
