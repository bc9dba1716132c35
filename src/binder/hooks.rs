//! Post-bind hooks.
//!
//! Hooks run after a package's bindings are written, in registration order.
//! A failing hook aborts the whole bind.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::binder::{BindingOutput, PackageIr};
use crate::util::fs::write_string;

/// Name of the build description written by [`BuildFileHook`].
pub const BUILD_FILE: &str = "BUILD.bazel";

/// What a hook sees after a package is bound.
#[derive(Debug)]
pub struct HookContext<'a> {
    /// Staging directory the bindings were written under.
    pub target: &'a Path,
    /// The package representation the bindings came from.
    pub ir: &'a PackageIr,
    /// The written header and source.
    pub outputs: &'a BindingOutput,
}

/// Extension point run after each package is bound.
pub trait PostBindHook {
    /// Name used in error messages.
    fn name(&self) -> &str;

    fn after_bind(&self, ctx: &HookContext<'_>) -> Result<()>;
}

/// A hook backed by a closure. See [`hook_fn`].
pub struct FnHook<F> {
    name: String,
    f: F,
}

impl<F> PostBindHook for FnHook<F>
where
    F: Fn(&HookContext<'_>) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn after_bind(&self, ctx: &HookContext<'_>) -> Result<()> {
        (self.f)(ctx)
    }
}

/// Wrap a closure as a named hook.
pub fn hook_fn<F>(name: impl Into<String>, f: F) -> FnHook<F>
where
    F: Fn(&HookContext<'_>) -> Result<()>,
{
    FnHook {
        name: name.into(),
        f,
    }
}

/// Writes a `BUILD.bazel` next to each package's bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildFileHook;

impl PostBindHook for BuildFileHook {
    fn name(&self) -> &str {
        "build-file"
    }

    fn after_bind(&self, ctx: &HookContext<'_>) -> Result<()> {
        write_build_file(ctx.ir.name(), ctx.outputs)?;
        Ok(())
    }
}

/// Write a build description declaring the generated sources of one
/// package. Returns the path written.
pub fn write_build_file(name: &str, outputs: &BindingOutput) -> Result<PathBuf> {
    let dir = outputs
        .source
        .parent()
        .or_else(|| outputs.header.parent())
        .unwrap_or_else(|| Path::new("."));
    let path = dir.join(BUILD_FILE);
    write_string(&path, &render_build_file(name, outputs))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn render_build_file(name: &str, outputs: &BindingOutput) -> String {
    format!(
        r#"# Code generated by ccgx. DO NOT EDIT.

cc_library(
    name = "{name}",
    srcs = ["{source}"],
    hdrs = ["{header}"],
    visibility = ["//visibility:public"],
)
"#,
        name = name,
        source = file_name(&outputs.source),
        header = file_name(&outputs.header),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PackagePath;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn outputs(dir: &Path) -> BindingOutput {
        BindingOutput {
            package: PackagePath::new("helloworld"),
            header: dir.join("helloworld.h"),
            source: dir.join("helloworld.cc"),
        }
    }

    #[test]
    fn test_write_build_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("gxdeps/helloworld");
        let path = write_build_file("helloworld", &outputs(&dir)).unwrap();

        assert_eq!(path, dir.join("BUILD.bazel"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("name = \"helloworld\""));
        assert!(content.contains("srcs = [\"helloworld.cc\"]"));
        assert!(content.contains("hdrs = [\"helloworld.h\"]"));
    }

    #[test]
    fn test_closure_hook_sees_context() {
        let tmp = TempDir::new().unwrap();
        let ir = PackageIr::new(PackagePath::new("helloworld"));
        let outputs = outputs(tmp.path());
        let seen = RefCell::new(Vec::new());

        let hook = hook_fn("record", |ctx: &HookContext<'_>| {
            seen.borrow_mut().push(ctx.ir.package().to_string());
            Ok(())
        });
        hook.after_bind(&HookContext {
            target: tmp.path(),
            ir: &ir,
            outputs: &outputs,
        })
        .unwrap();

        assert_eq!(hook.name(), "record");
        assert_eq!(*seen.borrow(), vec!["helloworld".to_string()]);
    }
}
