//! Binding pass: build, bind and write every GX package of the module.

use std::path::Path;

use anyhow::{Context, Result};

use crate::binder::{
    BindError, Binder, BindingFile, BindingOutput, BuildService, HookContext, ImportRoots,
    OutputKind, PackageIr, PostBindHook,
};
use crate::core::{Module, PackagePath};
use crate::ops::discover::discover_packages;
use crate::util::fs::write_bytes;

/// The external services a bind runs against.
pub struct BindServices<'a> {
    pub builder: &'a dyn BuildService,
    pub binder: &'a dyn Binder,
}

/// Discover the module's packages and bind each of them into `staging`.
///
/// A module without GX packages is bound successfully without writing
/// anything or running any hook.
pub fn bind_all(
    module: &Module,
    staging: &Path,
    roots: &ImportRoots,
    services: &BindServices<'_>,
    hooks: &[Box<dyn PostBindHook + '_>],
) -> Result<Vec<BindingOutput>> {
    let packages = discover_packages(module, staging)?;
    if packages.is_empty() {
        tracing::info!("No GX packages found in {}", module.root().display());
        return Ok(Vec::new());
    }
    bind_packages(&packages, staging, roots, services, hooks)
}

/// Bind `packages` into `staging`, in order, stopping at the first failure.
pub fn bind_packages(
    packages: &[PackagePath],
    staging: &Path,
    roots: &ImportRoots,
    services: &BindServices<'_>,
    hooks: &[Box<dyn PostBindHook + '_>],
) -> Result<Vec<BindingOutput>> {
    let mut outputs = Vec::with_capacity(packages.len());

    for package in packages {
        tracing::info!("Binding {}", package);

        let ir = services.builder.build(package, roots)?;
        let files = services
            .binder
            .bind(&ir)
            .with_context(|| format!("failed to bind GX package `{}`", package))?;
        let output = write_outputs(staging, &ir, &files)?;

        let ctx = HookContext {
            target: staging,
            ir: &ir,
            outputs: &output,
        };
        for hook in hooks {
            hook.after_bind(&ctx).with_context(|| {
                format!("hook `{}` failed for package `{}`", hook.name(), package)
            })?;
        }

        outputs.push(output);
    }

    Ok(outputs)
}

/// Write one header and one source, replacing whatever was there.
fn write_outputs(staging: &Path, ir: &PackageIr, files: &[BindingFile]) -> Result<BindingOutput> {
    let headers: Vec<_> = files
        .iter()
        .filter(|f| f.kind == OutputKind::Header)
        .collect();
    let sources: Vec<_> = files
        .iter()
        .filter(|f| f.kind == OutputKind::Source)
        .collect();

    let (header, source) = match (headers.as_slice(), sources.as_slice()) {
        ([header], [source]) => (*header, *source),
        _ => {
            return Err(BindError::UnexpectedOutputs {
                package: ir.package().clone(),
                found: files.iter().map(|f| f.name.clone()).collect(),
            }
            .into())
        }
    };

    for file in files {
        let path = file.path_in(staging, ir);
        write_bytes(&path, &file.contents)?;
        tracing::debug!("Wrote {}", path.display());
    }

    Ok(BindingOutput {
        package: ir.package().clone(),
        header: header.path_in(staging, ir),
        source: source.path_in(staging, ir),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{hook_fn, BuildFileHook};
    use crate::core::DependencyRef;
    use crate::test_support::{MockGx, ProjectFixture};
    use std::cell::RefCell;

    fn roots(project: &ProjectFixture) -> ImportRoots {
        ImportRoots {
            local: project.root().to_path_buf(),
            stdlib: DependencyRef::new("github.com/gx-org/gx", "v0.3.0"),
        }
    }

    #[test]
    fn test_bind_writes_header_and_source() {
        let project = ProjectFixture::new("helloworld");
        project.file("helloworld.gx", "package helloworld\n");
        project.file("mlp/mlp.gx", "package mlp\n");
        let gx = MockGx::new();

        let outputs = bind_all(
            &project.module(),
            &project.staging(),
            &roots(&project),
            &BindServices {
                builder: &gx,
                binder: &gx,
            },
            &[],
        )
        .unwrap();

        assert_eq!(outputs.len(), 2);
        let staging = project.staging();
        assert_eq!(outputs[0].header, staging.join("helloworld/helloworld.h"));
        assert_eq!(outputs[1].source, staging.join("helloworld/mlp/mlp.cc"));
        assert!(outputs[1].header.is_file());
        assert_eq!(gx.built(), vec!["helloworld", "helloworld/mlp"]);
    }

    #[test]
    fn test_rebind_overwrites_identically() {
        let project = ProjectFixture::new("helloworld");
        project.file("helloworld.gx", "package helloworld\n");
        let gx = MockGx::new();
        let services = BindServices {
            builder: &gx,
            binder: &gx,
        };

        let first = bind_all(&project.module(), &project.staging(), &roots(&project), &services, &[])
            .unwrap();
        let header_before = std::fs::read(&first[0].header).unwrap();
        let source_before = std::fs::read(&first[0].source).unwrap();

        // Scribble over the output to prove it is replaced, not merged.
        std::fs::write(&first[0].header, "stale contents that are longer than the header").unwrap();

        let second = bind_all(&project.module(), &project.staging(), &roots(&project), &services, &[])
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second[0].header).unwrap(), header_before);
        assert_eq!(std::fs::read(&second[0].source).unwrap(), source_before);
    }

    #[test]
    fn test_empty_project_runs_no_hooks() {
        let project = ProjectFixture::new("helloworld");
        let gx = MockGx::new();
        let calls = RefCell::new(0);
        let hooks: Vec<Box<dyn PostBindHook + '_>> = vec![Box::new(hook_fn("count", |_| {
            *calls.borrow_mut() += 1;
            Ok(())
        }))];

        let outputs = bind_all(
            &project.module(),
            &project.staging(),
            &roots(&project),
            &BindServices {
                builder: &gx,
                binder: &gx,
            },
            &hooks,
        )
        .unwrap();

        assert!(outputs.is_empty());
        assert_eq!(*calls.borrow(), 0);
        assert!(!project.staging().exists());
    }

    #[test]
    fn test_hooks_run_in_order_after_writes() {
        let project = ProjectFixture::new("helloworld");
        project.file("helloworld.gx", "package helloworld\n");
        let gx = MockGx::new();
        let log = RefCell::new(Vec::new());

        let hooks: Vec<Box<dyn PostBindHook + '_>> = vec![
            Box::new(hook_fn("first", |ctx| {
                assert!(ctx.outputs.header.is_file());
                assert!(ctx.outputs.source.is_file());
                log.borrow_mut().push("first");
                Ok(())
            })),
            Box::new(hook_fn("second", |_| {
                log.borrow_mut().push("second");
                Ok(())
            })),
            Box::new(BuildFileHook),
        ];

        bind_all(
            &project.module(),
            &project.staging(),
            &roots(&project),
            &BindServices {
                builder: &gx,
                binder: &gx,
            },
            &hooks,
        )
        .unwrap();

        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert!(project.staging().join("helloworld/BUILD.bazel").is_file());
    }

    #[test]
    fn test_hook_failure_aborts() {
        let project = ProjectFixture::new("helloworld");
        project.file("a/a.gx", "package a\n");
        project.file("b/b.gx", "package b\n");
        let gx = MockGx::new();

        let hooks: Vec<Box<dyn PostBindHook + '_>> =
            vec![Box::new(hook_fn("explode", |_| anyhow::bail!("boom")))];

        let err = bind_all(
            &project.module(),
            &project.staging(),
            &roots(&project),
            &BindServices {
                builder: &gx,
                binder: &gx,
            },
            &hooks,
        )
        .unwrap_err();

        let msg = format!("{:#}", err);
        assert!(msg.contains("hook `explode` failed for package `helloworld/a`"));
        assert!(msg.contains("boom"));
        assert_eq!(gx.built(), vec!["helloworld/a"]);
    }

    #[test]
    fn test_build_failure_is_verbatim() {
        let project = ProjectFixture::new("helloworld");
        project.file("helloworld.gx", "package helloworld\n");
        let gx = MockGx::new().fail_build("helloworld", "helloworld.gx:3:5: undefined: Foo");

        let err = bind_all(
            &project.module(),
            &project.staging(),
            &roots(&project),
            &BindServices {
                builder: &gx,
                binder: &gx,
            },
            &[],
        )
        .unwrap_err();

        match err.downcast_ref::<BindError>() {
            Some(BindError::Build {
                package,
                diagnostic,
            }) => {
                assert_eq!(package.as_str(), "helloworld");
                assert_eq!(diagnostic, "helloworld.gx:3:5: undefined: Foo");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_outputs() {
        let project = ProjectFixture::new("helloworld");
        project.file("helloworld.gx", "package helloworld\n");
        let gx = MockGx::new().with_extra_output("extra.h");

        let err = bind_all(
            &project.module(),
            &project.staging(),
            &roots(&project),
            &BindServices {
                builder: &gx,
                binder: &gx,
            },
            &[],
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BindError>(),
            Some(BindError::UnexpectedOutputs { .. })
        ));
        assert!(!project.staging().join("helloworld/helloworld.h").exists());
    }
}
