//! The full build: discover, link, bind, synthesize.
//!
//! Stages run strictly in order. The first failure moves the pipeline to
//! [`Stage::Failed`] and no later stage runs. Nothing is resumed between
//! invocations; every run starts again from discovery.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::binder::{BindingOutput, ImportRoots, PostBindHook};
use crate::core::{PackagePath, Workspace};
use crate::ops::bind::{bind_packages, BindServices};
use crate::ops::carchive::{synthesize, ArchiveOutput};
use crate::ops::discover::discover_packages;
use crate::ops::link::link_all;
use crate::sources::cache::CacheResolver;
use crate::toolchain::HostToolchain;

/// Where a pipeline run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Discovering,
    Linking,
    Binding,
    Synthesizing,
    Done,
    Failed(FailedStage),
}

/// The stage a failed run stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStage {
    Discovering,
    Linking,
    Binding,
    Synthesizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => write!(f, "idle"),
            Stage::Discovering => write!(f, "discovering"),
            Stage::Linking => write!(f, "linking"),
            Stage::Binding => write!(f, "binding"),
            Stage::Synthesizing => write!(f, "synthesizing"),
            Stage::Done => write!(f, "done"),
            Stage::Failed(stage) => write!(f, "failed while {}", Stage::from(*stage)),
        }
    }
}

impl From<FailedStage> for Stage {
    fn from(stage: FailedStage) -> Self {
        match stage {
            FailedStage::Discovering => Stage::Discovering,
            FailedStage::Linking => Stage::Linking,
            FailedStage::Binding => Stage::Binding,
            FailedStage::Synthesizing => Stage::Synthesizing,
        }
    }
}

/// Everything a full build produced.
#[derive(Debug)]
pub struct PipelineOutput {
    pub packages: Vec<PackagePath>,
    pub staging: PathBuf,
    pub bindings: Vec<BindingOutput>,
    pub archive: ArchiveOutput,
}

/// A single build of a workspace.
pub struct Pipeline<'a> {
    ws: &'a Workspace,
    resolver: &'a dyn CacheResolver,
    services: BindServices<'a>,
    hooks: Vec<Box<dyn PostBindHook + 'a>>,
    toolchain: &'a dyn HostToolchain,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        ws: &'a Workspace,
        resolver: &'a dyn CacheResolver,
        services: BindServices<'a>,
        toolchain: &'a dyn HostToolchain,
    ) -> Self {
        Pipeline {
            ws,
            resolver,
            services,
            hooks: Vec::new(),
            toolchain,
            stage: Stage::Idle,
        }
    }

    /// Register a post-bind hook. Hooks run in registration order.
    pub fn hook(mut self, hook: Box<dyn PostBindHook + 'a>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every stage to completion.
    pub fn run(&mut self) -> Result<PipelineOutput> {
        let ws = self.ws;
        let module = ws.module();
        let staging = ws.staging_dir();

        let packages = self.step(FailedStage::Discovering, |_| {
            Ok(discover_packages(module, staging)?)
        })?;

        let staging = self.step(FailedStage::Linking, |p| {
            link_all(module, p.resolver, staging)
        })?;

        let bindings = self.step(FailedStage::Binding, |p| {
            if packages.is_empty() {
                return Ok(Vec::new());
            }
            let roots: ImportRoots = ws.import_roots()?;
            bind_packages(&packages, &staging, &roots, &p.services, &p.hooks)
        })?;

        let archive = self.step(FailedStage::Synthesizing, |p| synthesize(ws, p.toolchain))?;

        self.stage = Stage::Done;
        tracing::debug!("Pipeline {}", self.stage);
        Ok(PipelineOutput {
            packages,
            staging,
            bindings,
            archive,
        })
    }

    fn step<T>(
        &mut self,
        stage: FailedStage,
        f: impl FnOnce(&Self) -> Result<T>,
    ) -> Result<T> {
        self.stage = stage.into();
        tracing::debug!("Pipeline {}", self.stage);
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.stage = Stage::Failed(stage);
                Err(e).with_context(|| format!("build failed while {}", Stage::from(stage)))
            }
        }
    }
}
