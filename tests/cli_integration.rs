//! CLI integration tests for ccgx.
//!
//! These tests drive the binary against throwaway modules. Nothing here
//! needs Go: the module cache root is configured in ccgx.toml, and commands
//! that would run the GX tools are only exercised up to their failure paths.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// A ccgx command isolated from the user's global configuration.
fn ccgx(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ccgx").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("CCGX_DEBUG");
    cmd
}

struct Project {
    tmp: TempDir,
}

impl Project {
    fn new(go_mod: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("proj")).unwrap();
        fs::create_dir_all(tmp.path().join("modcache")).unwrap();
        fs::write(tmp.path().join("proj/go.mod"), go_mod).unwrap();
        let project = Project { tmp };
        project.write(
            "ccgx.toml",
            &format!(
                "[toolchain]\ncache_root = \"{}\"\n",
                project.cache().display()
            ),
        );
        project
    }

    fn root(&self) -> PathBuf {
        self.tmp.path().join("proj")
    }

    fn cache(&self) -> PathBuf {
        self.tmp.path().join("modcache")
    }

    fn home(&self) -> &Path {
        self.tmp.path()
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn cached(&self, module: &str, version: &str) -> PathBuf {
        let dir = self.cache().join(format!("{}@{}", module, version));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("go.mod"), format!("module {}\n", module)).unwrap();
        dir
    }

    fn run(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        ccgx(self.home())
            .args(args)
            .current_dir(self.root())
            .assert()
    }
}

// ============================================================================
// ccgx --help / completions
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let tmp = TempDir::new().unwrap();
    ccgx(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("link"))
        .stdout(predicate::str::contains("bind"))
        .stdout(predicate::str::contains("carchive"))
        .stdout(predicate::str::contains("--debug"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    ccgx(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ccgx"));
}

// ============================================================================
// ccgx link
// ============================================================================

#[test]
fn test_link_without_go_mod_fails() {
    let tmp = TempDir::new().unwrap();
    ccgx(tmp.path())
        .arg("link")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find `go.mod`"))
        .stderr(predicate::str::contains("ccgx init"));
}

#[test]
fn test_link_creates_links_idempotently() {
    let project = Project::new(
        "module helloworld\n\ngo 1.24\n\nrequire (\n\tgithub.com/gx-org/gx v0.3.0\n\tgithub.com/gx-org/xlapjrt v0.1.0 // indirect\n)\n",
    );
    let gx = project.cached("github.com/gx-org/gx", "v0.3.0");
    let xla = project.cached("github.com/gx-org/xlapjrt", "v0.1.0");

    project
        .run(&["link"])
        .success()
        .stderr(predicate::str::contains("Finished linking 2 module(s)"));
    project.run(&["link"]).success();

    let staging = project.root().join("gxdeps");
    assert_eq!(
        fs::read_link(staging.join("github.com/gx-org/gx")).unwrap(),
        gx
    );
    assert_eq!(
        fs::read_link(staging.join("github.com/gx-org/xlapjrt")).unwrap(),
        xla
    );
    assert_eq!(
        fs::read_dir(staging.join("github.com/gx-org")).unwrap().count(),
        2
    );
}

#[test]
fn test_link_follows_version_change() {
    let project = Project::new("module helloworld\n\nrequire example.org/m v1.0.0\n");
    project.cached("example.org/m", "v1.0.0");
    let newer = project.cached("example.org/m", "v1.1.0");

    project.run(&["link"]).success();
    project.write("go.mod", "module helloworld\n\nrequire example.org/m v1.1.0\n");
    project.run(&["link"]).success();

    assert_eq!(
        fs::read_link(project.root().join("gxdeps/example.org/m")).unwrap(),
        newer
    );
}

#[test]
fn test_link_missing_cache_entry() {
    let project = Project::new("module helloworld\n\nrequire example.org/m v1.0.0\n");

    project
        .run(&["link"])
        .failure()
        .stderr(predicate::str::contains("example.org/m@v1.0.0"))
        .stderr(predicate::str::contains("ccgx tidy"));

    assert!(fs::symlink_metadata(project.root().join("gxdeps/example.org/m")).is_err());
}

#[test]
fn test_link_rejects_bad_go_mod() {
    let project = Project::new("module helloworld\n\nrequire example.org/m latest\n");

    project
        .run(&["link"])
        .failure()
        .stderr(predicate::str::contains("invalid version `latest`"));
}

// ============================================================================
// commands needing a GX version
// ============================================================================

#[test]
fn test_pack_without_gx_requirement_fails() {
    let project = Project::new("module helloworld\n\ngo 1.24\n");
    project.write("helloworld.gx", "package helloworld\n");

    project
        .run(&["pack"])
        .failure()
        .stderr(predicate::str::contains("unknown GX version"));
}

#[test]
fn test_bind_without_gx_requirement_fails() {
    let project = Project::new("module helloworld\n\ngo 1.24\n");
    project.write("helloworld.gx", "package helloworld\n");

    project
        .run(&["bind", "--emit-build-files"])
        .failure()
        .stderr(predicate::str::contains("unknown GX version"));
}
