//! Implementation of `ccgx init`.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::binder::Packager;
use crate::core::manifest::MANIFEST_FILE;
use crate::core::{Module, Workspace};
use crate::ops::pack::tidy;
use crate::toolchain::HostToolchain;
use crate::util::config::{default_project_config, PROJECT_CONFIG_FILE};
use crate::util::fs::write_string;
use crate::util::GlobalContext;

/// Options for initializing a module.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Module path passed to `go mod init`
    pub name: String,
}

/// Initialize a GX module in the existing directory `path`.
///
/// Creates go.mod, a default `ccgx.toml` and a `.gitignore` entry for the
/// staging directory, then packs and tidies the module.
pub fn init_project(
    ctx: &GlobalContext,
    path: &Path,
    opts: &InitOptions,
    toolchain: &dyn HostToolchain,
    packager: &dyn Packager,
) -> Result<Workspace> {
    if opts.name.trim().is_empty() {
        bail!("module name cannot be empty");
    }
    if path.join(MANIFEST_FILE).exists() {
        bail!("`{}` already exists in `{}`", MANIFEST_FILE, path.display());
    }

    toolchain.mod_init(path, &opts.name)?;

    let config_path = path.join(PROJECT_CONFIG_FILE);
    if !config_path.exists() {
        write_string(&config_path, &default_project_config())?;
    }

    let module = Module::load(path)?;
    let config = ctx.load_config(module.root());
    add_to_gitignore(path, config.staging_dir())?;

    let ws = Workspace::new(module, config);
    tidy(&ws, packager, toolchain)?;
    Ok(ws)
}

/// Append `/<entry>/` to the `.gitignore` in `path` unless it is already listed.
fn add_to_gitignore(path: &Path, entry: &str) -> Result<()> {
    let gitignore = path.join(".gitignore");
    let line = format!("/{}/", entry.trim_matches('/'));

    let mut content = if gitignore.exists() {
        fs::read_to_string(&gitignore)
            .with_context(|| format!("failed to read {}", gitignore.display()))?
    } else {
        String::new()
    };

    if content.lines().any(|l| l.trim() == line) {
        return Ok(());
    }
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str("# ccgx staging directory\n");
    content.push_str(&line);
    content.push('\n');
    write_string(&gitignore, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockGx, MockToolchain};
    use tempfile::TempDir;

    fn opts(name: &str) -> InitOptions {
        InitOptions {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_init_creates_project_files() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        let toolchain = MockToolchain::new("/cache");
        let gx = MockGx::new();

        let ws = init_project(&ctx, tmp.path(), &opts("helloworld"), &toolchain, &gx).unwrap();

        assert_eq!(ws.module().name(), "helloworld");
        assert!(tmp.path().join("go.mod").is_file());
        assert!(tmp.path().join("ccgx.toml").is_file());
        let gitignore = std::fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        assert!(gitignore.contains("/gxdeps/"));

        let calls = toolchain.calls();
        assert!(calls[0].starts_with("mod_init"));
        assert!(calls[0].ends_with("helloworld"));
        assert!(calls[1].starts_with("tidy"));
    }

    #[test]
    fn test_init_refuses_existing_manifest() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("go.mod"), "module existing\n").unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        let toolchain = MockToolchain::new("/cache");

        let err = init_project(&ctx, tmp.path(), &opts("helloworld"), &toolchain, &MockGx::new())
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(toolchain.calls().is_empty());
    }

    #[test]
    fn test_gitignore_entry_added_once() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".gitignore"), "target/").unwrap();

        add_to_gitignore(tmp.path(), "gxdeps").unwrap();
        add_to_gitignore(tmp.path(), "gxdeps").unwrap();

        let content = std::fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        assert!(content.starts_with("target/\n"));
        assert_eq!(content.matches("/gxdeps/").count(), 1);
    }
}
