//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// ccgx - Generate C++ bindings and C archives for GX packages
#[derive(Parser)]
#[command(name = "ccgx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print every external command before running it
    #[arg(short, long, global = true, env = "CCGX_DEBUG")]
    pub debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create go.mod and ccgx.toml in the current directory
    Init(InitArgs),

    /// Pack GX packages, then update go.mod and go.sum
    Tidy,

    /// Create Go packages embedding the GX sources
    Pack,

    /// Link required modules into the staging directory
    Link,

    /// Generate C++ bindings for every GX package
    Bind(BindArgs),

    /// Build a C archive with every GX package and its dependencies
    Carchive,

    /// Link, bind and build the C archive
    Build(BindArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Module path, e.g. `example.org/helloworld`
    pub name: String,
}

#[derive(Args)]
pub struct BindArgs {
    /// Write a BUILD.bazel next to each package's bindings
    #[arg(long)]
    pub emit_build_files: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
