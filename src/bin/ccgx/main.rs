//! ccgx CLI - build orchestrator for GX packages consumed from C and C++

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use ccgx::util::diagnostic;
use ccgx::util::GlobalContext;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        diagnostic::emit(&diagnostic::from_error(&e), color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("ccgx=debug")
    } else {
        EnvFilter::new("ccgx=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let ctx = GlobalContext::new()?.with_trace_commands(cli.debug);

    // Execute command
    match cli.command {
        Commands::Init(args) => commands::init::execute(&ctx, args),
        Commands::Tidy => commands::tidy::execute(&ctx),
        Commands::Pack => commands::pack::execute(&ctx),
        Commands::Link => commands::link::execute(&ctx),
        Commands::Bind(args) => commands::bind::execute(&ctx, args),
        Commands::Carchive => commands::carchive::execute(&ctx),
        Commands::Build(args) => commands::build::execute(&ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
