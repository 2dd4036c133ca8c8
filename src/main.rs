use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use clasy::cli::{Cli, Commands};
use clasy::manifest::ManifestError;
use clasy::output::{self, Verbosity};
use clasy::{ClasyContext, commands};
use colored::Colorize;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit status when the manifest file cannot be opened.
const EXIT_CANNOT_OPEN: i32 = 128;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    output::set_verbosity(verbosity);

    let command = cli.command.unwrap_or(Commands::Classify { dry_run: false });
    if let Commands::Completion { shell } = command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let ctx = ClasyContext::new(cli.config, cli.file, verbosity)?;

    match command {
        Commands::Classify { dry_run } => {
            commands::classify::execute(&ctx, dry_run)?;
        }
        Commands::Generate { stdout, force } => {
            commands::generate::execute(&ctx, stdout, force)?;
        }
        Commands::Scan {
            source,
            dest,
            dry_run,
            yes,
        } => {
            commands::scan::execute(&ctx, &source, &dest, dry_run, yes)?;
        }
        Commands::Completion { .. } => {}
    }

    Ok(())
}

/// Diagnostics are opt-in through `CLASY_LOG`; user-facing lines come from
/// the console sink.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("CLASY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<ManifestError>() {
        Some(ManifestError::Open { .. }) => EXIT_CANNOT_OPEN,
        _ => 1,
    }
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
