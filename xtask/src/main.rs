//! xtask for clasy - build automation and tooling
//!
//! This binary provides development tasks like man page generation.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for clasy")]
enum Task {
    /// Generate man pages from clap definitions
    GenerateManPages {
        /// Output directory for man pages (default: ./man)
        #[arg(short, long, default_value = "man")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let task = Task::parse();

    match task {
        Task::GenerateManPages { output } => generate_man_pages(&output)?,
    }

    Ok(())
}

fn generate_man_pages(output_dir: &Path) -> Result<()> {
    println!("Generating man pages...");

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut cmd = clasy::cli::Cli::command();

    let man_path = output_dir.join("clasy.1");
    render(cmd.clone(), &man_path)?;

    for subcmd_name in ["classify", "generate", "scan"] {
        if let Some(subcmd) = cmd.find_subcommand_mut(subcmd_name) {
            let name = format!("clasy-{subcmd_name}");
            let subcmd = subcmd.clone().name(name.clone());
            render(subcmd, &output_dir.join(format!("{name}.1")))?;
        }
    }

    println!("Man pages generated in {}", output_dir.display());
    Ok(())
}

fn render(cmd: clap::Command, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create man page: {}", path.display()))?;
    clap_mangen::Man::new(cmd).render(&mut std::io::BufWriter::new(file))?;
    println!("✓ Generated: {}", path.display());
    Ok(())
}
