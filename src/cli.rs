//! Command-line interface definitions for clasy.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The CLI definitions are shared between the main binary and build tools (like xtask)
//! for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes (#[arg(help = "...")]),
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for clasy.
#[derive(Parser)]
#[command(
    name = "clasy",
    version = crate::VERSION,
    about = "Browse files by tag through a symlink tree",
    long_about = "Reads a manifest of files and their tags and keeps a tree of relative symlinks \
                  (destination/<tag>/<name>) pointing back at the original files"
)]
pub struct Cli {
    /// Subcommand to execute (default: classify)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Manifest file (default: core.manifest from the config, else meta.yml)
    #[arg(short = 'f', long = "file", global = true, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Configuration file (default: ~/.config/clasy/config.toml)
    #[arg(long, global = true, value_name = "FILE", env = "CLASY_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create or verify the tag symlinks described by the manifest
    #[command(alias = "reconcile")]
    Classify {
        /// Show what would happen without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Write a skeleton manifest
    #[command(alias = "template")]
    Generate {
        /// Print the skeleton instead of writing the manifest file
        #[arg(long)]
        stdout: bool,

        /// Overwrite an existing manifest file
        #[arg(long)]
        force: bool,
    },

    /// Link every file under SOURCE into DEST, tagged by the enrichment providers
    Scan {
        /// Directory holding the original files
        source: PathBuf,

        /// Directory receiving the tag tree
        dest: PathBuf,

        /// Show what would happen without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
