#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)] // Event counters cannot overflow

//! # Clasy - Tag-Based Symlink Trees
//!
//! Clasy keeps your files in one source directory and lets you browse them
//! by tag. A YAML manifest lists each file and its tags; clasy turns every
//! (file, tag) pair into a relative symlink `destination/<tag>/<name>`.
//!
//! ## Features
//!
//! - **Idempotent**: re-running on an unchanged manifest changes nothing
//! - **Resumable**: already-correct links are recognized and skipped
//! - **Non-destructive**: existing entries are never deleted or overwritten;
//!   conflicts are reported instead
//! - **Relocatable**: link targets are relative, so source and destination
//!   can be moved together
//! - **Enrichment**: optional providers derive tags from file metadata
//!
//! ## Architecture
//!
//! - [`manifest`]: Manifest model, YAML loading and the skeleton template
//! - [`reconcile`]: The symlink reconciliation algorithm
//! - [`report`]: Events, sinks and run summaries
//! - [`enrich`]: Enrichment providers
//! - [`config`]: User configuration
//! - [`commands`]: Command implementations (classify, generate, scan)
//! - [`output`]: Console output styling
//! - [`utils`]: Path helpers
//!
//! ## Example Usage
//!
//! ```no_run
//! use clasy::enrich::Provider;
//! use clasy::manifest::Manifest;
//! use clasy::output::Verbosity;
//! use clasy::reconcile::Reconciler;
//! use clasy::report::ConsoleSink;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut manifest = Manifest::from_path(Path::new("meta.yml"))?;
//! let mut sink = ConsoleSink::stderr(Verbosity::Normal);
//! let summary = Reconciler::new(&Provider::None).reconcile(&mut manifest, &mut sink);
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations.
pub mod commands;

/// Configuration parsing and validation.
pub mod config;

/// Enrichment providers deriving display names and tags from file metadata.
pub mod enrich;

/// Manifest model and loading.
pub mod manifest;

/// Output formatting for commands.
pub mod output;

/// Symlink tree reconciliation.
pub mod reconcile;

/// Reconciliation events, sinks and summaries.
pub mod report;

/// Utility functions and helpers.
pub mod utils;

use anyhow::Result;
use enrich::Provider;
use output::Verbosity;
use std::path::PathBuf;

/// Current version of the clasy binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Manifest file used when neither `--file` nor the config names one.
pub const DEFAULT_MANIFEST: &str = "meta.yml";

/// Default configuration file path relative to the home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/clasy/config.toml";

/// Settings shared by all commands.
///
/// # Examples
///
/// ```
/// use clasy::ClasyContext;
/// use clasy::config::Config;
///
/// let ctx = ClasyContext::new_explicit(Config::default(), "tags.yml".into());
/// assert_eq!(ctx.manifest_path.to_str(), Some("tags.yml"));
/// ```
#[derive(Debug, Clone)]
pub struct ClasyContext {
    /// Configuration file that was loaded, if any.
    pub config_path: Option<PathBuf>,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Manifest the commands operate on.
    pub manifest_path: PathBuf,

    /// Console verbosity for per-link reports.
    pub verbosity: Verbosity,

    /// Whether to run in non-interactive mode (no prompts).
    /// Used primarily for testing to prevent stdin reads.
    pub non_interactive: bool,
}

impl ClasyContext {
    /// Creates a context from command-line overrides.
    ///
    /// The configuration comes from `config_path`, else
    /// `~/.config/clasy/config.toml`; a missing file means defaults. The
    /// manifest comes from `manifest_path`, else `core.manifest`.
    ///
    /// # Errors
    /// Returns an error if the configuration file exists but cannot be read,
    /// parsed or validated.
    pub fn new(
        config_path: Option<PathBuf>,
        manifest_path: Option<PathBuf>,
        verbosity: Verbosity,
    ) -> Result<Self> {
        let config_path = config_path.or_else(config::Config::default_path);

        let config = match &config_path {
            Some(path) => {
                let config = config::Config::load(path)?;
                // Warn about keys the loader silently ignored
                let validator = config::validator::ConfigValidator::new();
                if let Err(e) = validator.validate_config_file(path) {
                    output::warning(&format!("Configuration validation failed: {e}"));
                }
                config
            }
            None => config::Config::default(),
        };

        let manifest_path = manifest_path.unwrap_or_else(|| config.core.manifest.clone());

        Ok(Self {
            config_path,
            config,
            manifest_path,
            verbosity,
            non_interactive: false,
        })
    }

    /// Creates a context from an already loaded configuration.
    /// This avoids touching the user's home directory in tests.
    #[must_use]
    pub const fn new_explicit(config: config::Config, manifest_path: PathBuf) -> Self {
        Self {
            config_path: None,
            config,
            manifest_path,
            verbosity: Verbosity::Quiet,
            non_interactive: true,
        }
    }

    /// Builds the enrichment provider selected by the configuration.
    ///
    /// # Errors
    /// Returns an error if a provider's settings are invalid.
    pub fn provider(&self) -> Result<Provider> {
        Provider::from_config(&self.config.enrich)
    }
}
