//! Optional, best-effort rewriting of an entry's display name and tags.
//!
//! Enrichers are statically linked and selected at startup through
//! [`Provider`]. Each one looks at a source file's path and metadata and
//! either declines or proposes replacement values. Failures are reported as
//! warnings and never stop a run.
//!
//! Enrichers run synchronously on the reconciliation thread; a slow enricher
//! stalls the whole run and no timeout is applied.

mod extension;
mod modified;

pub use extension::ExtensionTags;
pub use modified::ModifiedTime;

use crate::config::EnrichConfig;
use crate::report::{Event, Sink};
use anyhow::Result;
use std::fs::Metadata;
use std::path::Path;
use tracing::debug;

/// Replacement values proposed by an enricher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    /// New display name; `None` or empty keeps the current one
    pub display_name: Option<String>,
    /// New tag list; `None` keeps the current tags, an empty list removes them
    pub tags: Option<Vec<String>>,
}

impl Enrichment {
    /// Enrichment replacing only the tags.
    #[must_use]
    pub const fn tags(tags: Vec<String>) -> Self {
        Self {
            display_name: None,
            tags: Some(tags),
        }
    }
}

/// A source of display names and tags for files.
pub trait Enricher {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Inspects `path` and its `metadata`.
    ///
    /// Returns `Ok(None)` to decline.
    ///
    /// # Errors
    ///
    /// Any error is reported as a warning and the entry keeps its values.
    fn enrich(&self, path: &Path, metadata: &Metadata) -> Result<Option<Enrichment>>;
}

/// The enrichment configured for a run.
#[derive(Default)]
pub enum Provider {
    /// No enrichment; source files are not even stat'ed.
    #[default]
    None,
    /// A single enricher.
    Single(Box<dyn Enricher>),
    /// Enrichers asked in order; the first replacement wins.
    Chain(Vec<Box<dyn Enricher>>),
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("Provider::None"),
            Self::Single(e) => write!(f, "Provider::Single({})", e.name()),
            Self::Chain(chain) => {
                let names: Vec<&str> = chain.iter().map(|e| e.name()).collect();
                write!(f, "Provider::Chain([{}])", names.join(", "))
            }
        }
    }
}

impl Provider {
    /// Builds the provider named by `config.providers`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown provider names or invalid settings.
    pub fn from_config(config: &EnrichConfig) -> Result<Self> {
        let mut enrichers: Vec<Box<dyn Enricher>> = Vec::with_capacity(config.providers.len());
        for name in &config.providers {
            let enricher: Box<dyn Enricher> = match name.as_str() {
                "extension" => Box::new(ExtensionTags::from_config(&config.extension)),
                "modified" => Box::new(ModifiedTime::new(&config.modified.format)?),
                other => anyhow::bail!("Unknown enrichment provider '{other}'"),
            };
            enrichers.push(enricher);
        }
        Ok(Self::from_enrichers(enrichers))
    }

    /// Wraps a list of enrichers in the smallest matching variant.
    #[must_use]
    pub fn from_enrichers(mut enrichers: Vec<Box<dyn Enricher>>) -> Self {
        match enrichers.len() {
            0 => Self::None,
            1 => enrichers.pop().map_or(Self::None, Self::Single),
            _ => Self::Chain(enrichers),
        }
    }

    /// Whether any enricher is configured.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Comma-separated enricher names.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Single(e) => e.name().to_string(),
            Self::Chain(chain) => chain
                .iter()
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Asks the configured enrichers about one file.
    ///
    /// Returns the answering enricher's name with its replacement, or `None`
    /// when every enricher declined or failed. Failures go to `sink`.
    pub fn enrich(
        &self,
        path: &Path,
        metadata: &Metadata,
        sink: &mut dyn Sink,
    ) -> Option<(String, Enrichment)> {
        let enrichers: &[Box<dyn Enricher>] = match self {
            Self::None => return None,
            Self::Single(e) => std::slice::from_ref(e),
            Self::Chain(chain) => chain,
        };

        for enricher in enrichers {
            match enricher.enrich(path, metadata) {
                Ok(Some(enrichment)) => return Some((enricher.name().to_string(), enrichment)),
                Ok(None) => {
                    debug!(provider = enricher.name(), path = %path.display(), "Declined");
                }
                Err(e) => sink.report(Event::EnrichmentFailed {
                    source: path.to_path_buf(),
                    provider: enricher.name().to_string(),
                    message: format!("{e:#}"),
                }),
            }
        }
        None
    }
}
