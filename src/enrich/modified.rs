use super::{Enricher, Enrichment};
use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs::Metadata;
use std::path::Path;

/// Tags files by their modification time, formatted in local time.
///
/// The default format `%Y` yields one tag per year. Formats containing `/`
/// produce nested tag directories (e.g. `%Y/%m`).
#[derive(Debug, Clone)]
pub struct ModifiedTime {
    format: String,
}

impl ModifiedTime {
    /// Creates the enricher after checking `format` is a valid strftime
    /// pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty or contains an unknown
    /// specifier.
    pub fn new(format: &str) -> Result<Self> {
        if format.trim().is_empty() {
            anyhow::bail!("Modification time format must not be empty");
        }
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!("Invalid modification time format: {format}");
        }
        Ok(Self {
            format: format.to_string(),
        })
    }

    fn tag_for(&self, modified: DateTime<Local>) -> Result<String> {
        let mut tag = String::new();
        write!(tag, "{}", modified.format(&self.format))
            .with_context(|| format!("Can't format time with '{}'", self.format))?;
        Ok(tag)
    }
}

impl Enricher for ModifiedTime {
    fn name(&self) -> &str {
        "modified"
    }

    fn enrich(&self, _path: &Path, metadata: &Metadata) -> Result<Option<Enrichment>> {
        if metadata.is_dir() {
            return Ok(None);
        }
        let modified = metadata
            .modified()
            .context("Modification time is not available")?;
        let tag = self.tag_for(DateTime::<Local>::from(modified))?;
        if tag.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Enrichment::tags(vec![tag])))
    }
}
