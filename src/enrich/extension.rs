use super::{Enricher, Enrichment};
use crate::config::ExtensionConfig;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fs::Metadata;
use std::path::Path;

/// Tags files by their extension.
///
/// Extensions are lowercased and looked up in a mapping table. Unmapped
/// extensions become the tag themselves unless `keep_unmapped` is off, in
/// which case the file is declined. Files without an extension and
/// directories are always declined.
#[derive(Debug, Clone, Default)]
pub struct ExtensionTags {
    map: BTreeMap<String, String>,
    keep_unmapped: bool,
}

impl ExtensionTags {
    /// Creates the enricher from a mapping table.
    #[must_use]
    pub fn new(map: BTreeMap<String, String>, keep_unmapped: bool) -> Self {
        let map = map
            .into_iter()
            .map(|(ext, tag)| (ext.trim_start_matches('.').to_lowercase(), tag))
            .collect();
        Self { map, keep_unmapped }
    }

    /// Creates the enricher from `[enrich.extension]`.
    #[must_use]
    pub fn from_config(config: &ExtensionConfig) -> Self {
        Self::new(config.map.clone(), config.keep_unmapped)
    }

    fn tag_for(&self, ext: &str) -> Option<String> {
        let ext = ext.to_lowercase();
        match self.map.get(&ext) {
            Some(tag) => Some(tag.clone()),
            None if self.keep_unmapped => Some(ext),
            None => None,
        }
    }
}

impl Enricher for ExtensionTags {
    fn name(&self) -> &str {
        "extension"
    }

    fn enrich(&self, path: &Path, metadata: &Metadata) -> Result<Option<Enrichment>> {
        if metadata.is_dir() {
            return Ok(None);
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Ok(None);
        };
        Ok(self.tag_for(ext).map(|tag| Enrichment::tags(vec![tag])))
    }
}
