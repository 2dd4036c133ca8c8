pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Names accepted in `enrich.providers`.
pub const KNOWN_PROVIDERS: &[&str] = &["extension", "modified"];

/// Contents of `config.toml`; every section is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// `[core]`
    #[serde(default)]
    pub core: CoreConfig,

    /// `[enrich]`
    #[serde(default)]
    pub enrich: EnrichConfig,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreConfig {
    /// Manifest used when `--file` is not given
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

/// Enrichment provider selection, in chain order
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EnrichConfig {
    /// Provider names; empty disables enrichment
    #[serde(default)]
    pub providers: Vec<String>,

    /// `[enrich.extension]`
    #[serde(default)]
    pub extension: ExtensionConfig,

    /// `[enrich.modified]`
    #[serde(default)]
    pub modified: ModifiedConfig,
}

/// Settings of the `extension` provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtensionConfig {
    /// Lowercased extension -> tag
    #[serde(default)]
    pub map: BTreeMap<String, String>,
    /// Use the extension itself as tag when it is not in `map`
    #[serde(default = "default_keep_unmapped")]
    pub keep_unmapped: bool,
}

/// Settings of the `modified` provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModifiedConfig {
    /// chrono format string applied to the modification time
    #[serde(default = "default_modified_format")]
    pub format: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
            keep_unmapped: default_keep_unmapped(),
        }
    }
}

impl Default for ModifiedConfig {
    fn default() -> Self {
        Self {
            format: default_modified_format(),
        }
    }
}

impl Config {
    /// Default location: `~/.config/clasy/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(crate::DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from a file
    ///
    /// A missing file yields the defaults; nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or fails validation.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot
    fn validate(&self) -> Result<()> {
        for name in &self.enrich.providers {
            if !KNOWN_PROVIDERS.contains(&name.as_str()) {
                anyhow::bail!(
                    "Unknown enrichment provider '{name}' (known: {})",
                    KNOWN_PROVIDERS.join(", ")
                );
            }
        }

        if self.enrich.modified.format.trim().is_empty() {
            anyhow::bail!("enrich.modified.format must not be empty");
        }

        if self.core.manifest.as_os_str().is_empty() {
            anyhow::bail!("core.manifest must not be empty");
        }

        Ok(())
    }
}

/// `meta.yml`
fn default_manifest() -> PathBuf {
    PathBuf::from(crate::DEFAULT_MANIFEST)
}

/// Unmapped extensions are kept
const fn default_keep_unmapped() -> bool {
    true
}

/// One tag per year
fn default_modified_format() -> String {
    "%Y".to_string()
}
