use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Detects configuration keys that clasy does not recognize
pub struct ConfigValidator {
    /// Set of valid configuration fields that are recognized by clasy
    known_fields: HashSet<&'static str>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "core",
            "core.manifest",
            "enrich",
            "enrich.providers",
            "enrich.extension",
            "enrich.extension.keep_unmapped",
            "enrich.modified",
            "enrich.modified.format",
        ]
        .into_iter()
        .collect();

        Self { known_fields }
    }

    /// Returns the dotted paths of all unknown fields in `content`
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML
    pub fn unknown_fields(&self, content: &str) -> Result<Vec<String>> {
        let parsed: toml::Value = toml::from_str(content)?;
        let mut unknown = Vec::new();
        self.check_table(&parsed, "", &mut unknown);
        Ok(unknown)
    }

    /// Validate a configuration file and warn about unknown fields
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path)?;
        let unknown = self.unknown_fields(&content)?;

        if !unknown.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for field in &unknown {
                eprintln!("  Unknown configuration field: {}", field.yellow());
            }
            eprintln!();
        }

        Ok(())
    }

    /// Recursively checks a TOML table for unknown fields
    ///
    /// `enrich.extension.map` is a free-form table and is not descended into.
    fn check_table(&self, table: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
        let toml::Value::Table(map) = table else {
            return;
        };

        for (key, value) in map {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if full_key == "enrich.extension.map" {
                Self::check_extension_map(value, &full_key, unknown);
                continue;
            }

            if !self.known_fields.contains(full_key.as_str()) {
                unknown.push(full_key);
            } else if let toml::Value::Table(_) = value {
                self.check_table(value, &full_key, unknown);
            }
        }
    }

    /// Entries of the extension map must be plain strings
    fn check_extension_map(value: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
        if let toml::Value::Table(map) = value {
            for (key, tag) in map {
                if !tag.is_str() {
                    unknown.push(format!("{prefix}.{key}"));
                }
            }
        } else {
            unknown.push(prefix.to_string());
        }
    }
}
