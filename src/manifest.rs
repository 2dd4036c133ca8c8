//! Manifest loading and serialization.
//!
//! A manifest names a source directory holding the original files, a
//! destination directory for the symlink tree, and the tags of each file:
//!
//! ```yaml
//! schema: "0.0"
//! source_directory: /home/me/archive
//! destination_directory: /home/me/by-tag
//! files:
//!   - name: 2021/beach.jpg
//!     display_name: beach.jpg
//!     tags: [photos, summer]
//! ```
//!
//! Loading only checks structure. Whether the directories or files exist is
//! discovered later, entry by entry, by the reconciler.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema version written by [`Manifest::template`].
pub const SCHEMA_VERSION: &str = "0.0";

/// Errors raised while loading a manifest. All of them are fatal for a run.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be opened.
    #[error("Can't open manifest {}", .path.display())]
    Open {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The manifest stream could not be read to the end (or is not UTF-8).
    #[error("Failed to read manifest")]
    Io(#[from] std::io::Error),

    /// The manifest is not well-formed YAML of the expected shape.
    #[error("Failed to parse manifest")]
    Parse(#[from] serde_yaml::Error),
}

/// In-memory model of a manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version
    #[serde(default)]
    pub schema: String,

    /// Directory holding the original files
    #[serde(rename = "source_directory")]
    pub source_dir: PathBuf,

    /// Directory under which the tag tree is built
    #[serde(rename = "destination_directory")]
    pub dest_dir: PathBuf,

    /// Files to link, in processing order
    #[serde(default, rename = "files")]
    pub entries: Vec<FileEntry>,
}

/// One file and the tags it is linked under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the source directory
    pub name: String,

    /// Link name inside each tag directory; defaults to `name`
    #[serde(default)]
    pub display_name: String,

    /// Tags, duplicates removed in first-seen order
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FileEntry {
    /// Creates an entry whose display name equals its name.
    #[must_use]
    pub fn new(name: impl Into<String>, tags: Vec<String>) -> Self {
        let mut entry = Self {
            name: name.into(),
            display_name: String::new(),
            tags,
        };
        entry.normalize();
        entry
    }

    /// Applies the load-time defaults: empty display name falls back to the
    /// name, repeated tags are dropped.
    pub fn normalize(&mut self) {
        if self.display_name.is_empty() {
            self.display_name.clone_from(&self.name);
        }
        let mut seen = std::collections::HashSet::new();
        self.tags.retain(|tag| seen.insert(tag.clone()));
    }
}

impl Manifest {
    /// Creates an empty manifest for the given directories.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema: SCHEMA_VERSION.to_string(),
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            entries: Vec::new(),
        }
    }

    /// Parses a manifest from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] if the text is malformed or lacks
    /// `source_directory`, `destination_directory`, or an entry `name`.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let mut manifest: Self = serde_yaml::from_str(content)?;
        for entry in &mut manifest.entries {
            entry.normalize();
        }
        Ok(manifest)
    }

    /// Reads a whole stream and parses it as a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the stream cannot be fully read and
    /// [`ManifestError::Parse`] if its content is not a valid manifest.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ManifestError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    /// Opens and loads the manifest file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Open`] if the file cannot be opened, and the
    /// errors of [`Manifest::from_reader`] otherwise.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let file = File::open(path).map_err(|source| ManifestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Skeleton manifest with placeholder values and a single tagged entry.
    #[must_use]
    pub fn template() -> Self {
        Self {
            schema: SCHEMA_VERSION.to_string(),
            source_dir: PathBuf::from("Original file stored directory"),
            dest_dir: PathBuf::from("Directory will be created symlinks"),
            entries: vec![FileEntry {
                name: "filename relative in the directory".to_string(),
                display_name: "display name".to_string(),
                tags: vec!["tag".to_string()],
            }],
        }
    }

    /// Serializes the manifest as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Writes the manifest as YAML to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writer.write_all(self.to_yaml_string()?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Whether the manifest declares the schema version this build writes.
    #[must_use]
    pub fn is_current_schema(&self) -> bool {
        self.schema == SCHEMA_VERSION
    }

    /// Total number of (entry, tag) pairs.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.entries.iter().map(|e| e.tags.len()).sum()
    }
}
