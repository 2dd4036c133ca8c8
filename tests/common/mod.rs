#![allow(dead_code)]

use anyhow::Result;
use clasy::manifest::{FileEntry, Manifest};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Source and destination directories inside one temporary root
pub struct TestTree {
    pub temp_dir: TempDir,
    pub src: PathBuf,
    pub dst: PathBuf,
}

impl TestTree {
    /// Create `src/` (existing) and `dst/` (not yet created) under a temp root
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        fs::create_dir_all(&src)?;
        Ok(Self { temp_dir, src, dst })
    }

    /// Get the temporary root path
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a source file, including parent directories
    pub fn source_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.src.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Manifest over this tree with the given (name, tags) entries
    pub fn manifest(&self, entries: &[(&str, &[&str])]) -> Manifest {
        let mut manifest = Manifest::new(&self.src, &self.dst);
        manifest.entries = entries
            .iter()
            .map(|(name, tags)| FileEntry::new(*name, tags.iter().map(ToString::to_string).collect()))
            .collect();
        manifest
    }

    /// Write a manifest YAML file into the temp root and return its path
    pub fn write_manifest(&self, files_yaml: &str) -> Result<PathBuf> {
        let path = self.path().join("meta.yml");
        fs::write(
            &path,
            format!(
                "schema: \"0.0\"\nsource_directory: {}\ndestination_directory: {}\nfiles:\n{files_yaml}",
                self.src.display(),
                self.dst.display()
            ),
        )?;
        Ok(path)
    }

    /// Path of the link for `tag` and `display_name`
    pub fn link(&self, tag: &str, display_name: &str) -> PathBuf {
        self.dst.join(tag).join(display_name)
    }

    /// Every entry under `dst` with the recorded target of symlinks
    pub fn snapshot(&self) -> Vec<(PathBuf, Option<PathBuf>)> {
        if !self.dst.exists() {
            return Vec::new();
        }
        WalkDir::new(&self.dst)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .map(|e| {
                let target = fs::read_link(e.path()).ok();
                (e.path().to_path_buf(), target)
            })
            .collect()
    }
}
