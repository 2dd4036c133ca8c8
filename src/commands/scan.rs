use crate::ClasyContext;
use crate::manifest::{FileEntry, Manifest};
use crate::output;
use crate::report::Summary;
use crate::utils::{confirm, paths::expand_tilde};
use anyhow::{Context, Result};
use path_clean::PathClean;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Link every file under `source` into `dest`, letting the configured
/// enrichment providers pick display names and tags
///
/// Without a provider every file ends up untagged and nothing is linked.
///
/// # Errors
///
/// Returns an error if:
/// - `source` is not a directory
/// - The enrichment configuration is invalid
/// - Confirmation is required but cannot be read
pub fn execute(
    ctx: &ClasyContext,
    source: &Path,
    dest: &Path,
    dry_run: bool,
    assume_yes: bool,
) -> Result<Summary> {
    let source = absolute(source)?;
    let dest = absolute(dest)?;

    if !source.is_dir() {
        anyhow::bail!("Source directory not found: {}", source.display());
    }

    let provider = ctx.provider()?;
    if provider.is_none() {
        output::warning(
            "No enrichment providers configured (enrich.providers); scanned files get no tags",
        );
    }

    output::info(&format!("Source directory: {}", source.display()));
    output::info(&format!("Destination directory: {}", dest.display()));

    if !assume_yes {
        if ctx.non_interactive {
            anyhow::bail!("Confirmation required, pass --yes to proceed");
        }
        eprint!("Are you sure? [y/N] ");
        std::io::stderr().flush()?;
        let proceed = confirm(std::io::stdin().lock()).context("Confirmation error")?;
        if !proceed {
            output::info("Aborted");
            return Ok(Summary::default());
        }
    }

    let mut manifest = build_manifest(&source, &dest);
    output::verbose(&format!("Found {} files", manifest.entries.len()));

    Ok(super::reconcile_and_report(
        ctx,
        &mut manifest,
        &provider,
        dry_run,
    ))
}

/// Collect every non-directory entry below `source` into an untagged manifest
///
/// Entries are named relative to `source` with their file name as display
/// name. Symlinks are not followed, and `dest` is skipped when it lies inside
/// `source`. Unreadable entries and non-UTF-8 names are reported and skipped.
#[must_use]
pub fn build_manifest(source: &Path, dest: &Path) -> Manifest {
    let mut manifest = Manifest::new(source, dest);

    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != dest);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                output::warning(&format!("Gathering files error: {e}"));
                continue;
            }
        };

        if entry.file_type().is_dir() {
            output::verbose(&format!("Ignore directory item: {}", entry.path().display()));
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let (Some(name), Some(display_name)) = (
            relative.to_str(),
            entry.file_name().to_str(),
        ) else {
            output::warning(&format!(
                "Skipping non UTF-8 file name: {}",
                entry.path().display()
            ));
            continue;
        };

        output::verbose(&format!("Found file item: {}", entry.path().display()));
        let mut file = FileEntry::new(name, Vec::new());
        file.display_name = display_name.to_string();
        manifest.entries.push(file);
    }

    manifest
}

/// Tilde-expanded, absolute, lexically cleaned form of `path`
fn absolute(path: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path);
    let absolute = std::path::absolute(&expanded)
        .with_context(|| format!("Failed to resolve {}", expanded.display()))?;
    Ok(absolute.clean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_manifest_lists_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let src = temp_dir.path().join("src");
        fs::create_dir_all(src.join("2021/summer"))?;
        fs::write(src.join("notes.txt"), b"n")?;
        fs::write(src.join("2021/summer/beach.jpg"), b"b")?;

        let manifest = build_manifest(&src, &temp_dir.path().join("dst"));
        let names: Vec<_> = manifest.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["2021/summer/beach.jpg", "notes.txt"]);
        assert_eq!(manifest.entries[0].display_name, "beach.jpg");
        assert!(manifest.entries.iter().all(|e| e.tags.is_empty()));
        Ok(())
    }

    #[test]
    fn test_build_manifest_skips_nested_destination() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let src = temp_dir.path().to_path_buf();
        let dest = src.join("by-tag");
        fs::create_dir_all(dest.join("txt"))?;
        fs::write(src.join("a.txt"), b"a")?;
        fs::write(dest.join("txt/stale"), b"s")?;

        let manifest = build_manifest(&src, &dest);
        assert_eq!(manifest.entries.len(), 1);
        assert_eq!(manifest.entries[0].name, "a.txt");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_tags_by_extension() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        fs::create_dir_all(src.join("trip"))?;
        fs::write(src.join("trip/beach.JPG"), b"b")?;
        fs::write(src.join("README"), b"r")?;

        let config = Config::parse("[enrich]\nproviders = [\"extension\"]\n")?;
        let ctx = ClasyContext::new_explicit(config, "unused.yml".into());

        let summary = execute(&ctx, &src, &dst, false, true)?;
        assert_eq!(summary.created, 1);
        assert_eq!(summary.enriched, 1);
        assert_eq!(
            fs::read_link(dst.join("jpg/beach.JPG"))?,
            PathBuf::from("../../src/trip/beach.JPG")
        );
        Ok(())
    }

    #[test]
    fn test_scan_requires_confirmation_when_non_interactive() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let ctx = ClasyContext::new_explicit(Config::default(), "unused.yml".into());
        let err = execute(&ctx, temp_dir.path(), &temp_dir.path().join("d"), false, false)
            .unwrap_err();
        assert!(err.to_string().contains("--yes"));
        Ok(())
    }
}
