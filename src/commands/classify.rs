use crate::ClasyContext;
use crate::manifest::{Manifest, SCHEMA_VERSION};
use crate::output;
use crate::report::Summary;
use anyhow::Result;

/// Load the manifest and reconcile its symlink tree
///
/// Per-link problems are reported on the console and reflected in the
/// returned summary; they never make this function fail.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest cannot be opened, read or parsed
/// - The configured enrichment providers are invalid
pub fn execute(ctx: &ClasyContext, dry_run: bool) -> Result<Summary> {
    let mut manifest = Manifest::from_path(&ctx.manifest_path)?;

    if !manifest.is_current_schema() {
        output::warning(&format!(
            "Manifest schema '{}' is not {SCHEMA_VERSION}, continuing anyway",
            manifest.schema
        ));
    }

    let provider = ctx.provider()?;
    if !provider.is_none() {
        output::verbose(&format!("Enrichment providers: {}", provider.name()));
    }

    output::verbose(&format!(
        "Reconciling {} links from {}",
        manifest.link_count(),
        ctx.manifest_path.display()
    ));
    output::verbose(&format!("Source directory: {}", manifest.source_dir.display()));
    output::verbose(&format!(
        "Destination directory: {}",
        manifest.dest_dir.display()
    ));

    Ok(super::reconcile_and_report(
        ctx,
        &mut manifest,
        &provider,
        dry_run,
    ))
}
