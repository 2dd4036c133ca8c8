pub mod classify;
pub mod generate;
pub mod scan;

use crate::ClasyContext;
use crate::enrich::Provider;
use crate::manifest::Manifest;
use crate::output;
use crate::reconcile::Reconciler;
use crate::report::{ConsoleSink, Summary};

/// Reconciles `manifest` with console reporting and prints the summary line.
fn reconcile_and_report(
    ctx: &ClasyContext,
    manifest: &mut Manifest,
    provider: &Provider,
    dry_run: bool,
) -> Summary {
    let mut sink = ConsoleSink::stderr(ctx.verbosity);
    let summary = Reconciler::new(provider)
        .dry_run(dry_run)
        .reconcile(manifest, &mut sink);

    if summary.has_problems() {
        output::warning(&summary.to_string());
    } else {
        output::success(&summary.to_string());
    }
    summary
}
