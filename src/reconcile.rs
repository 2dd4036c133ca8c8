//! Idempotent reconciliation of the tag symlink tree.
//!
//! For every entry, in manifest order, and every tag, in entry order, the
//! reconciler makes sure `destination/<tag>/<display name>` is a symlink
//! whose recorded target is the relative path to `source/<name>`:
//!
//! 1. The link's parent directory is created if missing.
//! 2. The relative target is computed from that parent directory.
//! 3. The link path is inspected without following symlinks:
//!    - missing: the symlink is created
//!    - a symlink with the same target: nothing to do
//!    - a symlink with another target: reported as a conflict
//!    - anything else: reported as an unknown state
//!
//! Nothing is ever deleted, renamed or overwritten, so a run can be repeated
//! or resumed after an interruption. Every failure is confined to its
//! (entry, tag) pair and reported to the [`Sink`].
//!
//! Source files are not required to exist: a missing source yields a broken
//! link. When enrichment is configured the source is stat'ed first, and a
//! failed stat is reported as a warning before linking with the entry's
//! original values.

use crate::enrich::Provider;
use crate::manifest::{FileEntry, Manifest};
use crate::report::{Event, Sink, Stage, Summary};
use crate::utils::paths::{
    create_dir_tree, create_symlink, expand_tilde, join_under, relative_link_target,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

/// Builds or verifies the symlink tree described by a manifest.
#[derive(Debug)]
pub struct Reconciler<'a> {
    /// Enrichment applied to each entry before linking
    provider: &'a Provider,
    /// Inspect only, never touch the filesystem
    dry_run: bool,
}

/// Mutable state of a single run.
struct Run<'s> {
    /// Caller's sink
    sink: &'s mut dyn Sink,
    /// Counters over every reported event
    summary: Summary,
    /// Directories a dry run pretends to have created
    planned_dirs: HashSet<PathBuf>,
    /// Links a dry run pretends to have created, with their targets
    planned_links: HashMap<PathBuf, PathBuf>,
}

impl Sink for Run<'_> {
    fn report(&mut self, event: Event) {
        debug!(severity = ?event.severity(), "{event}");
        self.summary.record(&event);
        self.sink.report(event);
    }
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler using `provider` for enrichment.
    #[must_use]
    pub const fn new(provider: &'a Provider) -> Self {
        Self {
            provider,
            dry_run: false,
        }
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reconciles every (entry, tag) pair of `manifest`.
    ///
    /// Enrichment rewrites entries in place. All outcomes are reported to
    /// `sink`; the returned summary counts them.
    pub fn reconcile(&self, manifest: &mut Manifest, sink: &mut dyn Sink) -> Summary {
        let source_dir = expand_tilde(&manifest.source_dir);
        let dest_dir = expand_tilde(&manifest.dest_dir);

        let span = span!(
            Level::DEBUG,
            "reconcile",
            source = %source_dir.display(),
            dest = %dest_dir.display(),
            dry_run = self.dry_run
        );
        let _guard = span.enter();
        debug!(entries = manifest.entries.len(), "Starting reconciliation");

        let mut run = Run {
            sink,
            summary: Summary::default(),
            planned_dirs: HashSet::new(),
            planned_links: HashMap::new(),
        };

        for entry in &mut manifest.entries {
            self.reconcile_entry(&source_dir, &dest_dir, entry, &mut run);
        }

        debug!(summary = %run.summary, "Reconciliation finished");
        run.summary
    }

    fn reconcile_entry(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        entry: &mut FileEntry,
        run: &mut Run<'_>,
    ) {
        let span = span!(Level::DEBUG, "entry", name = %entry.name);
        let _guard = span.enter();

        let Some(source) = join_under(source_dir, &entry.name) else {
            run.report(Event::Failed {
                path: PathBuf::from(&entry.name),
                stage: Stage::InvalidPath,
                message: "name must be a relative path inside the source directory".to_string(),
            });
            return;
        };

        if !self.provider.is_none() {
            self.enrich_entry(&source, entry, run);
        }

        for tag in &entry.tags {
            self.reconcile_link(dest_dir, &source, tag, &entry.display_name, run);
        }
    }

    fn enrich_entry(&self, source: &Path, entry: &mut FileEntry, run: &mut Run<'_>) {
        let metadata = match fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(e) => {
                run.report(Event::SourceUnavailable {
                    source: source.to_path_buf(),
                    message: e.to_string(),
                });
                return;
            }
        };

        let Some((provider, enrichment)) = self.provider.enrich(source, &metadata, run) else {
            return;
        };

        let display_name = enrichment.display_name.filter(|name| !name.is_empty());
        if let Some(name) = &display_name {
            entry.display_name.clone_from(name);
        }
        if let Some(tags) = &enrichment.tags {
            entry.tags.clone_from(tags);
        }
        entry.normalize();

        run.report(Event::Enriched {
            source: source.to_path_buf(),
            provider,
            display_name,
            tags: enrichment.tags,
        });
    }

    fn reconcile_link(
        &self,
        dest_dir: &Path,
        source: &Path,
        tag: &str,
        display_name: &str,
        run: &mut Run<'_>,
    ) {
        let link = join_under(dest_dir, tag).and_then(|tag_dir| join_under(&tag_dir, display_name));
        let Some((link, link_dir)) =
            link.and_then(|link| link.parent().map(Path::to_path_buf).map(|dir| (link, dir)))
        else {
            run.report(Event::Failed {
                path: PathBuf::from(format!("{tag}/{display_name}")),
                stage: Stage::InvalidPath,
                message: "tag and display name must be relative paths inside the destination directory"
                    .to_string(),
            });
            return;
        };

        if !self.ensure_directory(&link_dir, run) {
            return;
        }

        let Some(target) = relative_link_target(&link_dir, source) else {
            run.report(Event::Failed {
                path: link,
                stage: Stage::RelativePath,
                message: format!(
                    "no relative path from {} to {}",
                    link_dir.display(),
                    source.display()
                ),
            });
            return;
        };

        match fs::symlink_metadata(&link) {
            Err(e) if e.kind() == ErrorKind::NotFound => self.create_link(link, target, run),
            Err(e) => run.report(Event::Failed {
                path: link,
                stage: Stage::Inspect,
                message: e.to_string(),
            }),
            Ok(metadata) if metadata.file_type().is_symlink() => match fs::read_link(&link) {
                Ok(existing) if existing == target => run.report(Event::Unchanged { link }),
                Ok(existing) => run.report(Event::Conflict {
                    link,
                    existing,
                    expected: target,
                }),
                Err(e) => run.report(Event::Failed {
                    path: link,
                    stage: Stage::ReadLink,
                    message: e.to_string(),
                }),
            },
            Ok(_) => run.report(Event::UnknownState { link }),
        }
    }

    /// Makes sure `dir` is (or, in a dry run, would be) a directory.
    fn ensure_directory(&self, dir: &Path, run: &mut Run<'_>) -> bool {
        if dir.is_dir() || run.planned_dirs.contains(dir) {
            return true;
        }

        if self.dry_run {
            if let Some(message) = Self::planned_dir_blocker(dir, run) {
                run.report(Event::Failed {
                    path: dir.to_path_buf(),
                    stage: Stage::CreateDirectory,
                    message,
                });
                return false;
            }
            run.planned_dirs.insert(dir.to_path_buf());
            run.report(Event::DirectoryPlanned {
                path: dir.to_path_buf(),
            });
            return true;
        }

        match create_dir_tree(dir) {
            Ok(()) => {
                run.report(Event::DirectoryCreated {
                    path: dir.to_path_buf(),
                });
                true
            }
            Err(e) => {
                run.report(Event::Failed {
                    path: dir.to_path_buf(),
                    stage: Stage::CreateDirectory,
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// Why creating `dir` would fail, judged from its closest existing (or
    /// planned) ancestor.
    fn planned_dir_blocker(dir: &Path, run: &Run<'_>) -> Option<String> {
        for ancestor in dir.ancestors() {
            if run.planned_dirs.contains(ancestor) {
                return None;
            }
            if run.planned_links.contains_key(ancestor) {
                return Some(format!("{} would be a symlink", ancestor.display()));
            }
            match fs::symlink_metadata(ancestor) {
                Ok(metadata) if metadata.is_dir() => return None,
                // Directory creation follows symlinks
                Ok(metadata) if metadata.file_type().is_symlink() && ancestor.is_dir() => {
                    return None;
                }
                Ok(_) => {
                    return Some(format!(
                        "{} exists and is not a directory",
                        ancestor.display()
                    ));
                }
                Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {}
                Err(e) => return Some(e.to_string()),
            }
        }
        None
    }

    fn create_link(&self, link: PathBuf, target: PathBuf, run: &mut Run<'_>) {
        if self.dry_run {
            let event = match run.planned_links.get(&link) {
                Some(planned) if *planned == target => Event::Unchanged { link },
                Some(planned) => Event::Conflict {
                    link,
                    existing: planned.clone(),
                    expected: target,
                },
                None => {
                    run.planned_links.insert(link.clone(), target.clone());
                    Event::LinkPlanned { link, target }
                }
            };
            run.report(event);
            return;
        }

        match create_symlink(&target, &link) {
            Ok(()) => run.report(Event::LinkCreated { link, target }),
            Err(e) => run.report(Event::Failed {
                path: link,
                stage: Stage::CreateLink,
                message: e.to_string(),
            }),
        }
    }
}
