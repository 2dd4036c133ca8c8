//! Reporting channel for reconciliation outcomes.
//!
//! The reconciler never fails as a whole: every per-item outcome, from a
//! freshly created link to a conflict it refuses to resolve, becomes an
//! [`Event`] handed to a [`Sink`] that the caller passes in explicitly.

use crate::output::Verbosity;
use colored::Colorize;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

/// How loudly an event should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Nothing happened, shown only in verbose mode.
    Debug,
    /// A change was made (or planned).
    Info,
    /// A conflict or degraded enrichment; the item was left alone.
    Warning,
    /// An operation on the item failed and was skipped.
    Error,
}

/// The step of the reconciliation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A name, tag or display name does not resolve inside its directory.
    InvalidPath,
    /// The link's parent directory could not be created.
    CreateDirectory,
    /// No relative path from the link directory to the source exists.
    RelativePath,
    /// The link path could not be inspected.
    Inspect,
    /// An existing symlink's target could not be read.
    ReadLink,
    /// The symlink itself could not be created.
    CreateLink,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidPath => "invalid path",
            Self::CreateDirectory => "create directory",
            Self::RelativePath => "relative path",
            Self::Inspect => "inspect",
            Self::ReadLink => "read link",
            Self::CreateLink => "create link",
        };
        f.write_str(s)
    }
}

/// A single reconciliation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A missing link directory was created.
    DirectoryCreated {
        /// Created directory
        path: PathBuf,
    },
    /// A missing link directory would be created (dry run).
    DirectoryPlanned {
        /// Directory that would be created
        path: PathBuf,
    },
    /// A new symlink was created.
    LinkCreated {
        /// Link location
        link: PathBuf,
        /// Recorded relative target
        target: PathBuf,
    },
    /// A new symlink would be created (dry run).
    LinkPlanned {
        /// Link location
        link: PathBuf,
        /// Relative target it would record
        target: PathBuf,
    },
    /// The link already exists with the expected target.
    Unchanged {
        /// Link location
        link: PathBuf,
    },
    /// The link exists but points somewhere else. Left untouched.
    Conflict {
        /// Link location
        link: PathBuf,
        /// Target currently recorded in the link
        existing: PathBuf,
        /// Target this entry would record
        expected: PathBuf,
    },
    /// Something that is not a symlink occupies the link path. Left untouched.
    UnknownState {
        /// Occupied path
        link: PathBuf,
    },
    /// A step failed for this item; it was skipped.
    Failed {
        /// Link (or source) path the failure concerns
        path: PathBuf,
        /// Failing step
        stage: Stage,
        /// Error description
        message: String,
    },
    /// The source file could not be stat'ed, so enrichment was skipped.
    SourceUnavailable {
        /// Source path
        source: PathBuf,
        /// Error description
        message: String,
    },
    /// An enricher returned an error; the entry keeps its previous values.
    EnrichmentFailed {
        /// Source path
        source: PathBuf,
        /// Name of the failing enricher
        provider: String,
        /// Error description
        message: String,
    },
    /// An enricher replaced the entry's display name and/or tags.
    Enriched {
        /// Source path
        source: PathBuf,
        /// Name of the enricher that answered
        provider: String,
        /// New display name, if replaced
        display_name: Option<String>,
        /// New tags, if replaced
        tags: Option<Vec<String>>,
    },
}

impl Event {
    /// Severity used for filtering and styling.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Unchanged { .. } => Severity::Debug,
            Self::DirectoryCreated { .. }
            | Self::DirectoryPlanned { .. }
            | Self::LinkCreated { .. }
            | Self::LinkPlanned { .. }
            | Self::Enriched { .. } => Severity::Info,
            Self::Conflict { .. }
            | Self::UnknownState { .. }
            | Self::SourceUnavailable { .. }
            | Self::EnrichmentFailed { .. } => Severity::Warning,
            Self::Failed { .. } => Severity::Error,
        }
    }

    /// Whether this event reports an existing entry blocking a link.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::UnknownState { .. })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryCreated { path } => write!(f, "Created directory {}", path.display()),
            Self::DirectoryPlanned { path } => {
                write!(f, "Would create directory {}", path.display())
            }
            Self::LinkCreated { link, target } => {
                write!(f, "Linked {} => {}", link.display(), target.display())
            }
            Self::LinkPlanned { link, target } => {
                write!(f, "Would link {} => {}", link.display(), target.display())
            }
            Self::Unchanged { link } => write!(f, "Up to date {}", link.display()),
            Self::Conflict {
                link,
                existing,
                expected,
            } => write!(
                f,
                "Conflict: {} already points to {} (expected {})",
                link.display(),
                existing.display(),
                expected.display()
            ),
            Self::UnknownState { link } => write!(
                f,
                "Conflict: {} already exists and is not a symlink",
                link.display()
            ),
            Self::Failed {
                path,
                stage,
                message,
            } => write!(f, "Failed to {stage} for {}: {message}", path.display()),
            Self::SourceUnavailable { source, message } => write!(
                f,
                "Can't stat {}, linking without enrichment: {message}",
                source.display()
            ),
            Self::EnrichmentFailed {
                source,
                provider,
                message,
            } => write!(
                f,
                "[{provider}] enrichment failed for {}: {message}",
                source.display()
            ),
            Self::Enriched {
                source,
                provider,
                display_name,
                tags,
            } => {
                write!(f, "[{provider}] enriched {}", source.display())?;
                if let Some(name) = display_name {
                    write!(f, " name={name}")?;
                }
                if let Some(tags) = tags {
                    write!(f, " tags=[{}]", tags.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// Receiver of reconciliation events.
pub trait Sink {
    /// Handles one event.
    fn report(&mut self, event: Event);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn report(&mut self, event: Event) {
        (**self).report(event);
    }
}

/// Writes events as styled lines, filtered by verbosity.
pub struct ConsoleSink<W: Write> {
    /// Destination for formatted lines
    writer: W,
    /// Minimum level shown
    verbosity: Verbosity,
}

impl ConsoleSink<std::io::Stderr> {
    /// Console sink on standard error.
    #[must_use]
    pub fn stderr(verbosity: Verbosity) -> Self {
        Self::new(std::io::stderr(), verbosity)
    }
}

impl<W: Write> ConsoleSink<W> {
    /// Console sink writing to `writer`.
    pub const fn new(writer: W, verbosity: Verbosity) -> Self {
        Self { writer, verbosity }
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn shows(&self, severity: Severity) -> bool {
        match self.verbosity {
            Verbosity::Quiet => severity >= Severity::Warning,
            Verbosity::Normal => severity >= Severity::Info,
            Verbosity::Verbose => true,
        }
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn report(&mut self, event: Event) {
        let severity = event.severity();
        if !self.shows(severity) {
            return;
        }
        let line = event.to_string();
        let styled = match severity {
            Severity::Debug => line.dimmed(),
            Severity::Info => line.green(),
            Severity::Warning => line.yellow().bold(),
            Severity::Error => line.red().bold(),
        };
        // A closed console must not abort reconciliation
        let _ = writeln!(self.writer, "{styled}");
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Events in reporting order
    pub events: Vec<Event>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events that indicate a conflict.
    pub fn conflicts(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_conflict())
    }

    /// Events at warning severity or above.
    pub fn problems(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|e| e.severity() >= Severity::Warning)
    }
}

impl Sink for MemorySink {
    fn report(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Counters over one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Links created
    pub created: usize,
    /// Links that a dry run would create
    pub planned: usize,
    /// Links already correct
    pub unchanged: usize,
    /// Links blocked by an existing entry
    pub conflicts: usize,
    /// Items skipped because a step failed
    pub failed: usize,
    /// Directories created (or planned, in a dry run)
    pub directories: usize,
    /// Entries rewritten by enrichment
    pub enriched: usize,
    /// Enrichment warnings
    pub enrichment_warnings: usize,
}

impl Summary {
    /// Updates the counters for `event`.
    pub fn record(&mut self, event: &Event) {
        match event {
            Event::DirectoryCreated { .. } | Event::DirectoryPlanned { .. } => {
                self.directories += 1;
            }
            Event::LinkCreated { .. } => self.created += 1,
            Event::LinkPlanned { .. } => self.planned += 1,
            Event::Unchanged { .. } => self.unchanged += 1,
            Event::Conflict { .. } | Event::UnknownState { .. } => self.conflicts += 1,
            Event::Failed { .. } => self.failed += 1,
            Event::SourceUnavailable { .. } | Event::EnrichmentFailed { .. } => {
                self.enrichment_warnings += 1;
            }
            Event::Enriched { .. } => self.enriched += 1,
        }
    }

    /// Whether any conflict or failure was recorded.
    #[must_use]
    pub const fn has_problems(&self) -> bool {
        self.conflicts > 0 || self.failed > 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.planned > 0 {
            write!(f, "{} to link", self.planned)?;
        } else {
            write!(f, "{} linked", self.created)?;
        }
        write!(
            f,
            ", {} up to date, {} conflicts, {} failed",
            self.unchanged, self.conflicts, self.failed
        )
    }
}
