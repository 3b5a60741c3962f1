//! One complete filer run.
//!
//! # Responsibility
//! - Chain classification, filing, index writing and the weekly digest.
//! - Surface the first fatal error with the offending path.
//!
//! # Invariants
//! - Steps run strictly in order; a failing step stops the run.
//! - Nothing is rolled back. Files moved before a failure stay moved.
//! - Not safe against a second process working on the same tree.

use crate::config::{ConfigError, FilerConfig};
use crate::digest::weekly::{build_weekly_digest, DigestError};
use crate::inbox::{Classification, FilerError, IgnoredItem, Inbox, InboxError};
use crate::model::item::ItemReference;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;
use std::time::Instant;

/// Fatal error of a filer run.
#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigError),
    Inbox(InboxError),
    Filer(FilerError),
    /// Appending backlinks failed.
    Refs(io::Error),
    Digest(DigestError),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Inbox(err) => write!(f, "{err}"),
            Self::Filer(err) => write!(f, "{err}"),
            Self::Refs(err) => write!(f, "failed to write index files: {err}"),
            Self::Digest(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Inbox(err) => Some(err),
            Self::Filer(err) => Some(err),
            Self::Refs(err) => Some(err),
            Self::Digest(err) => Some(err),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<InboxError> for PipelineError {
    fn from(value: InboxError) -> Self {
        Self::Inbox(value)
    }
}

impl From<FilerError> for PipelineError {
    fn from(value: FilerError) -> Self {
        Self::Filer(value)
    }
}

impl From<DigestError> for PipelineError {
    fn from(value: DigestError) -> Self {
        Self::Digest(value)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Items filed in this run, with their new locations.
    pub filed: ItemReference,
    /// Files left in the inbox.
    pub ignored: Vec<IgnoredItem>,
    /// Week buckets in the rewritten digest.
    pub digest_weeks: usize,
}

/// Runs the whole pipeline without progress reporting.
pub fn run(config: &FilerConfig) -> Result<RunReport, PipelineError> {
    run_with_progress(config, |_, _| {})
}

/// Runs the whole pipeline, reporting each inbox file to `on_item`.
///
/// # Errors
/// - Returns the first failing step's error; later steps do not run.
pub fn run_with_progress<F>(config: &FilerConfig, on_item: F) -> Result<RunReport, PipelineError>
where
    F: FnMut(&Path, &Classification),
{
    let started_at = Instant::now();
    let result = run_steps(config, on_item);
    match &result {
        Ok(report) => info!(
            "event=run module=pipeline status=ok duration_ms={} boxes={} notebooks={} notes={} ignored={} weeks={}",
            started_at.elapsed().as_millis(),
            report.filed.boxes.len(),
            report.filed.notebooks.len(),
            report.filed.notes.len(),
            report.ignored.len(),
            report.digest_weeks
        ),
        Err(err) => error!(
            "event=run module=pipeline status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn run_steps<F>(config: &FilerConfig, on_item: F) -> Result<RunReport, PipelineError>
where
    F: FnMut(&Path, &Classification),
{
    let first_day = config.week_start()?;

    let mut inbox = Inbox::process_inbox_with(&config.inbox_path, on_item)?;
    inbox.move_according_to_reference(config)?;
    inbox.write_refs(config).map_err(PipelineError::Refs)?;
    let digest_weeks = build_weekly_digest(config, first_day)?;

    Ok(RunReport {
        filed: inbox.items,
        ignored: inbox.ignored,
        digest_weeks,
    })
}
