//! Week-bucketed "last modified notes" digest.
//!
//! # Responsibility
//! - Order filed notes by modification time and group them into 7-day
//!   windows anchored on a configurable first day of week.
//! - Rewrite the digest file from scratch.
//!
//! # Invariants
//! - Notes are ordered by local mtime descending, then by name ascending.
//! - Buckets appear in the order their first note appears; within a bucket
//!   notes keep the global order.
//! - Week numbers count down from the bucket count to 1.
//! - The same tree always renders byte-identical output.

use crate::config::FilerConfig;
use crate::model::item::{ItemReference, Note};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Weekday};
use log::{error, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter, Write as _};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors from building the weekly digest.
#[derive(Debug)]
pub enum DigestError {
    Io { path: PathBuf, source: io::Error },
}

impl Display for DigestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "weekly digest failed on `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for DigestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Note plus the local modification time used for ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestNote {
    pub name: String,
    pub modified: DateTime<Local>,
}

/// One 7-day window of the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub notes: Vec<DigestNote>,
}

impl WeekBucket {
    fn new(start: NaiveDate) -> Self {
        Self {
            start,
            end: start + Days::new(6),
            notes: Vec::new(),
        }
    }

    /// Canonical bucket key, the start date as `YYYY-MM-DD`.
    pub fn start_key(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_key(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

/// Most recent `first_day` on or before `date`.
pub fn start_of_week(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let day_diff =
        (date.weekday().num_days_from_monday() + 7 - first_day.num_days_from_monday()) % 7;
    date - Days::new(u64::from(day_diff))
}

/// Filed notes sorted most recently modified first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastModifiedNotes {
    notes: Vec<DigestNote>,
}

impl LastModifiedNotes {
    /// Reads the modification time of every note and sorts them.
    ///
    /// # Errors
    /// - `DigestError::Io` when a note's metadata cannot be read.
    pub fn new<'a>(notes: impl IntoIterator<Item = &'a Note>) -> Result<Self, DigestError> {
        let mut entries = Vec::new();
        for note in notes {
            let modified = fs::metadata(&note.file_path)
                .and_then(|meta| meta.modified())
                .map_err(|source| DigestError::Io {
                    path: note.file_path.clone(),
                    source,
                })?;
            entries.push(DigestNote {
                name: note.name(),
                modified: DateTime::<Local>::from(modified),
            });
        }
        Ok(Self::from_entries(entries))
    }

    /// Sorts pre-read entries.
    pub fn from_entries(mut notes: Vec<DigestNote>) -> Self {
        notes.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| a.name.cmp(&b.name))
        });
        Self { notes }
    }

    pub fn notes(&self) -> &[DigestNote] {
        &self.notes
    }

    /// Groups the sorted notes into week buckets in first-seen order.
    pub fn group_by_week(&self, first_day: Weekday) -> Vec<WeekBucket> {
        let mut buckets: Vec<WeekBucket> = Vec::new();
        let mut by_start: HashMap<NaiveDate, usize> = HashMap::new();
        for note in &self.notes {
            let start = start_of_week(note.modified.date_naive(), first_day);
            let index = *by_start.entry(start).or_insert_with(|| {
                buckets.push(WeekBucket::new(start));
                buckets.len() - 1
            });
            buckets[index].notes.push(note.clone());
        }
        buckets
    }

    /// Truncates `path` and writes the week-bucketed digest into it.
    ///
    /// Returns the number of week buckets written.
    ///
    /// # Errors
    /// - `DigestError::Io` when the file cannot be written.
    pub fn write_last_modified_notes_by_week(
        &self,
        path: &Path,
        first_day: Weekday,
    ) -> Result<usize, DigestError> {
        let buckets = self.group_by_week(first_day);
        fs::write(path, render_digest(&buckets)).map_err(|source| DigestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(buckets.len())
    }
}

/// Renders buckets as digest text.
///
/// ```text
/// # Week 2: 2024-03-10 - 2024-03-16
/// [[newest]]
///
/// # Week 1: 2024-03-03 - 2024-03-09
/// [[older]]
///
/// ```
pub fn render_digest(buckets: &[WeekBucket]) -> String {
    let mut out = String::new();
    for (position, bucket) in buckets.iter().enumerate() {
        let week_number = buckets.len() - position;
        let _ = writeln!(
            out,
            "# Week {week_number}: {} - {}",
            bucket.start_key(),
            bucket.end_key()
        );
        for note in &bucket.notes {
            let _ = writeln!(out, "[[{}]]", note.name);
        }
        out.push('\n');
    }
    out
}

/// Rescans `config.notebooks_path` and rewrites the digest file.
///
/// Returns the number of week buckets written.
///
/// # Errors
/// - `DigestError::Io` when the tree cannot be scanned or the digest cannot
///   be written.
pub fn build_weekly_digest(config: &FilerConfig, first_day: Weekday) -> Result<usize, DigestError> {
    let started_at = Instant::now();
    info!(
        "event=digest_write module=digest status=start path={}",
        config.last_modified_notes_file.display()
    );

    let result = ItemReference::from_notebooks_path(&config.notebooks_path)
        .map_err(|source| DigestError::Io {
            path: config.notebooks_path.clone(),
            source,
        })
        .and_then(|item_ref| LastModifiedNotes::new(item_ref.notes.values()))
        .and_then(|notes| {
            notes.write_last_modified_notes_by_week(&config.last_modified_notes_file, first_day)
        });

    match &result {
        Ok(weeks) => info!(
            "event=digest_write module=digest status=ok duration_ms={} weeks={}",
            started_at.elapsed().as_millis(),
            weeks
        ),
        Err(err) => error!(
            "event=digest_write module=digest status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{render_digest, start_of_week, DigestNote, LastModifiedNotes, WeekBucket};
    use chrono::{Local, NaiveDate, TimeZone, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn entry(name: &str, y: i32, m: u32, d: u32, h: u32) -> DigestNote {
        DigestNote {
            name: name.to_string(),
            modified: Local
                .with_ymd_and_hms(y, m, d, h, 0, 0)
                .single()
                .expect("unambiguous local time"),
        }
    }

    #[test]
    fn start_of_week_is_inclusive_and_backward() {
        // 2024-03-13 is a Wednesday.
        assert_eq!(start_of_week(date(2024, 3, 13), Weekday::Sun), date(2024, 3, 10));
        assert_eq!(start_of_week(date(2024, 3, 13), Weekday::Mon), date(2024, 3, 11));
        assert_eq!(start_of_week(date(2024, 3, 13), Weekday::Wed), date(2024, 3, 13));
        assert_eq!(start_of_week(date(2024, 3, 13), Weekday::Thu), date(2024, 3, 7));
        assert_eq!(start_of_week(date(2024, 3, 10), Weekday::Sun), date(2024, 3, 10));
    }

    #[test]
    fn sort_is_mtime_desc_then_name() {
        let notes = LastModifiedNotes::from_entries(vec![
            entry("old", 2024, 3, 1, 12),
            entry("b-same", 2024, 3, 5, 12),
            entry("a-same", 2024, 3, 5, 12),
            entry("new", 2024, 3, 9, 12),
        ]);
        let names: Vec<&str> = notes.notes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["new", "a-same", "b-same", "old"]);
    }

    #[test]
    fn monday_anchor_splits_sunday_from_following_monday() {
        let notes = LastModifiedNotes::from_entries(vec![
            entry("sunday", 2024, 3, 10, 12),
            entry("monday", 2024, 3, 11, 12),
        ]);
        let buckets = notes.group_by_week(Weekday::Mon);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].start_key(), "2024-03-11");
        assert_eq!(buckets[1].start_key(), "2024-03-04");
        assert_eq!(buckets[1].end_key(), "2024-03-10");

        let sunday_anchor = notes.group_by_week(Weekday::Sun);
        assert_eq!(sunday_anchor.len(), 1);
        assert_eq!(sunday_anchor[0].notes.len(), 2);
    }

    #[test]
    fn render_numbers_weeks_downward() {
        let buckets = vec![
            WeekBucket {
                start: date(2024, 3, 10),
                end: date(2024, 3, 16),
                notes: vec![entry("a", 2024, 3, 12, 9)],
            },
            WeekBucket {
                start: date(2024, 3, 3),
                end: date(2024, 3, 9),
                notes: vec![entry("b", 2024, 3, 4, 9), entry("c", 2024, 3, 3, 9)],
            },
        ];
        assert_eq!(
            render_digest(&buckets),
            "# Week 2: 2024-03-10 - 2024-03-16\n[[a]]\n\n\
             # Week 1: 2024-03-03 - 2024-03-09\n[[b]]\n[[c]]\n\n"
        );
    }

    #[test]
    fn empty_tree_renders_empty_digest() {
        let notes = LastModifiedNotes::default();
        assert!(notes.group_by_week(Weekday::Sun).is_empty());
        assert_eq!(render_digest(&[]), "");
    }
}
