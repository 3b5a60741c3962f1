//! Inbox scan and item classification.
//!
//! # Responsibility
//! - Enumerate the regular files directly inside the inbox.
//! - Classify each one as box, notebook, note or ignored from its header.
//! - Own the classified sets consumed by filing and index writing.
//!
//! # Invariants
//! - A missing inbox directory aborts before anything is touched.
//! - Only the first header line is interpreted.
//! - Ignored files are never moved and never produce index entries.
//! - Link names never address a path outside their destination directory.
//! - When two files of one kind share a stem, the later one is kept and the
//!   earlier one is reported as ignored (`Shadowed`).

pub mod filer;
pub mod refs;

use crate::model::item::{item_name, sorted_entries, BoxItem, ItemReference, Note, Notebook};
use crate::parse::header::{read_header, Header};
use crate::parse::link::extract_reference_from_line;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub use filer::FilerError;

/// Stem prefix that marks a headerless file as a box.
pub const BOX_NAME_PREFIX: &str = "Box";
/// Leading token of a header line that files the item as a notebook.
pub const BOX_TOKEN: &str = "box";
/// Leading token of a header line that files the item as a note.
pub const NOTEBOOK_TOKEN: &str = "notebook";

/// Errors from scanning the inbox.
#[derive(Debug)]
pub enum InboxError {
    /// Configured inbox directory does not exist.
    MissingInbox(PathBuf),
    /// Listing the inbox or reading a file failed.
    Io { path: PathBuf, source: io::Error },
}

impl Display for InboxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingInbox(path) => {
                write!(f, "the directory {} does not exist", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for InboxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingInbox(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Why a file was left in the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No header and the name does not start with `Box`.
    HeaderlessNotBox,
    /// Header block present but holds no lines.
    EmptyHeader,
    /// First header line has no usable `[[name]]` link (an unfilled template,
    /// or a name that contains a path separator or is `.`/`..`).
    InvalidReference,
    /// First header line starts with neither `box` nor `notebook`.
    UnknownKind,
    /// A later inbox file of the same kind has the same stem.
    Shadowed,
}

impl IgnoreReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HeaderlessNotBox => "headerless_not_box",
            Self::EmptyHeader => "empty_header",
            Self::InvalidReference => "invalid_reference",
            Self::UnknownKind => "unknown_kind",
            Self::Shadowed => "shadowed",
        }
    }
}

/// Outcome of classifying one inbox file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Box(BoxItem),
    Notebook(Notebook),
    Note(Note),
    Ignored(IgnoreReason),
}

impl Classification {
    /// Short progress label, e.g. `added to Boxes`.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Box(_) => "added to Boxes",
            Self::Notebook(_) => "added to Notebooks",
            Self::Note(_) => "added to Notes",
            Self::Ignored(_) => "ignored",
        }
    }
}

/// Inbox file that classification chose to leave alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredItem {
    pub file_path: PathBuf,
    pub reason: IgnoreReason,
}

/// Decides what `file_path` is from its optional header.
pub fn classify(file_path: &Path, header: Option<&Header>) -> Classification {
    let Some(header) = header else {
        if item_name(file_path).starts_with(BOX_NAME_PREFIX) {
            return Classification::Box(BoxItem::new(file_path));
        }
        return Classification::Ignored(IgnoreReason::HeaderlessNotBox);
    };

    let Some(reference_line) = header.first_line() else {
        return Classification::Ignored(IgnoreReason::EmptyHeader);
    };
    let Some(reference_name) = extract_reference_from_line(reference_line)
        .filter(|name| is_plain_item_name(name))
    else {
        return Classification::Ignored(IgnoreReason::InvalidReference);
    };

    if reference_line.starts_with(BOX_TOKEN) {
        Classification::Notebook(Notebook::new(reference_name, file_path))
    } else if reference_line.starts_with(NOTEBOOK_TOKEN) {
        Classification::Note(Note::new(reference_name, file_path))
    } else {
        Classification::Ignored(IgnoreReason::UnknownKind)
    }
}

/// Whether `name` can be joined onto a destination directory as one plain
/// path component.
pub fn is_plain_item_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Classified content of one inbox scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inbox {
    pub items: ItemReference,
    pub ignored: Vec<IgnoredItem>,
}

impl Inbox {
    /// Scans `inbox_path` without progress reporting.
    pub fn process_inbox(inbox_path: &Path) -> Result<Self, InboxError> {
        Self::process_inbox_with(inbox_path, |_, _| {})
    }

    /// Scans `inbox_path`, calling `on_item` once per regular file.
    ///
    /// Files are visited in path order. Subdirectories are skipped.
    ///
    /// # Errors
    /// - `InboxError::MissingInbox` when the directory does not exist.
    /// - `InboxError::Io` when listing or reading fails.
    pub fn process_inbox_with<F>(inbox_path: &Path, mut on_item: F) -> Result<Self, InboxError>
    where
        F: FnMut(&Path, &Classification),
    {
        let started_at = Instant::now();
        info!(
            "event=inbox_scan module=inbox status=start path={}",
            inbox_path.display()
        );

        if !inbox_path.exists() {
            error!(
                "event=inbox_scan module=inbox status=error error_code=missing_inbox path={}",
                inbox_path.display()
            );
            return Err(InboxError::MissingInbox(inbox_path.to_path_buf()));
        }

        let entries = sorted_entries(inbox_path).map_err(|source| InboxError::Io {
            path: inbox_path.to_path_buf(),
            source,
        })?;

        let mut inbox = Self::default();
        for file_path in entries.into_iter().filter(|path| path.is_file()) {
            let header = read_header(&file_path).map_err(|source| InboxError::Io {
                path: file_path.clone(),
                source,
            })?;
            let classification = classify(&file_path, header.as_ref());
            on_item(&file_path, &classification);
            if let Some(shadowed) = inbox.insert(file_path, classification) {
                let outcome = Classification::Ignored(IgnoreReason::Shadowed);
                on_item(&shadowed, &outcome);
                inbox.ignored.push(IgnoredItem {
                    file_path: shadowed,
                    reason: IgnoreReason::Shadowed,
                });
            }
        }

        info!(
            "event=inbox_scan module=inbox status=ok duration_ms={} boxes={} notebooks={} notes={} ignored={}",
            started_at.elapsed().as_millis(),
            inbox.items.boxes.len(),
            inbox.items.notebooks.len(),
            inbox.items.notes.len(),
            inbox.ignored.len()
        );
        Ok(inbox)
    }

    /// Adds one classified file. Returns the path of an earlier file of the
    /// same kind and stem that this one replaced.
    fn insert(&mut self, file_path: PathBuf, classification: Classification) -> Option<PathBuf> {
        let name = item_name(&file_path);
        let kept_path = file_path.display().to_string();
        let replaced = match classification {
            Classification::Box(item) => {
                debug!("event=item_classified module=inbox kind=box name={name}");
                self.items.boxes.insert(name.clone(), item).map(|old| old.file_path)
            }
            Classification::Notebook(item) => {
                debug!(
                    "event=item_classified module=inbox kind=notebook name={name} box={}",
                    item.box_name
                );
                self.items
                    .notebooks
                    .insert(name.clone(), item)
                    .map(|old| old.file_path)
            }
            Classification::Note(item) => {
                debug!(
                    "event=item_classified module=inbox kind=note name={name} notebook={}",
                    item.notebook_name
                );
                self.items.notes.insert(name.clone(), item).map(|old| old.file_path)
            }
            Classification::Ignored(reason) => {
                debug!(
                    "event=item_classified module=inbox kind=ignored name={name} reason={}",
                    reason.as_str()
                );
                self.ignored.push(IgnoredItem { file_path, reason });
                None
            }
        };
        if let Some(old_path) = &replaced {
            warn!(
                "event=item_shadowed module=inbox status=skip name={name} kept_path={} shadowed_path={}",
                kept_path,
                old_path.display()
            );
        }
        replaced
    }
}
