//! Box/Notebook/Note records and run-scoped lookup tables.
//!
//! # Responsibility
//! - Describe one classified file per item kind.
//! - Build name → item tables from the filed notebooks tree.
//!
//! # Invariants
//! - Table keys are file stems; a later insert with the same key replaces the
//!   earlier one.
//! - Parent references are never dereferenced eagerly. Resolution goes through
//!   `ItemReference` and may find nothing.

use log::warn;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Returns the file stem of `path` as an owned string.
///
/// Used both as lookup key and as the link text written to index files.
pub fn item_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Top-level container item.
///
/// Named `BoxItem` so it never shadows `std::boxed::Box`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxItem {
    /// Current location of the box file.
    pub file_path: PathBuf,
}

impl BoxItem {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn name(&self) -> String {
        item_name(&self.file_path)
    }
}

/// Mid-level item owned by one box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notebook {
    /// Name of the owning box (the `[[...]]` target of its header).
    pub box_name: String,
    /// Current location of the notebook file.
    pub file_path: PathBuf,
}

impl Notebook {
    pub fn new(box_name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            box_name: box_name.into(),
            file_path: file_path.into(),
        }
    }

    pub fn name(&self) -> String {
        item_name(&self.file_path)
    }
}

/// Leaf item owned by one notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Name of the owning notebook.
    pub notebook_name: String,
    /// Current location of the note file.
    pub file_path: PathBuf,
}

impl Note {
    pub fn new(notebook_name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            notebook_name: notebook_name.into(),
            file_path: file_path.into(),
        }
    }

    pub fn name(&self) -> String {
        item_name(&self.file_path)
    }
}

/// Name-keyed lookup tables for one scan.
///
/// `BTreeMap` keeps iteration in name order so moves, index appends and logs
/// are reproducible across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemReference {
    pub boxes: BTreeMap<String, BoxItem>,
    pub notebooks: BTreeMap<String, Notebook>,
    pub notes: BTreeMap<String, Note>,
}

impl ItemReference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no item of any kind was collected.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.notebooks.is_empty() && self.notes.is_empty()
    }

    /// Notebooks in this table that name `box_name` as their owner.
    pub fn notebooks_in_box<'a>(
        &'a self,
        box_name: &'a str,
    ) -> impl Iterator<Item = &'a Notebook> + 'a {
        self.notebooks
            .values()
            .filter(move |notebook| notebook.box_name == box_name)
    }

    /// Notes in this table that name `notebook_name` as their owner.
    pub fn notes_in_notebook<'a>(
        &'a self,
        notebook_name: &'a str,
    ) -> impl Iterator<Item = &'a Note> + 'a {
        self.notes
            .values()
            .filter(move |note| note.notebook_name == notebook_name)
    }

    /// Collects every filed note below `notebooks_path`.
    ///
    /// Each direct subdirectory is one notebook; each regular file directly
    /// inside it is one note. When two notebooks hold a note with the same
    /// stem, the one in the later notebook (path order) is kept. Loose files
    /// at the top level (the notebook index files) and nested directories are
    /// skipped.
    ///
    /// # Errors
    /// - Returns the underlying I/O error when a directory cannot be listed.
    pub fn from_notebooks_path(notebooks_path: &Path) -> io::Result<Self> {
        let mut item_ref = Self::new();
        for notebook_dir in sorted_entries(notebooks_path)? {
            if !notebook_dir.is_dir() {
                continue;
            }
            let notebook_name = item_name(&notebook_dir);
            for note_file in sorted_entries(&notebook_dir)? {
                if !note_file.is_file() {
                    continue;
                }
                let note_name = item_name(&note_file);
                let note = Note::new(notebook_name.clone(), note_file);
                if let Some(shadowed) = item_ref.notes.insert(note_name.clone(), note) {
                    warn!(
                        "event=note_name_shadowed module=model status=skip name={} shadowed_path={}",
                        note_name,
                        shadowed.file_path.display()
                    );
                }
            }
        }
        Ok(item_ref)
    }
}

/// Lists the entries of `dir` sorted by path.
pub(crate) fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<io::Result<Vec<_>>>()?;
    paths.sort();
    Ok(paths)
}
