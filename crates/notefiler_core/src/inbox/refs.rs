//! Backlink index writing for filed items.
//!
//! # Invariants
//! - Index files are opened in append mode and created on demand.
//! - One open/write/close per line, so a failure keeps every line already
//!   written.

use super::Inbox;
use crate::config::FilerConfig;
use crate::parse::link::link_line;
use log::{debug, info};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Extension of per-box and per-notebook index files.
pub const INDEX_EXTENSION: &str = "md";

impl Inbox {
    /// Appends backlinks for every item of this run.
    ///
    /// - boxes → `config.boxes_file`
    /// - notebooks → `<boxes_path>/<box name>.md`
    /// - notes → `<notebooks_path>/<notebook name>.md`
    ///
    /// # Errors
    /// - Returns the first I/O error; lines appended before it stay.
    pub fn write_refs(&self, config: &FilerConfig) -> io::Result<()> {
        for item in self.items.boxes.values() {
            append_link(&config.boxes_file, &item.name())?;
        }
        for item in self.items.notebooks.values() {
            let box_file = index_file(&config.boxes_path, &item.box_name);
            append_link(&box_file, &item.name())?;
        }
        for item in self.items.notes.values() {
            let notebook_file = index_file(&config.notebooks_path, &item.notebook_name);
            append_link(&notebook_file, &item.name())?;
        }

        info!(
            "event=refs_write module=refs status=ok boxes={} notebooks={} notes={}",
            self.items.boxes.len(),
            self.items.notebooks.len(),
            self.items.notes.len()
        );
        Ok(())
    }
}

/// Index file path for the item called `name` inside `dir`.
pub fn index_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{INDEX_EXTENSION}"))
}

/// Appends one `[[name]]` line to `path`.
pub fn append_link(path: &Path, name: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(link_line(name).as_bytes())?;
    debug!(
        "event=link_appended module=refs name={name} file={}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{append_link, index_file};
    use std::fs;
    use std::path::Path;

    #[test]
    fn index_file_uses_md_extension() {
        assert_eq!(
            index_file(Path::new("/vault/Boxes"), "Work"),
            Path::new("/vault/Boxes/Work.md")
        );
    }

    #[test]
    fn append_link_creates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Work.md");
        fs::write(&path, "# Work\n").unwrap();

        append_link(&path, "Plan").unwrap();
        append_link(&path, "Ideas").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Work\n[[Plan]]\n[[Ideas]]\n"
        );

        let fresh = dir.path().join("Fresh.md");
        append_link(&fresh, "One").unwrap();
        assert_eq!(fs::read_to_string(&fresh).unwrap(), "[[One]]\n");
    }
}
