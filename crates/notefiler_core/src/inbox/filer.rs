//! Moves classified inbox items to their destinations.
//!
//! # Responsibility
//! - File boxes into `boxes_path`, notebooks into `notebooks_path` and notes
//!   into `notebooks_path/<notebook>/`.
//!
//! # Invariants
//! - Order is boxes, then notebooks, then notes.
//! - An existing note destination aborts the run before that note moves.
//!   Items moved earlier in the run stay where they are.
//! - Box and notebook destinations are only checked with `strict_collisions`.

use super::Inbox;
use crate::config::FilerConfig;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from filing inbox items.
#[derive(Debug)]
pub enum FilerError {
    /// Destination note already exists.
    NoteCollision { path: PathBuf },
    /// Destination box already exists (`strict_collisions` only).
    BoxCollision { path: PathBuf },
    /// Destination notebook already exists (`strict_collisions` only).
    NotebookCollision { path: PathBuf },
    /// Creating a directory or moving a file failed.
    Io { path: PathBuf, source: io::Error },
}

impl Display for FilerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteCollision { path } => write!(f, "note {} already exists", path.display()),
            Self::BoxCollision { path } => write!(f, "box {} already exists", path.display()),
            Self::NotebookCollision { path } => {
                write!(f, "notebook {} already exists", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "failed to file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for FilerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Inbox {
    /// Moves every classified item to its destination directory.
    ///
    /// On success each item's `file_path` points at its new location.
    ///
    /// # Errors
    /// - `FilerError::NoteCollision` when a note destination exists.
    /// - `FilerError::BoxCollision` / `NotebookCollision` when
    ///   `config.strict_collisions` is set and a destination exists.
    /// - `FilerError::Io` when a directory cannot be created or a move fails.
    pub fn move_according_to_reference(&mut self, config: &FilerConfig) -> Result<(), FilerError> {
        self.move_boxes(config)?;
        self.move_notebooks(config)?;
        self.move_notes(config)
    }

    fn move_boxes(&mut self, config: &FilerConfig) -> Result<(), FilerError> {
        ensure_dir(&config.boxes_path)?;
        for item in self.items.boxes.values_mut() {
            let destination = destination_in(&config.boxes_path, &item.file_path);
            if config.strict_collisions && destination.exists() {
                log_collision("box", &destination);
                return Err(FilerError::BoxCollision { path: destination });
            }
            move_file(&item.file_path, &destination)?;
            log_moved("box", &item.file_path, &destination);
            item.file_path = destination;
        }
        Ok(())
    }

    fn move_notebooks(&mut self, config: &FilerConfig) -> Result<(), FilerError> {
        ensure_dir(&config.notebooks_path)?;
        for item in self.items.notebooks.values_mut() {
            let destination = destination_in(&config.notebooks_path, &item.file_path);
            if config.strict_collisions && destination.exists() {
                log_collision("notebook", &destination);
                return Err(FilerError::NotebookCollision { path: destination });
            }
            move_file(&item.file_path, &destination)?;
            log_moved("notebook", &item.file_path, &destination);
            item.file_path = destination;
        }
        Ok(())
    }

    fn move_notes(&mut self, config: &FilerConfig) -> Result<(), FilerError> {
        for item in self.items.notes.values_mut() {
            let notebook_dir = config.notebooks_path.join(&item.notebook_name);
            ensure_dir(&notebook_dir)?;

            let destination = destination_in(&notebook_dir, &item.file_path);
            if destination.exists() {
                log_collision("note", &destination);
                return Err(FilerError::NoteCollision { path: destination });
            }
            move_file(&item.file_path, &destination)?;
            log_moved("note", &item.file_path, &destination);
            item.file_path = destination;
        }
        Ok(())
    }
}

fn destination_in(dir: &Path, source: &Path) -> PathBuf {
    match source.file_name() {
        Some(file_name) => dir.join(file_name),
        None => dir.to_path_buf(),
    }
}

fn ensure_dir(dir: &Path) -> Result<(), FilerError> {
    fs::create_dir_all(dir).map_err(|source| FilerError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Renames `source` to `destination`, copying then removing when a plain
/// rename is refused (e.g. across filesystems).
fn move_file(source: &Path, destination: &Path) -> Result<(), FilerError> {
    let io_error = |source_err| FilerError::Io {
        path: source.to_path_buf(),
        source: source_err,
    };
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if fs::copy(source, destination).is_err() {
                return Err(io_error(rename_err));
            }
            fs::remove_file(source).map_err(io_error)
        }
    }
}

fn log_moved(kind: &str, from: &Path, to: &Path) {
    info!(
        "event=item_moved module=filer status=ok kind={kind} from={} to={}",
        from.display(),
        to.display()
    );
}

fn log_collision(kind: &str, path: &Path) {
    error!(
        "event=item_moved module=filer status=error error_code=collision kind={kind} path={}",
        path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::{destination_in, move_file};
    use std::fs;
    use std::path::Path;

    #[test]
    fn destination_keeps_file_name_with_extension() {
        assert_eq!(
            destination_in(Path::new("/vault/Boxes"), Path::new("/inbox/Box-Foo.md")),
            Path::new("/vault/Boxes/Box-Foo.md")
        );
    }

    #[test]
    fn move_file_relocates_contents() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.md");
        let destination = dir.path().join("b.md");
        fs::write(&source, "body").unwrap();

        move_file(&source, &destination).unwrap();
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "body");
    }

    #[test]
    fn move_file_reports_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = move_file(&dir.path().join("gone.md"), &dir.path().join("x.md")).unwrap_err();
        assert!(err.to_string().contains("gone.md"));
    }
}
