//! Header block parser.
//!
//! # Responsibility
//! - Detect and return the metadata lines between two `---` delimiter lines
//!   at the start of a file.
//!
//! # Invariants
//! - The opening delimiter must be the whole first line, followed by a line
//!   break.
//! - The first later line that starts with the delimiter closes the header and
//!   is not part of it.
//! - A header that is never closed is reported as absent.

use std::fs;
use std::io;
use std::path::Path;

/// Three-character marker that opens and closes a header block.
pub const HEADER_DELIMITER: &str = "---";

/// Ordered header lines with trailing whitespace stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    lines: Vec<String>,
}

impl Header {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The line that decides classification, if the block is not empty.
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Reads `path` and parses its header block.
///
/// Invalid UTF-8 is replaced rather than rejected, so binary attachments in
/// the inbox still go through the headerless rules.
///
/// # Errors
/// - Returns the I/O error when the file cannot be read.
pub fn read_header(path: &Path) -> io::Result<Option<Header>> {
    let bytes = fs::read(path)?;
    Ok(parse_header(&String::from_utf8_lossy(&bytes)))
}

/// Parses a header block from in-memory text.
pub fn parse_header(text: &str) -> Option<Header> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut lines = Vec::new();
    for line in rest.split_inclusive('\n') {
        if line.starts_with(HEADER_DELIMITER) {
            return Some(Header::new(lines));
        }
        lines.push(line.trim_end().to_string());
    }
    None
}
