//! `[[name]]` link extraction.
//!
//! # Invariants
//! - The first link on a line wins.
//! - Link names are returned as written, without trimming.

use crate::parse::header::Header;
use once_cell::sync::Lazy;
use regex::Regex;

static LINK_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(.+?)\]\]").expect("valid link name regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\[\[.+?\]\])").expect("valid link regex"));

/// Returns capture group 1 of the first match of `pattern` in `text`.
pub fn extract_text(text: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Returns the target name of the first `[[name]]` link in `line`.
pub fn extract_reference_from_line(line: &str) -> Option<String> {
    extract_text(line, &LINK_NAME_RE)
}

/// Finds the first header line starting with `destination_type` and returns
/// its first link, brackets included.
///
/// Lets a header carry its destination on a line other than the first.
/// The inbox classifier only looks at the first line and does not call this.
pub fn get_destination(header: &Header, destination_type: &str) -> Option<String> {
    header
        .lines()
        .iter()
        .find(|line| line.starts_with(destination_type))
        .and_then(|line| extract_text(line, &LINK_RE))
}

/// Formats `name` as an index line (`[[name]]` plus newline).
pub fn link_line(name: &str) -> String {
    format!("[[{name}]]\n")
}

#[cfg(test)]
mod tests {
    use super::{extract_reference_from_line, extract_text, get_destination, link_line};
    use crate::parse::header::Header;
    use regex::Regex;

    #[test]
    fn extracts_first_link_name() {
        assert_eq!(
            extract_reference_from_line("box [[Work]]").as_deref(),
            Some("Work")
        );
        assert_eq!(
            extract_reference_from_line("notebook [[A b]] and [[C]]").as_deref(),
            Some("A b")
        );
    }

    #[test]
    fn missing_or_empty_link_is_none() {
        assert_eq!(extract_reference_from_line("box Work"), None);
        assert_eq!(extract_reference_from_line("box [[]]"), None);
        assert_eq!(extract_reference_from_line("box [Work]"), None);
        assert_eq!(extract_reference_from_line("box [[Work"), None);
    }

    #[test]
    fn extract_text_uses_first_group() {
        let pattern = Regex::new(r"due: (\d{4}-\d{2}-\d{2})").unwrap();
        assert_eq!(
            extract_text("due: 2024-01-31", &pattern).as_deref(),
            Some("2024-01-31")
        );
        assert_eq!(extract_text("no date", &pattern), None);
    }

    #[test]
    fn get_destination_scans_all_header_lines() {
        let header = Header::new(vec![
            "title: Weekly plan".to_string(),
            "notebook [[Planning]]".to_string(),
            "notebook [[Other]]".to_string(),
        ]);
        assert_eq!(
            get_destination(&header, "notebook").as_deref(),
            Some("[[Planning]]")
        );
        assert_eq!(get_destination(&header, "box"), None);
    }

    #[test]
    fn link_line_wraps_name() {
        assert_eq!(link_line("Box-Foo"), "[[Box-Foo]]\n");
    }
}
