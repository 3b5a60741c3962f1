//! Core logic for notefiler.
//! Files a flat inbox of notes into Boxes → Notebooks → Notes and keeps the
//! generated index files and weekly digest up to date.

pub mod config;
pub mod digest;
pub mod inbox;
pub mod logging;
pub mod model;
pub mod parse;
pub mod pipeline;

pub use config::{ConfigError, FilerConfig, DEFAULT_CONFIG_FILE};
pub use digest::weekly::{
    build_weekly_digest, render_digest, start_of_week, DigestError, DigestNote, LastModifiedNotes,
    WeekBucket,
};
pub use inbox::{classify, Classification, FilerError, IgnoreReason, IgnoredItem, Inbox, InboxError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{BoxItem, ItemReference, Note, Notebook};
pub use parse::header::{parse_header, read_header, Header};
pub use parse::link::{extract_reference_from_line, extract_text, get_destination};
pub use pipeline::{run, run_with_progress, PipelineError, RunReport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
