//! Text-level parsing of inbox files.
//!
//! # Responsibility
//! - Extract the delimiter-bounded header block at the top of a file.
//! - Pull `[[name]]` link targets out of header lines.

pub mod header;
pub mod link;
