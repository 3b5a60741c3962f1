//! Digests derived from the filed notebooks tree.
//!
//! # Responsibility
//! - Rebuild "recently modified" listings from a full rescan on every run.
//!
//! # See also
//! - `weekly` for the week-bucketed digest file.

pub mod weekly;
