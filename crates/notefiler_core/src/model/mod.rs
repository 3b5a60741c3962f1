//! Domain model for the Box → Notebook → Note hierarchy.
//!
//! # Responsibility
//! - Define the item records produced by inbox and notebook-tree scans.
//! - Keep parent links as plain names resolved through lookup tables.
//!
//! # Invariants
//! - Every `Notebook` names exactly one owning box.
//! - Every `Note` names exactly one owning notebook.
//! - Items are rebuilt from directory scans on every run; nothing here is
//!   persisted.

pub mod item;
