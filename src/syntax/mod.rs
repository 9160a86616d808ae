//! Syntax-level handles shared by the semantic layers.
//!
//! - [`ParsedFile`] - a parsed file as seen by one session
//! - [`NodePtr`] - a node of one tree, by kind and range
//! - [`SourceAnchor`] - a declaration, re-locatable in a later tree

pub mod file;
pub mod ptr;

pub use file::{ImportEntry, ParsedFile};
pub use ptr::{AnchorStep, NodePtr, SourceAnchor, find_node_at_offset};
