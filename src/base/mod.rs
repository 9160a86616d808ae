//! Foundation types for the semantic facade.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Host-assigned file identifiers
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`Name`], [`FqName`] - Identifiers and dotted paths
//! - [`ClassId`], [`CallableId`] - Stable declaration identities
//!
//! This module has NO dependencies on other semfacade modules.

mod file_id;
mod names;

pub use file_id::FileId;
pub use names::{CallableId, ClassId, FqName, Name, standard};

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
