//! Salsa database definition and queries.
//!
//! File texts are inputs; parsing is the only tracked query. Everything
//! semantic is computed per session and never stored here.

use crate::base::FileId;
use crate::parser::{GreenNode, SyntaxError, parse};

// ============================================================================
// INPUTS
// ============================================================================

/// Input: the raw text content of a file.
///
/// Set this explicitly when a file is added or changed.
#[salsa::input]
pub struct FileText {
    pub file: FileId,
    #[return_ref]
    pub text: String,
}

// ============================================================================
// DATABASE
// ============================================================================

/// The root Salsa database.
#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for RootDatabase {
    fn salsa_event(&self, _event: &dyn Fn() -> salsa::Event) {}
}

impl RootDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// PARSE RESULT
// ============================================================================

/// Green tree plus the errors collected while building it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedText {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl ParsedText {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ============================================================================
// TRACKED QUERIES
// ============================================================================

/// Parse a file.
///
/// Memoized; re-run only when the `FileText` input changes.
#[salsa::tracked]
pub fn parse_file(db: &dyn salsa::Database, file_text: FileText) -> ParsedText {
    let parse = parse(file_text.text(db));
    ParsedText {
        green: parse.green,
        errors: parse.errors,
    }
}
