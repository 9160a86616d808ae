//! High-level IR (HIR): the session-bound semantic model.
//!
//! Everything here hangs off an [`AnalysisSession`]. Symbols, types and
//! scopes are cheap handles stamped with the session's [`ValidityToken`];
//! their accessors take the session and fault when the token does not match
//! or was invalidated.
//!
//! ## Layers
//!
//! ```text
//! db.rs        salsa inputs + parse_file          (incremental parsing)
//!     │
//!     ▼
//! session.rs   AnalysisSession                    (snapshot + oracle cache)
//!     │
//!     ├── symbols/   Symbol, SymbolKind          (source / metadata backed)
//!     ├── types.rs   KType
//!     ├── scope.rs   Scope
//!     ├── members.rs member, static, file and package scopes
//!     └── pointer.rs SymbolPointer               (cross-session identity)
//! ```

mod db;
mod members;
mod pointer;
mod scope;
mod session;
mod symbols;
mod token;
mod types;

pub use db::{FileText, ParsedText, RootDatabase, parse_file};
pub use pointer::{POINTER_FORMAT_VERSION, PointerError, StoredPointer, SymbolPointer};
pub use scope::{Scope, ScopeKind};
pub use session::{
    AnalysisSession, SessionError, SessionParts, is_non_local_declaration, non_local_container,
};
pub use symbols::{
    Symbol, SymbolKind, SymbolLocation, kind_for_node, kind_for_record, synthetic_java_properties,
};
pub use token::{ValidityError, ValidityToken};
pub use types::{KType, KTypeProjection};
