//! # semfacade
//!
//! A session-scoped semantic facade over Kotlin-like source code and
//! compiled library declarations.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Query components and the AnalysisHost
//!   ↓
//! hir       → Session, Symbols, KTypes, Scopes, SymbolPointers
//!   ↓
//! model     → Oracle, module graph, type checker (+ reference impls)
//!   ↓
//! syntax    → ParsedFile, NodePtr, SourceAnchor
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, rowan CST
//!   ↓
//! base      → Primitives (FileId, Name, FqName, ClassId, CallableId)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → model → hir → ide)
// ============================================================================

/// Foundation types: FileId, names and declaration ids
pub mod base;

/// Language settings
pub mod config;

/// Parser: Logos lexer, recursive-descent parser, rowan CST
pub mod parser;

/// Syntax: parsed files and stable node pointers
pub mod syntax;

/// Collaborators the facade resolves against
pub mod model;

/// Session-bound semantic model
pub mod hir;

/// Query components and the AnalysisHost
pub mod ide;

// Re-export foundation types
pub use base::{CallableId, ClassId, FileId, FqName, Name, TextRange, TextSize};
pub use config::{SettingsError, LanguageFeature, LanguageSettings, TargetPlatform};
pub use hir::{AnalysisSession, KType, Scope, ScopeKind, Symbol, SymbolKind, SymbolPointer, ValidityToken};
pub use ide::AnalysisHost;
