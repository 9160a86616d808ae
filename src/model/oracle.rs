//! The inference oracle seam.
//!
//! The facade never infers anything itself. It hands a declaration (or an
//! expression) to an [`InferenceOracle`] and reads the [`BindingFacts`] that
//! come back. Facts are keyed by [`NodePtr`] of the file the request was made
//! against.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::graph::ResolutionEnv;
use super::records::{DeclRecord, SemType, SourceRef};
use crate::base::{ClassId, FqName, Name};
use crate::parser::SyntaxNode;
use crate::syntax::{NodePtr, ParsedFile};

/// How much of a declaration the oracle must analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisMode {
    /// Bodies included: lexical scopes, smart casts and expression types
    Full,
    /// Just enough for the node's own record
    Partial,
}

impl AnalysisMode {
    /// Facts produced in `self` mode are good enough for a `requested` one.
    pub fn satisfies(self, requested: AnalysisMode) -> bool {
        self == AnalysisMode::Full || requested == AnalysisMode::Partial
    }
}

pub struct AnalysisRequest<'a> {
    pub file: &'a ParsedFile,
    pub node: &'a SyntaxNode,
    pub mode: AnalysisMode,
    pub env: &'a dyn ResolutionEnv,
}

/// The external type-inference engine.
pub trait InferenceOracle: Send + Sync {
    fn analyze(&self, request: &AnalysisRequest<'_>) -> Arc<BindingFacts>;
}

// ============================================================================
// Facts
// ============================================================================

/// What a reference in source resolved to.
#[derive(Debug, Clone)]
pub enum ResolvedTarget {
    Source(SourceRef),
    Record(DeclRecord),
    Package(FqName),
}

/// Narrowed types recorded for one expression. More than one type means
/// several control-flow branches narrowed the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartCastFact {
    pub types: Vec<SemType>,
    pub stable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverKind {
    Dispatch,
    Extension,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitReceiverCast {
    pub original: SemType,
    pub narrowed: SemType,
    pub kind: ReceiverKind,
}

/// Declaration that owns an implicit receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerRef {
    Declaration(SourceRef),
    Class(ClassId),
    /// Something the oracle could not attribute to a declaration
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverFact {
    pub ty: SemType,
    pub owner: OwnerRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Block,
    Function,
    Lambda,
    Accessor,
    Constructor,
    Initializer,
    Class,
}

#[derive(Debug, Clone)]
pub struct ScopeEntry {
    pub name: Name,
    pub target: ResolvedTarget,
}

/// One level of the lexical scope chain.
#[derive(Debug, Clone)]
pub struct LexicalFrame {
    pub kind: FrameKind,
    pub owner: OwnerRef,
    pub entries: Vec<ScopeEntry>,
    pub implicit_receiver: Option<ReceiverFact>,
}

/// Lexical frames visible at a statement, innermost first. The file and
/// import levels are not part of the chain.
#[derive(Debug, Clone, Default)]
pub struct LexicalScopeChain {
    pub frames: Vec<LexicalFrame>,
}

/// Everything one `analyze` call found out.
#[derive(Debug, Default)]
pub struct BindingFacts {
    declarations: FxHashMap<NodePtr, Option<DeclRecord>>,
    expression_types: FxHashMap<NodePtr, SemType>,
    smart_casts: FxHashMap<NodePtr, SmartCastFact>,
    implicit_receiver_casts: FxHashMap<NodePtr, Vec<ImplicitReceiverCast>>,
    lexical_scopes: FxHashMap<NodePtr, LexicalScopeChain>,
    references: FxHashMap<NodePtr, ResolvedTarget>,
    backing_field_required: FxHashSet<NodePtr>,
}

impl BindingFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the declaration's record, `None` when inference failed.
    pub fn insert_declaration(&mut self, ptr: NodePtr, record: Option<DeclRecord>) {
        self.declarations.insert(ptr, record);
    }

    pub fn insert_expression_type(&mut self, ptr: NodePtr, ty: SemType) {
        self.expression_types.insert(ptr, ty);
    }

    pub fn insert_smart_cast(&mut self, ptr: NodePtr, fact: SmartCastFact) {
        self.smart_casts.insert(ptr, fact);
    }

    pub fn insert_implicit_receiver_casts(&mut self, ptr: NodePtr, casts: Vec<ImplicitReceiverCast>) {
        self.implicit_receiver_casts.insert(ptr, casts);
    }

    pub fn insert_lexical_scope(&mut self, ptr: NodePtr, chain: LexicalScopeChain) {
        self.lexical_scopes.insert(ptr, chain);
    }

    pub fn insert_reference(&mut self, ptr: NodePtr, target: ResolvedTarget) {
        self.references.insert(ptr, target);
    }

    pub fn mark_backing_field_required(&mut self, ptr: NodePtr) {
        self.backing_field_required.insert(ptr);
    }

    /// `Some(None)` means the declaration was analyzed and no record came out.
    pub fn declaration(&self, ptr: &NodePtr) -> Option<Option<&DeclRecord>> {
        self.declarations.get(ptr).map(Option::as_ref)
    }

    pub fn expression_type(&self, ptr: &NodePtr) -> Option<&SemType> {
        self.expression_types.get(ptr)
    }

    pub fn smart_cast(&self, ptr: &NodePtr) -> Option<&SmartCastFact> {
        self.smart_casts.get(ptr)
    }

    pub fn implicit_receiver_casts(&self, ptr: &NodePtr) -> &[ImplicitReceiverCast] {
        self.implicit_receiver_casts
            .get(ptr)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn lexical_scope(&self, ptr: &NodePtr) -> Option<&LexicalScopeChain> {
        self.lexical_scopes.get(ptr)
    }

    pub fn reference(&self, ptr: &NodePtr) -> Option<&ResolvedTarget> {
        self.references.get(ptr)
    }

    pub fn is_backing_field_required(&self, ptr: &NodePtr) -> bool {
        self.backing_field_required.contains(ptr)
    }

    pub fn declaration_count(&self) -> usize {
        self.declarations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{SyntaxKind, TextRange, TextSize};

    fn ptr(start: u32, end: u32) -> NodePtr {
        NodePtr::from_parts(
            SyntaxKind::LITERAL,
            TextRange::new(TextSize::new(start), TextSize::new(end)),
        )
    }

    #[test]
    fn test_mode_satisfies() {
        assert!(AnalysisMode::Full.satisfies(AnalysisMode::Partial));
        assert!(AnalysisMode::Full.satisfies(AnalysisMode::Full));
        assert!(AnalysisMode::Partial.satisfies(AnalysisMode::Partial));
        assert!(!AnalysisMode::Partial.satisfies(AnalysisMode::Full));
    }

    #[test]
    fn test_failed_declaration_is_distinct_from_missing() {
        let mut facts = BindingFacts::new();
        facts.insert_declaration(ptr(0, 3), None);
        assert_eq!(facts.declaration(&ptr(0, 3)).map(|r| r.is_none()), Some(true));
        assert!(facts.declaration(&ptr(4, 5)).is_none());
    }

    #[test]
    fn test_implicit_receiver_casts_default_empty() {
        let facts = BindingFacts::new();
        assert!(facts.implicit_receiver_casts(&ptr(0, 1)).is_empty());
    }
}
