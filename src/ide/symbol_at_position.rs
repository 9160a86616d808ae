//! Symbols at a source offset: the declaration around it and the target of
//! the reference under it.

use tracing::trace;

use super::scope_provider::scope_context_for_position;
use super::symbol_provider::{parsed_file, target_symbol};
use crate::base::{FileId, Name, TextSize};
use crate::hir::{AnalysisSession, ScopeKind, Symbol};
use crate::parser::{SyntaxKind, SyntaxNode};
use crate::syntax::{NodePtr, find_node_at_offset};

/// Innermost declaration enclosing `offset`.
pub fn declaration_at_offset(session: &AnalysisSession, file: FileId, offset: TextSize) -> Option<Symbol> {
    let file = parsed_file(session, file);
    let token = file.root().token_at_offset(offset).right_biased()?;
    token
        .parent_ancestors()
        .find_map(|node| session.declaration_symbol(&file, &node))
}

/// What the simple name at `offset` refers to.
///
/// A resolution recorded by the oracle wins. Otherwise an unqualified name
/// is looked up at its position: lexical frames, then the members of the
/// implicit receivers, then the file level.
pub fn reference_at_offset(session: &AnalysisSession, file: FileId, offset: TextSize) -> Option<Symbol> {
    let parsed = parsed_file(session, file);
    let name_ref = find_node_at_offset(parsed.root(), offset, |k| k == SyntaxKind::NAME_REF)?;

    if let Some(facts) = session.body_facts(&parsed, &name_ref) {
        if let Some(target) = facts.reference(&NodePtr::new(&name_ref)) {
            trace!(?target, "recorded reference");
            return target_symbol(session, target);
        }
    }
    if is_selector(&name_ref) {
        return None;
    }

    let name = Name::new(name_ref.text().to_string().trim());
    let original = parsed.original().unwrap_or(file);
    let context = scope_context_for_position(session, original, file, &name_ref);
    let scopes = context.scope.sub_scopes(session);
    let lexical = scopes
        .iter()
        .filter(|s| s.kind(session) == ScopeKind::Lexical)
        .find_map(|s| s.symbols_named(session, &name).into_iter().next());
    if lexical.is_some() {
        return lexical;
    }
    let member = context
        .implicit_receivers
        .iter()
        .find_map(|r| session.type_scope(&r.ty).symbols_named(session, &name).into_iter().next());
    if member.is_some() {
        return member;
    }
    scopes
        .iter()
        .filter(|s| s.kind(session) != ScopeKind::Lexical)
        .find_map(|s| s.symbols_named(session, &name).into_iter().next())
}

/// `b` in `a.b` or `a?.b()`.
fn is_selector(name_ref: &SyntaxNode) -> bool {
    let mut node = name_ref.clone();
    if let Some(parent) = node.parent() {
        if parent.kind() == SyntaxKind::CALL_EXPR && parent.first_child().as_ref() == Some(&node) {
            node = parent;
        }
    }
    node.parent().is_some_and(|parent| {
        matches!(parent.kind(), SyntaxKind::DOT_QUALIFIED_EXPR | SyntaxKind::SAFE_QUALIFIED_EXPR)
            && parent.first_child().as_ref() != Some(&node)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::hir::SymbolKind;
    use crate::hir::testing::{jvm_settings, session_from, session_with};
    use crate::model::{RecordedOracle, ResolvedTarget};
    use crate::parser::TextRange;

    fn offset_of(text: &str, needle: &str) -> TextSize {
        TextSize::from(text.rfind(needle).unwrap() as u32)
    }

    #[test]
    fn test_declaration_at_offset_is_innermost() {
        let text = "class A { fun f() { val x = 1 } }";
        let session = session_with(&[("a.kt", text)]);
        let file = session.files()[0].id();
        let x = declaration_at_offset(&session, file, offset_of(text, "x")).unwrap();
        assert_eq!(x.kind(&session), SymbolKind::LocalVariable);
        let f = declaration_at_offset(&session, file, offset_of(text, "f()")).unwrap();
        assert_eq!(f.name(&session), Name::new("f"));
    }

    #[test]
    fn test_reference_to_local_and_parameter() {
        let text = "fun f(p: Int) { val local = p\n local }";
        let session = session_with(&[("a.kt", text)]);
        let file = session.files()[0].id();
        let p = reference_at_offset(&session, file, offset_of(text, "p\n")).unwrap();
        assert_eq!(p.kind(&session), SymbolKind::ValueParameter);
        let local = reference_at_offset(&session, file, offset_of(text, "local }")).unwrap();
        assert_eq!(local.kind(&session), SymbolKind::LocalVariable);
    }

    #[test]
    fn test_reference_to_member_through_receiver() {
        let text = "class A { fun g() {}\n fun f() { g() } }";
        let session = session_with(&[("a.kt", text)]);
        let file = session.files()[0].id();
        let g = reference_at_offset(&session, file, offset_of(text, "g()")).unwrap();
        assert_eq!(g.kind(&session), SymbolKind::Function);
        assert_eq!(g.name(&session), Name::new("g"));
    }

    #[test]
    fn test_reference_to_default_import() {
        let text = "fun f() { println() }";
        let session = session_with(&[("a.kt", text)]);
        let file = session.files()[0].id();
        let println = reference_at_offset(&session, file, offset_of(text, "println")).unwrap();
        assert_eq!(println.callable_id(&session).unwrap().to_string(), "kotlin/io/println");
    }

    #[test]
    fn test_recorded_reference_wins() {
        let text = "fun target() {}\nfun f() { other }";
        let start = text.rfind("other").unwrap() as u32;
        let oracle = Arc::new(RecordedOracle::new());
        let session = session_from(&[("a.kt", text)], jvm_settings(), oracle.clone());
        let target = session.files()[0].declarations()[0].clone();
        oracle.record_reference(
            "a.kt",
            TextRange::at(start.into(), 5.into()),
            ResolvedTarget::Source(crate::model::SourceRef {
                file: session.files()[0].id(),
                ptr: NodePtr::new(&target),
            }),
        );
        let found = reference_at_offset(&session, session.files()[0].id(), start.into()).unwrap();
        assert_eq!(found.name(&session), Name::new("target"));
    }

    #[test]
    fn test_unresolved_selector_is_none() {
        let text = "fun f(s: String) { s.missing }";
        let session = session_with(&[("a.kt", text)]);
        assert!(reference_at_offset(&session, session.files()[0].id(), offset_of(text, "missing")).is_none());
    }
}
