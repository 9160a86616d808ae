//! Types of expressions.

use super::symbol_provider::parsed_file;
use crate::base::FileId;
use crate::hir::{AnalysisSession, KType};
use crate::parser::SyntaxNode;
use crate::syntax::NodePtr;

/// Type the oracle inferred for `expr`, `None` when it has none (or `expr`
/// is not an expression).
pub fn expression_type(session: &AnalysisSession, file: FileId, expr: &SyntaxNode) -> Option<KType> {
    let file = parsed_file(session, file);
    let facts = session.body_facts(&file, expr)?;
    let ty = facts.expression_type(&NodePtr::new(expr))?;
    Some(session.ktype(ty.clone()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::base::standard;
    use crate::hir::testing::{jvm_settings, session_from, session_with};
    use crate::model::{RecordedOracle, SemType};
    use crate::parser::{SyntaxKind, TextRange};

    fn first(session: &AnalysisSession, kind: SyntaxKind) -> SyntaxNode {
        session.files()[0].root().descendants().find(|n| n.kind() == kind).unwrap()
    }

    #[test]
    fn test_literal_type() {
        let session = session_with(&[("a.kt", "fun f() { \"text\" }")]);
        let literal = session.files()[0]
            .root()
            .descendants()
            .find(|n| n.text() == "\"text\"" && n.kind() != SyntaxKind::BLOCK)
            .unwrap();
        let ty = expression_type(&session, session.files()[0].id(), &literal).unwrap();
        assert_eq!(ty.semantic(&session), &SemType::class(standard::string()));
        assert!(!ty.can_be_null(&session));
    }

    #[test]
    fn test_recorded_type_for_call() {
        let text = "fun f() { compute() }";
        let start = text.find("compute()").unwrap() as u32;
        let oracle = Arc::new(RecordedOracle::new());
        oracle.record_expression_type(
            "a.kt",
            TextRange::at(start.into(), 9.into()),
            SemType::class(standard::int()).with_nullability(true),
        );
        let session = session_from(&[("a.kt", text)], jvm_settings(), oracle);
        let call = first(&session, SyntaxKind::CALL_EXPR);
        let ty = expression_type(&session, session.files()[0].id(), &call).unwrap();
        assert!(ty.can_be_null(&session));
    }

    #[test]
    fn test_declaration_has_no_expression_type() {
        let session = session_with(&[("a.kt", "class A")]);
        let class = first(&session, SyntaxKind::CLASS);
        assert!(expression_type(&session, session.files()[0].id(), &class).is_none());
    }
}
