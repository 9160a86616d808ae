//! Smart-cast information for expressions and implicit receivers.

use tracing::trace;

use super::symbol_provider::parsed_file;
use crate::base::FileId;
use crate::hir::{AnalysisSession, KType};
use crate::model::ReceiverKind;
use crate::parser::SyntaxNode;
use crate::syntax::NodePtr;

/// The narrowed type of an expression.
#[derive(Debug, Clone)]
pub struct SmartCastInfo {
    pub ty: KType,
    /// `false` when the value may change between check and use
    pub is_stable: bool,
}

#[derive(Debug, Clone)]
pub struct ImplicitReceiverSmartCast {
    pub ty: KType,
    pub kind: ReceiverKind,
}

/// Smart cast applied to `expr`, `None` when it is not narrowed.
///
/// A value narrowed by several checks reports the intersection of the
/// narrowed types.
pub fn smart_cast_info(session: &AnalysisSession, file: FileId, expr: &SyntaxNode) -> Option<SmartCastInfo> {
    let file = parsed_file(session, file);
    let facts = session.body_facts(&file, expr)?;
    let fact = facts.smart_cast(&NodePtr::new(expr))?;
    let ty = match fact.types.as_slice() {
        [] => return None,
        [single] => single.clone(),
        types => session.type_checker().intersect(session, types),
    };
    trace!(ty = %ty, stable = fact.stable, "smart cast");
    Some(SmartCastInfo {
        ty: session.ktype(ty),
        is_stable: fact.stable,
    })
}

/// Narrowed implicit receivers in effect at `expr`.
pub fn implicit_receiver_smart_casts(
    session: &AnalysisSession,
    file: FileId,
    expr: &SyntaxNode,
) -> Vec<ImplicitReceiverSmartCast> {
    let file = parsed_file(session, file);
    let Some(facts) = session.body_facts(&file, expr) else {
        return Vec::new();
    };
    facts
        .implicit_receiver_casts(&NodePtr::new(expr))
        .iter()
        .map(|cast| ImplicitReceiverSmartCast {
            ty: session.ktype(cast.narrowed.clone()),
            kind: cast.kind,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::base::{ClassId, standard};
    use crate::hir::testing::{jvm_settings, session_from};
    use crate::model::{ImplicitReceiverCast, RecordedOracle, SemType, TypeProjection};
    use crate::parser::{SyntaxKind, TextRange};

    const TEXT: &str = "interface A\ninterface B\nfun f(x: Any) { x }";

    fn x_range() -> TextRange {
        let start = TEXT.rfind('x').unwrap() as u32;
        TextRange::at(start.into(), 1.into())
    }

    fn x_node(session: &AnalysisSession) -> SyntaxNode {
        session.files()[0]
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::NAME_REF && n.text_range() == x_range())
            .unwrap()
    }

    fn narrowed(types: Vec<SemType>) -> (AnalysisSession, SyntaxNode) {
        let oracle = Arc::new(RecordedOracle::new());
        oracle.record_smart_cast("a.kt", x_range(), types, true);
        let session = session_from(&[("a.kt", TEXT)], jvm_settings(), oracle);
        let node = x_node(&session);
        (session, node)
    }

    #[test]
    fn test_multiple_smart_casts_intersected() {
        let (session, x) = narrowed(vec![SemType::class(ClassId::parse("A")), SemType::class(ClassId::parse("B"))]);
        let info = smart_cast_info(&session, session.files()[0].id(), &x).unwrap();
        assert_eq!(info.ty.to_string(), "{A & B}");
        assert!(info.is_stable);
    }

    #[test]
    fn test_related_smart_casts_keep_most_specific() {
        let int = SemType::class(standard::int());
        let comparable = SemType::class_with(standard::comparable(), vec![TypeProjection::invariant(int.clone())]);
        let (session, x) = narrowed(vec![comparable, int]);
        let info = smart_cast_info(&session, session.files()[0].id(), &x).unwrap();
        assert_eq!(info.ty.to_string(), "kotlin.Int");
    }

    #[test]
    fn test_single_smart_cast() {
        let (session, x) = narrowed(vec![SemType::class(ClassId::parse("B"))]);
        let info = smart_cast_info(&session, session.files()[0].id(), &x).unwrap();
        assert_eq!(info.ty.to_string(), "B");
    }

    #[test]
    fn test_no_smart_cast() {
        let oracle = Arc::new(RecordedOracle::new());
        let session = session_from(&[("a.kt", TEXT)], jvm_settings(), oracle);
        let x = x_node(&session);
        assert!(smart_cast_info(&session, session.files()[0].id(), &x).is_none());
        assert!(implicit_receiver_smart_casts(&session, session.files()[0].id(), &x).is_empty());
    }

    #[test]
    fn test_implicit_receiver_cast_uses_narrowed_type() {
        let oracle = Arc::new(RecordedOracle::new());
        oracle.record_implicit_receiver_casts(
            "a.kt",
            x_range(),
            vec![ImplicitReceiverCast {
                original: SemType::nullable_any(),
                narrowed: SemType::class(ClassId::parse("A")),
                kind: ReceiverKind::Extension,
            }],
        );
        let session = session_from(&[("a.kt", TEXT)], jvm_settings(), oracle);
        let x = x_node(&session);
        let casts = implicit_receiver_smart_casts(&session, session.files()[0].id(), &x);
        assert_eq!(casts.len(), 1);
        assert_eq!(casts[0].ty.to_string(), "A");
        assert_eq!(casts[0].kind, ReceiverKind::Extension);
    }
}
