//! Smart casts reported for expressions.

use std::sync::Arc;

use semfacade::base::standard;
use semfacade::hir::AnalysisSession;
use semfacade::ide::{AnalysisHost, smart_cast_info};
use semfacade::model::{RecordedOracle, SemType, TypeProjection};
use semfacade::parser::{SyntaxKind, SyntaxNode, TextRange};

use crate::helpers::host_helpers::{file_id, jvm_settings};

const TEXT: &str = "fun f(x: Any) {\n    x\n}";

fn x_range() -> TextRange {
    let start = TEXT.rfind('x').unwrap() as u32;
    TextRange::at(start.into(), 1.into())
}

fn x_node(session: &AnalysisSession) -> SyntaxNode {
    session
        .file_by_path("a.kt")
        .unwrap()
        .root()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::NAME_REF && n.text_range() == x_range())
        .unwrap()
}

fn session_with_casts(types: Vec<SemType>) -> (AnalysisHost, AnalysisSession) {
    let oracle = Arc::new(RecordedOracle::new());
    oracle.record_smart_cast("a.kt", x_range(), types, true);
    let mut host = AnalysisHost::with_oracle(jvm_settings(), oracle);
    host.set_file_text("a.kt", TEXT);
    let session = host.analysis_session();
    (host, session)
}

#[test]
fn test_int_and_comparable_intersect_under_default_settings() {
    let int = SemType::class(standard::int());
    let comparable = SemType::class_with(standard::comparable(), vec![TypeProjection::invariant(int.clone())]);
    let (_host, session) = session_with_casts(vec![comparable, int]);
    assert!(session.language_settings().enabled_features.is_empty());

    let info = smart_cast_info(&session, file_id(&session, "a.kt"), &x_node(&session)).unwrap();
    assert_eq!(info.ty.render(&session), "kotlin.Int");
    assert!(info.is_stable);
}

#[test]
fn test_order_of_narrowings_does_not_matter() {
    let int = SemType::class(standard::int());
    let comparable = SemType::class_with(standard::comparable(), vec![TypeProjection::invariant(int.clone())]);
    let (_host, session) = session_with_casts(vec![int, comparable]);
    let info = smart_cast_info(&session, file_id(&session, "a.kt"), &x_node(&session)).unwrap();
    assert_eq!(info.ty.render(&session), "kotlin.Int");
}

#[test]
fn test_no_narrowing_is_none() {
    let (_host, session) = session_with_casts(Vec::new());
    assert!(smart_cast_info(&session, file_id(&session, "a.kt"), &x_node(&session)).is_none());
}
