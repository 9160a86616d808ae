//! Symbols backed by source and by library metadata.

use std::sync::Arc;

use semfacade::base::{ClassId, Name};
use semfacade::hir::SymbolKind;
use semfacade::ide::{AnalysisHost, containing_declaration, declaration_at_offset, scope_provider};
use semfacade::model::{Modality, RecordedOracle, SymbolOrigin, Visibility};
use semfacade::parser::SyntaxKind;

use crate::helpers::host_helpers::{class, file_id, jvm_settings, offset_of, session_from_sources};
use crate::helpers::source_fixtures::{SERVICE, SHAPES};

#[test]
fn test_source_class_properties() {
    let (_host, session) = session_from_sources(&[("shapes/Shape.kt", SHAPES)]);
    let shape = class(&session, "shapes/Shape");
    assert_eq!(shape.kind(&session), SymbolKind::Class);
    assert_eq!(shape.modality(&session), Modality::Sealed);
    assert_eq!(shape.origin(&session), SymbolOrigin::Source);
    assert_eq!(shape.class_id(&session), Some(ClassId::parse("shapes/Shape")));

    let circle = class(&session, "shapes/Circle");
    let supers: Vec<_> = circle.super_types(&session).iter().filter_map(|t| t.class_id(&session)).collect();
    assert_eq!(supers, vec![ClassId::parse("shapes/Shape")]);
}

#[test]
fn test_member_visibility_and_container() {
    let (_host, session) = session_from_sources(&[("shapes/Shape.kt", SHAPES), ("app/Service.kt", SERVICE)]);
    let service = class(&session, "app/Service");
    let members = scope_provider::declared_member_scope(&session, &service);
    let cache = members.symbols_named(&session, &Name::new("cache")).remove(0);
    assert_eq!(cache.visibility(&session), Visibility::Private);
    assert_eq!(containing_declaration(&session, &cache), Some(service.clone()));

    let run = members.symbols_named(&session, &Name::new("run")).remove(0);
    let x = run.value_parameters(&session).remove(0);
    assert_eq!(x.name(&session), Name::new("x"));
    assert_eq!(containing_declaration(&session, &x), Some(run));
}

#[test]
fn test_library_class_is_metadata_backed() {
    let (_host, session) = session_from_sources(&[]);
    let string = class(&session, "kotlin/String");
    assert_eq!(string.origin(&session), SymbolOrigin::Library);
    assert!(string.declaration_node(&session).is_none());
}

#[test]
fn test_failed_inference_gives_error_return_type() {
    let text = "package p\n\nval x = compute()\n";
    let range = {
        let (_host, session) = session_from_sources(&[("a.kt", text)]);
        session
            .file_by_path("a.kt")
            .unwrap()
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::PROPERTY)
            .unwrap()
            .text_range()
    };

    let oracle = Arc::new(RecordedOracle::new());
    oracle.record_inference_failure("a.kt", range);
    let mut host = AnalysisHost::with_oracle(jvm_settings(), oracle);
    host.set_file_text("a.kt", text);
    let session = host.analysis_session();

    let x = declaration_at_offset(&session, file_id(&session, "a.kt"), offset_of(text, "x =")).unwrap();
    assert_eq!(x.name(&session), Name::new("x"));
    let ty = x.return_type(&session);
    assert!(ty.is_error(&session));
    assert!(ty.error_message(&session).unwrap().contains("Cannot infer a type for x"));
}

#[test]
fn test_leading_comment_file_declares_classes() {
    let text = "// header\n/* more */\npackage p\n\nclass A\n";
    let (_host, session) = session_from_sources(&[("p/A.kt", text)]);
    let a = class(&session, "p/A");
    assert_eq!(a.origin(&session), SymbolOrigin::Source);
    assert_eq!(session.file_by_path("p/A.kt").unwrap().root().text().to_string(), text);
}
