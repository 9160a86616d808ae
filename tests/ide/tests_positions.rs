//! Declarations and reference targets at source offsets.

use semfacade::base::Name;
use semfacade::hir::SymbolKind;
use semfacade::ide::{declaration_at_offset, reference_at_offset};

use crate::helpers::host_helpers::{file_id, offset_of, session_from_sources};
use crate::helpers::source_fixtures::{SERVICE, SHAPES};

fn service_session() -> (semfacade::ide::AnalysisHost, semfacade::hir::AnalysisSession) {
    session_from_sources(&[("shapes/Shape.kt", SHAPES), ("app/Service.kt", SERVICE)])
}

#[test]
fn test_declaration_at_offset() {
    let (_host, session) = service_session();
    let file = file_id(&session, "app/Service.kt");
    let doubled = declaration_at_offset(&session, file, offset_of(SERVICE, "doubled")).unwrap();
    assert_eq!(doubled.kind(&session), SymbolKind::LocalVariable);
    let area = declaration_at_offset(&session, file, offset_of(SERVICE, "area")).unwrap();
    assert_eq!(area.name(&session), Name::new("area"));
}

#[test]
fn test_reference_to_parameter() {
    let (_host, session) = service_session();
    let file = file_id(&session, "app/Service.kt");
    let x = reference_at_offset(&session, file, offset_of(SERVICE, "x\n")).unwrap();
    assert_eq!(x.kind(&session), SymbolKind::ValueParameter);
    assert_eq!(x.name(&session), Name::new("x"));
}

#[test]
fn test_reference_through_default_import() {
    let (_host, session) = service_session();
    let file = file_id(&session, "app/Service.kt");
    let println = reference_at_offset(&session, file, offset_of(SERVICE, "println")).unwrap();
    assert_eq!(println.callable_id(&session).unwrap().to_string(), "kotlin/io/println");
}

#[test]
fn test_offset_outside_references() {
    let (_host, session) = service_session();
    let file = file_id(&session, "app/Service.kt");
    assert!(reference_at_offset(&session, file, offset_of(SERVICE, "package")).is_none());
}
