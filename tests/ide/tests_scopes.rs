//! Member, file and import scopes.

use semfacade::base::{FqName, Name};
use semfacade::hir::ScopeKind;
use semfacade::ide::scope_provider;

use crate::helpers::host_helpers::{class, file_id, session_from_sources};
use crate::helpers::source_fixtures::{SERVICE, SHAPES};

#[test]
fn test_member_scope_includes_inherited_members() {
    let (_host, session) = session_from_sources(&[]);
    let list = class(&session, "kotlin/collections/List");
    let members = scope_provider::member_scope(&session, &list);
    assert!(members.contains(&session, &Name::new("get")));
    assert!(members.contains(&session, &Name::new("size")));
    let declared = scope_provider::declared_member_scope(&session, &list);
    assert!(!declared.contains(&session, &Name::new("size")));
}

#[test]
fn test_import_scopes() {
    let (_host, session) = session_from_sources(&[("shapes/Shape.kt", SHAPES), ("app/Service.kt", SERVICE)]);
    let file = file_id(&session, "app/Service.kt");

    let explicit = scope_provider::explicit_import_scope(&session, file);
    assert_eq!(explicit.kind(&session), ScopeKind::Import);
    assert!(explicit.contains(&session, &Name::new("Circle")));
    assert!(!explicit.contains(&session, &Name::new("Shape")));

    let star = scope_provider::star_import_scope(&session, file);
    assert!(star.contains(&session, &Name::new("listOf")));
}

#[test]
fn test_file_resolution_scope_layers() {
    let (_host, session) = session_from_sources(&[("shapes/Shape.kt", SHAPES), ("app/Service.kt", SERVICE)]);
    let file = file_id(&session, "app/Service.kt");
    let scope = scope_provider::file_resolution_scope(&session, file);
    assert_eq!(scope.kind(&session), ScopeKind::Composite);
    assert!(scope.contains(&session, &Name::new("Service")));
    assert!(scope.contains(&session, &Name::new("Circle")));
    assert!(scope.contains(&session, &Name::new("println")));
}

#[test]
fn test_package_scope_spans_files() {
    let (_host, session) = session_from_sources(&[
        ("shapes/Shape.kt", SHAPES),
        ("shapes/Square.kt", crate::helpers::source_fixtures::SQUARE),
    ]);
    let scope = scope_provider::package_scope(&session, &FqName::new("shapes"));
    for name in ["Shape", "Circle", "Empty", "Square"] {
        assert!(scope.contains(&session, &Name::new(name)), "missing {name}");
    }
}
