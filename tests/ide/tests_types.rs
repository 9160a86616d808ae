//! Building, comparing and projecting types.

use rstest::rstest;
use semfacade::base::ClassId;
use semfacade::hir::KTypeProjection;
use semfacade::ide::{ClassTypeBuilder, build_class_type, is_equal, is_subtype_of, platform_type};
use semfacade::model::Variance;

use crate::helpers::host_helpers::{class, session_from_sources};
use crate::helpers::source_fixtures::SHAPES;

fn by_id(id: &str) -> ClassTypeBuilder {
    ClassTypeBuilder::ByClassId(ClassId::parse(id))
}

#[test]
fn test_build_generic_type() {
    let (_host, session) = session_from_sources(&[]);
    let string = build_class_type(&session, &by_id("kotlin/String"), &[], false);
    let list = build_class_type(
        &session,
        &by_id("kotlin/collections/List"),
        &[KTypeProjection::Projected { variance: Variance::Invariant, ty: string }],
        true,
    );
    assert_eq!(list.render(&session), "kotlin.collections.List<kotlin.String>?");
    assert!(list.can_be_null(&session));
}

#[test]
fn test_missing_class_builds_error_type() {
    let (_host, session) = session_from_sources(&[]);
    let missing = build_class_type(&session, &by_id("nowhere/Missing"), &[], false);
    assert!(missing.is_error(&session));
    assert!(missing.error_message(&session).unwrap().contains("descriptor not found"));
}

#[test]
fn test_source_subtyping() {
    let (_host, session) = session_from_sources(&[("shapes/Shape.kt", SHAPES)]);
    let circle = build_class_type(&session, &ClassTypeBuilder::BySymbol(class(&session, "shapes/Circle")), &[], false);
    let shape = build_class_type(&session, &by_id("shapes/Shape"), &[], false);
    assert!(is_subtype_of(&session, &circle, &shape));
    assert!(!is_subtype_of(&session, &shape, &circle));
    assert!(!is_subtype_of(&session, &shape.with_nullability(&session, true), &shape));
    assert!(is_equal(&session, &shape, &shape.clone()));
}

#[rstest]
#[case("kotlin/Int", false, "I", "int")]
#[case("kotlin/Int", true, "Ljava/lang/Integer;", "java.lang.Integer")]
#[case("kotlin/String", false, "Ljava/lang/String;", "java.lang.String")]
#[case("kotlin/Any", true, "Ljava/lang/Object;", "java.lang.Object")]
fn test_platform_types(#[case] id: &str, #[case] nullable: bool, #[case] descriptor: &str, #[case] rendered: &str) {
    let (_host, session) = session_from_sources(&[]);
    let ty = build_class_type(&session, &by_id(id), &[], nullable);
    let projected = platform_type(&session, &ty).unwrap();
    assert_eq!(projected.descriptor, descriptor);
    assert_eq!(projected.rendered, rendered);
}
