//! Sealed inheritors and enum entries.

use std::sync::Arc;

use rstest::rstest;
use semfacade::base::{CallableId, ClassId, FqName, Name};
use semfacade::config::LanguageFeature;
use semfacade::ide::{AnalysisHost, enum_entries, sealed_inheritors};
use semfacade::model::{
    CallableKind, CallableRecord, ClassKind, ClassRecord, DeclRecord, HierarchyTypeChecker, Modality, RecordedOracle,
    SemType, builtins,
};

use crate::helpers::host_helpers::{class, host_from_sources, jvm_settings, settings_with};
use crate::helpers::source_fixtures::{COLORS, SHAPES, SQUARE};

#[rstest]
#[case(&[], &["shapes/Circle", "shapes/Empty"])]
#[case(
    &[LanguageFeature::AllowSealedInheritorsInDifferentFilesOfSamePackage],
    &["shapes/Circle", "shapes/Empty", "shapes/Square"]
)]
fn test_sealed_inheritors_by_feature(#[case] features: &[LanguageFeature], #[case] expected: &[&str]) {
    let mut host = host_from_sources(
        &[("shapes/Shape.kt", SHAPES), ("shapes/Square.kt", SQUARE)],
        settings_with(features),
    );
    let session = host.analysis_session();
    let shape = class(&session, "shapes/Shape");
    let mut found: Vec<ClassId> = sealed_inheritors(&session, &shape)
        .iter()
        .filter_map(|s| s.class_id(&session))
        .collect();
    found.sort_by_key(|id| id.to_string());
    let expected: Vec<ClassId> = expected.iter().map(|id| ClassId::parse(id)).collect();
    assert_eq!(found, expected);
}

#[test]
fn test_non_sealed_class_has_no_inheritors() {
    let mut host = host_from_sources(&[("shapes/Shape.kt", SHAPES)], settings_with(&[]));
    let session = host.analysis_session();
    assert!(sealed_inheritors(&session, &class(&session, "shapes/Circle")).is_empty());
}

#[test]
fn test_enum_entries_in_declaration_order() {
    let mut host = host_from_sources(&[("paint/Color.kt", COLORS)], settings_with(&[]));
    let session = host.analysis_session();
    let names: Vec<Name> = enum_entries(&session, &class(&session, "paint/Color"))
        .iter()
        .map(|entry| entry.name(&session))
        .collect();
    assert_eq!(names, vec![Name::new("RED"), Name::new("GREEN"), Name::new("BLUE")]);
}

#[test]
fn test_library_sealed_inheritors_skip_non_class_candidates() {
    let base_id = ClassId::parse("lib/Base");
    let sub_id = ClassId::parse("lib/Sub");

    let mut graph = builtins::builtins();
    let mut base = ClassRecord::new(base_id.clone(), ClassKind::Class);
    base.modality = Modality::Sealed;
    graph.add_class("lib", base);
    let mut sub = ClassRecord::new(sub_id.clone(), ClassKind::Class);
    sub.supertypes = vec![SemType::class(base_id.clone())];
    let sub = graph.add_class("lib", sub);

    graph.add_sealed_candidate(&base_id, None, DeclRecord::Class(sub));
    graph.add_sealed_candidate(
        &base_id,
        None,
        DeclRecord::Callable(Arc::new(CallableRecord::new(
            CallableKind::Function,
            CallableId::top_level(FqName::new("lib"), Name::new("helper")),
            SemType::unit(),
        ))),
    );

    let mut host = AnalysisHost::new(
        jvm_settings(),
        Arc::new(graph),
        Arc::new(RecordedOracle::new()),
        Arc::new(HierarchyTypeChecker::new()),
    );
    let session = host.analysis_session();
    let base = class(&session, "lib/Base");
    let found: Vec<ClassId> = sealed_inheritors(&session, &base)
        .iter()
        .filter_map(|s| s.class_id(&session))
        .collect();
    assert_eq!(found, vec![sub_id]);
}
