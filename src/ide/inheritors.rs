//! Direct inheritors of sealed classes and entries of enum classes.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::base::ClassId;
use crate::config::LanguageFeature;
use crate::hir::{AnalysisSession, Symbol, SymbolKind};
use crate::model::lower::class_id_for;
use crate::model::{DeclRecord, Modality};
use crate::parser::SyntaxKind;

/// Named classes and objects directly extending the sealed `class`, compiled
/// ones first. Empty for a class that is not sealed.
///
/// Whether an inheritor may live in another file of the package follows
/// [`LanguageFeature::AllowSealedInheritorsInDifferentFilesOfSamePackage`].
#[track_caller]
pub fn sealed_inheritors(session: &AnalysisSession, class: &Symbol) -> Vec<Symbol> {
    session.assert_accessible(class.token());
    if class.modality(session) != Modality::Sealed {
        return Vec::new();
    }
    let Some(sealed_id) = class.class_id(session) else {
        return Vec::new();
    };
    let Some(record) = class.class_record(session) else {
        return Vec::new();
    };
    let allow_different_files = session
        .language_settings()
        .supports(LanguageFeature::AllowSealedInheritorsInDifferentFilesOfSamePackage);

    let mut seen: FxHashSet<ClassId> = FxHashSet::default();
    let mut out = Vec::new();
    let mut push = |symbol: Symbol, seen: &mut FxHashSet<ClassId>| {
        if symbol.kind(session) != SymbolKind::Class {
            return;
        }
        if let Some(id) = symbol.class_id(session) {
            if seen.insert(id) {
                out.push(symbol);
            }
        }
    };

    for candidate in session
        .module_graph()
        .sealed_inheritor_candidates(&record, allow_different_files)
    {
        let symbol = match &candidate {
            DeclRecord::Class(class) => session.class_symbol(&class.class_id),
            _ => None,
        };
        push(symbol.unwrap_or_else(|| session.record_symbol(&candidate, None)), &mut seen);
    }

    let sealed_file = class.source().map(|(file, _)| file.id());
    for file in session.files().iter().filter(|f| f.original().is_none()) {
        if file.package_fq_name() != *sealed_id.package_fq_name() {
            continue;
        }
        if !allow_different_files && sealed_file.is_some_and(|id| id != file.id()) {
            continue;
        }
        let classes = file
            .root()
            .descendants()
            .filter(|n| matches!(n.kind(), SyntaxKind::CLASS | SyntaxKind::OBJECT_DECLARATION));
        for node in classes {
            let Some(class_id) = class_id_for(file, &node) else {
                continue;
            };
            if class_id == sealed_id {
                continue;
            }
            let Some(candidate) = session.declaration_symbol(file, &node) else {
                continue;
            };
            let extends = candidate
                .super_types(session)
                .iter()
                .any(|t| t.class_id(session).as_ref() == Some(&sealed_id));
            if extends {
                push(candidate, &mut seen);
            }
        }
    }
    debug!(sealed = %sealed_id, count = out.len(), "sealed inheritors");
    out
}

/// Entries of the enum `class` in declaration order; empty for other classes.
#[track_caller]
pub fn enum_entries(session: &AnalysisSession, class: &Symbol) -> Vec<Symbol> {
    session
        .declared_member_scope(class)
        .symbols(session)
        .into_iter()
        .filter(|s| s.kind(session) == SymbolKind::EnumEntry)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::hir::testing::{jvm_settings, session_from, session_with};
    use crate::model::RecordedOracle;

    fn names(session: &AnalysisSession, symbols: &[Symbol]) -> Vec<String> {
        symbols.iter().map(|s| s.name(session).as_str().to_string()).collect()
    }

    const FILES: [(&str, &str); 2] = [
        (
            "p/Shape.kt",
            "package p\nsealed class Shape\nclass Circle : Shape()\nobject Empty : Shape()\nfun helper() {}",
        ),
        ("p/Square.kt", "package p\nclass Square : Shape()\nclass Unrelated"),
    ];

    #[test]
    fn test_sealed_inheritors_same_file_only() {
        let session = session_with(&FILES);
        let shape = session.class_symbol(&ClassId::parse("p/Shape")).unwrap();
        let found = sealed_inheritors(&session, &shape);
        assert_eq!(names(&session, &found), vec!["Circle", "Empty"]);
    }

    #[test]
    fn test_sealed_inheritors_across_files_with_feature() {
        let settings = jvm_settings().with_feature(LanguageFeature::AllowSealedInheritorsInDifferentFilesOfSamePackage);
        let session = session_from(&FILES, settings, Arc::new(RecordedOracle::new()));
        let shape = session.class_symbol(&ClassId::parse("p/Shape")).unwrap();
        let found = sealed_inheritors(&session, &shape);
        assert_eq!(names(&session, &found), vec!["Circle", "Empty", "Square"]);
    }

    #[test]
    fn test_non_sealed_class_has_no_inheritors() {
        let session = session_with(&[("a.kt", "open class Base\nclass D : Base()")]);
        let base = session.class_symbol(&ClassId::parse("Base")).unwrap();
        assert!(sealed_inheritors(&session, &base).is_empty());
    }

    #[test]
    fn test_enum_entries_in_order() {
        let session = session_with(&[("a.kt", "enum class Color { RED, GREEN, BLUE; fun f() {} }")]);
        let color = session.class_symbol(&ClassId::parse("Color")).unwrap();
        let entries = enum_entries(&session, &color);
        assert_eq!(names(&session, &entries), vec!["RED", "GREEN", "BLUE"]);
        assert!(entries.iter().all(|e| e.kind(&session) == SymbolKind::EnumEntry));
    }

    #[test]
    fn test_enum_entries_of_plain_class_empty() {
        let session = session_with(&[("a.kt", "class A { fun f() {} }")]);
        let a = session.class_symbol(&ClassId::parse("A")).unwrap();
        assert!(enum_entries(&session, &a).is_empty());
    }
}
