//! Symbol pointers across sessions and across runs.

use semfacade::base::{FqName, Name};
use semfacade::hir::{StoredPointer, SymbolKind, SymbolPointer};
use semfacade::ide::scope_provider;

use crate::helpers::host_helpers::{class, session_from_sources};

#[test]
fn test_member_pointer_survives_edit() {
    let (mut host, first) = session_from_sources(&[("a.kt", "class A { fun f(x: Int) {} }")]);
    let a = class(&first, "A");
    let f = scope_provider::declared_member_scope(&first, &a).symbols_named(&first, &Name::new("f")).remove(0);
    let pointer = f.create_pointer(&first);

    host.set_file_text("a.kt", "// header\n\nclass A {\n    val y = 1\n    fun f(x: Int) {}\n}");
    let second = host.analysis_session();
    let restored = pointer.restore(&second).unwrap();
    assert_eq!(restored.kind(&second), SymbolKind::Function);
    assert_eq!(restored.name(&second), Name::new("f"));
}

#[test]
fn test_deleted_declaration_does_not_restore() {
    let (mut host, first) = session_from_sources(&[("a.kt", "class A")]);
    let pointer = class(&first, "A").create_pointer(&first);
    host.set_file_text("a.kt", "class B");
    assert!(pointer.restore(&host.analysis_session()).is_none());
}

#[test]
fn test_library_pointer_persists_to_disk() {
    let (mut host, first) = session_from_sources(&[]);
    let list_of = scope_provider::package_scope(&first, &FqName::new("kotlin.collections"))
        .symbols_named(&first, &Name::new("listOf"))
        .remove(0);
    let pointer = list_of.create_pointer(&first);
    assert!(pointer.is_restorable());

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("pointer.json");
    StoredPointer::new(pointer).write_to_file(&path).unwrap();

    let loaded = StoredPointer::read_from_file(&path).unwrap();
    let second = host.analysis_session();
    let restored = loaded.pointer.restore(&second).unwrap();
    assert_eq!(restored.name(&second), Name::new("listOf"));
    assert!(matches!(loaded.pointer, SymbolPointer::Callable { .. }));
}
