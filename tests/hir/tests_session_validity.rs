//! Session lifecycle: tokens, invalidation on change, context-dependent
//! copies.

use semfacade::base::Name;
use semfacade::ide::scope_provider;

use crate::helpers::host_helpers::{class, file_id, session_from_sources};

#[test]
fn test_edit_invalidates_open_session() {
    let (mut host, session) = session_from_sources(&[("a.kt", "class A")]);
    assert!(session.is_valid());
    host.set_file_text("a.kt", "class A { fun f() {} }");
    assert!(!session.is_valid());

    let fresh = host.analysis_session();
    let a = class(&fresh, "A");
    assert!(scope_provider::declared_member_scope(&fresh, &a).contains(&fresh, &Name::new("f")));
}

#[test]
#[should_panic(expected = "no longer valid")]
fn test_stale_symbol_faults() {
    let (mut host, session) = session_from_sources(&[("a.kt", "class A")]);
    let a = class(&session, "A");
    host.remove_file("a.kt");
    let _ = a.kind(&session);
}

#[test]
#[should_panic(expected = "used in analysis session")]
fn test_foreign_symbol_faults() {
    let (mut host, first) = session_from_sources(&[("a.kt", "class A")]);
    let a = class(&first, "A");
    let second = host.analysis_session();
    let _ = a.name(&second);
}

#[test]
#[should_panic(expected = "session closed")]
fn test_closed_session_faults() {
    let (_host, session) = session_from_sources(&[("a.kt", "class A")]);
    let a = class(&session, "A");
    session.close();
    let _ = a.name(&session);
}

#[test]
fn test_context_dependent_copy_shares_token() {
    let (_host, session) = session_from_sources(&[("a.kt", "class A")]);
    let original = file_id(&session, "a.kt");
    let (copy, id) = session
        .create_context_dependent_copy(original, "class A { fun extra() {} }")
        .unwrap();
    assert_eq!(copy.token(), session.token());
    assert_eq!(copy.file(id).unwrap().original(), Some(original));
    // Handles of the original stay usable in the copy
    let a = class(&session, "A");
    assert_eq!(a.name(&copy), Name::new("A"));
}

#[test]
fn test_unknown_original_is_an_error() {
    let (_host, session) = session_from_sources(&[("a.kt", "class A")]);
    let missing = semfacade::base::FileId::new(42);
    assert!(session.create_context_dependent_copy(missing, "class B").is_err());
}
