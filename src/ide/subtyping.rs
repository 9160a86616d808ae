//! Type equality and subtyping over [`KType`]s.
//!
//! Both operands must come from the session's type-checking domain; a type
//! built against a different checker cannot be compared and faults.

use crate::hir::{AnalysisSession, KType};

#[track_caller]
fn assert_comparable(session: &AnalysisSession, a: &KType, b: &KType) {
    session.assert_accessible(a.token());
    session.assert_accessible(b.token());
    for ty in [a, b] {
        if ty.domain() != session.checker_domain() {
            panic!(
                "type {ty} belongs to type-checking domain {}, session uses {}",
                ty.domain(),
                session.checker_domain()
            );
        }
    }
}

#[track_caller]
pub fn is_equal(session: &AnalysisSession, a: &KType, b: &KType) -> bool {
    assert_comparable(session, a, b);
    session
        .type_checker()
        .equal_types(session, a.semantic(session), b.semantic(session))
}

#[track_caller]
pub fn is_subtype_of(session: &AnalysisSession, sub: &KType, sup: &KType) -> bool {
    assert_comparable(session, sub, sup);
    session
        .type_checker()
        .is_subtype_of(session, sub.semantic(session), sup.semantic(session))
}
