//! Containing-declaration lookup.

use crate::hir::{AnalysisSession, Symbol};

/// The declaration `symbol` is declared in, `None` for top-level
/// declarations, packages and files.
#[track_caller]
pub fn containing_declaration(session: &AnalysisSession, symbol: &Symbol) -> Option<Symbol> {
    symbol.containing_declaration(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ClassId, FqName, Name};
    use crate::hir::SymbolKind;
    use crate::hir::testing::session_with;
    use crate::parser::SyntaxKind;

    fn nth(session: &AnalysisSession, kind: SyntaxKind, n: usize) -> Symbol {
        let file = session.files()[0].clone();
        let node = file.root().descendants().filter(|d| d.kind() == kind).nth(n).unwrap();
        session.declaration_symbol(&file, &node).unwrap()
    }

    #[test]
    fn test_top_level_has_no_container() {
        let session = session_with(&[("a.kt", "class A\nfun f() {}")]);
        assert!(containing_declaration(&session, &nth(&session, SyntaxKind::CLASS, 0)).is_none());
        assert!(containing_declaration(&session, &nth(&session, SyntaxKind::FUN, 0)).is_none());
        let package = session.package_symbol(FqName::root());
        assert!(containing_declaration(&session, &package).is_none());
    }

    #[test]
    fn test_source_members_and_locals() {
        let session = session_with(&[("a.kt", "class A { fun f(p: Int) { val local = p } }")]);
        let f = nth(&session, SyntaxKind::FUN, 0);
        assert_eq!(containing_declaration(&session, &f).unwrap().name(&session), Name::new("A"));
        let p = nth(&session, SyntaxKind::VALUE_PARAMETER, 0);
        assert_eq!(containing_declaration(&session, &p), Some(f.clone()));
        let local = nth(&session, SyntaxKind::PROPERTY, 0);
        assert_eq!(containing_declaration(&session, &local), Some(f));
    }

    #[test]
    fn test_constructor_property_belongs_to_class() {
        let session = session_with(&[("a.kt", "class P(val x: Int)")]);
        let class = session.class_symbol(&ClassId::parse("P")).unwrap();
        let x = session
            .declared_member_scope(&class)
            .symbols_named(&session, &Name::new("x"))
            .remove(0);
        assert_eq!(x.kind(&session), SymbolKind::Property);
        assert_eq!(containing_declaration(&session, &x), Some(class));
    }

    #[test]
    fn test_library_member_container() {
        let session = session_with(&[]);
        let list = session.class_symbol(&ClassId::parse("kotlin/collections/List")).unwrap();
        let scope = session.member_scope(&list);
        let get = scope.symbols_named(&session, &Name::new("get")).remove(0);
        assert_eq!(containing_declaration(&session, &get), Some(list));
        // Inherited members stay with the class that declares them
        let size = scope.symbols_named(&session, &Name::new("size")).remove(0);
        let collection = session.class_symbol(&ClassId::parse("kotlin/collections/Collection"));
        assert_eq!(containing_declaration(&session, &size), collection);
    }

    #[test]
    fn test_backing_field_belongs_to_property() {
        let session = session_with(&[("a.kt", "class A { var x: Int = 0 }")]);
        let x = nth(&session, SyntaxKind::PROPERTY, 0);
        let field = x.backing_field(&session).unwrap();
        assert_eq!(containing_declaration(&session, &field), Some(x));
    }
}
