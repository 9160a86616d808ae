//! Symbol provider: declaration nodes, class ids and names to symbols.
//!
//! Typed lookups fault when handed a node of the wrong shape; that is a
//! caller bug. Lookups by id or name return `None` / nothing when the
//! declaration does not exist.

use std::rc::Rc;

use crate::base::{ClassId, FileId, FqName, Name};
use crate::hir::{AnalysisSession, Symbol, SymbolKind, kind_for_node};
use crate::model::ResolvedTarget;
use crate::model::lower::is_object_literal;
use crate::parser::ast::declaration_name;
use crate::parser::{SyntaxKind, SyntaxNode};
use crate::syntax::ParsedFile;

/// The file `id` of `session`; an unknown id is a caller bug.
#[track_caller]
pub(crate) fn parsed_file(session: &AnalysisSession, id: FileId) -> Rc<ParsedFile> {
    session.assert_valid();
    match session.file(id) {
        Some(file) => file.clone(),
        None => panic!("{id:?} is not part of analysis session {}", session.token().id()),
    }
}

#[track_caller]
fn expect_kind(node: &SyntaxNode, kinds: &[SyntaxKind], what: &str) {
    if !kinds.contains(&node.kind()) {
        panic!("expected {what}, got a {:?} node", node.kind());
    }
}

#[track_caller]
fn typed(session: &AnalysisSession, file: FileId, node: &SyntaxNode, kind: SymbolKind) -> Symbol {
    let file = parsed_file(session, file);
    session.source_symbol(&file, node, kind)
}

/// Symbol of any declaration node, `None` for other nodes.
pub fn symbol_for_declaration(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Option<Symbol> {
    let file = parsed_file(session, file);
    session.declaration_symbol(&file, node)
}

pub fn file_symbol(session: &AnalysisSession, file: FileId) -> Symbol {
    let file = parsed_file(session, file);
    session.file_symbol(&file)
}

/// Package symbol, `None` when nothing declares the package.
pub fn package_symbol(session: &AnalysisSession, fq_name: &FqName) -> Option<Symbol> {
    session.assert_valid();
    session
        .package_exists(fq_name)
        .then(|| session.package_symbol(fq_name.clone()))
}

pub fn root_package_symbol(session: &AnalysisSession) -> Symbol {
    session.assert_valid();
    session.package_symbol(FqName::root())
}

#[track_caller]
pub fn parameter_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(node, &[SyntaxKind::VALUE_PARAMETER], "a value parameter");
    typed(session, file, node, SymbolKind::ValueParameter)
}

/// Functions, lambdas, constructors and accessors. An unnamed `fun` is an
/// anonymous function.
#[track_caller]
pub fn function_like_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(
        node,
        &[
            SyntaxKind::FUN,
            SyntaxKind::LAMBDA_EXPR,
            SyntaxKind::PRIMARY_CONSTRUCTOR,
            SyntaxKind::SECONDARY_CONSTRUCTOR,
            SyntaxKind::PROPERTY_ACCESSOR,
        ],
        "a function-like declaration",
    );
    let kind = kind_for_node(node).unwrap_or(SymbolKind::Function);
    typed(session, file, node, kind)
}

#[track_caller]
pub fn constructor_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(
        node,
        &[SyntaxKind::PRIMARY_CONSTRUCTOR, SyntaxKind::SECONDARY_CONSTRUCTOR],
        "a constructor",
    );
    typed(session, file, node, SymbolKind::Constructor)
}

#[track_caller]
pub fn type_parameter_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(node, &[SyntaxKind::TYPE_PARAMETER], "a type parameter");
    typed(session, file, node, SymbolKind::TypeParameter)
}

#[track_caller]
pub fn type_alias_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(node, &[SyntaxKind::TYPE_ALIAS], "a type alias");
    typed(session, file, node, SymbolKind::TypeAlias)
}

#[track_caller]
pub fn enum_entry_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(node, &[SyntaxKind::ENUM_ENTRY], "an enum entry");
    typed(session, file, node, SymbolKind::EnumEntry)
}

/// A lambda, or a `fun` without a name used as a value.
#[track_caller]
pub fn anonymous_function_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    let anonymous = match node.kind() {
        SyntaxKind::LAMBDA_EXPR => true,
        SyntaxKind::FUN => declaration_name(node).is_none(),
        _ => false,
    };
    if !anonymous {
        panic!("expected an anonymous function, got a {:?} node", node.kind());
    }
    typed(session, file, node, SymbolKind::AnonymousFunction)
}

/// Local variable or member/top-level property.
#[track_caller]
pub fn variable_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(node, &[SyntaxKind::PROPERTY], "a property");
    let kind = kind_for_node(node).unwrap_or(SymbolKind::Property);
    typed(session, file, node, kind)
}

/// The object of an `object : T {}` expression. Accepts the literal
/// expression or its declaration.
#[track_caller]
pub fn anonymous_object_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    let declaration = if node.kind() == SyntaxKind::OBJECT_LITERAL {
        node.children().find(is_object_literal)
    } else {
        Some(node.clone()).filter(is_object_literal)
    };
    match declaration {
        Some(declaration) => typed(session, file, &declaration, SymbolKind::AnonymousObject),
        None => panic!("expected an object literal, got a {:?} node", node.kind()),
    }
}

/// Class, object, enum entry or anonymous object.
#[track_caller]
pub fn class_or_object_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(
        node,
        &[SyntaxKind::CLASS, SyntaxKind::OBJECT_DECLARATION, SyntaxKind::ENUM_ENTRY],
        "a class or object",
    );
    let kind = kind_for_node(node).unwrap_or(SymbolKind::Class);
    typed(session, file, node, kind)
}

/// Like [`class_or_object_symbol`], but `None` for enum entries and
/// anonymous objects.
#[track_caller]
pub fn named_class_or_object_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Option<Symbol> {
    let symbol = class_or_object_symbol(session, file, node);
    (symbol.kind(session) == SymbolKind::Class).then_some(symbol)
}

#[track_caller]
pub fn property_accessor_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(node, &[SyntaxKind::PROPERTY_ACCESSOR], "a property accessor");
    let kind = kind_for_node(node).unwrap_or(SymbolKind::Getter);
    typed(session, file, node, kind)
}

#[track_caller]
pub fn class_initializer_symbol(session: &AnalysisSession, file: FileId, node: &SyntaxNode) -> Symbol {
    expect_kind(node, &[SyntaxKind::CLASS_INITIALIZER], "an init block");
    typed(session, file, node, SymbolKind::ClassInitializer)
}

/// Class, object or enum entry with `class_id`, source first, then the
/// module graph.
pub fn class_symbol_by_id(session: &AnalysisSession, class_id: &ClassId) -> Option<Symbol> {
    session.assert_valid();
    session.class_symbol(class_id)
}

pub fn type_alias_symbol_by_id(session: &AnalysisSession, class_id: &ClassId) -> Option<Symbol> {
    session.assert_valid();
    session.type_alias_symbol(class_id)
}

/// Top-level functions and properties called `name` in `package`, in the
/// order the package scope produces them.
pub fn top_level_callables(
    session: &AnalysisSession,
    package: &FqName,
    name: &Name,
) -> impl Iterator<Item = Symbol> + use<> {
    session.assert_valid();
    session
        .package_scope(package)
        .symbols_named(session, name)
        .into_iter()
        .filter(|s| s.raw_kind().is_callable())
}

/// Symbol a resolved reference points at.
pub(crate) fn target_symbol(session: &AnalysisSession, target: &ResolvedTarget) -> Option<Symbol> {
    match target {
        ResolvedTarget::Source(source) => {
            let file = session.file(source.file)?.clone();
            let node = source.ptr.to_node(file.root())?;
            session.declaration_symbol(&file, &node)
        }
        ResolvedTarget::Record(record) => Some(session.record_symbol(record, None)),
        ResolvedTarget::Package(fq_name) => Some(session.package_symbol(fq_name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::testing::session_with;

    fn find(session: &AnalysisSession, kind: SyntaxKind, nth: usize) -> SyntaxNode {
        session.files()[0]
            .root()
            .descendants()
            .filter(|n| n.kind() == kind)
            .nth(nth)
            .unwrap()
    }

    #[test]
    fn test_unnamed_fun_is_anonymous_function() {
        let session = session_with(&[("a.kt", "fun named() { val f = fun(x: Int) { } }")]);
        let file = session.files()[0].id();
        let named = function_like_symbol(&session, file, &find(&session, SyntaxKind::FUN, 0));
        let unnamed = function_like_symbol(&session, file, &find(&session, SyntaxKind::FUN, 1));
        assert_eq!(named.kind(&session), SymbolKind::Function);
        assert_eq!(unnamed.kind(&session), SymbolKind::AnonymousFunction);
    }

    #[test]
    fn test_variable_symbol_local_vs_member() {
        let session = session_with(&[("a.kt", "class A { val m = 1\n fun f() { val l = 2 } }")]);
        let file = session.files()[0].id();
        let member = variable_symbol(&session, file, &find(&session, SyntaxKind::PROPERTY, 0));
        let local = variable_symbol(&session, file, &find(&session, SyntaxKind::PROPERTY, 1));
        assert_eq!(member.kind(&session), SymbolKind::Property);
        assert_eq!(local.kind(&session), SymbolKind::LocalVariable);
    }

    #[test]
    fn test_named_class_or_object_excludes_enum_entries() {
        let session = session_with(&[("a.kt", "enum class E { A }")]);
        let file = session.files()[0].id();
        assert!(named_class_or_object_symbol(&session, file, &find(&session, SyntaxKind::CLASS, 0)).is_some());
        assert!(named_class_or_object_symbol(&session, file, &find(&session, SyntaxKind::ENUM_ENTRY, 0)).is_none());
    }

    #[test]
    #[should_panic(expected = "expected a type alias")]
    fn test_wrong_node_shape_faults() {
        let session = session_with(&[("a.kt", "class A")]);
        let file = session.files()[0].id();
        type_alias_symbol(&session, file, &find(&session, SyntaxKind::CLASS, 0));
    }

    #[test]
    fn test_top_level_callables_by_name() {
        let session = session_with(&[("a.kt", "package p\nfun f() {}\nfun f(x: Int) {}\nval f = 1\nfun g() {}")]);
        let found: Vec<_> = top_level_callables(&session, &FqName::new("p"), &Name::new("f")).collect();
        assert_eq!(found.len(), 3);
        assert!(top_level_callables(&session, &FqName::new("p"), &Name::new("missing")).next().is_none());
    }
}
