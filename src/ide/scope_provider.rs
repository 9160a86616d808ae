//! Scope provider: scopes of symbols, types, files and source positions.
//!
//! ## Position scopes
//!
//! ```text
//! position ──► nearest scope key ──► enclosing non-local declaration
//!                                         │ analyze (full)
//!                                         ▼
//!                              lexical chain at the key?
//!                   yes: [frame scopes.., file resolution scope]
//!                   no:  [file resolution scope]
//! ```
//!
//! The file resolution scope is what a name at the top level of the file
//! sees: its own declarations, explicit imports, the rest of its package,
//! star imports, then the default imports.

use tracing::{error, trace};

use super::symbol_provider::{parsed_file, target_symbol};
use crate::base::{FileId, FqName, Name};
use crate::hir::{AnalysisSession, KType, Scope, ScopeKind, Symbol};
use crate::model::lexical::is_scope_key;
use crate::model::{LexicalFrame, LexicalScopeChain, OwnerRef};
use crate::parser::SyntaxNode;
use crate::syntax::{NodePtr, ParsedFile};

/// A receiver available without qualification at some position.
#[derive(Debug, Clone)]
pub struct ImplicitReceiver {
    pub ty: KType,
    /// Declaration that introduces the receiver
    pub owner: Symbol,
}

#[derive(Debug, Clone)]
pub struct ScopeContext {
    pub scope: Scope,
    /// Innermost first
    pub implicit_receivers: Vec<ImplicitReceiver>,
}

#[track_caller]
pub fn member_scope(session: &AnalysisSession, class: &Symbol) -> Scope {
    session.member_scope(class)
}

#[track_caller]
pub fn declared_member_scope(session: &AnalysisSession, class: &Symbol) -> Scope {
    session.declared_member_scope(class)
}

#[track_caller]
pub fn delegated_member_scope(session: &AnalysisSession, class: &Symbol) -> Scope {
    session.delegated_member_scope(class)
}

#[track_caller]
pub fn static_member_scope(session: &AnalysisSession, class: &Symbol) -> Scope {
    session.static_member_scope(class)
}

pub fn type_scope(session: &AnalysisSession, ty: &KType) -> Scope {
    session.type_scope(ty)
}

/// Top-level declarations of a file.
pub fn file_scope(session: &AnalysisSession, file: FileId) -> Scope {
    session.file_scope(&parsed_file(session, file))
}

pub fn package_scope(session: &AnalysisSession, package: &FqName) -> Scope {
    session.assert_valid();
    session.package_scope(package)
}

#[track_caller]
pub fn composite_scope(session: &AnalysisSession, scopes: Vec<Scope>) -> Scope {
    Scope::composite(session, None, scopes)
}

/// Explicit (non-star) imports of a file, under their visible names.
pub fn explicit_import_scope(session: &AnalysisSession, file: FileId) -> Scope {
    explicit_imports(session, &parsed_file(session, file))
}

/// Star imports of a file, in import order.
pub fn star_import_scope(session: &AnalysisSession, file: FileId) -> Scope {
    star_imports(session, &parsed_file(session, file))
}

/// Packages imported into every file by the session's settings.
pub fn default_import_scope(session: &AnalysisSession) -> Scope {
    session.assert_valid();
    let scopes = session
        .language_settings()
        .default_imports
        .iter()
        .map(|package| session.package_scope(package))
        .collect();
    let composite = Scope::composite(session, None, scopes);
    Scope::lazy(session, ScopeKind::DefaultImport, None, move |s| composite.symbols(s))
}

/// Everything visible at the top level of `file`.
pub fn file_resolution_scope(session: &AnalysisSession, file: FileId) -> Scope {
    file_resolution(session, &parsed_file(session, file))
}

fn file_resolution(session: &AnalysisSession, file: &std::rc::Rc<ParsedFile>) -> Scope {
    let scopes = vec![
        session.file_scope(file),
        explicit_imports(session, file),
        session.package_scope(&file.package_fq_name()),
        star_imports(session, file),
        default_import_scope(session),
    ];
    Scope::composite(session, Some(session.file_symbol(file)), scopes)
}

fn explicit_imports(session: &AnalysisSession, file: &ParsedFile) -> Scope {
    let mut entries: Vec<(Name, Symbol)> = Vec::new();
    for import in file.imports().iter().filter(|i| !i.all_under) {
        let Some(short_name) = import.path.short_name() else {
            continue;
        };
        let visible = import.alias.as_ref().map(Name::new).unwrap_or_else(|| short_name.clone());
        let segments: Vec<&str> = import.path.segments().collect();
        if let Some(class_id) = session.resolve_qualified(&segments) {
            let symbol = session
                .class_symbol(&class_id)
                .or_else(|| session.type_alias_symbol(&class_id));
            if let Some(symbol) = symbol {
                entries.push((visible.clone(), symbol));
            }
        }
        if let Some(package) = import.path.parent() {
            let callables = session
                .package_scope(&package)
                .symbols_named(session, &short_name)
                .into_iter()
                .filter(|s| s.raw_kind().is_callable());
            entries.extend(callables.map(|s| (visible.clone(), s)));
        }
    }
    Scope::from_named(session, ScopeKind::Import, None, entries)
}

fn star_imports(session: &AnalysisSession, file: &ParsedFile) -> Scope {
    let scopes = file
        .imports()
        .iter()
        .filter(|i| i.all_under)
        .filter_map(|import| {
            if session.package_exists(&import.path) {
                return Some(session.package_scope(&import.path));
            }
            let segments: Vec<&str> = import.path.segments().collect();
            let class = session.class_symbol(&session.resolve_qualified(&segments)?)?;
            Some(session.static_member_scope(&class))
        })
        .collect();
    let composite = Scope::composite(session, None, scopes);
    Scope::lazy(session, ScopeKind::Import, None, move |s| composite.symbols(s))
}

/// Scopes and implicit receivers at `position`.
///
/// `position` may live in a context-dependent copy (`position_file`) of
/// `original`; the file-level part always comes from `original`.
pub fn scope_context_for_position(
    session: &AnalysisSession,
    original: FileId,
    position_file: FileId,
    position: &SyntaxNode,
) -> ScopeContext {
    let original = parsed_file(session, original);
    let file = parsed_file(session, position_file);
    let file_level = file_resolution(session, &original);

    let Some(chain) = lexical_chain_at(session, &file, position) else {
        trace!(kind = ?position.kind(), "no lexical scope at position, using file scope");
        return ScopeContext {
            scope: Scope::composite(session, None, vec![file_level]),
            implicit_receivers: Vec::new(),
        };
    };
    let mut scopes: Vec<Scope> = chain.frames.iter().map(|frame| frame_scope(session, frame)).collect();
    scopes.push(file_level);
    ScopeContext {
        scope: Scope::composite(session, None, scopes),
        implicit_receivers: implicit_receivers(session, &chain),
    }
}

fn lexical_chain_at(session: &AnalysisSession, file: &ParsedFile, position: &SyntaxNode) -> Option<LexicalScopeChain> {
    let key = position.ancestors().find(is_scope_key)?;
    let facts = session.body_facts(file, &key)?;
    facts.lexical_scope(&NodePtr::new(&key)).cloned()
}

fn frame_scope(session: &AnalysisSession, frame: &LexicalFrame) -> Scope {
    let entries = frame
        .entries
        .iter()
        .filter_map(|entry| Some((entry.name.clone(), target_symbol(session, &entry.target)?)))
        .collect();
    Scope::from_named(session, ScopeKind::Lexical, owner_symbol(session, &frame.owner), entries)
}

pub(crate) fn owner_symbol(session: &AnalysisSession, owner: &OwnerRef) -> Option<Symbol> {
    match owner {
        OwnerRef::Declaration(source) => {
            let file = session.file(source.file)?.clone();
            let node = source.ptr.to_node(file.root())?;
            session.declaration_symbol(&file, &node)
        }
        OwnerRef::Class(class_id) => session.class_symbol(class_id),
        OwnerRef::Unknown(_) => None,
    }
}

fn implicit_receivers(session: &AnalysisSession, chain: &LexicalScopeChain) -> Vec<ImplicitReceiver> {
    let mut out = Vec::new();
    for receiver in chain.frames.iter().filter_map(|f| f.implicit_receiver.as_ref()) {
        let Some(owner) = owner_symbol(session, &receiver.owner) else {
            error!(owner = ?receiver.owner, "implicit receiver owner cannot be mapped to a symbol, skipping it");
            continue;
        };
        out.push(ImplicitReceiver {
            ty: session.ktype(receiver.ty.clone()),
            owner,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::testing::session_with;
    use crate::model::{FrameKind, ReceiverFact, SemType};

    fn node_at(session: &AnalysisSession, file: usize, marker: &str) -> SyntaxNode {
        let file = &session.files()[file];
        let offset = file.root().text().to_string().find(marker).unwrap();
        crate::syntax::find_node_at_offset(file.root(), (offset as u32).into(), |_| true).unwrap()
    }

    fn names(session: &AnalysisSession, scope: &Scope) -> Vec<String> {
        scope.names(session).iter().map(|n| n.as_str().to_string()).collect()
    }

    #[test]
    fn test_position_scope_sees_locals_then_file() {
        let session = session_with(&[(
            "a.kt",
            "class A { val field = 1\n fun f(p: Int) { val local = 1\n marker\n } }\nfun top() {}",
        )]);
        let file = session.files()[0].id();
        let position = node_at(&session, 0, "marker");
        let context = scope_context_for_position(&session, file, file, &position);
        let visible = names(&session, &context.scope);
        let local = visible.iter().position(|n| n == "local").unwrap();
        let top = visible.iter().position(|n| n == "top").unwrap();
        assert!(local < top);
        assert!(visible.contains(&"p".to_string()));
        assert!(visible.contains(&"println".to_string()));
        assert_eq!(context.implicit_receivers.len(), 1);
        assert_eq!(context.implicit_receivers[0].owner.name(&session), "A");
        assert_eq!(context.implicit_receivers[0].ty.to_string(), "A");
    }

    #[test]
    fn test_position_without_lexical_scope_falls_back_to_file() {
        let session = session_with(&[("a.kt", "import kotlin.collections.List as L\nclass A")]);
        let file = session.files()[0].id();
        let position = node_at(&session, 0, "class");
        let context = scope_context_for_position(&session, file, file, &position);
        assert!(context.implicit_receivers.is_empty());
        assert_eq!(context.scope.sub_scopes(&session).len(), 1);
        assert!(context.scope.contains(&session, &Name::new("A")));
        assert!(context.scope.contains(&session, &Name::new("L")));
    }

    #[test]
    fn test_position_in_context_dependent_copy() {
        let session = session_with(&[("a.kt", "fun f() { }")]);
        let original = session.files()[0].id();
        let (copy, copy_id) = session
            .create_context_dependent_copy(original, "fun f() { val added = 1\n marker }")
            .unwrap();
        let file = copy.file(copy_id).unwrap().clone();
        let offset = file.root().text().to_string().find("marker").unwrap();
        let position = crate::syntax::find_node_at_offset(file.root(), (offset as u32).into(), |_| true).unwrap();
        let context = scope_context_for_position(&copy, original, copy_id, &position);
        assert!(context.scope.contains(&copy, &Name::new("added")));
    }

    #[test]
    fn test_unknown_receiver_owner_is_skipped() {
        let session = session_with(&[("a.kt", "class A")]);
        let chain = LexicalScopeChain {
            frames: vec![LexicalFrame {
                kind: FrameKind::Class,
                owner: OwnerRef::Unknown("synthetic".into()),
                entries: Vec::new(),
                implicit_receiver: Some(ReceiverFact {
                    ty: SemType::any(),
                    owner: OwnerRef::Unknown("synthetic".into()),
                }),
            }],
        };
        assert!(implicit_receivers(&session, &chain).is_empty());
    }

    #[test]
    fn test_star_import_of_package() {
        let session = session_with(&[
            ("a/A.kt", "package a\nclass Imported"),
            ("b/B.kt", "package b\nimport a.*\nclass B"),
        ]);
        let scope = star_import_scope(&session, session.files()[1].id());
        assert_eq!(names(&session, &scope), vec!["Imported"]);
    }
}
