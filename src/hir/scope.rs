//! Scopes: named, owned, session-bound collections of symbols.
//!
//! A leaf scope holds a producer that runs the first time the scope is
//! queried; its result is indexed by name in production order and kept for
//! the life of the scope. A composite scope is an ordered list of scopes:
//! a name lookup returns the hits of the first sub-scope that has any, so an
//! inner scope shadows an outer one. Names are never merged across
//! sub-scopes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use tracing::trace;

use super::session::AnalysisSession;
use super::symbols::{Symbol, SymbolKind};
use super::token::ValidityToken;
use crate::base::Name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Everything callable on an instance, inherited members included
    Member,
    /// Only what the class itself declares
    DeclaredMember,
    /// Members produced by interface delegation
    Delegated,
    /// Static members and nested classifiers
    Static,
    File,
    /// Union of all fragments contributing to a package
    Package,
    /// Block, function and class levels of a lexical chain
    Lexical,
    /// Explicit and star imports of a file
    Import,
    DefaultImport,
    Composite,
    /// Members of a type (class type, or the bounds of a type parameter)
    Type,
}

type Producer = Box<dyn FnOnce(&AnalysisSession) -> Vec<Symbol>>;

enum ScopeBody {
    Leaf {
        pending: RefCell<Option<Producer>>,
        members: OnceCell<IndexMap<Name, Vec<Symbol>>>,
    },
    Composite(Vec<Scope>),
}

struct ScopeData {
    token: ValidityToken,
    kind: ScopeKind,
    owner: Option<Symbol>,
    body: ScopeBody,
}

#[derive(Clone)]
pub struct Scope(Rc<ScopeData>);

impl Scope {
    /// A scope whose symbols are produced on first use.
    pub(crate) fn lazy(
        session: &AnalysisSession,
        kind: ScopeKind,
        owner: Option<Symbol>,
        producer: impl FnOnce(&AnalysisSession) -> Vec<Symbol> + 'static,
    ) -> Self {
        Scope(Rc::new(ScopeData {
            token: session.token().clone(),
            kind,
            owner,
            body: ScopeBody::Leaf {
                pending: RefCell::new(Some(Box::new(producer))),
                members: OnceCell::new(),
            },
        }))
    }

    /// A scope over symbols already at hand.
    pub fn from_symbols(
        session: &AnalysisSession,
        kind: ScopeKind,
        owner: Option<Symbol>,
        symbols: Vec<Symbol>,
    ) -> Self {
        Self::lazy(session, kind, owner, move |_| symbols)
    }

    /// A scope whose symbols are known under the given names, which may
    /// differ from their declared ones (import aliases).
    pub(crate) fn from_named(
        session: &AnalysisSession,
        kind: ScopeKind,
        owner: Option<Symbol>,
        entries: Vec<(Name, Symbol)>,
    ) -> Self {
        let mut indexed: IndexMap<Name, Vec<Symbol>> = IndexMap::new();
        for (name, symbol) in entries {
            indexed.entry(name).or_default().push(symbol);
        }
        Scope(Rc::new(ScopeData {
            token: session.token().clone(),
            kind,
            owner,
            body: ScopeBody::Leaf {
                pending: RefCell::new(None),
                members: OnceCell::from(indexed),
            },
        }))
    }

    pub fn empty(session: &AnalysisSession, kind: ScopeKind) -> Self {
        Self::from_symbols(session, kind, None, Vec::new())
    }

    /// Ordered union of `scopes`; earlier scopes shadow later ones.
    pub fn composite(session: &AnalysisSession, owner: Option<Symbol>, scopes: Vec<Scope>) -> Self {
        for scope in &scopes {
            session.assert_accessible(&scope.0.token);
        }
        Scope(Rc::new(ScopeData {
            token: session.token().clone(),
            kind: ScopeKind::Composite,
            owner,
            body: ScopeBody::Composite(scopes),
        }))
    }

    pub fn token(&self) -> &ValidityToken {
        &self.0.token
    }

    pub fn kind(&self, session: &AnalysisSession) -> ScopeKind {
        session.assert_accessible(&self.0.token);
        self.0.kind
    }

    pub fn owner(&self, session: &AnalysisSession) -> Option<Symbol> {
        session.assert_accessible(&self.0.token);
        self.0.owner.clone()
    }

    /// Sub-scopes of a composite scope.
    pub fn sub_scopes(&self, session: &AnalysisSession) -> &[Scope] {
        session.assert_accessible(&self.0.token);
        match &self.0.body {
            ScopeBody::Composite(scopes) => scopes,
            ScopeBody::Leaf { .. } => &[],
        }
    }

    /// Every symbol, in production order (sub-scope order for composites).
    pub fn symbols(&self, session: &AnalysisSession) -> Vec<Symbol> {
        session.assert_accessible(&self.0.token);
        match &self.0.body {
            ScopeBody::Leaf { pending, members } => materialize(session, self.0.kind, pending, members)
                .values()
                .flat_map(|symbols| symbols.iter().cloned())
                .collect(),
            ScopeBody::Composite(scopes) => scopes.iter().flat_map(|s| s.symbols(session)).collect(),
        }
    }

    /// Symbols called `name`; the first sub-scope with any hit wins.
    pub fn symbols_named(&self, session: &AnalysisSession, name: &Name) -> Vec<Symbol> {
        session.assert_accessible(&self.0.token);
        match &self.0.body {
            ScopeBody::Leaf { pending, members } => materialize(session, self.0.kind, pending, members)
                .get(name)
                .cloned()
                .unwrap_or_default(),
            ScopeBody::Composite(scopes) => scopes
                .iter()
                .map(|s| s.symbols_named(session, name))
                .find(|hits| !hits.is_empty())
                .unwrap_or_default(),
        }
    }

    /// Callables (functions, properties, constructors, variables).
    pub fn callables(&self, session: &AnalysisSession) -> Vec<Symbol> {
        self.symbols(session)
            .into_iter()
            .filter(|s| s.raw_kind().is_callable() || s.raw_kind() == SymbolKind::ValueParameter)
            .collect()
    }

    pub fn classifiers(&self, session: &AnalysisSession) -> Vec<Symbol> {
        self.symbols(session)
            .into_iter()
            .filter(|s| s.raw_kind().is_classifier())
            .collect()
    }

    /// Distinct names, first occurrence order.
    pub fn names(&self, session: &AnalysisSession) -> Vec<Name> {
        session.assert_accessible(&self.0.token);
        match &self.0.body {
            ScopeBody::Leaf { pending, members } => materialize(session, self.0.kind, pending, members)
                .keys()
                .cloned()
                .collect(),
            ScopeBody::Composite(scopes) => {
                let mut out: IndexMap<Name, ()> = IndexMap::new();
                for scope in scopes {
                    for name in scope.names(session) {
                        out.entry(name).or_insert(());
                    }
                }
                out.into_keys().collect()
            }
        }
    }

    pub fn contains(&self, session: &AnalysisSession, name: &Name) -> bool {
        !self.symbols_named(session, name).is_empty()
    }

    pub fn is_empty(&self, session: &AnalysisSession) -> bool {
        self.symbols(session).is_empty()
    }
}

fn materialize<'a>(
    session: &AnalysisSession,
    kind: ScopeKind,
    pending: &RefCell<Option<Producer>>,
    members: &'a OnceCell<IndexMap<Name, Vec<Symbol>>>,
) -> &'a IndexMap<Name, Vec<Symbol>> {
    members.get_or_init(|| {
        let producer = pending.borrow_mut().take();
        let symbols = producer.map(|p| p(session)).unwrap_or_default();
        let mut indexed: IndexMap<Name, Vec<Symbol>> = IndexMap::new();
        for symbol in symbols {
            indexed.entry(symbol.raw_name(session)).or_default().push(symbol);
        }
        trace!(?kind, names = indexed.len(), "scope materialized");
        indexed
    })
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("kind", &self.0.kind)
            .field("owner", &self.0.owner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FqName;
    use crate::hir::testing::session_with;

    #[test]
    fn test_composite_inner_scope_shadows_outer() {
        let session = session_with(&[]);
        let inner_x = session.package_symbol(FqName::new("inner"));
        let outer_x = session.package_symbol(FqName::new("outer"));
        let outer_y = session.package_symbol(FqName::new("other"));
        let inner = Scope::from_named(&session, ScopeKind::Lexical, None, vec![(Name::new("x"), inner_x.clone())]);
        let outer = Scope::from_named(
            &session,
            ScopeKind::File,
            None,
            vec![(Name::new("x"), outer_x), (Name::new("y"), outer_y.clone())],
        );
        let composite = Scope::composite(&session, None, vec![inner, outer]);
        assert_eq!(composite.symbols_named(&session, &Name::new("x")), vec![inner_x]);
        assert_eq!(composite.symbols_named(&session, &Name::new("y")), vec![outer_y]);
        assert_eq!(composite.names(&session), vec![Name::new("x"), Name::new("y")]);
        assert_eq!(composite.symbols(&session).len(), 3);
    }

    #[test]
    fn test_lazy_scope_produces_once() {
        let session = session_with(&[]);
        let calls = Rc::new(std::cell::Cell::new(0));
        let counter = calls.clone();
        let scope = Scope::lazy(&session, ScopeKind::Package, None, move |s| {
            counter.set(counter.get() + 1);
            vec![s.package_symbol(FqName::new("a"))]
        });
        assert_eq!(calls.get(), 0);
        assert!(scope.contains(&session, &Name::new("a")));
        assert_eq!(scope.symbols(&session).len(), 1);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    #[should_panic]
    fn test_scope_from_other_session_faults() {
        let first = session_with(&[]);
        let second = session_with(&[]);
        let scope = Scope::empty(&first, ScopeKind::File);
        scope.symbols(&second);
    }
}
