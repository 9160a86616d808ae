//! Analysis sessions.
//!
//! A session is one snapshot of the world: parsed files, collaborators and
//! settings, stamped with a [`ValidityToken`]. It memoizes oracle results
//! for the lifetime of that token and nothing else; opening a new session
//! recomputes everything.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, trace};

use super::symbols::{Symbol, SymbolKind};
use super::token::ValidityToken;
use crate::base::{ClassId, FileId, FqName, Name};
use crate::config::LanguageSettings;
use crate::model::lower::{class_id_for, declaration_location, is_object_literal, DeclLocation};
use crate::model::{
    AnalysisMode, AnalysisRequest, BindingFacts, ClassRecord, DeclRecord, InferenceOracle,
    ModuleGraph, ResolutionEnv, TypeAliasRecord, TypeChecker, TypeEnvironment,
};
use crate::parser::ast::declaration_name;
use crate::parser::{SyntaxKind, SyntaxNode, parse};
use crate::syntax::{NodePtr, ParsedFile};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown file: {0:?}")]
    UnknownFile(FileId),
    #[error("no file at path: {0}")]
    UnknownPath(SmolStr),
}

/// Everything a session is built from.
pub struct SessionParts {
    pub token: ValidityToken,
    pub settings: Arc<LanguageSettings>,
    pub files: Vec<Rc<ParsedFile>>,
    pub graph: Arc<dyn ModuleGraph>,
    pub oracle: Arc<dyn InferenceOracle>,
    pub checker: Arc<dyn TypeChecker>,
    /// Identity of the type-checking domain `checker` belongs to
    pub checker_domain: u64,
}

type FactsKey = (FileId, NodePtr);

/// Where each non-anonymous source classifier lives.
#[derive(Default)]
struct SourceIndex {
    classes: FxHashMap<ClassId, FactsKey>,
    aliases: FxHashMap<ClassId, FactsKey>,
    packages: IndexMap<FqName, Vec<FileId>>,
}

#[derive(Default)]
struct SessionCaches {
    facts: FxHashMap<FactsKey, (AnalysisMode, Arc<BindingFacts>)>,
    in_progress: FxHashSet<FactsKey>,
    symbols: FxHashMap<(FileId, NodePtr, SymbolKind), Symbol>,
}

pub struct AnalysisSession {
    token: ValidityToken,
    settings: Arc<LanguageSettings>,
    files: Vec<Rc<ParsedFile>>,
    paths: FxHashMap<SmolStr, FileId>,
    graph: Arc<dyn ModuleGraph>,
    oracle: Arc<dyn InferenceOracle>,
    checker: Arc<dyn TypeChecker>,
    checker_domain: u64,
    index: OnceCell<SourceIndex>,
    caches: RefCell<SessionCaches>,
}

impl AnalysisSession {
    pub(crate) fn new(parts: SessionParts) -> Self {
        let mut paths = FxHashMap::default();
        for file in &parts.files {
            if file.original().is_none() {
                paths.insert(SmolStr::new(file.path()), file.id());
            }
        }
        debug!(token = parts.token.id(), files = parts.files.len(), "analysis session opened");
        Self {
            token: parts.token,
            settings: parts.settings,
            files: parts.files,
            paths,
            graph: parts.graph,
            oracle: parts.oracle,
            checker: parts.checker,
            checker_domain: parts.checker_domain,
            index: OnceCell::new(),
            caches: RefCell::new(SessionCaches::default()),
        }
    }

    pub fn token(&self) -> &ValidityToken {
        &self.token
    }

    pub fn is_valid(&self) -> bool {
        self.token.is_valid()
    }

    /// Fault unless `handle` belongs to this (still valid) session.
    #[track_caller]
    pub fn assert_accessible(&self, handle: &ValidityToken) {
        self.token.assert_accessible(handle);
    }

    /// Fault if the session itself was invalidated.
    #[track_caller]
    pub fn assert_valid(&self) {
        self.token.assert_accessible(&self.token);
    }

    /// Invalidate the token; every handle of this session faults from now on.
    pub fn close(&self) {
        debug!(token = self.token.id(), "analysis session closed");
        self.token.invalidate("session closed");
    }

    pub fn language_settings(&self) -> &LanguageSettings {
        &self.settings
    }

    pub fn files(&self) -> &[Rc<ParsedFile>] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&Rc<ParsedFile>> {
        self.files.get(id.index())
    }

    /// The (non-copy) file at `path`.
    pub fn file_by_path(&self, path: &str) -> Option<&Rc<ParsedFile>> {
        self.paths.get(path).and_then(|id| self.file(*id))
    }

    pub fn module_graph(&self) -> &dyn ModuleGraph {
        self.graph.as_ref()
    }

    pub fn type_checker(&self) -> &dyn TypeChecker {
        self.checker.as_ref()
    }

    pub fn checker_domain(&self) -> u64 {
        self.checker_domain
    }

    /// A session over the same snapshot that also owns a re-parsed copy of
    /// `original` with `fake_text`. Shares this session's token.
    pub fn create_context_dependent_copy(
        &self,
        original: FileId,
        fake_text: &str,
    ) -> Result<(AnalysisSession, FileId), SessionError> {
        self.assert_valid();
        let source = self.file(original).ok_or(SessionError::UnknownFile(original))?;
        let parse = parse(fake_text);
        let id = FileId::new(self.files.len() as u32);
        let copy = ParsedFile::new(id, source.path(), parse.green, parse.errors, source.is_compiled())
            .with_original(original);
        let mut files = self.files.clone();
        files.push(Rc::new(copy));
        debug!(token = self.token.id(), original = ?original, copy = ?id, "context-dependent copy created");
        let session = AnalysisSession::new(SessionParts {
            token: self.token.clone(),
            settings: self.settings.clone(),
            files,
            graph: self.graph.clone(),
            oracle: self.oracle.clone(),
            checker: self.checker.clone(),
            checker_domain: self.checker_domain,
        });
        Ok((session, id))
    }

    // ========================================================================
    // Oracle access
    // ========================================================================

    /// Facts for `node`, memoized per token. A cached full analysis also
    /// serves partial requests.
    pub fn facts(&self, file: &ParsedFile, node: &SyntaxNode, mode: AnalysisMode) -> Arc<BindingFacts> {
        let key = (file.id(), NodePtr::new(node));
        {
            let caches = self.caches.borrow();
            if let Some((cached_mode, facts)) = caches.facts.get(&key) {
                if cached_mode.satisfies(mode) {
                    return facts.clone();
                }
            }
            if caches.in_progress.contains(&key) {
                trace!(kind = ?node.kind(), "re-entrant analysis request, answering empty");
                return Arc::new(BindingFacts::new());
            }
        }
        trace!(path = file.path(), kind = ?node.kind(), ?mode, "facts cache miss");
        self.caches.borrow_mut().in_progress.insert(key);
        let facts = self.oracle.analyze(&AnalysisRequest {
            file,
            node,
            mode,
            env: self,
        });
        let mut caches = self.caches.borrow_mut();
        caches.in_progress.remove(&key);
        caches.facts.insert(key, (mode, facts.clone()));
        facts
    }

    /// The record the oracle produced for a declaration node.
    pub fn declaration_record(&self, file: &ParsedFile, node: &SyntaxNode) -> Option<DeclRecord> {
        let facts = self.facts(file, node, AnalysisMode::Partial);
        facts.declaration(&NodePtr::new(node)).flatten().cloned()
    }

    /// Full facts of the nearest enclosing non-local declaration of `node`.
    pub fn body_facts(&self, file: &ParsedFile, node: &SyntaxNode) -> Option<Arc<BindingFacts>> {
        let container = non_local_container(node)?;
        Some(self.facts(file, &container, AnalysisMode::Full))
    }

    pub(crate) fn cached_symbol(&self, file: FileId, ptr: NodePtr, kind: SymbolKind) -> Option<Symbol> {
        self.caches.borrow().symbols.get(&(file, ptr, kind)).cloned()
    }

    pub(crate) fn cache_symbol(&self, file: FileId, ptr: NodePtr, kind: SymbolKind, symbol: Symbol) {
        self.caches.borrow_mut().symbols.insert((file, ptr, kind), symbol);
    }

    // ========================================================================
    // Source index
    // ========================================================================

    fn index(&self) -> &SourceIndex {
        self.index.get_or_init(|| {
            let replaced: FxHashSet<FileId> = self.files.iter().filter_map(|f| f.original()).collect();
            let mut index = SourceIndex::default();
            for file in &self.files {
                if replaced.contains(&file.id()) {
                    continue;
                }
                index
                    .packages
                    .entry(file.package_fq_name())
                    .or_default()
                    .push(file.id());
                for node in file.root().descendants() {
                    let target = match node.kind() {
                        SyntaxKind::CLASS | SyntaxKind::OBJECT_DECLARATION | SyntaxKind::ENUM_ENTRY => {
                            &mut index.classes
                        }
                        SyntaxKind::TYPE_ALIAS => &mut index.aliases,
                        _ => continue,
                    };
                    if let Some(class_id) = class_id_for(file, &node) {
                        target.entry(class_id).or_insert((file.id(), NodePtr::new(&node)));
                    }
                }
            }
            trace!(classes = index.classes.len(), aliases = index.aliases.len(), "source index built");
            index
        })
    }

    fn locate(&self, key: &FactsKey) -> Option<(Rc<ParsedFile>, SyntaxNode)> {
        let file = self.file(key.0)?.clone();
        let node = key.1.to_node(file.root())?;
        Some((file, node))
    }

    /// Declaration node of a source class.
    pub fn source_class(&self, class_id: &ClassId) -> Option<(Rc<ParsedFile>, SyntaxNode)> {
        self.index().classes.get(class_id).and_then(|key| self.locate(key))
    }

    pub fn source_type_alias(&self, class_id: &ClassId) -> Option<(Rc<ParsedFile>, SyntaxNode)> {
        self.index().aliases.get(class_id).and_then(|key| self.locate(key))
    }

    /// Files declaring `package`, in file order.
    pub fn source_package_files(&self, package: &FqName) -> Vec<Rc<ParsedFile>> {
        self.index()
            .packages
            .get(package)
            .map(|ids| ids.iter().filter_map(|id| self.file(*id).cloned()).collect())
            .unwrap_or_default()
    }

    /// Whether any source file or module declares `package` or a subpackage.
    pub fn package_exists(&self, package: &FqName) -> bool {
        package.is_root()
            || self.index().packages.keys().any(|p| p.starts_with(package))
            || self.graph.package_exists(package)
    }

    fn classifier_exists(&self, class_id: &ClassId) -> bool {
        let index = self.index();
        index.classes.contains_key(class_id)
            || index.aliases.contains_key(class_id)
            || self.graph.find_class(class_id).is_some()
            || self.graph.find_type_alias(class_id).is_some()
    }

    // ========================================================================
    // Classifier resolution
    // ========================================================================

    fn resolve_simple_classifier(&self, file: &ParsedFile, context: &SyntaxNode, name: &str) -> Option<ClassId> {
        let simple = Name::new(name);

        // Local classes declared before the context, innermost block first.
        for block in context.ancestors().filter(|n| n.kind() == SyntaxKind::BLOCK) {
            let local = block.children().find(|n| {
                matches!(n.kind(), SyntaxKind::CLASS | SyntaxKind::OBJECT_DECLARATION)
                    && n.text_range().end() <= context.text_range().start()
                    && declaration_name(n).as_deref() == Some(name)
            });
            if let Some(local) = local {
                return class_id_for(file, &local);
            }
        }

        // Classes nested in the enclosing classes.
        for class in context
            .ancestors()
            .filter(|n| crate::model::lower::is_class_like(n.kind()) && !is_object_literal(n))
        {
            if let Some(outer) = class_id_for(file, &class) {
                let nested = outer.nested(&simple);
                if self.classifier_exists(&nested) {
                    return Some(nested);
                }
                if outer.short_class_name() == simple {
                    return Some(outer);
                }
            }
        }

        let imports = file.imports();
        for import in imports.iter().filter(|i| !i.all_under) {
            let visible = match &import.alias {
                Some(alias) => Some(Name::new(alias)),
                None => import.path.short_name(),
            };
            if visible.as_ref() == Some(&simple) {
                let segments: Vec<&str> = import.path.segments().collect();
                if let Some(found) = self.resolve_qualified(&segments) {
                    return Some(found);
                }
            }
        }

        let same_package = ClassId::top_level(file.package_fq_name(), simple.clone());
        if self.classifier_exists(&same_package) {
            return Some(same_package);
        }

        for import in imports.iter().filter(|i| i.all_under) {
            let candidate = ClassId::top_level(import.path.clone(), simple.clone());
            if self.classifier_exists(&candidate) {
                return Some(candidate);
            }
            let segments: Vec<&str> = import.path.segments().collect();
            if let Some(outer) = self.resolve_qualified(&segments) {
                let nested = outer.nested(&simple);
                if self.classifier_exists(&nested) {
                    return Some(nested);
                }
            }
        }

        for package in &self.settings.default_imports {
            let candidate = ClassId::top_level(package.clone(), simple.clone());
            if self.classifier_exists(&candidate) {
                return Some(candidate);
            }
        }

        let root = ClassId::top_level(FqName::root(), simple);
        self.classifier_exists(&root).then_some(root)
    }

    /// `a.b.C.D` by trying every package/class split, longest package first.
    pub(crate) fn resolve_qualified(&self, segments: &[&str]) -> Option<ClassId> {
        (0..segments.len()).rev().find_map(|split| {
            let package = FqName::from_segments(segments[..split].iter().copied());
            let relative = FqName::from_segments(segments[split..].iter().copied());
            let candidate = ClassId::new(package, relative, false);
            self.classifier_exists(&candidate).then_some(candidate)
        })
    }
}

impl TypeEnvironment for AnalysisSession {
    fn class_record(&self, class_id: &ClassId) -> Option<Arc<ClassRecord>> {
        if let Some((file, node)) = self.source_class(class_id) {
            return match self.declaration_record(&file, &node) {
                Some(DeclRecord::Class(record)) => Some(record),
                _ => None,
            };
        }
        self.graph.find_class(class_id)
    }

    fn type_alias_record(&self, class_id: &ClassId) -> Option<Arc<TypeAliasRecord>> {
        if let Some((file, node)) = self.source_type_alias(class_id) {
            return match self.declaration_record(&file, &node) {
                Some(DeclRecord::TypeAlias(record)) => Some(record),
                _ => None,
            };
        }
        self.graph.find_type_alias(class_id)
    }
}

impl ResolutionEnv for AnalysisSession {
    fn resolve_classifier(&self, file: &ParsedFile, context: &SyntaxNode, segments: &[String]) -> Option<ClassId> {
        let (first, rest) = segments.split_first()?;
        if let Some(head) = self.resolve_simple_classifier(file, context, first) {
            let mut current = head;
            for segment in rest {
                let nested = current.nested(&Name::new(segment));
                if !self.classifier_exists(&nested) {
                    return None;
                }
                current = nested;
            }
            return Some(current);
        }
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        self.resolve_qualified(&segments)
    }

    fn settings(&self) -> &LanguageSettings {
        &self.settings
    }
}

/// Declarations the oracle is asked about as a whole: top-level and member
/// declarations, never locals.
pub fn is_non_local_declaration(node: &SyntaxNode) -> bool {
    matches!(
        node.kind(),
        SyntaxKind::CLASS
            | SyntaxKind::OBJECT_DECLARATION
            | SyntaxKind::ENUM_ENTRY
            | SyntaxKind::FUN
            | SyntaxKind::PROPERTY
            | SyntaxKind::TYPE_ALIAS
            | SyntaxKind::PRIMARY_CONSTRUCTOR
            | SyntaxKind::SECONDARY_CONSTRUCTOR
            | SyntaxKind::CLASS_INITIALIZER
    ) && !is_object_literal(node)
        && declaration_location(node) != DeclLocation::Local
}

/// Nearest non-local declaration containing `node` (inclusive).
pub fn non_local_container(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.ancestors().find(is_non_local_declaration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(texts: &[(&str, &str)]) -> AnalysisSession {
        crate::hir::testing::session_with(texts)
    }

    fn resolve(session: &AnalysisSession, file: usize, segments: &[&str]) -> Option<String> {
        let file = session.files()[file].clone();
        let segments: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        session
            .resolve_classifier(&file, file.root(), &segments)
            .map(|id| id.to_string())
    }

    #[test]
    fn test_resolve_same_package_and_default_imports() {
        let session = session(&[("a/A.kt", "package a\nclass A\nclass B")]);
        assert_eq!(resolve(&session, 0, &["B"]).as_deref(), Some("a/B"));
        assert_eq!(resolve(&session, 0, &["String"]).as_deref(), Some("kotlin/String"));
        assert_eq!(resolve(&session, 0, &["List"]).as_deref(), Some("kotlin/collections/List"));
        assert_eq!(resolve(&session, 0, &["Missing"]), None);
    }

    #[test]
    fn test_resolve_explicit_import_and_alias() {
        let session = session(&[
            ("a/A.kt", "package a\nclass A { class Inner }"),
            ("b/B.kt", "package b\nimport a.A as Renamed\nimport a.A.Inner"),
        ]);
        assert_eq!(resolve(&session, 1, &["Renamed"]).as_deref(), Some("a/A"));
        assert_eq!(resolve(&session, 1, &["Inner"]).as_deref(), Some("a/A.Inner"));
        assert_eq!(resolve(&session, 1, &["a", "A", "Inner"]).as_deref(), Some("a/A.Inner"));
    }

    #[test]
    fn test_facts_are_memoized() {
        let session = session(&[("a.kt", "fun f() = 1")]);
        let file = session.files()[0].clone();
        let fun = file.declarations()[0].clone();
        let first = session.facts(&file, &fun, AnalysisMode::Full);
        let second = session.facts(&file, &fun, AnalysisMode::Partial);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_source_class_record() {
        let session = session(&[("a.kt", "open class Base\nclass Derived : Base()")]);
        let derived = session.class_record(&ClassId::parse("Derived")).unwrap();
        assert_eq!(derived.supertypes[0].to_string(), "Base");
    }

    #[test]
    fn test_context_dependent_copy_shares_token() {
        let session = session(&[("a.kt", "class A")]);
        let (copy, id) = session
            .create_context_dependent_copy(FileId::new(0), "class A { fun added() {} }")
            .unwrap();
        assert_eq!(copy.token(), session.token());
        assert_eq!(copy.file(id).unwrap().original(), Some(FileId::new(0)));
        let (file, node) = copy.source_class(&ClassId::parse("A")).unwrap();
        assert_eq!(file.id(), id);
        assert!(node.text().to_string().contains("added"));
        assert_eq!(
            session.create_context_dependent_copy(FileId::new(7), "").err(),
            Some(SessionError::UnknownFile(FileId::new(7)))
        );
    }
}
