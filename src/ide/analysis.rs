//! AnalysisHost: owns the mutable world and opens analysis sessions.
//!
//! The host holds file texts (as salsa inputs, so unchanged files are not
//! re-parsed), the module graph, the oracle, the type checker and the
//! language settings. Every change invalidates all tokens it has issued;
//! handles from an older session fault on their next use.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::with_builtins(settings);
//! host.set_file_text("src/Main.kt", "fun main() {}");
//!
//! let session = host.analysis_session();
//! let file = session.file_by_path("src/Main.kt").unwrap().id();
//! let scope = scope_provider::file_scope(&session, file);
//! ```

use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use salsa::Setter;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::FileId;
use crate::config::LanguageSettings;
use crate::hir::{AnalysisSession, FileText, RootDatabase, SessionParts, ValidityToken, parse_file};
use crate::model::{HierarchyTypeChecker, InferenceOracle, ModuleGraph, RecordedOracle, TypeChecker, builtins};
use crate::syntax::ParsedFile;

static NEXT_CHECKER_DOMAIN: AtomicU64 = AtomicU64::new(1);

struct HostFile {
    text: FileText,
    /// Decompiled library stub rather than user source
    compiled: bool,
}

/// Owns all mutable state.
///
/// Apply changes via `set_file_text()` and `remove_file()`, then open a
/// consistent snapshot via `analysis_session()`.
pub struct AnalysisHost {
    db: RootDatabase,
    /// Files by path, in insertion order; session file ids follow this order
    files: IndexMap<SmolStr, HostFile>,
    graph: Arc<dyn ModuleGraph>,
    oracle: Arc<dyn InferenceOracle>,
    checker: Arc<dyn TypeChecker>,
    checker_domain: u64,
    settings: Arc<LanguageSettings>,
    /// Tokens of sessions opened since the last change
    issued: Vec<ValidityToken>,
}

impl AnalysisHost {
    pub fn new(
        settings: LanguageSettings,
        graph: Arc<dyn ModuleGraph>,
        oracle: Arc<dyn InferenceOracle>,
        checker: Arc<dyn TypeChecker>,
    ) -> Self {
        Self {
            db: RootDatabase::new(),
            files: IndexMap::new(),
            graph,
            oracle,
            checker,
            checker_domain: NEXT_CHECKER_DOMAIN.fetch_add(1, Ordering::Relaxed),
            settings: Arc::new(settings),
            issued: Vec::new(),
        }
    }

    /// A host over the builtin library with the reference oracle and
    /// checker.
    pub fn with_builtins(settings: LanguageSettings) -> Self {
        Self::with_oracle(settings, Arc::new(RecordedOracle::new()))
    }

    /// Like [`with_builtins`](Self::with_builtins), with a caller-held
    /// oracle to record facts on.
    pub fn with_oracle(settings: LanguageSettings, oracle: Arc<RecordedOracle>) -> Self {
        Self::new(
            settings,
            Arc::new(builtins::builtins()),
            oracle,
            Arc::new(HierarchyTypeChecker::new()),
        )
    }

    /// Add or replace a source file.
    pub fn set_file_text(&mut self, path: &str, text: &str) {
        self.set_text(path, text, false);
    }

    /// Add or replace a decompiled library stub.
    pub fn set_compiled_file_text(&mut self, path: &str, text: &str) {
        self.set_text(path, text, true);
    }

    fn set_text(&mut self, path: &str, text: &str, compiled: bool) {
        match self.files.get_mut(path) {
            Some(file) => {
                file.text.set_text(&mut self.db).to(text.to_string());
                file.compiled = compiled;
            }
            None => {
                let id = FileId::new(self.files.len() as u32);
                let input = FileText::new(&self.db, id, text.to_string());
                self.files.insert(SmolStr::new(path), HostFile { text: input, compiled });
            }
        }
        self.invalidate_sessions("file changed");
    }

    /// Remove a file; `false` if there was none at `path`.
    pub fn remove_file(&mut self, path: &str) -> bool {
        let removed = self.files.shift_remove(path).is_some();
        if removed {
            self.invalidate_sessions("file removed");
        }
        removed
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn settings(&self) -> &LanguageSettings {
        &self.settings
    }

    /// Replace the language settings. Open sessions keep the settings they
    /// were opened with but become invalid.
    pub fn set_settings(&mut self, settings: LanguageSettings) {
        self.settings = Arc::new(settings);
        self.invalidate_sessions("settings changed");
    }

    pub fn set_module_graph(&mut self, graph: Arc<dyn ModuleGraph>) {
        self.graph = graph;
        self.invalidate_sessions("module graph changed");
    }

    /// Open a session over the current files. File ids are positions in
    /// insertion order.
    pub fn analysis_session(&mut self) -> AnalysisSession {
        let files: Vec<Rc<ParsedFile>> = self
            .files
            .iter()
            .enumerate()
            .map(|(index, (path, file))| {
                let parsed = parse_file(&self.db, file.text);
                Rc::new(ParsedFile::new(
                    FileId::new(index as u32),
                    path.clone(),
                    parsed.green,
                    parsed.errors,
                    file.compiled,
                ))
            })
            .collect();
        let token = ValidityToken::new();
        self.issued.retain(ValidityToken::is_valid);
        self.issued.push(token.clone());
        AnalysisSession::new(SessionParts {
            token,
            settings: self.settings.clone(),
            files,
            graph: self.graph.clone(),
            oracle: self.oracle.clone(),
            checker: self.checker.clone(),
            checker_domain: self.checker_domain,
        })
    }

    fn invalidate_sessions(&mut self, reason: &str) {
        if !self.issued.is_empty() {
            debug!(count = self.issued.len(), reason, "invalidating analysis sessions");
        }
        for token in self.issued.drain(..) {
            token.invalidate(reason);
        }
    }
}
