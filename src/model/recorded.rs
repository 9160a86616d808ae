//! Reference [`InferenceOracle`]: syntactic lowering plus recorded facts.
//!
//! Declarations are lowered syntactically ([`LowerCtx`]); whatever the
//! lowering cannot know (narrowed types, resolved calls, inferred
//! expression types) is recorded up front by range and replayed when a
//! request covers it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::trace;

use super::lexical::{collect_lexical_scopes, is_scope_key};
use super::lower::LowerCtx;
use super::oracle::{
    AnalysisMode, AnalysisRequest, BindingFacts, ImplicitReceiverCast, InferenceOracle,
    LexicalScopeChain, ResolvedTarget, SmartCastFact,
};
use super::records::{DeclRecord, SemType};
use crate::parser::ast::is_expression;
use crate::parser::{SyntaxKind, SyntaxNode, TextRange};
use crate::syntax::NodePtr;

#[derive(Debug, Clone, Default)]
struct RecordedFacts {
    expression_types: Vec<(TextRange, SemType)>,
    smart_casts: Vec<(TextRange, SmartCastFact)>,
    receiver_casts: Vec<(TextRange, Vec<ImplicitReceiverCast>)>,
    lexical_scopes: Vec<(TextRange, LexicalScopeChain)>,
    references: Vec<(TextRange, ResolvedTarget)>,
    failures: FxHashSet<TextRange>,
}

impl RecordedFacts {
    fn expression_type(&self, range: TextRange) -> Option<SemType> {
        self.expression_types
            .iter()
            .rev()
            .find(|(r, _)| *r == range)
            .map(|(_, ty)| ty.clone())
    }
}

/// Oracle answering from syntax and from facts recorded per file path.
#[derive(Debug, Default)]
pub struct RecordedOracle {
    recorded: RwLock<FxHashMap<SmolStr, RecordedFacts>>,
    analysis_count: AtomicUsize,
}

impl RecordedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `analyze` calls served so far.
    pub fn analysis_count(&self) -> usize {
        self.analysis_count.load(Ordering::Relaxed)
    }

    fn with_file(&self, path: &str, f: impl FnOnce(&mut RecordedFacts)) {
        let mut recorded = self.recorded.write();
        f(recorded.entry(SmolStr::new(path)).or_default());
    }

    /// Type of the expression(s) spanning exactly `range`.
    pub fn record_expression_type(&self, path: &str, range: TextRange, ty: SemType) {
        self.with_file(path, |facts| facts.expression_types.push((range, ty)));
    }

    pub fn record_smart_cast(&self, path: &str, range: TextRange, types: Vec<SemType>, stable: bool) {
        self.with_file(path, |facts| {
            facts.smart_casts.push((range, SmartCastFact { types, stable }))
        });
    }

    pub fn record_implicit_receiver_casts(
        &self,
        path: &str,
        range: TextRange,
        casts: Vec<ImplicitReceiverCast>,
    ) {
        self.with_file(path, |facts| facts.receiver_casts.push((range, casts)));
    }

    /// Replace the syntactic chain at the statement spanning `range`.
    pub fn record_lexical_scope(&self, path: &str, range: TextRange, chain: LexicalScopeChain) {
        self.with_file(path, |facts| facts.lexical_scopes.push((range, chain)));
    }

    pub fn record_reference(&self, path: &str, range: TextRange, target: ResolvedTarget) {
        self.with_file(path, |facts| facts.references.push((range, target)));
    }

    /// Make inference fail for the declaration spanning `range`.
    pub fn record_inference_failure(&self, path: &str, range: TextRange) {
        self.with_file(path, |facts| {
            facts.failures.insert(range);
        });
    }

    pub fn clear(&self) {
        self.recorded.write().clear();
    }
}

/// Nodes under `root` (inclusive) spanning exactly `range`.
fn nodes_at(root: &SyntaxNode, range: TextRange, pred: impl Fn(&SyntaxNode) -> bool) -> Vec<SyntaxNode> {
    if !root.text_range().contains_range(range) {
        return Vec::new();
    }
    root.descendants()
        .filter(|n| n.text_range() == range && pred(n))
        .collect()
}

impl InferenceOracle for RecordedOracle {
    fn analyze(&self, request: &AnalysisRequest<'_>) -> Arc<BindingFacts> {
        self.analysis_count.fetch_add(1, Ordering::Relaxed);
        trace!(
            path = request.file.path(),
            kind = ?request.node.kind(),
            mode = ?request.mode,
            "analyze"
        );
        let recorded = self
            .recorded
            .read()
            .get(request.file.path())
            .cloned()
            .unwrap_or_default();
        let hook = |expr: &SyntaxNode| recorded.expression_type(expr.text_range());
        let ctx = LowerCtx {
            file: request.file,
            env: request.env,
            expression_type: &hook,
        };
        let full = request.mode == AnalysisMode::Full;
        let root = request.node;

        let mut facts = BindingFacts::new();
        let nodes: Vec<SyntaxNode> = if full {
            root.descendants().collect()
        } else {
            vec![root.clone()]
        };
        for node in &nodes {
            let ptr = NodePtr::new(node);
            if node.kind().is_declaration() && node.kind() != SyntaxKind::CLASS_INITIALIZER {
                let record = if recorded.failures.contains(&node.text_range()) {
                    None
                } else {
                    ctx.lower_declaration(node)
                };
                if let Some(DeclRecord::Callable(callable)) = &record {
                    if callable.flags.has_backing_field {
                        facts.mark_backing_field_required(ptr);
                    }
                }
                facts.insert_declaration(ptr, record);
            }
            if is_expression(node.kind()) && node.kind() != SyntaxKind::FUN {
                if let Some(ty) = ctx.expression_type(node) {
                    facts.insert_expression_type(ptr, ty);
                }
            }
        }
        if full {
            collect_lexical_scopes(&ctx, root, &mut facts);
        }

        let expressions = |range| nodes_at(root, range, |n| is_expression(n.kind()));
        for (range, fact) in &recorded.smart_casts {
            for node in expressions(*range) {
                facts.insert_smart_cast(NodePtr::new(&node), fact.clone());
            }
        }
        for (range, casts) in &recorded.receiver_casts {
            for node in expressions(*range) {
                facts.insert_implicit_receiver_casts(NodePtr::new(&node), casts.clone());
            }
        }
        for (range, target) in &recorded.references {
            for node in expressions(*range) {
                facts.insert_reference(NodePtr::new(&node), target.clone());
            }
        }
        if full {
            for (range, chain) in &recorded.lexical_scopes {
                for node in nodes_at(root, *range, is_scope_key) {
                    facts.insert_lexical_scope(NodePtr::new(&node), chain.clone());
                }
            }
        }
        Arc::new(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ClassId, FileId, standard};
    use crate::config::{LanguageSettings, TargetPlatform};
    use crate::model::builtins;
    use crate::model::graph::{ModuleGraph, ResolutionEnv, TypeEnvironment};
    use crate::model::memory::InMemoryModuleGraph;
    use crate::model::records::{ClassRecord, TypeAliasRecord};
    use crate::parser::ast::declaration_name;
    use crate::parser::parse;
    use crate::syntax::ParsedFile;

    struct Env(InMemoryModuleGraph, LanguageSettings);

    impl TypeEnvironment for Env {
        fn class_record(&self, class_id: &ClassId) -> Option<Arc<ClassRecord>> {
            self.0.find_class(class_id)
        }
        fn type_alias_record(&self, class_id: &ClassId) -> Option<Arc<TypeAliasRecord>> {
            self.0.find_type_alias(class_id)
        }
    }

    impl ResolutionEnv for Env {
        fn resolve_classifier(&self, _: &ParsedFile, _: &SyntaxNode, segments: &[String]) -> Option<ClassId> {
            let id = ClassId::parse(&format!("kotlin/{}", segments.join(".")));
            self.0.find_class(&id).map(|_| id)
        }
        fn settings(&self) -> &LanguageSettings {
            &self.1
        }
    }

    fn setup(text: &str) -> (ParsedFile, Env) {
        let parse = parse(text);
        (
            ParsedFile::new(FileId::new(0), "a.kt", parse.green, parse.errors, false),
            Env(builtins::builtins(), LanguageSettings::new("2.0", TargetPlatform::Jvm)),
        )
    }

    fn fun_node(file: &ParsedFile, name: &str) -> SyntaxNode {
        file.root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::FUN && declaration_name(n).as_deref() == Some(name))
            .unwrap()
    }

    fn range_of(text: &str, needle: &str) -> TextRange {
        let start = text.find(needle).unwrap();
        TextRange::new((start as u32).into(), ((start + needle.len()) as u32).into())
    }

    #[test]
    fn test_counts_calls() {
        let (file, env) = setup("fun f() = 1");
        let oracle = RecordedOracle::new();
        let node = fun_node(&file, "f");
        let request = AnalysisRequest { file: &file, node: &node, mode: AnalysisMode::Partial, env: &env };
        oracle.analyze(&request);
        oracle.analyze(&request);
        assert_eq!(oracle.analysis_count(), 2);
    }

    #[test]
    fn test_partial_mode_lowers_only_the_node() {
        let (file, env) = setup("fun f() { val x = 1 }");
        let oracle = RecordedOracle::new();
        let node = fun_node(&file, "f");
        let facts = oracle.analyze(&AnalysisRequest { file: &file, node: &node, mode: AnalysisMode::Partial, env: &env });
        assert_eq!(facts.declaration_count(), 1);
        let full = oracle.analyze(&AnalysisRequest { file: &file, node: &node, mode: AnalysisMode::Full, env: &env });
        assert_eq!(full.declaration_count(), 2);
    }

    #[test]
    fn test_recorded_smart_cast_replayed() {
        let text = "fun f(x: Any) { if (x is String) { x.length } }";
        let (file, env) = setup(text);
        let oracle = RecordedOracle::new();
        let range = range_of(text, "x.length");
        let x_range = TextRange::at(range.start(), 1.into());
        oracle.record_smart_cast("a.kt", x_range, vec![SemType::class(standard::string())], true);
        let node = fun_node(&file, "f");
        let facts = oracle.analyze(&AnalysisRequest { file: &file, node: &node, mode: AnalysisMode::Full, env: &env });
        let x = file
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::NAME_REF && n.text_range() == x_range)
            .unwrap();
        let fact = facts.smart_cast(&NodePtr::new(&x)).unwrap();
        assert_eq!(fact.types, vec![SemType::class(standard::string())]);
    }

    #[test]
    fn test_recorded_failure_yields_none() {
        let text = "val x = compute()";
        let (file, env) = setup(text);
        let oracle = RecordedOracle::new();
        let property = file.declarations()[0].clone();
        oracle.record_inference_failure("a.kt", property.text_range());
        let facts = oracle.analyze(&AnalysisRequest { file: &file, node: &property, mode: AnalysisMode::Partial, env: &env });
        assert!(matches!(facts.declaration(&NodePtr::new(&property)), Some(None)));
    }

    #[test]
    fn test_recorded_expression_type_feeds_lowering() {
        let text = "val x = compute()";
        let (file, env) = setup(text);
        let oracle = RecordedOracle::new();
        oracle.record_expression_type("a.kt", range_of(text, "compute()"), SemType::class(standard::int()));
        let property = file.declarations()[0].clone();
        let facts = oracle.analyze(&AnalysisRequest { file: &file, node: &property, mode: AnalysisMode::Partial, env: &env });
        let record = facts.declaration(&NodePtr::new(&property)).flatten().unwrap();
        assert_eq!(record.as_callable().unwrap().return_type, SemType::class(standard::int()));
    }
}
