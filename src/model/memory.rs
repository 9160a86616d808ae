//! In-memory module graph.
//!
//! Holds compiled records registered by the host or by tests. Records keep
//! the module they were registered under; package fragments are grouped per
//! `(module, package)` in registration order.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::trace;

use super::graph::{ModuleGraph, PackageFragment};
use super::records::{CallableRecord, ClassRecord, DeclRecord, TypeAliasRecord};
use crate::base::{ClassId, FqName};

#[derive(Debug, Clone)]
struct SealedCandidate {
    file_name: Option<SmolStr>,
    record: DeclRecord,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryModuleGraph {
    classes: FxHashMap<ClassId, Arc<ClassRecord>>,
    aliases: FxHashMap<ClassId, Arc<TypeAliasRecord>>,
    fragments: IndexMap<FqName, Vec<PackageFragment>>,
    sealed_candidates: FxHashMap<ClassId, Vec<SealedCandidate>>,
}

impl InMemoryModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class and, recursively, its nested classes. Top-level
    /// classes also join their package fragment.
    pub fn add_class(&mut self, module: &str, record: ClassRecord) -> Arc<ClassRecord> {
        let record = Arc::new(record);
        self.insert_class(&record);
        if !record.class_id.is_nested() {
            self.fragment_mut(module, record.class_id.package_fq_name())
                .declarations
                .push(DeclRecord::Class(record.clone()));
        }
        record
    }

    fn insert_class(&mut self, record: &Arc<ClassRecord>) {
        trace!(class_id = %record.class_id, "registering class");
        self.classes.insert(record.class_id.clone(), record.clone());
        for member in record.members.iter().chain(&record.static_members) {
            if let DeclRecord::Class(nested) = member {
                self.insert_class(nested);
            }
        }
    }

    pub fn add_callable(&mut self, module: &str, record: CallableRecord) -> Arc<CallableRecord> {
        let record = Arc::new(record);
        let package = record.callable_id.package.clone();
        self.fragment_mut(module, &package)
            .declarations
            .push(DeclRecord::Callable(record.clone()));
        record
    }

    pub fn add_type_alias(&mut self, module: &str, record: TypeAliasRecord) -> Arc<TypeAliasRecord> {
        let record = Arc::new(record);
        self.aliases.insert(record.class_id.clone(), record.clone());
        let package = record.class_id.package_fq_name().clone();
        self.fragment_mut(module, &package)
            .declarations
            .push(DeclRecord::TypeAlias(record.clone()));
        record
    }

    /// Make `record` a candidate inheritor of `sealed`, declared in
    /// `file_name` when known.
    pub fn add_sealed_candidate(&mut self, sealed: &ClassId, file_name: Option<&str>, record: DeclRecord) {
        self.sealed_candidates
            .entry(sealed.clone())
            .or_default()
            .push(SealedCandidate {
                file_name: file_name.map(SmolStr::new),
                record,
            });
    }

    /// Add every record of `other`, keeping existing entries on conflict.
    pub fn merge(&mut self, other: &InMemoryModuleGraph) {
        for (id, record) in &other.classes {
            self.classes.entry(id.clone()).or_insert_with(|| record.clone());
        }
        for (id, record) in &other.aliases {
            self.aliases.entry(id.clone()).or_insert_with(|| record.clone());
        }
        for (package, fragments) in &other.fragments {
            self.fragments
                .entry(package.clone())
                .or_default()
                .extend(fragments.iter().cloned());
        }
        for (id, candidates) in &other.sealed_candidates {
            self.sealed_candidates
                .entry(id.clone())
                .or_default()
                .extend(candidates.iter().cloned());
        }
    }

    fn fragment_mut(&mut self, module: &str, package: &FqName) -> &mut PackageFragment {
        let fragments = self.fragments.entry(package.clone()).or_default();
        let index = match fragments.iter().position(|f| f.module == module) {
            Some(index) => index,
            None => {
                fragments.push(PackageFragment {
                    module: SmolStr::new(module),
                    package: package.clone(),
                    declarations: Vec::new(),
                });
                fragments.len() - 1
            }
        };
        &mut fragments[index]
    }
}

impl ModuleGraph for InMemoryModuleGraph {
    fn find_class(&self, class_id: &ClassId) -> Option<Arc<ClassRecord>> {
        self.classes.get(class_id).cloned()
    }

    fn find_type_alias(&self, class_id: &ClassId) -> Option<Arc<TypeAliasRecord>> {
        self.aliases.get(class_id).cloned()
    }

    fn package_fragments(&self, package: &FqName) -> Vec<PackageFragment> {
        self.fragments.get(package).cloned().unwrap_or_default()
    }

    fn sealed_inheritor_candidates(
        &self,
        sealed: &ClassRecord,
        allow_different_files: bool,
    ) -> Vec<DeclRecord> {
        let same_file = |file_name: Option<&SmolStr>| {
            allow_different_files
                || sealed.file_name.is_none()
                || file_name == sealed.file_name.as_ref()
        };

        let mut out = Vec::new();
        for subclass in &sealed.sealed_subclasses {
            if let Some(record) = self.find_class(subclass) {
                if same_file(record.file_name.as_ref()) {
                    out.push(DeclRecord::Class(record));
                }
            }
        }
        if let Some(candidates) = self.sealed_candidates.get(&sealed.class_id) {
            out.extend(
                candidates
                    .iter()
                    .filter(|c| same_file(c.file_name.as_ref()))
                    .map(|c| c.record.clone()),
            );
        }
        out
    }

    fn package_exists(&self, package: &FqName) -> bool {
        package.is_root() || self.fragments.keys().any(|p| p.starts_with(package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{CallableId, Name};
    use crate::model::records::{CallableKind, ClassKind, Modality, SemType};

    fn sealed_base() -> ClassRecord {
        let mut record = ClassRecord::new(ClassId::parse("shapes/Shape"), ClassKind::Class);
        record.modality = Modality::Sealed;
        record.file_name = Some(SmolStr::new("Shape.kt"));
        record.sealed_subclasses = vec![ClassId::parse("shapes/Circle")];
        record
    }

    #[test]
    fn test_nested_classes_are_indexed() {
        let mut graph = InMemoryModuleGraph::new();
        let outer_id = ClassId::parse("a/Outer");
        let mut outer = ClassRecord::new(outer_id.clone(), ClassKind::Class);
        outer.members.push(DeclRecord::Class(Arc::new(ClassRecord::new(
            outer_id.nested(&Name::new("Inner")),
            ClassKind::Class,
        ))));
        graph.add_class("lib", outer);

        assert!(graph.find_class(&ClassId::parse("a/Outer.Inner")).is_some());
        let fragments = graph.package_fragments(&FqName::new("a"));
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].declarations.len(), 1);
    }

    #[test]
    fn test_fragments_per_module() {
        let mut graph = InMemoryModuleGraph::new();
        graph.add_class("one", ClassRecord::new(ClassId::parse("p/A"), ClassKind::Class));
        graph.add_callable(
            "two",
            CallableRecord::new(
                CallableKind::Function,
                CallableId::top_level(FqName::new("p"), Name::new("f")),
                SemType::unit(),
            ),
        );
        let modules: Vec<_> = graph
            .package_fragments(&FqName::new("p"))
            .into_iter()
            .map(|f| f.module)
            .collect();
        assert_eq!(modules, vec!["one", "two"]);
        assert!(graph.package_exists(&FqName::root()));
        assert!(!graph.package_exists(&FqName::new("q")));
    }

    #[test]
    fn test_sealed_candidates_respect_file_policy() {
        let mut graph = InMemoryModuleGraph::new();
        let mut circle = ClassRecord::new(ClassId::parse("shapes/Circle"), ClassKind::Class);
        circle.file_name = Some(SmolStr::new("Shape.kt"));
        graph.add_class("lib", circle);
        let mut square = ClassRecord::new(ClassId::parse("shapes/Square"), ClassKind::Class);
        square.file_name = Some(SmolStr::new("Square.kt"));
        let square = graph.add_class("lib", square);
        let base = sealed_base();
        graph.add_sealed_candidate(&base.class_id, Some("Square.kt"), DeclRecord::Class(square));

        assert_eq!(graph.sealed_inheritor_candidates(&base, false).len(), 1);
        assert_eq!(graph.sealed_inheritor_candidates(&base, true).len(), 2);
    }
}
