//! Module graph, resolution environment and type checker seams.

use std::sync::Arc;

use smol_str::SmolStr;

use super::records::{ClassRecord, DeclRecord, SemType, TypeAliasRecord};
use crate::base::{ClassId, FqName};
use crate::config::LanguageSettings;
use crate::parser::SyntaxNode;
use crate::syntax::ParsedFile;

/// The declarations one module contributes to one package.
#[derive(Debug, Clone)]
pub struct PackageFragment {
    pub module: SmolStr,
    pub package: FqName,
    pub declarations: Vec<DeclRecord>,
}

/// Compiled declarations of the modules a session depends on.
pub trait ModuleGraph: Send + Sync {
    fn find_class(&self, class_id: &ClassId) -> Option<Arc<ClassRecord>>;

    fn find_type_alias(&self, class_id: &ClassId) -> Option<Arc<TypeAliasRecord>>;

    /// Every fragment contributing to `package`, in module order.
    fn package_fragments(&self, package: &FqName) -> Vec<PackageFragment>;

    /// Declarations that may directly extend `sealed`. When
    /// `allow_different_files` is false only declarations from the sealed
    /// class's own file qualify.
    fn sealed_inheritor_candidates(
        &self,
        sealed: &ClassRecord,
        allow_different_files: bool,
    ) -> Vec<DeclRecord>;

    fn package_exists(&self, package: &FqName) -> bool {
        package.is_root() || !self.package_fragments(package).is_empty()
    }
}

/// Class lookup the type checker needs.
pub trait TypeEnvironment {
    fn class_record(&self, class_id: &ClassId) -> Option<Arc<ClassRecord>>;

    fn type_alias_record(&self, class_id: &ClassId) -> Option<Arc<TypeAliasRecord>>;
}

/// Name resolution available to the oracle while it lowers a file.
pub trait ResolutionEnv: TypeEnvironment {
    /// Resolve a (possibly qualified) classifier name written at `context`.
    fn resolve_classifier(
        &self,
        file: &ParsedFile,
        context: &SyntaxNode,
        segments: &[String],
    ) -> Option<ClassId>;

    fn settings(&self) -> &LanguageSettings;
}

/// The external type checker.
pub trait TypeChecker: Send + Sync {
    fn equal_types(&self, env: &dyn TypeEnvironment, a: &SemType, b: &SemType) -> bool;

    fn is_subtype_of(&self, env: &dyn TypeEnvironment, sub: &SemType, sup: &SemType) -> bool;

    /// Intersection of `types`; never fails, falls back to the least-specific
    /// common supertype when no exact intersection exists.
    fn intersect(&self, env: &dyn TypeEnvironment, types: &[SemType]) -> SemType;

    fn common_supertype(&self, env: &dyn TypeEnvironment, types: &[SemType]) -> SemType;
}
