//! What a symbol can tell about itself.
//!
//! Every accessor takes the session it is asked in and faults if the symbol
//! belongs to another (or an invalidated) one. Kinds that lack a capability
//! answer `None`, an empty list or `false`; asking a package or a file for a
//! type is a caller bug.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Backing, Symbol, SymbolKind};
use crate::base::{CallableId, ClassId, Name};
use crate::hir::session::AnalysisSession;
use crate::hir::types::KType;
use crate::model::lower::{class_id_for, decl_name, declaration_location, DeclLocation};
use crate::model::{
    AnnotationRecord, CallableKind, CallableRecord, ClassFlags, ClassKind, ConstantValue,
    DeclRecord, Modality, SemType, SymbolOrigin, Variance, Visibility,
};
use crate::parser::ast::{AstNode, Property};
use crate::parser::{SyntaxKind, SyntaxNode};

/// Where a declaration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolLocation {
    TopLevel,
    ClassMember,
    Local,
    /// Property accessors
    Accessor,
}

impl Symbol {
    pub fn kind(&self, session: &AnalysisSession) -> SymbolKind {
        self.check(session);
        self.raw_kind()
    }

    pub fn name(&self, session: &AnalysisSession) -> Name {
        self.check(session);
        self.raw_name(session)
    }

    pub(crate) fn raw_name(&self, session: &AnalysisSession) -> Name {
        match self.backing() {
            Backing::Source { node, .. } => decl_name(node),
            Backing::Metadata { record, .. } => match (self.raw_kind(), record) {
                (SymbolKind::Getter | SymbolKind::Setter, DeclRecord::Callable(accessor)) => {
                    accessor_name(self.raw_kind(), accessor.name())
                }
                _ => record.name(),
            },
            Backing::Package(fq_name) => fq_name.short_name().unwrap_or_else(|| Name::new("<root>")),
            Backing::File(file) => Name::new(file.file_name()),
            Backing::BackingField { .. } => Name::field(),
            Backing::DefaultAccessor { property } => {
                accessor_name(self.raw_kind(), &property.raw_name(session))
            }
        }
    }

    pub fn location(&self, session: &AnalysisSession) -> SymbolLocation {
        self.check(session);
        self.raw_location(session)
    }

    fn raw_location(&self, session: &AnalysisSession) -> SymbolLocation {
        match self.raw_kind() {
            SymbolKind::Package | SymbolKind::File => return SymbolLocation::TopLevel,
            SymbolKind::Getter | SymbolKind::Setter => return SymbolLocation::Accessor,
            SymbolKind::ValueParameter
            | SymbolKind::TypeParameter
            | SymbolKind::AnonymousFunction
            | SymbolKind::AnonymousObject
            | SymbolKind::LocalVariable => return SymbolLocation::Local,
            _ => {}
        }
        match self.backing() {
            Backing::Source { node, .. } => match declaration_location(node) {
                DeclLocation::TopLevel => SymbolLocation::TopLevel,
                DeclLocation::Member(_) => SymbolLocation::ClassMember,
                DeclLocation::Local => SymbolLocation::Local,
            },
            Backing::Metadata { record, .. } => match record {
                DeclRecord::Class(class) if class.class_id.is_local() => SymbolLocation::Local,
                DeclRecord::Class(class) if class.class_id.is_nested() => SymbolLocation::ClassMember,
                DeclRecord::TypeAlias(alias) if alias.class_id.is_nested() => SymbolLocation::ClassMember,
                DeclRecord::Callable(callable) if callable.is_local => SymbolLocation::Local,
                DeclRecord::Callable(callable) if callable.callable_id.class_id().is_some() => {
                    SymbolLocation::ClassMember
                }
                _ => SymbolLocation::TopLevel,
            },
            Backing::BackingField { property } => property.raw_location(session),
            _ => SymbolLocation::TopLevel,
        }
    }

    /// Where the declaration comes from; computed once per symbol.
    pub fn origin(&self, session: &AnalysisSession) -> SymbolOrigin {
        self.check(session);
        *self.0.origin.get_or_init(|| self.compute_origin(session))
    }

    fn compute_origin(&self, session: &AnalysisSession) -> SymbolOrigin {
        match self.backing() {
            Backing::Source { file, .. } => match self.record(session) {
                Some(record) => record_origin(&record).unwrap_or(SymbolOrigin::Source),
                None if file.is_compiled() => SymbolOrigin::Library,
                None => SymbolOrigin::Source,
            },
            Backing::Metadata { record, owner } => record_origin(record)
                .or_else(|| owner.as_ref().map(|o| o.compute_origin(session)))
                .unwrap_or(SymbolOrigin::Library),
            Backing::Package(fq_name) => {
                if session.source_package_files(fq_name).is_empty() {
                    SymbolOrigin::Library
                } else {
                    SymbolOrigin::Source
                }
            }
            Backing::File(file) if file.is_compiled() => SymbolOrigin::Library,
            Backing::File(_) => SymbolOrigin::Source,
            Backing::BackingField { .. } => SymbolOrigin::PropertyBackingField,
            Backing::DefaultAccessor { property } => property.compute_origin(session),
        }
    }

    pub fn modality(&self, session: &AnalysisSession) -> Modality {
        self.check(session);
        match self.record(session) {
            Some(DeclRecord::Class(class)) => class.modality,
            Some(DeclRecord::Callable(callable)) => callable.modality,
            _ => Modality::Final,
        }
    }

    pub fn visibility(&self, session: &AnalysisSession) -> Visibility {
        self.check(session);
        if let Backing::BackingField { .. } = self.backing() {
            return Visibility::Private;
        }
        match self.record(session) {
            Some(DeclRecord::Class(class)) => class.visibility,
            Some(DeclRecord::Callable(callable)) => callable.visibility,
            Some(DeclRecord::TypeAlias(alias)) => alias.visibility,
            Some(DeclRecord::TypeParameter(_) | DeclRecord::ValueParameter(_)) => Visibility::Local,
            None => match self.raw_location(session) {
                SymbolLocation::Local => Visibility::Local,
                _ => Visibility::Public,
            },
        }
    }

    /// Class id of a named class, object, enum entry or type alias.
    pub fn class_id(&self, session: &AnalysisSession) -> Option<ClassId> {
        self.check(session);
        if !matches!(
            self.raw_kind(),
            SymbolKind::Class | SymbolKind::EnumEntry | SymbolKind::TypeAlias
        ) {
            return None;
        }
        match self.backing() {
            Backing::Source { file, node, .. } => class_id_for(file, node),
            Backing::Metadata { record, .. } => match record {
                DeclRecord::Class(class) => Some(class.class_id.clone()),
                DeclRecord::TypeAlias(alias) => Some(alias.class_id.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Callable id of a non-local callable.
    pub fn callable_id(&self, session: &AnalysisSession) -> Option<CallableId> {
        self.check(session);
        let callable = self.callable_record(session)?;
        if callable.is_local || callable.kind == CallableKind::AnonymousFunction {
            return None;
        }
        Some(callable.callable_id.clone())
    }

    pub fn class_kind(&self, session: &AnalysisSession) -> Option<ClassKind> {
        self.check(session);
        match self.record(session)? {
            DeclRecord::Class(class) => Some(class.kind),
            _ => None,
        }
    }

    pub fn class_flags(&self, session: &AnalysisSession) -> ClassFlags {
        self.check(session);
        match self.record(session) {
            Some(DeclRecord::Class(class)) => class.flags,
            _ => ClassFlags::default(),
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Declared or inferred type of a callable, variable or parameter. A
    /// failed inference yields an error type.
    #[track_caller]
    pub fn return_type(&self, session: &AnalysisSession) -> KType {
        self.check(session);
        let kind = self.raw_kind();
        if !(kind.is_callable() || kind.is_variable_like()) {
            panic!("{kind:?} symbol has no return type");
        }
        session.ktype(self.raw_return_type(session))
    }

    pub(crate) fn raw_return_type(&self, session: &AnalysisSession) -> SemType {
        if let Backing::BackingField { property } = self.backing() {
            return property.raw_return_type(session);
        }
        match self.record(session) {
            Some(DeclRecord::Callable(callable)) => callable.return_type.clone(),
            Some(DeclRecord::ValueParameter(param)) => param.ty.clone(),
            Some(DeclRecord::Class(entry)) => entry
                .supertypes
                .first()
                .cloned()
                .unwrap_or_else(|| entry.default_type()),
            _ => {
                let name = self.raw_name(session);
                SemType::error(name.as_str(), format!("Cannot infer a type for {name}"))
            }
        }
    }

    /// Extension receiver type.
    pub fn receiver_type(&self, session: &AnalysisSession) -> Option<KType> {
        self.check(session);
        let receiver = self.callable_record(session)?.receiver_type.clone()?;
        Some(session.ktype(receiver))
    }

    pub fn dispatch_receiver_type(&self, session: &AnalysisSession) -> Option<KType> {
        self.check(session);
        let receiver = self.callable_record(session)?.dispatch_receiver.clone()?;
        Some(session.ktype(receiver))
    }

    /// Supertypes of a class, `Any` when none are declared.
    pub fn super_types(&self, session: &AnalysisSession) -> Vec<KType> {
        self.check(session);
        match self.record(session) {
            Some(DeclRecord::Class(class)) => class
                .effective_supertypes()
                .into_iter()
                .map(|ty| session.ktype(ty))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Right-hand side of a type alias.
    pub fn expanded_type(&self, session: &AnalysisSession) -> Option<KType> {
        self.check(session);
        match self.record(session)? {
            DeclRecord::TypeAlias(alias) => Some(session.ktype(alias.expanded.clone())),
            _ => None,
        }
    }

    /// Upper bounds of a type parameter, `Any?` when it declares none.
    pub fn upper_bounds(&self, session: &AnalysisSession) -> Vec<KType> {
        self.check(session);
        match self.record(session) {
            Some(DeclRecord::TypeParameter(param)) if !param.bounds.is_empty() => param
                .bounds
                .iter()
                .map(|b| session.ktype(b.clone()))
                .collect(),
            Some(DeclRecord::TypeParameter(_)) => vec![session.ktype(SemType::nullable_any())],
            _ => Vec::new(),
        }
    }

    pub fn variance(&self, session: &AnalysisSession) -> Variance {
        self.check(session);
        match self.record(session) {
            Some(DeclRecord::TypeParameter(param)) => param.variance,
            _ => Variance::Invariant,
        }
    }

    pub fn is_reified(&self, session: &AnalysisSession) -> bool {
        self.check(session);
        matches!(self.record(session), Some(DeclRecord::TypeParameter(param)) if param.reified)
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Value parameters of a function-like symbol, in declaration order.
    pub fn value_parameters(&self, session: &AnalysisSession) -> Vec<Symbol> {
        self.check(session);
        if !self.raw_kind().is_function_like() {
            return Vec::new();
        }
        if let Some((file, node)) = self.source() {
            let params = parameter_nodes(node, SyntaxKind::VALUE_PARAMETER_LIST, SyntaxKind::VALUE_PARAMETER);
            if !params.is_empty() || self.record(session).is_none() {
                return params
                    .iter()
                    .map(|p| session.source_symbol(file, p, SymbolKind::ValueParameter))
                    .collect();
            }
        }
        let Some(callable) = self.callable_record(session) else {
            return Vec::new();
        };
        callable
            .value_parameters
            .iter()
            .map(|p| session.record_symbol(&DeclRecord::ValueParameter(Arc::new(p.clone())), Some(self)))
            .collect()
    }

    /// Type parameters of a class, callable or type alias.
    pub fn type_parameters(&self, session: &AnalysisSession) -> Vec<Symbol> {
        self.check(session);
        if let Some((file, node)) = self.source() {
            return parameter_nodes(node, SyntaxKind::TYPE_PARAMETER_LIST, SyntaxKind::TYPE_PARAMETER)
                .iter()
                .map(|p| session.source_symbol(file, p, SymbolKind::TypeParameter))
                .collect();
        }
        let params = match self.record(session) {
            Some(DeclRecord::Class(class)) => class.type_parameters.clone(),
            Some(DeclRecord::Callable(callable)) => callable.type_parameters.clone(),
            Some(DeclRecord::TypeAlias(alias)) => alias.type_parameters.clone(),
            _ => Vec::new(),
        };
        params
            .into_iter()
            .map(|p| session.record_symbol(&DeclRecord::TypeParameter(Arc::new(p)), Some(self)))
            .collect()
    }

    pub fn has_default_value(&self, session: &AnalysisSession) -> bool {
        self.check(session);
        matches!(self.record(session), Some(DeclRecord::ValueParameter(p)) if p.has_default)
    }

    pub fn is_vararg(&self, session: &AnalysisSession) -> bool {
        self.check(session);
        matches!(self.record(session), Some(DeclRecord::ValueParameter(p)) if p.is_vararg)
    }

    // ========================================================================
    // Property shape
    // ========================================================================

    pub fn is_val(&self, session: &AnalysisSession) -> bool {
        self.check(session);
        match self.raw_kind() {
            SymbolKind::ValueParameter | SymbolKind::EnumEntry => true,
            _ => self
                .callable_record(session)
                .is_some_and(|c| c.is_property_like() && !c.flags.is_var),
        }
    }

    pub fn is_const(&self, session: &AnalysisSession) -> bool {
        self.flag(session, |c| c.flags.is_const)
    }

    pub fn is_lateinit(&self, session: &AnalysisSession) -> bool {
        self.flag(session, |c| c.flags.is_lateinit)
    }

    pub fn is_delegated(&self, session: &AnalysisSession) -> bool {
        self.flag(session, |c| c.flags.is_delegated)
    }

    pub fn is_override(&self, session: &AnalysisSession) -> bool {
        self.flag(session, |c| c.flags.is_override)
    }

    pub fn is_static(&self, session: &AnalysisSession) -> bool {
        self.flag(session, |c| c.flags.is_static)
    }

    pub fn is_extension(&self, session: &AnalysisSession) -> bool {
        self.flag(session, |c| c.receiver_type.is_some())
    }

    pub fn is_from_primary_constructor(&self, session: &AnalysisSession) -> bool {
        self.flag(session, |c| c.flags.from_primary_constructor)
    }

    /// Whether a constructor is the primary one.
    pub fn is_primary(&self, session: &AnalysisSession) -> bool {
        self.flag(session, |c| c.kind == CallableKind::Constructor { primary: true })
    }

    /// Compile-time constant the property is initialized with.
    pub fn initializer(&self, session: &AnalysisSession) -> Option<ConstantValue> {
        self.check(session);
        self.callable_record(session)?.initializer.clone()
    }

    pub fn getter(&self, session: &AnalysisSession) -> Option<Symbol> {
        self.accessor(session, true)
    }

    pub fn setter(&self, session: &AnalysisSession) -> Option<Symbol> {
        self.accessor(session, false)
    }

    fn accessor(&self, session: &AnalysisSession, getter: bool) -> Option<Symbol> {
        self.check(session);
        if !matches!(
            self.raw_kind(),
            SymbolKind::Property | SymbolKind::SyntheticJavaProperty
        ) {
            return None;
        }
        let callable = self.callable_record(session)?;
        let record = if getter { &callable.getter } else { &callable.setter };
        let record = record.as_ref()?;
        if let Some((file, node)) = self.source() {
            let explicit = Property::cast(node.clone())
                .and_then(|p| if getter { p.getter() } else { p.setter() });
            if let Some(explicit) = explicit {
                let kind = if getter { SymbolKind::Getter } else { SymbolKind::Setter };
                return Some(session.source_symbol(file, explicit.syntax(), kind));
            }
        }
        if let Some(source) = record.source {
            let kind = if getter { SymbolKind::Getter } else { SymbolKind::Setter };
            if let Some(symbol) = session.source_ref_symbol(source, kind) {
                return Some(symbol);
            }
        }
        Some(session.default_accessor_symbol(self, getter))
    }

    pub fn backing_field(&self, session: &AnalysisSession) -> Option<Symbol> {
        self.check(session);
        if self.raw_kind() != SymbolKind::Property {
            return None;
        }
        let callable = self.callable_record(session)?;
        callable
            .flags
            .has_backing_field
            .then(|| session.backing_field_symbol(self))
    }

    /// Property an accessor or backing field belongs to.
    pub fn owning_property(&self, session: &AnalysisSession) -> Option<Symbol> {
        self.check(session);
        match self.backing() {
            Backing::BackingField { property } | Backing::DefaultAccessor { property } => {
                Some(property.clone())
            }
            Backing::Source { file, node, .. } if node.kind() == SyntaxKind::PROPERTY_ACCESSOR => {
                let property = node.parent()?;
                session.declaration_symbol(file, &property)
            }
            _ => None,
        }
    }

    /// The declaration this symbol is declared in. `None` for top-level
    /// declarations, packages and files.
    pub fn containing_declaration(&self, session: &AnalysisSession) -> Option<Symbol> {
        self.check(session);
        match self.backing() {
            Backing::Package(_) | Backing::File(_) => None,
            Backing::BackingField { property } => Some(property.clone()),
            Backing::DefaultAccessor { property } => Some(property.clone()),
            Backing::Source { file, node, .. } => {
                // `val` constructor parameters belong to the class, not the
                // constructor.
                if self.raw_kind() == SymbolKind::Property && node.kind() == SyntaxKind::VALUE_PARAMETER {
                    let class = crate::model::lower::owning_class(node)?;
                    return session.declaration_symbol(file, &class);
                }
                node.ancestors()
                    .skip(1)
                    .find_map(|n| session.declaration_symbol(file, &n))
            }
            Backing::Metadata { record, owner } => {
                if let Some(owner) = owner {
                    return Some(owner.clone());
                }
                let outer = match record {
                    DeclRecord::Class(class) => class.class_id.outer_class_id(),
                    DeclRecord::TypeAlias(alias) => alias.class_id.outer_class_id(),
                    DeclRecord::Callable(callable) => callable.callable_id.class_id(),
                    DeclRecord::TypeParameter(_) | DeclRecord::ValueParameter(_) => None,
                };
                session.class_symbol(&outer?)
            }
        }
    }

    // ========================================================================
    // Annotations and source
    // ========================================================================

    pub fn annotations(&self, session: &AnalysisSession) -> Vec<AnnotationRecord> {
        self.check(session);
        match self.record(session) {
            Some(DeclRecord::Class(class)) => class.annotations.clone(),
            Some(DeclRecord::Callable(callable)) => callable.annotations.clone(),
            Some(DeclRecord::TypeAlias(alias)) => alias.annotations.clone(),
            _ => Vec::new(),
        }
    }

    pub fn annotation_class_ids(&self, session: &AnalysisSession) -> Vec<ClassId> {
        self.annotations(session)
            .into_iter()
            .map(|a| a.class_id)
            .collect()
    }

    pub fn has_annotation(&self, session: &AnalysisSession, class_id: &ClassId) -> bool {
        self.annotations(session).iter().any(|a| &a.class_id == class_id)
    }

    /// Declaration node of a source symbol.
    pub fn declaration_node(&self, session: &AnalysisSession) -> Option<SyntaxNode> {
        self.check(session);
        self.source().map(|(_, node)| node.clone())
    }

    /// File symbol of the file declaring a source symbol.
    pub fn containing_file(&self, session: &AnalysisSession) -> Option<Symbol> {
        self.check(session);
        match self.backing() {
            Backing::Source { file, .. } => Some(session.file_symbol(file)),
            Backing::BackingField { property } | Backing::DefaultAccessor { property } => {
                property.containing_file(session)
            }
            _ => None,
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    pub(crate) fn callable_record(&self, session: &AnalysisSession) -> Option<Arc<CallableRecord>> {
        match self.record(session)? {
            DeclRecord::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    fn flag(&self, session: &AnalysisSession, test: impl Fn(&CallableRecord) -> bool) -> bool {
        self.check(session);
        self.callable_record(session).is_some_and(|c| test(&c))
    }
}

fn accessor_name(kind: SymbolKind, property: &Name) -> Name {
    let prefix = if kind == SymbolKind::Getter { "get" } else { "set" };
    Name::new(format!("<{prefix}-{property}>"))
}

fn record_origin(record: &DeclRecord) -> Option<SymbolOrigin> {
    match record {
        DeclRecord::Class(class) => Some(class.origin),
        DeclRecord::Callable(callable) => Some(callable.origin),
        DeclRecord::TypeAlias(alias) => Some(alias.origin),
        DeclRecord::TypeParameter(_) | DeclRecord::ValueParameter(_) => None,
    }
}

/// `VALUE_PARAMETER` / `TYPE_PARAMETER` children of a declaration's own list.
fn parameter_nodes(node: &SyntaxNode, list: SyntaxKind, item: SyntaxKind) -> Vec<SyntaxNode> {
    let owner = match node.kind() {
        SyntaxKind::CLASS => node
            .children()
            .find(|c| c.kind() == SyntaxKind::PRIMARY_CONSTRUCTOR && list == SyntaxKind::VALUE_PARAMETER_LIST)
            .unwrap_or_else(|| node.clone()),
        _ => node.clone(),
    };
    owner
        .children()
        .filter(|c| c.kind() == list)
        .flat_map(|l| l.children().filter(move |c| c.kind() == item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_names() {
        assert_eq!(accessor_name(SymbolKind::Getter, &Name::new("x")), "<get-x>");
        assert_eq!(accessor_name(SymbolKind::Setter, &Name::new("x")), "<set-x>");
    }

    #[test]
    fn test_parameter_nodes_of_function() {
        let parse = crate::parser::parse("fun <T> f(a: T, b: Int) {}");
        let fun = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::FUN)
            .unwrap();
        let values = parameter_nodes(&fun, SyntaxKind::VALUE_PARAMETER_LIST, SyntaxKind::VALUE_PARAMETER);
        let types = parameter_nodes(&fun, SyntaxKind::TYPE_PARAMETER_LIST, SyntaxKind::TYPE_PARAMETER);
        assert_eq!(values.len(), 2);
        assert_eq!(types.len(), 1);
    }
}
