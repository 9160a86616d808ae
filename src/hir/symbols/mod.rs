//! Symbols: one handle type over two backing representations.
//!
//! A [`Symbol`] is either *source-backed* (a declaration node whose record
//! the oracle computes on first use) or *metadata-backed* (a record read
//! straight from the module graph). A few shapes have no node or record of
//! their own: packages, files, backing fields and default accessors.
//!
//! ```text
//! Symbol ── Rc<SymbolData> ── kind
//!                          ├─ token
//!                          └─ Backing::{Source, Metadata, Package, File,
//!                                       BackingField, DefaultAccessor}
//! ```

mod capabilities;
mod synthetic;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::session::AnalysisSession;
use super::token::ValidityToken;
use crate::base::{ClassId, FileId, FqName};
use crate::model::{CallableKind, ClassKind, DeclRecord, SourceRef, SymbolOrigin};
use crate::model::lower::{declaration_location, is_object_literal, DeclLocation};
use crate::parser::ast::{AstNode, PropertyAccessor};
use crate::parser::{SyntaxKind, SyntaxNode};
use crate::syntax::{NodePtr, ParsedFile};

pub use capabilities::SymbolLocation;
pub use synthetic::synthetic_java_properties;

/// What shape of declaration a symbol stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Package,
    File,
    /// Named class, interface, object or companion
    Class,
    EnumEntry,
    AnonymousObject,
    TypeAlias,
    TypeParameter,
    ValueParameter,
    Function,
    /// Lambda or unnamed `fun` used as a value
    AnonymousFunction,
    Constructor,
    Property,
    LocalVariable,
    Getter,
    Setter,
    BackingField,
    ClassInitializer,
    JavaField,
    SyntheticJavaProperty,
}

impl SymbolKind {
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            SymbolKind::Function
                | SymbolKind::AnonymousFunction
                | SymbolKind::Constructor
                | SymbolKind::Property
                | SymbolKind::LocalVariable
                | SymbolKind::Getter
                | SymbolKind::Setter
                | SymbolKind::BackingField
                | SymbolKind::JavaField
                | SymbolKind::SyntheticJavaProperty
        )
    }

    pub fn is_classifier(self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::EnumEntry
                | SymbolKind::AnonymousObject
                | SymbolKind::TypeAlias
                | SymbolKind::TypeParameter
        )
    }

    /// Function-like: has value parameters.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SymbolKind::Function
                | SymbolKind::AnonymousFunction
                | SymbolKind::Constructor
                | SymbolKind::Getter
                | SymbolKind::Setter
        )
    }

    pub fn is_variable_like(self) -> bool {
        matches!(
            self,
            SymbolKind::Property
                | SymbolKind::LocalVariable
                | SymbolKind::ValueParameter
                | SymbolKind::BackingField
                | SymbolKind::JavaField
                | SymbolKind::SyntheticJavaProperty
                | SymbolKind::EnumEntry
        )
    }
}

/// Kind of the declaration node `node` stands for, `None` for anything that
/// is not a declaration.
pub fn kind_for_node(node: &SyntaxNode) -> Option<SymbolKind> {
    Some(match node.kind() {
        SyntaxKind::CLASS => SymbolKind::Class,
        SyntaxKind::OBJECT_DECLARATION if is_object_literal(node) => SymbolKind::AnonymousObject,
        SyntaxKind::OBJECT_DECLARATION => SymbolKind::Class,
        SyntaxKind::ENUM_ENTRY => SymbolKind::EnumEntry,
        SyntaxKind::FUN if crate::parser::ast::declaration_name(node).is_none() => {
            SymbolKind::AnonymousFunction
        }
        SyntaxKind::FUN => SymbolKind::Function,
        SyntaxKind::LAMBDA_EXPR => SymbolKind::AnonymousFunction,
        SyntaxKind::PROPERTY if declaration_location(node) == DeclLocation::Local => {
            SymbolKind::LocalVariable
        }
        SyntaxKind::PROPERTY => SymbolKind::Property,
        SyntaxKind::PROPERTY_ACCESSOR => {
            if PropertyAccessor::cast(node.clone())?.is_getter() {
                SymbolKind::Getter
            } else {
                SymbolKind::Setter
            }
        }
        SyntaxKind::PRIMARY_CONSTRUCTOR | SyntaxKind::SECONDARY_CONSTRUCTOR => SymbolKind::Constructor,
        SyntaxKind::CLASS_INITIALIZER => SymbolKind::ClassInitializer,
        SyntaxKind::VALUE_PARAMETER => SymbolKind::ValueParameter,
        SyntaxKind::TYPE_PARAMETER => SymbolKind::TypeParameter,
        SyntaxKind::TYPE_ALIAS => SymbolKind::TypeAlias,
        _ => return None,
    })
}

/// Kind of the symbol a record stands for.
pub fn kind_for_record(record: &DeclRecord) -> SymbolKind {
    match record {
        DeclRecord::Class(class) => match class.kind {
            ClassKind::EnumEntry => SymbolKind::EnumEntry,
            ClassKind::AnonymousObject => SymbolKind::AnonymousObject,
            _ => SymbolKind::Class,
        },
        DeclRecord::Callable(callable) => match callable.kind {
            CallableKind::Function => SymbolKind::Function,
            CallableKind::AnonymousFunction => SymbolKind::AnonymousFunction,
            CallableKind::Constructor { .. } => SymbolKind::Constructor,
            CallableKind::Property => SymbolKind::Property,
            CallableKind::LocalVariable => SymbolKind::LocalVariable,
            CallableKind::Getter => SymbolKind::Getter,
            CallableKind::Setter => SymbolKind::Setter,
            CallableKind::JavaField => SymbolKind::JavaField,
            CallableKind::SyntheticJavaProperty => SymbolKind::SyntheticJavaProperty,
        },
        DeclRecord::TypeAlias(_) => SymbolKind::TypeAlias,
        DeclRecord::TypeParameter(_) => SymbolKind::TypeParameter,
        DeclRecord::ValueParameter(_) => SymbolKind::ValueParameter,
    }
}

// ============================================================================
// Symbol
// ============================================================================

pub(crate) enum Backing {
    Source {
        file: Rc<ParsedFile>,
        node: SyntaxNode,
        record: OnceCell<Option<DeclRecord>>,
    },
    Metadata {
        record: DeclRecord,
        owner: Option<Symbol>,
    },
    Package(FqName),
    File(Rc<ParsedFile>),
    BackingField {
        property: Symbol,
    },
    DefaultAccessor {
        property: Symbol,
    },
}

pub(crate) struct SymbolData {
    token: ValidityToken,
    kind: SymbolKind,
    backing: Backing,
    origin: OnceCell<SymbolOrigin>,
}

/// A declared program entity, valid within one analysis session.
#[derive(Clone)]
pub struct Symbol(Rc<SymbolData>);

/// What makes two symbols the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identity {
    Source(FileId, NodePtr, SymbolKind),
    Metadata(SymbolKind, SmolStr, Option<Box<Identity>>),
    Package(FqName),
    File(FileId),
    BackingField(Box<Identity>),
    DefaultAccessor(SymbolKind, Box<Identity>),
}

impl Symbol {
    pub(crate) fn new(token: ValidityToken, kind: SymbolKind, backing: Backing) -> Self {
        Symbol(Rc::new(SymbolData {
            token,
            kind,
            backing,
            origin: OnceCell::new(),
        }))
    }

    pub fn token(&self) -> &ValidityToken {
        &self.0.token
    }

    #[track_caller]
    pub(crate) fn check(&self, session: &AnalysisSession) {
        session.assert_accessible(&self.0.token);
    }

    pub(crate) fn backing(&self) -> &Backing {
        &self.0.backing
    }

    pub(crate) fn raw_kind(&self) -> SymbolKind {
        self.0.kind
    }

    pub(crate) fn source(&self) -> Option<(&Rc<ParsedFile>, &SyntaxNode)> {
        match &self.0.backing {
            Backing::Source { file, node, .. } => Some((file, node)),
            _ => None,
        }
    }

    /// The record behind the symbol, computed on first use for source
    /// symbols. `None` when inference produced nothing.
    pub(crate) fn record(&self, session: &AnalysisSession) -> Option<DeclRecord> {
        match &self.0.backing {
            Backing::Source { file, node, record } => record
                .get_or_init(|| compute_source_record(session, file, node, self.0.kind))
                .clone(),
            Backing::Metadata { record, .. } => Some(record.clone()),
            Backing::DefaultAccessor { property } => {
                let property = property.record(session)?;
                let property = property.as_callable()?;
                let accessor = if self.0.kind == SymbolKind::Getter {
                    property.getter.clone()
                } else {
                    property.setter.clone()
                };
                accessor.map(DeclRecord::Callable)
            }
            Backing::Package(_) | Backing::File(_) | Backing::BackingField { .. } => None,
        }
    }

    fn identity(&self) -> Identity {
        match &self.0.backing {
            Backing::Source { file, node, .. } => {
                Identity::Source(file.id(), NodePtr::new(node), self.0.kind)
            }
            Backing::Metadata { record, owner } => {
                let description = match record {
                    DeclRecord::Class(class) => SmolStr::new(class.class_id.to_string()),
                    DeclRecord::Callable(callable) => SmolStr::new(format!(
                        "{}{}",
                        callable.callable_id,
                        callable.signature()
                    )),
                    DeclRecord::TypeAlias(alias) => SmolStr::new(alias.class_id.to_string()),
                    DeclRecord::TypeParameter(param) => SmolStr::new(param.name.as_str()),
                    DeclRecord::ValueParameter(param) => SmolStr::new(param.name.as_str()),
                };
                let owner = match record {
                    DeclRecord::TypeParameter(_) | DeclRecord::ValueParameter(_) => {
                        owner.as_ref().map(|o| Box::new(o.identity()))
                    }
                    _ => None,
                };
                Identity::Metadata(self.0.kind, description, owner)
            }
            Backing::Package(fq_name) => Identity::Package(fq_name.clone()),
            Backing::File(file) => Identity::File(file.id()),
            Backing::BackingField { property } => Identity::BackingField(Box::new(property.identity())),
            Backing::DefaultAccessor { property } => {
                Identity::DefaultAccessor(self.0.kind, Box::new(property.identity()))
            }
        }
    }
}

fn compute_source_record(
    session: &AnalysisSession,
    file: &ParsedFile,
    node: &SyntaxNode,
    kind: SymbolKind,
) -> Option<DeclRecord> {
    // A `val` constructor parameter seen as the property it declares.
    if kind == SymbolKind::Property && node.kind() == SyntaxKind::VALUE_PARAMETER {
        let class = crate::model::lower::owning_class(node)?;
        let class_record = session.declaration_record(file, &class)?;
        let ptr = NodePtr::new(node);
        return class_record
            .as_class()?
            .members
            .iter()
            .find(|m| {
                m.as_callable()
                    .is_some_and(|c| c.is_property_like() && c.source.map(|s| s.ptr) == Some(ptr))
            })
            .cloned();
    }
    session.declaration_record(file, node)
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
            || (self.0.token == other.0.token && self.identity() == other.identity())
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.token.id().hash(state);
        self.identity().hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.backing {
            Backing::Source { file, node, .. } => write!(
                f,
                "Symbol({:?} @ {} {:?})",
                self.0.kind,
                file.path(),
                node.text_range()
            ),
            Backing::Metadata { record, .. } => {
                write!(f, "Symbol({:?} {})", self.0.kind, record.name())
            }
            Backing::Package(fq_name) => write!(f, "Symbol(Package {fq_name})"),
            Backing::File(file) => write!(f, "Symbol(File {})", file.path()),
            Backing::BackingField { property } => write!(f, "Symbol(BackingField of {property:?})"),
            Backing::DefaultAccessor { property } => {
                write!(f, "Symbol({:?} of {property:?})", self.0.kind)
            }
        }
    }
}

// ============================================================================
// Factory
// ============================================================================

impl AnalysisSession {
    /// Source symbol of a given kind, one instance per node and kind.
    pub(crate) fn source_symbol(&self, file: &Rc<ParsedFile>, node: &SyntaxNode, kind: SymbolKind) -> Symbol {
        let ptr = NodePtr::new(node);
        if let Some(symbol) = self.cached_symbol(file.id(), ptr, kind) {
            return symbol;
        }
        let symbol = Symbol::new(
            self.token().clone(),
            kind,
            Backing::Source {
                file: file.clone(),
                node: node.clone(),
                record: OnceCell::new(),
            },
        );
        self.cache_symbol(file.id(), ptr, kind, symbol.clone());
        symbol
    }

    /// Symbol for a declaration node, kind chosen by the node's shape.
    pub(crate) fn declaration_symbol(&self, file: &Rc<ParsedFile>, node: &SyntaxNode) -> Option<Symbol> {
        let kind = kind_for_node(node)?;
        Some(self.source_symbol(file, node, kind))
    }

    pub(crate) fn source_ref_symbol(&self, source: SourceRef, kind: SymbolKind) -> Option<Symbol> {
        let file = self.file(source.file)?.clone();
        let node = source.ptr.to_node(file.root())?;
        Some(self.source_symbol(&file, &node, kind))
    }

    /// Symbol for a record: the source symbol when the record points at a
    /// node of this session, a metadata symbol otherwise.
    pub(crate) fn record_symbol(&self, record: &DeclRecord, owner: Option<&Symbol>) -> Symbol {
        let kind = kind_for_record(record);
        if let Some(source) = record.source() {
            if let Some(symbol) = self.source_ref_symbol(source, kind) {
                return symbol;
            }
        }
        Symbol::new(
            self.token().clone(),
            kind,
            Backing::Metadata {
                record: record.clone(),
                owner: owner.cloned(),
            },
        )
    }

    /// Class (or object, or enum entry) by id; source classes win over the
    /// module graph.
    pub(crate) fn class_symbol(&self, class_id: &ClassId) -> Option<Symbol> {
        if let Some((file, node)) = self.source_class(class_id) {
            return self.declaration_symbol(&file, &node);
        }
        let record = self.module_graph().find_class(class_id)?;
        let owner = class_id
            .outer_class_id()
            .and_then(|outer| self.class_symbol(&outer));
        Some(self.record_symbol(&DeclRecord::Class(record), owner.as_ref()))
    }

    pub(crate) fn type_alias_symbol(&self, class_id: &ClassId) -> Option<Symbol> {
        if let Some((file, node)) = self.source_type_alias(class_id) {
            return self.declaration_symbol(&file, &node);
        }
        let record = self.module_graph().find_type_alias(class_id)?;
        Some(self.record_symbol(&DeclRecord::TypeAlias(record), None))
    }

    pub(crate) fn package_symbol(&self, fq_name: FqName) -> Symbol {
        Symbol::new(self.token().clone(), SymbolKind::Package, Backing::Package(fq_name))
    }

    pub(crate) fn file_symbol(&self, file: &Rc<ParsedFile>) -> Symbol {
        Symbol::new(self.token().clone(), SymbolKind::File, Backing::File(file.clone()))
    }

    pub(crate) fn backing_field_symbol(&self, property: &Symbol) -> Symbol {
        Symbol::new(
            self.token().clone(),
            SymbolKind::BackingField,
            Backing::BackingField {
                property: property.clone(),
            },
        )
    }

    pub(crate) fn default_accessor_symbol(&self, property: &Symbol, getter: bool) -> Symbol {
        Symbol::new(
            self.token().clone(),
            if getter { SymbolKind::Getter } else { SymbolKind::Setter },
            Backing::DefaultAccessor {
                property: property.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn node(text: &str, kind: SyntaxKind) -> SyntaxNode {
        parse(text)
            .syntax()
            .descendants()
            .find(|n| n.kind() == kind)
            .unwrap()
    }

    #[test]
    fn test_kind_for_node_distinguishes_anonymous_functions() {
        assert_eq!(kind_for_node(&node("fun f() {}", SyntaxKind::FUN)), Some(SymbolKind::Function));
        assert_eq!(
            kind_for_node(&node("val g = fun(x: Int) = x", SyntaxKind::FUN)),
            Some(SymbolKind::AnonymousFunction)
        );
        assert_eq!(
            kind_for_node(&node("val h = { x: Int -> x }", SyntaxKind::LAMBDA_EXPR)),
            Some(SymbolKind::AnonymousFunction)
        );
    }

    #[test]
    fn test_kind_for_node_variables() {
        assert_eq!(kind_for_node(&node("val x = 1", SyntaxKind::PROPERTY)), Some(SymbolKind::Property));
        assert_eq!(
            kind_for_node(&node("fun f() { val y = 1 }", SyntaxKind::PROPERTY)),
            Some(SymbolKind::LocalVariable)
        );
        assert_eq!(
            kind_for_node(&node("val o = object : Runnable {}", SyntaxKind::OBJECT_DECLARATION)),
            Some(SymbolKind::AnonymousObject)
        );
        assert_eq!(kind_for_node(&node("val x = 1", SyntaxKind::LITERAL)), None);
    }
}
