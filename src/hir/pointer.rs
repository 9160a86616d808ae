//! Symbol pointers.
//!
//! A pointer outlives the session that created it. Restoring it in another
//! session yields the equivalent symbol there, or `None` when the target is
//! gone. Source declarations are anchored by position and by the trail of
//! enclosing declarations; compiled declarations by their ids.
//!
//! Pointers can be persisted as versioned JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

use super::session::AnalysisSession;
use super::symbols::{Backing, Symbol, SymbolKind};
use crate::base::{CallableId, ClassId, FqName};
use crate::model::{ClassKind, DeclRecord};
use crate::syntax::SourceAnchor;

/// Version written by [`StoredPointer::new`].
pub const POINTER_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PointerError {
    #[error("failed to access pointer file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed pointer: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported pointer format version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SymbolPointer {
    /// A declaration in a source file
    #[serde(rename_all = "camelCase")]
    Source {
        anchor: SourceAnchor,
        symbol_kind: SymbolKind,
    },
    #[serde(rename_all = "camelCase")]
    Package { fq_name: FqName },
    File { path: SmolStr },
    #[serde(rename_all = "camelCase")]
    Class { class_id: ClassId },
    #[serde(rename_all = "camelCase")]
    TypeAlias { class_id: ClassId },
    #[serde(rename_all = "camelCase")]
    EnumEntry { class_id: ClassId },
    /// A compiled callable; overloads are told apart by `signature`
    #[serde(rename_all = "camelCase")]
    Callable {
        callable_id: CallableId,
        signature: SmolStr,
        symbol_kind: SymbolKind,
    },
    TypeParameter { owner: Box<SymbolPointer>, index: u32 },
    ValueParameter { owner: Box<SymbolPointer>, index: u32 },
    BackingField { property: Box<SymbolPointer> },
    Accessor { property: Box<SymbolPointer>, getter: bool },
    /// Symbols of context-dependent copies and compiled local declarations
    NeverRestorable { description: SmolStr },
}

impl Symbol {
    /// A pointer that can be restored in a later session.
    pub fn create_pointer(&self, session: &AnalysisSession) -> SymbolPointer {
        self.check(session);
        match self.backing() {
            Backing::Source { file, node, .. } => {
                if file.original().is_some() {
                    return never(format!("{self:?} lives in a context-dependent copy"));
                }
                SymbolPointer::Source {
                    anchor: SourceAnchor::new(file.path(), node),
                    symbol_kind: self.raw_kind(),
                }
            }
            Backing::Metadata { record, owner } => metadata_pointer(session, self, record, owner.as_ref()),
            Backing::Package(fq_name) => SymbolPointer::Package { fq_name: fq_name.clone() },
            Backing::File(file) => {
                if file.original().is_some() {
                    return never(format!("file copy of {}", file.path()));
                }
                SymbolPointer::File { path: SmolStr::new(file.path()) }
            }
            Backing::BackingField { property } => SymbolPointer::BackingField {
                property: Box::new(property.create_pointer(session)),
            },
            Backing::DefaultAccessor { property } => SymbolPointer::Accessor {
                property: Box::new(property.create_pointer(session)),
                getter: self.raw_kind() == SymbolKind::Getter,
            },
        }
    }
}

fn never(description: impl Into<SmolStr>) -> SymbolPointer {
    SymbolPointer::NeverRestorable { description: description.into() }
}

fn metadata_pointer(
    session: &AnalysisSession,
    symbol: &Symbol,
    record: &DeclRecord,
    owner: Option<&Symbol>,
) -> SymbolPointer {
    match record {
        DeclRecord::Class(class) => {
            if class.class_id.is_local() || class.kind == ClassKind::AnonymousObject {
                return never(format!("local class {}", class.class_id));
            }
            if class.kind == ClassKind::EnumEntry {
                SymbolPointer::EnumEntry { class_id: class.class_id.clone() }
            } else {
                SymbolPointer::Class { class_id: class.class_id.clone() }
            }
        }
        DeclRecord::TypeAlias(alias) => SymbolPointer::TypeAlias { class_id: alias.class_id.clone() },
        DeclRecord::Callable(callable) => {
            if callable.is_local {
                return never(format!("local callable {}", callable.callable_id));
            }
            SymbolPointer::Callable {
                callable_id: callable.callable_id.clone(),
                signature: callable.signature(),
                symbol_kind: symbol.raw_kind(),
            }
        }
        DeclRecord::TypeParameter(_) | DeclRecord::ValueParameter(_) => {
            let Some(owner) = owner else {
                return never(format!("{symbol:?} without an owner"));
            };
            let siblings = if matches!(record, DeclRecord::TypeParameter(_)) {
                owner.type_parameters(session)
            } else {
                owner.value_parameters(session)
            };
            let Some(index) = siblings.iter().position(|s| s == symbol) else {
                return never(format!("{symbol:?} not found among its owner's parameters"));
            };
            let owner = Box::new(owner.create_pointer(session));
            let index = index as u32;
            if matches!(record, DeclRecord::TypeParameter(_)) {
                SymbolPointer::TypeParameter { owner, index }
            } else {
                SymbolPointer::ValueParameter { owner, index }
            }
        }
    }
}

impl SymbolPointer {
    /// The equivalent symbol in `session`, if it still exists.
    pub fn restore(&self, session: &AnalysisSession) -> Option<Symbol> {
        session.assert_valid();
        let restored = self.restore_inner(session);
        debug!(pointer = ?self.tag(), restored = restored.is_some(), "symbol pointer restored");
        restored
    }

    /// Whether this pointer can ever restore to anything.
    pub fn is_restorable(&self) -> bool {
        match self {
            SymbolPointer::NeverRestorable { .. } => false,
            SymbolPointer::TypeParameter { owner, .. } | SymbolPointer::ValueParameter { owner, .. } => {
                owner.is_restorable()
            }
            SymbolPointer::BackingField { property } | SymbolPointer::Accessor { property, .. } => {
                property.is_restorable()
            }
            _ => true,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            SymbolPointer::Source { .. } => "source",
            SymbolPointer::Package { .. } => "package",
            SymbolPointer::File { .. } => "file",
            SymbolPointer::Class { .. } => "class",
            SymbolPointer::TypeAlias { .. } => "typeAlias",
            SymbolPointer::EnumEntry { .. } => "enumEntry",
            SymbolPointer::Callable { .. } => "callable",
            SymbolPointer::TypeParameter { .. } => "typeParameter",
            SymbolPointer::ValueParameter { .. } => "valueParameter",
            SymbolPointer::BackingField { .. } => "backingField",
            SymbolPointer::Accessor { .. } => "accessor",
            SymbolPointer::NeverRestorable { .. } => "neverRestorable",
        }
    }

    fn restore_inner(&self, session: &AnalysisSession) -> Option<Symbol> {
        match self {
            SymbolPointer::Source { anchor, symbol_kind } => {
                let file = session.file_by_path(&anchor.path)?.clone();
                let node = anchor.restore(file.root())?;
                Some(session.source_symbol(&file, &node, *symbol_kind))
            }
            SymbolPointer::Package { fq_name } => session
                .package_exists(fq_name)
                .then(|| session.package_symbol(fq_name.clone())),
            SymbolPointer::File { path } => {
                let file = session.file_by_path(path)?.clone();
                Some(session.file_symbol(&file))
            }
            SymbolPointer::Class { class_id } => session
                .class_symbol(class_id)
                .filter(|s| s.raw_kind() != SymbolKind::EnumEntry),
            SymbolPointer::EnumEntry { class_id } => session
                .class_symbol(class_id)
                .filter(|s| s.raw_kind() == SymbolKind::EnumEntry),
            SymbolPointer::TypeAlias { class_id } => session.type_alias_symbol(class_id),
            SymbolPointer::Callable { callable_id, signature, symbol_kind } => {
                restore_callable(session, callable_id, signature, *symbol_kind)
            }
            SymbolPointer::TypeParameter { owner, index } => {
                let owner = owner.restore_inner(session)?;
                owner.type_parameters(session).into_iter().nth(*index as usize)
            }
            SymbolPointer::ValueParameter { owner, index } => {
                let owner = owner.restore_inner(session)?;
                owner.value_parameters(session).into_iter().nth(*index as usize)
            }
            SymbolPointer::BackingField { property } => property.restore_inner(session)?.backing_field(session),
            SymbolPointer::Accessor { property, getter } => {
                let property = property.restore_inner(session)?;
                if *getter {
                    property.getter(session)
                } else {
                    property.setter(session)
                }
            }
            SymbolPointer::NeverRestorable { .. } => None,
        }
    }
}

fn restore_callable(
    session: &AnalysisSession,
    callable_id: &CallableId,
    signature: &str,
    kind: SymbolKind,
) -> Option<Symbol> {
    let candidates = match callable_id.class_id() {
        Some(class_id) => {
            let class = session.class_symbol(&class_id)?;
            let mut found = session
                .member_scope(&class)
                .symbols_named(session, &callable_id.callable);
            found.extend(
                session
                    .static_member_scope(&class)
                    .symbols_named(session, &callable_id.callable),
            );
            found
        }
        None => session
            .package_scope(&callable_id.package)
            .symbols_named(session, &callable_id.callable),
    };
    candidates.into_iter().find(|candidate| {
        candidate.raw_kind() == kind
            && candidate
                .callable_record(session)
                .is_some_and(|record| record.signature() == signature)
    })
}

/// A pointer as persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPointer {
    pub version: u32,
    pub pointer: SymbolPointer,
}

impl StoredPointer {
    pub fn new(pointer: SymbolPointer) -> Self {
        Self { version: POINTER_FORMAT_VERSION, pointer }
    }

    pub fn to_json(&self) -> Result<String, PointerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PointerError> {
        let stored: StoredPointer = serde_json::from_str(json)?;
        if stored.version != POINTER_FORMAT_VERSION {
            return Err(PointerError::UnsupportedVersion(stored.version));
        }
        Ok(stored)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), PointerError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, PointerError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Name;
    use crate::hir::testing::session_with;

    #[test]
    fn test_source_pointer_survives_edit_above() {
        let first = session_with(&[("a.kt", "class A { fun f(x: Int) {} }")]);
        let class = first.class_symbol(&ClassId::parse("A")).unwrap();
        let f = first.declared_member_scope(&class).symbols_named(&first, &Name::new("f"))[0].clone();
        let pointer = f.create_pointer(&first);
        assert!(matches!(pointer, SymbolPointer::Source { .. }));

        let second = session_with(&[("a.kt", "// moved\n\nclass A { fun f(x: Int) {} }")]);
        let restored = pointer.restore(&second).unwrap();
        assert_eq!(restored.name(&second), "f");
        assert_eq!(restored.kind(&second), SymbolKind::Function);
    }

    #[test]
    fn test_removed_declaration_does_not_restore() {
        let first = session_with(&[("a.kt", "fun gone() {}")]);
        let f = first
            .package_scope(&FqName::root())
            .symbols_named(&first, &Name::new("gone"))[0]
            .clone();
        let pointer = f.create_pointer(&first);
        let second = session_with(&[("a.kt", "fun other() {}")]);
        assert!(pointer.restore(&second).is_none());
    }

    #[test]
    fn test_library_callable_pointer_picks_overload() {
        let session = session_with(&[]);
        let list = session
            .package_scope(&FqName::new("kotlin.collections"))
            .symbols_named(&session, &Name::new("listOf"))[0]
            .clone();
        let pointer = list.create_pointer(&session);
        assert!(matches!(pointer, SymbolPointer::Callable { .. }));
        let other = session_with(&[]);
        let restored = pointer.restore(&other).unwrap();
        assert_eq!(restored.name(&other), "listOf");
    }

    #[test]
    fn test_library_value_parameter_pointer() {
        let session = session_with(&[]);
        let list = session
            .package_scope(&FqName::new("kotlin.collections"))
            .symbols_named(&session, &Name::new("listOf"))[0]
            .clone();
        let param = list.value_parameters(&session)[0].clone();
        let pointer = param.create_pointer(&session);
        assert!(matches!(pointer, SymbolPointer::ValueParameter { index: 0, .. }));
        let restored = pointer.restore(&session).unwrap();
        assert_eq!(restored, param);
    }

    #[test]
    fn test_copy_symbols_are_never_restorable() {
        let session = session_with(&[("a.kt", "class A")]);
        let (copy, id) = session
            .create_context_dependent_copy(session.files()[0].id(), "class A { fun g() {} }")
            .unwrap();
        let file = copy.file(id).unwrap().clone();
        let symbol = copy.declaration_symbol(&file, &file.declarations()[0]).unwrap();
        let pointer = symbol.create_pointer(&copy);
        assert!(!pointer.is_restorable());
        assert!(pointer.restore(&session).is_none());
    }

    #[test]
    fn test_stored_pointer_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ptr.json");
        let stored = StoredPointer::new(SymbolPointer::Class { class_id: ClassId::parse("kotlin/String") });
        stored.write_to_file(&path).unwrap();
        assert_eq!(StoredPointer::read_from_file(&path).unwrap(), stored);
    }

    #[test]
    fn test_future_version_rejected() {
        let json = r#"{"version": 99, "pointer": {"type": "file", "path": "a.kt"}}"#;
        assert!(matches!(
            StoredPointer::from_json(json),
            Err(PointerError::UnsupportedVersion(99))
        ));
    }
}
