//! Member scopes of classes and types.
//!
//! ```text
//! declared   = members + synthesized (data class, enum statics excluded)
//! static     = static members + nested classifiers
//! delegated  = members produced by `by` delegation
//! member     = declared + delegated + inherited + synthetic platform
//!              properties
//! file       = top-level declarations of one file
//! package    = source files of the package, then module fragments
//! ```
//!
//! Inherited members come from the supertype closure, with private, static
//! and constructor members skipped and anything the subclass already has
//! with the same name and signature treated as overridden.

use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::scope::{Scope, ScopeKind};
use super::session::AnalysisSession;
use super::symbols::{Symbol, SymbolKind, synthetic_java_properties};
use super::types::KType;
use crate::base::{FqName, Name};
use crate::model::checker::supertype_closure;
use crate::model::{
    CallableKind, CallableRecord, ClassRecord, DeclRecord, SemType, TypeEnvironment,
    TypeProjection, Visibility,
};
use crate::syntax::ParsedFile;

impl Symbol {
    /// Class record behind a class, object or enum entry symbol.
    pub(crate) fn class_record(&self, session: &AnalysisSession) -> Option<Arc<ClassRecord>> {
        match self.record(session)? {
            DeclRecord::Class(class) => Some(class),
            _ => None,
        }
    }
}

#[track_caller]
fn assert_class_like(session: &AnalysisSession, class: &Symbol) {
    class.check(session);
    let kind = class.raw_kind();
    if !matches!(
        kind,
        SymbolKind::Class | SymbolKind::EnumEntry | SymbolKind::AnonymousObject
    ) {
        panic!("member scope requested for a {kind:?} symbol");
    }
}

impl AnalysisSession {
    /// Members the class declares itself, compiler-synthesized ones included.
    #[track_caller]
    pub fn declared_member_scope(&self, class: &Symbol) -> Scope {
        assert_class_like(self, class);
        let owner = class.clone();
        Scope::lazy(self, ScopeKind::DeclaredMember, Some(class.clone()), move |session| {
            declared_members(session, &owner)
        })
    }

    #[track_caller]
    pub fn static_member_scope(&self, class: &Symbol) -> Scope {
        assert_class_like(self, class);
        let owner = class.clone();
        Scope::lazy(self, ScopeKind::Static, Some(class.clone()), move |session| {
            let Some(record) = owner.class_record(session) else {
                return Vec::new();
            };
            let nested = record
                .members
                .iter()
                .filter(|m| matches!(m, DeclRecord::Class(c) if !c.flags.is_inner));
            record
                .static_members
                .iter()
                .chain(nested)
                .map(|m| session.record_symbol(m, Some(&owner)))
                .collect()
        })
    }

    #[track_caller]
    pub fn delegated_member_scope(&self, class: &Symbol) -> Scope {
        assert_class_like(self, class);
        let owner = class.clone();
        Scope::lazy(self, ScopeKind::Delegated, Some(class.clone()), move |session| {
            owner
                .class_record(session)
                .map(|record| {
                    record
                        .delegated_members
                        .iter()
                        .map(|m| session.record_symbol(m, Some(&owner)))
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Everything visible on an instance of the class.
    #[track_caller]
    pub fn member_scope(&self, class: &Symbol) -> Scope {
        assert_class_like(self, class);
        let owner = class.clone();
        Scope::lazy(self, ScopeKind::Member, Some(class.clone()), move |session| {
            all_members(session, &owner)
        })
    }

    /// Top-level declarations of one file, in source order.
    pub fn file_scope(&self, file: &Rc<ParsedFile>) -> Scope {
        let owned = file.clone();
        Scope::lazy(self, ScopeKind::File, Some(self.file_symbol(file)), move |session| {
            owned
                .declarations()
                .iter()
                .filter_map(|node| session.declaration_symbol(&owned, node))
                .collect()
        })
    }

    /// Everything declared in `package`: source files first, then the
    /// fragments of each module in module order. A compiled classifier that
    /// a source file also declares is left out.
    pub fn package_scope(&self, package: &FqName) -> Scope {
        let fq_name = package.clone();
        Scope::lazy(self, ScopeKind::Package, Some(self.package_symbol(package.clone())), move |session| {
            let mut out: Vec<Symbol> = Vec::new();
            for file in session.source_package_files(&fq_name) {
                out.extend(
                    file.declarations()
                        .iter()
                        .filter_map(|node| session.declaration_symbol(&file, node)),
                );
            }
            for fragment in session.module_graph().package_fragments(&fq_name) {
                for declaration in &fragment.declarations {
                    let shadowed = match declaration {
                        DeclRecord::Class(class) => session.source_class(&class.class_id).is_some(),
                        DeclRecord::TypeAlias(alias) => session.source_type_alias(&alias.class_id).is_some(),
                        _ => false,
                    };
                    if !shadowed {
                        out.push(session.record_symbol(declaration, None));
                    }
                }
            }
            out
        })
    }

    /// Members reachable through a value of type `ty`.
    pub fn type_scope(&self, ty: &KType) -> Scope {
        let semantic = ty.semantic(self).clone();
        self.scope_of_type(&semantic)
    }

    fn scope_of_type(&self, ty: &SemType) -> Scope {
        match ty {
            SemType::Class { class_id, .. } => match self.class_symbol(class_id) {
                Some(class) => {
                    let owner = class.clone();
                    Scope::lazy(self, ScopeKind::Type, Some(class), move |session| {
                        all_members(session, &owner)
                    })
                }
                None => Scope::empty(self, ScopeKind::Type),
            },
            SemType::TypeParameter { bounds, .. } if bounds.is_empty() => {
                self.scope_of_type(&SemType::any())
            }
            SemType::TypeParameter { bounds, .. } | SemType::Intersection(bounds) => Scope::composite(
                self,
                None,
                bounds.iter().map(|b| self.scope_of_type(b)).collect(),
            ),
            SemType::Flexible { upper, .. } => self.scope_of_type(upper),
            SemType::DefinitelyNotNull(inner) => self.scope_of_type(inner),
            SemType::Error { .. } => Scope::empty(self, ScopeKind::Type),
        }
    }
}

fn declared_members(session: &AnalysisSession, owner: &Symbol) -> Vec<Symbol> {
    let Some(record) = owner.class_record(session) else {
        return Vec::new();
    };
    record
        .members
        .iter()
        .chain(record.synthesized_members.iter())
        .map(|m| session.record_symbol(m, Some(owner)))
        .collect()
}

fn all_members(session: &AnalysisSession, owner: &Symbol) -> Vec<Symbol> {
    let Some(record) = owner.class_record(session) else {
        return Vec::new();
    };
    let mut seen: FxHashSet<(Name, SmolStr)> = FxHashSet::default();
    let mut out = Vec::new();

    let own = record
        .members
        .iter()
        .chain(record.synthesized_members.iter())
        .chain(record.delegated_members.iter());
    for member in own {
        if let DeclRecord::Callable(callable) = member {
            seen.insert((callable.name().clone(), callable.signature()));
        }
        out.push(session.record_symbol(member, Some(owner)));
    }
    let mut synthetic_names: FxHashSet<Name> = FxHashSet::default();
    for property in synthetic_java_properties(session, &record, owner) {
        synthetic_names.insert(property.raw_name(session));
        out.push(property);
    }

    for supertype in supertype_closure(session, &record.default_type()).iter().skip(1) {
        let Some(class_id) = supertype.class_id() else {
            continue;
        };
        let Some(super_record) = session.class_record(class_id) else {
            continue;
        };
        let Some(super_symbol) = session.class_symbol(class_id) else {
            continue;
        };
        let params = super_record.type_parameters.clone();
        let arguments = supertype.arguments().to_vec();
        let subst = |name: &Name| -> Option<TypeProjection> {
            params
                .iter()
                .position(|p| &p.name == name)
                .and_then(|i| arguments.get(i).cloned())
        };
        let inherited = super_record
            .members
            .iter()
            .chain(super_record.synthesized_members.iter())
            .chain(super_record.delegated_members.iter())
            .filter_map(|m| m.as_callable().map(|c| (m, c)));
        for (member, callable) in inherited {
            if !is_inheritable(callable) {
                continue;
            }
            let key = (callable.name().clone(), substituted_signature(callable, &subst));
            if seen.insert(key) {
                out.push(session.record_symbol(member, Some(&super_symbol)));
            }
        }
        for property in synthetic_java_properties(session, &super_record, &super_symbol) {
            if synthetic_names.insert(property.raw_name(session)) {
                out.push(property);
            }
        }
    }
    out
}

fn is_inheritable(callable: &CallableRecord) -> bool {
    !matches!(callable.kind, CallableKind::Constructor { .. })
        && callable.visibility != Visibility::Private
        && !callable.flags.is_static
}

/// Signature of `callable` as seen from a subclass.
fn substituted_signature(callable: &CallableRecord, subst: &dyn Fn(&Name) -> Option<TypeProjection>) -> SmolStr {
    let mut view = callable.clone();
    view.receiver_type = view.receiver_type.map(|r| r.substitute(subst));
    for param in &mut view.value_parameters {
        param.ty = param.ty.substitute(subst);
    }
    view.signature()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::testing::session_with;

    fn names(session: &AnalysisSession, scope: &Scope) -> Vec<String> {
        scope
            .names(session)
            .into_iter()
            .map(|n| n.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_declared_scope_of_data_class() {
        let session = session_with(&[("a.kt", "data class P(val x: Int, val y: String) { fun f() {} }")]);
        let class = session.class_symbol(&crate::base::ClassId::parse("P")).unwrap();
        let scope = session.declared_member_scope(&class);
        assert_eq!(
            names(&session, &scope),
            vec!["<init>", "x", "y", "f", "component1", "component2", "copy"]
        );
    }

    #[test]
    fn test_member_scope_inherits_and_overrides() {
        let session = session_with(&[(
            "a.kt",
            "open class Base { open fun f() {} fun g(x: Int) {} private fun hidden() {} }\n\
             class Derived : Base() { override fun f() {} }",
        )]);
        let derived = session.class_symbol(&crate::base::ClassId::parse("Derived")).unwrap();
        let scope = session.member_scope(&derived);
        let fs = scope.symbols_named(&session, &Name::new("f"));
        assert_eq!(fs.len(), 1);
        assert_eq!(fs[0].dispatch_receiver_type(&session).unwrap().to_string(), "Derived");
        assert!(scope.contains(&session, &Name::new("g")));
        assert!(!scope.contains(&session, &Name::new("hidden")));
        // Inherited from Any
        assert!(scope.contains(&session, &Name::new("toString")));
    }

    #[test]
    fn test_static_scope_of_enum() {
        let session = session_with(&[("a.kt", "enum class E { A, B; fun f() {} }")]);
        let class = session.class_symbol(&crate::base::ClassId::parse("E")).unwrap();
        let scope = session.static_member_scope(&class);
        assert_eq!(names(&session, &scope), vec!["values", "valueOf", "entries", "A", "B"]);
    }

    #[test]
    fn test_package_scope_merges_source_and_library() {
        let session = session_with(&[
            ("a/One.kt", "package kotlin.collections\nfun mine() {}"),
            ("b/Two.kt", "package other\nclass X"),
        ]);
        let scope = session.package_scope(&FqName::new("kotlin.collections"));
        let names = names(&session, &scope);
        assert_eq!(names[0], "mine");
        assert!(names.contains(&"listOf".to_string()));
        assert!(names.contains(&"List".to_string()));
        assert!(!names.contains(&"X".to_string()));
    }

    #[test]
    fn test_delegated_scope() {
        let session = session_with(&[(
            "a.kt",
            "interface I { fun a(); fun b() }\nclass C(i: I) : I by i { override fun b() {} }",
        )]);
        let class = session.class_symbol(&crate::base::ClassId::parse("C")).unwrap();
        let scope = session.delegated_member_scope(&class);
        assert_eq!(names(&session, &scope), vec!["a"]);
    }
}
