//! Nominal type checker over class hierarchies.
//!
//! Subtyping walks the supertype closure of the subtype's class, carrying the
//! type arguments along, until it meets the supertype's class. Arguments are
//! then compared under the declaration-site variance of the target class
//! (use-site projections win when present).

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use super::graph::{TypeChecker, TypeEnvironment};
use super::records::{ClassKind, SemType, TypeProjection, Variance};
use crate::base::{ClassId, Name};

const MAX_ALIAS_DEPTH: usize = 16;

/// The reference [`TypeChecker`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HierarchyTypeChecker;

impl HierarchyTypeChecker {
    pub fn new() -> Self {
        Self
    }
}

impl TypeChecker for HierarchyTypeChecker {
    fn equal_types(&self, env: &dyn TypeEnvironment, a: &SemType, b: &SemType) -> bool {
        equal(env, &expand(env, a), &expand(env, b))
    }

    fn is_subtype_of(&self, env: &dyn TypeEnvironment, sub: &SemType, sup: &SemType) -> bool {
        subtype(env, &expand(env, sub), &expand(env, sup))
    }

    fn intersect(&self, env: &dyn TypeEnvironment, types: &[SemType]) -> SemType {
        let expanded: Vec<SemType> = types.iter().map(|t| expand(env, t)).collect();
        intersect(env, &expanded)
    }

    fn common_supertype(&self, env: &dyn TypeEnvironment, types: &[SemType]) -> SemType {
        let expanded: Vec<SemType> = types.iter().map(|t| expand(env, t)).collect();
        common_supertype(env, &expanded)
    }
}

// ============================================================================
// Alias expansion
// ============================================================================

/// Expand type aliases at the top level and inside arguments.
pub fn expand(env: &dyn TypeEnvironment, ty: &SemType) -> SemType {
    expand_depth(env, ty, 0)
}

fn expand_depth(env: &dyn TypeEnvironment, ty: &SemType, depth: usize) -> SemType {
    if depth > MAX_ALIAS_DEPTH {
        return ty.clone();
    }
    match ty {
        SemType::Class {
            class_id,
            arguments,
            nullable,
        } => {
            let arguments: Vec<TypeProjection> = arguments
                .iter()
                .map(|a| match a {
                    TypeProjection::Star { upper_bound } => TypeProjection::Star {
                        upper_bound: Box::new(expand_depth(env, upper_bound, depth + 1)),
                    },
                    TypeProjection::Projected { variance, ty } => TypeProjection::Projected {
                        variance: *variance,
                        ty: expand_depth(env, ty, depth + 1),
                    },
                })
                .collect();
            let alias = if env.class_record(class_id).is_none() {
                env.type_alias_record(class_id)
            } else {
                None
            };
            if let Some(alias) = alias {
                let params = &alias.type_parameters;
                let expanded = alias.expanded.substitute(&|name: &Name| {
                    params
                        .iter()
                        .position(|p| &p.name == name)
                        .and_then(|i| arguments.get(i).cloned())
                });
                let expanded = expand_depth(env, &expanded, depth + 1);
                return if *nullable {
                    expanded.with_nullability(true)
                } else {
                    expanded
                };
            }
            SemType::Class {
                class_id: class_id.clone(),
                arguments,
                nullable: *nullable,
            }
        }
        SemType::Flexible { lower, upper } => SemType::Flexible {
            lower: Box::new(expand_depth(env, lower, depth + 1)),
            upper: Box::new(expand_depth(env, upper, depth + 1)),
        },
        SemType::Intersection(parts) => {
            SemType::Intersection(parts.iter().map(|p| expand_depth(env, p, depth + 1)).collect())
        }
        SemType::DefinitelyNotNull(inner) => {
            SemType::DefinitelyNotNull(Box::new(expand_depth(env, inner, depth + 1)))
        }
        other => other.clone(),
    }
}

// ============================================================================
// Equality
// ============================================================================

fn equal(env: &dyn TypeEnvironment, a: &SemType, b: &SemType) -> bool {
    match (a, b) {
        (
            SemType::Class {
                class_id: ida,
                arguments: aa,
                nullable: na,
            },
            SemType::Class {
                class_id: idb,
                arguments: ab,
                nullable: nb,
            },
        ) => {
            ida == idb
                && na == nb
                && aa.len() == ab.len()
                && aa.iter().zip(ab).all(|(x, y)| equal_projection(env, x, y))
        }
        (
            SemType::TypeParameter {
                name: na,
                nullable: xa,
                ..
            },
            SemType::TypeParameter {
                name: nb,
                nullable: xb,
                ..
            },
        ) => na == nb && xa == xb,
        (
            SemType::Flexible {
                lower: la,
                upper: ua,
            },
            SemType::Flexible {
                lower: lb,
                upper: ub,
            },
        ) => equal(env, la, lb) && equal(env, ua, ub),
        (SemType::Intersection(pa), SemType::Intersection(pb)) => {
            pa.len() == pb.len()
                && pa.iter().all(|x| pb.iter().any(|y| equal(env, x, y)))
                && pb.iter().all(|y| pa.iter().any(|x| equal(env, x, y)))
        }
        (SemType::DefinitelyNotNull(ia), SemType::DefinitelyNotNull(ib)) => equal(env, ia, ib),
        (
            SemType::Error {
                presentable: pa,
                nullable: na,
                ..
            },
            SemType::Error {
                presentable: pb,
                nullable: nb,
                ..
            },
        ) => pa == pb && na == nb,
        _ => false,
    }
}

fn equal_projection(env: &dyn TypeEnvironment, a: &TypeProjection, b: &TypeProjection) -> bool {
    match (a, b) {
        (TypeProjection::Star { .. }, TypeProjection::Star { .. }) => true,
        (
            TypeProjection::Projected {
                variance: va,
                ty: ta,
            },
            TypeProjection::Projected {
                variance: vb,
                ty: tb,
            },
        ) => va == vb && equal(env, ta, tb),
        _ => false,
    }
}

// ============================================================================
// Subtyping
// ============================================================================

fn subtype(env: &dyn TypeEnvironment, sub: &SemType, sup: &SemType) -> bool {
    // Error types are compatible with everything so one unresolved name
    // does not cascade
    if sub.is_error() || sup.is_error() {
        return true;
    }
    match (sub, sup) {
        (SemType::Flexible { lower, .. }, _) => subtype(env, lower, sup),
        (_, SemType::Flexible { upper, .. }) => subtype(env, sub, upper),
        (_, SemType::Intersection(parts)) => parts.iter().all(|p| subtype(env, sub, p)),
        (SemType::Intersection(parts), _) => parts.iter().any(|p| subtype(env, p, sup)),
        (SemType::DefinitelyNotNull(inner), _) => subtype(env, &inner.with_nullability(false), sup),
        (_, SemType::DefinitelyNotNull(inner)) => {
            !sub.can_be_null() && subtype(env, sub, &inner.with_nullability(false))
        }
        _ => subtype_simple(env, sub, sup),
    }
}

fn subtype_simple(env: &dyn TypeEnvironment, sub: &SemType, sup: &SemType) -> bool {
    if sub.is_nullable() && !sup.can_be_null() {
        return false;
    }
    if sub.is_nothing() {
        return true;
    }
    if sup.is_any() {
        return sup.is_nullable() || !sub.can_be_null();
    }
    match (sub, sup) {
        (
            SemType::TypeParameter { name: a, .. },
            SemType::TypeParameter {
                name: b,
                nullable: nb,
                ..
            },
        ) if a == b => *nb || !sub.is_nullable(),
        (_, SemType::TypeParameter { .. }) => false,
        (SemType::TypeParameter { bounds, nullable, .. }, _) => {
            if bounds.is_empty() {
                return subtype(env, &SemType::nullable_any(), sup);
            }
            bounds.iter().any(|b| {
                let bound = if *nullable { b.with_nullability(true) } else { b.clone() };
                subtype(env, &bound, sup)
            })
        }
        (SemType::Class { .. }, SemType::Class { class_id, arguments, .. }) => {
            let Some(found) = find_supertype(env, sub, class_id) else {
                return false;
            };
            let found_args = found.arguments();
            if found_args.len() != arguments.len() {
                return true;
            }
            let params = env
                .class_record(class_id)
                .map(|r| r.type_parameters.iter().map(|p| p.variance).collect::<Vec<_>>())
                .unwrap_or_default();
            found_args.iter().zip(arguments).enumerate().all(|(i, (have, want))| {
                let declared = params.get(i).copied().unwrap_or_default();
                argument_fits(env, have, want, declared)
            })
        }
        _ => false,
    }
}

fn argument_fits(
    env: &dyn TypeEnvironment,
    have: &TypeProjection,
    want: &TypeProjection,
    declared: Variance,
) -> bool {
    let (want_variance, want_ty) = match want {
        TypeProjection::Star { .. } => return true,
        TypeProjection::Projected { variance, ty } => (*variance, ty),
    };
    let variance = if want_variance == Variance::Invariant {
        declared
    } else {
        want_variance
    };
    match (have, variance) {
        (TypeProjection::Star { upper_bound }, Variance::Out) => subtype(env, upper_bound, want_ty),
        (TypeProjection::Star { .. }, _) => false,
        (TypeProjection::Projected { variance: hv, ty }, Variance::Out) => {
            *hv != Variance::In && subtype(env, ty, want_ty)
        }
        (TypeProjection::Projected { variance: hv, ty }, Variance::In) => {
            *hv != Variance::Out && subtype(env, want_ty, ty)
        }
        (TypeProjection::Projected { variance: hv, ty }, Variance::Invariant) => {
            *hv == Variance::Invariant && equal(env, ty, want_ty)
        }
    }
}

/// The view of class type `ty` as its supertype with class `target`,
/// arguments substituted.
pub fn find_supertype(env: &dyn TypeEnvironment, ty: &SemType, target: &ClassId) -> Option<SemType> {
    supertype_closure(env, ty)
        .into_iter()
        .find(|t| t.class_id() == Some(target))
}

/// `ty` followed by all its class supertypes in breadth-first order.
pub fn supertype_closure(env: &dyn TypeEnvironment, ty: &SemType) -> Vec<SemType> {
    let mut out = Vec::new();
    let mut seen: FxHashSet<ClassId> = FxHashSet::default();
    let mut queue = VecDeque::new();
    queue.push_back(ty.with_nullability(false));
    while let Some(current) = queue.pop_front() {
        let Some(class_id) = current.class_id().cloned() else {
            continue;
        };
        if !seen.insert(class_id.clone()) {
            continue;
        }
        if let Some(record) = env.class_record(&class_id) {
            let args = current.arguments().to_vec();
            let params = record.type_parameters.clone();
            for supertype in record.effective_supertypes() {
                let substituted = supertype.substitute(&|name: &Name| {
                    params
                        .iter()
                        .position(|p| &p.name == name)
                        .and_then(|i| args.get(i).cloned())
                });
                queue.push_back(expand(env, &substituted));
            }
        } else if class_id != crate::base::standard::any() {
            queue.push_back(SemType::any());
        }
        out.push(current);
    }
    out
}

// ============================================================================
// Intersection and common supertype
// ============================================================================

fn intersect(env: &dyn TypeEnvironment, types: &[SemType]) -> SemType {
    let mut distinct: Vec<SemType> = Vec::new();
    for ty in types {
        if !distinct.iter().any(|d| equal(env, d, ty)) {
            distinct.push(ty.clone());
        }
    }
    if distinct.is_empty() {
        return SemType::nullable_any();
    }

    // Not-null if any component is not-null
    let nullable = distinct.iter().all(SemType::is_nullable);
    let parts: Vec<SemType> = distinct
        .iter()
        .map(|t| if nullable { t.clone() } else { t.with_nullability(false) })
        .collect();

    // Keep only the most specific components
    let mut kept: Vec<SemType> = Vec::new();
    for (i, ty) in parts.iter().enumerate() {
        let redundant = parts.iter().enumerate().any(|(j, other)| {
            i != j && subtype(env, other, ty) && (!subtype(env, ty, other) || j < i)
        });
        if !redundant {
            kept.push(ty.clone());
        }
    }

    match kept.len() {
        0 => parts[0].clone(),
        1 => kept.remove(0),
        _ if has_disjoint_classes(env, &kept) => common_supertype(env, &kept),
        _ => SemType::Intersection(kept),
    }
}

/// Two unrelated non-interface classes share no value.
fn has_disjoint_classes(env: &dyn TypeEnvironment, types: &[SemType]) -> bool {
    let classes: Vec<&ClassId> = types
        .iter()
        .filter_map(SemType::class_id)
        .filter(|id| {
            env.class_record(id)
                .is_some_and(|r| r.kind != ClassKind::Interface)
        })
        .collect();
    classes.len() > 1
}

fn common_supertype(env: &dyn TypeEnvironment, types: &[SemType]) -> SemType {
    if let Some(error) = types.iter().find(|t| t.is_error()) {
        return error.clone();
    }
    let nullable = types.iter().any(SemType::is_nullable);
    let candidates: Vec<SemType> = types
        .iter()
        .filter(|t| !t.is_nothing())
        .map(|t| upper_class_bound(t).with_nullability(false))
        .collect();
    let Some(first) = candidates.first() else {
        return SemType::nothing().with_nullability(nullable);
    };

    // One of them already covers all the others
    if let Some(cover) = candidates
        .iter()
        .find(|c| candidates.iter().all(|o| subtype(env, o, c)))
    {
        return cover.with_nullability(nullable);
    }

    let closures: Vec<Vec<SemType>> = candidates.iter().map(|c| supertype_closure(env, c)).collect();
    let common: Vec<SemType> = closures[0]
        .iter()
        .filter(|st| {
            let Some(id) = st.class_id() else {
                return false;
            };
            closures[1..]
                .iter()
                .all(|c| c.iter().any(|o| o.class_id() == Some(id)))
        })
        .map(|st| unify_arguments(env, st, &closures))
        .collect();

    let most_specific: Vec<SemType> = common
        .iter()
        .filter(|c| {
            !common.iter().any(|o| {
                o.class_id() != c.class_id()
                    && c.class_id().is_some_and(|id| find_supertype(env, o, id).is_some())
            })
        })
        .cloned()
        .collect();

    let result = match most_specific.as_slice() {
        [] => first.clone(),
        [single] => single.clone(),
        many => SemType::Intersection(many.to_vec()),
    };
    result.with_nullability(nullable)
}

/// Keep arguments all views agree on, star the rest.
fn unify_arguments(env: &dyn TypeEnvironment, st: &SemType, closures: &[Vec<SemType>]) -> SemType {
    let SemType::Class { class_id, arguments, .. } = st else {
        return st.clone();
    };
    let record = env.class_record(class_id);
    let arguments = arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let agreed = closures[1..].iter().all(|closure| {
                closure
                    .iter()
                    .find(|o| o.class_id() == Some(class_id))
                    .and_then(|o| o.arguments().get(i))
                    .is_some_and(|other| equal_projection(env, arg, other))
            });
            if agreed {
                arg.clone()
            } else {
                let upper_bound = record
                    .as_ref()
                    .and_then(|r| r.type_parameters.get(i))
                    .map(|p| p.star_bound())
                    .unwrap_or_else(SemType::nullable_any);
                TypeProjection::Star {
                    upper_bound: Box::new(upper_bound),
                }
            }
        })
        .collect();
    SemType::class_with(class_id.clone(), arguments)
}

fn upper_class_bound(ty: &SemType) -> SemType {
    match ty {
        SemType::Flexible { upper, .. } => upper_class_bound(upper),
        SemType::DefinitelyNotNull(inner) => upper_class_bound(inner),
        SemType::TypeParameter { bounds, .. } => match bounds.first() {
            Some(bound) => upper_class_bound(bound),
            None => SemType::nullable_any(),
        },
        SemType::Intersection(parts) => match parts.first() {
            Some(part) => upper_class_bound(part),
            None => SemType::nullable_any(),
        },
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::standard;
    use crate::model::memory::InMemoryModuleGraph;
    use crate::model::builtins;
    use crate::model::graph::ModuleGraph;
    use std::sync::Arc;

    struct Env(InMemoryModuleGraph);

    impl TypeEnvironment for Env {
        fn class_record(&self, class_id: &ClassId) -> Option<Arc<crate::model::ClassRecord>> {
            self.0.find_class(class_id)
        }

        fn type_alias_record(&self, class_id: &ClassId) -> Option<Arc<crate::model::TypeAliasRecord>> {
            self.0.find_type_alias(class_id)
        }
    }

    fn env() -> Env {
        Env(builtins::builtins())
    }

    fn class(id: ClassId) -> SemType {
        SemType::class(id)
    }

    fn generic(id: ClassId, arg: SemType) -> SemType {
        SemType::class_with(id, vec![TypeProjection::invariant(arg)])
    }

    #[test]
    fn test_int_is_comparable_of_int() {
        let env = env();
        let checker = HierarchyTypeChecker::new();
        let int = class(standard::int());
        assert!(checker.is_subtype_of(&env, &int, &generic(standard::comparable(), int.clone())));
        assert!(!checker.is_subtype_of(
            &env,
            &int,
            &generic(standard::comparable(), class(standard::string()))
        ));
        assert!(checker.is_subtype_of(&env, &int, &class(standard::number())));
        assert!(checker.is_subtype_of(&env, &int, &SemType::any()));
    }

    #[test]
    fn test_nullable_is_not_subtype_of_not_null() {
        let env = env();
        let checker = HierarchyTypeChecker::new();
        let string = class(standard::string());
        assert!(!checker.is_subtype_of(&env, &string.with_nullability(true), &string));
        assert!(checker.is_subtype_of(&env, &string, &string.with_nullability(true)));
        assert!(checker.is_subtype_of(&env, &SemType::nothing(), &string));
    }

    #[test]
    fn test_covariant_list() {
        let env = env();
        let checker = HierarchyTypeChecker::new();
        let ints = generic(standard::list(), class(standard::int()));
        let numbers = generic(standard::list(), class(standard::number()));
        assert!(checker.is_subtype_of(&env, &ints, &numbers));
        assert!(!checker.is_subtype_of(&env, &numbers, &ints));
        let mutable_ints = generic(standard::mutable_list(), class(standard::int()));
        assert!(checker.is_subtype_of(&env, &mutable_ints, &numbers));
        assert!(checker.is_subtype_of(
            &env,
            &mutable_ints,
            &generic(standard::iterable(), class(standard::int()))
        ));
    }

    #[test]
    fn test_equal_types_is_structural() {
        let env = env();
        let checker = HierarchyTypeChecker::new();
        let a = generic(standard::list(), class(standard::int()));
        let b = generic(standard::list(), class(standard::int()));
        assert!(checker.equal_types(&env, &a, &b));
        assert!(!checker.equal_types(&env, &a, &a.with_nullability(true)));
    }

    #[test]
    fn test_intersect_keeps_most_specific() {
        let env = env();
        let checker = HierarchyTypeChecker::new();
        let int = class(standard::int());
        let comparable = generic(standard::comparable(), int.clone());
        assert_eq!(checker.intersect(&env, &[comparable, int.clone()]), int);
    }

    #[test]
    fn test_intersect_unrelated_interfaces() {
        let env = env();
        let checker = HierarchyTypeChecker::new();
        let char_sequence = class(standard::char_sequence());
        let comparable = generic(standard::comparable(), class(standard::string()));
        let result = checker.intersect(&env, &[char_sequence.clone(), comparable.clone()]);
        assert_eq!(result, SemType::Intersection(vec![char_sequence, comparable]));
    }

    #[test]
    fn test_intersect_disjoint_classes_falls_back_to_common_supertype() {
        let env = env();
        let checker = HierarchyTypeChecker::new();
        let result = checker.intersect(&env, &[class(standard::int()), class(standard::long())]);
        assert_eq!(
            result,
            SemType::Intersection(vec![
                class(standard::number()),
                SemType::class_with(
                    standard::comparable(),
                    vec![TypeProjection::Star {
                        upper_bound: Box::new(SemType::nullable_any()),
                    }],
                ),
            ])
        );
    }

    #[test]
    fn test_common_supertype_of_string_and_int() {
        let env = env();
        let checker = HierarchyTypeChecker::new();
        let result = checker.common_supertype(&env, &[class(standard::string()), class(standard::int())]);
        // Both are Comparable of different arguments
        assert_eq!(
            result,
            SemType::class_with(
                standard::comparable(),
                vec![TypeProjection::Star {
                    upper_bound: Box::new(SemType::nullable_any()),
                }],
            )
        );
    }

    #[test]
    fn test_common_supertype_nullable() {
        let env = env();
        let checker = HierarchyTypeChecker::new();
        let int = class(standard::int());
        let result = checker.common_supertype(&env, &[int.clone(), SemType::nothing().with_nullability(true)]);
        assert_eq!(result, int.with_nullability(true));
    }
}
