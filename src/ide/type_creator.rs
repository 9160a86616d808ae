//! Building class types from a class reference and type arguments.

use std::sync::Arc;

use tracing::warn;

use crate::base::ClassId;
use crate::hir::{AnalysisSession, KType, KTypeProjection, Symbol};
use crate::model::{ClassRecord, SemType, TypeEnvironment, TypeProjection};

/// The class a type is built for.
#[derive(Debug, Clone)]
pub enum ClassTypeBuilder {
    ByClassId(ClassId),
    BySymbol(Symbol),
}

/// Class type `builder<arguments>`, nullable if asked.
///
/// When the argument count does not match the class's type parameters the
/// class's default type is returned instead. A class that cannot be found
/// yields an error type.
pub fn build_class_type(
    session: &AnalysisSession,
    builder: &ClassTypeBuilder,
    arguments: &[KTypeProjection],
    nullable: bool,
) -> KType {
    session.assert_valid();
    let Some(record) = resolve(session, builder) else {
        let description = match builder {
            ClassTypeBuilder::ByClassId(class_id) => format!("ByClassId({class_id})"),
            ClassTypeBuilder::BySymbol(symbol) => format!("BySymbol({symbol:?})"),
        };
        return session.ktype(SemType::error(
            description.clone(),
            format!("Cannot build class type, descriptor not found for builder {description}"),
        ));
    };

    let ty = if arguments.len() == record.type_parameters.len() {
        let projections = record
            .type_parameters
            .iter()
            .zip(arguments)
            .map(|(param, argument)| match argument {
                KTypeProjection::Star => TypeProjection::Star {
                    upper_bound: Box::new(param.star_bound()),
                },
                KTypeProjection::Projected { variance, ty } => {
                    session.assert_accessible(ty.token());
                    TypeProjection::Projected {
                        variance: *variance,
                        ty: ty.semantic(session).clone(),
                    }
                }
            })
            .collect();
        SemType::class_with(record.class_id.clone(), projections)
    } else {
        warn!(
            class = %record.class_id,
            expected = record.type_parameters.len(),
            got = arguments.len(),
            "type argument count mismatch, using the default type"
        );
        record.default_type()
    };
    session.ktype(ty.with_nullability(nullable))
}

fn resolve(session: &AnalysisSession, builder: &ClassTypeBuilder) -> Option<Arc<ClassRecord>> {
    match builder {
        ClassTypeBuilder::ByClassId(class_id) => session.class_record(class_id),
        ClassTypeBuilder::BySymbol(symbol) => {
            session.assert_accessible(symbol.token());
            symbol.class_record(session)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::standard;
    use crate::hir::testing::session_with;
    use crate::model::Variance;

    fn string(session: &AnalysisSession) -> KType {
        session.ktype(SemType::class(standard::string()))
    }

    #[test]
    fn test_build_with_matching_arguments() {
        let session = session_with(&[]);
        let argument = KTypeProjection::Projected {
            variance: Variance::Invariant,
            ty: string(&session),
        };
        let ty = build_class_type(&session, &ClassTypeBuilder::ByClassId(standard::list()), &[argument], true);
        assert_eq!(ty.to_string(), "kotlin.collections.List<kotlin.String>?");
        assert!(ty.is_marked_nullable(&session));
    }

    #[test]
    fn test_count_mismatch_falls_back_to_default_type() {
        let session = session_with(&[]);
        let ty = build_class_type(&session, &ClassTypeBuilder::ByClassId(standard::list()), &[], false);
        assert_eq!(ty.semantic(&session), &session.class_record(&standard::list()).unwrap().default_type());
    }

    #[test]
    fn test_star_argument_uses_parameter_bound() {
        let session = session_with(&[("a.kt", "class Box<T : CharSequence>")]);
        let class = session.class_symbol(&ClassId::parse("Box")).unwrap();
        let ty = build_class_type(&session, &ClassTypeBuilder::BySymbol(class), &[KTypeProjection::Star], false);
        match &ty.semantic(&session).arguments()[0] {
            TypeProjection::Star { upper_bound } => {
                assert_eq!(**upper_bound, SemType::class(standard::char_sequence()))
            }
            other => panic!("unexpected argument {other:?}"),
        }
    }

    #[test]
    fn test_missing_class_gives_error_type() {
        let session = session_with(&[]);
        let ty = build_class_type(&session, &ClassTypeBuilder::ByClassId(ClassId::parse("nowhere/Missing")), &[], false);
        assert!(ty.is_error(&session));
        assert!(ty.error_message(&session).unwrap().contains("descriptor not found"));
        assert!(ty.candidate_symbols(&session).is_empty());
    }
}
