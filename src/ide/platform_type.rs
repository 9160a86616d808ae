//! Projection of types onto JVM platform types.

use crate::base::{ClassId, standard};
use crate::config::TargetPlatform;
use crate::hir::{AnalysisSession, KType};
use crate::model::{SemType, TypeProjection};

/// A type as the JVM sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformType {
    /// Field descriptor, e.g. `Ljava/lang/String;`
    pub descriptor: String,
    /// Java source form, e.g. `java.util.List<java.lang.String>`
    pub rendered: String,
}

/// The JVM type of `ty`. `None` on non-JVM targets and for types that
/// contain an error.
#[track_caller]
pub fn platform_type(session: &AnalysisSession, ty: &KType) -> Option<PlatformType> {
    session.assert_accessible(ty.token());
    if session.language_settings().target_platform != TargetPlatform::Jvm {
        return None;
    }
    let ty = simplify(ty.semantic(session));
    if contains_error(&ty) {
        return None;
    }
    Some(PlatformType {
        descriptor: descriptor(&ty),
        rendered: render(&ty),
    })
}

fn simplify(ty: &SemType) -> SemType {
    match ty {
        SemType::Flexible { upper, .. } => simplify(upper),
        SemType::DefinitelyNotNull(inner) => simplify(inner).with_nullability(false),
        other => other.clone(),
    }
}

fn contains_error(ty: &SemType) -> bool {
    match ty {
        SemType::Error { .. } => true,
        SemType::Class { arguments, .. } => arguments.iter().any(|a| contains_error(a.ty())),
        SemType::TypeParameter { bounds, .. } | SemType::Intersection(bounds) => bounds.iter().any(contains_error),
        SemType::Flexible { lower, upper } => contains_error(lower) || contains_error(upper),
        SemType::DefinitelyNotNull(inner) => contains_error(inner),
    }
}

fn primitive(class_id: &ClassId) -> Option<(&'static str, &'static str, &'static str)> {
    let table = [
        (standard::int(), "I", "int", "java/lang/Integer"),
        (standard::long(), "J", "long", "java/lang/Long"),
        (standard::short(), "S", "short", "java/lang/Short"),
        (standard::byte(), "B", "byte", "java/lang/Byte"),
        (standard::boolean(), "Z", "boolean", "java/lang/Boolean"),
        (standard::char(), "C", "char", "java/lang/Character"),
        (standard::float(), "F", "float", "java/lang/Float"),
        (standard::double(), "D", "double", "java/lang/Double"),
    ];
    table
        .into_iter()
        .find(|(id, ..)| id == class_id)
        .map(|(_, descriptor, keyword, boxed)| (descriptor, keyword, boxed))
}

/// Internal name of a non-primitive class, `java/util/List` or
/// `pkg/Outer$Inner`.
fn internal_name(class_id: &ClassId) -> String {
    if let Some((_, _, boxed)) = primitive(class_id) {
        return boxed.to_string();
    }
    let mapped = [
        (standard::any(), "java/lang/Object"),
        (standard::nothing(), "java/lang/Void"),
        (standard::string(), "java/lang/String"),
        (standard::char_sequence(), "java/lang/CharSequence"),
        (standard::number(), "java/lang/Number"),
        (standard::comparable(), "java/lang/Comparable"),
        (standard::throwable(), "java/lang/Throwable"),
        (standard::enum_class(), "java/lang/Enum"),
        (standard::iterable(), "java/lang/Iterable"),
        (standard::collection(), "java/util/Collection"),
        (standard::list(), "java/util/List"),
        (standard::mutable_list(), "java/util/List"),
        (standard::set(), "java/util/Set"),
        (standard::map(), "java/util/Map"),
    ];
    if let Some((_, name)) = mapped.iter().find(|(id, _)| id == class_id) {
        return name.to_string();
    }
    let package: Vec<&str> = class_id.package_fq_name().segments().collect();
    let relative = class_id.relative_class_name().segments().collect::<Vec<_>>().join("$");
    if package.is_empty() {
        relative
    } else {
        format!("{}/{relative}", package.join("/"))
    }
}

/// Class a type erases to.
fn erasure(ty: &SemType) -> SemType {
    match ty {
        SemType::TypeParameter { bounds, nullable, .. } => bounds
            .first()
            .map(erasure)
            .unwrap_or_else(SemType::any)
            .with_nullability(*nullable),
        SemType::Intersection(parts) => parts.first().map(erasure).unwrap_or_else(SemType::any),
        other => simplify(other),
    }
}

fn descriptor(ty: &SemType) -> String {
    let SemType::Class { class_id, arguments, nullable } = erasure(ty) else {
        return "Ljava/lang/Object;".to_string();
    };
    if class_id == standard::array() {
        let element = arguments.first().map(|a| boxed_descriptor(a.ty())).unwrap_or_else(|| "Ljava/lang/Object;".to_string());
        return format!("[{element}");
    }
    match primitive(&class_id) {
        Some((descriptor, ..)) if !nullable => descriptor.to_string(),
        _ => format!("L{};", internal_name(&class_id)),
    }
}

fn boxed_descriptor(ty: &SemType) -> String {
    descriptor(&erasure(ty).with_nullability(true))
}

fn render(ty: &SemType) -> String {
    let SemType::Class { class_id, arguments, nullable } = erasure(ty) else {
        return "java.lang.Object".to_string();
    };
    if class_id == standard::array() {
        let element = arguments.first().map(|a| render(&a.ty().with_nullability(true))).unwrap_or_else(|| "java.lang.Object".to_string());
        return format!("{element}[]");
    }
    if let Some((_, keyword, boxed)) = primitive(&class_id) {
        return if nullable { boxed.replace('/', ".") } else { keyword.to_string() };
    }
    let name = internal_name(&class_id).replace(['/', '$'], ".");
    if arguments.is_empty() {
        return name;
    }
    let arguments: Vec<String> = arguments
        .iter()
        .map(|a| match a {
            TypeProjection::Star { .. } => "?".to_string(),
            TypeProjection::Projected { ty, .. } => render(&ty.with_nullability(true)),
        })
        .collect();
    format!("{name}<{}>", arguments.join(", "))
}
