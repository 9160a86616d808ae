//! Synthetic properties of platform (Java) classes.
//!
//! `getFoo()` / `isFoo()` with no parameters become a property `foo`, which
//! is a `var` when a matching one-argument `setFoo` exists. Only classes of
//! Java origin get them, and only with the feature enabled.

use std::sync::Arc;

use super::Symbol;
use crate::base::{CallableId, Name};
use crate::config::LanguageFeature;
use crate::hir::session::AnalysisSession;
use crate::model::{
    CallableKind, CallableRecord, ClassRecord, DeclRecord, SemType, SymbolOrigin,
};

/// Property name for an accessor-shaped method name.
fn property_name(method: &str) -> Option<String> {
    let rest = method
        .strip_prefix("get")
        .or_else(|| method.strip_prefix("is"))?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    if method.starts_with("is") {
        return Some(method.to_string());
    }
    Some(first.to_lowercase().chain(chars).collect())
}

/// Synthetic property records of `class`, in getter declaration order.
pub(crate) fn synthetic_property_records(class: &ClassRecord) -> Vec<CallableRecord> {
    let functions: Vec<&Arc<CallableRecord>> = class
        .members
        .iter()
        .filter_map(DeclRecord::as_callable)
        .filter(|c| c.kind == CallableKind::Function && !c.flags.is_static)
        .collect();
    let mut out = Vec::new();
    for getter in &functions {
        if !getter.value_parameters.is_empty()
            || !getter.type_parameters.is_empty()
            || getter.return_type == SemType::unit()
        {
            continue;
        }
        let Some(name) = property_name(getter.name().as_str()) else {
            continue;
        };
        if getter.name().as_str().starts_with("is")
            && getter.return_type.class_id() != Some(&crate::base::standard::boolean())
        {
            continue;
        }
        let prefix = if getter.name().as_str().starts_with("is") { 2 } else { 3 };
        let setter_name = format!("set{}", &getter.name().as_str()[prefix..]);
        let setter = functions.iter().find(|f| {
            f.name().as_str() == setter_name
                && f.value_parameters.len() == 1
                && f.value_parameters[0].ty == getter.return_type
        });

        let callable_id = CallableId::member(&class.class_id, Name::new(&name));
        let mut property = CallableRecord::new(
            CallableKind::SyntheticJavaProperty,
            callable_id.clone(),
            getter.return_type.clone(),
        );
        property.origin = SymbolOrigin::JavaSyntheticProperty;
        property.visibility = getter.visibility;
        property.modality = getter.modality;
        property.dispatch_receiver = getter.dispatch_receiver.clone();
        property.flags.is_var = setter.is_some();

        let mut getter_record = (***getter).clone();
        getter_record.kind = CallableKind::Getter;
        getter_record.callable_id = callable_id.clone();
        property.getter = Some(Arc::new(getter_record));
        if let Some(setter) = setter {
            let mut setter_record = (***setter).clone();
            setter_record.kind = CallableKind::Setter;
            setter_record.callable_id = callable_id;
            property.setter = Some(Arc::new(setter_record));
        }
        out.push(property);
    }
    out
}

/// Synthetic property symbols of a class, owned by `owner`.
pub fn synthetic_java_properties(session: &AnalysisSession, class: &ClassRecord, owner: &Symbol) -> Vec<Symbol> {
    if class.origin != SymbolOrigin::Java
        || !session
            .language_settings()
            .supports(LanguageFeature::JavaSyntheticProperties)
    {
        return Vec::new();
    }
    synthetic_property_records(class)
        .into_iter()
        .map(|record| session.record_symbol(&DeclRecord::Callable(Arc::new(record)), Some(owner)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ClassId, standard};
    use crate::model::ValueParameterRecord;

    fn method(class: &ClassId, name: &str, ret: SemType) -> DeclRecord {
        DeclRecord::Callable(Arc::new(CallableRecord::new(
            CallableKind::Function,
            CallableId::member(class, Name::new(name)),
            ret,
        )))
    }

    #[test]
    fn test_property_name() {
        assert_eq!(property_name("getFoo").as_deref(), Some("foo"));
        assert_eq!(property_name("isEnabled").as_deref(), Some("isEnabled"));
        assert_eq!(property_name("getaway"), None);
        assert_eq!(property_name("get"), None);
        assert_eq!(property_name("run"), None);
    }

    #[test]
    fn test_getter_and_setter_pair_makes_var() {
        let id = ClassId::parse("java/io/File");
        let mut class = ClassRecord::new(id.clone(), crate::model::ClassKind::Class);
        class.origin = SymbolOrigin::Java;
        let string = SemType::class(standard::string());
        class.members.push(method(&id, "getName", string.clone()));
        class.members.push(method(&id, "isHidden", SemType::class(standard::boolean())));
        let mut setter = CallableRecord::new(
            CallableKind::Function,
            CallableId::member(&id, Name::new("setName")),
            SemType::unit(),
        );
        setter
            .value_parameters
            .push(ValueParameterRecord::new(Name::new("name"), string));
        class.members.push(DeclRecord::Callable(Arc::new(setter)));

        let properties = synthetic_property_records(&class);
        let names: Vec<(&str, bool)> = properties
            .iter()
            .map(|p| (p.name().as_str(), p.flags.is_var))
            .collect();
        assert_eq!(names, vec![("name", true), ("isHidden", false)]);
        assert!(properties[0].setter.is_some());
    }
}
