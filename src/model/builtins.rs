//! A minimal standard library.
//!
//! Enough of `kotlin`, `kotlin.collections` and a couple of Java classes to
//! resolve everyday source: primitives with their `Number`/`Comparable`
//! supertypes, strings, enums, function types, read-only and mutable
//! collections and `java.io.File` for platform interop.

use std::sync::Arc;

use smol_str::SmolStr;

use super::memory::InMemoryModuleGraph;
use super::records::{
    CallableFlags, CallableKind, CallableRecord, ClassKind, ClassRecord, DeclRecord, Modality,
    SemType, SymbolOrigin, TypeAliasRecord, TypeParameterRecord, TypeProjection,
    ValueParameterRecord, Variance,
};
use crate::base::{CallableId, ClassId, FqName, Name, standard};

/// Module name builtins are registered under.
pub const STDLIB_MODULE: &str = "stdlib";
/// Module name of the platform classes.
pub const JDK_MODULE: &str = "jdk";

// ============================================================================
// Construction helpers
// ============================================================================

fn ty(id: ClassId) -> SemType {
    SemType::class(id)
}

fn ty_of(id: ClassId, args: Vec<SemType>) -> SemType {
    SemType::class_with(id, args.into_iter().map(TypeProjection::invariant).collect())
}

fn param(name: &str) -> SemType {
    SemType::TypeParameter {
        name: Name::new(name),
        bounds: Vec::new(),
        nullable: false,
    }
}

fn type_param(name: &str, variance: Variance) -> TypeParameterRecord {
    let mut record = TypeParameterRecord::new(Name::new(name));
    record.variance = variance;
    record
}

/// A platform type `T!`.
fn platform(ty: SemType) -> SemType {
    SemType::Flexible {
        lower: Box::new(ty.clone()),
        upper: Box::new(ty.with_nullability(true)),
    }
}

struct ClassBuilder {
    record: ClassRecord,
}

impl ClassBuilder {
    fn new(path: &str, kind: ClassKind) -> Self {
        let mut record = ClassRecord::new(ClassId::parse(path), kind);
        record.origin = SymbolOrigin::Library;
        if kind == ClassKind::Interface {
            record.modality = Modality::Abstract;
        }
        Self { record }
    }

    fn java(mut self) -> Self {
        self.record.origin = SymbolOrigin::Java;
        self.record.modality = Modality::Open;
        self
    }

    fn modality(mut self, modality: Modality) -> Self {
        self.record.modality = modality;
        self
    }

    fn type_params(mut self, params: Vec<TypeParameterRecord>) -> Self {
        self.record.type_parameters = params;
        self
    }

    fn supertypes(mut self, supertypes: Vec<SemType>) -> Self {
        self.record.supertypes = supertypes;
        self
    }

    fn id(&self) -> ClassId {
        self.record.class_id.clone()
    }

    fn callable(&self, kind: CallableKind, name: &str, ret: SemType) -> CallableRecord {
        let id = self.id();
        let mut record = CallableRecord::new(kind, CallableId::member(&id, Name::new(name)), ret);
        record.origin = self.record.origin;
        record.dispatch_receiver = Some(self.record.default_type());
        record
    }

    fn fun(mut self, name: &str, params: &[(&str, SemType)], ret: SemType) -> Self {
        let mut record = self.callable(CallableKind::Function, name, ret);
        record.value_parameters = value_params(params);
        if self.record.kind == ClassKind::Interface {
            record.modality = Modality::Abstract;
        }
        self.record.members.push(DeclRecord::Callable(Arc::new(record)));
        self
    }

    fn operator(mut self, name: &str, params: &[(&str, SemType)], ret: SemType) -> Self {
        let mut record = self.callable(CallableKind::Function, name, ret);
        record.value_parameters = value_params(params);
        record.flags.is_operator = true;
        self.record.members.push(DeclRecord::Callable(Arc::new(record)));
        self
    }

    fn val(mut self, name: &str, ret: SemType) -> Self {
        let mut record = self.callable(CallableKind::Property, name, ret.clone());
        record.flags.has_backing_field = self.record.kind != ClassKind::Interface;
        record.getter = Some(Arc::new(accessor(&record, CallableKind::Getter, ret)));
        self.record.members.push(DeclRecord::Callable(Arc::new(record)));
        self
    }

    fn constructor(mut self, params: &[(&str, SemType)]) -> Self {
        let mut record = self.callable(
            CallableKind::Constructor { primary: true },
            "<init>",
            self.record.default_type(),
        );
        record.dispatch_receiver = None;
        record.value_parameters = value_params(params);
        self.record.members.push(DeclRecord::Callable(Arc::new(record)));
        self
    }

    fn static_field(mut self, name: &str, ret: SemType) -> Self {
        let mut record = self.callable(CallableKind::JavaField, name, ret);
        record.dispatch_receiver = None;
        record.flags = CallableFlags {
            is_static: true,
            has_backing_field: true,
            ..CallableFlags::default()
        };
        self.record.static_members.push(DeclRecord::Callable(Arc::new(record)));
        self
    }

    fn static_fun(mut self, name: &str, params: &[(&str, SemType)], ret: SemType) -> Self {
        let mut record = self.callable(CallableKind::Function, name, ret);
        record.dispatch_receiver = None;
        record.value_parameters = value_params(params);
        record.flags.is_static = true;
        self.record.static_members.push(DeclRecord::Callable(Arc::new(record)));
        self
    }

    fn nested(mut self, nested: ClassRecord) -> Self {
        self.record.members.push(DeclRecord::Class(Arc::new(nested)));
        self
    }

    fn build(self) -> ClassRecord {
        self.record
    }
}

fn value_params(params: &[(&str, SemType)]) -> Vec<ValueParameterRecord> {
    params
        .iter()
        .map(|(name, ty)| ValueParameterRecord::new(Name::new(name), ty.clone()))
        .collect()
}

fn accessor(property: &CallableRecord, kind: CallableKind, ret: SemType) -> CallableRecord {
    let mut record = CallableRecord::new(kind, property.callable_id.clone(), ret);
    record.origin = property.origin;
    record.dispatch_receiver = property.dispatch_receiver.clone();
    record
}

fn top_level_fun(
    package: &str,
    name: &str,
    type_params: Vec<TypeParameterRecord>,
    params: &[(&str, SemType)],
    ret: SemType,
) -> CallableRecord {
    let mut record = CallableRecord::new(
        CallableKind::Function,
        CallableId::top_level(FqName::new(package), Name::new(name)),
        ret,
    );
    record.origin = SymbolOrigin::Library;
    record.type_parameters = type_params;
    record.value_parameters = value_params(params);
    record
}

// ============================================================================
// The library
// ============================================================================

/// A graph holding the standard library and platform classes.
pub fn builtins() -> InMemoryModuleGraph {
    let mut graph = InMemoryModuleGraph::new();
    for class in stdlib_classes() {
        graph.add_class(STDLIB_MODULE, class);
    }
    for callable in stdlib_functions() {
        graph.add_callable(STDLIB_MODULE, callable);
    }
    graph.add_type_alias(STDLIB_MODULE, array_list_alias());
    for class in jdk_classes() {
        graph.add_class(JDK_MODULE, class);
    }
    graph
}

/// Packages imported by default into every file.
pub fn default_imports() -> Vec<FqName> {
    ["kotlin", "kotlin.collections", "kotlin.io"]
        .into_iter()
        .map(FqName::new)
        .collect()
}

fn primitive(path: &str, extra: impl FnOnce(ClassBuilder) -> ClassBuilder) -> ClassRecord {
    let id = ClassId::parse(path);
    let builder = ClassBuilder::new(path, ClassKind::Class).supertypes(vec![
        ty(standard::number()),
        ty_of(standard::comparable(), vec![ty(id.clone())]),
    ]);
    extra(builder)
        .operator("plus", &[("other", ty(id.clone()))], ty(id.clone()))
        .operator("compareTo", &[("other", ty(id.clone()))], ty(standard::int()))
        .build()
}

fn stdlib_classes() -> Vec<ClassRecord> {
    let boolean = ty(standard::boolean());
    let int = ty(standard::int());
    let string = ty(standard::string());

    let enum_bound = {
        let mut e = type_param("E", Variance::Invariant);
        e.bounds = vec![ty_of(standard::enum_class(), vec![param("E")])];
        e
    };

    let map_entry = ClassBuilder::new("kotlin/collections/Map.Entry", ClassKind::Interface)
        .type_params(vec![type_param("K", Variance::Out), type_param("V", Variance::Out)])
        .val("key", param("K"))
        .val("value", param("V"))
        .build();

    vec![
        ClassBuilder::new("kotlin/Any", ClassKind::Class)
            .modality(Modality::Open)
            .constructor(&[])
            .fun("equals", &[("other", SemType::nullable_any())], boolean.clone())
            .fun("hashCode", &[], int.clone())
            .fun("toString", &[], string.clone())
            .build(),
        ClassBuilder::new("kotlin/Nothing", ClassKind::Class).build(),
        ClassBuilder::new("kotlin/Unit", ClassKind::Object).build(),
        ClassBuilder::new("kotlin/Comparable", ClassKind::Interface)
            .type_params(vec![type_param("T", Variance::In)])
            .fun("compareTo", &[("other", param("T"))], int.clone())
            .build(),
        ClassBuilder::new("kotlin/Number", ClassKind::Class)
            .modality(Modality::Abstract)
            .fun("toInt", &[], int.clone())
            .fun("toLong", &[], ty(standard::long()))
            .fun("toDouble", &[], ty(standard::double()))
            .build(),
        primitive("kotlin/Int", |b| b.fun("inc", &[], ty(standard::int()))),
        primitive("kotlin/Long", |b| b),
        primitive("kotlin/Short", |b| b),
        primitive("kotlin/Byte", |b| b),
        primitive("kotlin/Double", |b| b.fun("isNaN", &[], ty(standard::boolean()))),
        primitive("kotlin/Float", |b| b),
        ClassBuilder::new("kotlin/Boolean", ClassKind::Class)
            .supertypes(vec![ty_of(standard::comparable(), vec![boolean.clone()])])
            .operator("not", &[], boolean.clone())
            .build(),
        ClassBuilder::new("kotlin/Char", ClassKind::Class)
            .supertypes(vec![ty_of(standard::comparable(), vec![ty(standard::char())])])
            .build(),
        ClassBuilder::new("kotlin/CharSequence", ClassKind::Interface)
            .val("length", int.clone())
            .operator("get", &[("index", int.clone())], ty(standard::char()))
            .build(),
        ClassBuilder::new("kotlin/String", ClassKind::Class)
            .supertypes(vec![
                ty_of(standard::comparable(), vec![string.clone()]),
                ty(standard::char_sequence()),
            ])
            .val("length", int.clone())
            .operator("plus", &[("other", SemType::nullable_any())], string.clone())
            .operator("get", &[("index", int.clone())], ty(standard::char()))
            .build(),
        ClassBuilder::new("kotlin/Throwable", ClassKind::Class)
            .modality(Modality::Open)
            .constructor(&[])
            .val("message", string.with_nullability(true))
            .build(),
        ClassBuilder::new("kotlin/Enum", ClassKind::Class)
            .modality(Modality::Abstract)
            .type_params(vec![enum_bound.clone()])
            .supertypes(vec![ty_of(standard::comparable(), vec![param("E")])])
            .val("name", string.clone())
            .val("ordinal", int.clone())
            .build(),
        ClassBuilder::new("kotlin/Array", ClassKind::Class)
            .type_params(vec![type_param("T", Variance::Invariant)])
            .val("size", int.clone())
            .operator("get", &[("index", int.clone())], param("T"))
            .build(),
        ClassBuilder::new("kotlin/Function", ClassKind::Interface)
            .type_params(vec![type_param("R", Variance::Out)])
            .build(),
        function_class(0),
        function_class(1),
        function_class(2),
        ClassBuilder::new("kotlin/collections/Iterable", ClassKind::Interface)
            .type_params(vec![type_param("T", Variance::Out)])
            .build(),
        ClassBuilder::new("kotlin/collections/Collection", ClassKind::Interface)
            .type_params(vec![type_param("E", Variance::Out)])
            .supertypes(vec![ty_of(standard::iterable(), vec![param("E")])])
            .val("size", int.clone())
            .fun("isEmpty", &[], boolean.clone())
            .operator("contains", &[("element", param("E"))], boolean.clone())
            .build(),
        ClassBuilder::new("kotlin/collections/List", ClassKind::Interface)
            .type_params(vec![type_param("E", Variance::Out)])
            .supertypes(vec![ty_of(standard::collection(), vec![param("E")])])
            .operator("get", &[("index", int.clone())], param("E"))
            .build(),
        ClassBuilder::new("kotlin/collections/MutableList", ClassKind::Interface)
            .type_params(vec![type_param("E", Variance::Invariant)])
            .supertypes(vec![ty_of(standard::list(), vec![param("E")])])
            .fun("add", &[("element", param("E"))], boolean.clone())
            .build(),
        ClassBuilder::new("kotlin/collections/Set", ClassKind::Interface)
            .type_params(vec![type_param("E", Variance::Out)])
            .supertypes(vec![ty_of(standard::collection(), vec![param("E")])])
            .build(),
        ClassBuilder::new("kotlin/collections/Map", ClassKind::Interface)
            .type_params(vec![type_param("K", Variance::Invariant), type_param("V", Variance::Out)])
            .val("size", int.clone())
            .operator("get", &[("key", param("K"))], param("V").with_nullability(true))
            .val(
                "entries",
                ty_of(
                    standard::set(),
                    vec![ty_of(ClassId::parse("kotlin/collections/Map.Entry"), vec![param("K"), param("V")])],
                ),
            )
            .nested(map_entry)
            .build(),
        ClassBuilder::new("kotlin/enums/EnumEntries", ClassKind::Interface)
            .type_params(vec![enum_bound])
            .supertypes(vec![ty_of(standard::list(), vec![param("E")])])
            .build(),
    ]
}

fn function_class(arity: usize) -> ClassRecord {
    let id = standard::function_n(arity);
    let mut params: Vec<TypeParameterRecord> = (1..=arity)
        .map(|i| type_param(&format!("P{i}"), Variance::In))
        .collect();
    params.push(type_param("R", Variance::Out));
    let invoke_params: Vec<(String, SemType)> = (1..=arity)
        .map(|i| (format!("p{i}"), param(&format!("P{i}"))))
        .collect();
    let invoke_params: Vec<(&str, SemType)> = invoke_params
        .iter()
        .map(|(n, t)| (n.as_str(), t.clone()))
        .collect();
    ClassBuilder::new(&id.to_string(), ClassKind::Interface)
        .type_params(params)
        .supertypes(vec![ty_of(standard::function(), vec![param("R")])])
        .operator("invoke", &invoke_params, param("R"))
        .build()
}

fn stdlib_functions() -> Vec<CallableRecord> {
    let t = || vec![type_param("T", Variance::Invariant)];
    let mut list_of = top_level_fun(
        "kotlin.collections",
        "listOf",
        t(),
        &[("elements", param("T"))],
        ty_of(standard::list(), vec![param("T")]),
    );
    if let Some(elements) = list_of.value_parameters.first_mut() {
        elements.is_vararg = true;
    }
    vec![
        list_of,
        top_level_fun(
            "kotlin.collections",
            "emptyList",
            t(),
            &[],
            ty_of(standard::list(), vec![param("T")]),
        ),
        top_level_fun(
            "kotlin.io",
            "println",
            Vec::new(),
            &[("message", SemType::nullable_any())],
            SemType::unit(),
        ),
        top_level_fun("kotlin", "TODO", Vec::new(), &[], SemType::nothing()),
    ]
}

fn array_list_alias() -> TypeAliasRecord {
    TypeAliasRecord {
        class_id: ClassId::parse("kotlin/collections/ArrayList"),
        visibility: Default::default(),
        type_parameters: vec![type_param("E", Variance::Invariant)],
        expanded: ty_of(ClassId::parse("java/util/ArrayList"), vec![param("E")]),
        annotations: Vec::new(),
        origin: SymbolOrigin::Library,
        source: None,
    }
}

fn jdk_classes() -> Vec<ClassRecord> {
    let file = ty(ClassId::parse("java/io/File"));
    let string = ty(standard::string());
    let mut file_class = ClassBuilder::new("java/io/File", ClassKind::Class)
        .java()
        .supertypes(vec![ty_of(standard::comparable(), vec![platform(file.clone())])])
        .constructor(&[("pathname", platform(string.clone()))])
        .fun("getName", &[], platform(string.clone()))
        .fun("getParentFile", &[], platform(file.clone()))
        .fun("isDirectory", &[], ty(standard::boolean()))
        .fun("setReadable", &[("readable", ty(standard::boolean()))], ty(standard::boolean()))
        .static_field("separator", platform(string.clone()))
        .static_fun(
            "createTempFile",
            &[("prefix", platform(string.clone())), ("suffix", platform(string))],
            platform(file),
        )
        .build();
    file_class.file_name = Some(SmolStr::new("File.java"));

    let array_list = ClassBuilder::new("java/util/ArrayList", ClassKind::Class)
        .java()
        .type_params(vec![type_param("E", Variance::Invariant)])
        .supertypes(vec![ty_of(standard::mutable_list(), vec![param("E")])])
        .constructor(&[])
        .build();

    vec![file_class, array_list]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::ModuleGraph;

    #[test]
    fn test_builtins_contain_primitives() {
        let graph = builtins();
        let int = graph.find_class(&standard::int()).unwrap();
        assert_eq!(int.supertypes.len(), 2);
        assert!(graph.find_class(&ClassId::parse("kotlin/collections/Map.Entry")).is_some());
        assert!(graph.find_type_alias(&ClassId::parse("kotlin/collections/ArrayList")).is_some());
    }

    #[test]
    fn test_top_level_functions_in_fragments() {
        let graph = builtins();
        let fragments = graph.package_fragments(&FqName::new("kotlin.collections"));
        let names: Vec<Name> = fragments
            .iter()
            .flat_map(|f| f.declarations.iter().map(DeclRecord::name))
            .collect();
        assert!(names.contains(&Name::new("listOf")));
        assert!(names.contains(&Name::new("List")));
    }

    #[test]
    fn test_java_class_origin() {
        let graph = builtins();
        let file = graph.find_class(&ClassId::parse("java/io/File")).unwrap();
        assert_eq!(file.origin, SymbolOrigin::Java);
        assert_eq!(file.static_members.len(), 2);
    }
}
