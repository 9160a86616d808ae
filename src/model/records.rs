//! Declaration records and semantic types.
//!
//! Records are the resolved, compiler-side description of a declaration. A
//! library class arrives as a [`ClassRecord`] straight from the module graph;
//! a source class gets one when the inference oracle lowers its declaration
//! node. Either way the facade reads the same shape.
//!
//! [`SemType`] is the underlying type value the [`TypeChecker`] operates on.
//!
//! [`TypeChecker`]: super::TypeChecker

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{CallableId, ClassId, FileId, Name, standard};
use crate::syntax::NodePtr;

// ============================================================================
// Small enums
// ============================================================================

/// Where a declaration comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolOrigin {
    /// Written in a source file
    Source,
    /// Generated by the compiler for a source declaration (data class
    /// `componentN`, enum `values`, default constructors)
    SourceMemberGenerated,
    /// Read from compiled metadata or a decompiled stub
    Library,
    /// Declared in Java
    Java,
    /// `getFoo()`/`setFoo()` of a Java class seen as property `foo`
    JavaSyntheticProperty,
    /// Produced by interface delegation (`class A : I by impl`)
    Delegated,
    /// The `field` behind a property
    PropertyBackingField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modality {
    #[default]
    Final,
    Open,
    Abstract,
    Sealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variance {
    #[default]
    Invariant,
    In,
    Out,
}

impl Variance {
    pub fn label(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::In => "in",
            Variance::Out => "out",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    EnumClass,
    EnumEntry,
    AnnotationClass,
    Object,
    CompanionObject,
    AnonymousObject,
}

impl ClassKind {
    pub fn is_object(self) -> bool {
        matches!(
            self,
            ClassKind::Object | ClassKind::CompanionObject | ClassKind::AnonymousObject
        )
    }
}

/// Location of the declaration node a record was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRef {
    pub file: FileId,
    pub ptr: NodePtr,
}

// ============================================================================
// Semantic types
// ============================================================================

/// An underlying type value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemType {
    Class {
        class_id: ClassId,
        arguments: Vec<TypeProjection>,
        nullable: bool,
    },
    TypeParameter {
        name: Name,
        /// Upper bounds; references to the parameter inside its own bounds
        /// are kept shallow (no bounds) to stay finite.
        bounds: Vec<SemType>,
        nullable: bool,
    },
    /// Platform type `lower..upper` (`String!`)
    Flexible {
        lower: Box<SemType>,
        upper: Box<SemType>,
    },
    Intersection(Vec<SemType>),
    /// `T & Any`
    DefinitelyNotNull(Box<SemType>),
    /// A type whose name could not be bound.
    Error {
        presentable: SmolStr,
        reason: SmolStr,
        nullable: bool,
    },
}

/// One type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeProjection {
    /// `*`, standing for the parameter's upper bound
    Star { upper_bound: Box<SemType> },
    Projected { variance: Variance, ty: SemType },
}

impl TypeProjection {
    pub fn invariant(ty: SemType) -> Self {
        TypeProjection::Projected {
            variance: Variance::Invariant,
            ty,
        }
    }

    /// The type this argument contributes when read.
    pub fn ty(&self) -> &SemType {
        match self {
            TypeProjection::Star { upper_bound } => upper_bound,
            TypeProjection::Projected { ty, .. } => ty,
        }
    }
}

impl SemType {
    pub fn class(class_id: ClassId) -> Self {
        SemType::Class {
            class_id,
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn class_with(class_id: ClassId, arguments: Vec<TypeProjection>) -> Self {
        SemType::Class {
            class_id,
            arguments,
            nullable: false,
        }
    }

    pub fn error(presentable: impl Into<SmolStr>, reason: impl Into<SmolStr>) -> Self {
        SemType::Error {
            presentable: presentable.into(),
            reason: reason.into(),
            nullable: false,
        }
    }

    pub fn any() -> Self {
        Self::class(standard::any())
    }

    pub fn nullable_any() -> Self {
        Self::any().with_nullability(true)
    }

    pub fn nothing() -> Self {
        Self::class(standard::nothing())
    }

    pub fn unit() -> Self {
        Self::class(standard::unit())
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            SemType::Class { nullable, .. }
            | SemType::TypeParameter { nullable, .. }
            | SemType::Error { nullable, .. } => *nullable,
            SemType::Flexible { upper, .. } => upper.is_nullable(),
            SemType::Intersection(parts) => parts.iter().all(SemType::is_nullable),
            SemType::DefinitelyNotNull(_) => false,
        }
    }

    /// Whether `null` can be a value of this type. Unlike
    /// [`is_nullable`](Self::is_nullable) this follows type parameter bounds.
    pub fn can_be_null(&self) -> bool {
        match self {
            SemType::TypeParameter {
                bounds, nullable, ..
            } => *nullable || bounds.is_empty() || bounds.iter().all(SemType::can_be_null),
            SemType::Flexible { upper, .. } => upper.can_be_null(),
            SemType::Intersection(parts) => parts.iter().all(SemType::can_be_null),
            other => other.is_nullable(),
        }
    }

    pub fn with_nullability(&self, value: bool) -> SemType {
        match self {
            SemType::Class {
                class_id,
                arguments,
                ..
            } => SemType::Class {
                class_id: class_id.clone(),
                arguments: arguments.clone(),
                nullable: value,
            },
            SemType::TypeParameter { name, bounds, .. } => SemType::TypeParameter {
                name: name.clone(),
                bounds: bounds.clone(),
                nullable: value,
            },
            SemType::Error {
                presentable,
                reason,
                ..
            } => SemType::Error {
                presentable: presentable.clone(),
                reason: reason.clone(),
                nullable: value,
            },
            SemType::Flexible { lower, upper } => SemType::Flexible {
                lower: Box::new(lower.with_nullability(value)),
                upper: Box::new(upper.with_nullability(value)),
            },
            SemType::Intersection(parts) => {
                SemType::Intersection(parts.iter().map(|p| p.with_nullability(value)).collect())
            }
            SemType::DefinitelyNotNull(inner) if value => inner.with_nullability(true),
            SemType::DefinitelyNotNull(inner) => SemType::DefinitelyNotNull(inner.clone()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SemType::Error { .. })
    }

    /// `true` if this type or any nested argument is an error type.
    pub fn contains_error(&self) -> bool {
        match self {
            SemType::Error { .. } => true,
            SemType::Class { arguments, .. } => arguments.iter().any(|a| a.ty().contains_error()),
            SemType::TypeParameter { .. } => false,
            SemType::Flexible { lower, upper } => lower.contains_error() || upper.contains_error(),
            SemType::Intersection(parts) => parts.iter().any(SemType::contains_error),
            SemType::DefinitelyNotNull(inner) => inner.contains_error(),
        }
    }

    pub fn class_id(&self) -> Option<&ClassId> {
        match self {
            SemType::Class { class_id, .. } => Some(class_id),
            _ => None,
        }
    }

    pub fn arguments(&self) -> &[TypeProjection] {
        match self {
            SemType::Class { arguments, .. } => arguments,
            _ => &[],
        }
    }

    pub fn is_nothing(&self) -> bool {
        self.class_id() == Some(&standard::nothing())
    }

    pub fn is_any(&self) -> bool {
        self.class_id() == Some(&standard::any())
    }

    /// Replace type parameters by name.
    pub fn substitute(&self, subst: &dyn Fn(&Name) -> Option<TypeProjection>) -> SemType {
        match self {
            SemType::TypeParameter { name, nullable, .. } => match subst(name) {
                Some(projection) => {
                    let ty = projection.ty().clone();
                    if *nullable { ty.with_nullability(true) } else { ty }
                }
                None => self.clone(),
            },
            SemType::Class {
                class_id,
                arguments,
                nullable,
            } => SemType::Class {
                class_id: class_id.clone(),
                arguments: arguments
                    .iter()
                    .map(|a| match a {
                        TypeProjection::Star { upper_bound } => TypeProjection::Star {
                            upper_bound: Box::new(upper_bound.substitute(subst)),
                        },
                        TypeProjection::Projected { variance, ty } => {
                            match (ty, variance) {
                                // `T` itself substituted by a projection keeps its variance
                                (SemType::TypeParameter { name, .. }, Variance::Invariant) => {
                                    match subst(name) {
                                        Some(projection) => projection,
                                        None => a.clone(),
                                    }
                                }
                                _ => TypeProjection::Projected {
                                    variance: *variance,
                                    ty: ty.substitute(subst),
                                },
                            }
                        }
                    })
                    .collect(),
                nullable: *nullable,
            },
            SemType::Flexible { lower, upper } => SemType::Flexible {
                lower: Box::new(lower.substitute(subst)),
                upper: Box::new(upper.substitute(subst)),
            },
            SemType::Intersection(parts) => {
                SemType::Intersection(parts.iter().map(|p| p.substitute(subst)).collect())
            }
            SemType::DefinitelyNotNull(inner) => {
                SemType::DefinitelyNotNull(Box::new(inner.substitute(subst)))
            }
            SemType::Error { .. } => self.clone(),
        }
    }
}

impl fmt::Display for SemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemType::Class {
                class_id,
                arguments,
                nullable,
            } => {
                write!(f, "{}", class_id.as_fq_name())?;
                if !arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                if *nullable {
                    f.write_str("?")?;
                }
                Ok(())
            }
            SemType::TypeParameter { name, nullable, .. } => {
                write!(f, "{name}{}", if *nullable { "?" } else { "" })
            }
            SemType::Flexible { lower, upper } => write!(f, "({lower}..{upper})"),
            SemType::Intersection(parts) => {
                f.write_str("{")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str("}")
            }
            SemType::DefinitelyNotNull(inner) => write!(f, "{inner} & Any"),
            SemType::Error {
                presentable,
                nullable,
                ..
            } => write!(f, "ERROR({presentable}){}", if *nullable { "?" } else { "" }),
        }
    }
}

impl fmt::Display for TypeProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeProjection::Star { .. } => f.write_str("*"),
            TypeProjection::Projected {
                variance: Variance::Invariant,
                ty,
            } => write!(f, "{ty}"),
            TypeProjection::Projected { variance, ty } => write!(f, "{} {ty}", variance.label()),
        }
    }
}

// ============================================================================
// Annotations and constants
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Null,
    Boolean(bool),
    Char(char),
    Int(i64),
    Long(i64),
    Double(f64),
    String(String),
    EnumEntry { class_id: ClassId, entry: Name },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub class_id: ClassId,
    pub arguments: Vec<(Name, ConstantValue)>,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone)]
pub struct TypeParameterRecord {
    pub name: Name,
    pub variance: Variance,
    pub reified: bool,
    pub bounds: Vec<SemType>,
    pub source: Option<SourceRef>,
}

impl TypeParameterRecord {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            variance: Variance::Invariant,
            reified: false,
            bounds: Vec::new(),
            source: None,
        }
    }

    /// The parameter as a type (`T`).
    pub fn as_type(&self) -> SemType {
        SemType::TypeParameter {
            name: self.name.clone(),
            bounds: self.bounds.clone(),
            nullable: false,
        }
    }

    /// The bound a star projection stands for.
    pub fn star_bound(&self) -> SemType {
        match self.bounds.as_slice() {
            [] => SemType::nullable_any(),
            [single] => single.clone(),
            many => SemType::Intersection(many.to_vec()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValueParameterRecord {
    pub name: Name,
    pub ty: SemType,
    pub has_default: bool,
    pub is_vararg: bool,
    pub source: Option<SourceRef>,
}

impl ValueParameterRecord {
    pub fn new(name: Name, ty: SemType) -> Self {
        Self {
            name,
            ty,
            has_default: false,
            is_vararg: false,
            source: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableKind {
    Function,
    AnonymousFunction,
    Constructor { primary: bool },
    Property,
    LocalVariable,
    Getter,
    Setter,
    JavaField,
    SyntheticJavaProperty,
}

/// Boolean facts about a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallableFlags {
    pub is_var: bool,
    pub is_const: bool,
    pub is_lateinit: bool,
    pub is_delegated: bool,
    pub is_override: bool,
    pub is_static: bool,
    pub is_inline: bool,
    pub is_operator: bool,
    pub from_primary_constructor: bool,
    pub has_backing_field: bool,
    /// Accessor written in source rather than implied
    pub is_explicit: bool,
}

#[derive(Debug, Clone)]
pub struct CallableRecord {
    pub callable_id: CallableId,
    pub kind: CallableKind,
    pub modality: Modality,
    pub visibility: Visibility,
    pub type_parameters: Vec<TypeParameterRecord>,
    pub value_parameters: Vec<ValueParameterRecord>,
    pub receiver_type: Option<SemType>,
    pub dispatch_receiver: Option<SemType>,
    pub return_type: SemType,
    pub flags: CallableFlags,
    pub getter: Option<Arc<CallableRecord>>,
    pub setter: Option<Arc<CallableRecord>>,
    pub initializer: Option<ConstantValue>,
    pub annotations: Vec<AnnotationRecord>,
    pub origin: SymbolOrigin,
    pub is_local: bool,
    pub source: Option<SourceRef>,
}

impl CallableRecord {
    pub fn new(kind: CallableKind, callable_id: CallableId, return_type: SemType) -> Self {
        Self {
            callable_id,
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            type_parameters: Vec::new(),
            value_parameters: Vec::new(),
            receiver_type: None,
            dispatch_receiver: None,
            return_type,
            flags: CallableFlags::default(),
            getter: None,
            setter: None,
            initializer: None,
            annotations: Vec::new(),
            origin: SymbolOrigin::Library,
            is_local: false,
            source: None,
        }
    }

    pub fn name(&self) -> &Name {
        &self.callable_id.callable
    }

    pub fn is_property_like(&self) -> bool {
        matches!(
            self.kind,
            CallableKind::Property
                | CallableKind::LocalVariable
                | CallableKind::JavaField
                | CallableKind::SyntheticJavaProperty
        )
    }

    /// Disambiguating signature used by pointers: receiver and value
    /// parameter types.
    pub fn signature(&self) -> SmolStr {
        let mut out = String::new();
        if let Some(receiver) = &self.receiver_type {
            out.push_str(&receiver.to_string());
            out.push('.');
        }
        if !self.is_property_like() {
            out.push('(');
            for (i, p) in self.value_parameters.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&p.ty.to_string());
            }
            out.push(')');
        }
        SmolStr::new(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassFlags {
    pub is_data: bool,
    pub is_inner: bool,
    pub is_fun_interface: bool,
    pub is_inline: bool,
    pub is_external: bool,
}

#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub class_id: ClassId,
    pub kind: ClassKind,
    pub modality: Modality,
    pub visibility: Visibility,
    pub flags: ClassFlags,
    pub type_parameters: Vec<TypeParameterRecord>,
    pub supertypes: Vec<SemType>,
    /// Declared members in declaration order, nested classes and enum
    /// entries included
    pub members: Vec<DeclRecord>,
    pub static_members: Vec<DeclRecord>,
    pub delegated_members: Vec<DeclRecord>,
    pub synthesized_members: Vec<DeclRecord>,
    pub sealed_subclasses: Vec<ClassId>,
    pub annotations: Vec<AnnotationRecord>,
    pub origin: SymbolOrigin,
    /// Name of the file that declares the class, when known
    pub file_name: Option<SmolStr>,
    pub source: Option<SourceRef>,
}

impl ClassRecord {
    pub fn new(class_id: ClassId, kind: ClassKind) -> Self {
        Self {
            class_id,
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            flags: ClassFlags::default(),
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            members: Vec::new(),
            static_members: Vec::new(),
            delegated_members: Vec::new(),
            synthesized_members: Vec::new(),
            sealed_subclasses: Vec::new(),
            annotations: Vec::new(),
            origin: SymbolOrigin::Library,
            file_name: None,
            source: None,
        }
    }

    pub fn name(&self) -> Name {
        self.class_id.short_class_name()
    }

    /// `Foo<T1, ..., Tn>` with the class's own parameters as arguments.
    pub fn default_type(&self) -> SemType {
        SemType::class_with(
            self.class_id.clone(),
            self.type_parameters
                .iter()
                .map(|p| TypeProjection::invariant(p.as_type()))
                .collect(),
        )
    }

    /// Supertypes, `Any` if none are declared (except for `Any` itself).
    pub fn effective_supertypes(&self) -> Vec<SemType> {
        if self.supertypes.is_empty() && self.class_id != standard::any() {
            vec![SemType::any()]
        } else {
            self.supertypes.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeAliasRecord {
    pub class_id: ClassId,
    pub visibility: Visibility,
    pub type_parameters: Vec<TypeParameterRecord>,
    pub expanded: SemType,
    pub annotations: Vec<AnnotationRecord>,
    pub origin: SymbolOrigin,
    pub source: Option<SourceRef>,
}

/// Any declaration record.
#[derive(Debug, Clone)]
pub enum DeclRecord {
    Class(Arc<ClassRecord>),
    Callable(Arc<CallableRecord>),
    TypeAlias(Arc<TypeAliasRecord>),
    TypeParameter(Arc<TypeParameterRecord>),
    ValueParameter(Arc<ValueParameterRecord>),
}

impl DeclRecord {
    pub fn name(&self) -> Name {
        match self {
            DeclRecord::Class(c) => c.name(),
            DeclRecord::Callable(c) => c.name().clone(),
            DeclRecord::TypeAlias(a) => a.class_id.short_class_name(),
            DeclRecord::TypeParameter(p) => p.name.clone(),
            DeclRecord::ValueParameter(p) => p.name.clone(),
        }
    }

    pub fn source(&self) -> Option<SourceRef> {
        match self {
            DeclRecord::Class(c) => c.source,
            DeclRecord::Callable(c) => c.source,
            DeclRecord::TypeAlias(a) => a.source,
            DeclRecord::TypeParameter(p) => p.source,
            DeclRecord::ValueParameter(p) => p.source,
        }
    }

    pub fn as_class(&self) -> Option<&Arc<ClassRecord>> {
        match self {
            DeclRecord::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Arc<CallableRecord>> {
        match self {
            DeclRecord::Callable(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_classifier(&self) -> bool {
        matches!(self, DeclRecord::Class(_) | DeclRecord::TypeAlias(_))
    }

    /// Same record instance.
    pub fn ptr_eq(&self, other: &DeclRecord) -> bool {
        match (self, other) {
            (DeclRecord::Class(a), DeclRecord::Class(b)) => Arc::ptr_eq(a, b),
            (DeclRecord::Callable(a), DeclRecord::Callable(b)) => Arc::ptr_eq(a, b),
            (DeclRecord::TypeAlias(a), DeclRecord::TypeAlias(b)) => Arc::ptr_eq(a, b),
            (DeclRecord::TypeParameter(a), DeclRecord::TypeParameter(b)) => Arc::ptr_eq(a, b),
            (DeclRecord::ValueParameter(a), DeclRecord::ValueParameter(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
