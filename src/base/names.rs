//! Names and qualified identities for declarations.
//!
//! - [`Name`] - a single identifier segment
//! - [`FqName`] - a dotted fully-qualified path (`kotlin.collections`)
//! - [`ClassId`] - package + relative class path (`kotlin/collections/Map.Entry`)
//! - [`CallableId`] - package + optional owning class + callable name
//!
//! Identities are plain values. They are what pointers persist, so they all
//! serialize.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

// ============================================================================
// Name
// ============================================================================

/// A single identifier.
///
/// Special names are wrapped in angle brackets (`<anonymous>`) so that they
/// can never collide with identifiers written in source.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(SmolStr);

impl Name {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(text.as_ref()))
    }

    /// Name given to anonymous functions, objects and lambdas.
    pub fn anonymous() -> Self {
        Self(SmolStr::new_static("<anonymous>"))
    }

    /// Name of constructors.
    pub fn init() -> Self {
        Self(SmolStr::new_static("<init>"))
    }

    /// Placeholder for declarations whose name is missing in source.
    pub fn no_name() -> Self {
        Self(SmolStr::new_static("<no name provided>"))
    }

    /// Name of the synthetic backing field of a property.
    pub fn field() -> Self {
        Self(SmolStr::new_static("field"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_special(&self) -> bool {
        self.0.starts_with('<')
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// FqName
// ============================================================================

/// A dotted fully-qualified name. The root package is the empty path.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FqName(SmolStr);

impl FqName {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(dotted: &str) -> Self {
        Self(SmolStr::new(dotted.trim_matches('.')))
    }

    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut out = String::new();
        for segment in segments {
            if segment.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(segment);
        }
        Self(SmolStr::new(out))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    /// Last segment, `None` for the root.
    pub fn short_name(&self) -> Option<Name> {
        self.segments().last().map(Name::new)
    }

    /// Enclosing path, `None` for the root.
    pub fn parent(&self) -> Option<FqName> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind('.') {
            Some(idx) => Self(SmolStr::new(&self.0[..idx])),
            None => Self::root(),
        })
    }

    pub fn child(&self, name: &Name) -> FqName {
        if self.is_root() {
            Self(SmolStr::new(name.as_str()))
        } else {
            Self(SmolStr::new(format!("{}.{}", self.0, name)))
        }
    }

    /// `true` if `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &FqName) -> bool {
        if prefix.is_root() {
            return true;
        }
        self.0 == prefix.0
            || (self.0.starts_with(prefix.0.as_str())
                && self.0.as_bytes().get(prefix.0.len()) == Some(&b'.'))
    }
}

impl fmt::Debug for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// ClassId
// ============================================================================

/// Identity of a classifier: its package plus its path relative to the
/// package (`Outer.Inner` for nested classes).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId {
    package: FqName,
    relative: FqName,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    local: bool,
}

impl ClassId {
    pub fn new(package: FqName, relative: FqName, local: bool) -> Self {
        Self { package, relative, local }
    }

    pub fn top_level(package: FqName, name: Name) -> Self {
        Self::new(package, FqName::root().child(&name), false)
    }

    /// Parse the `a/b/Outer.Inner` rendering.
    pub fn parse(text: &str) -> Self {
        match text.rfind('/') {
            Some(idx) => Self::new(
                FqName::from_segments(text[..idx].split('/')),
                FqName::new(&text[idx + 1..]),
                false,
            ),
            None => Self::new(FqName::root(), FqName::new(text), false),
        }
    }

    pub fn package_fq_name(&self) -> &FqName {
        &self.package
    }

    pub fn relative_class_name(&self) -> &FqName {
        &self.relative
    }

    pub fn short_class_name(&self) -> Name {
        self.relative.short_name().unwrap_or_else(Name::no_name)
    }

    pub fn is_local(&self) -> bool {
        self.local
    }

    pub fn is_nested(&self) -> bool {
        self.relative.as_str().contains('.')
    }

    pub fn outer_class_id(&self) -> Option<ClassId> {
        if !self.is_nested() {
            return None;
        }
        let parent = self.relative.parent()?;
        Some(Self::new(self.package.clone(), parent, self.local))
    }

    pub fn nested(&self, name: &Name) -> ClassId {
        Self::new(self.package.clone(), self.relative.child(name), self.local)
    }

    /// Dotted path including the package.
    pub fn as_fq_name(&self) -> FqName {
        FqName::from_segments(self.package.segments().chain(self.relative.segments()))
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.package.segments() {
            write!(f, "{segment}/")?;
        }
        f.write_str(self.relative.as_str())
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({self})")
    }
}

// ============================================================================
// CallableId
// ============================================================================

/// Identity of a function or property: package, owning class (if a member)
/// and the callable's name. Overloads share a `CallableId`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallableId {
    pub package: FqName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<FqName>,
    pub callable: Name,
}

impl CallableId {
    pub fn top_level(package: FqName, callable: Name) -> Self {
        Self { package, class_name: None, callable }
    }

    pub fn member(class_id: &ClassId, callable: Name) -> Self {
        Self {
            package: class_id.package_fq_name().clone(),
            class_name: Some(class_id.relative_class_name().clone()),
            callable,
        }
    }

    pub fn class_id(&self) -> Option<ClassId> {
        self.class_name
            .as_ref()
            .map(|relative| ClassId::new(self.package.clone(), relative.clone(), false))
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.package.segments() {
            write!(f, "{segment}/")?;
        }
        if let Some(class_name) = &self.class_name {
            write!(f, "{class_name}.")?;
        }
        write!(f, "{}", self.callable)
    }
}

impl fmt::Debug for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallableId({self})")
    }
}

// ============================================================================
// Well-known classes
// ============================================================================

/// Class ids of the standard library classifiers the facade refers to.
pub mod standard {
    use super::ClassId;

    macro_rules! class_ids {
        ($($fn_name:ident => $path:literal),* $(,)?) => {
            $(
                pub fn $fn_name() -> ClassId {
                    ClassId::parse($path)
                }
            )*
        };
    }

    class_ids! {
        any => "kotlin/Any",
        nothing => "kotlin/Nothing",
        unit => "kotlin/Unit",
        boolean => "kotlin/Boolean",
        byte => "kotlin/Byte",
        short => "kotlin/Short",
        int => "kotlin/Int",
        long => "kotlin/Long",
        float => "kotlin/Float",
        double => "kotlin/Double",
        char => "kotlin/Char",
        number => "kotlin/Number",
        string => "kotlin/String",
        char_sequence => "kotlin/CharSequence",
        comparable => "kotlin/Comparable",
        enum_class => "kotlin/Enum",
        array => "kotlin/Array",
        function => "kotlin/Function",
        throwable => "kotlin/Throwable",
        iterable => "kotlin/collections/Iterable",
        collection => "kotlin/collections/Collection",
        list => "kotlin/collections/List",
        mutable_list => "kotlin/collections/MutableList",
        set => "kotlin/collections/Set",
        map => "kotlin/collections/Map",
        enum_entries => "kotlin/enums/EnumEntries",
    }

    /// `kotlin/FunctionN` for lambdas and function types of arity `n`.
    pub fn function_n(arity: usize) -> ClassId {
        ClassId::parse(&format!("kotlin/Function{arity}"))
    }
}
