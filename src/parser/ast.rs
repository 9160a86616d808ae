//! Typed AST wrappers over the untyped rowan CST.
//!
//! This module provides strongly-typed accessors for declaration nodes.
//! Each struct wraps a SyntaxNode and provides methods to access children.
//! Expressions are mostly consumed by kind; only the shapes the semantic
//! layer inspects get wrappers.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

// ============================================================================
// Shared helpers
// ============================================================================

fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
    node.children().find_map(N::cast)
}

fn children<N: AstNode>(node: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    node.children().filter_map(N::cast)
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Identifier text with surrounding backticks removed.
pub fn ident_text(token: &SyntaxToken) -> String {
    token.text().trim_matches('`').to_string()
}

/// The declaration's own name: the first identifier directly under the
/// node (identifiers nested in receivers or modifiers don't count).
pub fn name_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    token(node, SyntaxKind::IDENT)
}

/// Name used to tell sibling declarations apart: the declared name, `get` /
/// `set` for accessors, `constructor` / `init` for constructors and
/// initializers, `None` for anonymous declarations.
pub fn declaration_name(node: &SyntaxNode) -> Option<String> {
    if !node.kind().is_declaration() {
        return None;
    }
    name_token(node).map(|t| ident_text(&t))
}

/// The first direct child node that is an expression.
pub fn expr_child(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.children().find(|n| is_expression(n.kind()))
}

/// Expression node kinds.
pub fn is_expression(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LAMBDA_EXPR
            | SyntaxKind::OBJECT_LITERAL
            | SyntaxKind::NAME_REF
            | SyntaxKind::LITERAL
            | SyntaxKind::PAREN_EXPR
            | SyntaxKind::CALL_EXPR
            | SyntaxKind::DOT_QUALIFIED_EXPR
            | SyntaxKind::SAFE_QUALIFIED_EXPR
            | SyntaxKind::BINARY_EXPR
            | SyntaxKind::IS_EXPR
            | SyntaxKind::AS_EXPR
            | SyntaxKind::PREFIX_EXPR
            | SyntaxKind::POSTFIX_EXPR
            | SyntaxKind::IF_EXPR
            | SyntaxKind::RETURN_EXPR
            | SyntaxKind::THIS_EXPR
            | SyntaxKind::SUPER_EXPR
            | SyntaxKind::FUN
    )
}

// ============================================================================
// Root
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn package_directive(&self) -> Option<PackageDirective> {
        child(&self.0)
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportDirective> + '_ {
        children(&self.0)
    }

    /// Top-level declaration nodes in source order.
    pub fn declarations(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children().filter(|n| n.kind().is_declaration())
    }
}

ast_node!(PackageDirective, PACKAGE_DIRECTIVE);

impl PackageDirective {
    pub fn path(&self) -> Option<Path> {
        child(&self.0)
    }
}

ast_node!(ImportDirective, IMPORT_DIRECTIVE);

impl ImportDirective {
    pub fn path(&self) -> Option<Path> {
        child(&self.0)
    }

    /// `import a.b.*`
    pub fn is_all_under(&self) -> bool {
        token(&self.0, SyntaxKind::STAR).is_some()
    }

    pub fn alias(&self) -> Option<String> {
        let alias = self
            .0
            .children()
            .find(|n| n.kind() == SyntaxKind::IMPORT_ALIAS)?;
        name_token(&alias).map(|t| ident_text(&t))
    }
}

ast_node!(Path, PATH);

impl Path {
    pub fn segments(&self) -> Vec<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| ident_text(&t))
            .collect()
    }

    pub fn dotted(&self) -> String {
        self.segments().join(".")
    }
}

// ============================================================================
// Modifiers
// ============================================================================

ast_node!(ModifierList, MODIFIER_LIST);

impl ModifierList {
    pub fn has(&self, modifier: &str) -> bool {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| !t.kind().is_trivia() && t.text() == modifier)
    }

    pub fn annotations(&self) -> impl Iterator<Item = AnnotationEntry> + '_ {
        children(&self.0)
    }
}

ast_node!(AnnotationEntry, ANNOTATION_ENTRY);

impl AnnotationEntry {
    pub fn path(&self) -> Option<Path> {
        child(&self.0)
    }

    pub fn arguments(&self) -> Option<ValueArgumentList> {
        child(&self.0)
    }
}

/// `true` if the node's own modifier list carries `modifier`.
pub fn has_modifier(node: &SyntaxNode, modifier: &str) -> bool {
    child::<ModifierList>(node).is_some_and(|m| m.has(modifier))
}

pub fn modifier_list(node: &SyntaxNode) -> Option<ModifierList> {
    child(node)
}

// ============================================================================
// Classes and objects
// ============================================================================

ast_node!(Class, CLASS);

impl Class {
    pub fn name(&self) -> Option<String> {
        name_token(&self.0).map(|t| ident_text(&t))
    }

    pub fn is_interface(&self) -> bool {
        token(&self.0, SyntaxKind::INTERFACE_KW).is_some()
    }

    pub fn modifier_list(&self) -> Option<ModifierList> {
        child(&self.0)
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        child(&self.0)
    }

    pub fn primary_constructor(&self) -> Option<PrimaryConstructor> {
        child(&self.0)
    }

    pub fn super_type_list(&self) -> Option<SuperTypeList> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<ClassBody> {
        child(&self.0)
    }
}

ast_node!(ObjectDeclaration, OBJECT_DECLARATION);

impl ObjectDeclaration {
    pub fn name(&self) -> Option<String> {
        name_token(&self.0).map(|t| ident_text(&t))
    }

    pub fn is_companion(&self) -> bool {
        has_modifier(&self.0, "companion")
    }

    /// `object : T { ... }` used as an expression.
    pub fn is_object_literal(&self) -> bool {
        self.0
            .parent()
            .is_some_and(|p| p.kind() == SyntaxKind::OBJECT_LITERAL)
    }

    pub fn super_type_list(&self) -> Option<SuperTypeList> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<ClassBody> {
        child(&self.0)
    }
}

ast_node!(ClassBody, CLASS_BODY);

impl ClassBody {
    /// Member declarations, enum entries excluded.
    pub fn declarations(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0
            .children()
            .filter(|n| n.kind().is_declaration() && n.kind() != SyntaxKind::ENUM_ENTRY)
    }

    pub fn enum_entries(&self) -> impl Iterator<Item = EnumEntry> + '_ {
        children(&self.0)
    }
}

ast_node!(EnumEntry, ENUM_ENTRY);

impl EnumEntry {
    pub fn name(&self) -> Option<String> {
        name_token(&self.0).map(|t| ident_text(&t))
    }

    pub fn body(&self) -> Option<ClassBody> {
        child(&self.0)
    }
}

ast_node!(PrimaryConstructor, PRIMARY_CONSTRUCTOR);

impl PrimaryConstructor {
    pub fn parameter_list(&self) -> Option<ValueParameterList> {
        child(&self.0)
    }
}

ast_node!(SecondaryConstructor, SECONDARY_CONSTRUCTOR);

impl SecondaryConstructor {
    pub fn parameter_list(&self) -> Option<ValueParameterList> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<Block> {
        child(&self.0)
    }
}

ast_node!(ClassInitializer, CLASS_INITIALIZER);

impl ClassInitializer {
    pub fn body(&self) -> Option<Block> {
        child(&self.0)
    }
}

ast_node!(SuperTypeList, SUPER_TYPE_LIST);

impl SuperTypeList {
    pub fn entries(&self) -> impl Iterator<Item = SuperTypeEntry> + '_ {
        children(&self.0)
    }
}

/// One entry of a super type list, in any of its three shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuperTypeEntry(SyntaxNode);

impl AstNode for SuperTypeEntry {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::SUPER_TYPE_ENTRY
                | SyntaxKind::SUPER_TYPE_CALL_ENTRY
                | SyntaxKind::DELEGATED_SUPER_TYPE_ENTRY
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self(node))
        } else {
            None
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

impl SuperTypeEntry {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    /// `A(...)`: a superclass constructor call.
    pub fn is_constructor_call(&self) -> bool {
        self.0.kind() == SyntaxKind::SUPER_TYPE_CALL_ENTRY
    }

    /// `A by expr`
    pub fn delegate(&self) -> Option<SyntaxNode> {
        if self.0.kind() == SyntaxKind::DELEGATED_SUPER_TYPE_ENTRY {
            expr_child(&self.0)
        } else {
            None
        }
    }
}

// ============================================================================
// Functions and properties
// ============================================================================

ast_node!(Fun, FUN);

impl Fun {
    /// `None` for anonymous functions.
    pub fn name(&self) -> Option<String> {
        name_token(&self.0).map(|t| ident_text(&t))
    }

    pub fn receiver_type(&self) -> Option<TypeRef> {
        let receiver = self
            .0
            .children()
            .find(|n| n.kind() == SyntaxKind::RECEIVER_TYPE)?;
        child(&receiver)
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        child(&self.0)
    }

    pub fn parameter_list(&self) -> Option<ValueParameterList> {
        child(&self.0)
    }

    /// Declared return type (`fun f(): T`).
    pub fn return_type(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn body_block(&self) -> Option<Block> {
        child(&self.0)
    }

    /// Expression body (`fun f() = expr`).
    pub fn body_expr(&self) -> Option<SyntaxNode> {
        token(&self.0, SyntaxKind::EQ)?;
        expr_child(&self.0)
    }

    pub fn has_body(&self) -> bool {
        self.body_block().is_some() || self.body_expr().is_some()
    }
}

ast_node!(Property, PROPERTY);

impl Property {
    pub fn name(&self) -> Option<String> {
        name_token(&self.0).map(|t| ident_text(&t))
    }

    pub fn is_var(&self) -> bool {
        token(&self.0, SyntaxKind::VAR_KW).is_some()
    }

    pub fn receiver_type(&self) -> Option<TypeRef> {
        let receiver = self
            .0
            .children()
            .find(|n| n.kind() == SyntaxKind::RECEIVER_TYPE)?;
        child(&receiver)
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        child(&self.0)
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn initializer(&self) -> Option<SyntaxNode> {
        token(&self.0, SyntaxKind::EQ)?;
        expr_child(&self.0)
    }

    pub fn delegate(&self) -> Option<SyntaxNode> {
        let delegate = self
            .0
            .children()
            .find(|n| n.kind() == SyntaxKind::PROPERTY_DELEGATE)?;
        expr_child(&delegate)
    }

    pub fn accessors(&self) -> impl Iterator<Item = PropertyAccessor> + '_ {
        children(&self.0)
    }

    pub fn getter(&self) -> Option<PropertyAccessor> {
        self.accessors().find(|a| a.is_getter())
    }

    pub fn setter(&self) -> Option<PropertyAccessor> {
        self.accessors().find(|a| !a.is_getter())
    }
}

ast_node!(PropertyAccessor, PROPERTY_ACCESSOR);

impl PropertyAccessor {
    pub fn is_getter(&self) -> bool {
        name_token(&self.0).is_some_and(|t| t.text() == "get")
    }

    pub fn parameter_list(&self) -> Option<ValueParameterList> {
        child(&self.0)
    }

    pub fn has_body(&self) -> bool {
        child::<Block>(&self.0).is_some() || token(&self.0, SyntaxKind::EQ).is_some()
    }
}

ast_node!(TypeAlias, TYPE_ALIAS);

impl TypeAlias {
    pub fn name(&self) -> Option<String> {
        name_token(&self.0).map(|t| ident_text(&t))
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        child(&self.0)
    }

    pub fn aliased_type(&self) -> Option<TypeRef> {
        child(&self.0)
    }
}

// ============================================================================
// Parameters
// ============================================================================

ast_node!(ValueParameterList, VALUE_PARAMETER_LIST);

impl ValueParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = ValueParameter> + '_ {
        children(&self.0)
    }
}

ast_node!(ValueParameter, VALUE_PARAMETER);

impl ValueParameter {
    pub fn name(&self) -> Option<String> {
        name_token(&self.0).map(|t| ident_text(&t))
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn default_value(&self) -> Option<SyntaxNode> {
        token(&self.0, SyntaxKind::EQ)?;
        expr_child(&self.0)
    }

    /// `val`/`var` on a primary constructor parameter.
    pub fn is_property(&self) -> bool {
        token(&self.0, SyntaxKind::VAL_KW).is_some() || token(&self.0, SyntaxKind::VAR_KW).is_some()
    }

    pub fn is_var(&self) -> bool {
        token(&self.0, SyntaxKind::VAR_KW).is_some()
    }

    pub fn is_vararg(&self) -> bool {
        has_modifier(&self.0, "vararg")
    }
}

ast_node!(TypeParameterList, TYPE_PARAMETER_LIST);

impl TypeParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = TypeParameter> + '_ {
        children(&self.0)
    }
}

ast_node!(TypeParameter, TYPE_PARAMETER);

impl TypeParameter {
    pub fn name(&self) -> Option<String> {
        name_token(&self.0).map(|t| ident_text(&t))
    }

    pub fn bound(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn is_reified(&self) -> bool {
        has_modifier(&self.0, "reified")
    }

    /// `in`, `out` or `None` for invariant parameters.
    pub fn variance(&self) -> Option<&'static str> {
        if has_modifier(&self.0, "in") {
            Some("in")
        } else if has_modifier(&self.0, "out") {
            Some("out")
        } else {
            None
        }
    }
}

// ============================================================================
// Types
// ============================================================================

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    pub fn element(&self) -> Option<TypeElement> {
        child(&self.0)
    }
}

/// The shape of a type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeElement {
    User(UserType),
    Function(FunctionType),
    Nullable(NullableType),
    /// `(T)`
    Paren(TypeRef),
}

impl AstNode for TypeElement {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::USER_TYPE
                | SyntaxKind::FUNCTION_TYPE
                | SyntaxKind::NULLABLE_TYPE
                | SyntaxKind::TYPE_REF
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::USER_TYPE => Some(Self::User(UserType(node))),
            SyntaxKind::FUNCTION_TYPE => Some(Self::Function(FunctionType(node))),
            SyntaxKind::NULLABLE_TYPE => Some(Self::Nullable(NullableType(node))),
            SyntaxKind::TYPE_REF => Some(Self::Paren(TypeRef(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::User(n) => &n.0,
            Self::Function(n) => &n.0,
            Self::Nullable(n) => &n.0,
            Self::Paren(n) => &n.0,
        }
    }
}

ast_node!(UserType, USER_TYPE);

impl UserType {
    pub fn segments(&self) -> Vec<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| ident_text(&t))
            .collect()
    }

    /// Type arguments of the last segment.
    pub fn type_arguments(&self) -> Option<TypeArgumentList> {
        self.0.children().filter_map(TypeArgumentList::cast).last()
    }
}

ast_node!(NullableType, NULLABLE_TYPE);

impl NullableType {
    pub fn inner(&self) -> Option<TypeElement> {
        child(&self.0)
    }
}

ast_node!(FunctionType, FUNCTION_TYPE);

impl FunctionType {
    pub fn receiver(&self) -> Option<TypeRef> {
        let receiver = self
            .0
            .children()
            .find(|n| n.kind() == SyntaxKind::RECEIVER_TYPE)?;
        child(&receiver)
    }

    pub fn parameters(&self) -> Vec<TypeRef> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::FUNCTION_TYPE_PARAMS)
            .map(|p| children(&p).collect())
            .unwrap_or_default()
    }

    pub fn return_type(&self) -> Option<TypeRef> {
        child(&self.0)
    }
}

ast_node!(TypeArgumentList, TYPE_ARGUMENT_LIST);

impl TypeArgumentList {
    pub fn projections(&self) -> impl Iterator<Item = TypeProjection> + '_ {
        children(&self.0)
    }
}

ast_node!(TypeProjection, TYPE_PROJECTION);

impl TypeProjection {
    pub fn is_star(&self) -> bool {
        token(&self.0, SyntaxKind::STAR).is_some()
    }

    pub fn variance(&self) -> Option<&'static str> {
        if has_modifier(&self.0, "in") {
            Some("in")
        } else if has_modifier(&self.0, "out") {
            Some("out")
        } else {
            None
        }
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }
}

// ============================================================================
// Expressions
// ============================================================================

ast_node!(Block, BLOCK);

impl Block {
    /// Statement nodes (declarations and expressions) in order.
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0
            .children()
            .filter(|n| n.kind().is_declaration() || is_expression(n.kind()))
    }
}

ast_node!(LambdaExpr, LAMBDA_EXPR);

impl LambdaExpr {
    pub fn parameter_list(&self) -> Option<ValueParameterList> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<Block> {
        child(&self.0)
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn text(&self) -> Option<String> {
        name_token(&self.0).map(|t| ident_text(&t))
    }
}

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

ast_node!(ValueArgumentList, VALUE_ARGUMENT_LIST);

impl ValueArgumentList {
    pub fn arguments(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::VALUE_ARGUMENT)
    }
}

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    pub fn callee(&self) -> Option<SyntaxNode> {
        expr_child(&self.0)
    }

    pub fn arguments(&self) -> Option<ValueArgumentList> {
        child(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn source(text: &str) -> SourceFile {
        SourceFile::cast(parse(text).syntax()).unwrap()
    }

    fn first<N: AstNode>(file: &SourceFile) -> N {
        file.syntax().descendants().find_map(N::cast).unwrap()
    }

    #[test]
    fn test_package_and_imports() {
        let file = source("package a.b\nimport c.D\nimport e.*\nimport f.G as H\n");
        assert_eq!(file.package_directive().unwrap().path().unwrap().dotted(), "a.b");
        let imports: Vec<_> = file.imports().collect();
        assert_eq!(imports.len(), 3);
        assert!(!imports[0].is_all_under());
        assert!(imports[1].is_all_under());
        assert_eq!(imports[2].alias().as_deref(), Some("H"));
    }

    #[test]
    fn test_class_accessors() {
        let file = source("sealed class Shape<out T : Any>(val size: Int) : Base(), Marker");
        let class: Class = first(&file);
        assert_eq!(class.name().as_deref(), Some("Shape"));
        assert!(class.modifier_list().unwrap().has("sealed"));
        let tp = class.type_parameter_list().unwrap().parameters().next().unwrap();
        assert_eq!(tp.variance(), Some("out"));
        assert!(tp.bound().is_some());
        let params: Vec<_> = class
            .primary_constructor()
            .unwrap()
            .parameter_list()
            .unwrap()
            .parameters()
            .collect();
        assert!(params[0].is_property());
        let entries: Vec<_> = class.super_type_list().unwrap().entries().collect();
        assert!(entries[0].is_constructor_call());
        assert!(!entries[1].is_constructor_call());
    }

    #[test]
    fn test_fun_accessors() {
        let file = source("fun <T> List<T>.second(): T = get(1)");
        let fun: Fun = first(&file);
        assert_eq!(fun.name().as_deref(), Some("second"));
        assert!(fun.receiver_type().is_some());
        assert!(fun.return_type().is_some());
        assert!(fun.has_body());
    }

    #[test]
    fn test_nullable_user_type() {
        let file = source("val x: kotlin.String? = null");
        let property: Property = first(&file);
        let element = property.type_ref().unwrap().element().unwrap();
        let TypeElement::Nullable(nullable) = element else {
            panic!("expected nullable type");
        };
        let Some(TypeElement::User(user)) = nullable.inner() else {
            panic!("expected user type");
        };
        assert_eq!(user.segments(), vec!["kotlin", "String"]);
    }

    #[test]
    fn test_property_delegate_and_accessors() {
        let file = source("class A {\n  val lazyValue by lazy { 1 }\n  val computed: Int\n    get() = 2\n}");
        let properties: Vec<Property> = file.syntax().descendants().filter_map(Property::cast).collect();
        assert!(properties[0].delegate().is_some());
        assert!(properties[0].initializer().is_none());
        assert!(properties[1].getter().is_some());
        assert!(properties[1].setter().is_none());
    }
}
