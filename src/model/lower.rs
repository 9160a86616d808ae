//! Syntactic lowering of declarations to records.
//!
//! This is the part of the reference oracle that turns a declaration node
//! into a [`DeclRecord`]. Names in types are bound through the
//! [`ResolutionEnv`]; anything it cannot bind becomes an error type.
//! Expression types come from the caller's hook first and from a small
//! syntactic typer second (literals, constructor calls, casts).

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::graph::ResolutionEnv;
use super::records::{
    AnnotationRecord, CallableFlags, CallableKind, CallableRecord, ClassFlags, ClassKind,
    ClassRecord, ConstantValue, DeclRecord, Modality, SemType, SourceRef, SymbolOrigin,
    TypeAliasRecord, TypeParameterRecord, TypeProjection, ValueParameterRecord, Variance,
    Visibility,
};
use crate::base::{CallableId, ClassId, FqName, Name, standard};
use crate::parser::ast::{
    self, AstNode, Class, ClassBody, Fun, LambdaExpr, ObjectDeclaration, PrimaryConstructor,
    Property, PropertyAccessor, SecondaryConstructor, TypeAlias, TypeElement, TypeParameter,
    TypeParameterList, TypeRef, UserType, ValueParameter, ValueParameterList, declaration_name,
    expr_child, has_modifier, modifier_list,
};
use crate::parser::{SyntaxKind, SyntaxNode};
use crate::syntax::{NodePtr, ParsedFile};

// ============================================================================
// Structure helpers
// ============================================================================

/// Where a declaration sits relative to classes and bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclLocation {
    TopLevel,
    Member(SyntaxNode),
    Local,
}

pub fn is_class_like(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::CLASS | SyntaxKind::OBJECT_DECLARATION | SyntaxKind::ENUM_ENTRY
    )
}

/// `object : T {}` used as an expression.
pub fn is_object_literal(node: &SyntaxNode) -> bool {
    ObjectDeclaration::cast(node.clone()).is_some_and(|o| o.is_object_literal())
}

/// The class whose member `node` is. Primary constructors and their
/// `val`/`var` parameters belong to the class too.
pub fn owning_class(node: &SyntaxNode) -> Option<SyntaxNode> {
    let parent = node.parent()?;
    match parent.kind() {
        SyntaxKind::CLASS_BODY => parent.parent().filter(|p| is_class_like(p.kind())),
        SyntaxKind::CLASS if node.kind() == SyntaxKind::PRIMARY_CONSTRUCTOR => Some(parent),
        SyntaxKind::VALUE_PARAMETER_LIST if node.kind() == SyntaxKind::VALUE_PARAMETER => {
            let ctor = parent.parent()?;
            if ctor.kind() != SyntaxKind::PRIMARY_CONSTRUCTOR {
                return None;
            }
            let is_property = ValueParameter::cast(node.clone()).is_some_and(|p| p.is_property());
            if is_property { ctor.parent() } else { None }
        }
        _ => None,
    }
}

pub fn declaration_location(node: &SyntaxNode) -> DeclLocation {
    if node.parent().is_some_and(|p| p.kind() == SyntaxKind::SOURCE_FILE) {
        return DeclLocation::TopLevel;
    }
    match owning_class(node) {
        Some(class) => DeclLocation::Member(class),
        None => DeclLocation::Local,
    }
}

fn class_like_name(node: &SyntaxNode) -> Option<Name> {
    match node.kind() {
        SyntaxKind::OBJECT_DECLARATION => {
            let object = ObjectDeclaration::cast(node.clone())?;
            if object.is_object_literal() {
                return None;
            }
            Some(match object.name() {
                Some(name) => Name::new(name),
                None if object.is_companion() => Name::new("Companion"),
                None => Name::no_name(),
            })
        }
        SyntaxKind::CLASS | SyntaxKind::ENUM_ENTRY | SyntaxKind::TYPE_ALIAS => Some(
            declaration_name(node)
                .map(Name::new)
                .unwrap_or_else(Name::no_name),
        ),
        _ => None,
    }
}

/// Class id of a class, object, enum entry or type alias node. `None` for
/// object literals.
pub fn class_id_for(file: &ParsedFile, node: &SyntaxNode) -> Option<ClassId> {
    let mut segments = vec![class_like_name(node)?];
    let mut local = false;
    for ancestor in node.ancestors().skip(1) {
        match ancestor.kind() {
            SyntaxKind::CLASS | SyntaxKind::ENUM_ENTRY => {
                segments.push(class_like_name(&ancestor).unwrap_or_else(Name::no_name));
            }
            SyntaxKind::OBJECT_DECLARATION => match class_like_name(&ancestor) {
                Some(name) => segments.push(name),
                None => {
                    local = true;
                    segments.push(Name::anonymous());
                }
            },
            SyntaxKind::FUN
            | SyntaxKind::PROPERTY
            | SyntaxKind::LAMBDA_EXPR
            | SyntaxKind::PROPERTY_ACCESSOR
            | SyntaxKind::SECONDARY_CONSTRUCTOR
            | SyntaxKind::CLASS_INITIALIZER => {
                local = true;
                if let Some(name) = declaration_name(&ancestor) {
                    segments.push(Name::new(name));
                }
            }
            _ => {}
        }
    }
    segments.reverse();
    Some(ClassId::new(
        file.package_fq_name(),
        FqName::from_segments(segments.iter().map(Name::as_str)),
        local,
    ))
}

/// Identity of the anonymous object declared by `node`.
fn anonymous_class_id(file: &ParsedFile) -> ClassId {
    ClassId::new(file.package_fq_name(), FqName::new(Name::anonymous().as_str()), true)
}

/// Callable id of a function, property or constructor named `name`.
pub fn callable_id_for(file: &ParsedFile, node: &SyntaxNode, name: Name) -> CallableId {
    match owning_class(node).and_then(|class| class_id_for(file, &class)) {
        Some(class_id) => CallableId::member(&class_id, name),
        None => CallableId::top_level(file.package_fq_name(), name),
    }
}

/// Name a declaration is known by, special names for the unnamed ones.
pub fn decl_name(node: &SyntaxNode) -> Name {
    match node.kind() {
        SyntaxKind::PRIMARY_CONSTRUCTOR | SyntaxKind::SECONDARY_CONSTRUCTOR => Name::init(),
        SyntaxKind::LAMBDA_EXPR => Name::anonymous(),
        SyntaxKind::FUN => declaration_name(node)
            .map(Name::new)
            .unwrap_or_else(Name::anonymous),
        SyntaxKind::OBJECT_DECLARATION => {
            class_like_name(node).unwrap_or_else(Name::anonymous)
        }
        SyntaxKind::PROPERTY_ACCESSOR => {
            let getter = PropertyAccessor::cast(node.clone()).is_some_and(|a| a.is_getter());
            let property = node.parent().and_then(|p| declaration_name(&p)).unwrap_or_default();
            Name::new(format!("<{}-{property}>", if getter { "get" } else { "set" }))
        }
        _ => declaration_name(node)
            .map(Name::new)
            .unwrap_or_else(Name::no_name),
    }
}

fn type_parameters_in_scope(node: &SyntaxNode) -> Vec<TypeParameter> {
    let mut out = Vec::new();
    for ancestor in node.ancestors() {
        if matches!(
            ancestor.kind(),
            SyntaxKind::FUN | SyntaxKind::CLASS | SyntaxKind::PROPERTY | SyntaxKind::TYPE_ALIAS
        ) {
            if let Some(list) = ancestor.children().find_map(TypeParameterList::cast) {
                out.extend(list.parameters());
            }
        }
    }
    out
}

fn variance_of(text: Option<&str>) -> Variance {
    match text {
        Some("in") => Variance::In,
        Some("out") => Variance::Out,
        _ => Variance::Invariant,
    }
}

fn visibility_of(node: &SyntaxNode, local: bool) -> Visibility {
    if has_modifier(node, "private") {
        Visibility::Private
    } else if has_modifier(node, "protected") {
        Visibility::Protected
    } else if has_modifier(node, "internal") {
        Visibility::Internal
    } else if local {
        Visibility::Local
    } else {
        Visibility::Public
    }
}

fn explicit_modality(node: &SyntaxNode) -> Option<Modality> {
    if has_modifier(node, "sealed") {
        Some(Modality::Sealed)
    } else if has_modifier(node, "abstract") {
        Some(Modality::Abstract)
    } else if has_modifier(node, "open") {
        Some(Modality::Open)
    } else if has_modifier(node, "final") {
        Some(Modality::Final)
    } else {
        None
    }
}

fn is_interface_node(node: &SyntaxNode) -> bool {
    Class::cast(node.clone()).is_some_and(|c| c.is_interface())
}

fn uses_field(accessor: &PropertyAccessor) -> bool {
    accessor
        .syntax()
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::NAME_REF)
        .any(|n| declaration_name_ref(&n).as_deref() == Some("field"))
}

fn declaration_name_ref(node: &SyntaxNode) -> Option<String> {
    ast::NameRef::cast(node.clone())?.text()
}

// ============================================================================
// Literals
// ============================================================================

fn literal_token(node: &SyntaxNode) -> Option<crate::parser::SyntaxToken> {
    ast::Literal::cast(node.clone())?.token()
}

/// Type of a literal expression.
pub fn literal_type(node: &SyntaxNode) -> Option<SemType> {
    let token = literal_token(node)?;
    let text = token.text();
    let class_id = match token.kind() {
        SyntaxKind::INT_LITERAL if text.ends_with(['L', 'l']) => standard::long(),
        SyntaxKind::INT_LITERAL => standard::int(),
        SyntaxKind::FLOAT_LITERAL if text.ends_with(['f', 'F']) => standard::float(),
        SyntaxKind::FLOAT_LITERAL => standard::double(),
        SyntaxKind::STRING_LITERAL => standard::string(),
        SyntaxKind::CHAR_LITERAL => standard::char(),
        SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => standard::boolean(),
        SyntaxKind::NULL_KW => return Some(SemType::nothing().with_nullability(true)),
        _ => return None,
    };
    Some(SemType::class(class_id))
}

fn parse_int(text: &str) -> Option<i64> {
    let clean: String = text
        .trim_end_matches(['L', 'l'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    if let Some(hex) = clean.strip_prefix("0x").or_else(|| clean.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = clean.strip_prefix("0b").or_else(|| clean.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).ok()
    } else {
        clean.parse().ok()
    }
}

fn unescape_char(body: &str) -> Option<char> {
    let mut chars = body.chars();
    match (chars.next()?, chars.next()) {
        ('\\', Some(escaped)) => Some(match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        }),
        (c, None) => Some(c),
        _ => None,
    }
}

/// Compile-time value of a literal (or negated numeric literal).
pub fn constant_value(node: &SyntaxNode) -> Option<ConstantValue> {
    if node.kind() == SyntaxKind::PREFIX_EXPR {
        let negated = node
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == SyntaxKind::MINUS);
        let operand = expr_child(node)?;
        return match (negated, constant_value(&operand)?) {
            (true, ConstantValue::Int(v)) => Some(ConstantValue::Int(-v)),
            (true, ConstantValue::Long(v)) => Some(ConstantValue::Long(-v)),
            (true, ConstantValue::Double(v)) => Some(ConstantValue::Double(-v)),
            _ => None,
        };
    }
    if node.kind() == SyntaxKind::PAREN_EXPR {
        return constant_value(&expr_child(node)?);
    }
    let token = literal_token(node)?;
    let text = token.text();
    match token.kind() {
        SyntaxKind::INT_LITERAL if text.ends_with(['L', 'l']) => parse_int(text).map(ConstantValue::Long),
        SyntaxKind::INT_LITERAL => parse_int(text).map(ConstantValue::Int),
        SyntaxKind::FLOAT_LITERAL => text
            .trim_end_matches(['f', 'F'])
            .replace('_', "")
            .parse()
            .ok()
            .map(ConstantValue::Double),
        SyntaxKind::STRING_LITERAL => {
            let body = text.strip_prefix('"')?.strip_suffix('"')?;
            if body.contains('$') {
                None
            } else {
                Some(ConstantValue::String(body.to_string()))
            }
        }
        SyntaxKind::CHAR_LITERAL => {
            let body = text.strip_prefix('\'')?.strip_suffix('\'')?;
            unescape_char(body).map(ConstantValue::Char)
        }
        SyntaxKind::TRUE_KW => Some(ConstantValue::Boolean(true)),
        SyntaxKind::FALSE_KW => Some(ConstantValue::Boolean(false)),
        SyntaxKind::NULL_KW => Some(ConstantValue::Null),
        _ => None,
    }
}

// ============================================================================
// Lowering context
// ============================================================================

pub struct LowerCtx<'a> {
    pub file: &'a ParsedFile,
    pub env: &'a dyn ResolutionEnv,
    /// Expression types known from elsewhere, consulted before the
    /// syntactic typer
    pub expression_type: &'a dyn Fn(&SyntaxNode) -> Option<SemType>,
}

impl<'a> LowerCtx<'a> {
    fn source(&self, node: &SyntaxNode) -> Option<SourceRef> {
        Some(SourceRef {
            file: self.file.id(),
            ptr: NodePtr::new(node),
        })
    }

    fn origin(&self) -> SymbolOrigin {
        if self.file.is_compiled() {
            SymbolOrigin::Library
        } else {
            SymbolOrigin::Source
        }
    }

    fn generated_origin(&self) -> SymbolOrigin {
        if self.file.is_compiled() {
            SymbolOrigin::Library
        } else {
            SymbolOrigin::SourceMemberGenerated
        }
    }

    /// Record for any declaration node; `None` for nodes that carry no
    /// record of their own (initializer blocks) or are not declarations.
    pub fn lower_declaration(&self, node: &SyntaxNode) -> Option<DeclRecord> {
        match node.kind() {
            SyntaxKind::CLASS | SyntaxKind::OBJECT_DECLARATION | SyntaxKind::ENUM_ENTRY => {
                self.lower_class(node).map(|c| DeclRecord::Class(Arc::new(c)))
            }
            SyntaxKind::FUN => self.lower_function(node).map(|f| DeclRecord::Callable(Arc::new(f))),
            SyntaxKind::LAMBDA_EXPR => self.lower_lambda(node).map(|f| DeclRecord::Callable(Arc::new(f))),
            SyntaxKind::PROPERTY => self.lower_property(node).map(|p| DeclRecord::Callable(Arc::new(p))),
            SyntaxKind::PROPERTY_ACCESSOR => {
                let accessor = PropertyAccessor::cast(node.clone())?;
                let property = self.lower_property(&node.parent()?)?;
                let record = if accessor.is_getter() {
                    property.getter
                } else {
                    property.setter
                };
                record.map(DeclRecord::Callable)
            }
            SyntaxKind::PRIMARY_CONSTRUCTOR | SyntaxKind::SECONDARY_CONSTRUCTOR => self
                .lower_constructor(node)
                .map(|c| DeclRecord::Callable(Arc::new(c))),
            SyntaxKind::VALUE_PARAMETER => {
                let param = ValueParameter::cast(node.clone())?;
                Some(DeclRecord::ValueParameter(Arc::new(self.lower_value_parameter(&param))))
            }
            SyntaxKind::TYPE_PARAMETER => {
                let param = TypeParameter::cast(node.clone())?;
                Some(DeclRecord::TypeParameter(Arc::new(self.lower_type_parameter(&param))))
            }
            SyntaxKind::TYPE_ALIAS => self
                .lower_type_alias(node)
                .map(|a| DeclRecord::TypeAlias(Arc::new(a))),
            _ => None,
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn lower_type_ref(&self, type_ref: Option<&TypeRef>) -> SemType {
        self.lower_element(type_ref.and_then(TypeRef::element), false)
    }

    fn lower_element(&self, element: Option<TypeElement>, shallow: bool) -> SemType {
        match element {
            None => SemType::error("<missing>", "Missing type"),
            Some(TypeElement::Nullable(inner)) => {
                self.lower_element(inner.inner(), shallow).with_nullability(true)
            }
            Some(TypeElement::Paren(inner)) => self.lower_element(inner.element(), shallow),
            Some(TypeElement::Function(function)) => {
                let mut arguments: Vec<TypeProjection> = Vec::new();
                if let Some(receiver) = function.receiver() {
                    arguments.push(TypeProjection::invariant(
                        self.lower_element(receiver.element(), shallow),
                    ));
                }
                for param in function.parameters() {
                    arguments.push(TypeProjection::invariant(
                        self.lower_element(param.element(), shallow),
                    ));
                }
                let arity = arguments.len();
                arguments.push(TypeProjection::invariant(
                    self.lower_element(function.return_type().and_then(|r| r.element()), shallow),
                ));
                SemType::class_with(standard::function_n(arity), arguments)
            }
            Some(TypeElement::User(user)) => self.lower_user_type(&user, shallow),
        }
    }

    fn lower_user_type(&self, user: &UserType, shallow: bool) -> SemType {
        let segments = user.segments();
        if let [single] = segments.as_slice() {
            let in_scope = type_parameters_in_scope(user.syntax())
                .into_iter()
                .find(|p| p.name().as_deref() == Some(single.as_str()));
            if let Some(param) = in_scope {
                let bounds = if shallow {
                    Vec::new()
                } else {
                    self.type_parameter_bounds(&param)
                };
                return SemType::TypeParameter {
                    name: Name::new(single),
                    bounds,
                    nullable: false,
                };
            }
        }

        let Some(class_id) = self.env.resolve_classifier(self.file, user.syntax(), &segments) else {
            let text = segments.join(".");
            return SemType::error(text.clone(), format!("Unresolved reference: {text}"));
        };

        let Some(argument_list) = user.type_arguments() else {
            return SemType::class(class_id);
        };
        let declared: Vec<TypeParameterRecord> = match self.env.class_record(&class_id) {
            Some(record) => record.type_parameters.clone(),
            None => self
                .env
                .type_alias_record(&class_id)
                .map(|a| a.type_parameters.clone())
                .unwrap_or_default(),
        };
        let arguments = argument_list
            .projections()
            .enumerate()
            .map(|(i, projection)| {
                if projection.is_star() {
                    TypeProjection::Star {
                        upper_bound: Box::new(
                            declared
                                .get(i)
                                .map(TypeParameterRecord::star_bound)
                                .unwrap_or_else(SemType::nullable_any),
                        ),
                    }
                } else {
                    TypeProjection::Projected {
                        variance: variance_of(projection.variance()),
                        ty: self.lower_element(
                            projection.type_ref().and_then(|t| t.element()),
                            shallow,
                        ),
                    }
                }
            })
            .collect();
        SemType::class_with(class_id, arguments)
    }

    fn type_parameter_bounds(&self, param: &TypeParameter) -> Vec<SemType> {
        param
            .bound()
            .map(|bound| vec![self.lower_element(bound.element(), true)])
            .unwrap_or_default()
    }

    pub fn lower_type_parameter(&self, param: &TypeParameter) -> TypeParameterRecord {
        TypeParameterRecord {
            name: param.name().map(Name::new).unwrap_or_else(Name::no_name),
            variance: variance_of(param.variance()),
            reified: param.is_reified(),
            bounds: self.type_parameter_bounds(param),
            source: self.source(param.syntax()),
        }
    }

    fn lower_type_parameters(&self, list: Option<TypeParameterList>) -> Vec<TypeParameterRecord> {
        list.map(|l| l.parameters().map(|p| self.lower_type_parameter(&p)).collect())
            .unwrap_or_default()
    }

    pub fn lower_value_parameter(&self, param: &ValueParameter) -> ValueParameterRecord {
        let ty = match param.type_ref() {
            Some(type_ref) => self.lower_type_ref(Some(&type_ref)),
            None => {
                let name = param.name().unwrap_or_default();
                SemType::error(name, "Cannot infer a type for this parameter")
            }
        };
        ValueParameterRecord {
            name: param.name().map(Name::new).unwrap_or_else(Name::no_name),
            ty,
            has_default: param.default_value().is_some(),
            is_vararg: param.is_vararg(),
            source: self.source(param.syntax()),
        }
    }

    fn lower_value_parameters(&self, list: Option<ValueParameterList>) -> Vec<ValueParameterRecord> {
        list.map(|l| l.parameters().map(|p| self.lower_value_parameter(&p)).collect())
            .unwrap_or_default()
    }

    /// `Foo<T1..Tn>` for a class-like node.
    pub fn class_default_type(&self, class: &SyntaxNode) -> SemType {
        let class_id = class_id_for(self.file, class).unwrap_or_else(|| anonymous_class_id(self.file));
        let params = class
            .children()
            .find_map(TypeParameterList::cast)
            .map(|list| {
                list.parameters()
                    .map(|p| TypeProjection::invariant(self.lower_type_parameter(&p).as_type()))
                    .collect()
            })
            .unwrap_or_default();
        SemType::class_with(class_id, params)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Best known type of an expression.
    pub fn expression_type(&self, expr: &SyntaxNode) -> Option<SemType> {
        if let Some(ty) = (self.expression_type)(expr) {
            return Some(ty);
        }
        self.syntactic_expression_type(expr)
    }

    fn syntactic_expression_type(&self, expr: &SyntaxNode) -> Option<SemType> {
        match expr.kind() {
            SyntaxKind::LITERAL => literal_type(expr),
            SyntaxKind::PAREN_EXPR => self.expression_type(&expr_child(expr)?),
            SyntaxKind::IS_EXPR => Some(SemType::class(standard::boolean())),
            SyntaxKind::BINARY_EXPR => {
                let op = expr
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .find(|t| !t.kind().is_trivia())?;
                match op.kind() {
                    SyntaxKind::EQ_EQ
                    | SyntaxKind::BANG_EQ
                    | SyntaxKind::LT
                    | SyntaxKind::GT
                    | SyntaxKind::LT_EQ
                    | SyntaxKind::GT_EQ
                    | SyntaxKind::AMP_AMP
                    | SyntaxKind::PIPE_PIPE => Some(SemType::class(standard::boolean())),
                    _ => None,
                }
            }
            SyntaxKind::PREFIX_EXPR => {
                let bang = expr
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .any(|t| t.kind() == SyntaxKind::BANG);
                if bang {
                    Some(SemType::class(standard::boolean()))
                } else {
                    self.expression_type(&expr_child(expr)?)
                }
            }
            SyntaxKind::AS_EXPR => {
                let safe = expr
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .any(|t| t.kind() == SyntaxKind::QUESTION);
                let target = self.lower_type_ref(expr.children().find_map(TypeRef::cast).as_ref());
                Some(if safe { target.with_nullability(true) } else { target })
            }
            SyntaxKind::CALL_EXPR => {
                let call = ast::CallExpr::cast(expr.clone())?;
                let callee = call.callee()?;
                let name = ast::NameRef::cast(callee)?.text()?;
                let class_id = self.env.resolve_classifier(self.file, expr, &[name])?;
                let record = self.env.class_record(&class_id)?;
                if !record.type_parameters.is_empty() || record.kind != ClassKind::Class {
                    return None;
                }
                Some(SemType::class(class_id))
            }
            _ => None,
        }
    }

    // ========================================================================
    // Classes
    // ========================================================================

    pub fn lower_class(&self, node: &SyntaxNode) -> Option<ClassRecord> {
        let literal = is_object_literal(node);
        let class_id = match class_id_for(self.file, node) {
            Some(id) => id,
            None if literal => anonymous_class_id(self.file),
            None => return None,
        };
        let location = declaration_location(node);
        let kind = match node.kind() {
            SyntaxKind::CLASS if is_interface_node(node) => ClassKind::Interface,
            SyntaxKind::CLASS if has_modifier(node, "enum") => ClassKind::EnumClass,
            SyntaxKind::CLASS if has_modifier(node, "annotation") => ClassKind::AnnotationClass,
            SyntaxKind::CLASS => ClassKind::Class,
            SyntaxKind::ENUM_ENTRY => ClassKind::EnumEntry,
            _ if literal => ClassKind::AnonymousObject,
            _ if has_modifier(node, "companion") => ClassKind::CompanionObject,
            _ => ClassKind::Object,
        };

        let mut record = ClassRecord::new(class_id.clone(), kind);
        record.origin = self.origin();
        record.source = self.source(node);
        record.file_name = Some(SmolStr::new(self.file.file_name()));
        record.visibility = visibility_of(node, location == DeclLocation::Local || literal);
        record.modality = explicit_modality(node).unwrap_or(match kind {
            ClassKind::Interface => Modality::Abstract,
            _ => Modality::Final,
        });
        record.flags = ClassFlags {
            is_data: has_modifier(node, "data"),
            is_inner: has_modifier(node, "inner"),
            is_fun_interface: kind == ClassKind::Interface && has_modifier(node, "fun"),
            is_inline: has_modifier(node, "value") || has_modifier(node, "inline"),
            is_external: has_modifier(node, "external"),
        };
        record.type_parameters =
            self.lower_type_parameters(node.children().find_map(TypeParameterList::cast));
        record.annotations = self.annotations(node);
        let self_type = record.default_type();

        // Supertypes
        let super_list = node.children().find_map(ast::SuperTypeList::cast);
        let mut delegations = Vec::new();
        if let Some(list) = &super_list {
            for entry in list.entries() {
                let ty = self.lower_type_ref(entry.type_ref().as_ref());
                if entry.delegate().is_some() {
                    delegations.push(ty.clone());
                }
                record.supertypes.push(ty);
            }
        }
        match kind {
            ClassKind::EnumClass => record.supertypes.push(SemType::class_with(
                standard::enum_class(),
                vec![TypeProjection::invariant(self_type.clone())],
            )),
            ClassKind::EnumEntry => {
                if let Some(enum_class) = owning_class(node) {
                    record.supertypes.push(self.class_default_type(&enum_class));
                }
            }
            _ => {}
        }

        // Declared members
        let body = node.children().find_map(ClassBody::cast);
        let mut constructor_properties = Vec::new();
        if matches!(
            kind,
            ClassKind::Class | ClassKind::EnumClass | ClassKind::AnnotationClass
        ) {
            match node.children().find_map(PrimaryConstructor::cast) {
                Some(primary) => {
                    if let Some(ctor) = self.lower_constructor(primary.syntax()) {
                        record.members.push(DeclRecord::Callable(Arc::new(ctor)));
                    }
                    for param in primary.parameter_list().iter().flat_map(|l| l.parameters()) {
                        if param.is_property() {
                            let property = self.lower_constructor_property(&param, &class_id, &self_type);
                            constructor_properties.push(property.clone());
                            record.members.push(DeclRecord::Callable(property));
                        }
                    }
                }
                None => {
                    let has_secondary = body.as_ref().is_some_and(|b| {
                        b.declarations()
                            .any(|d| d.kind() == SyntaxKind::SECONDARY_CONSTRUCTOR)
                    });
                    if !has_secondary {
                        record
                            .members
                            .push(DeclRecord::Callable(Arc::new(self.default_constructor(&class_id, &self_type))));
                    }
                }
            }
        }
        if let Some(body) = &body {
            for entry in body.enum_entries() {
                if let Some(entry) = self.lower_class(entry.syntax()) {
                    record.members.push(DeclRecord::Class(Arc::new(entry)));
                }
            }
            for member in body.declarations() {
                if let Some(lowered) = self.lower_declaration(&member) {
                    record.members.push(lowered);
                }
            }
        }

        if kind == ClassKind::EnumClass {
            record.static_members = self.enum_statics(&class_id, &self_type);
        }
        if record.flags.is_data {
            record.synthesized_members =
                self.data_class_members(&class_id, &self_type, &constructor_properties);
        }
        record.delegated_members = self.delegated_members(&record, &self_type, &delegations);
        Some(record)
    }

    fn default_constructor(&self, class_id: &ClassId, self_type: &SemType) -> CallableRecord {
        let mut ctor = CallableRecord::new(
            CallableKind::Constructor { primary: true },
            CallableId::member(class_id, Name::init()),
            self_type.clone(),
        );
        ctor.origin = self.generated_origin();
        ctor
    }

    fn lower_constructor_property(
        &self,
        param: &ValueParameter,
        class_id: &ClassId,
        self_type: &SemType,
    ) -> Arc<CallableRecord> {
        let name = param.name().map(Name::new).unwrap_or_else(Name::no_name);
        let ty = self.lower_type_ref(param.type_ref().as_ref());
        let mut property = CallableRecord::new(
            CallableKind::Property,
            CallableId::member(class_id, name),
            ty.clone(),
        );
        property.origin = self.origin();
        property.source = self.source(param.syntax());
        property.visibility = visibility_of(param.syntax(), false);
        property.modality = explicit_modality(param.syntax()).unwrap_or(Modality::Final);
        property.dispatch_receiver = Some(self_type.clone());
        property.annotations = self.annotations(param.syntax());
        property.flags = CallableFlags {
            is_var: param.is_var(),
            is_override: has_modifier(param.syntax(), "override"),
            from_primary_constructor: true,
            has_backing_field: true,
            ..CallableFlags::default()
        };
        property.getter = Some(Arc::new(self.default_accessor(&property, true, &ty)));
        if property.flags.is_var {
            property.setter = Some(Arc::new(self.default_accessor(&property, false, &ty)));
        }
        Arc::new(property)
    }

    fn enum_statics(&self, class_id: &ClassId, self_type: &SemType) -> Vec<DeclRecord> {
        let static_fn = |name: &str, ret: SemType, kind: CallableKind| {
            let mut record = CallableRecord::new(kind, CallableId::member(class_id, Name::new(name)), ret);
            record.origin = self.generated_origin();
            record.flags.is_static = true;
            record
        };
        let values = static_fn(
            "values",
            SemType::class_with(standard::array(), vec![TypeProjection::invariant(self_type.clone())]),
            CallableKind::Function,
        );
        let mut value_of = static_fn("valueOf", self_type.clone(), CallableKind::Function);
        value_of
            .value_parameters
            .push(ValueParameterRecord::new(Name::new("value"), SemType::class(standard::string())));
        let entries_type = SemType::class_with(
            standard::enum_entries(),
            vec![TypeProjection::invariant(self_type.clone())],
        );
        let mut entries = static_fn("entries", entries_type.clone(), CallableKind::Property);
        entries.getter = Some(Arc::new(self.default_accessor(&entries, true, &entries_type)));
        vec![
            DeclRecord::Callable(Arc::new(values)),
            DeclRecord::Callable(Arc::new(value_of)),
            DeclRecord::Callable(Arc::new(entries)),
        ]
    }

    fn data_class_members(
        &self,
        class_id: &ClassId,
        self_type: &SemType,
        properties: &[Arc<CallableRecord>],
    ) -> Vec<DeclRecord> {
        let mut out = Vec::new();
        for (i, property) in properties.iter().enumerate() {
            let mut component = CallableRecord::new(
                CallableKind::Function,
                CallableId::member(class_id, Name::new(format!("component{}", i + 1))),
                property.return_type.clone(),
            );
            component.origin = self.generated_origin();
            component.dispatch_receiver = Some(self_type.clone());
            component.flags.is_operator = true;
            out.push(DeclRecord::Callable(Arc::new(component)));
        }
        let mut copy = CallableRecord::new(
            CallableKind::Function,
            CallableId::member(class_id, Name::new("copy")),
            self_type.clone(),
        );
        copy.origin = self.generated_origin();
        copy.dispatch_receiver = Some(self_type.clone());
        copy.value_parameters = properties
            .iter()
            .map(|p| {
                let mut param = ValueParameterRecord::new(p.name().clone(), p.return_type.clone());
                param.has_default = true;
                param
            })
            .collect();
        out.push(DeclRecord::Callable(Arc::new(copy)));
        out
    }

    fn delegated_members(
        &self,
        record: &ClassRecord,
        self_type: &SemType,
        delegations: &[SemType],
    ) -> Vec<DeclRecord> {
        let declared: FxHashSet<(Name, SmolStr)> = record
            .members
            .iter()
            .filter_map(DeclRecord::as_callable)
            .map(|c| (c.name().clone(), c.signature()))
            .collect();
        let mut out = Vec::new();
        for delegation in delegations {
            let Some(interface) = delegation.class_id().and_then(|id| self.env.class_record(id)) else {
                continue;
            };
            let params = interface.type_parameters.clone();
            let arguments = delegation.arguments().to_vec();
            let subst = |name: &Name| {
                params
                    .iter()
                    .position(|p| &p.name == name)
                    .and_then(|i| arguments.get(i).cloned())
            };
            for member in interface.members.iter().filter_map(DeclRecord::as_callable) {
                if !matches!(member.kind, CallableKind::Function | CallableKind::Property)
                    || member.visibility == Visibility::Private
                {
                    continue;
                }
                let mut delegated = (**member).clone();
                delegated.callable_id = CallableId::member(&record.class_id, member.name().clone());
                delegated.return_type = member.return_type.substitute(&subst);
                for param in &mut delegated.value_parameters {
                    param.ty = param.ty.substitute(&subst);
                }
                if declared.contains(&(delegated.name().clone(), delegated.signature())) {
                    continue;
                }
                delegated.origin = SymbolOrigin::Delegated;
                delegated.modality = Modality::Open;
                delegated.dispatch_receiver = Some(self_type.clone());
                delegated.flags.is_override = true;
                delegated.source = None;
                let accessor_id = delegated.callable_id.clone();
                let retarget = |accessor: &Option<Arc<CallableRecord>>| {
                    accessor.as_ref().map(|a| {
                        let mut a = (**a).clone();
                        a.callable_id = accessor_id.clone();
                        a.origin = SymbolOrigin::Delegated;
                        a.source = None;
                        Arc::new(a)
                    })
                };
                delegated.getter = retarget(&member.getter);
                delegated.setter = retarget(&member.setter);
                out.push(DeclRecord::Callable(Arc::new(delegated)));
            }
        }
        out
    }

    // ========================================================================
    // Callables
    // ========================================================================

    fn member_modality(&self, node: &SyntaxNode, has_body: bool) -> Modality {
        if let Some(modality) = explicit_modality(node) {
            return modality;
        }
        let in_interface = owning_class(node).is_some_and(|c| is_interface_node(&c));
        if in_interface {
            return if has_body { Modality::Open } else { Modality::Abstract };
        }
        if has_modifier(node, "override") {
            Modality::Open
        } else {
            Modality::Final
        }
    }

    fn dispatch_receiver(&self, node: &SyntaxNode) -> Option<SemType> {
        owning_class(node).map(|class| self.class_default_type(&class))
    }

    pub fn lower_function(&self, node: &SyntaxNode) -> Option<CallableRecord> {
        let fun = Fun::cast(node.clone())?;
        let anonymous = fun.name().is_none();
        let name = decl_name(node);
        let location = declaration_location(node);
        let local = location == DeclLocation::Local;

        let return_type = match fun.return_type() {
            Some(ty) => self.lower_type_ref(Some(&ty)),
            None => match fun.body_expr() {
                Some(expr) => self.expression_type(&expr).unwrap_or_else(|| {
                    SemType::error(name.as_str(), format!("Cannot infer return type of {name}"))
                }),
                None => SemType::unit(),
            },
        };

        let mut record = CallableRecord::new(
            if anonymous {
                CallableKind::AnonymousFunction
            } else {
                CallableKind::Function
            },
            callable_id_for(self.file, node, name),
            return_type,
        );
        record.origin = self.origin();
        record.source = self.source(node);
        record.is_local = local || anonymous;
        record.visibility = visibility_of(node, local || anonymous);
        record.modality = self.member_modality(node, fun.has_body());
        record.type_parameters = self.lower_type_parameters(fun.type_parameter_list());
        record.value_parameters = self.lower_value_parameters(fun.parameter_list());
        record.receiver_type = fun.receiver_type().map(|r| self.lower_type_ref(Some(&r)));
        record.dispatch_receiver = self.dispatch_receiver(node);
        record.annotations = self.annotations(node);
        record.flags = CallableFlags {
            is_override: has_modifier(node, "override"),
            is_inline: has_modifier(node, "inline"),
            is_operator: has_modifier(node, "operator"),
            ..CallableFlags::default()
        };
        Some(record)
    }

    pub fn lower_lambda(&self, node: &SyntaxNode) -> Option<CallableRecord> {
        let lambda = LambdaExpr::cast(node.clone())?;
        let last = lambda.body().and_then(|b| b.statements().last());
        let return_type = match last {
            Some(last) if ast::is_expression(last.kind()) => self
                .expression_type(&last)
                .unwrap_or_else(|| SemType::error("<lambda>", "Cannot infer lambda return type")),
            _ => SemType::unit(),
        };
        let mut record = CallableRecord::new(
            CallableKind::AnonymousFunction,
            CallableId::top_level(self.file.package_fq_name(), Name::anonymous()),
            return_type,
        );
        record.origin = self.origin();
        record.source = self.source(node);
        record.is_local = true;
        record.visibility = Visibility::Local;
        record.value_parameters = self.lower_value_parameters(lambda.parameter_list());
        Some(record)
    }

    pub fn lower_constructor(&self, node: &SyntaxNode) -> Option<CallableRecord> {
        let class = owning_class(node)?;
        let class_id = class_id_for(self.file, &class)?;
        let (primary, params) = match node.kind() {
            SyntaxKind::PRIMARY_CONSTRUCTOR => (
                true,
                PrimaryConstructor::cast(node.clone())?.parameter_list(),
            ),
            _ => (
                false,
                SecondaryConstructor::cast(node.clone())?.parameter_list(),
            ),
        };
        let mut record = CallableRecord::new(
            CallableKind::Constructor { primary },
            CallableId::member(&class_id, Name::init()),
            self.class_default_type(&class),
        );
        record.origin = self.origin();
        record.source = self.source(node);
        record.visibility = visibility_of(node, false);
        record.value_parameters = self.lower_value_parameters(params);
        record.annotations = self.annotations(node);
        Some(record)
    }

    fn default_accessor(&self, property: &CallableRecord, getter: bool, ty: &SemType) -> CallableRecord {
        let mut accessor = CallableRecord::new(
            if getter {
                CallableKind::Getter
            } else {
                CallableKind::Setter
            },
            property.callable_id.clone(),
            if getter { ty.clone() } else { SemType::unit() },
        );
        accessor.origin = property.origin;
        accessor.visibility = property.visibility;
        accessor.modality = property.modality;
        accessor.receiver_type = property.receiver_type.clone();
        accessor.dispatch_receiver = property.dispatch_receiver.clone();
        accessor.flags.is_static = property.flags.is_static;
        if !getter {
            accessor
                .value_parameters
                .push(ValueParameterRecord::new(Name::new("value"), ty.clone()));
        }
        accessor
    }

    fn explicit_accessor(
        &self,
        property: &CallableRecord,
        accessor: &PropertyAccessor,
        ty: &SemType,
    ) -> CallableRecord {
        let getter = accessor.is_getter();
        let mut record = self.default_accessor(property, getter, ty);
        record.source = self.source(accessor.syntax());
        record.flags.is_explicit = true;
        let visibility = visibility_of(accessor.syntax(), false);
        if visibility != Visibility::Public {
            record.visibility = visibility;
        }
        record.annotations = self.annotations(accessor.syntax());
        if !getter {
            let params = self.lower_value_parameters(accessor.parameter_list());
            if let Some(mut param) = params.into_iter().next() {
                if param.ty.is_error() {
                    param.ty = ty.clone();
                }
                record.value_parameters = vec![param];
            }
        }
        record
    }

    pub fn lower_property(&self, node: &SyntaxNode) -> Option<CallableRecord> {
        let property = Property::cast(node.clone())?;
        let name = decl_name(node);
        let location = declaration_location(node);
        let local = location == DeclLocation::Local;
        let initializer = property.initializer();
        let delegate = property.delegate();

        let ty = match property.type_ref() {
            Some(ty) => self.lower_type_ref(Some(&ty)),
            None => initializer
                .as_ref()
                .and_then(|init| self.expression_type(init))
                .or_else(|| {
                    let getter_body = property.getter().and_then(|g| expr_child(g.syntax()));
                    getter_body.and_then(|e| self.expression_type(&e))
                })
                .unwrap_or_else(|| {
                    SemType::error(name.as_str(), format!("Cannot infer type for {name}"))
                }),
        };

        let mut record = CallableRecord::new(
            if local {
                CallableKind::LocalVariable
            } else {
                CallableKind::Property
            },
            callable_id_for(self.file, node, name),
            ty.clone(),
        );
        record.origin = self.origin();
        record.source = self.source(node);
        record.is_local = local;
        record.visibility = visibility_of(node, local);
        record.type_parameters = self.lower_type_parameters(property.type_parameter_list());
        record.receiver_type = property.receiver_type().map(|r| self.lower_type_ref(Some(&r)));
        record.dispatch_receiver = self.dispatch_receiver(node);
        record.annotations = self.annotations(node);
        record.initializer = initializer.as_ref().and_then(constant_value);

        let getter = property.getter();
        let setter = property.setter();
        let has_getter_body = getter.as_ref().is_some_and(|g| g.has_body());
        let in_interface = owning_class(node).is_some_and(|c| is_interface_node(&c));
        record.modality = self.member_modality(
            node,
            initializer.is_some() || delegate.is_some() || has_getter_body,
        );

        let abstract_like = record.modality == Modality::Abstract || in_interface;
        let default_accessor_used = !has_getter_body
            || (property.is_var() && !setter.as_ref().is_some_and(|s| s.has_body()));
        let field_used = getter.iter().chain(setter.iter()).any(uses_field);
        record.flags = CallableFlags {
            is_var: property.is_var(),
            is_const: has_modifier(node, "const"),
            is_lateinit: has_modifier(node, "lateinit"),
            is_delegated: delegate.is_some(),
            is_override: has_modifier(node, "override"),
            has_backing_field: !local
                && delegate.is_none()
                && !abstract_like
                && record.receiver_type.is_none()
                && (initializer.is_some() || default_accessor_used || field_used),
            ..CallableFlags::default()
        };

        if !local {
            record.getter = Some(Arc::new(match &getter {
                Some(getter) => self.explicit_accessor(&record, getter, &ty),
                None => self.default_accessor(&record, true, &ty),
            }));
            if record.flags.is_var {
                record.setter = Some(Arc::new(match &setter {
                    Some(setter) => self.explicit_accessor(&record, setter, &ty),
                    None => self.default_accessor(&record, false, &ty),
                }));
            }
        }
        Some(record)
    }

    pub fn lower_type_alias(&self, node: &SyntaxNode) -> Option<TypeAliasRecord> {
        let alias = TypeAlias::cast(node.clone())?;
        let local = declaration_location(node) == DeclLocation::Local;
        Some(TypeAliasRecord {
            class_id: class_id_for(self.file, node)?,
            visibility: visibility_of(node, local),
            type_parameters: self.lower_type_parameters(alias.type_parameter_list()),
            expanded: self.lower_type_ref(alias.aliased_type().as_ref()),
            annotations: self.annotations(node),
            origin: self.origin(),
            source: self.source(node),
        })
    }

    fn annotations(&self, node: &SyntaxNode) -> Vec<AnnotationRecord> {
        let Some(modifiers) = modifier_list(node) else {
            return Vec::new();
        };
        modifiers
            .annotations()
            .filter_map(|annotation| {
                let segments = annotation.path()?.segments();
                let (last, package) = segments.split_last()?;
                let class_id = self
                    .env
                    .resolve_classifier(self.file, node, &segments)
                    .unwrap_or_else(|| {
                        ClassId::top_level(
                            FqName::from_segments(package.iter().map(String::as_str)),
                            Name::new(last),
                        )
                    });
                let arguments = annotation
                    .arguments()
                    .map(|args| {
                        args.arguments()
                            .enumerate()
                            .filter_map(|(i, arg)| {
                                let value = constant_value(&expr_child(&arg)?)?;
                                let name = if i == 0 {
                                    Name::new("value")
                                } else {
                                    Name::new(format!("arg{i}"))
                                };
                                Some((name, value))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Some(AnnotationRecord {
                    class_id,
                    arguments,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::config::{LanguageSettings, TargetPlatform};
    use crate::model::graph::{ModuleGraph, TypeEnvironment};
    use crate::model::memory::InMemoryModuleGraph;
    use crate::model::builtins;
    use crate::parser::parse;

    /// Resolves simple names against the file's own top-level classes and
    /// the builtins.
    struct TestEnv {
        graph: InMemoryModuleGraph,
        settings: LanguageSettings,
    }

    impl TypeEnvironment for TestEnv {
        fn class_record(&self, class_id: &ClassId) -> Option<Arc<ClassRecord>> {
            self.graph.find_class(class_id)
        }

        fn type_alias_record(&self, class_id: &ClassId) -> Option<Arc<TypeAliasRecord>> {
            self.graph.find_type_alias(class_id)
        }
    }

    impl ResolutionEnv for TestEnv {
        fn resolve_classifier(
            &self,
            file: &ParsedFile,
            _context: &SyntaxNode,
            segments: &[String],
        ) -> Option<ClassId> {
            let name = segments.last()?;
            let local = ClassId::top_level(file.package_fq_name(), Name::new(name));
            let declared = file
                .declarations()
                .iter()
                .any(|d| declaration_name(d).as_deref() == Some(name.as_str()));
            if declared {
                return Some(local);
            }
            builtins::default_imports()
                .into_iter()
                .map(|p| ClassId::top_level(p, Name::new(name)))
                .find(|id| self.graph.find_class(id).is_some())
        }

        fn settings(&self) -> &LanguageSettings {
            &self.settings
        }
    }

    fn env() -> TestEnv {
        TestEnv {
            graph: builtins::builtins(),
            settings: LanguageSettings::new("2.0", TargetPlatform::Jvm),
        }
    }

    fn parsed(text: &str) -> ParsedFile {
        let parse = parse(text);
        ParsedFile::new(FileId::new(0), "src/Main.kt", parse.green, parse.errors, false)
    }

    fn find(file: &ParsedFile, kind: SyntaxKind, name: &str) -> SyntaxNode {
        file.root()
            .descendants()
            .find(|n| n.kind() == kind && declaration_name(n).as_deref() == Some(name))
            .unwrap()
    }

    fn no_hook(_: &SyntaxNode) -> Option<SemType> {
        None
    }

    #[test]
    fn test_class_id_for_nested_and_local() {
        let file = parsed("package a.b\nclass Outer { class Inner }\nfun f() { class Local }");
        let inner = find(&file, SyntaxKind::CLASS, "Inner");
        assert_eq!(class_id_for(&file, &inner).unwrap().to_string(), "a/b/Outer.Inner");
        let local = class_id_for(&file, &find(&file, SyntaxKind::CLASS, "Local")).unwrap();
        assert!(local.is_local());
    }

    #[test]
    fn test_lower_function_signature() {
        let file = parsed("package p\nfun <T> String.f(x: Int, y: List<T>): Boolean = true");
        let env = env();
        let ctx = LowerCtx { file: &file, env: &env, expression_type: &no_hook };
        let record = ctx.lower_function(&find(&file, SyntaxKind::FUN, "f")).unwrap();
        assert_eq!(record.kind, CallableKind::Function);
        assert_eq!(record.callable_id.to_string(), "p/f");
        assert_eq!(record.receiver_type, Some(SemType::class(standard::string())));
        assert_eq!(record.value_parameters.len(), 2);
        assert_eq!(record.return_type, SemType::class(standard::boolean()));
        assert!(matches!(
            record.value_parameters[1].ty.arguments()[0].ty(),
            SemType::TypeParameter { .. }
        ));
    }

    #[test]
    fn test_unresolved_type_is_error() {
        let file = parsed("val x: Missing = 1");
        let env = env();
        let ctx = LowerCtx { file: &file, env: &env, expression_type: &no_hook };
        let record = ctx.lower_property(&find(&file, SyntaxKind::PROPERTY, "x")).unwrap();
        assert!(record.return_type.is_error());
        assert_eq!(record.initializer, Some(ConstantValue::Int(1)));
    }

    #[test]
    fn test_property_type_from_literal() {
        let file = parsed("val x = 10L\nval s = \"hi\"");
        let env = env();
        let ctx = LowerCtx { file: &file, env: &env, expression_type: &no_hook };
        let x = ctx.lower_property(&find(&file, SyntaxKind::PROPERTY, "x")).unwrap();
        assert_eq!(x.return_type, SemType::class(standard::long()));
        let s = ctx.lower_property(&find(&file, SyntaxKind::PROPERTY, "s")).unwrap();
        assert_eq!(s.initializer, Some(ConstantValue::String("hi".to_string())));
        assert!(s.flags.has_backing_field);
        assert!(s.getter.is_some());
        assert!(s.setter.is_none());
    }

    #[test]
    fn test_data_class_members() {
        let file = parsed("data class P(val x: Int, var y: String)");
        let env = env();
        let ctx = LowerCtx { file: &file, env: &env, expression_type: &no_hook };
        let record = ctx.lower_class(&find(&file, SyntaxKind::CLASS, "P")).unwrap();
        // constructor + two properties
        assert_eq!(record.members.len(), 3);
        let synthesized: Vec<String> = record
            .synthesized_members
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(synthesized, vec!["component1", "component2", "copy"]);
        assert!(record
            .synthesized_members
            .iter()
            .all(|m| m.as_callable().unwrap().origin == SymbolOrigin::SourceMemberGenerated));
    }

    #[test]
    fn test_enum_class_entries_and_statics() {
        let file = parsed("enum class Color { RED, GREEN; fun f() {} }");
        let env = env();
        let ctx = LowerCtx { file: &file, env: &env, expression_type: &no_hook };
        let record = ctx.lower_class(&find(&file, SyntaxKind::CLASS, "Color")).unwrap();
        assert_eq!(record.kind, ClassKind::EnumClass);
        let entries: Vec<String> = record
            .members
            .iter()
            .filter_map(DeclRecord::as_class)
            .filter(|c| c.kind == ClassKind::EnumEntry)
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(entries, vec!["RED", "GREEN"]);
        let statics: Vec<String> = record.static_members.iter().map(|m| m.name().to_string()).collect();
        assert_eq!(statics, vec!["values", "valueOf", "entries"]);
        assert!(record.supertypes[0].class_id() == Some(&standard::enum_class()));
    }

    #[test]
    fn test_delegated_members() {
        let file = parsed(
            "interface Source { fun read(): Int\n val name: String }\nclass Wrapper(s: Source) : Source by s { override fun read(): Int = 1 }",
        );
        let mut env = env();
        let source_class = ctx_lower_class(&file, &env, "Source");
        env.graph.add_class("test", source_class);
        let ctx = LowerCtx { file: &file, env: &env, expression_type: &no_hook };
        let wrapper = ctx.lower_class(&find(&file, SyntaxKind::CLASS, "Wrapper")).unwrap();
        let delegated: Vec<String> = wrapper
            .delegated_members
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(delegated, vec!["name"]);
        assert_eq!(
            wrapper.delegated_members[0].as_callable().unwrap().origin,
            SymbolOrigin::Delegated
        );
    }

    fn ctx_lower_class(file: &ParsedFile, env: &TestEnv, name: &str) -> ClassRecord {
        let ctx = LowerCtx { file, env, expression_type: &no_hook };
        ctx.lower_class(&find(file, SyntaxKind::CLASS, name)).unwrap()
    }

    #[test]
    fn test_anonymous_function_kind() {
        let file = parsed("val f = fun(x: Int): Int { return x }");
        let env = env();
        let ctx = LowerCtx { file: &file, env: &env, expression_type: &no_hook };
        let fun = file.root().descendants().find(|n| n.kind() == SyntaxKind::FUN).unwrap();
        let record = ctx.lower_function(&fun).unwrap();
        assert_eq!(record.kind, CallableKind::AnonymousFunction);
        assert_eq!(record.name(), &Name::anonymous());
        assert!(record.is_local);
    }

    #[test]
    fn test_constant_values() {
        let file = parsed("val a = 0x1F\nval b = -2\nval c = 'x'\nval d = \"a$b\"");
        let init = |name: &str| {
            Property::cast(find(&file, SyntaxKind::PROPERTY, name))
                .unwrap()
                .initializer()
                .unwrap()
        };
        assert_eq!(constant_value(&init("a")), Some(ConstantValue::Int(31)));
        assert_eq!(constant_value(&init("b")), Some(ConstantValue::Int(-2)));
        assert_eq!(constant_value(&init("c")), Some(ConstantValue::Char('x')));
        assert_eq!(constant_value(&init("d")), None);
    }
}
