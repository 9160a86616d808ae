//! Syntactic lexical scope chains.
//!
//! For every statement position inside a declaration, the chain of frames a
//! name lookup would walk: blocks, then the enclosing function-like frames,
//! then class receivers. File and import levels are left to the caller.

use super::lower::{LowerCtx, owning_class};
use super::oracle::{
    BindingFacts, FrameKind, LexicalFrame, LexicalScopeChain, OwnerRef, ReceiverFact,
    ResolvedTarget, ScopeEntry,
};
use super::records::SourceRef;
use crate::base::Name;
use crate::parser::ast::{
    AstNode, Block, Class, ClassBody, Fun, LambdaExpr, ObjectDeclaration, PrimaryConstructor,
    Property, PropertyAccessor, SecondaryConstructor, TypeParameterList, ValueParameterList,
    declaration_name, expr_child, has_modifier,
};
use crate::parser::{SyntaxKind, SyntaxNode};
use crate::syntax::NodePtr;

/// Nodes a lexical scope is recorded for.
pub fn is_scope_key(node: &SyntaxNode) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        SyntaxKind::BLOCK => Block::cast(parent.clone())
            .is_some_and(|b| b.statements().any(|s| &s == node)),
        SyntaxKind::FUN | SyntaxKind::PROPERTY | SyntaxKind::PROPERTY_ACCESSOR => {
            expr_child(&parent).as_ref() == Some(node)
        }
        _ => false,
    }
}

/// Record a chain for every scope key inside `decl`.
pub fn collect_lexical_scopes(ctx: &LowerCtx<'_>, decl: &SyntaxNode, facts: &mut BindingFacts) {
    for node in decl.descendants().filter(is_scope_key) {
        facts.insert_lexical_scope(NodePtr::new(&node), lexical_chain(ctx, &node));
    }
}

fn entry(ctx: &LowerCtx<'_>, node: &SyntaxNode) -> Option<ScopeEntry> {
    let name = declaration_name(node)?;
    Some(ScopeEntry {
        name: Name::new(name),
        target: ResolvedTarget::Source(source(ctx, node)),
    })
}

fn source(ctx: &LowerCtx<'_>, node: &SyntaxNode) -> SourceRef {
    SourceRef {
        file: ctx.file.id(),
        ptr: NodePtr::new(node),
    }
}

fn owner(ctx: &LowerCtx<'_>, node: &SyntaxNode) -> OwnerRef {
    OwnerRef::Declaration(source(ctx, node))
}

fn parameter_entries(ctx: &LowerCtx<'_>, list: Option<ValueParameterList>) -> Vec<ScopeEntry> {
    list.map(|l| l.parameters().filter_map(|p| entry(ctx, p.syntax())).collect())
        .unwrap_or_default()
}

fn type_parameter_entries(ctx: &LowerCtx<'_>, list: Option<TypeParameterList>) -> Vec<ScopeEntry> {
    list.map(|l| l.parameters().filter_map(|p| entry(ctx, p.syntax())).collect())
        .unwrap_or_default()
}

fn primary_constructor_entries(ctx: &LowerCtx<'_>, class: &SyntaxNode) -> Vec<ScopeEntry> {
    parameter_entries(
        ctx,
        class
            .children()
            .find_map(PrimaryConstructor::cast)
            .and_then(|c| c.parameter_list()),
    )
}

fn class_body_of(node: &SyntaxNode) -> Option<ClassBody> {
    node.children().find_map(ClassBody::cast)
}

/// Chain visible at `at`, innermost frame first.
pub fn lexical_chain(ctx: &LowerCtx<'_>, at: &SyntaxNode) -> LexicalScopeChain {
    let mut frames = Vec::new();
    let mut child = at.clone();
    // Set once a nested (non-inner) class is left: outer instances are no
    // longer implicit receivers.
    let mut outer_instances_hidden = false;
    let mut previous_class: Option<SyntaxNode> = None;

    for ancestor in at.ancestors().skip(1) {
        match ancestor.kind() {
            SyntaxKind::BLOCK => {
                let entries = Block::cast(ancestor.clone())
                    .map(|block| {
                        block
                            .statements()
                            .take_while(|s| s != &child)
                            .filter(|s| s.kind().is_declaration())
                            .filter(|s| s.kind() != SyntaxKind::LAMBDA_EXPR)
                            .filter_map(|s| entry(ctx, &s))
                            .collect()
                    })
                    .unwrap_or_default();
                let owner_node = ancestor
                    .ancestors()
                    .skip(1)
                    .find(|n| n.kind().is_declaration());
                frames.push(LexicalFrame {
                    kind: FrameKind::Block,
                    owner: match owner_node {
                        Some(node) => owner(ctx, &node),
                        None => OwnerRef::Unknown(format!("block at {:?}", ancestor.text_range())),
                    },
                    entries,
                    implicit_receiver: None,
                });
            }
            SyntaxKind::FUN => {
                if let Some(fun) = Fun::cast(ancestor.clone()) {
                    let mut entries = parameter_entries(ctx, fun.parameter_list());
                    entries.extend(type_parameter_entries(ctx, fun.type_parameter_list()));
                    let implicit_receiver = fun.receiver_type().map(|r| ReceiverFact {
                        ty: ctx.lower_type_ref(Some(&r)),
                        owner: owner(ctx, &ancestor),
                    });
                    frames.push(LexicalFrame {
                        kind: FrameKind::Function,
                        owner: owner(ctx, &ancestor),
                        entries,
                        implicit_receiver,
                    });
                }
            }
            SyntaxKind::LAMBDA_EXPR => {
                let entries = LambdaExpr::cast(ancestor.clone())
                    .map(|l| parameter_entries(ctx, l.parameter_list()))
                    .unwrap_or_default();
                frames.push(LexicalFrame {
                    kind: FrameKind::Lambda,
                    owner: owner(ctx, &ancestor),
                    entries,
                    implicit_receiver: None,
                });
            }
            SyntaxKind::PROPERTY_ACCESSOR => {
                let entries = PropertyAccessor::cast(ancestor.clone())
                    .map(|a| parameter_entries(ctx, a.parameter_list()))
                    .unwrap_or_default();
                let implicit_receiver = ancestor
                    .parent()
                    .and_then(Property::cast)
                    .and_then(|p| p.receiver_type())
                    .map(|r| ReceiverFact {
                        ty: ctx.lower_type_ref(Some(&r)),
                        owner: owner(ctx, &ancestor),
                    });
                frames.push(LexicalFrame {
                    kind: FrameKind::Accessor,
                    owner: owner(ctx, &ancestor),
                    entries,
                    implicit_receiver,
                });
            }
            SyntaxKind::SECONDARY_CONSTRUCTOR => {
                let entries = SecondaryConstructor::cast(ancestor.clone())
                    .map(|c| parameter_entries(ctx, c.parameter_list()))
                    .unwrap_or_default();
                frames.push(LexicalFrame {
                    kind: FrameKind::Constructor,
                    owner: owner(ctx, &ancestor),
                    entries,
                    implicit_receiver: None,
                });
            }
            SyntaxKind::CLASS_INITIALIZER => {
                if let Some(class) = owning_class(&ancestor) {
                    frames.push(LexicalFrame {
                        kind: FrameKind::Initializer,
                        owner: owner(ctx, &ancestor),
                        entries: primary_constructor_entries(ctx, &class),
                        implicit_receiver: None,
                    });
                }
            }
            // Member property initializers see the primary constructor.
            SyntaxKind::PROPERTY if child.kind() != SyntaxKind::PROPERTY_ACCESSOR => {
                if let Some(class) = owning_class(&ancestor) {
                    let entries = primary_constructor_entries(ctx, &class);
                    if !entries.is_empty() {
                        frames.push(LexicalFrame {
                            kind: FrameKind::Initializer,
                            owner: owner(ctx, &ancestor),
                            entries,
                            implicit_receiver: None,
                        });
                    }
                }
            }
            SyntaxKind::CLASS | SyntaxKind::OBJECT_DECLARATION | SyntaxKind::ENUM_ENTRY => {
                let is_object = ancestor.kind() == SyntaxKind::OBJECT_DECLARATION;
                let entries = ancestor
                    .children()
                    .find_map(TypeParameterList::cast)
                    .map(|l| type_parameter_entries(ctx, Some(l)))
                    .unwrap_or_default();
                let receiver = (is_object || !outer_instances_hidden).then(|| ReceiverFact {
                    ty: ctx.class_default_type(&ancestor),
                    owner: owner(ctx, &ancestor),
                });
                frames.push(LexicalFrame {
                    kind: FrameKind::Class,
                    owner: owner(ctx, &ancestor),
                    entries,
                    implicit_receiver: receiver,
                });
                let companion = class_body_of(&ancestor).and_then(|body| {
                    body.declarations()
                        .filter_map(ObjectDeclaration::cast)
                        .find(|o| o.is_companion())
                });
                if let Some(companion) = companion.filter(|c| previous_class.as_ref() != Some(c.syntax())) {
                    frames.push(LexicalFrame {
                        kind: FrameKind::Class,
                        owner: owner(ctx, companion.syntax()),
                        entries: Vec::new(),
                        implicit_receiver: Some(ReceiverFact {
                            ty: ctx.class_default_type(companion.syntax()),
                            owner: owner(ctx, companion.syntax()),
                        }),
                    });
                }
                let inner = Class::cast(ancestor.clone()).is_some_and(|_| has_modifier(&ancestor, "inner"));
                let local = !matches!(
                    super::lower::declaration_location(&ancestor),
                    super::lower::DeclLocation::Member(_)
                );
                if !inner && !local {
                    outer_instances_hidden = true;
                }
                previous_class = Some(ancestor.clone());
            }
            _ => {}
        }
        child = ancestor;
    }
    LexicalScopeChain { frames }
}
