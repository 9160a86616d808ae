//! Stable references into syntax trees.
//!
//! - [`NodePtr`] names a node of one particular tree by kind and range. It is
//!   the key the inference oracle uses for its facts.
//! - [`SourceAnchor`] names a declaration across trees. Besides the pointer it
//!   records the chain of enclosing declarations, so a declaration can still
//!   be found after unrelated edits shifted its offsets.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::parser::ast::declaration_name;
use crate::parser::{SyntaxKind, SyntaxNode, TextRange, TextSize};

// ============================================================================
// NodePtr
// ============================================================================

/// A node identified by kind and text range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePtr {
    kind: SyntaxKind,
    range: TextRange,
}

impl NodePtr {
    pub fn new(node: &SyntaxNode) -> Self {
        Self {
            kind: node.kind(),
            range: node.text_range(),
        }
    }

    pub fn from_parts(kind: SyntaxKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Find the node in `root`, `None` if the tree has no such node.
    pub fn to_node(&self, root: &SyntaxNode) -> Option<SyntaxNode> {
        if !root.text_range().contains_range(self.range) {
            return None;
        }
        let start = match root.covering_element(self.range) {
            rowan::NodeOrToken::Node(node) => node,
            rowan::NodeOrToken::Token(token) => token.parent()?,
        };
        start
            .ancestors()
            .find(|n| n.kind() == self.kind && n.text_range() == self.range)
    }
}

/// Innermost node of `kind`-predicate containing `offset`.
pub fn find_node_at_offset(
    root: &SyntaxNode,
    offset: TextSize,
    pred: impl Fn(SyntaxKind) -> bool,
) -> Option<SyntaxNode> {
    let token = root.token_at_offset(offset).right_biased()?;
    token.parent_ancestors().find(|n| pred(n.kind()))
}

// ============================================================================
// SourceAnchor
// ============================================================================

/// One enclosing declaration on the way from the file root to an anchored
/// declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorStep {
    pub kind: SyntaxKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<SmolStr>,
    /// Index among siblings with the same kind and name
    pub ordinal: u32,
}

/// A declaration-site anchor that survives re-parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceAnchor {
    pub path: SmolStr,
    pub ptr: NodePtr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<SmolStr>,
    pub trail: Vec<AnchorStep>,
}

impl SourceAnchor {
    pub fn new(path: impl Into<SmolStr>, node: &SyntaxNode) -> Self {
        let mut trail = Vec::new();
        let mut current = Some(node.clone());
        while let Some(decl) = current {
            let parent = anchor_parent(&decl);
            let name = declaration_name(&decl).map(SmolStr::from);
            let ordinal = parent
                .as_ref()
                .map(|p| {
                    anchor_children(p)
                        .take_while(|sibling| sibling != &decl)
                        .filter(|sibling| {
                            sibling.kind() == decl.kind()
                                && declaration_name(sibling).map(SmolStr::from) == name
                        })
                        .count() as u32
                })
                .unwrap_or(0);
            if parent.is_some() {
                trail.push(AnchorStep {
                    kind: decl.kind(),
                    name,
                    ordinal,
                });
            }
            current = parent.filter(|p| p.kind() != SyntaxKind::SOURCE_FILE);
        }
        trail.reverse();
        Self {
            path: path.into(),
            ptr: NodePtr::new(node),
            name: declaration_name(node).map(SmolStr::from),
            trail,
        }
    }

    /// Re-locate the anchored declaration in `root`.
    ///
    /// The exact position is tried first; if the text moved, the trail of
    /// enclosing declarations is followed instead.
    pub fn restore(&self, root: &SyntaxNode) -> Option<SyntaxNode> {
        if let Some(node) = self.ptr.to_node(root) {
            if declaration_name(&node).map(SmolStr::from) == self.name
                && SourceAnchor::new(self.path.clone(), &node).trail == self.trail
            {
                return Some(node);
            }
        }
        let mut current = root.clone();
        for step in &self.trail {
            let next = anchor_children(&current)
                .filter(|n| {
                    n.kind() == step.kind && declaration_name(n).map(SmolStr::from) == step.name
                })
                .nth(step.ordinal as usize)?;
            current = next;
        }
        (current.kind() == self.ptr.kind()).then_some(current)
    }
}

/// Nearest enclosing declaration or the file root.
fn anchor_parent(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.ancestors()
        .skip(1)
        .find(|n| n.kind().is_declaration() || n.kind() == SyntaxKind::SOURCE_FILE)
}

/// Declarations whose [`anchor_parent`] is `parent`, in source order.
fn anchor_children(parent: &SyntaxNode) -> impl Iterator<Item = SyntaxNode> + '_ {
    parent
        .descendants()
        .skip(1)
        .filter(|n| n.kind().is_declaration())
        .filter(move |n| anchor_parent(n).as_ref() == Some(parent))
}
