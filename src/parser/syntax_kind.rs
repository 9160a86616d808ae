//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree of
//! the declaration language (packages, classes, functions, properties and a
//! compact expression grammar).

use serde::{Deserialize, Serialize};

/// All syntax kinds (tokens and nodes).
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (classes, functions, expressions).
///
/// Soft keywords (`constructor`, `init`, `get`, `set`, `by`, modifiers such as
/// `data` or `sealed`) are lexed as [`SyntaxKind::IDENT`] and recognised by
/// the parser from context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,          // foo, `foo bar`
    INT_LITERAL,    // 42, 0xFF, 10L
    FLOAT_LITERAL,  // 3.14, 1f
    STRING_LITERAL, // "hello"
    CHAR_LITERAL,   // 'c'

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,     // {
    R_BRACE,     // }
    L_PAREN,     // (
    R_PAREN,     // )
    L_BRACKET,   // [
    R_BRACKET,   // ]
    SEMICOLON,   // ;
    COLON,       // :
    COLON_COLON, // ::
    COMMA,       // ,
    DOT,         // .
    DOT_DOT,     // ..
    SAFE_DOT,    // ?.
    ELVIS,       // ?:
    QUESTION,    // ?
    BANG,        // !
    BANG_BANG,   // !!
    BANG_EQ,     // !=
    EQ,          // =
    EQ_EQ,       // ==
    PLUS_EQ,     // +=
    MINUS_EQ,    // -=
    LT,          // <
    GT,          // >
    LT_EQ,       // <=
    GT_EQ,       // >=
    ARROW,       // ->
    PLUS,        // +
    PLUS_PLUS,   // ++
    MINUS,       // -
    MINUS_MINUS, // --
    STAR,        // *
    SLASH,       // /
    PERCENT,     // %
    AMP_AMP,     // &&
    PIPE_PIPE,   // ||
    AT,          // @

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    PACKAGE_KW,
    IMPORT_KW,
    CLASS_KW,
    INTERFACE_KW,
    OBJECT_KW,
    FUN_KW,
    VAL_KW,
    VAR_KW,
    TYPEALIAS_KW,
    IF_KW,
    ELSE_KW,
    RETURN_KW,
    IS_KW,
    AS_KW,
    IN_KW,
    NULL_KW,
    TRUE_KW,
    FALSE_KW,
    THIS_KW,
    SUPER_KW,

    // =========================================================================
    // NODES - file structure
    // =========================================================================
    SOURCE_FILE,
    PACKAGE_DIRECTIVE,
    IMPORT_DIRECTIVE,
    IMPORT_ALIAS,
    PATH,
    MODIFIER_LIST,
    ANNOTATION_ENTRY,

    // =========================================================================
    // NODES - declarations
    // =========================================================================
    CLASS,
    OBJECT_DECLARATION,
    CLASS_BODY,
    ENUM_ENTRY,
    PRIMARY_CONSTRUCTOR,
    SECONDARY_CONSTRUCTOR,
    CONSTRUCTOR_DELEGATION_CALL,
    CLASS_INITIALIZER,
    SUPER_TYPE_LIST,
    SUPER_TYPE_ENTRY,
    SUPER_TYPE_CALL_ENTRY,
    DELEGATED_SUPER_TYPE_ENTRY,
    FUN,
    PROPERTY,
    PROPERTY_ACCESSOR,
    PROPERTY_DELEGATE,
    VALUE_PARAMETER_LIST,
    VALUE_PARAMETER,
    TYPE_PARAMETER_LIST,
    TYPE_PARAMETER,
    TYPE_ALIAS,

    // =========================================================================
    // NODES - types
    // =========================================================================
    TYPE_REF,
    USER_TYPE,
    FUNCTION_TYPE,
    FUNCTION_TYPE_PARAMS,
    NULLABLE_TYPE,
    TYPE_ARGUMENT_LIST,
    TYPE_PROJECTION,
    RECEIVER_TYPE,

    // =========================================================================
    // NODES - expressions
    // =========================================================================
    BLOCK,
    LAMBDA_EXPR,
    OBJECT_LITERAL,
    NAME_REF,
    LITERAL,
    PAREN_EXPR,
    CALL_EXPR,
    VALUE_ARGUMENT_LIST,
    VALUE_ARGUMENT,
    DOT_QUALIFIED_EXPR,
    SAFE_QUALIFIED_EXPR,
    BINARY_EXPR,
    IS_EXPR,
    AS_EXPR,
    PREFIX_EXPR,
    POSTFIX_EXPR,
    IF_EXPR,
    RETURN_EXPR,
    THIS_EXPR,
    SUPER_EXPR,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::PACKAGE_KW as u16) && (self as u16) <= (Self::SUPER_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::AT as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INT_LITERAL
                | Self::FLOAT_LITERAL
                | Self::STRING_LITERAL
                | Self::CHAR_LITERAL
                | Self::NULL_KW
                | Self::TRUE_KW
                | Self::FALSE_KW
        )
    }

    /// Nodes that introduce a named or anonymous declaration.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            Self::CLASS
                | Self::OBJECT_DECLARATION
                | Self::ENUM_ENTRY
                | Self::PRIMARY_CONSTRUCTOR
                | Self::SECONDARY_CONSTRUCTOR
                | Self::CLASS_INITIALIZER
                | Self::FUN
                | Self::PROPERTY
                | Self::PROPERTY_ACCESSOR
                | Self::VALUE_PARAMETER
                | Self::TYPE_PARAMETER
                | Self::TYPE_ALIAS
                | Self::LAMBDA_EXPR
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KtLanguage {}

impl rowan::Language for KtLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<KtLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<KtLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<KtLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<KtLanguage>;
