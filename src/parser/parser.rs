//! Recursive descent parser for the declaration language
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.
//!
//! Trivia is attached to the node that follows it: `start_node` and
//! `checkpoint` flush pending trivia first, so node ranges never begin with
//! whitespace. Newlines are significant for a handful of decisions (call
//! suffixes, binary operators, `return` values) and are detected by looking
//! at the trivia between two significant tokens.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse source text into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens);
    parser.parse_source_file();
    parser.finish()
}

/// Modifier keywords that are lexed as identifiers.
const SOFT_MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "open", "final", "abstract", "sealed", "data",
    "enum", "inner", "companion", "override", "lateinit", "const", "inline", "vararg", "reified",
    "out", "suspend", "external", "annotation", "value", "operator", "infix", "noinline",
    "crossinline", "expect", "actual", "tailrec",
];

/// Where a declaration appears; controls which members are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclContext {
    TopLevel,
    ClassBody,
    Local,
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    /// Set while parsing `A by expr` in a super type list, where a `{` on the
    /// same line opens the class body rather than a trailing lambda.
    no_trailing_lambda: bool,
    /// The `.` half of a `?.` token that was split after a nullable receiver.
    pending_dot: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            no_trailing_lambda: false,
            pending_dot: false,
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection (trivia is transparent)
    // =========================================================================

    fn nth_index(&self, n: usize) -> Option<usize> {
        let mut idx = self.pos;
        let mut count = 0;
        while idx < self.tokens.len() {
            if !self.tokens[idx].kind.is_trivia() {
                if count == n {
                    return Some(idx);
                }
                count += 1;
            }
            idx += 1;
        }
        None
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_index(n)
            .map(|idx| self.tokens[idx].kind)
            .unwrap_or(SyntaxKind::ERROR)
    }

    fn nth_text(&self, n: usize) -> &'a str {
        self.nth_index(n).map(|idx| self.tokens[idx].text).unwrap_or("")
    }

    fn current_kind(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn current_text(&self) -> &'a str {
        self.nth_text(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        !self.at_eof() && kinds.contains(&self.current_kind())
    }

    fn at_ident(&self, text: &str) -> bool {
        self.at(SyntaxKind::IDENT) && self.current_text() == text
    }

    fn at_eof(&self) -> bool {
        self.nth_index(0).is_none()
    }

    /// `true` if a line break separates the next significant token from the
    /// previous one.
    fn newline_before(&self) -> bool {
        let next = self.nth_index(0).unwrap_or(self.tokens.len());
        let mut idx = next;
        while idx > 0 && self.tokens[idx - 1].kind.is_trivia() {
            if self.tokens[idx - 1].text.contains('\n') {
                return true;
            }
            idx -= 1;
        }
        false
    }

    fn is_modifier_text(text: &str) -> bool {
        SOFT_MODIFIERS.contains(&text)
    }

    /// A soft modifier is only a modifier when something declaration-like
    /// follows it (`data class`, `private val`, `vararg xs`).
    fn at_modifier(&self) -> bool {
        match self.current_kind() {
            SyntaxKind::IDENT if Self::is_modifier_text(self.current_text()) => matches!(
                self.nth(1),
                SyntaxKind::IDENT
                    | SyntaxKind::CLASS_KW
                    | SyntaxKind::INTERFACE_KW
                    | SyntaxKind::OBJECT_KW
                    | SyntaxKind::FUN_KW
                    | SyntaxKind::VAL_KW
                    | SyntaxKind::VAR_KW
                    | SyntaxKind::TYPEALIAS_KW
                    | SyntaxKind::AT
            ),
            SyntaxKind::IN_KW => self.nth(1) == SyntaxKind::IDENT,
            SyntaxKind::FUN_KW => self.nth(1) == SyntaxKind::INTERFACE_KW,
            _ => false,
        }
    }

    fn at_modifier_or_annotation(&self) -> bool {
        self.at(SyntaxKind::AT) || self.at_modifier()
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn skip_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.skip_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {:?}", kind));
            false
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .nth_index(0)
            .map(|idx| {
                let t = &self.tokens[idx];
                TextRange::at(t.offset, TextSize::of(t.text))
            })
            .unwrap_or_else(|| {
                let end = self
                    .tokens
                    .last()
                    .map(|t| t.offset + TextSize::of(t.text))
                    .unwrap_or_default();
                TextRange::empty(end)
            });
        self.errors.push(SyntaxError::new(message, range));
    }

    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        self.start_node(SyntaxKind::ERROR);
        // Always consume at least one token to make progress
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.skip_trivia();
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia();
        self.builder.checkpoint()
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    // =========================================================================
    // File structure
    // =========================================================================

    /// SourceFile = PackageDirective? ImportDirective* Declaration*
    fn parse_source_file(&mut self) {
        // Leading trivia belongs inside the root
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());

        if self.at(SyntaxKind::PACKAGE_KW) {
            self.parse_package_directive();
        }
        while self.at(SyntaxKind::IMPORT_KW) {
            self.parse_import_directive();
        }

        while !self.at_eof() {
            let pos_before = self.pos;
            if !self.eat(SyntaxKind::SEMICOLON) {
                self.parse_declaration(DeclContext::TopLevel);
            }
            if self.pos == pos_before && !self.at_eof() {
                self.error(format!("stuck on token: {:?}", self.current_kind()));
                self.bump();
            }
        }

        self.skip_trivia();
        self.finish_node();
    }

    /// PackageDirective = 'package' Path ';'?
    fn parse_package_directive(&mut self) {
        self.start_node(SyntaxKind::PACKAGE_DIRECTIVE);
        self.expect(SyntaxKind::PACKAGE_KW);
        self.parse_path();
        self.eat(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// ImportDirective = 'import' Path ('.' '*' | 'as' IDENT)? ';'?
    fn parse_import_directive(&mut self) {
        self.start_node(SyntaxKind::IMPORT_DIRECTIVE);
        self.expect(SyntaxKind::IMPORT_KW);
        self.parse_path();
        if self.at(SyntaxKind::DOT) && self.nth(1) == SyntaxKind::STAR {
            self.bump();
            self.bump();
        } else if self.at(SyntaxKind::AS_KW) {
            self.start_node(SyntaxKind::IMPORT_ALIAS);
            self.bump();
            self.expect(SyntaxKind::IDENT);
            self.finish_node();
        }
        self.eat(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// Path = IDENT ('.' IDENT)*
    fn parse_path(&mut self) {
        self.start_node(SyntaxKind::PATH);
        self.expect(SyntaxKind::IDENT);
        while self.at(SyntaxKind::DOT) && self.nth(1) == SyntaxKind::IDENT {
            self.bump();
            self.bump();
        }
        self.finish_node();
    }

    /// ModifierList = (Annotation | Modifier)+
    ///
    /// Returns the modifier keywords that were seen.
    fn parse_modifier_list(&mut self) -> Vec<&'a str> {
        let mut seen = Vec::new();
        if !self.at_modifier_or_annotation() {
            return seen;
        }
        self.start_node(SyntaxKind::MODIFIER_LIST);
        while self.at_modifier_or_annotation() {
            if self.at(SyntaxKind::AT) {
                self.parse_annotation();
            } else {
                seen.push(self.current_text());
                self.bump();
            }
        }
        self.finish_node();
        seen
    }

    /// Annotation = '@' Path ValueArgumentList?
    fn parse_annotation(&mut self) {
        self.start_node(SyntaxKind::ANNOTATION_ENTRY);
        self.expect(SyntaxKind::AT);
        self.parse_path();
        if self.at(SyntaxKind::L_PAREN) && !self.newline_before() {
            self.parse_value_argument_list();
        }
        self.finish_node();
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn at_declaration_start(&self, context: DeclContext) -> bool {
        match self.current_kind() {
            SyntaxKind::CLASS_KW
            | SyntaxKind::INTERFACE_KW
            | SyntaxKind::VAL_KW
            | SyntaxKind::VAR_KW
            | SyntaxKind::TYPEALIAS_KW => true,
            // `fun(...)` in statement position is an anonymous function
            SyntaxKind::FUN_KW => {
                context != DeclContext::Local || self.nth(1) != SyntaxKind::L_PAREN
            }
            // `object : T {}` in statement position is an object literal
            SyntaxKind::OBJECT_KW => {
                context != DeclContext::Local || self.nth(1) == SyntaxKind::IDENT
            }
            SyntaxKind::AT => true,
            SyntaxKind::IDENT if context == DeclContext::ClassBody => {
                (self.current_text() == "constructor" && self.nth(1) == SyntaxKind::L_PAREN)
                    || (self.current_text() == "init" && self.nth(1) == SyntaxKind::L_BRACE)
                    || self.at_modifier()
            }
            _ => self.at_modifier(),
        }
    }

    /// Declaration = ModifierList? (Class | Object | Fun | Property | TypeAlias
    ///             | SecondaryConstructor | ClassInitializer)
    fn parse_declaration(&mut self, context: DeclContext) {
        let cp = self.checkpoint();
        let modifiers = self.parse_modifier_list();

        match self.current_kind() {
            SyntaxKind::CLASS_KW | SyntaxKind::INTERFACE_KW => {
                self.parse_class(cp, modifiers.contains(&"enum"));
            }
            SyntaxKind::OBJECT_KW => self.parse_object_declaration(cp),
            SyntaxKind::FUN_KW => self.parse_fun(cp),
            SyntaxKind::VAL_KW | SyntaxKind::VAR_KW => self.parse_property(cp, context),
            SyntaxKind::TYPEALIAS_KW => self.parse_type_alias(cp),
            SyntaxKind::IDENT
                if context == DeclContext::ClassBody && self.current_text() == "constructor" =>
            {
                self.parse_secondary_constructor(cp);
            }
            SyntaxKind::IDENT
                if context == DeclContext::ClassBody && self.current_text() == "init" =>
            {
                self.start_node_at(cp, SyntaxKind::CLASS_INITIALIZER);
                self.bump();
                self.parse_block();
                self.finish_node();
            }
            _ => {
                self.error_recover(
                    format!("expected a declaration, found {:?}", self.current_kind()),
                    &[
                        SyntaxKind::CLASS_KW,
                        SyntaxKind::INTERFACE_KW,
                        SyntaxKind::OBJECT_KW,
                        SyntaxKind::FUN_KW,
                        SyntaxKind::VAL_KW,
                        SyntaxKind::VAR_KW,
                        SyntaxKind::TYPEALIAS_KW,
                        SyntaxKind::R_BRACE,
                        SyntaxKind::AT,
                    ],
                );
            }
        }
        self.eat(SyntaxKind::SEMICOLON);
    }

    /// Class = ('class' | 'interface') IDENT TypeParameterList? PrimaryConstructor?
    ///         (':' SuperTypeList)? ClassBody?
    fn parse_class(&mut self, cp: Checkpoint, is_enum: bool) {
        self.start_node_at(cp, SyntaxKind::CLASS);
        self.bump(); // class | interface
        self.expect(SyntaxKind::IDENT);
        if self.at(SyntaxKind::LT) {
            self.parse_type_parameter_list();
        }
        if self.at_primary_constructor() {
            self.parse_primary_constructor();
        }
        if self.eat(SyntaxKind::COLON) {
            self.parse_super_type_list();
        }
        if self.at(SyntaxKind::L_BRACE) {
            self.parse_class_body(is_enum);
        }
        self.finish_node();
    }

    fn at_primary_constructor(&self) -> bool {
        if self.at(SyntaxKind::L_PAREN) {
            return true;
        }
        if self.at_ident("constructor") {
            return true;
        }
        // `private constructor(...)`, `@Inject constructor(...)`
        let mut n = 0;
        loop {
            let kind = self.nth(n);
            let text = self.nth_text(n);
            if kind == SyntaxKind::IDENT && text == "constructor" {
                return n > 0;
            }
            if kind == SyntaxKind::IDENT && Self::is_modifier_text(text) {
                n += 1;
                continue;
            }
            if kind == SyntaxKind::AT && self.nth(n + 1) == SyntaxKind::IDENT {
                n += 2;
                continue;
            }
            return false;
        }
    }

    /// PrimaryConstructor = (ModifierList? 'constructor')? ValueParameterList
    fn parse_primary_constructor(&mut self) {
        self.start_node(SyntaxKind::PRIMARY_CONSTRUCTOR);
        while self.at(SyntaxKind::AT)
            || (self.at(SyntaxKind::IDENT) && Self::is_modifier_text(self.current_text()))
        {
            self.start_node(SyntaxKind::MODIFIER_LIST);
            while self.at(SyntaxKind::AT)
                || (self.at(SyntaxKind::IDENT) && Self::is_modifier_text(self.current_text()))
            {
                if self.at(SyntaxKind::AT) {
                    self.parse_annotation();
                } else {
                    self.bump();
                }
            }
            self.finish_node();
        }
        if self.at_ident("constructor") {
            self.bump();
        }
        self.parse_value_parameter_list();
        self.finish_node();
    }

    /// SecondaryConstructor = 'constructor' ValueParameterList
    ///                        (':' ('this' | 'super') ValueArgumentList)? Block?
    fn parse_secondary_constructor(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::SECONDARY_CONSTRUCTOR);
        self.bump(); // constructor
        self.parse_value_parameter_list();
        if self.eat(SyntaxKind::COLON) {
            self.start_node(SyntaxKind::CONSTRUCTOR_DELEGATION_CALL);
            if !self.eat(SyntaxKind::THIS_KW) && !self.eat(SyntaxKind::SUPER_KW) {
                self.error("expected 'this' or 'super'");
            }
            if self.at(SyntaxKind::L_PAREN) {
                self.parse_value_argument_list();
            }
            self.finish_node();
        }
        if self.at(SyntaxKind::L_BRACE) {
            self.parse_block();
        }
        self.finish_node();
    }

    /// SuperTypeList = SuperTypeEntry (',' SuperTypeEntry)*
    fn parse_super_type_list(&mut self) {
        self.start_node(SyntaxKind::SUPER_TYPE_LIST);
        loop {
            let cp = self.checkpoint();
            self.parse_type_ref();
            if self.at(SyntaxKind::L_PAREN) && !self.newline_before() {
                self.parse_value_argument_list();
                self.start_node_at(cp, SyntaxKind::SUPER_TYPE_CALL_ENTRY);
            } else if self.at_ident("by") {
                self.bump();
                let saved = std::mem::replace(&mut self.no_trailing_lambda, true);
                self.parse_expr();
                self.no_trailing_lambda = saved;
                self.start_node_at(cp, SyntaxKind::DELEGATED_SUPER_TYPE_ENTRY);
            } else {
                self.start_node_at(cp, SyntaxKind::SUPER_TYPE_ENTRY);
            }
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.finish_node();
    }

    /// ClassBody = '{' EnumEntries? Declaration* '}'
    fn parse_class_body(&mut self, is_enum: bool) {
        self.start_node(SyntaxKind::CLASS_BODY);
        self.expect(SyntaxKind::L_BRACE);

        if is_enum {
            self.parse_enum_entries();
        }

        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            if !self.eat(SyntaxKind::SEMICOLON) {
                if self.at_declaration_start(DeclContext::ClassBody) {
                    self.parse_declaration(DeclContext::ClassBody);
                } else {
                    self.error_recover(
                        format!("unexpected token in class body: {:?}", self.current_kind()),
                        &[
                            SyntaxKind::CLASS_KW,
                            SyntaxKind::INTERFACE_KW,
                            SyntaxKind::OBJECT_KW,
                            SyntaxKind::FUN_KW,
                            SyntaxKind::VAL_KW,
                            SyntaxKind::VAR_KW,
                            SyntaxKind::R_BRACE,
                        ],
                    );
                }
            }
            if self.pos == pos_before && !self.at_eof() {
                self.bump();
            }
        }

        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// EnumEntries = EnumEntry (',' EnumEntry)* ','? ';'?
    fn parse_enum_entries(&mut self) {
        while self.at(SyntaxKind::IDENT) || self.at(SyntaxKind::AT) {
            let is_entry = self.at(SyntaxKind::AT)
                || matches!(
                    self.nth(1),
                    SyntaxKind::COMMA
                        | SyntaxKind::SEMICOLON
                        | SyntaxKind::R_BRACE
                        | SyntaxKind::L_PAREN
                        | SyntaxKind::L_BRACE
                );
            if !is_entry {
                break;
            }
            self.start_node(SyntaxKind::ENUM_ENTRY);
            self.parse_modifier_list();
            self.expect(SyntaxKind::IDENT);
            if self.at(SyntaxKind::L_PAREN) {
                self.parse_value_argument_list();
            }
            if self.at(SyntaxKind::L_BRACE) {
                self.parse_class_body(false);
            }
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.eat(SyntaxKind::SEMICOLON);
    }

    /// Object = 'object' IDENT? (':' SuperTypeList)? ClassBody?
    fn parse_object_declaration(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::OBJECT_DECLARATION);
        self.expect(SyntaxKind::OBJECT_KW);
        self.eat(SyntaxKind::IDENT);
        if self.eat(SyntaxKind::COLON) {
            self.parse_super_type_list();
        }
        if self.at(SyntaxKind::L_BRACE) {
            self.parse_class_body(false);
        }
        self.finish_node();
    }

    /// Fun = 'fun' TypeParameterList? (ReceiverType '.')? IDENT? ValueParameterList
    ///       (':' TypeRef)? ('=' Expr | Block)?
    ///
    /// The name is optional: a nameless `fun` is an anonymous function.
    fn parse_fun(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::FUN);
        self.expect(SyntaxKind::FUN_KW);
        if self.at(SyntaxKind::LT) {
            self.parse_type_parameter_list();
        }
        if self.at_receiver_type() {
            self.parse_receiver_type();
        }
        self.eat(SyntaxKind::IDENT);
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_value_parameter_list();
        } else {
            self.error("expected value parameter list");
        }
        if self.eat(SyntaxKind::COLON) {
            self.parse_type_ref();
        }
        self.parse_function_body();
        self.finish_node();
    }

    /// A receiver is present when the tokens after `fun` form a type that is
    /// followed by `.` before the function name.
    fn at_receiver_type(&self) -> bool {
        match self.current_kind() {
            SyntaxKind::IDENT => matches!(
                self.nth(1),
                SyntaxKind::DOT | SyntaxKind::LT | SyntaxKind::QUESTION | SyntaxKind::SAFE_DOT
            ),
            SyntaxKind::L_PAREN => {
                // `fun (A) -> B.name()` is rare; a parenthesised receiver is
                // only assumed when an arrow follows the closing paren.
                let mut depth = 0usize;
                let mut n = 0;
                loop {
                    match self.nth(n) {
                        SyntaxKind::L_PAREN => depth += 1,
                        SyntaxKind::R_PAREN => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                return self.nth(n + 1) == SyntaxKind::ARROW;
                            }
                        }
                        SyntaxKind::ERROR => return false,
                        _ => {}
                    }
                    n += 1;
                }
            }
            _ => false,
        }
    }

    /// ReceiverType '.'
    fn parse_receiver_type(&mut self) {
        self.start_node(SyntaxKind::RECEIVER_TYPE);
        self.parse_type_ref_with(true);
        self.finish_node();
        if self.pending_dot {
            self.builder.token(SyntaxKind::DOT.into(), ".");
            self.pending_dot = false;
        } else {
            self.expect(SyntaxKind::DOT);
        }
    }

    fn parse_function_body(&mut self) {
        if self.at(SyntaxKind::L_BRACE) {
            self.parse_block();
        } else if self.at(SyntaxKind::EQ) {
            self.bump();
            self.parse_expr();
        }
    }

    /// Property = ('val' | 'var') TypeParameterList? (ReceiverType '.')? IDENT
    ///            (':' TypeRef)? ('=' Expr | PropertyDelegate)? PropertyAccessor*
    fn parse_property(&mut self, cp: Checkpoint, context: DeclContext) {
        self.start_node_at(cp, SyntaxKind::PROPERTY);
        self.bump(); // val | var
        if self.at(SyntaxKind::LT) {
            self.parse_type_parameter_list();
        }
        if self.at(SyntaxKind::IDENT)
            && matches!(
                self.nth(1),
                SyntaxKind::DOT | SyntaxKind::LT | SyntaxKind::QUESTION | SyntaxKind::SAFE_DOT
            )
        {
            self.parse_receiver_type();
        }
        self.expect(SyntaxKind::IDENT);
        if self.eat(SyntaxKind::COLON) {
            self.parse_type_ref();
        }
        if self.at(SyntaxKind::EQ) {
            self.bump();
            self.parse_expr();
        } else if self.at_ident("by") {
            self.start_node(SyntaxKind::PROPERTY_DELEGATE);
            self.bump();
            self.parse_expr();
            self.finish_node();
        }
        if context != DeclContext::Local {
            for _ in 0..2 {
                self.eat(SyntaxKind::SEMICOLON);
                if !self.at_property_accessor() {
                    break;
                }
                self.parse_property_accessor();
            }
        }
        self.finish_node();
    }

    fn at_property_accessor(&self) -> bool {
        let mut n = 0;
        loop {
            let kind = self.nth(n);
            let text = self.nth_text(n);
            if kind == SyntaxKind::IDENT && (text == "get" || text == "set") {
                let next = self.nth(n + 1);
                return next == SyntaxKind::L_PAREN
                    || (n > 0 && !matches!(next, SyntaxKind::EQ | SyntaxKind::DOT));
            }
            if kind == SyntaxKind::IDENT && Self::is_modifier_text(text) {
                n += 1;
                continue;
            }
            if kind == SyntaxKind::AT && self.nth(n + 1) == SyntaxKind::IDENT {
                n += 2;
                continue;
            }
            return false;
        }
    }

    /// PropertyAccessor = ModifierList? ('get' | 'set') ValueParameterList?
    ///                    (':' TypeRef)? ('=' Expr | Block)?
    fn parse_property_accessor(&mut self) {
        self.start_node(SyntaxKind::PROPERTY_ACCESSOR);
        if self.at(SyntaxKind::AT) || !(self.at_ident("get") || self.at_ident("set")) {
            self.start_node(SyntaxKind::MODIFIER_LIST);
            while !self.at_eof() && !(self.at_ident("get") || self.at_ident("set")) {
                if self.at(SyntaxKind::AT) {
                    self.parse_annotation();
                } else {
                    self.bump();
                }
            }
            self.finish_node();
        }
        self.bump(); // get | set
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_value_parameter_list();
            if self.eat(SyntaxKind::COLON) {
                self.parse_type_ref();
            }
            self.parse_function_body();
        }
        self.finish_node();
    }

    /// TypeAlias = 'typealias' IDENT TypeParameterList? '=' TypeRef
    fn parse_type_alias(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SyntaxKind::TYPE_ALIAS);
        self.expect(SyntaxKind::TYPEALIAS_KW);
        self.expect(SyntaxKind::IDENT);
        if self.at(SyntaxKind::LT) {
            self.parse_type_parameter_list();
        }
        self.expect(SyntaxKind::EQ);
        self.parse_type_ref();
        self.finish_node();
    }

    /// ValueParameterList = '(' (ValueParameter (',' ValueParameter)* ','?)? ')'
    fn parse_value_parameter_list(&mut self) {
        self.start_node(SyntaxKind::VALUE_PARAMETER_LIST);
        self.expect(SyntaxKind::L_PAREN);
        while !self.at_eof() && !self.at(SyntaxKind::R_PAREN) {
            let pos_before = self.pos;
            self.parse_value_parameter(true);
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
            if self.pos == pos_before {
                self.bump();
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    /// ValueParameter = ModifierList? ('val' | 'var')? IDENT (':' TypeRef)? ('=' Expr)?
    fn parse_value_parameter(&mut self, allow_default: bool) {
        self.start_node(SyntaxKind::VALUE_PARAMETER);
        self.parse_modifier_list();
        if !self.eat(SyntaxKind::VAL_KW) {
            self.eat(SyntaxKind::VAR_KW);
        }
        self.expect(SyntaxKind::IDENT);
        if self.eat(SyntaxKind::COLON) {
            self.parse_type_ref();
        }
        if allow_default && self.eat(SyntaxKind::EQ) {
            self.parse_expr();
        }
        self.finish_node();
    }

    /// TypeParameterList = '<' TypeParameter (',' TypeParameter)* '>'
    fn parse_type_parameter_list(&mut self) {
        self.start_node(SyntaxKind::TYPE_PARAMETER_LIST);
        self.expect(SyntaxKind::LT);
        while !self.at_eof() && !self.at(SyntaxKind::GT) {
            self.start_node(SyntaxKind::TYPE_PARAMETER);
            self.parse_modifier_list();
            self.expect(SyntaxKind::IDENT);
            if self.eat(SyntaxKind::COLON) {
                self.parse_type_ref();
            }
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::GT);
        self.finish_node();
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn parse_type_ref(&mut self) {
        self.parse_type_ref_with(false);
    }

    /// TypeRef = ModifierList? (UserType | FunctionType | '(' TypeRef ')') '?'*
    ///
    /// In receiver position a qualified user type stops before the segment
    /// that is actually the declaration name (`fun a.B.name()`).
    fn parse_type_ref_with(&mut self, receiver: bool) {
        self.start_node(SyntaxKind::TYPE_REF);
        if self.at(SyntaxKind::AT) {
            self.parse_modifier_list();
        }
        let cp = self.checkpoint();
        match self.current_kind() {
            SyntaxKind::L_PAREN => {
                self.parse_paren_type_or_function_type(cp);
            }
            SyntaxKind::IDENT => {
                self.parse_user_type(receiver);
                if self.at(SyntaxKind::DOT) && self.nth(1) == SyntaxKind::L_PAREN && !receiver {
                    // `String.() -> Unit`
                    self.start_node_at(cp, SyntaxKind::TYPE_REF);
                    self.finish_node();
                    self.start_node_at(cp, SyntaxKind::RECEIVER_TYPE);
                    self.finish_node();
                    self.bump(); // .
                    self.parse_paren_type_or_function_type(cp);
                }
            }
            _ => {
                self.error(format!("expected a type, found {:?}", self.current_kind()));
            }
        }
        while self.at(SyntaxKind::QUESTION) && !self.newline_before() {
            self.bump();
            self.start_node_at(cp, SyntaxKind::NULLABLE_TYPE);
            self.finish_node();
        }
        if receiver && self.at(SyntaxKind::SAFE_DOT) && !self.newline_before() {
            // `String?.name`: the lexer glued `?` and `.` together
            self.skip_trivia();
            self.builder.token(SyntaxKind::QUESTION.into(), "?");
            self.pos += 1;
            self.pending_dot = true;
            self.start_node_at(cp, SyntaxKind::NULLABLE_TYPE);
            self.finish_node();
        }
        self.finish_node();
    }

    /// Either `(A, B) -> C` or a parenthesised `(A)`.
    fn parse_paren_type_or_function_type(&mut self, cp: Checkpoint) {
        let params_cp = self.checkpoint();
        self.expect(SyntaxKind::L_PAREN);
        while !self.at_eof() && !self.at(SyntaxKind::R_PAREN) {
            if self.at(SyntaxKind::IDENT) && self.nth(1) == SyntaxKind::COLON {
                self.bump();
                self.bump();
            }
            self.parse_type_ref();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        if self.at(SyntaxKind::ARROW) {
            self.start_node_at(params_cp, SyntaxKind::FUNCTION_TYPE_PARAMS);
            self.finish_node();
            self.bump();
            self.parse_type_ref();
            self.start_node_at(cp, SyntaxKind::FUNCTION_TYPE);
            self.finish_node();
        }
    }

    /// UserType = IDENT TypeArgumentList? ('.' IDENT TypeArgumentList?)*
    fn parse_user_type(&mut self, receiver: bool) {
        self.start_node(SyntaxKind::USER_TYPE);
        self.expect(SyntaxKind::IDENT);
        if self.at(SyntaxKind::LT) && !self.newline_before() {
            self.parse_type_argument_list();
        }
        while self.at(SyntaxKind::DOT) && self.nth(1) == SyntaxKind::IDENT {
            if receiver
                && !matches!(
                    self.nth(2),
                    SyntaxKind::DOT | SyntaxKind::LT | SyntaxKind::SAFE_DOT
                )
            {
                break;
            }
            self.bump();
            self.bump();
            if self.at(SyntaxKind::LT) && !self.newline_before() {
                self.parse_type_argument_list();
            }
        }
        self.finish_node();
    }

    /// TypeArgumentList = '<' TypeProjection (',' TypeProjection)* '>'
    fn parse_type_argument_list(&mut self) {
        self.start_node(SyntaxKind::TYPE_ARGUMENT_LIST);
        self.expect(SyntaxKind::LT);
        while !self.at_eof() && !self.at(SyntaxKind::GT) {
            self.start_node(SyntaxKind::TYPE_PROJECTION);
            if !self.eat(SyntaxKind::STAR) {
                self.parse_modifier_list();
                self.parse_type_ref();
            }
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::GT);
        self.finish_node();
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Block = '{' Statement* '}'
    fn parse_block(&mut self) {
        let saved = std::mem::replace(&mut self.no_trailing_lambda, false);
        self.start_node(SyntaxKind::BLOCK);
        self.expect(SyntaxKind::L_BRACE);
        self.parse_statements();
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
        self.no_trailing_lambda = saved;
    }

    fn parse_statements(&mut self) {
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            if !self.eat(SyntaxKind::SEMICOLON) {
                if self.at_declaration_start(DeclContext::Local) {
                    self.parse_declaration(DeclContext::Local);
                } else {
                    self.parse_expr();
                }
            }
            if self.pos == pos_before && !self.at_eof() {
                self.error(format!("unexpected token: {:?}", self.current_kind()));
                self.start_node(SyntaxKind::ERROR);
                self.bump();
                self.finish_node();
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self) {
        self.parse_expr_bp(0);
    }

    /// Binding power and node kind of the infix operator at the cursor.
    ///
    /// `&&`, `||` and `?:` may start a continuation line; every other infix
    /// operator must be on the same line as its left operand.
    fn infix_op(&self) -> Option<(u8, SyntaxKind, usize)> {
        let kind = self.current_kind();
        let continues_line = matches!(
            kind,
            SyntaxKind::AMP_AMP | SyntaxKind::PIPE_PIPE | SyntaxKind::ELVIS
        );
        if self.at_eof() || (!continues_line && self.newline_before()) {
            return None;
        }
        let op = match kind {
            SyntaxKind::EQ | SyntaxKind::PLUS_EQ | SyntaxKind::MINUS_EQ => {
                (1, SyntaxKind::BINARY_EXPR, 1)
            }
            SyntaxKind::PIPE_PIPE => (2, SyntaxKind::BINARY_EXPR, 1),
            SyntaxKind::AMP_AMP => (3, SyntaxKind::BINARY_EXPR, 1),
            SyntaxKind::EQ_EQ | SyntaxKind::BANG_EQ => (4, SyntaxKind::BINARY_EXPR, 1),
            SyntaxKind::LT | SyntaxKind::GT | SyntaxKind::LT_EQ | SyntaxKind::GT_EQ => {
                (5, SyntaxKind::BINARY_EXPR, 1)
            }
            SyntaxKind::IS_KW => (6, SyntaxKind::IS_EXPR, 1),
            SyntaxKind::IN_KW => (6, SyntaxKind::BINARY_EXPR, 1),
            SyntaxKind::BANG if self.nth(1) == SyntaxKind::IS_KW => (6, SyntaxKind::IS_EXPR, 2),
            SyntaxKind::BANG if self.nth(1) == SyntaxKind::IN_KW => {
                (6, SyntaxKind::BINARY_EXPR, 2)
            }
            SyntaxKind::ELVIS => (7, SyntaxKind::BINARY_EXPR, 1),
            SyntaxKind::DOT_DOT => (8, SyntaxKind::BINARY_EXPR, 1),
            SyntaxKind::PLUS | SyntaxKind::MINUS => (9, SyntaxKind::BINARY_EXPR, 1),
            SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => {
                (10, SyntaxKind::BINARY_EXPR, 1)
            }
            SyntaxKind::AS_KW => (11, SyntaxKind::AS_EXPR, 1),
            _ => return None,
        };
        Some(op)
    }

    /// Pratt loop over infix operators.
    fn parse_expr_bp(&mut self, min_bp: u8) {
        let cp = self.checkpoint();
        self.parse_prefix_expr();

        while let Some((bp, node, width)) = self.infix_op() {
            if bp < min_bp {
                break;
            }
            for _ in 0..width {
                self.bump();
            }
            match node {
                SyntaxKind::IS_EXPR => self.parse_type_ref(),
                SyntaxKind::AS_EXPR => {
                    // `as?` is only safe-cast when `?` is glued to `as`
                    if self.pos < self.tokens.len()
                        && self.tokens[self.pos].kind == SyntaxKind::QUESTION
                    {
                        self.bump();
                    }
                    self.parse_type_ref();
                }
                // assignment is right-associative
                _ if bp == 1 => self.parse_expr_bp(1),
                _ => self.parse_expr_bp(bp + 1),
            }
            self.start_node_at(cp, node);
            self.finish_node();
        }
    }

    /// PrefixExpr = ('-' | '+' | '!' | '++' | '--') PrefixExpr | PostfixExpr
    fn parse_prefix_expr(&mut self) {
        if self.at_any(&[
            SyntaxKind::MINUS,
            SyntaxKind::PLUS,
            SyntaxKind::BANG,
            SyntaxKind::PLUS_PLUS,
            SyntaxKind::MINUS_MINUS,
        ]) {
            self.start_node(SyntaxKind::PREFIX_EXPR);
            self.bump();
            self.parse_prefix_expr();
            self.finish_node();
        } else {
            self.parse_postfix_expr();
        }
    }

    /// PostfixExpr = PrimaryExpr (CallSuffix | '.' Selector | '?.' Selector | '!!' | '++' | '--')*
    fn parse_postfix_expr(&mut self) {
        let cp = self.checkpoint();
        self.parse_primary_expr();

        loop {
            if self.at_call_suffix() {
                self.parse_call_suffix();
                self.start_node_at(cp, SyntaxKind::CALL_EXPR);
                self.finish_node();
            } else if self.at(SyntaxKind::DOT) || self.at(SyntaxKind::SAFE_DOT) {
                let kind = if self.at(SyntaxKind::DOT) {
                    SyntaxKind::DOT_QUALIFIED_EXPR
                } else {
                    SyntaxKind::SAFE_QUALIFIED_EXPR
                };
                self.bump();
                self.parse_selector();
                self.start_node_at(cp, kind);
                self.finish_node();
            } else if self.at_any(&[
                SyntaxKind::BANG_BANG,
                SyntaxKind::PLUS_PLUS,
                SyntaxKind::MINUS_MINUS,
            ]) && !self.newline_before()
            {
                self.bump();
                self.start_node_at(cp, SyntaxKind::POSTFIX_EXPR);
                self.finish_node();
            } else {
                break;
            }
        }
    }

    /// Selector after `.`: a name, optionally called.
    fn parse_selector(&mut self) {
        let cp = self.checkpoint();
        match self.current_kind() {
            SyntaxKind::IDENT => {
                self.start_node(SyntaxKind::NAME_REF);
                self.bump();
                self.finish_node();
            }
            _ => {
                self.error("expected a member name");
                return;
            }
        }
        while self.at_call_suffix() {
            self.parse_call_suffix();
            self.start_node_at(cp, SyntaxKind::CALL_EXPR);
            self.finish_node();
        }
    }

    fn at_call_suffix(&self) -> bool {
        if self.at_eof() || self.newline_before() {
            return false;
        }
        match self.current_kind() {
            SyntaxKind::L_PAREN => true,
            SyntaxKind::L_BRACE => !self.no_trailing_lambda,
            SyntaxKind::LT => self.at_call_type_arguments(),
            _ => false,
        }
    }

    /// `foo<Int>(...)` vs `a < b`: only a balanced angle list followed by a
    /// call or lambda is read as explicit type arguments.
    fn at_call_type_arguments(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0;
        loop {
            match self.nth(n) {
                SyntaxKind::LT => depth += 1,
                SyntaxKind::GT => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.nth(n + 1), SyntaxKind::L_PAREN | SyntaxKind::L_BRACE);
                    }
                }
                SyntaxKind::IDENT
                | SyntaxKind::COMMA
                | SyntaxKind::DOT
                | SyntaxKind::QUESTION
                | SyntaxKind::STAR
                | SyntaxKind::IN_KW => {}
                _ => return false,
            }
            n += 1;
        }
    }

    /// CallSuffix = TypeArgumentList? ValueArgumentList? LambdaExpr?
    fn parse_call_suffix(&mut self) {
        if self.at(SyntaxKind::LT) {
            self.parse_type_argument_list();
        }
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_value_argument_list();
        }
        if self.at(SyntaxKind::L_BRACE) && !self.newline_before() && !self.no_trailing_lambda {
            self.parse_lambda();
        }
    }

    /// ValueArgumentList = '(' (ValueArgument (',' ValueArgument)*)? ')'
    fn parse_value_argument_list(&mut self) {
        let saved = std::mem::replace(&mut self.no_trailing_lambda, false);
        self.start_node(SyntaxKind::VALUE_ARGUMENT_LIST);
        self.expect(SyntaxKind::L_PAREN);
        while !self.at_eof() && !self.at(SyntaxKind::R_PAREN) {
            let pos_before = self.pos;
            self.start_node(SyntaxKind::VALUE_ARGUMENT);
            if self.at(SyntaxKind::IDENT) && self.nth(1) == SyntaxKind::EQ {
                self.bump();
                self.bump();
            }
            self.eat(SyntaxKind::STAR);
            self.parse_expr();
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
            if self.pos == pos_before {
                self.bump();
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
        self.no_trailing_lambda = saved;
    }

    fn parse_primary_expr(&mut self) {
        match self.current_kind() {
            _ if self.at_eof() => self.error("expected an expression"),
            k if k.is_literal() => {
                self.start_node(SyntaxKind::LITERAL);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::IDENT => {
                self.start_node(SyntaxKind::NAME_REF);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::THIS_KW => {
                self.start_node(SyntaxKind::THIS_EXPR);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::SUPER_KW => {
                self.start_node(SyntaxKind::SUPER_EXPR);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::L_PAREN => {
                self.start_node(SyntaxKind::PAREN_EXPR);
                self.bump();
                self.parse_expr();
                self.expect(SyntaxKind::R_PAREN);
                self.finish_node();
            }
            SyntaxKind::L_BRACE => self.parse_lambda(),
            SyntaxKind::IF_KW => self.parse_if_expr(),
            SyntaxKind::RETURN_KW => {
                self.start_node(SyntaxKind::RETURN_EXPR);
                self.bump();
                if !self.at_eof()
                    && !self.newline_before()
                    && !self.at_any(&[SyntaxKind::R_BRACE, SyntaxKind::SEMICOLON, SyntaxKind::R_PAREN])
                {
                    self.parse_expr();
                }
                self.finish_node();
            }
            SyntaxKind::FUN_KW => {
                let cp = self.checkpoint();
                self.parse_fun(cp);
            }
            SyntaxKind::OBJECT_KW => {
                self.start_node(SyntaxKind::OBJECT_LITERAL);
                let cp = self.checkpoint();
                self.parse_object_declaration(cp);
                self.finish_node();
            }
            _ => {
                self.error(format!("expected an expression, found {:?}", self.current_kind()));
                if !self.at_any(&[
                    SyntaxKind::R_BRACE,
                    SyntaxKind::R_PAREN,
                    SyntaxKind::SEMICOLON,
                    SyntaxKind::COMMA,
                ]) {
                    self.start_node(SyntaxKind::ERROR);
                    self.bump();
                    self.finish_node();
                }
            }
        }
    }

    /// IfExpr = 'if' '(' Expr ')' Branch ('else' Branch)?
    fn parse_if_expr(&mut self) {
        self.start_node(SyntaxKind::IF_EXPR);
        self.expect(SyntaxKind::IF_KW);
        self.expect(SyntaxKind::L_PAREN);
        self.parse_expr();
        self.expect(SyntaxKind::R_PAREN);
        self.parse_branch();
        if self.at(SyntaxKind::ELSE_KW) {
            self.bump();
            self.parse_branch();
        }
        self.finish_node();
    }

    fn parse_branch(&mut self) {
        if self.at(SyntaxKind::L_BRACE) {
            self.parse_block();
        } else {
            self.parse_expr();
        }
    }

    /// LambdaExpr = '{' (LambdaParameters '->')? Statement* '}'
    ///
    /// The statements are wrapped in a brace-less BLOCK.
    fn parse_lambda(&mut self) {
        self.start_node(SyntaxKind::LAMBDA_EXPR);
        self.expect(SyntaxKind::L_BRACE);
        if self.lambda_has_parameters() {
            self.start_node(SyntaxKind::VALUE_PARAMETER_LIST);
            while !self.at_eof() && !self.at(SyntaxKind::ARROW) {
                self.parse_value_parameter(false);
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            self.finish_node();
            self.expect(SyntaxKind::ARROW);
        }
        self.start_node(SyntaxKind::BLOCK);
        self.parse_statements();
        self.finish_node();
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    fn lambda_has_parameters(&self) -> bool {
        let mut n = 0;
        loop {
            match self.nth(n) {
                SyntaxKind::ARROW => return n > 0,
                SyntaxKind::IDENT
                | SyntaxKind::COMMA
                | SyntaxKind::COLON
                | SyntaxKind::DOT
                | SyntaxKind::LT
                | SyntaxKind::GT
                | SyntaxKind::QUESTION => {}
                _ => return false,
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxNode;

    fn kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.descendants().map(|n| n.kind()).collect()
    }

    #[test]
    fn test_parse_is_lossless() {
        let input = "package a.b\n\nimport c.D\n\nclass Foo<T>(val x: T) : Bar(), Baz {\n  fun f() = x\n}\n";
        let parse = parse(input);
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(parse.syntax().text().to_string(), input);
    }

    #[test]
    fn test_leading_trivia_stays_inside_root() {
        for input in ["\nclass A", "// header\nclass A", "/* doc */\n\npackage p\nclass A", "", "  \n"] {
            let parse = parse(input);
            assert!(parse.ok(), "{input:?}: {:?}", parse.errors);
            let root = parse.syntax();
            assert_eq!(root.kind(), SyntaxKind::SOURCE_FILE);
            assert_eq!(root.text().to_string(), input);
        }
    }

    #[test]
    fn test_leading_comment_before_package() {
        let parse = parse("// header\npackage p\n\nclass A");
        assert!(parse.ok(), "{:?}", parse.errors);
        let k = kinds(&parse.syntax());
        assert!(k.contains(&SyntaxKind::PACKAGE_DIRECTIVE));
        assert!(k.contains(&SyntaxKind::CLASS));
    }

    #[test]
    fn test_parse_class_members() {
        let parse = parse("class A {\n  val x: Int = 1\n  fun f(): Int { return x }\n  constructor(y: Int)\n  init { }\n}");
        assert!(parse.ok(), "{:?}", parse.errors);
        let k = kinds(&parse.syntax());
        assert!(k.contains(&SyntaxKind::PROPERTY));
        assert!(k.contains(&SyntaxKind::FUN));
        assert!(k.contains(&SyntaxKind::SECONDARY_CONSTRUCTOR));
        assert!(k.contains(&SyntaxKind::CLASS_INITIALIZER));
        assert!(k.contains(&SyntaxKind::RETURN_EXPR));
    }

    #[test]
    fn test_parse_enum_entries() {
        let parse = parse("enum class Color(val rgb: Int) { RED(1), GREEN(2), BLUE(3);\n fun f() = 1 }");
        assert!(parse.ok(), "{:?}", parse.errors);
        let entries = parse
            .syntax()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::ENUM_ENTRY)
            .count();
        assert_eq!(entries, 3);
    }

    #[test]
    fn test_parse_anonymous_function_expression() {
        let parse = parse("val f = fun(x: Int): Int { return x }");
        assert!(parse.ok(), "{:?}", parse.errors);
        let fun = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::FUN)
            .unwrap();
        assert!(
            !fun.children_with_tokens()
                .any(|e| e.kind() == SyntaxKind::IDENT)
        );
    }

    #[test]
    fn test_parse_extension_function_receiver() {
        let parse = parse("fun String?.shout(): String = this!!");
        assert!(parse.ok(), "{:?}", parse.errors);
        let k = kinds(&parse.syntax());
        assert!(k.contains(&SyntaxKind::RECEIVER_TYPE));
        assert!(k.contains(&SyntaxKind::NULLABLE_TYPE));
        assert!(k.contains(&SyntaxKind::POSTFIX_EXPR));
    }

    #[test]
    fn test_parse_qualified_receiver_stops_before_name() {
        let parse = parse("fun a.b.C.name() {}");
        assert!(parse.ok(), "{:?}", parse.errors);
        let fun = parse.syntax().first_child().unwrap();
        let name = fun
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::IDENT)
            .unwrap();
        assert_eq!(name.text(), "name");
    }

    #[test]
    fn test_parse_newline_ends_statement() {
        let parse = parse("fun f() {\n  val a = 1\n  -a\n  foo\n  (a)\n}");
        assert!(parse.ok(), "{:?}", parse.errors);
        let k = kinds(&parse.syntax());
        assert!(k.contains(&SyntaxKind::PREFIX_EXPR));
        assert!(!k.contains(&SyntaxKind::BINARY_EXPR));
        assert!(!k.contains(&SyntaxKind::CALL_EXPR));
    }

    #[test]
    fn test_parse_lambda_with_parameters() {
        let parse = parse("val g = list.map { a, b: Int -> a + b }");
        assert!(parse.ok(), "{:?}", parse.errors);
        let lambda = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::LAMBDA_EXPR)
            .unwrap();
        let params = lambda
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::VALUE_PARAMETER)
            .count();
        assert_eq!(params, 2);
    }

    #[test]
    fn test_parse_property_accessors() {
        let parse = parse("class A {\n  var x: Int = 0\n    get() = field\n    private set\n}");
        assert!(parse.ok(), "{:?}", parse.errors);
        let accessors = parse
            .syntax()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::PROPERTY_ACCESSOR)
            .count();
        assert_eq!(accessors, 2);
    }

    #[test]
    fn test_parse_is_and_smart_cast_shape() {
        let parse = parse("fun f(x: Any) { if (x is String && x !is Int) x.length else null }");
        assert!(parse.ok(), "{:?}", parse.errors);
        let k = kinds(&parse.syntax());
        assert_eq!(k.iter().filter(|k| **k == SyntaxKind::IS_EXPR).count(), 2);
        assert!(k.contains(&SyntaxKind::DOT_QUALIFIED_EXPR));
    }

    #[test]
    fn test_parse_function_types() {
        let parse = parse("val f: (Int, String) -> Unit = g\nval h: String.() -> Int = k\nval n: (() -> Unit)? = null");
        assert!(parse.ok(), "{:?}", parse.errors);
        let k = kinds(&parse.syntax());
        assert_eq!(k.iter().filter(|k| **k == SyntaxKind::FUNCTION_TYPE).count(), 3);
    }

    #[test]
    fn test_parse_recovers_from_garbage() {
        let parse = parse("class A { ) }\nfun ok() {}");
        assert!(!parse.ok());
        let k = kinds(&parse.syntax());
        assert!(k.contains(&SyntaxKind::ERROR));
        assert!(k.contains(&SyntaxKind::FUN));
    }
}
