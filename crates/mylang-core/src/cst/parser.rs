//! Hierarchical parser for mylang
//!
//! This module builds a structured CST from tokens with a hand-written
//! recursive descent parser. Expressions use precedence climbing; left
//! recursive rules (binary expressions, calls, slices, array types and
//! postfix `while`/`until` loops) are built by wrapping an already parsed
//! prefix through a Rowan checkpoint.
//!
//! Whitespace and comments are attached lazily: pending extras are flushed
//! into the tree right before the next token or node, so a node never starts
//! or ends with whitespace. Only the `source` root covers the whole input.
//!
//! The parser never fails. Unexpected tokens are wrapped in `ERROR` nodes,
//! missing punctuation is inserted as a zero-width token of the expected
//! kind, and every recovery is recorded as a [`SyntaxError`].

use rowan::Checkpoint;

use super::lexer::{CstSpan, LexerError};
use super::{CstBuilder, CstToken, MylangSyntaxKind, MylangSyntaxNode};
use crate::cst::MylangSyntaxKind as K;

/// Maximum nesting of statements and expressions before the parser gives up
pub const MAX_NESTING: usize = 256;

/// Maximum number of open left-nested wraps (operator, postfix loop and
/// array type chains) before the parser gives up
pub const MAX_CHAIN: usize = 4096;

/// A syntax error reported by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: CstSpan,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse mylang source into a hierarchical CST
///
/// # Example
///
/// ```rust
/// use mylang_core::cst::parse_mylang;
///
/// let source = "def main() x; end";
/// let (cst, lexer_errors, errors) = parse_mylang(source);
/// assert!(lexer_errors.is_empty() && errors.is_empty());
/// assert_eq!(cst.text().to_string(), source);
/// ```
pub fn parse_mylang(source: &str) -> (MylangSyntaxNode, Vec<LexerError>, Vec<SyntaxError>) {
    let (tokens, lexer_errors) = super::lex_with_trivia(source);
    let (cst, errors) = parse_tokens(&tokens);
    (cst, lexer_errors, errors)
}

/// Parse a token stream into a hierarchical CST
fn parse_tokens(tokens: &[CstToken]) -> (MylangSyntaxNode, Vec<SyntaxError>) {
    let mut parser = Parser::new(tokens);
    parser.parse_source();
    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Paren,
    Call,
    Slice,
}

impl Group {
    fn closes(self, kind: MylangSyntaxKind) -> bool {
        match self {
            Group::Paren | Group::Call => kind == K::RParen,
            Group::Slice => kind == K::RBracket,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Operand,
    OperandOrClose,
    Operator,
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    pos: usize,
    builder: CstBuilder,
    errors: Vec<SyntaxError>,
    depth: usize,
    chain: usize,
    nesting_exceeded: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: CstBuilder::new(),
            errors: Vec::new(),
            depth: 0,
            chain: 0,
            nesting_exceeded: false,
        }
    }

    fn finish(self) -> (MylangSyntaxNode, Vec<SyntaxError>) {
        (self.builder.finish(), self.errors)
    }

    /// Parse the whole input: `source: repeat(func_def)`
    fn parse_source(&mut self) {
        // Root starts before any extras so that it spans the full input
        self.builder.start_node(K::Source);

        while !self.at_end() {
            if self.at(K::DefKw) {
                self.parse_func_def();
            } else {
                self.error_and_recover("expected function definition");
            }
        }

        self.flush_extras();
        self.builder.finish_node(); // SOURCE
    }

    /// Grammar: def <func_signature> <statement>* end
    fn parse_func_def(&mut self) {
        self.start_node(K::FuncDef);
        self.expect(K::DefKw);
        self.parse_func_signature();
        self.parse_statements(false);
        self.expect(K::EndKw);
        self.finish_node(); // FUNC_DEF
    }

    /// Grammar: identifier ( [arg {, arg}] ) [of type_ref]
    fn parse_func_signature(&mut self) {
        self.start_node(K::FuncSignature);
        self.expect(K::Identifier);
        self.expect(K::LParen);
        if self.at(K::Identifier) {
            self.parse_arg();
            while self.at(K::Comma) {
                self.bump();
                self.parse_arg();
            }
        }
        self.expect(K::RParen);
        if self.at(K::OfKw) {
            self.bump();
            self.parse_type_ref();
        }
        self.finish_node();
    }

    fn parse_arg(&mut self) {
        self.start_node(K::Arg);
        self.expect(K::Identifier);
        if self.at(K::OfKw) {
            self.bump();
            self.parse_type_ref();
        }
        self.finish_node();
    }

    /// Grammar: builtin_type | custom_type | type_ref array [ dec ]
    fn parse_type_ref(&mut self) {
        let checkpoint = self.checkpoint();
        self.start_node(K::TypeRef);
        match self.current() {
            kind if kind.is_builtin_type() => {
                self.start_node(K::BuiltinType);
                self.bump();
                self.finish_node();
            }
            K::Identifier => {
                self.start_node(K::CustomType);
                self.bump();
                self.finish_node();
            }
            _ if self.at_recovery_point() => self.missing_node("expected type"),
            _ => self.error_and_recover("expected type"),
        }
        self.finish_node(); // TYPE_REF

        let mut wraps = 0;
        while self.at(K::ArrayKw) {
            if !self.enter_chain() {
                break;
            }
            wraps += 1;
            self.start_node_at(checkpoint, K::ArrayType);
            self.bump();
            self.expect(K::LBracket);
            self.expect(K::Dec);
            self.expect(K::RBracket);
            self.finish_node(); // ARRAY_TYPE
            self.start_node_at(checkpoint, K::TypeRef);
            self.finish_node(); // TYPE_REF
        }
        self.leave_chain(wraps);
    }

    /// Statements until `end`, `}` or end of input
    fn parse_statements(&mut self, allow_func_def: bool) {
        while !self.at_end() && !self.at_any(&[K::EndKw, K::RBrace]) {
            if self.at_statement_start() {
                self.parse_statement();
            } else if allow_func_def && self.at(K::DefKw) {
                self.parse_func_def();
            } else {
                self.error_and_recover("expected statement");
            }
        }
    }

    fn parse_statement(&mut self) {
        if !self.enter() {
            return;
        }

        let checkpoint = self.checkpoint();
        match self.current() {
            K::IfKw => self.parse_if(),
            K::WhileKw | K::UntilKw => self.parse_loop(),
            K::BreakKw => self.parse_break(),
            K::BeginKw | K::LBrace => self.parse_block(),
            _ => self.parse_expr_stmt(),
        }

        // Postfix loop: <statement> while|until <expr> ;
        let mut wraps = 0;
        while self.at_repeat_suffix() {
            if !self.enter_chain() {
                break;
            }
            wraps += 1;
            self.start_node_at(checkpoint, K::RepeatStmt);
            self.bump();
            self.parse_expr();
            self.expect(K::Semicolon);
            self.finish_node(); // REPEAT_STMT
        }

        self.leave_chain(wraps);
        self.leave();
    }

    /// Statement position that must hold exactly one statement
    fn parse_branch(&mut self) {
        if self.at_statement_start() {
            self.parse_statement();
        } else if self.at_recovery_point() {
            self.missing_node("expected statement");
        } else {
            self.error_and_recover("expected statement");
        }
    }

    /// Grammar: if <expr> then <statement> [else <statement>]
    ///
    /// A dangling `else` binds to the innermost `if`.
    fn parse_if(&mut self) {
        self.start_node(K::IfStmt);
        self.bump();
        self.parse_expr();
        self.expect(K::ThenKw);
        self.parse_branch();
        if self.at(K::ElseKw) {
            self.bump();
            self.parse_branch();
        }
        self.finish_node();
    }

    /// Grammar: while|until <expr> <statement>* end
    fn parse_loop(&mut self) {
        self.start_node(K::LoopStmt);
        self.bump();
        self.parse_expr();
        self.parse_statements(false);
        self.expect(K::EndKw);
        self.finish_node();
    }

    fn parse_break(&mut self) {
        self.start_node(K::BreakStmt);
        self.bump();
        self.expect(K::Semicolon);
        self.finish_node();
    }

    /// Grammar: begin|{ (<statement>|<func_def>)* end|}
    ///
    /// Openers and closers may be mixed freely.
    fn parse_block(&mut self) {
        self.start_node(K::BlockStmt);
        self.bump();
        self.parse_statements(true);
        if self.at_any(&[K::EndKw, K::RBrace]) {
            self.bump();
        } else {
            self.expect(K::EndKw);
        }
        self.finish_node();
    }

    fn parse_expr_stmt(&mut self) {
        self.start_node(K::ExprStmt);
        self.parse_expr();
        self.expect(K::Semicolon);
        self.finish_node();
    }

    fn parse_expr(&mut self) {
        self.parse_expr_bp(0);
    }

    /// Precedence climbing over left-associative binary operators
    fn parse_expr_bp(&mut self, min_prec: u8) {
        if !self.enter() {
            return;
        }

        let checkpoint = self.checkpoint();
        self.parse_unary();
        let mut wraps = 0;
        while let Some(prec) = self.current().binary_precedence() {
            if prec <= min_prec || !self.enter_chain() {
                break;
            }
            wraps += 1;
            self.start_node_at(checkpoint, K::BinaryExpr);
            self.bump_as(K::BinOp);
            self.parse_expr_bp(prec);
            self.finish_node(); // BINARY_EXPR
        }

        self.leave_chain(wraps);
        self.leave();
    }

    fn parse_unary(&mut self) {
        if !self.current().is_unary_operator() {
            self.parse_postfix();
            return;
        }
        if !self.enter() {
            return;
        }

        self.start_node(K::UnaryExpr);
        self.bump_as(K::UnOp);
        self.parse_unary();
        self.finish_node();

        self.leave();
    }

    /// Calls and slices bind tighter than any prefix or infix operator
    fn parse_postfix(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_primary();
        let mut wraps = 0;
        loop {
            let opener = self.current();
            if !matches!(opener, K::LParen | K::LBracket) || !self.enter_chain() {
                break;
            }
            wraps += 1;

            if opener == K::LParen {
                self.start_node_at(checkpoint, K::CallExpr);
                self.bump();
                if !self.at(K::RParen) {
                    self.parse_expr();
                    while self.at(K::Comma) {
                        self.bump();
                        self.parse_expr();
                    }
                }
                self.expect(K::RParen);
                self.finish_node(); // CALL_EXPR
            } else {
                self.start_node_at(checkpoint, K::SliceExpr);
                self.bump();
                if !self.at(K::RBracket) {
                    self.parse_range();
                    while self.at(K::Comma) {
                        self.bump();
                        self.parse_range();
                    }
                }
                self.expect(K::RBracket);
                self.finish_node(); // SLICE_EXPR
            }
        }
        self.leave_chain(wraps);
    }

    /// Grammar: <expr> [.. <expr>]
    fn parse_range(&mut self) {
        self.start_node(K::Range);
        self.parse_expr();
        if self.at(K::DotDot) {
            self.bump();
            self.parse_expr();
        }
        self.finish_node();
    }

    fn parse_primary(&mut self) {
        match self.current() {
            K::LParen => {
                self.start_node(K::PrimaryExpr);
                self.start_node(K::ParenthesizedExpr);
                self.bump();
                self.parse_expr();
                self.expect(K::RParen);
                self.finish_node(); // PARENTHESIZED_EXPR
                self.finish_node(); // PRIMARY_EXPR
            }
            K::Identifier => {
                self.start_node(K::PrimaryExpr);
                self.bump();
                self.finish_node();
            }
            kind if kind.is_literal_token() => {
                self.start_node(K::PrimaryExpr);
                self.start_node(K::Literal);
                self.bump();
                self.finish_node(); // LITERAL
                self.finish_node(); // PRIMARY_EXPR
            }
            _ if self.at_recovery_point() => self.missing_node("expected expression"),
            _ => self.error_and_recover("expected expression"),
        }
    }

    // ------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------

    /// Token index of the n-th significant (non-extra) token ahead
    fn nth_index(&self, n: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(self.pos)
            .filter(|(_, token)| !token.kind.is_extra())
            .nth(n)
            .map(|(index, _)| index)
    }

    fn current(&self) -> MylangSyntaxKind {
        self.nth_index(0)
            .map_or(K::Eof, |index| self.tokens[index].kind)
    }

    fn at(&self, kind: MylangSyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_any(&self, kinds: &[MylangSyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    fn at_end(&self) -> bool {
        self.at(K::Eof)
    }

    fn at_expr_start(&self) -> bool {
        let kind = self.current();
        kind.is_unary_operator()
            || kind.is_literal_token()
            || matches!(kind, K::LParen | K::Identifier)
    }

    fn at_statement_start(&self) -> bool {
        self.at_any(&[
            K::IfKw,
            K::WhileKw,
            K::UntilKw,
            K::BreakKw,
            K::BeginKw,
            K::LBrace,
        ]) || self.at_expr_start()
    }

    /// Tokens that close an enclosing construct; never swallowed by recovery
    fn at_recovery_point(&self) -> bool {
        self.at_any(&[
            K::Eof,
            K::Semicolon,
            K::Comma,
            K::RParen,
            K::RBracket,
            K::RBrace,
            K::DotDot,
            K::EndKw,
            K::ThenKw,
            K::ElseKw,
            K::DefKw,
        ])
    }

    /// `while`/`until` followed by exactly one expression and `;`
    ///
    /// Distinguishes a postfix loop from a `loop_stmt` that starts the next
    /// statement.
    fn at_repeat_suffix(&self) -> bool {
        if !self.at_any(&[K::WhileKw, K::UntilKw]) {
            return false;
        }
        self.nth_index(0)
            .and_then(|keyword| self.expression_end(keyword + 1))
            .and_then(|end| self.tokens.get(end))
            .is_some_and(|token| token.kind == K::Semicolon)
    }

    /// Index of the first token after the expression starting at `from`
    ///
    /// Iterative recognizer over the token stream; builds nothing.
    fn expression_end(&self, from: usize) -> Option<usize> {
        let mut groups: Vec<Group> = Vec::new();
        let mut expect = Expect::Operand;
        let mut index = from;

        loop {
            while self
                .tokens
                .get(index)
                .is_some_and(|token| token.kind.is_extra())
            {
                index += 1;
            }
            if groups.len() > MAX_NESTING {
                return None;
            }
            let kind = self.tokens.get(index).map_or(K::Eof, |token| token.kind);

            match expect {
                Expect::Operand | Expect::OperandOrClose => {
                    if expect == Expect::OperandOrClose
                        && groups.last().is_some_and(|group| group.closes(kind))
                    {
                        groups.pop();
                        expect = Expect::Operator;
                    } else if kind.is_unary_operator() {
                        expect = Expect::Operand;
                    } else if kind == K::Identifier || kind.is_literal_token() {
                        expect = Expect::Operator;
                    } else if kind == K::LParen {
                        groups.push(Group::Paren);
                        expect = Expect::Operand;
                    } else {
                        return None;
                    }
                }
                Expect::Operator => {
                    if kind.binary_precedence().is_some() {
                        expect = Expect::Operand;
                    } else if kind == K::LParen {
                        groups.push(Group::Call);
                        expect = Expect::OperandOrClose;
                    } else if kind == K::LBracket {
                        groups.push(Group::Slice);
                        expect = Expect::OperandOrClose;
                    } else if let Some(&group) = groups.last() {
                        if group.closes(kind) {
                            groups.pop();
                        } else if (kind == K::Comma && group != Group::Paren)
                            || (kind == K::DotDot && group == Group::Slice)
                        {
                            expect = Expect::Operand;
                        } else {
                            return None;
                        }
                    } else {
                        return Some(index);
                    }
                }
            }
            index += 1;
        }
    }

    // ------------------------------------------------------------------
    // Tree building
    // ------------------------------------------------------------------

    /// Emit pending whitespace and comments into the currently open node
    fn flush_extras(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_extra() {
                break;
            }
            self.builder.token(token.kind, &token.text);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        let kind = self.current();
        self.bump_as(kind);
    }

    /// Consume the current token, re-labelling it as `kind`
    fn bump_as(&mut self, kind: MylangSyntaxKind) {
        self.flush_extras();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(kind, &token.text);
            self.pos += 1;
        }
    }

    fn start_node(&mut self, kind: MylangSyntaxKind) {
        self.flush_extras();
        self.builder.start_node(kind);
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: MylangSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind);
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_extras();
        self.builder.checkpoint()
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // ------------------------------------------------------------------
    // Errors and recovery
    // ------------------------------------------------------------------

    fn current_span(&self) -> CstSpan {
        match self.nth_index(0) {
            Some(index) => self.tokens[index].span.clone(),
            None => {
                let end = self.tokens.last().map_or(0, |token| token.span.end);
                end..end
            }
        }
    }

    fn describe_current(&self) -> String {
        match self.nth_index(0) {
            Some(index) => format!("'{}'", self.tokens[index].text),
            None => "end of input".to_string(),
        }
    }

    fn error(&mut self, message: String, span: CstSpan) {
        self.errors.push(SyntaxError::new(message, span));
    }

    /// Consume `kind`, or insert it as a zero-width token
    fn expect(&mut self, kind: MylangSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            return true;
        }

        let message = format!(
            "expected '{}', found {}",
            kind.as_str(),
            self.describe_current()
        );
        let span = self.current_span();
        self.error(message, span);
        // Missing tokens sit right after the previous token, before extras
        self.builder.token(kind, "");
        false
    }

    /// Record an error and leave an empty `ERROR` node in place
    fn missing_node(&mut self, message: &str) {
        let message = format!("{message}, found {}", self.describe_current());
        let span = self.current_span();
        self.error(message, span);
        self.builder.start_node(K::Error);
        self.builder.finish_node();
    }

    /// Wrap the current token in an `ERROR` node and move past it
    fn error_and_recover(&mut self, message: &str) {
        if self.at_end() {
            return;
        }
        // Lexer errors are already reported and are ERROR leaves themselves
        if self.at(K::Error) {
            self.bump();
            return;
        }

        let message = format!("{message}, found {}", self.describe_current());
        let span = self.current_span();
        self.error(message, span);
        self.start_node(K::Error);
        self.bump();
        self.finish_node();
    }

    /// Track recursion; past [`MAX_NESTING`] the rest of the input becomes
    /// one `ERROR` node so that every caller unwinds at end of input.
    fn enter(&mut self) -> bool {
        if self.depth < MAX_NESTING {
            self.depth += 1;
            return true;
        }
        self.give_up(format!("nesting exceeds {MAX_NESTING} levels"));
        false
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Track one checkpoint wrap; past [`MAX_CHAIN`] the rest of the input
    /// becomes one `ERROR` node, like [`Self::enter`].
    fn enter_chain(&mut self) -> bool {
        if self.chain < MAX_CHAIN {
            self.chain += 1;
            return true;
        }
        self.give_up(format!("nesting exceeds {MAX_CHAIN} chained operators"));
        false
    }

    fn leave_chain(&mut self, wraps: usize) {
        self.chain -= wraps;
    }

    fn give_up(&mut self, message: String) {
        if !self.nesting_exceeded {
            self.nesting_exceeded = true;
            let span = self.current_span();
            self.error(message, span);
        }
        if !self.at_end() {
            self.start_node(K::Error);
            while !self.at_end() {
                self.bump();
            }
            self.finish_node();
        }
    }
}
