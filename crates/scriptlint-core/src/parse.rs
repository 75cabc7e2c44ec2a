//! Recursive-descent JavaScript parser.
//!
//! The parser does not build a full syntax tree. Statements are visited as soon as they are
//! parsed; expressions are parsed into a small [`Expression`] tree first so that assignment
//! targets, destructuring patterns and arrow function parameters can be told apart from reads.
//!
//! Syntax errors are reported and parsing continues: every statement consumes at least one token,
//! so any input terminates.

use crate::diag_reporter::{DiagReporter, NullDiagReporter};
use crate::diag_types::{
    Diag, DiagExpectedToken, DiagInvalidExpressionLeftOfAssignment,
    DiagMissingInitializerInConstDeclaration, DiagMissingNameInStatement, DiagUnclosedTemplate,
    DiagUnexpectedToken, DiagUnmatchedBracket,
};
use crate::expression::{Expression, ObjectEntry};
use crate::language::{StatementKind, VariableKind};
use crate::lex::{Keyword, Lexer, Punct, Token, TokenKind};
use crate::padded_string::PaddedStringView;
use crate::parse_visitor::{BufferingVisitor, ParseVisitor};
use crate::span::SourceCodeSpan;
use std::mem;

/// Parse `input` as a module.
///
/// Syntax errors go to `reporter`. Declarations, uses and scopes go to `visitor`, followed by
/// [`ParseVisitor::visit_end_of_module`].
pub fn parse_and_visit_module<'code>(
    input: PaddedStringView<'code>,
    reporter: &mut dyn DiagReporter<'code>,
    visitor: &mut impl ParseVisitor<'code>,
) {
    let mut parser = Parser::new(input, reporter);
    parser.parse_module();
    parser.visits.visit_end_of_module();
    parser.visits.copy_into(visitor);
}

enum PropertyKey<'code> {
    /// A plain identifier; may be a shorthand property.
    Identifier(SourceCodeSpan<'code>),
    /// A keyword, string, number or private name.
    Literal,
    /// `[expression]`.
    Computed(Expression<'code>),
}

const CLASS_MEMBER_MODIFIERS: &[&[u8]] = &[b"static", b"async", b"get", b"set"];
const OBJECT_PROPERTY_MODIFIERS: &[&[u8]] = &[b"async", b"get", b"set"];

/// Parser state for one module.
struct Parser<'code, 'r> {
    lexer: Lexer<'code>,
    reporter: &'r mut dyn DiagReporter<'code>,
    visits: BufferingVisitor<'code>,
    /// Whether `in` is a binary operator here (it is not in a `for` head's initializer).
    allow_in: bool,
    /// Offset of the last token reported as unexpected, so recovery does not report it twice.
    last_unexpected_token: Option<usize>,
}

impl<'code, 'r> Parser<'code, 'r> {
    fn new(input: PaddedStringView<'code>, reporter: &'r mut dyn DiagReporter<'code>) -> Self {
        let lexer = Lexer::new(input, &mut *reporter);
        Self {
            lexer,
            reporter,
            visits: BufferingVisitor::new(),
            allow_in: true,
            last_unexpected_token: None,
        }
    }

    fn parse_module(&mut self) {
        while self.peek().kind != TokenKind::EndOfFile {
            if self.is(Punct::RightBrace) {
                self.report_unexpected_token();
                self.skip();
                continue;
            }
            self.parse_statement_with_progress();
        }
    }

    // Token helpers.

    fn peek(&self) -> Token {
        self.lexer.peek()
    }

    /// The token after the current one, lexed without reporting.
    fn peek_next(&self) -> Token {
        let mut lookahead = self.lexer.clone();
        lookahead.skip(&mut NullDiagReporter);
        lookahead.peek()
    }

    fn skip(&mut self) {
        self.lexer.skip(&mut *self.reporter);
    }

    fn report(&mut self, diag: impl Into<Diag<'code>>) {
        self.reporter.report(diag.into());
    }

    fn is(&self, punct: Punct) -> bool {
        self.peek().kind == TokenKind::Punct(punct)
    }

    fn is_keyword(&self, keyword: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(keyword)
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfFile
    }

    /// Whether the current token is the contextual word `word`.
    fn is_word(&self, word: &[u8]) -> bool {
        self.peek().kind == TokenKind::Identifier && self.lexer.token_text() == word
    }

    fn eat(&mut self, punct: Punct) -> bool {
        let matched = self.is(punct);
        if matched {
            self.skip();
        }
        matched
    }

    /// Span from `begin` to the end of the last consumed token.
    fn span_from(&self, begin: usize) -> SourceCodeSpan<'code> {
        let end = self.lexer.end_of_previous_token().max(begin);
        self.lexer.span(begin, end)
    }

    fn empty_span_after_previous_token(&self) -> SourceCodeSpan<'code> {
        let end = self.lexer.end_of_previous_token();
        self.lexer.span(end, end)
    }

    fn expect(&mut self, punct: Punct, text: &'static [u8]) -> bool {
        if self.eat(punct) {
            return true;
        }
        self.report_expected(text);
        false
    }

    fn report_expected(&mut self, text: &'static [u8]) {
        let where_ = self.empty_span_after_previous_token();
        self.report(DiagExpectedToken {
            where_,
            expected: text,
        });
    }

    /// Consume the closing bracket matching `opening`.
    fn expect_closing(
        &mut self,
        opening: SourceCodeSpan<'code>,
        bracket: u8,
        closing: Punct,
        text: &'static [u8],
    ) {
        if self.eat(closing) {
            return;
        }
        if self.is_at_end() {
            self.report(DiagUnmatchedBracket { opening, bracket });
        } else {
            self.report_expected(text);
        }
    }

    fn report_unexpected_token(&mut self) {
        let begin = self.peek().begin;
        if self.last_unexpected_token == Some(begin) {
            return;
        }
        self.last_unexpected_token = Some(begin);
        let token = self.lexer.token_span();
        self.report(DiagUnexpectedToken { token });
    }

    /// Report the current token and skip it unless an enclosing construct can resume there.
    fn recover_from_unexpected_token(&mut self) -> Expression<'code> {
        let token = self.peek();
        let span = self.lexer.token_span();
        self.report_unexpected_token();
        let is_resume_point = matches!(
            token.kind,
            TokenKind::EndOfFile
                | TokenKind::Punct(
                    Punct::RightParen
                        | Punct::RightSquare
                        | Punct::RightBrace
                        | Punct::Semicolon
                        | Punct::Comma
                        | Punct::Colon
                        | Punct::Equal
                        | Punct::Arrow
                )
        );
        if !is_resume_point {
            self.skip();
        }
        Expression::Missing(span)
    }

    fn consume_semicolon(&mut self) {
        let token = self.peek();
        match token.kind {
            TokenKind::Punct(Punct::Semicolon) => self.skip(),
            TokenKind::Punct(Punct::RightBrace) | TokenKind::EndOfFile => {}
            _ if token.has_leading_newline => {}
            TokenKind::Punct(Punct::RightParen | Punct::RightSquare) => {
                self.report_unexpected_token();
                self.skip();
            }
            _ => self.report_unexpected_token(),
        }
    }

    /// Whether the current token can start an operand on the same line.
    fn starts_operand(&self) -> bool {
        let token = self.peek();
        !token.has_leading_newline
            && !matches!(
                token.kind,
                TokenKind::EndOfFile
                    | TokenKind::Punct(
                        Punct::RightParen
                            | Punct::RightSquare
                            | Punct::RightBrace
                            | Punct::Semicolon
                            | Punct::Comma
                            | Punct::Colon
                    )
            )
    }

    fn with_allow_in<T>(&mut self, allow_in: bool, parse: impl FnOnce(&mut Self) -> T) -> T {
        let saved = mem::replace(&mut self.allow_in, allow_in);
        let result = parse(self);
        self.allow_in = saved;
        result
    }

    /// Run `parse` with an empty visit buffer and return what it recorded.
    fn capture_visits(&mut self, parse: impl FnOnce(&mut Self)) -> BufferingVisitor<'code> {
        let outer = mem::take(&mut self.visits);
        parse(self);
        mem::replace(&mut self.visits, outer)
    }

    // Statements.

    fn parse_statement_with_progress(&mut self) {
        let begin = self.peek().begin;
        self.parse_statement();
        let token = self.peek();
        if token.begin == begin && token.kind != TokenKind::EndOfFile {
            self.report_unexpected_token();
            self.skip();
        }
    }

    fn parse_statements_until_right_brace(&mut self) {
        while !self.is(Punct::RightBrace) && !self.is_at_end() {
            self.parse_statement_with_progress();
        }
    }

    fn parse_statement(&mut self) {
        let token = self.peek();
        match token.kind {
            TokenKind::Punct(Punct::Semicolon) => self.skip(),
            TokenKind::Punct(Punct::LeftBrace) => self.parse_block_statement(),
            TokenKind::Keyword(Keyword::Var) => self.parse_variable_declaration(VariableKind::Var),
            TokenKind::Keyword(Keyword::Let) => self.parse_variable_declaration(VariableKind::Let),
            TokenKind::Keyword(Keyword::Const) => {
                self.parse_variable_declaration(VariableKind::Const)
            }
            TokenKind::Keyword(Keyword::Function) => self.parse_function_declaration(true),
            TokenKind::Keyword(Keyword::Class) => self.parse_class(true, true),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => {
                self.skip();
                self.parse_parenthesized_expression();
                self.parse_statement();
            }
            TokenKind::Keyword(Keyword::With) => {
                self.skip();
                self.parse_parenthesized_expression();
                self.parse_statement();
            }
            TokenKind::Keyword(Keyword::Do) => self.parse_do_while(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch(),
            TokenKind::Keyword(Keyword::Try) => self.parse_try(),
            TokenKind::Keyword(Keyword::Return) => {
                self.skip();
                if self.starts_operand() {
                    let value = self.parse_expression();
                    self.visit_expression(value);
                }
                self.consume_semicolon();
            }
            TokenKind::Keyword(Keyword::Throw) => {
                self.skip();
                let value = self.parse_expression();
                self.visit_expression(value);
                self.consume_semicolon();
            }
            TokenKind::Keyword(Keyword::Break | Keyword::Continue) => {
                self.skip();
                let label = self.peek();
                if label.kind == TokenKind::Identifier && !label.has_leading_newline {
                    self.skip();
                }
                self.consume_semicolon();
            }
            TokenKind::Keyword(Keyword::Debugger) => {
                self.skip();
                self.consume_semicolon();
            }
            TokenKind::Keyword(Keyword::Import)
                if !matches!(
                    self.peek_next().kind,
                    TokenKind::Punct(Punct::LeftParen | Punct::Dot)
                ) =>
            {
                self.parse_import()
            }
            TokenKind::Keyword(Keyword::Export) => self.parse_export(),
            TokenKind::Identifier if self.is_async_function() => {
                self.skip();
                self.parse_function_declaration(true);
            }
            TokenKind::Identifier
                if self.peek_next().kind == TokenKind::Punct(Punct::Colon) =>
            {
                // Label.
                self.skip();
                self.skip();
                self.parse_statement();
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// Whether the current tokens are `async function`.
    fn is_async_function(&self) -> bool {
        if !self.is_word(b"async") {
            return false;
        }
        let next = self.peek_next();
        next.kind == TokenKind::Keyword(Keyword::Function) && !next.has_leading_newline
    }

    fn parse_expression_statement(&mut self) {
        let expression = self.parse_expression();
        self.visit_expression(expression);
        self.consume_semicolon();
    }

    fn parse_block_statement(&mut self) {
        self.visits.visit_enter_block_scope();
        self.parse_braced_body();
        self.visits.visit_exit_block_scope();
    }

    /// `{ statements }` without opening a scope.
    fn parse_braced_body(&mut self) {
        if !self.is(Punct::LeftBrace) {
            self.report_expected(b"{");
            return;
        }
        let opening = self.lexer.token_span();
        self.skip();
        self.with_allow_in(true, |p| p.parse_statements_until_right_brace());
        self.expect_closing(opening, b'{', Punct::RightBrace, b"}");
    }

    fn parse_parenthesized_expression(&mut self) {
        if self.is(Punct::LeftParen) {
            let opening = self.lexer.token_span();
            self.skip();
            let condition = self.with_allow_in(true, |p| p.parse_expression());
            self.visit_expression(condition);
            self.expect_closing(opening, b'(', Punct::RightParen, b")");
        } else {
            self.report_expected(b"(");
            let condition = self.parse_expression();
            self.visit_expression(condition);
            self.eat(Punct::RightParen);
        }
    }

    fn parse_variable_declaration(&mut self, kind: VariableKind) {
        self.skip();
        loop {
            let target = self.parse_binding_target();
            self.parse_variable_declarator_rest(target, kind);
            if !self.eat(Punct::Comma) {
                break;
            }
        }
        self.consume_semicolon();
    }

    /// The initializer (if any) of a declarator whose binding was already parsed.
    fn parse_variable_declarator_rest(&mut self, target: Expression<'code>, kind: VariableKind) {
        if self.eat(Punct::Equal) {
            let initializer = self.parse_assignment_expression();
            self.visit_expression(initializer);
        } else if kind == VariableKind::Const && !matches!(target, Expression::Missing(_)) {
            self.report(DiagMissingInitializerInConstDeclaration {
                variable_name: target.span(),
                variable_kind: kind,
            });
        }
        self.declare_pattern(target, kind);
    }

    fn parse_function_declaration(&mut self, name_required: bool) {
        let function_span = self.lexer.token_span();
        self.skip();
        self.eat(Punct::Star);
        if self.peek().kind == TokenKind::Identifier {
            let name = self.lexer.token_span();
            self.skip();
            self.visits
                .visit_variable_declaration(name, VariableKind::Function);
        } else if name_required {
            self.report(DiagMissingNameInStatement {
                where_: function_span,
                statement_kind: StatementKind::FunctionStatement,
            });
        }
        self.parse_function_params_and_body(None);
    }

    /// Parameters and body of a function. `inner_name` is declared inside the function, as for
    /// named function expressions.
    fn parse_function_params_and_body(&mut self, inner_name: Option<SourceCodeSpan<'code>>) {
        self.visits.visit_enter_function_scope();
        if let Some(name) = inner_name {
            self.visits
                .visit_variable_declaration(name, VariableKind::Function);
        }
        for parameter in self.parse_parameters() {
            self.declare_pattern(parameter, VariableKind::FunctionParameter);
        }
        self.parse_braced_body();
        self.visits.visit_exit_function_scope();
    }

    fn parse_parameters(&mut self) -> Vec<Expression<'code>> {
        if !self.is(Punct::LeftParen) {
            self.report_expected(b"(");
            return Vec::new();
        }
        let opening = self.lexer.token_span();
        self.skip();
        let mut parameters = Vec::new();
        self.with_allow_in(true, |p| {
            while !p.is(Punct::RightParen) && !p.is_at_end() {
                let begin = p.peek().begin;
                let parameter = if p.eat(Punct::DotDotDot) {
                    let child = p.parse_binding_target();
                    Expression::Spread {
                        span: p.span_from(begin),
                        child: Box::new(child),
                    }
                } else {
                    let target = p.parse_binding_target();
                    if p.eat(Punct::Equal) {
                        let value = p.parse_assignment_expression();
                        Expression::Assignment {
                            span: p.span_from(begin),
                            target: Box::new(target),
                            value: Box::new(value),
                            compound: false,
                        }
                    } else {
                        target
                    }
                };
                parameters.push(parameter);
                if !p.eat(Punct::Comma) {
                    break;
                }
            }
        });
        self.expect_closing(opening, b'(', Punct::RightParen, b")");
        parameters
    }

    /// `class Name extends Base { ... }`.
    ///
    /// A declaration binds its name in the enclosing scope; an expression binds it inside the
    /// class body only.
    fn parse_class(&mut self, is_declaration: bool, name_required: bool) {
        let class_span = self.lexer.token_span();
        self.skip();
        let name = if self.peek().kind == TokenKind::Identifier {
            let name = self.lexer.token_span();
            self.skip();
            Some(name)
        } else {
            None
        };
        if name.is_none() && name_required {
            self.report(DiagMissingNameInStatement {
                where_: class_span,
                statement_kind: StatementKind::ClassStatement,
            });
        }
        if self.is_keyword(Keyword::Extends) {
            self.skip();
            let heritage = self.parse_left_hand_side_expression();
            self.visit_expression(heritage);
        }
        if is_declaration && let Some(name) = name {
            self.visits
                .visit_variable_declaration(name, VariableKind::Class);
        }
        self.visits.visit_enter_block_scope();
        if !is_declaration && let Some(name) = name {
            self.visits
                .visit_variable_declaration(name, VariableKind::Class);
        }
        self.parse_class_body();
        self.visits.visit_exit_block_scope();
    }

    fn parse_class_body(&mut self) {
        if !self.is(Punct::LeftBrace) {
            self.report_expected(b"{");
            return;
        }
        let opening = self.lexer.token_span();
        self.skip();
        while !self.is(Punct::RightBrace) && !self.is_at_end() {
            let begin = self.peek().begin;
            self.parse_class_member();
            if self.peek().begin == begin && !self.is(Punct::RightBrace) && !self.is_at_end() {
                self.report_unexpected_token();
                self.skip();
            }
        }
        self.expect_closing(opening, b'{', Punct::RightBrace, b"}");
    }

    fn parse_class_member(&mut self) {
        if self.eat(Punct::Semicolon) {
            return;
        }
        if self.is_word(b"static") && self.peek_next().kind == TokenKind::Punct(Punct::LeftBrace)
        {
            self.skip();
            self.visits.visit_enter_function_scope();
            self.parse_braced_body();
            self.visits.visit_exit_function_scope();
            return;
        }
        while self.eat(Punct::Star) || self.skip_member_modifier(CLASS_MEMBER_MODIFIERS) {}
        let Some(key) = self.parse_property_key() else {
            return;
        };
        if let PropertyKey::Computed(key) = key {
            self.visit_expression(key);
        }
        match self.peek().kind {
            TokenKind::Punct(Punct::LeftParen) => self.parse_function_params_and_body(None),
            TokenKind::Punct(Punct::Equal) => {
                self.skip();
                self.visits.visit_enter_function_scope();
                let initializer = self.with_allow_in(true, |p| p.parse_assignment_expression());
                self.visit_expression(initializer);
                self.visits.visit_exit_function_scope();
                self.consume_semicolon();
            }
            _ => self.consume_semicolon(),
        }
    }

    /// Skip a modifier such as `get` if a property name follows it.
    fn skip_member_modifier(&mut self, modifiers: &[&[u8]]) -> bool {
        if self.peek().kind != TokenKind::Identifier {
            return false;
        }
        let text = self.lexer.token_text();
        if !modifiers.iter().any(|&modifier| modifier == text) {
            return false;
        }
        let next = self.peek_next();
        let is_modifier = !next.has_leading_newline
            && matches!(
                next.kind,
                TokenKind::Identifier
                    | TokenKind::PrivateIdentifier
                    | TokenKind::Keyword(_)
                    | TokenKind::String
                    | TokenKind::Number
                    | TokenKind::Punct(Punct::LeftSquare | Punct::Star)
            );
        if is_modifier {
            self.skip();
        }
        is_modifier
    }

    fn parse_property_key(&mut self) -> Option<PropertyKey<'code>> {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier => {
                let name = self.lexer.token_span();
                self.skip();
                Some(PropertyKey::Identifier(name))
            }
            TokenKind::Keyword(_)
            | TokenKind::String
            | TokenKind::Number
            | TokenKind::PrivateIdentifier => {
                self.skip();
                Some(PropertyKey::Literal)
            }
            TokenKind::Punct(Punct::LeftSquare) => {
                let opening = self.lexer.token_span();
                self.skip();
                let key = self.with_allow_in(true, |p| p.parse_assignment_expression());
                self.expect_closing(opening, b'[', Punct::RightSquare, b"]");
                Some(PropertyKey::Computed(key))
            }
            _ => {
                self.report_unexpected_token();
                None
            }
        }
    }

    fn parse_if(&mut self) {
        self.skip();
        self.parse_parenthesized_expression();
        self.parse_statement();
        if self.is_keyword(Keyword::Else) {
            self.skip();
            self.parse_statement();
        }
    }

    fn parse_do_while(&mut self) {
        self.skip();
        self.parse_statement();
        if self.is_keyword(Keyword::While) {
            self.skip();
            self.parse_parenthesized_expression();
            self.eat(Punct::Semicolon);
        } else {
            self.report_expected(b"while");
        }
    }

    fn parse_for(&mut self) {
        self.skip();
        if self.is_keyword(Keyword::Await) {
            self.skip();
        }
        if !self.is(Punct::LeftParen) {
            self.report_expected(b"(");
            self.parse_statement();
            return;
        }
        let opening = self.lexer.token_span();
        self.skip();
        self.visits.visit_enter_block_scope();
        self.parse_for_head(opening);
        self.parse_statement();
        self.visits.visit_exit_block_scope();
    }

    /// Everything between `for (` and the loop body, including `)`.
    fn parse_for_head(&mut self, opening: SourceCodeSpan<'code>) {
        let declaration_kind = match self.peek().kind {
            TokenKind::Keyword(Keyword::Var) => Some(VariableKind::Var),
            TokenKind::Keyword(Keyword::Let) => Some(VariableKind::Let),
            TokenKind::Keyword(Keyword::Const) => Some(VariableKind::Const),
            _ => None,
        };
        match declaration_kind {
            Some(kind) => {
                self.skip();
                let target = self.with_allow_in(false, |p| p.parse_binding_target());
                if self.is_for_each_keyword() {
                    let iterable = self.parse_for_each_iterable();
                    self.visit_expression(iterable);
                    self.declare_pattern(target, kind);
                    self.expect_closing(opening, b'(', Punct::RightParen, b")");
                    return;
                }
                self.with_allow_in(false, |p| {
                    p.parse_variable_declarator_rest(target, kind);
                    while p.eat(Punct::Comma) {
                        let target = p.parse_binding_target();
                        p.parse_variable_declarator_rest(target, kind);
                    }
                });
            }
            None if self.is(Punct::Semicolon) => {}
            None => {
                let initializer = self.with_allow_in(false, |p| p.parse_expression());
                if self.is_for_each_keyword() {
                    let iterable = self.parse_for_each_iterable();
                    self.visit_expression(iterable);
                    self.visit_assignment_target(initializer, false);
                    self.expect_closing(opening, b'(', Punct::RightParen, b")");
                    return;
                }
                self.visit_expression(initializer);
            }
        }
        self.expect(Punct::Semicolon, b";");
        if !self.is(Punct::Semicolon) {
            let condition = self.parse_expression();
            self.visit_expression(condition);
        }
        self.expect(Punct::Semicolon, b";");
        if !self.is(Punct::RightParen) {
            let update = self.parse_expression();
            self.visit_expression(update);
        }
        self.expect_closing(opening, b'(', Punct::RightParen, b")");
    }

    fn is_for_each_keyword(&self) -> bool {
        self.is_keyword(Keyword::In) || self.is_word(b"of")
    }

    /// Skip `in` or `of` and parse the expression after it.
    fn parse_for_each_iterable(&mut self) -> Expression<'code> {
        let is_of = self.is_word(b"of");
        self.skip();
        self.with_allow_in(true, |p| {
            if is_of {
                p.parse_assignment_expression()
            } else {
                p.parse_expression()
            }
        })
    }

    fn parse_switch(&mut self) {
        self.skip();
        self.parse_parenthesized_expression();
        if !self.is(Punct::LeftBrace) {
            self.report_expected(b"{");
            return;
        }
        let opening = self.lexer.token_span();
        self.skip();
        self.visits.visit_enter_block_scope();
        while !self.is(Punct::RightBrace) && !self.is_at_end() {
            if self.is_keyword(Keyword::Case) {
                self.skip();
                let value = self.parse_expression();
                self.visit_expression(value);
                self.expect(Punct::Colon, b":");
            } else if self.is_keyword(Keyword::Default) {
                self.skip();
                self.expect(Punct::Colon, b":");
            } else {
                self.parse_statement_with_progress();
            }
        }
        self.expect_closing(opening, b'{', Punct::RightBrace, b"}");
        self.visits.visit_exit_block_scope();
    }

    fn parse_try(&mut self) {
        self.skip();
        self.parse_block_statement();
        let mut has_handler = false;
        if self.is_keyword(Keyword::Catch) {
            has_handler = true;
            self.skip();
            self.visits.visit_enter_block_scope();
            if self.is(Punct::LeftParen) {
                let opening = self.lexer.token_span();
                self.skip();
                let target = self.parse_binding_target();
                self.declare_pattern(target, VariableKind::Catch);
                self.expect_closing(opening, b'(', Punct::RightParen, b")");
            }
            self.parse_braced_body();
            self.visits.visit_exit_block_scope();
        }
        if self.is_keyword(Keyword::Finally) {
            has_handler = true;
            self.skip();
            self.parse_block_statement();
        }
        if !has_handler {
            self.report_expected(b"catch");
        }
    }

    fn parse_import(&mut self) {
        self.skip();
        if self.peek().kind == TokenKind::String {
            self.skip();
            self.consume_semicolon();
            return;
        }
        if self.peek().kind == TokenKind::Identifier && !self.is_word(b"from") {
            let name = self.lexer.token_span();
            self.skip();
            self.visits
                .visit_variable_declaration(name, VariableKind::Import);
            self.eat(Punct::Comma);
        }
        if self.eat(Punct::Star) {
            if self.is_word(b"as") {
                self.skip();
            } else {
                self.report_expected(b"as");
            }
            if self.peek().kind == TokenKind::Identifier {
                let name = self.lexer.token_span();
                self.skip();
                self.visits
                    .visit_variable_declaration(name, VariableKind::Import);
            }
        } else if self.is(Punct::LeftBrace) {
            let opening = self.lexer.token_span();
            self.skip();
            while !self.is(Punct::RightBrace) && !self.is_at_end() {
                let imported = self.peek();
                let imported_span = self.lexer.token_span();
                if !matches!(
                    imported.kind,
                    TokenKind::Identifier | TokenKind::Keyword(_) | TokenKind::String
                ) {
                    self.report_unexpected_token();
                    break;
                }
                self.skip();
                if self.is_word(b"as") {
                    self.skip();
                    if self.peek().kind == TokenKind::Identifier {
                        let local = self.lexer.token_span();
                        self.skip();
                        self.visits
                            .visit_variable_declaration(local, VariableKind::Import);
                    } else {
                        self.report_unexpected_token();
                    }
                } else if imported.kind == TokenKind::Identifier {
                    self.visits
                        .visit_variable_declaration(imported_span, VariableKind::Import);
                }
                if !self.eat(Punct::Comma) {
                    break;
                }
            }
            self.expect_closing(opening, b'{', Punct::RightBrace, b"}");
        }
        self.parse_from_clause();
        self.consume_semicolon();
    }

    /// `from "module"`.
    fn parse_from_clause(&mut self) {
        if !self.is_word(b"from") {
            self.report_expected(b"from");
            return;
        }
        self.skip();
        if self.peek().kind == TokenKind::String {
            self.skip();
        } else {
            self.report_unexpected_token();
        }
    }

    fn parse_export(&mut self) {
        self.skip();
        match self.peek().kind {
            TokenKind::Keyword(Keyword::Default) => {
                self.skip();
                match self.peek().kind {
                    TokenKind::Keyword(Keyword::Function) => self.parse_function_declaration(false),
                    TokenKind::Keyword(Keyword::Class) => self.parse_class(true, false),
                    TokenKind::Identifier if self.is_async_function() => {
                        self.skip();
                        self.parse_function_declaration(false);
                    }
                    _ => {
                        let value = self.parse_assignment_expression();
                        self.visit_expression(value);
                        self.consume_semicolon();
                    }
                }
            }
            TokenKind::Punct(Punct::Star) => {
                self.skip();
                if self.is_word(b"as") {
                    self.skip();
                    self.skip();
                }
                self.parse_from_clause();
                self.consume_semicolon();
            }
            TokenKind::Punct(Punct::LeftBrace) => {
                let opening = self.lexer.token_span();
                self.skip();
                let mut locals = Vec::new();
                while !self.is(Punct::RightBrace) && !self.is_at_end() {
                    match self.peek().kind {
                        TokenKind::Identifier => locals.push(self.lexer.token_span()),
                        TokenKind::Keyword(_) | TokenKind::String => {}
                        _ => {
                            self.report_unexpected_token();
                            break;
                        }
                    }
                    self.skip();
                    if self.is_word(b"as") {
                        self.skip();
                        self.skip();
                    }
                    if !self.eat(Punct::Comma) {
                        break;
                    }
                }
                self.expect_closing(opening, b'{', Punct::RightBrace, b"}");
                if self.is_word(b"from") {
                    self.parse_from_clause();
                } else {
                    for local in locals {
                        self.visits.visit_variable_use(local);
                    }
                }
                self.consume_semicolon();
            }
            _ => self.parse_statement(),
        }
    }

    // Expressions.

    fn parse_expression(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        let first = self.parse_assignment_expression();
        if !self.is(Punct::Comma) {
            return first;
        }
        let mut children = vec![first];
        while self.eat(Punct::Comma) {
            children.push(self.parse_assignment_expression());
        }
        Expression::Sequence {
            span: self.span_from(begin),
            children,
        }
    }

    fn parse_assignment_expression(&mut self) -> Expression<'code> {
        let token = self.peek();
        let begin = token.begin;
        if token.kind == TokenKind::Keyword(Keyword::Yield) {
            self.skip();
            if !self.starts_operand() {
                return Expression::Literal(self.span_from(begin));
            }
            let child = self.parse_assignment_expression();
            return Expression::Unary {
                span: self.span_from(begin),
                child: Box::new(child),
            };
        }

        let left = self.parse_conditional_expression();
        match self.peek().kind {
            TokenKind::Punct(Punct::Arrow) => match left {
                Expression::Variable(_) => self.parse_arrow_function(begin, vec![left]),
                Expression::EmptyParen(_) => self.parse_arrow_function(begin, Vec::new()),
                Expression::Paren { child, .. } => {
                    let parameters = match *child {
                        Expression::Sequence { children, .. } => children,
                        parameter => vec![parameter],
                    };
                    self.parse_arrow_function(begin, parameters)
                }
                other => other,
            },
            TokenKind::Punct(punct @ (Punct::Equal | Punct::CompoundAssign)) => {
                self.skip();
                let value = self.parse_assignment_expression();
                Expression::Assignment {
                    span: self.span_from(begin),
                    target: Box::new(left),
                    value: Box::new(value),
                    compound: punct == Punct::CompoundAssign,
                }
            }
            _ => left,
        }
    }

    /// `=> body`, given the already-parsed parameters.
    fn parse_arrow_function(
        &mut self,
        begin: usize,
        parameters: Vec<Expression<'code>>,
    ) -> Expression<'code> {
        self.skip();
        let visits = self.capture_visits(|p| {
            p.visits.visit_enter_function_scope();
            for parameter in parameters {
                p.declare_pattern(parameter, VariableKind::ArrowParameter);
            }
            if p.is(Punct::LeftBrace) {
                p.parse_braced_body();
            } else {
                let body = p.parse_assignment_expression();
                p.visit_expression(body);
            }
            p.visits.visit_exit_function_scope();
        });
        Expression::Function {
            span: self.span_from(begin),
            visits,
        }
    }

    fn parse_conditional_expression(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        let condition = self.parse_binary_expression(0);
        if !self.eat(Punct::Question) {
            return condition;
        }
        let consequent = self.with_allow_in(true, |p| p.parse_assignment_expression());
        self.expect(Punct::Colon, b":");
        let alternate = self.parse_assignment_expression();
        Expression::Operators {
            span: self.span_from(begin),
            children: vec![condition, consequent, alternate],
        }
    }

    /// Precedence climbing over binary operators binding tighter than `min_precedence`.
    fn parse_binary_expression(&mut self, min_precedence: u8) -> Expression<'code> {
        let begin = self.peek().begin;
        let mut left = self.parse_unary_expression();
        while let Some((precedence, right_associative)) = self.binary_operator() {
            if precedence <= min_precedence {
                break;
            }
            self.skip();
            let right = self.parse_binary_expression(if right_associative {
                precedence - 1
            } else {
                precedence
            });
            left = Expression::Operators {
                span: self.span_from(begin),
                children: vec![left, right],
            };
        }
        left
    }

    /// Precedence and associativity of the current token as a binary operator.
    fn binary_operator(&self) -> Option<(u8, bool)> {
        let precedence = match self.peek().kind {
            TokenKind::Punct(Punct::QuestionQuestion | Punct::PipePipe) => 1,
            TokenKind::Punct(Punct::AmpAmp) => 2,
            TokenKind::Punct(Punct::Pipe) => 3,
            TokenKind::Punct(Punct::Caret) => 4,
            TokenKind::Punct(Punct::Amp) => 5,
            TokenKind::Punct(
                Punct::EqualEqual
                | Punct::EqualEqualEqual
                | Punct::BangEqual
                | Punct::BangEqualEqual,
            ) => 6,
            TokenKind::Punct(
                Punct::Less | Punct::LessEqual | Punct::Greater | Punct::GreaterEqual,
            )
            | TokenKind::Keyword(Keyword::Instanceof) => 7,
            TokenKind::Keyword(Keyword::In) if self.allow_in => 7,
            TokenKind::Punct(
                Punct::LessLess | Punct::GreaterGreater | Punct::GreaterGreaterGreater,
            ) => 8,
            TokenKind::Punct(Punct::Plus | Punct::Minus) => 9,
            TokenKind::Punct(Punct::Star | Punct::Slash | Punct::Percent) => 10,
            TokenKind::Punct(Punct::StarStar) => return Some((11, true)),
            _ => return None,
        };
        Some((precedence, false))
    }

    fn parse_unary_expression(&mut self) -> Expression<'code> {
        let token = self.peek();
        let begin = token.begin;
        match token.kind {
            TokenKind::Punct(Punct::Bang | Punct::Tilde | Punct::Plus | Punct::Minus)
            | TokenKind::Keyword(Keyword::Void | Keyword::Delete | Keyword::Await) => {
                self.skip();
                let child = self.parse_unary_expression();
                Expression::Unary {
                    span: self.span_from(begin),
                    child: Box::new(child),
                }
            }
            TokenKind::Keyword(Keyword::Typeof) => {
                self.skip();
                let child = self.parse_unary_expression();
                Expression::Typeof {
                    span: self.span_from(begin),
                    child: Box::new(child),
                }
            }
            TokenKind::Punct(Punct::PlusPlus | Punct::MinusMinus) => {
                self.skip();
                let child = self.parse_unary_expression();
                Expression::Update {
                    span: self.span_from(begin),
                    child: Box::new(child),
                }
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        let expression = self.parse_left_hand_side_expression();
        let token = self.peek();
        if matches!(
            token.kind,
            TokenKind::Punct(Punct::PlusPlus | Punct::MinusMinus)
        ) && !token.has_leading_newline
        {
            self.skip();
            return Expression::Update {
                span: self.span_from(begin),
                child: Box::new(expression),
            };
        }
        expression
    }

    fn parse_left_hand_side_expression(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        let primary = self.parse_primary_expression();
        self.parse_suffixes(primary, begin, true)
    }

    /// Member accesses, calls and tagged templates after `expression`.
    fn parse_suffixes(
        &mut self,
        mut expression: Expression<'code>,
        begin: usize,
        allow_call: bool,
    ) -> Expression<'code> {
        loop {
            match self.peek().kind {
                TokenKind::Punct(Punct::Dot) => {
                    self.skip();
                    self.parse_member_name();
                    expression = Expression::Member {
                        span: self.span_from(begin),
                        object: Box::new(expression),
                        property: None,
                    };
                }
                TokenKind::Punct(Punct::QuestionDot) => {
                    self.skip();
                    if self.is(Punct::LeftParen) || self.is(Punct::LeftSquare) {
                        continue;
                    }
                    self.parse_member_name();
                    expression = Expression::Member {
                        span: self.span_from(begin),
                        object: Box::new(expression),
                        property: None,
                    };
                }
                TokenKind::Punct(Punct::LeftSquare) => {
                    let opening = self.lexer.token_span();
                    self.skip();
                    let property = self.with_allow_in(true, |p| p.parse_expression());
                    self.expect_closing(opening, b'[', Punct::RightSquare, b"]");
                    expression = Expression::Member {
                        span: self.span_from(begin),
                        object: Box::new(expression),
                        property: Some(Box::new(property)),
                    };
                }
                TokenKind::Punct(Punct::LeftParen) if allow_call => {
                    let args = self.parse_arguments();
                    expression = Expression::Call {
                        span: self.span_from(begin),
                        callee: Box::new(expression),
                        args,
                    };
                }
                TokenKind::CompleteTemplate | TokenKind::IncompleteTemplate if allow_call => {
                    let template = self.parse_template();
                    expression = Expression::Call {
                        span: self.span_from(begin),
                        callee: Box::new(expression),
                        args: vec![template],
                    };
                }
                _ => return expression,
            }
        }
    }

    fn parse_member_name(&mut self) {
        match self.peek().kind {
            TokenKind::Identifier | TokenKind::Keyword(_) | TokenKind::PrivateIdentifier => {
                self.skip()
            }
            _ => self.report_unexpected_token(),
        }
    }

    /// `(a, ...b)`.
    fn parse_arguments(&mut self) -> Vec<Expression<'code>> {
        let opening = self.lexer.token_span();
        self.skip();
        let mut args = Vec::new();
        self.with_allow_in(true, |p| {
            while !p.is(Punct::RightParen) && !p.is_at_end() {
                args.push(p.parse_element());
                if !p.eat(Punct::Comma) {
                    break;
                }
            }
        });
        self.expect_closing(opening, b'(', Punct::RightParen, b")");
        args
    }

    /// An assignment expression, optionally spread with `...`.
    fn parse_element(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        if !self.eat(Punct::DotDotDot) {
            return self.parse_assignment_expression();
        }
        let child = self.parse_assignment_expression();
        Expression::Spread {
            span: self.span_from(begin),
            child: Box::new(child),
        }
    }

    fn parse_primary_expression(&mut self) -> Expression<'code> {
        let token = self.peek();
        let span = self.lexer.token_span();
        match token.kind {
            TokenKind::Identifier if self.lexer.token_text() == b"async" => {
                self.parse_async_expression()
            }
            TokenKind::Identifier | TokenKind::Keyword(Keyword::Let) => {
                self.skip();
                Expression::Variable(span)
            }
            TokenKind::Number
            | TokenKind::String
            | TokenKind::Regexp
            | TokenKind::PrivateIdentifier
            | TokenKind::Keyword(
                Keyword::This
                | Keyword::Super
                | Keyword::Null
                | Keyword::True
                | Keyword::False
                | Keyword::Import,
            ) => {
                self.skip();
                Expression::Literal(span)
            }
            TokenKind::Keyword(Keyword::Function) => self.parse_function_expression(token.begin),
            TokenKind::Keyword(Keyword::Class) => {
                let visits = self.capture_visits(|p| p.parse_class(false, false));
                Expression::Function {
                    span: self.span_from(token.begin),
                    visits,
                }
            }
            TokenKind::Keyword(Keyword::New) => self.parse_new_expression(),
            TokenKind::CompleteTemplate | TokenKind::IncompleteTemplate => self.parse_template(),
            TokenKind::Punct(Punct::Slash | Punct::CompoundAssign)
                if self.lexer.token_text().starts_with(b"/") =>
            {
                self.lexer.reparse_as_regexp();
                let span = self.lexer.token_span();
                self.skip();
                Expression::Literal(span)
            }
            TokenKind::Punct(Punct::LeftParen) => self.parse_paren_expression(),
            TokenKind::Punct(Punct::LeftSquare) => self.parse_array_literal(),
            TokenKind::Punct(Punct::LeftBrace) => self.parse_object_literal(),
            _ => self.recover_from_unexpected_token(),
        }
    }

    /// `async function`, `async x => ...`, `async (x) => ...`, or a variable named `async`.
    fn parse_async_expression(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        let async_span = self.lexer.token_span();
        let next = self.peek_next();
        self.skip();
        if next.has_leading_newline {
            return Expression::Variable(async_span);
        }
        match next.kind {
            TokenKind::Keyword(Keyword::Function) => self.parse_function_expression(begin),
            TokenKind::Identifier => {
                let parameter = Expression::Variable(self.lexer.token_span());
                self.skip();
                if self.is(Punct::Arrow) {
                    self.parse_arrow_function(begin, vec![parameter])
                } else {
                    self.report_expected(b"=>");
                    parameter
                }
            }
            TokenKind::Punct(Punct::LeftParen) => {
                let args = self.parse_arguments();
                if self.is(Punct::Arrow) {
                    self.parse_arrow_function(begin, args)
                } else {
                    Expression::Call {
                        span: self.span_from(begin),
                        callee: Box::new(Expression::Variable(async_span)),
                        args,
                    }
                }
            }
            _ => Expression::Variable(async_span),
        }
    }

    fn parse_function_expression(&mut self, begin: usize) -> Expression<'code> {
        self.skip();
        self.eat(Punct::Star);
        let name = if self.peek().kind == TokenKind::Identifier {
            let name = self.lexer.token_span();
            self.skip();
            Some(name)
        } else {
            None
        };
        let visits = self.capture_visits(|p| p.parse_function_params_and_body(name));
        Expression::Function {
            span: self.span_from(begin),
            visits,
        }
    }

    fn parse_new_expression(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        self.skip();
        if self.eat(Punct::Dot) {
            // new.target
            self.parse_member_name();
            return Expression::Literal(self.span_from(begin));
        }
        let callee_begin = self.peek().begin;
        let callee = self.parse_primary_expression();
        let callee = self.parse_suffixes(callee, callee_begin, false);
        let args = if self.is(Punct::LeftParen) {
            self.parse_arguments()
        } else {
            Vec::new()
        };
        Expression::Call {
            span: self.span_from(begin),
            callee: Box::new(callee),
            args,
        }
    }

    fn parse_template(&mut self) -> Expression<'code> {
        let token = self.peek();
        let begin = token.begin;
        self.skip();
        let mut substitutions = Vec::new();
        if token.kind == TokenKind::IncompleteTemplate {
            loop {
                let substitution = self.with_allow_in(true, |p| p.parse_expression());
                substitutions.push(substitution);
                match self.peek().kind {
                    TokenKind::Punct(Punct::RightBrace) => {
                        self.lexer.skip_in_template(begin, &mut *self.reporter);
                        let continuation = self.peek().kind;
                        self.skip();
                        if continuation == TokenKind::CompleteTemplate {
                            break;
                        }
                    }
                    TokenKind::EndOfFile => {
                        let end = self.lexer.input().len();
                        let incomplete_template = self.lexer.span(begin, end);
                        self.report(DiagUnclosedTemplate {
                            incomplete_template,
                        });
                        break;
                    }
                    _ => {
                        self.report_expected(b"}");
                        break;
                    }
                }
            }
        }
        Expression::Template {
            span: self.span_from(begin),
            substitutions,
        }
    }

    fn parse_paren_expression(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        let opening = self.lexer.token_span();
        self.skip();
        if self.is(Punct::RightParen) {
            self.skip();
            let span = self.span_from(begin);
            if !self.is(Punct::Arrow) {
                self.report(DiagUnexpectedToken { token: span });
            }
            return Expression::EmptyParen(span);
        }
        let inner_begin = self.peek().begin;
        let mut children = Vec::new();
        self.with_allow_in(true, |p| {
            loop {
                children.push(p.parse_element());
                // A trailing comma is allowed before `) =>`.
                if !p.eat(Punct::Comma) || p.is(Punct::RightParen) {
                    break;
                }
            }
        });
        let inner = self.span_from(inner_begin);
        self.expect_closing(opening, b'(', Punct::RightParen, b")");
        let child = if children.len() == 1 && !matches!(children[0], Expression::Spread { .. }) {
            children.remove(0)
        } else {
            Expression::Sequence {
                span: inner,
                children,
            }
        };
        Expression::Paren {
            span: self.span_from(begin),
            child: Box::new(child),
        }
    }

    fn parse_array_literal(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        let opening = self.lexer.token_span();
        self.skip();
        let mut elements = Vec::new();
        self.with_allow_in(true, |p| {
            while !p.is(Punct::RightSquare) && !p.is_at_end() {
                if p.eat(Punct::Comma) {
                    continue;
                }
                elements.push(p.parse_element());
                if !p.eat(Punct::Comma) {
                    break;
                }
            }
        });
        self.expect_closing(opening, b'[', Punct::RightSquare, b"]");
        Expression::Array {
            span: self.span_from(begin),
            elements,
        }
    }

    fn parse_object_literal(&mut self) -> Expression<'code> {
        let begin = self.peek().begin;
        let opening = self.lexer.token_span();
        self.skip();
        let mut entries = Vec::new();
        self.with_allow_in(true, |p| {
            while !p.is(Punct::RightBrace) && !p.is_at_end() {
                if p.is(Punct::DotDotDot) {
                    let value = p.parse_element();
                    entries.push(ObjectEntry { key: None, value });
                } else if let Some(entry) = p.parse_object_property() {
                    entries.push(entry);
                }
                if !p.eat(Punct::Comma) {
                    break;
                }
            }
        });
        self.expect_closing(opening, b'{', Punct::RightBrace, b"}");
        Expression::Object {
            span: self.span_from(begin),
            entries,
        }
    }

    fn parse_object_property(&mut self) -> Option<ObjectEntry<'code>> {
        while self.eat(Punct::Star) || self.skip_member_modifier(OBJECT_PROPERTY_MODIFIERS) {}
        let key_begin = self.peek().begin;
        let (key, shorthand) = match self.parse_property_key()? {
            PropertyKey::Identifier(name) => (None, Some(name)),
            PropertyKey::Literal => (None, None),
            PropertyKey::Computed(key) => (Some(key), None),
        };
        let value = match (self.peek().kind, shorthand) {
            (TokenKind::Punct(Punct::Colon), _) => {
                self.skip();
                self.parse_assignment_expression()
            }
            (TokenKind::Punct(Punct::LeftParen), _) => {
                let visits = self.capture_visits(|p| p.parse_function_params_and_body(None));
                Expression::Function {
                    span: self.span_from(key_begin),
                    visits,
                }
            }
            (TokenKind::Punct(Punct::Equal), Some(name)) => {
                // `{x = 1}`, only valid as a destructuring pattern.
                self.skip();
                let default = self.parse_assignment_expression();
                Expression::Assignment {
                    span: self.span_from(key_begin),
                    target: Box::new(Expression::Variable(name)),
                    value: Box::new(default),
                    compound: false,
                }
            }
            (_, Some(name)) => Expression::Variable(name),
            (_, None) => self.recover_from_unexpected_token(),
        };
        Some(ObjectEntry { key, value })
    }

    /// A name or destructuring pattern being declared.
    fn parse_binding_target(&mut self) -> Expression<'code> {
        match self.peek().kind {
            TokenKind::Identifier => {
                let name = self.lexer.token_span();
                self.skip();
                Expression::Variable(name)
            }
            TokenKind::Punct(Punct::LeftSquare) => self.parse_array_literal(),
            TokenKind::Punct(Punct::LeftBrace) => self.parse_object_literal(),
            _ => self.recover_from_unexpected_token(),
        }
    }

    // Visiting.

    fn visit_expression(&mut self, expression: Expression<'code>) {
        match expression {
            Expression::Variable(name) => self.visits.visit_variable_use(name),
            Expression::Literal(_) | Expression::Missing(_) | Expression::EmptyParen(_) => {}
            Expression::Array {
                elements: children,
                ..
            }
            | Expression::Sequence { children, .. }
            | Expression::Operators { children, .. }
            | Expression::Template {
                substitutions: children,
                ..
            } => {
                for child in children {
                    self.visit_expression(child);
                }
            }
            Expression::Object { entries, .. } => {
                for entry in entries {
                    if let Some(key) = entry.key {
                        self.visit_expression(key);
                    }
                    self.visit_expression(entry.value);
                }
            }
            Expression::Spread { child, .. }
            | Expression::Paren { child, .. }
            | Expression::Unary { child, .. } => self.visit_expression(*child),
            Expression::Typeof { child, .. } => match child.as_variable() {
                Some(name) => self.visits.visit_variable_typeof_use(name),
                None => self.visit_expression(*child),
            },
            Expression::Update { child, .. } => self.visit_assignment_target(*child, true),
            Expression::Assignment {
                target,
                value,
                compound,
                ..
            } => {
                self.visit_expression(*value);
                self.visit_assignment_target(*target, compound);
            }
            Expression::Call { callee, args, .. } => {
                self.visit_expression(*callee);
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            Expression::Member {
                object, property, ..
            } => {
                self.visit_expression(*object);
                if let Some(property) = property {
                    self.visit_expression(*property);
                }
            }
            Expression::Function { mut visits, .. } => self.visits.append(&mut visits),
        }
    }

    /// Visit the left-hand side of an assignment. Destructuring is only allowed for `=`.
    fn visit_assignment_target(&mut self, target: Expression<'code>, compound: bool) {
        match target {
            Expression::Variable(name) => self.visits.visit_variable_assignment(name),
            Expression::Paren { child, .. } => self.visit_assignment_target(*child, compound),
            member @ Expression::Member { .. } => self.visit_expression(member),
            Expression::Missing(_) => {}
            Expression::Array { elements, .. } if !compound => {
                for element in elements {
                    self.visit_pattern_element(element);
                }
            }
            Expression::Object { entries, .. } if !compound => {
                for entry in entries {
                    if let Some(key) = entry.key {
                        self.visit_expression(key);
                    }
                    self.visit_pattern_element(entry.value);
                }
            }
            other => {
                self.report(DiagInvalidExpressionLeftOfAssignment {
                    expression: other.span(),
                });
                self.visit_expression(other);
            }
        }
    }

    fn visit_pattern_element(&mut self, element: Expression<'code>) {
        match element {
            Expression::Spread { child, .. } => self.visit_assignment_target(*child, false),
            Expression::Assignment {
                target,
                value,
                compound: false,
                ..
            } => {
                self.visit_expression(*value);
                self.visit_assignment_target(*target, false);
            }
            other => self.visit_assignment_target(other, false),
        }
    }

    /// Declare every name bound by `pattern`. Default values are visited before their binding.
    fn declare_pattern(&mut self, pattern: Expression<'code>, kind: VariableKind) {
        match pattern {
            Expression::Variable(name) => self.visits.visit_variable_declaration(name, kind),
            Expression::Missing(_) => {}
            Expression::Array { elements, .. } => {
                for element in elements {
                    self.declare_pattern(element, kind);
                }
            }
            Expression::Object { entries, .. } => {
                for entry in entries {
                    if let Some(key) = entry.key {
                        self.visit_expression(key);
                    }
                    self.declare_pattern(entry.value, kind);
                }
            }
            Expression::Spread { child, .. } => self.declare_pattern(*child, kind),
            Expression::Assignment {
                target,
                value,
                compound: false,
                ..
            } => {
                self.visit_expression(*value);
                self.declare_pattern(*target, kind);
            }
            other => {
                self.report(DiagUnexpectedToken {
                    token: other.span(),
                });
                self.visit_expression(other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag_reporter::DiagList;
    use crate::diag_types::DiagType;
    use crate::padded_string::PaddedString;
    use crate::parse_visitor::VisitEvent;
    use pretty_assertions::assert_eq;

    fn describe(event: &VisitEvent<'_>) -> String {
        match event {
            VisitEvent::VariableDeclaration(name, kind) => {
                format!("declare {} {}", kind.as_str(), name.to_string_lossy())
            }
            VisitEvent::VariableUse(name) => format!("use {}", name.to_string_lossy()),
            VisitEvent::VariableAssignment(name) => format!("assign {}", name.to_string_lossy()),
            VisitEvent::VariableTypeofUse(name) => format!("typeof {}", name.to_string_lossy()),
            VisitEvent::EnterBlockScope => "{".to_owned(),
            VisitEvent::ExitBlockScope => "}".to_owned(),
            VisitEvent::EnterFunctionScope => "function {".to_owned(),
            VisitEvent::ExitFunctionScope => "function }".to_owned(),
            VisitEvent::EndOfModule => "end".to_owned(),
        }
    }

    fn parse(source: &str) -> (Vec<String>, Vec<DiagType>) {
        let input = PaddedString::from(source);
        let mut diags = DiagList::new();
        let mut visits = BufferingVisitor::new();
        parse_and_visit_module(input.view(), &mut diags, &mut visits);
        (
            visits.events().iter().map(describe).collect(),
            diags.iter().map(|diag| diag.diag_type()).collect(),
        )
    }

    fn visits_of(source: &str) -> Vec<String> {
        let (visits, diags) = parse(source);
        assert!(diags.is_empty(), "unexpected diagnostics for {source:?}: {diags:?}");
        visits
    }

    fn diags_of(source: &str) -> Vec<DiagType> {
        parse(source).1
    }

    #[test]
    fn initializer_is_visited_before_declaration() {
        assert_eq!(
            visits_of("let x = y;"),
            ["use y", "declare let x", "end"]
        );
    }

    #[test]
    fn function_declaration() {
        assert_eq!(
            visits_of("function f(a, b = a) { return a + c; }"),
            [
                "declare function f",
                "function {",
                "declare parameter a",
                "use a",
                "declare parameter b",
                "use a",
                "use c",
                "function }",
                "end",
            ]
        );
    }

    #[test]
    fn arrow_function_parameters() {
        assert_eq!(
            visits_of("const f = (x, {y}) => x + z;"),
            [
                "function {",
                "declare parameter x",
                "declare parameter y",
                "use x",
                "use z",
                "function }",
                "declare const f",
                "end",
            ]
        );
        assert_eq!(
            visits_of("g = async (a) => a;"),
            [
                "function {",
                "declare parameter a",
                "use a",
                "function }",
                "assign g",
                "end",
            ]
        );
    }

    #[test]
    fn assignments_and_typeof() {
        assert_eq!(
            visits_of("typeof a; b = 1; c += 2; d++;"),
            ["typeof a", "assign b", "assign c", "assign d", "end"]
        );
        assert_eq!(
            visits_of("[a, ...b] = c;"),
            ["use c", "assign a", "assign b", "end"]
        );
        assert_eq!(
            visits_of("x = /a/g.test(y);"),
            ["use y", "assign x", "end"]
        );
    }

    #[test]
    fn for_loop_has_its_own_scope() {
        assert_eq!(
            visits_of("for (let i = 0; i < n; i++) { i; }"),
            [
                "{",
                "declare let i",
                "use i",
                "use n",
                "assign i",
                "{",
                "use i",
                "}",
                "}",
                "end",
            ]
        );
        assert_eq!(
            visits_of("for (const k of keys) {}"),
            ["{", "use keys", "declare const k", "{", "}", "}", "end"]
        );
    }

    #[test]
    fn class_declaration() {
        assert_eq!(
            visits_of("class C extends B { m() { C; } }"),
            [
                "use B",
                "declare class C",
                "{",
                "function {",
                "use C",
                "function }",
                "}",
                "end",
            ]
        );
    }

    #[test]
    fn object_literal() {
        assert_eq!(
            visits_of("({a, b: c, [d]: e, m() {}});"),
            [
                "use a",
                "use c",
                "use d",
                "use e",
                "function {",
                "function }",
                "end",
            ]
        );
    }

    #[test]
    fn imports_and_exports() {
        assert_eq!(
            visits_of("import d, {x as y, z} from \"m\"; export {y};"),
            [
                "declare import d",
                "declare import y",
                "declare import z",
                "use y",
                "end",
            ]
        );
    }

    #[test]
    fn try_catch_finally() {
        assert_eq!(
            visits_of("try { f(); } catch (e) { e; } finally {}"),
            [
                "{",
                "use f",
                "}",
                "{",
                "declare catch variable e",
                "use e",
                "}",
                "{",
                "}",
                "end",
            ]
        );
    }

    #[test]
    fn templates() {
        assert_eq!(visits_of("`${a}b${c}`"), ["use a", "use c", "end"]);
        assert_eq!(diags_of("`${a"), [DiagType::UnclosedTemplate]);
    }

    #[test]
    fn automatic_semicolon_insertion() {
        assert_eq!(
            visits_of("let a = 1\nlet b = a\nb++"),
            ["declare let a", "use a", "declare let b", "assign b", "end"]
        );
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(
            diags_of("const x;"),
            [DiagType::MissingInitializerInConstDeclaration]
        );
        assert_eq!(diags_of("function () {}"), [DiagType::MissingNameInStatement]);
        assert_eq!(diags_of("class {}"), [DiagType::MissingNameInStatement]);
        assert_eq!(diags_of("if (x {}"), [DiagType::ExpectedToken]);
        assert_eq!(
            diags_of("1 = 2;"),
            [DiagType::InvalidExpressionLeftOfAssignment]
        );
        assert_eq!(diags_of("let x = ;"), [DiagType::UnexpectedToken]);
        assert_eq!(diags_of("x )"), [DiagType::UnexpectedToken]);
        assert!(diags_of("for (const x in xs) {}").is_empty());
    }

    #[test]
    fn unmatched_bracket_points_at_opening() {
        let input = PaddedString::from("f(");
        let mut diags = DiagList::new();
        parse_and_visit_module(input.view(), &mut diags, &mut BufferingVisitor::new());
        match diags.diags() {
            [Diag::UnmatchedBracket(diag)] => {
                assert_eq!(diag.opening.string_view(), b"(");
                assert_eq!(diag.bracket, b'(');
            }
            other => panic!("unexpected diagnostics: {other:?}"),
        }
    }

    #[test]
    fn garbage_terminates() {
        for source in ["}}}", "(((", "let [", "class { get", "`${`${", "a ? :", "x.", "new"] {
            let (visits, _) = parse(source);
            assert_eq!(visits.last().map(String::as_str), Some("end"), "{source:?}");
        }
    }
}
