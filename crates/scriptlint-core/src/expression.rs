//! Expression trees built by the parser.
//!
//! Expressions are kept only until the enclosing statement is visited: the parser needs the whole
//! tree to tell `(a, b) => ...` parameters from a parenthesized sequence and `x = 1` assignment
//! targets from reads. Function and class bodies inside an expression are recorded as visits
//! when parsed.

use crate::parse_visitor::BufferingVisitor;
use crate::span::SourceCodeSpan;

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression<'code> {
    /// A variable reference.
    Variable(SourceCodeSpan<'code>),
    /// A leaf with no variable references: numbers, strings, regexps, `this`, `#private`, ...
    Literal(SourceCodeSpan<'code>),
    /// Placeholder after a syntax error was reported.
    Missing(SourceCodeSpan<'code>),
    /// `()`; only valid as arrow function parameters.
    EmptyParen(SourceCodeSpan<'code>),
    /// `[a, , ...b]`.
    Array {
        /// Whole literal.
        span: SourceCodeSpan<'code>,
        /// Elements, holes omitted.
        elements: Vec<Expression<'code>>,
    },
    /// `{a, b: c, [d]: e, ...f, m() {}}`.
    Object {
        /// Whole literal.
        span: SourceCodeSpan<'code>,
        /// Properties in source order.
        entries: Vec<ObjectEntry<'code>>,
    },
    /// `...x`.
    Spread {
        /// Whole expression.
        span: SourceCodeSpan<'code>,
        /// The spread operand.
        child: Box<Expression<'code>>,
    },
    /// `(x)`.
    Paren {
        /// Including the parentheses.
        span: SourceCodeSpan<'code>,
        /// The parenthesized expression.
        child: Box<Expression<'code>>,
    },
    /// `a, b` (including the contents of `(a, b)`).
    Sequence {
        /// Whole sequence.
        span: SourceCodeSpan<'code>,
        /// Operands in order.
        children: Vec<Expression<'code>>,
    },
    /// `typeof x`.
    Typeof {
        /// Whole expression.
        span: SourceCodeSpan<'code>,
        /// The operand.
        child: Box<Expression<'code>>,
    },
    /// Other unary operators, `await` and `yield`.
    Unary {
        /// Whole expression.
        span: SourceCodeSpan<'code>,
        /// The operand.
        child: Box<Expression<'code>>,
    },
    /// `++x`, `x--`.
    Update {
        /// Whole expression.
        span: SourceCodeSpan<'code>,
        /// The updated target.
        child: Box<Expression<'code>>,
    },
    /// Binary, logical and conditional operators.
    Operators {
        /// Whole expression.
        span: SourceCodeSpan<'code>,
        /// Operands in evaluation order.
        children: Vec<Expression<'code>>,
    },
    /// `x = y` or `x += y`.
    Assignment {
        /// Whole expression.
        span: SourceCodeSpan<'code>,
        /// Left-hand side.
        target: Box<Expression<'code>>,
        /// Right-hand side.
        value: Box<Expression<'code>>,
        /// `true` for `+=` and friends.
        compound: bool,
    },
    /// `f(a)`, `new F(a)` or a tagged template.
    Call {
        /// Whole expression.
        span: SourceCodeSpan<'code>,
        /// The called expression.
        callee: Box<Expression<'code>>,
        /// Arguments in order.
        args: Vec<Expression<'code>>,
    },
    /// `a.b`, `a?.b` or `a[b]`.
    Member {
        /// Whole expression.
        span: SourceCodeSpan<'code>,
        /// The object.
        object: Box<Expression<'code>>,
        /// The computed property, if any.
        property: Option<Box<Expression<'code>>>,
    },
    /// A template literal.
    Template {
        /// Whole literal.
        span: SourceCodeSpan<'code>,
        /// `${...}` expressions in order.
        substitutions: Vec<Expression<'code>>,
    },
    /// A function, arrow function or class, with the visits of its body.
    Function {
        /// Whole expression.
        span: SourceCodeSpan<'code>,
        /// Visits recorded while parsing.
        visits: BufferingVisitor<'code>,
    },
}

/// One property of an object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry<'code> {
    /// Computed key (`[key]: value`); `None` for plain names.
    pub key: Option<Expression<'code>>,
    /// The value; a variable for shorthand properties.
    pub value: Expression<'code>,
}

impl<'code> Expression<'code> {
    /// Source span of the whole expression.
    pub fn span(&self) -> SourceCodeSpan<'code> {
        match self {
            Expression::Variable(span)
            | Expression::Literal(span)
            | Expression::Missing(span)
            | Expression::EmptyParen(span) => *span,
            Expression::Array { span, .. }
            | Expression::Object { span, .. }
            | Expression::Spread { span, .. }
            | Expression::Paren { span, .. }
            | Expression::Sequence { span, .. }
            | Expression::Typeof { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Update { span, .. }
            | Expression::Operators { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Call { span, .. }
            | Expression::Member { span, .. }
            | Expression::Template { span, .. }
            | Expression::Function { span, .. } => *span,
        }
    }

    /// The variable this expression names, looking through parentheses.
    pub fn as_variable(&self) -> Option<SourceCodeSpan<'code>> {
        match self {
            Expression::Variable(span) => Some(*span),
            Expression::Paren { child, .. } => child.as_variable(),
            _ => None,
        }
    }
}
