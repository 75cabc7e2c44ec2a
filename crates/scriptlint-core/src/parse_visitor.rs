//! Events the parser emits for semantic analysis.

use crate::language::VariableKind;
use crate::span::SourceCodeSpan;

/// Receives the variable-related structure of a program, in source order.
///
/// Names are spans; the variable's name is the span's text.
pub trait ParseVisitor<'code> {
    /// A binding is introduced in the current scope (or, for `var`, the enclosing function).
    fn visit_variable_declaration(&mut self, name: SourceCodeSpan<'code>, kind: VariableKind);
    /// A variable is read.
    fn visit_variable_use(&mut self, name: SourceCodeSpan<'code>);
    /// A variable is written.
    fn visit_variable_assignment(&mut self, name: SourceCodeSpan<'code>);
    /// A variable is read by `typeof`, which tolerates undeclared names.
    fn visit_variable_typeof_use(&mut self, name: SourceCodeSpan<'code>);
    /// A block scope opens.
    fn visit_enter_block_scope(&mut self);
    /// The innermost block scope closes.
    fn visit_exit_block_scope(&mut self);
    /// A function scope opens. Parameters are declared next.
    fn visit_enter_function_scope(&mut self);
    /// The innermost function scope closes.
    fn visit_exit_function_scope(&mut self);
    /// The program ended.
    fn visit_end_of_module(&mut self);
}

/// One recorded [`ParseVisitor`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum VisitEvent<'code> {
    VariableDeclaration(SourceCodeSpan<'code>, VariableKind),
    VariableUse(SourceCodeSpan<'code>),
    VariableAssignment(SourceCodeSpan<'code>),
    VariableTypeofUse(SourceCodeSpan<'code>),
    EnterBlockScope,
    ExitBlockScope,
    EnterFunctionScope,
    ExitFunctionScope,
    EndOfModule,
}

/// Records visits for replay.
///
/// The parser emits a nested function's visits into a buffer while parsing the surrounding
/// expression, then splices them in where the function appears once the expression is visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferingVisitor<'code> {
    events: Vec<VisitEvent<'code>>,
}

impl<'code> BufferingVisitor<'code> {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> &[VisitEvent<'code>] {
        &self.events
    }

    /// Move every event of `other` to the end of this buffer.
    pub fn append(&mut self, other: &mut BufferingVisitor<'code>) {
        self.events.append(&mut other.events);
    }

    /// Replay every event, in order, into `visitor`.
    pub fn copy_into(&self, visitor: &mut impl ParseVisitor<'code>) {
        for event in &self.events {
            match *event {
                VisitEvent::VariableDeclaration(name, kind) => {
                    visitor.visit_variable_declaration(name, kind)
                }
                VisitEvent::VariableUse(name) => visitor.visit_variable_use(name),
                VisitEvent::VariableAssignment(name) => visitor.visit_variable_assignment(name),
                VisitEvent::VariableTypeofUse(name) => visitor.visit_variable_typeof_use(name),
                VisitEvent::EnterBlockScope => visitor.visit_enter_block_scope(),
                VisitEvent::ExitBlockScope => visitor.visit_exit_block_scope(),
                VisitEvent::EnterFunctionScope => visitor.visit_enter_function_scope(),
                VisitEvent::ExitFunctionScope => visitor.visit_exit_function_scope(),
                VisitEvent::EndOfModule => visitor.visit_end_of_module(),
            }
        }
    }
}

impl<'code> ParseVisitor<'code> for BufferingVisitor<'code> {
    fn visit_variable_declaration(&mut self, name: SourceCodeSpan<'code>, kind: VariableKind) {
        self.events.push(VisitEvent::VariableDeclaration(name, kind));
    }

    fn visit_variable_use(&mut self, name: SourceCodeSpan<'code>) {
        self.events.push(VisitEvent::VariableUse(name));
    }

    fn visit_variable_assignment(&mut self, name: SourceCodeSpan<'code>) {
        self.events.push(VisitEvent::VariableAssignment(name));
    }

    fn visit_variable_typeof_use(&mut self, name: SourceCodeSpan<'code>) {
        self.events.push(VisitEvent::VariableTypeofUse(name));
    }

    fn visit_enter_block_scope(&mut self) {
        self.events.push(VisitEvent::EnterBlockScope);
    }

    fn visit_exit_block_scope(&mut self) {
        self.events.push(VisitEvent::ExitBlockScope);
    }

    fn visit_enter_function_scope(&mut self) {
        self.events.push(VisitEvent::EnterFunctionScope);
    }

    fn visit_exit_function_scope(&mut self) {
        self.events.push(VisitEvent::ExitFunctionScope);
    }

    fn visit_end_of_module(&mut self) {
        self.events.push(VisitEvent::EndOfModule);
    }
}
