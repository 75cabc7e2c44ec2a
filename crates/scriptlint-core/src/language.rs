//! Small language-level enums carried in diagnostic payloads.

/// How a variable was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Parameter of an arrow function.
    ArrowParameter,
    /// Binding introduced by `catch (e)`.
    Catch,
    /// `class C {}`.
    Class,
    /// `const x = ...`.
    Const,
    /// `function f() {}`.
    Function,
    /// Parameter of a non-arrow function.
    FunctionParameter,
    /// `import x from "m"`.
    Import,
    /// `let x`.
    Let,
    /// `var x`.
    Var,
}

impl VariableKind {
    /// Source keyword or description used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::ArrowParameter => "parameter",
            VariableKind::Catch => "catch variable",
            VariableKind::Class => "class",
            VariableKind::Const => "const",
            VariableKind::Function => "function",
            VariableKind::FunctionParameter => "parameter",
            VariableKind::Import => "import",
            VariableKind::Let => "let",
            VariableKind::Var => "var",
        }
    }

    /// Declarations subject to the temporal dead zone and to redeclaration errors.
    pub fn is_lexical(self) -> bool {
        matches!(
            self,
            VariableKind::Class | VariableKind::Const | VariableKind::Import | VariableKind::Let
        )
    }

    /// Declarations which cannot be read or written before the declaration runs.
    ///
    /// Imports are lexical but hoisted with their module, so they have no dead zone.
    pub fn has_temporal_dead_zone(self) -> bool {
        matches!(
            self,
            VariableKind::Class | VariableKind::Const | VariableKind::Let
        )
    }

    /// Declarations which can never be assigned to after initialization.
    pub fn is_immutable(self) -> bool {
        matches!(self, VariableKind::Const | VariableKind::Import)
    }
}

/// Statement kinds named in parser diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// `class` declaration.
    ClassStatement,
    /// `do ... while` loop.
    DoWhileLoop,
    /// `for` loop.
    ForLoop,
    /// `function` declaration.
    FunctionStatement,
    /// `if` statement.
    IfStatement,
    /// `while` loop.
    WhileLoop,
}

impl StatementKind {
    /// Description used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::ClassStatement => "class statement",
            StatementKind::DoWhileLoop => "'do-while' loop",
            StatementKind::ForLoop => "'for' loop",
            StatementKind::FunctionStatement => "function statement",
            StatementKind::IfStatement => "'if' statement",
            StatementKind::WhileLoop => "'while' loop",
        }
    }
}

/// Flavors of enumeration declarations.
///
/// Plain scripts never declare enums, but typed dialects feeding the same reporters do, so the
/// catalog can render this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    /// `const enum E {}`.
    ConstEnum,
    /// `declare const enum E {}`.
    DeclareConstEnum,
    /// `declare enum E {}`.
    DeclareEnum,
    /// `enum E {}`.
    Normal,
}

impl EnumKind {
    /// Description used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            EnumKind::ConstEnum => "const enum",
            EnumKind::DeclareConstEnum => "declare const enum",
            EnumKind::DeclareEnum => "declare enum",
            EnumKind::Normal => "enum",
        }
    }
}
