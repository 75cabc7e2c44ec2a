//! Scope analysis: matches variable uses with declarations.
//!
//! Uses which cannot be resolved in the scope they appear in are kept pending. A later declaration
//! in the same scope resolves them (and is a temporal dead zone violation for `let`, `const` and
//! `class`); otherwise they move to the parent scope when the scope closes. Whatever is still
//! pending at the end of the module is checked against the global variables.

use crate::diag_reporter::DiagReporter;
use crate::diag_types::{
    Diag, DiagAssignmentBeforeVariableDeclaration, DiagAssignmentToConstGlobalVariable,
    DiagAssignmentToConstVariable, DiagAssignmentToImportedVariable,
    DiagAssignmentToUndeclaredVariable, DiagRedeclarationOfGlobalVariable,
    DiagRedeclarationOfVariable, DiagUseOfUndeclaredVariable, DiagVariableUsedBeforeDeclaration,
};
use crate::global_declared_variables::GlobalDeclaredVariableSet;
use crate::language::VariableKind;
use crate::parse_visitor::ParseVisitor;
use crate::span::SourceCodeSpan;

#[derive(Debug, Clone, Copy)]
struct DeclaredVariable<'code> {
    name: SourceCodeSpan<'code>,
    kind: VariableKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UseKind {
    Use,
    TypeofUse,
    Assignment,
}

#[derive(Debug, Clone, Copy)]
struct UsedVariable<'code> {
    name: SourceCodeSpan<'code>,
    kind: UseKind,
    /// The use is inside a function nested in the scope, so it runs after declarations which
    /// follow it in the source.
    in_nested_function: bool,
}

#[derive(Debug, Default)]
struct Scope<'code> {
    declared: Vec<DeclaredVariable<'code>>,
    pending: Vec<UsedVariable<'code>>,
    is_function: bool,
}

impl<'code> Scope<'code> {
    fn find(&self, name: &[u8]) -> Option<DeclaredVariable<'code>> {
        self.declared
            .iter()
            .find(|declared| declared.name.string_view() == name)
            .copied()
    }
}

/// Reports undeclared variables, redeclarations, dead-zone uses and assignments to constants.
pub struct VariableAnalyzer<'code, 'a> {
    /// Innermost last. The first scope is the module.
    scopes: Vec<Scope<'code>>,
    reporter: &'a mut dyn DiagReporter<'code>,
    globals: &'a GlobalDeclaredVariableSet,
}

impl<'code, 'a> VariableAnalyzer<'code, 'a> {
    /// Analyzer for one module, resolving leftover names against `globals`.
    pub fn new(
        reporter: &'a mut dyn DiagReporter<'code>,
        globals: &'a GlobalDeclaredVariableSet,
    ) -> Self {
        Self {
            scopes: vec![Scope {
                is_function: true,
                ..Scope::default()
            }],
            reporter,
            globals,
        }
    }

    fn report(&mut self, diag: impl Into<Diag<'code>>) {
        self.reporter.report(diag.into());
    }

    fn current_scope(&mut self) -> &mut Scope<'code> {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Index of the scope a `var` declaration lands in.
    fn var_scope_index(&self) -> usize {
        self.scopes
            .iter()
            .rposition(|scope| scope.is_function)
            .unwrap_or(0)
    }

    fn check_redeclaration(
        &mut self,
        scope_index: usize,
        name: SourceCodeSpan<'code>,
        kind: VariableKind,
    ) {
        let Some(existing) = self.scopes[scope_index].find(name.string_view()) else {
            return;
        };
        if kind.is_lexical() || existing.kind.is_lexical() {
            self.report(DiagRedeclarationOfVariable {
                redeclaration: name,
                original_declaration: existing.name,
            });
        }
    }

    fn check_assignment(
        &mut self,
        assignment: SourceCodeSpan<'code>,
        declared: DeclaredVariable<'code>,
    ) {
        match declared.kind {
            VariableKind::Const => self.report(DiagAssignmentToConstVariable {
                assignment,
                declaration: declared.name,
            }),
            VariableKind::Import => self.report(DiagAssignmentToImportedVariable {
                assignment,
                declaration: declared.name,
            }),
            _ => {}
        }
    }

    /// Resolve pending uses of `declared` which appeared before it in `scope_index`.
    fn resolve_pending_uses(&mut self, scope_index: usize, declared: DeclaredVariable<'code>) {
        let name = declared.name.string_view();
        let (resolved, pending): (Vec<_>, Vec<_>) = self.scopes[scope_index]
            .pending
            .drain(..)
            .partition(|used| used.name.string_view() == name);
        self.scopes[scope_index].pending = pending;

        for used in resolved {
            if !used.in_nested_function && declared.kind.has_temporal_dead_zone() {
                match used.kind {
                    UseKind::Use | UseKind::TypeofUse => {
                        self.report(DiagVariableUsedBeforeDeclaration {
                            use_: used.name,
                            declaration: declared.name,
                        })
                    }
                    UseKind::Assignment => {
                        self.report(DiagAssignmentBeforeVariableDeclaration {
                            assignment: used.name,
                            declaration: declared.name,
                        })
                    }
                }
            } else if used.kind == UseKind::Assignment {
                self.check_assignment(used.name, declared);
            }
        }
    }

    fn add_use(&mut self, name: SourceCodeSpan<'code>, kind: UseKind) {
        let scope = self.current_scope();
        match scope.find(name.string_view()) {
            Some(declared) => {
                if kind == UseKind::Assignment {
                    self.check_assignment(name, declared);
                }
            }
            None => scope.pending.push(UsedVariable {
                name,
                kind,
                in_nested_function: false,
            }),
        }
    }

    /// Close the innermost scope, handing its unresolved uses to the parent.
    fn exit_scope(&mut self) {
        if self.scopes.len() <= 1 {
            debug_assert!(false, "exited the module scope");
            return;
        }
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        for mut used in scope.pending {
            if scope.is_function {
                if used.name.string_view() == b"arguments" {
                    continue;
                }
                used.in_nested_function = true;
            }
            let parent = self.current_scope();
            match parent.find(used.name.string_view()) {
                Some(declared) => {
                    if used.kind == UseKind::Assignment {
                        self.check_assignment(used.name, declared);
                    }
                }
                None => parent.pending.push(used),
            }
        }
    }
}

impl<'code> ParseVisitor<'code> for VariableAnalyzer<'code, '_> {
    fn visit_variable_declaration(&mut self, name: SourceCodeSpan<'code>, kind: VariableKind) {
        let innermost = self.scopes.len() - 1;
        let scope_index = if kind == VariableKind::Var {
            self.var_scope_index()
        } else {
            innermost
        };

        // `var` hoists through blocks, conflicting with their lexical declarations.
        for index in scope_index..=innermost {
            if index == scope_index {
                self.check_redeclaration(index, name, kind);
            } else if let Some(existing) = self.scopes[index].find(name.string_view())
                && existing.kind.is_lexical()
            {
                self.report(DiagRedeclarationOfVariable {
                    redeclaration: name,
                    original_declaration: existing.name,
                });
            }
        }

        if scope_index == 0
            && kind.is_lexical()
            && self
                .globals
                .find(name.string_view())
                .is_some_and(|flags| !flags.shadowable)
        {
            self.report(DiagRedeclarationOfGlobalVariable {
                redeclaration: name,
            });
        }

        let declared = DeclaredVariable { name, kind };
        self.scopes[scope_index].declared.push(declared);
        self.resolve_pending_uses(scope_index, declared);
    }

    fn visit_variable_use(&mut self, name: SourceCodeSpan<'code>) {
        self.add_use(name, UseKind::Use);
    }

    fn visit_variable_assignment(&mut self, name: SourceCodeSpan<'code>) {
        self.add_use(name, UseKind::Assignment);
    }

    fn visit_variable_typeof_use(&mut self, name: SourceCodeSpan<'code>) {
        self.add_use(name, UseKind::TypeofUse);
    }

    fn visit_enter_block_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn visit_exit_block_scope(&mut self) {
        debug_assert!(!self.current_scope().is_function);
        self.exit_scope();
    }

    fn visit_enter_function_scope(&mut self) {
        self.scopes.push(Scope {
            is_function: true,
            ..Scope::default()
        });
    }

    fn visit_exit_function_scope(&mut self) {
        debug_assert!(self.current_scope().is_function);
        self.exit_scope();
    }

    fn visit_end_of_module(&mut self) {
        debug_assert_eq!(self.scopes.len(), 1, "unbalanced scopes at end of module");
        let pending = std::mem::take(&mut self.scopes[0].pending);
        for used in pending {
            let global = self.globals.find(used.name.string_view());
            match (used.kind, global) {
                (UseKind::Assignment, Some(flags)) if !flags.writable => {
                    self.report(DiagAssignmentToConstGlobalVariable {
                        assignment: used.name,
                    })
                }
                (_, Some(_)) | (UseKind::TypeofUse, None) => {}
                (UseKind::Use, None) => self.report(DiagUseOfUndeclaredVariable { name: used.name }),
                (UseKind::Assignment, None) => self.report(DiagAssignmentToUndeclaredVariable {
                    assignment: used.name,
                }),
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
    use pretty_assertions::assert_eq;

    /// Runs the analyzer over `let x; ...` style event scripts built from one buffer.
    struct Script {
        input: PaddedString,
    }

    impl Script {
        fn new(source: &str) -> Self {
            Self {
                input: PaddedString::from(source),
            }
        }

        /// Span of the `n`th occurrence (0-based) of `needle`.
        fn span(&self, needle: &str, n: usize) -> SourceCodeSpan<'_> {
            let text = std::str::from_utf8(self.input.as_bytes()).unwrap();
            let begin = text
                .match_indices(needle)
                .nth(n)
                .map(|(index, _)| index)
                .unwrap();
            SourceCodeSpan::from_range(self.input.view(), begin..begin + needle.len())
        }
    }

    fn analyze<'code>(
        globals: &GlobalDeclaredVariableSet,
        events: impl FnOnce(&mut VariableAnalyzer<'code, '_>),
    ) -> Vec<DiagType> {
        let mut diags = DiagList::new();
        {
            let mut analyzer = VariableAnalyzer::new(&mut diags, globals);
            events(&mut analyzer);
            analyzer.visit_end_of_module();
        }
        diags.iter().map(|diag| diag.diag_type()).collect()
    }

    #[test]
    fn undeclared_variables() {
        let script = Script::new("a b c");
        let globals = GlobalDeclaredVariableSet::new();
        let diags = analyze(&globals, |analyzer| {
            analyzer.visit_variable_use(script.span("a", 0));
            analyzer.visit_variable_assignment(script.span("b", 0));
            analyzer.visit_variable_typeof_use(script.span("c", 0));
        });
        assert_eq!(
            diags,
            [
                DiagType::UseOfUndeclaredVariable,
                DiagType::AssignmentToUndeclaredVariable,
            ]
        );
    }

    #[test]
    fn use_before_let_is_dead_zone() {
        let script = Script::new("x x y y");
        let globals = GlobalDeclaredVariableSet::new();
        let diags = analyze(&globals, |analyzer| {
            analyzer.visit_variable_use(script.span("x", 0));
            analyzer.visit_variable_declaration(script.span("x", 1), VariableKind::Let);
            analyzer.visit_variable_assignment(script.span("y", 0));
            analyzer.visit_variable_declaration(script.span("y", 1), VariableKind::Const);
        });
        assert_eq!(
            diags,
            [
                DiagType::VariableUsedBeforeDeclaration,
                DiagType::AssignmentBeforeVariableDeclaration,
            ]
        );
    }

    #[test]
    fn use_in_function_before_let_is_fine() {
        let script = Script::new("x x");
        let globals = GlobalDeclaredVariableSet::new();
        let diags = analyze(&globals, |analyzer| {
            analyzer.visit_enter_function_scope();
            analyzer.visit_variable_use(script.span("x", 0));
            analyzer.visit_exit_function_scope();
            analyzer.visit_variable_declaration(script.span("x", 1), VariableKind::Let);
        });
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn var_is_hoisted_out_of_blocks() {
        let script = Script::new("x x");
        let globals = GlobalDeclaredVariableSet::new();
        let diags = analyze(&globals, |analyzer| {
            analyzer.visit_enter_block_scope();
            analyzer.visit_variable_declaration(script.span("x", 0), VariableKind::Var);
            analyzer.visit_exit_block_scope();
            analyzer.visit_variable_use(script.span("x", 1));
        });
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn redeclarations() {
        let script = Script::new("a a b b c c");
        let globals = GlobalDeclaredVariableSet::new();
        let diags = analyze(&globals, |analyzer| {
            analyzer.visit_variable_declaration(script.span("a", 0), VariableKind::Var);
            analyzer.visit_variable_declaration(script.span("a", 1), VariableKind::Var);
            analyzer.visit_variable_declaration(script.span("b", 0), VariableKind::Let);
            analyzer.visit_variable_declaration(script.span("b", 1), VariableKind::Var);
            analyzer.visit_enter_block_scope();
            analyzer.visit_variable_declaration(script.span("c", 0), VariableKind::Let);
            analyzer.visit_exit_block_scope();
            analyzer.visit_variable_declaration(script.span("c", 1), VariableKind::Let);
        });
        assert_eq!(diags, [DiagType::RedeclarationOfVariable]);
    }

    #[test]
    fn assignments_to_constants() {
        let script = Script::new("c c i i");
        let globals = GlobalDeclaredVariableSet::new();
        let diags = analyze(&globals, |analyzer| {
            analyzer.visit_variable_declaration(script.span("c", 0), VariableKind::Const);
            analyzer.visit_variable_declaration(script.span("i", 0), VariableKind::Import);
            analyzer.visit_enter_function_scope();
            analyzer.visit_variable_assignment(script.span("c", 1));
            analyzer.visit_variable_assignment(script.span("i", 1));
            analyzer.visit_exit_function_scope();
        });
        assert_eq!(
            diags,
            [
                DiagType::AssignmentToConstVariable,
                DiagType::AssignmentToImportedVariable,
            ]
        );
    }

    #[test]
    fn globals() {
        let script = Script::new("Infinity console notShadowable");
        let mut globals = GlobalDeclaredVariableSet::with_all_groups();
        globals.add_variable(
            b"notShadowable",
            crate::global_declared_variables::GlobalVariableFlags {
                writable: true,
                shadowable: false,
            },
        );
        let diags = analyze(&globals, |analyzer| {
            analyzer.visit_variable_assignment(script.span("Infinity", 0));
            analyzer.visit_variable_assignment(script.span("console", 0));
            analyzer.visit_variable_declaration(
                script.span("notShadowable", 0),
                VariableKind::Let,
            );
        });
        assert_eq!(
            diags,
            [
                DiagType::RedeclarationOfGlobalVariable,
                DiagType::AssignmentToConstGlobalVariable,
            ]
        );
    }

    #[test]
    fn arguments_exists_in_functions() {
        let script = Script::new("arguments");
        let globals = GlobalDeclaredVariableSet::new();
        let diags = analyze(&globals, |analyzer| {
            analyzer.visit_enter_function_scope();
            analyzer.visit_variable_use(script.span("arguments", 0));
            analyzer.visit_exit_function_scope();
        });
        assert!(diags.is_empty(), "{diags:?}");
    }
}
