//! Parse a module and check its variables.

use crate::diag_reporter::DiagReporter;
use crate::global_declared_variables::GlobalDeclaredVariableSet;
use crate::padded_string::PaddedStringView;
use crate::parse::parse_and_visit_module;
use crate::parse_visitor::BufferingVisitor;
use crate::variable_analyzer::VariableAnalyzer;

/// Lint `input`, reporting syntax errors first and variable errors after them.
pub fn parse_and_lint<'code>(
    input: PaddedStringView<'code>,
    reporter: &mut dyn DiagReporter<'code>,
    globals: &GlobalDeclaredVariableSet,
) {
    let mut visits = BufferingVisitor::new();
    parse_and_visit_module(input, reporter, &mut visits);
    let mut analyzer = VariableAnalyzer::new(reporter, globals);
    visits.copy_into(&mut analyzer);
}
