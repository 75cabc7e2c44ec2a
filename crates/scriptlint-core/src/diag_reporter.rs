//! Diagnostic sinks.
//!
//! The linter reports each diagnostic to a [`DiagReporter`] as soon as it is found. Reporters
//! either collect diagnostics ([`DiagList`]), drop them ([`NullDiagReporter`]), reject them
//! ([`FailingDiagReporter`]) or format them right away (see
//! [`VimQflistJsonDiagReporter`](crate::VimQflistJsonDiagReporter) and
//! [`TextDiagReporter`](crate::TextDiagReporter)).

use crate::diag_types::{Diag, DiagType};

/// Receives diagnostics found while linting source text borrowed for `'code`.
pub trait DiagReporter<'code> {
    /// Accept one diagnostic.
    fn report(&mut self, diag: Diag<'code>);
}

impl<'code, R: DiagReporter<'code> + ?Sized> DiagReporter<'code> for &mut R {
    fn report(&mut self, diag: Diag<'code>) {
        (**self).report(diag);
    }
}

/// Collects diagnostics in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagList<'code> {
    diags: Vec<Diag<'code>>,
}

impl<'code> DiagList<'code> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.diags.len()
    }

    /// Returns `true` if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    /// Collected diagnostics, in report order.
    pub fn diags(&self) -> &[Diag<'code>] {
        &self.diags
    }

    /// Iterate over collected diagnostics.
    pub fn iter(&self) -> std::slice::Iter<'_, Diag<'code>> {
        self.diags.iter()
    }

    /// Returns `true` if any diagnostic of `diag_type` was reported.
    pub fn have_diag(&self, diag_type: DiagType) -> bool {
        self.diags.iter().any(|diag| diag.diag_type() == diag_type)
    }

    /// Forward every collected diagnostic, in order, to `reporter`.
    pub fn copy_into(&self, reporter: &mut impl DiagReporter<'code>) {
        for diag in &self.diags {
            reporter.report(*diag);
        }
    }

    /// Drop every collected diagnostic.
    pub fn clear(&mut self) {
        self.diags.clear();
    }
}

impl<'code> DiagReporter<'code> for DiagList<'code> {
    fn report(&mut self, diag: Diag<'code>) {
        self.diags.push(diag);
    }
}

impl<'code> IntoIterator for DiagList<'code> {
    type Item = Diag<'code>;
    type IntoIter = std::vec::IntoIter<Diag<'code>>;

    fn into_iter(self) -> Self::IntoIter {
        self.diags.into_iter()
    }
}

impl<'a, 'code> IntoIterator for &'a DiagList<'code> {
    type Item = &'a Diag<'code>;
    type IntoIter = std::slice::Iter<'a, Diag<'code>>;

    fn into_iter(self) -> Self::IntoIter {
        self.diags.iter()
    }
}

/// Ignores every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagReporter;

impl DiagReporter<'_> for NullDiagReporter {
    fn report(&mut self, _diag: Diag<'_>) {}
}

/// Panics on the first diagnostic. For code paths which must never produce one.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDiagReporter;

impl DiagReporter<'_> for FailingDiagReporter {
    fn report(&mut self, diag: Diag<'_>) {
        let info = diag.diag_type().info();
        panic!(
            "unexpected diagnostic {} ({}): {:?}",
            info.code_string(),
            diag.diag_type().name(),
            diag
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag_types::{DiagUnexpectedHashCharacter, DiagUnexpectedToken};
    use crate::padded_string::PaddedString;
    use crate::span::SourceCodeSpan;

    #[test]
    fn list_keeps_report_order() {
        let input = PaddedString::from("# )");
        let hash = SourceCodeSpan::from_range(input.view(), 0..1);
        let paren = SourceCodeSpan::from_range(input.view(), 2..3);

        let mut list = DiagList::new();
        list.report(DiagUnexpectedHashCharacter { hash }.into());
        list.report(DiagUnexpectedToken { token: paren }.into());

        assert_eq!(list.len(), 2);
        assert!(list.have_diag(DiagType::UnexpectedToken));
        assert!(!list.have_diag(DiagType::UnclosedTemplate));
        let types: Vec<DiagType> = list.iter().map(Diag::diag_type).collect();
        assert_eq!(
            types,
            [DiagType::UnexpectedHashCharacter, DiagType::UnexpectedToken]
        );

        let mut copy = DiagList::new();
        list.copy_into(&mut copy);
        assert_eq!(copy, list);
    }

    #[test]
    #[should_panic(expected = "unexpected diagnostic E0054")]
    fn failing_reporter_panics() {
        let input = PaddedString::from(")");
        FailingDiagReporter.report(
            DiagUnexpectedToken {
                token: SourceCodeSpan::from_range(input.view(), 0..1),
            }
            .into(),
        );
    }
}
