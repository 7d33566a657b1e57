//! Diagnostic sink for semantic errors.
//!
//! Every pass reports into a [`Diagnostics`] instead of returning early.
//! Reporting never fails and never stops the traversal; the caller decides
//! afterwards whether the compile is trustworthy.

use log::debug;

use crate::CompilationError;

/// Ordered collection of reported [`CompilationError`]s.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    errors: Vec<CompilationError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. Reports are kept in the order they were made.
    pub fn report(&mut self, error: CompilationError) {
        debug!("diagnostic: {error}");
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn has_fatal(&self) -> bool {
        self.errors.iter().any(CompilationError::is_fatal)
    }

    /// Drain all reports, leaving the sink empty.
    pub fn take_errors(&mut self) -> Vec<CompilationError> {
        std::mem::take(&mut self.errors)
    }

    /// Append reports drained from another sink.
    pub fn extend(&mut self, errors: impl IntoIterator<Item = CompilationError>) {
        self.errors.extend(errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;

    fn undefined(name: &str) -> CompilationError {
        CompilationError::UndefinedIdentifier {
            name: name.into(),
            span: Span::default(),
        }
    }

    #[test]
    fn reports_keep_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(undefined("a"));
        diagnostics.report(undefined("b"));
        let names: Vec<_> = diagnostics
            .take_errors()
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert!(names[0].contains("'a'"));
        assert!(names[1].contains("'b'"));
    }

    #[test]
    fn extend_appends_in_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(undefined("a"));
        diagnostics.extend(vec![
            CompilationError::Redefinition {
                name: "x".into(),
                span: Span::default(),
            },
            undefined("c"),
        ]);
        assert_eq!(diagnostics.len(), 3);
        assert!(!diagnostics.has_fatal());
        assert!(diagnostics.take_errors()[2].to_string().contains("'c'"));
    }

    #[test]
    fn take_errors_empties_sink() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(undefined("a"));
        let taken = diagnostics.take_errors();
        assert_eq!(taken.len(), 1);
        assert!(diagnostics.is_empty());
    }
}
