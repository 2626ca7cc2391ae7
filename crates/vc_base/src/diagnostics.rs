//! The diagnostic sink: a write-only accumulator for syntax/semantic errors
//! and warnings.
//!
//! Parser and evaluator errors never unwind as `Result::Err` — they are
//! pushed here and execution continues, so a single compile invocation can
//! surface as many problems as possible. Only scanner-level fatal conditions
//! (see `vc_lexer::ScanError`) and I/O failures are propagated as errors.

use crate::span::Span;
use std::fmt;

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One recorded syntax or semantic message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub line: u32,
    pub col: u32,
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    /// Renders the spec's external diagnostic format: `-- line L col C: text`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-- line {} col {}: {}", self.line, self.col, self.message)
    }
}

/// Accumulates diagnostics in chronological order and tracks the error count
/// and the syntax-error suppression window (`minErrDist`, spec §4.2/§7).
#[derive(Debug, Default)]
pub struct Sink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    /// Number of tokens successfully consumed since the last syntax error was
    /// reported; reset to zero each time an error is reported, and checked
    /// against `MIN_ERR_DIST` before a new syntax error may be reported.
    tokens_since_error: usize,
}

impl Sink {
    pub const MIN_ERR_DIST: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning; does not increment the error count.
    pub fn warn(&mut self, message: impl Into<String>, line: u32, col: u32, span: Span) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            line,
            col,
            span,
        });
    }

    /// Records a semantic error unconditionally (no suppression window — the
    /// evaluator has no cascading-error problem the way the parser does).
    pub fn error(&mut self, message: impl Into<String>, line: u32, col: u32, span: Span) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            line,
            col,
            span,
        });
        self.error_count += 1;
    }

    /// Records a syntax error if the suppression window allows it, and resets
    /// the window. Returns `true` if the error was actually recorded.
    pub fn syntax_error(&mut self, message: impl Into<String>, line: u32, col: u32, span: Span) -> bool {
        if self.tokens_since_error < Self::MIN_ERR_DIST && self.error_count > 0 {
            return false;
        }
        self.error(message, line, col, span);
        self.tokens_since_error = 0;
        true
    }

    /// Called by the parser each time it successfully consumes a token.
    pub fn note_token_consumed(&mut self) {
        self.tokens_since_error = self.tokens_since_error.saturating_add(1);
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_increment_error_count() {
        let mut sink = Sink::new();
        sink.warn("unreachable code detected", 3, 5, Span::new(10, 20));
        assert_eq!(sink.error_count(), 0);
        assert_eq!(sink.warning_count(), 1);
    }

    #[test]
    fn errors_increment_error_count() {
        let mut sink = Sink::new();
        sink.error("incompatible types", 1, 1, Span::new(0, 1));
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn display_matches_spec_format() {
        let mut sink = Sink::new();
        sink.error("incompatible types", 4, 7, Span::new(0, 1));
        let rendered = format!("{}", sink.diagnostics()[0]);
        assert_eq!(rendered, "-- line 4 col 7: incompatible types");
    }

    #[test]
    fn syntax_error_suppression_window() {
        let mut sink = Sink::new();
        assert!(sink.syntax_error("first", 1, 1, Span::new(0, 1)));
        // No tokens consumed yet: still inside the suppression window.
        assert!(!sink.syntax_error("cascaded", 1, 2, Span::new(1, 2)));
        sink.note_token_consumed();
        sink.note_token_consumed();
        assert!(sink.syntax_error("after window", 1, 5, Span::new(4, 5)));
        assert_eq!(sink.error_count(), 2);
    }

    #[test]
    fn diagnostics_recorded_in_chronological_order() {
        let mut sink = Sink::new();
        sink.warn("w1", 1, 1, Span::new(0, 1));
        sink.error("e1", 2, 1, Span::new(1, 2));
        sink.warn("w2", 3, 1, Span::new(2, 3));
        let messages: Vec<&str> = sink.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["w1", "e1", "w2"]);
    }
}
