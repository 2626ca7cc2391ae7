//! Fatal scanner failures.
//!
//! Unlike parser/evaluator diagnostics, these abort compilation outright —
//! the scanner has no way to produce a meaningful token stream past them.

use std::fmt;
use vc_base::Span;

#[derive(Debug, Clone)]
pub enum ScanError {
    /// The source file could not be opened or read.
    CannotOpen { path: String, reason: String },
    /// The source begins with a byte-order-mark-looking byte (`0xEF`) that is
    /// not the valid UTF-8 BOM sequence `EF BB BF`.
    BomInvalid { pos: usize },
    /// A string literal was not closed before end of input.
    UnterminatedString { span: Span },
    /// An unknown escape sequence appeared inside a string or identifier.
    BadEscape { span: Span, found: char },
    /// Internal bounds violation while indexing the source buffer.
    BufferOutOfBounds { pos: usize },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::CannotOpen { path, reason } => {
                write!(f, "cannot open source file '{path}': {reason}")
            }
            ScanError::BomInvalid { pos } => {
                write!(f, "invalid byte-order mark at byte {pos}")
            }
            ScanError::UnterminatedString { span } => {
                write!(f, "unterminated string literal starting at byte {}", span.start)
            }
            ScanError::BadEscape { span, found } => {
                write!(f, "unknown escape '\\{found}' at byte {}", span.start)
            }
            ScanError::BufferOutOfBounds { pos } => {
                write!(f, "scanner read out of bounds at byte {pos}")
            }
        }
    }
}

impl std::error::Error for ScanError {}
