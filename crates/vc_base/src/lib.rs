//! # vc-base
//!
//! Pure structural atoms shared across the V compiler: arena allocation,
//! string interning, source spans, and the diagnostic sink.
//!
//! This crate has no knowledge of V's grammar or semantics — it provides only
//! generic infrastructure that the lexer, parser, AST, and evaluator crates
//! build upon.

pub mod arena;
pub mod diagnostics;
pub mod intern;
pub mod span;

pub use arena::Arena;
pub use diagnostics::{Diagnostic, Severity, Sink};
pub use intern::{Interner, Symbol};
pub use span::Span;
