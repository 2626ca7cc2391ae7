//! # vc-ast
//!
//! The V abstract syntax tree: expression and statement node kinds, the
//! type model, call signatures, and the scope chain they're resolved
//! through. Nodes are arena-allocated (see `vc_base::Arena`) and referenced
//! by shared reference; lazily resolved fields (`Expr::return_type`,
//! `Stmt::returns`) use interior mutability so the evaluator can rewrite a
//! node's resolved state without taking `&mut` on the whole tree.

pub mod decl;
pub mod expr;
pub mod scope;
pub mod signature;
pub mod stmt;
pub mod types;

pub use decl::{Function, Program, Variable};
pub use expr::{BinaryOp, Expr, ExprKind, Literal, UnaryOp};
pub use scope::{GlobalScope, LocalScope, ProgramScope, ScopeId, ScopeKind, ScopeTable};
pub use signature::Signature;
pub use stmt::{ForDirection, Stmt, StmtKind};
pub use types::{Primitive, Type};
