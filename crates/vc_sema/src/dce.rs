//! Small helpers shared by `stmt_eval`'s constant-condition rewriting: pulling
//! a folded boolean out of an already-evaluated condition expression, and
//! building the empty statement a removed `if`/`while` collapses to.

use vc_ast::{Expr, ExprKind, Literal, Stmt, StmtKind};
use vc_base::Arena;

/// The folded value of `cond`, if constant folding reduced it to a boolean
/// literal. `None` means the condition is not statically known.
pub fn constant_bool(cond: &Expr<'_>) -> Option<bool> {
    match &cond.kind {
        ExprKind::Literal(Literal::Bool(b)) => Some(*b),
        _ => None,
    }
}

/// An empty block standing in for a statement that constant-condition
/// folding removed outright. `returns` stays false: an empty block never
/// returns.
pub fn empty_block<'ast>(arena: &'ast Arena<Stmt<'ast>>, token: vc_lexer::Token) -> &'ast Stmt<'ast> {
    arena.alloc(Stmt::new(StmtKind::Block(Vec::new()), token))
}
