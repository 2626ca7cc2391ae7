//! # vc-sema
//!
//! The semantic analyzer: walks a parsed `vc_ast::Program`, resolving every
//! name, checking every type, folding every constant expression, inserting
//! implicit widening casts, and eliminating statically dead code. Semantic
//! errors accumulate in the shared `vc_base::Sink` rather than aborting —
//! evaluation always runs to completion so a single source file reports
//! every problem it has, not just the first.

mod ctx;
mod dce;
mod expr_eval;
mod fold;
mod literal;
mod overload;
mod stmt_eval;

pub use ctx::EvalCtx;
pub use overload::OverloadError;

use vc_ast::{Expr, Program, ScopeTable, Stmt, StmtKind, Type};
use vc_base::{Arena, Interner, Sink};
use vc_lexer::Token;
use vc_reflect::TypeProvider;

/// Evaluates every function body and the top-level statement block in
/// place. `program`'s `body`/`main_body` references are rewritten to their
/// post-evaluation form; all other evaluation state (resolved types, folded
/// constants, `returns` flags) lives on the nodes themselves.
pub fn evaluate<'ast>(
    program: &mut Program<'ast>,
    scopes: &mut ScopeTable,
    providers: &[Box<dyn TypeProvider>],
    interner: &mut Interner,
    expr_arena: &'ast Arena<Expr<'ast>>,
    stmt_arena: &'ast Arena<Stmt<'ast>>,
    sink: &mut Sink,
) {
    log::debug!("evaluating {} function(s)", program.functions.len());
    for function in program.functions.iter_mut() {
        let mut ctx = EvalCtx { scopes, providers, interner, expr_arena, stmt_arena, sink };
        let body = stmt_eval::eval_stmt(function.body, &mut ctx, function.local_scope, &function.return_type);
        function.body = finalize_body(body, &function.return_type, &mut ctx, function.token);
    }

    let mut ctx = EvalCtx { scopes, providers, interner, expr_arena, stmt_arena, sink };
    let main_body = stmt_eval::eval_stmt(program.main_body, &mut ctx, ScopeTable::PROGRAM, &Type::void());
    program.main_body = finalize_body(main_body, &Type::void(), &mut ctx, program.token);
}

/// The post-evaluation check every function body (including the implicit
/// top-level one) goes through: a non-`void` function that doesn't
/// provably return on every path is a semantic error; a `void` one that
/// doesn't is completed with a synthetic `return;`.
fn finalize_body<'ast>(
    body: &'ast Stmt<'ast>,
    return_type: &Type,
    ctx: &mut EvalCtx<'_, 'ast>,
    diag_token: Token,
) -> &'ast Stmt<'ast> {
    if body.returns() {
        return body;
    }
    if return_type.is_void() {
        append_synthetic_return(body, ctx)
    } else {
        ctx.sink.error(
            "not all code paths return a value",
            diag_token.line,
            diag_token.col,
            diag_token.span,
        );
        body
    }
}

fn append_synthetic_return<'ast>(body: &'ast Stmt<'ast>, ctx: &mut EvalCtx<'_, 'ast>) -> &'ast Stmt<'ast> {
    let stmts = match &body.kind {
        StmtKind::Block(stmts) => stmts.clone(),
        // A function body is always parsed as a `Block`; anything else
        // would be a parser bug, not a case evaluation needs to recover
        // from gracefully.
        _ => unreachable!("function body is always a block"),
    };
    let synthetic_return = ctx.stmt_arena.alloc(Stmt::new(StmtKind::Return(None), body.token));
    synthetic_return.set_returns(true);
    let mut new_stmts = stmts;
    new_stmts.push(synthetic_return);
    let new_block = ctx.stmt_arena.alloc(Stmt::new(StmtKind::Block(new_stmts), body.token));
    new_block.set_returns(true);
    new_block
}
