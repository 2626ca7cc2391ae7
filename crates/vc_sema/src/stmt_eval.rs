//! Statement evaluation: type-checks conditions and assignment targets,
//! threads `eval_expr` over every embedded expression, folds constant
//! conditions away, and computes the `returns` flag a block's dead-code
//! truncation depends on.
//!
//! Like `expr_eval`, a statement is only reallocated when one of its
//! children's pointer identity actually changed; `returns` is a `Cell` so
//! the common case (nothing folded, nothing dead) costs one flag write and
//! no allocation.

use vc_ast::{Expr, ExprKind, ForDirection, Primitive, Stmt, StmtKind, Type};

use crate::ctx::EvalCtx;
use crate::dce;
use crate::expr_eval::{self, ty_of};

fn changed<'ast>(old: &'ast Stmt<'ast>, new: &'ast Stmt<'ast>) -> bool {
    !std::ptr::eq(old, new)
}

fn is_assignable_target(expr: &Expr<'_>) -> bool {
    matches!(expr.kind, ExprKind::VariableRef(_) | ExprKind::Indexer { .. })
}

pub fn eval_stmt<'ast>(
    stmt: &'ast Stmt<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: vc_ast::ScopeId,
    return_type: &Type,
) -> &'ast Stmt<'ast> {
    match &stmt.kind {
        StmtKind::Block(stmts) => eval_block(stmt, stmts, ctx, scope, return_type),
        StmtKind::Assign { target, value } => eval_assign(stmt, *target, *value, ctx, scope),
        StmtKind::Call(call) => eval_call_stmt(stmt, *call, ctx, scope),
        StmtKind::Return(expr) => eval_return(stmt, *expr, ctx, scope, return_type),
        StmtKind::If { cond, then_branch, else_branch } => {
            eval_if(stmt, *cond, *then_branch, *else_branch, ctx, scope, return_type)
        }
        StmtKind::While { cond, body } => eval_while(stmt, *cond, *body, ctx, scope, return_type),
        StmtKind::DoWhile { body, cond } => eval_do_while(stmt, *body, *cond, ctx, scope, return_type),
        StmtKind::For { var, initial, bound, direction, body } => {
            eval_for(stmt, *var, *initial, *bound, *direction, *body, ctx, scope, return_type)
        }
    }
}

fn eval_block<'ast>(
    stmt: &'ast Stmt<'ast>,
    stmts: &[&'ast Stmt<'ast>],
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: vc_ast::ScopeId,
    return_type: &Type,
) -> &'ast Stmt<'ast> {
    let mut evaluated: Vec<&'ast Stmt<'ast>> = Vec::with_capacity(stmts.len());
    let mut block_returns = false;
    let mut any_changed = stmts.len();
    for (i, s) in stmts.iter().enumerate() {
        let new_s = eval_stmt(s, ctx, scope, return_type);
        if !changed(s, new_s) {
            any_changed -= 1;
        }
        let this_returns = new_s.returns();
        evaluated.push(new_s);
        if this_returns {
            block_returns = true;
            if i + 1 < stmts.len() {
                let next = stmts[i + 1];
                ctx.sink.warn("unreachable code detected", next.token.line, next.token.col, next.token.span);
                any_changed = any_changed.saturating_add(1); // truncation is always a change
            }
            break;
        }
    }

    let rebuilt = if any_changed > 0 || evaluated.len() != stmts.len() {
        ctx.stmt_arena.alloc(Stmt::new(StmtKind::Block(evaluated), stmt.token))
    } else {
        stmt
    };
    rebuilt.set_returns(block_returns);
    rebuilt
}

fn eval_assign<'ast>(
    stmt: &'ast Stmt<'ast>,
    target: &'ast Expr<'ast>,
    value: &'ast Expr<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: vc_ast::ScopeId,
) -> &'ast Stmt<'ast> {
    let new_target = expr_eval::eval_expr(target, ctx, scope);
    let new_value = expr_eval::eval_expr(value, ctx, scope);

    if !is_assignable_target(new_target) {
        ctx.sink.error(
            "left-hand side of an assignment must be a variable or an indexer",
            new_target.token.line,
            new_target.token.col,
            new_target.token.span,
        );
    }

    let target_ty = ty_of(new_target);
    let coerced_value = if target_ty.is_unsupported() {
        new_value
    } else {
        let value_ty = ty_of(new_value);
        if !value_ty.is_unsupported() && !value_ty.is_assignable_to(&target_ty) {
            ctx.sink.error(
                format!("cannot assign '{value_ty}' to '{target_ty}'"),
                new_value.token.line,
                new_value.token.col,
                new_value.token.span,
            );
            new_value
        } else {
            expr_eval::coerce_arg(new_value, &target_ty, ctx)
        }
    };

    let rebuilt = if !std::ptr::eq(target, new_target) || !std::ptr::eq(value, coerced_value) {
        ctx.stmt_arena.alloc(Stmt::new(
            StmtKind::Assign { target: new_target, value: coerced_value },
            stmt.token,
        ))
    } else {
        stmt
    };
    rebuilt.set_returns(false);
    rebuilt
}

fn eval_call_stmt<'ast>(
    stmt: &'ast Stmt<'ast>,
    call: &'ast Expr<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: vc_ast::ScopeId,
) -> &'ast Stmt<'ast> {
    let new_call = expr_eval::eval_expr(call, ctx, scope);
    let rebuilt = if !std::ptr::eq(call, new_call) {
        ctx.stmt_arena.alloc(Stmt::new(StmtKind::Call(new_call), stmt.token))
    } else {
        stmt
    };
    rebuilt.set_returns(false);
    rebuilt
}

fn eval_return<'ast>(
    stmt: &'ast Stmt<'ast>,
    expr: Option<&'ast Expr<'ast>>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: vc_ast::ScopeId,
    return_type: &Type,
) -> &'ast Stmt<'ast> {
    let is_void = return_type.is_void();
    let new_expr = match (expr, is_void) {
        (Some(e), true) => {
            let evaluated = expr_eval::eval_expr(e, ctx, scope);
            ctx.sink.error(
                "a void function cannot return a value",
                evaluated.token.line,
                evaluated.token.col,
                evaluated.token.span,
            );
            Some(evaluated)
        }
        (None, false) => {
            ctx.sink.error(
                format!("missing return value; function must return '{return_type}'"),
                stmt.token.line,
                stmt.token.col,
                stmt.token.span,
            );
            None
        }
        (Some(e), false) => {
            let evaluated = expr_eval::eval_expr(e, ctx, scope);
            let actual = ty_of(evaluated);
            if actual.is_unsupported() || actual.is_assignable_to(return_type) {
                Some(expr_eval::coerce_arg(evaluated, return_type, ctx))
            } else {
                ctx.sink.error(
                    format!("cannot return '{actual}' from a function declared to return '{return_type}'"),
                    evaluated.token.line,
                    evaluated.token.col,
                    evaluated.token.span,
                );
                Some(evaluated)
            }
        }
        (None, true) => None,
    };

    let expr_changed = match (expr, new_expr) {
        (None, None) => false,
        (Some(old), Some(new)) => !std::ptr::eq(old, new),
        _ => true,
    };
    let rebuilt = if expr_changed {
        ctx.stmt_arena.alloc(Stmt::new(StmtKind::Return(new_expr), stmt.token))
    } else {
        stmt
    };
    rebuilt.set_returns(true);
    rebuilt
}

fn eval_if<'ast>(
    stmt: &'ast Stmt<'ast>,
    cond: &'ast Expr<'ast>,
    then_branch: &'ast Stmt<'ast>,
    else_branch: Option<&'ast Stmt<'ast>>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: vc_ast::ScopeId,
    return_type: &Type,
) -> &'ast Stmt<'ast> {
    let new_cond = expr_eval::eval_expr(cond, ctx, scope);
    let cond_ty = ty_of(new_cond);
    if !cond_ty.is_unsupported() && cond_ty != Type::Primitive(Primitive::Bool) {
        ctx.sink.error("an 'if' condition must be a bool", new_cond.token.line, new_cond.token.col, new_cond.token.span);
    }

    let new_then = eval_stmt(then_branch, ctx, scope, return_type);
    let new_else = else_branch.map(|e| eval_stmt(e, ctx, scope, return_type));

    if let Some(value) = dce::constant_bool(new_cond) {
        return if value {
            new_then
        } else if let Some(e) = new_else {
            e
        } else {
            dce::empty_block(ctx.stmt_arena, stmt.token)
        };
    }

    let returns = new_then.returns() && new_else.map(|e| e.returns()).unwrap_or(false);
    let rebuilt = if changed(then_branch, new_then)
        || new_else.map(|e| else_branch.map(|old| changed(old, e)).unwrap_or(true)).unwrap_or(false)
        || !std::ptr::eq(cond, new_cond)
    {
        ctx.stmt_arena.alloc(Stmt::new(
            StmtKind::If { cond: new_cond, then_branch: new_then, else_branch: new_else },
            stmt.token,
        ))
    } else {
        stmt
    };
    rebuilt.set_returns(returns);
    rebuilt
}

fn eval_while<'ast>(
    stmt: &'ast Stmt<'ast>,
    cond: &'ast Expr<'ast>,
    body: &'ast Stmt<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: vc_ast::ScopeId,
    return_type: &Type,
) -> &'ast Stmt<'ast> {
    let new_cond = expr_eval::eval_expr(cond, ctx, scope);
    let cond_ty = ty_of(new_cond);
    if !cond_ty.is_unsupported() && cond_ty != Type::Primitive(Primitive::Bool) {
        ctx.sink.error("a 'while' condition must be a bool", new_cond.token.line, new_cond.token.col, new_cond.token.span);
    }
    let new_body = eval_stmt(body, ctx, scope, return_type);

    if dce::constant_bool(new_cond) == Some(false) {
        return dce::empty_block(ctx.stmt_arena, stmt.token);
    }

    let rebuilt = if !std::ptr::eq(cond, new_cond) || changed(body, new_body) {
        ctx.stmt_arena.alloc(Stmt::new(StmtKind::While { cond: new_cond, body: new_body }, stmt.token))
    } else {
        stmt
    };
    rebuilt.set_returns(false);
    rebuilt
}

fn eval_do_while<'ast>(
    stmt: &'ast Stmt<'ast>,
    body: &'ast Stmt<'ast>,
    cond: &'ast Expr<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: vc_ast::ScopeId,
    return_type: &Type,
) -> &'ast Stmt<'ast> {
    let new_body = eval_stmt(body, ctx, scope, return_type);
    let new_cond = expr_eval::eval_expr(cond, ctx, scope);
    let cond_ty = ty_of(new_cond);
    if !cond_ty.is_unsupported() && cond_ty != Type::Primitive(Primitive::Bool) {
        ctx.sink.error("a 'do...while' condition must be a bool", new_cond.token.line, new_cond.token.col, new_cond.token.span);
    }

    if dce::constant_bool(new_cond) == Some(false) {
        // The body still runs once; the loop wrapper is redundant.
        return new_body;
    }

    let rebuilt = if changed(body, new_body) || !std::ptr::eq(cond, new_cond) {
        ctx.stmt_arena.alloc(Stmt::new(StmtKind::DoWhile { body: new_body, cond: new_cond }, stmt.token))
    } else {
        stmt
    };
    rebuilt.set_returns(new_body.returns());
    rebuilt
}

#[allow(clippy::too_many_arguments)]
fn eval_for<'ast>(
    stmt: &'ast Stmt<'ast>,
    var: vc_base::Symbol,
    initial: &'ast Expr<'ast>,
    bound: &'ast Expr<'ast>,
    direction: ForDirection,
    body: &'ast Stmt<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: vc_ast::ScopeId,
    return_type: &Type,
) -> &'ast Stmt<'ast> {
    let var_ty = match ctx.scopes.resolve_variable(scope, var) {
        Some(v) => v.ty.clone(),
        None => {
            ctx.sink.error("'for' loop variable is not declared", stmt.token.line, stmt.token.col, stmt.token.span);
            Type::unsupported()
        }
    };

    let new_initial = expr_eval::eval_expr(initial, ctx, scope);
    let new_bound = expr_eval::eval_expr(bound, ctx, scope);
    for (label, e) in [("initial", new_initial), ("bound", new_bound)] {
        let ty = ty_of(e);
        if !ty.is_unsupported() && !var_ty.is_unsupported() && !ty.is_assignable_to(&var_ty) {
            ctx.sink.error(
                format!("'for' loop {label} value is not assignable to the loop variable's type"),
                e.token.line,
                e.token.col,
                e.token.span,
            );
        }
    }
    let new_body = eval_stmt(body, ctx, scope, return_type);

    let rebuilt = if !std::ptr::eq(initial, new_initial) || !std::ptr::eq(bound, new_bound) || changed(body, new_body) {
        ctx.stmt_arena.alloc(Stmt::new(
            StmtKind::For { var, initial: new_initial, bound: new_bound, direction, body: new_body },
            stmt.token,
        ))
    } else {
        stmt
    };
    rebuilt.set_returns(false);
    rebuilt
}
