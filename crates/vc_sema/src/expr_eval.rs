//! Expression evaluation: name resolution, type checking, implicit-cast
//! insertion, and constant folding, all in one recursive walk.
//!
//! A node's `return_type` is always set in place through its `RefCell`
//! before returning. Replacing a node — folding it to a constant, or
//! eliding a redundant cast — means allocating a new node and handing the
//! caller that reference instead; a parent only reallocates itself when one
//! of its children actually changed (compared by pointer identity), so an
//! evaluation pass that finds nothing to do touches no memory beyond
//! setting already-in-place type fields.

use vc_ast::{BinaryOp, Expr, ExprKind, Literal, Primitive, ScopeId, Type, UnaryOp};

use crate::ctx::EvalCtx;
use crate::fold;
use crate::literal;
use crate::overload::{self, OverloadError};

fn changed<'ast>(old: &'ast Expr<'ast>, new: &'ast Expr<'ast>) -> bool {
    !std::ptr::eq(old, new)
}

fn literal_of<'ast>(expr: &'ast Expr<'ast>) -> Option<&'ast Literal> {
    match &expr.kind {
        ExprKind::Literal(l) => Some(l),
        _ => None,
    }
}

pub(crate) fn ty_of(expr: &Expr<'_>) -> Type {
    expr.return_type().unwrap_or_else(Type::unsupported)
}

pub fn eval_expr<'ast>(expr: &'ast Expr<'ast>, ctx: &mut EvalCtx<'_, 'ast>, scope: ScopeId) -> &'ast Expr<'ast> {
    if expr.is_resolved() {
        return expr;
    }
    match &expr.kind {
        ExprKind::Constant => eval_constant(expr, ctx),
        ExprKind::Literal(_) => {
            // Allocated already-resolved by this same pass; nothing to do.
            expr
        }
        ExprKind::VariableRef(path) => eval_variable_ref(expr, path, ctx, scope),
        ExprKind::Indexer { base, indices } => eval_indexer(expr, *base, indices, ctx, scope),
        ExprKind::Call { path, args } => eval_call(expr, path, args, ctx, scope),
        ExprKind::Unary { op, operand } => eval_unary(expr, *op, *operand, ctx, scope),
        ExprKind::Cast { target, operand } => {
            let target = target.clone();
            eval_cast(expr, &target, *operand, ctx, scope)
        }
        ExprKind::Binary { op, left, right } => eval_binary(expr, *op, *left, *right, ctx, scope),
    }
}

fn eval_constant<'ast>(expr: &'ast Expr<'ast>, ctx: &mut EvalCtx<'_, 'ast>) -> &'ast Expr<'ast> {
    let lit = literal::eval_constant(expr.token, ctx.interner, ctx.sink);
    let ty = lit.type_of();
    let node = ctx.expr_arena.alloc(Expr::new(ExprKind::Literal(lit), expr.token));
    node.set_return_type(ty);
    node
}

fn eval_variable_ref<'ast>(
    expr: &'ast Expr<'ast>,
    path: &[vc_base::Symbol],
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: ScopeId,
) -> &'ast Expr<'ast> {
    let ty = if path.len() == 1 {
        match ctx.scopes.resolve_variable(scope, path[0]) {
            Some(v) => v.ty.clone(),
            None => {
                let name = ctx.interner.resolve(path[0]).to_string();
                ctx.sink.error(format!("unresolved name '{name}'"), expr.token.line, expr.token.col, expr.token.span);
                Type::unsupported()
            }
        }
    } else {
        resolve_qualified_field(path, ctx, expr)
    };
    expr.set_return_type(ty);
    expr
}

fn path_strings(path: &[vc_base::Symbol], ctx: &EvalCtx<'_, '_>) -> Vec<String> {
    path.iter().map(|s| ctx.interner.resolve(*s).to_string()).collect()
}

fn resolve_qualified_field(path: &[vc_base::Symbol], ctx: &mut EvalCtx<'_, '_>, expr: &Expr<'_>) -> Type {
    if let Some(ty) = ctx.scopes.global().cached_field(path) {
        return ty.clone();
    }
    let strings = path_strings(path, ctx);
    let (type_path, member) = strings.split_at(strings.len() - 1);
    let type_path_refs: Vec<&str> = type_path.iter().map(String::as_str).collect();
    let member_name = &member[0];

    let ty = vc_reflect::resolve_type(ctx.providers, &type_path_refs)
        .and_then(|descriptor| descriptor.field(member_name).map(|f| f.ty.clone()))
        .unwrap_or_else(|| {
            ctx.sink.error(
                format!("'{}' has no accessible field", strings.join(".")),
                expr.token.line,
                expr.token.col,
                expr.token.span,
            );
            Type::unsupported()
        });
    ctx.scopes.global_mut().cache_field(path.to_vec(), ty.clone());
    ty
}

fn eval_indexer<'ast>(
    expr: &'ast Expr<'ast>,
    base: &'ast Expr<'ast>,
    indices: &[&'ast Expr<'ast>],
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: ScopeId,
) -> &'ast Expr<'ast> {
    let new_base = eval_expr(base, ctx, scope);
    let new_indices: Vec<&'ast Expr<'ast>> = indices.iter().map(|i| eval_expr(i, ctx, scope)).collect();

    let base_ty = ty_of(new_base);
    let (elem_ty, base_ok) = match &base_ty {
        Type::Array { element, dimensions, .. } if *dimensions == new_indices.len() => {
            (Type::Primitive(*element), true)
        }
        Type::Array { .. } => (Type::unsupported(), false),
        _ => (Type::unsupported(), false),
    };
    if !base_ok && !base_ty.is_unsupported() {
        ctx.sink.error(
            "indexer arity does not match the array's rank, or the base is not an array",
            expr.token.line,
            expr.token.col,
            expr.token.span,
        );
    }
    for idx in &new_indices {
        let idx_ty = ty_of(idx);
        if !idx_ty.is_unsupported() && idx_ty != Type::Primitive(Primitive::Int) {
            ctx.sink.error("array index must be an int", idx.token.line, idx.token.col, idx.token.span);
        }
    }

    let rebuilt = if changed(base, new_base) || new_indices.iter().zip(indices).any(|(n, o)| changed(o, n)) {
        ctx.expr_arena.alloc(Expr::new(
            ExprKind::Indexer { base: new_base, indices: new_indices },
            expr.token,
        ))
    } else {
        expr
    };
    rebuilt.set_return_type(elem_ty);
    rebuilt
}

/// Wraps `arg` in a synthetic `Cast` to `target` when it's merely coercible
/// (not already exactly `target`); returns `arg` unchanged otherwise.
pub(crate) fn coerce_arg<'ast>(arg: &'ast Expr<'ast>, target: &Type, ctx: &mut EvalCtx<'_, 'ast>) -> &'ast Expr<'ast> {
    let actual = ty_of(arg);
    if actual == *target {
        return arg;
    }
    if let Some(lit) = literal_of(arg) {
        if let Some(folded) = fold::fold_cast(target, lit) {
            let node = ctx.expr_arena.alloc(Expr::new(ExprKind::Literal(folded), arg.token));
            node.set_return_type(target.clone());
            return node;
        }
    }
    let node = ctx.expr_arena.alloc(Expr::new(
        ExprKind::Cast { target: target.clone(), operand: arg },
        arg.token,
    ));
    node.set_return_type(target.clone());
    node
}

fn eval_call<'ast>(
    expr: &'ast Expr<'ast>,
    path: &[vc_base::Symbol],
    args: &[&'ast Expr<'ast>],
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: ScopeId,
) -> &'ast Expr<'ast> {
    let evaluated_args: Vec<&'ast Expr<'ast>> = args.iter().map(|a| eval_expr(a, ctx, scope)).collect();
    let arg_types: Vec<Type> = evaluated_args.iter().map(|a| ty_of(a)).collect();

    let resolution = if path.len() == 1 {
        let candidates = ctx.scopes.program().overloads(path[0]).to_vec();
        overload::resolve(&candidates, &arg_types).map(|s| s.clone())
    } else {
        resolve_qualified_call(path, &arg_types, ctx, expr)
    };

    let (final_args, return_type) = match resolution {
        Ok(sig) => {
            let wrapped: Vec<&'ast Expr<'ast>> = evaluated_args
                .iter()
                .zip(&sig.params)
                .map(|(a, target)| coerce_arg(a, target, ctx))
                .collect();
            (wrapped, sig.return_type)
        }
        Err(err) => {
            let name = path_strings(path, ctx).join(".");
            let msg = match err {
                OverloadError::NoCandidates => format!("no matching overload for '{name}'"),
                OverloadError::Ambiguous => format!("ambiguous call to '{name}'"),
            };
            ctx.sink.error(msg, expr.token.line, expr.token.col, expr.token.span);
            (evaluated_args, Type::unsupported())
        }
    };

    let rebuilt = if final_args.iter().zip(args).any(|(n, o)| changed(o, n)) {
        ctx.expr_arena.alloc(Expr::new(
            ExprKind::Call { path: path.to_vec(), args: final_args },
            expr.token,
        ))
    } else {
        expr
    };
    rebuilt.set_return_type(return_type);
    rebuilt
}

fn resolve_qualified_call(
    path: &[vc_base::Symbol],
    arg_types: &[Type],
    ctx: &mut EvalCtx<'_, '_>,
    expr: &Expr<'_>,
) -> Result<vc_ast::Signature, OverloadError> {
    let candidates = if let Some(cached) = ctx.scopes.global().cached_calls(path) {
        cached.to_vec()
    } else {
        let strings = path_strings(path, ctx);
        let (type_path, member) = strings.split_at(strings.len() - 1);
        let type_path_refs: Vec<&str> = type_path.iter().map(String::as_str).collect();
        let member_name = &member[0];
        let sigs = vc_reflect::resolve_type(ctx.providers, &type_path_refs)
            .map(|descriptor| {
                descriptor
                    .methods_named(member_name)
                    .filter(|m| m.params.iter().all(|p| !p.is_unsupported()))
                    .map(|m| {
                        let name_sym = ctx.interner.intern(&m.name);
                        vc_ast::Signature::new(name_sym, m.params.clone(), m.return_type.clone())
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        ctx.scopes.global_mut().cache_calls(path.to_vec(), sigs.clone());
        sigs
    };
    if candidates.is_empty() {
        let name = path_strings(path, ctx).join(".");
        ctx.sink.error(format!("'{name}' is not a known external member"), expr.token.line, expr.token.col, expr.token.span);
        return Err(OverloadError::NoCandidates);
    }
    overload::resolve(&candidates, arg_types).cloned()
}

fn eval_unary<'ast>(
    expr: &'ast Expr<'ast>,
    op: UnaryOp,
    operand: &'ast Expr<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: ScopeId,
) -> &'ast Expr<'ast> {
    let new_operand = eval_expr(operand, ctx, scope);
    let operand_ty = ty_of(new_operand);

    let ok = match op {
        UnaryOp::Neg => matches!(operand_ty, Type::Primitive(Primitive::Int) | Type::Primitive(Primitive::Double)),
        UnaryOp::Not => operand_ty == Type::Primitive(Primitive::Bool),
    };
    if !ok && !operand_ty.is_unsupported() {
        ctx.sink.error(
            format!("operator does not apply to type '{operand_ty}'"),
            expr.token.line,
            expr.token.col,
            expr.token.span,
        );
    }
    let result_ty = if ok { operand_ty.clone() } else { Type::unsupported() };

    if ok {
        if let Some(lit) = literal_of(new_operand) {
            if let Some(folded) = fold::fold_unary(op, lit) {
                let node = ctx.expr_arena.alloc(Expr::new(ExprKind::Literal(folded), expr.token));
                node.set_return_type(result_ty);
                return node;
            }
        }
    }

    let rebuilt = if changed(operand, new_operand) {
        ctx.expr_arena.alloc(Expr::new(ExprKind::Unary { op, operand: new_operand }, expr.token))
    } else {
        expr
    };
    rebuilt.set_return_type(result_ty);
    rebuilt
}

fn eval_cast<'ast>(
    expr: &'ast Expr<'ast>,
    target: &Type,
    operand: &'ast Expr<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: ScopeId,
) -> &'ast Expr<'ast> {
    let new_operand = eval_expr(operand, ctx, scope);
    let operand_ty = ty_of(new_operand);

    if operand_ty == *target {
        ctx.sink.warn(
            format!("redundant cast to '{target}'"),
            expr.token.line,
            expr.token.col,
            expr.token.span,
        );
        return new_operand;
    }

    let narrowing_ok = matches!(
        (&operand_ty, target),
        (Type::Primitive(Primitive::Double), Type::Primitive(Primitive::Int))
    );
    if !operand_ty.is_assignable_to(target) && !narrowing_ok {
        if !operand_ty.is_unsupported() {
            ctx.sink.error(
                format!("cannot cast '{operand_ty}' to '{target}'"),
                expr.token.line,
                expr.token.col,
                expr.token.span,
            );
        }
        let rebuilt = if changed(operand, new_operand) {
            ctx.expr_arena.alloc(Expr::new(
                ExprKind::Cast { target: target.clone(), operand: new_operand },
                expr.token,
            ))
        } else {
            expr
        };
        rebuilt.set_return_type(Type::unsupported());
        return rebuilt;
    }

    if let Some(lit) = literal_of(new_operand) {
        if let Some(folded) = fold::fold_cast(target, lit) {
            let node = ctx.expr_arena.alloc(Expr::new(ExprKind::Literal(folded), expr.token));
            node.set_return_type(target.clone());
            return node;
        }
    }

    let rebuilt = if changed(operand, new_operand) {
        ctx.expr_arena.alloc(Expr::new(
            ExprKind::Cast { target: target.clone(), operand: new_operand },
            expr.token,
        ))
    } else {
        expr
    };
    rebuilt.set_return_type(target.clone());
    rebuilt
}

fn eval_binary<'ast>(
    expr: &'ast Expr<'ast>,
    op: BinaryOp,
    left: &'ast Expr<'ast>,
    right: &'ast Expr<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
    scope: ScopeId,
) -> &'ast Expr<'ast> {
    let new_left = eval_expr(left, ctx, scope);
    let new_right = eval_expr(right, ctx, scope);
    let lt = ty_of(new_left);
    let rt = ty_of(new_right);

    if lt.is_unsupported() || rt.is_unsupported() {
        let rebuilt = rebuild_binary(expr, op, left, new_left, right, new_right, ctx);
        rebuilt.set_return_type(Type::unsupported());
        return rebuilt;
    }

    // Implicit widening on the narrower side when the two differ.
    let (eff_left, eff_right, common) = if lt == rt {
        (new_left, new_right, lt.clone())
    } else if lt.widens_to(&rt) {
        (coerce_arg(new_left, &rt, ctx), new_right, rt.clone())
    } else if rt.widens_to(&lt) {
        (new_left, coerce_arg(new_right, &lt, ctx), lt.clone())
    } else {
        ctx.sink.error(
            format!("incompatible types '{lt}' and '{rt}'"),
            expr.token.line,
            expr.token.col,
            expr.token.span,
        );
        let rebuilt = rebuild_binary(expr, op, left, new_left, right, new_right, ctx);
        rebuilt.set_return_type(Type::unsupported());
        return rebuilt;
    };

    let admissible = is_admissible(op, &common);
    if !admissible {
        ctx.sink.error(
            format!("operator '{op}' does not apply to '{common}'"),
            expr.token.line,
            expr.token.col,
            expr.token.span,
        );
        let rebuilt = rebuild_binary(expr, op, left, eff_left, right, eff_right, ctx);
        rebuilt.set_return_type(Type::unsupported());
        return rebuilt;
    }

    let result_ty = if op.is_comparison() || op.is_logical() { Type::Primitive(Primitive::Bool) } else { common };

    if let (Some(ll), Some(rl)) = (literal_of(eff_left), literal_of(eff_right)) {
        if let Some(folded) = fold::fold_binary(op, ll, rl, ctx.interner) {
            let node = ctx.expr_arena.alloc(Expr::new(ExprKind::Literal(folded), expr.token));
            node.set_return_type(result_ty);
            return node;
        }
    }

    let rebuilt = if changed(left, eff_left) || changed(right, eff_right) {
        ctx.expr_arena.alloc(Expr::new(ExprKind::Binary { op, left: eff_left, right: eff_right }, expr.token))
    } else {
        expr
    };
    rebuilt.set_return_type(result_ty);
    rebuilt
}

fn rebuild_binary<'ast>(
    expr: &'ast Expr<'ast>,
    op: BinaryOp,
    old_left: &'ast Expr<'ast>,
    new_left: &'ast Expr<'ast>,
    old_right: &'ast Expr<'ast>,
    new_right: &'ast Expr<'ast>,
    ctx: &mut EvalCtx<'_, 'ast>,
) -> &'ast Expr<'ast> {
    if changed(old_left, new_left) || changed(old_right, new_right) {
        ctx.expr_arena.alloc(Expr::new(ExprKind::Binary { op, left: new_left, right: new_right }, expr.token))
    } else {
        expr
    }
}

fn is_admissible(op: BinaryOp, ty: &Type) -> bool {
    use Primitive::*;
    match op {
        BinaryOp::Add => matches!(ty, Type::Primitive(Int) | Type::Primitive(Double) | Type::Primitive(String)),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Lt | BinaryOp::Leq | BinaryOp::Gt | BinaryOp::Geq => {
            matches!(ty, Type::Primitive(Int) | Type::Primitive(Double))
        }
        BinaryOp::Rem => matches!(ty, Type::Primitive(Int)),
        BinaryOp::Eq | BinaryOp::Neq => matches!(ty, Type::Primitive(_)),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => matches!(ty, Type::Primitive(Bool)),
    }
}
