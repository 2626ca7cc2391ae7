//! Pass two of the backend: lowers an evaluated function or the top-level
//! statement block into a flat `Instr` stream, one method body at a time.
//!
//! Every expression and statement reaching this module has already gone
//! through `vc_sema::evaluate`: every `Expr::return_type` is resolved, every
//! `Cast`/overload has been inserted, and constant folding has already
//! replaced anything foldable with a `Literal`. Emission never re-derives a
//! type or re-resolves an overload; it only turns the already-decided shape
//! of the tree into instructions.

use std::collections::HashMap;

use vc_ast::{BinaryOp, Expr, ExprKind, ForDirection, Function, Literal, Primitive, Program, Stmt, StmtKind, Type, UnaryOp, Variable};
use vc_base::Symbol;

use crate::assembler::Assembler;
use crate::instr::{self, Instr, Label};

#[derive(Debug, Clone, Copy)]
enum Slot {
    Arg(u32),
    Local(u32),
}

/// Maps a function's parameters and locals to their argument/local slot
/// indices. A name absent from this table is a program-scope global and is
/// addressed by `Ldsfld`/`Stsfld` instead.
struct VarSlots(HashMap<Symbol, Slot>);

impl VarSlots {
    fn for_function(function: &Function<'_>) -> Self {
        let mut map = HashMap::new();
        for (i, p) in function.params.iter().enumerate() {
            map.insert(p.name, Slot::Arg(i as u32));
        }
        for (i, l) in function.locals.iter().enumerate() {
            map.insert(l.name, Slot::Local(i as u32));
        }
        VarSlots(map)
    }

    fn top_level() -> Self {
        VarSlots(HashMap::new())
    }

    fn get(&self, name: Symbol) -> Option<Slot> {
        self.0.get(&name).copied()
    }
}

struct EmitCtx<'a> {
    slots: &'a VarSlots,
    next_label: u32,
}

impl<'a> EmitCtx<'a> {
    fn alloc_label(&mut self) -> Label {
        let id = self.next_label;
        self.next_label += 1;
        Label(id)
    }
}

/// Emits every user function, the globals static initializer if any
/// array-typed global needs one, then the synthetic `Main` entry point built
/// from the program's top-level statement block.
pub fn emit_program<A: Assembler>(
    program: &Program<'_>,
    main_name: Symbol,
    static_initializer_name: Option<Symbol>,
    assembler: &mut A,
) {
    log::debug!("emitting {} function bod(y/ies)", program.functions.len());
    for function in &program.functions {
        emit_function(function, assembler);
    }
    if let Some(cctor_name) = static_initializer_name {
        emit_static_initializer(&program.globals, cctor_name, assembler);
    }
    emit_main(program.main_body, main_name, assembler);
    assembler.set_entry_point(main_name);
}

/// One `Newobj` + `Stsfld` pair per array-typed global, mirroring
/// `emit_locals_prologue`'s instantiation of array-typed locals.
fn emit_static_initializer<A: Assembler>(globals: &[Variable], cctor_name: Symbol, assembler: &mut A) {
    let mut instrs = Vec::new();
    for global in globals {
        if let Type::Array { dimensions, sizes, .. } = &global.ty {
            for size in sizes {
                instrs.push(instr::const_int(*size as i64));
            }
            instrs.push(Instr::Newobj { rank: *dimensions });
            instrs.push(Instr::Stsfld(global.name));
        }
    }
    instrs.push(Instr::Ret);
    assembler.emit(cctor_name, instrs);
}

fn emit_function<A: Assembler>(function: &Function<'_>, assembler: &mut A) {
    let slots = VarSlots::for_function(function);
    let mut ctx = EmitCtx { slots: &slots, next_label: 0 };
    let mut instrs = Vec::new();
    emit_locals_prologue(&function.locals, &mut instrs);
    emit_stmt(function.body, &mut ctx, &mut instrs);
    assembler.emit(function.name, instrs);
}

fn emit_main<A: Assembler>(main_body: &Stmt<'_>, main_name: Symbol, assembler: &mut A) {
    let slots = VarSlots::top_level();
    let mut ctx = EmitCtx { slots: &slots, next_label: 0 };
    let mut instrs = Vec::new();
    emit_stmt(main_body, &mut ctx, &mut instrs);
    assembler.emit(main_name, instrs);
}

/// One `Newobj` + `Stloc` pair per array-typed local, ahead of the body,
/// mirroring the array-instantiation prologue declaration emits for
/// array-typed globals via the static initializer.
fn emit_locals_prologue(locals: &[vc_ast::Variable], instrs: &mut Vec<Instr>) {
    for (i, local) in locals.iter().enumerate() {
        if let Type::Array { dimensions, sizes, .. } = &local.ty {
            for size in sizes {
                instrs.push(instr::const_int(*size as i64));
            }
            instrs.push(Instr::Newobj { rank: *dimensions });
            instrs.push(Instr::Stloc(i as u32));
        }
    }
}

fn emit_load_var(name: Symbol, ctx: &EmitCtx<'_>, instrs: &mut Vec<Instr>) {
    match ctx.slots.get(name) {
        Some(Slot::Arg(i)) => instrs.push(Instr::Ldarg(i)),
        Some(Slot::Local(i)) => instrs.push(Instr::Ldloc(i)),
        None => instrs.push(Instr::Ldsfld(name)),
    }
}

fn emit_store_var(name: Symbol, ctx: &EmitCtx<'_>, instrs: &mut Vec<Instr>) {
    match ctx.slots.get(name) {
        Some(Slot::Arg(i)) => instrs.push(Instr::Starg(i)),
        Some(Slot::Local(i)) => instrs.push(Instr::Stloc(i)),
        None => instrs.push(Instr::Stsfld(name)),
    }
}

fn emit_assign(target: &Expr<'_>, value: &Expr<'_>, ctx: &mut EmitCtx<'_>, instrs: &mut Vec<Instr>) {
    match &target.kind {
        ExprKind::VariableRef(path) if path.len() == 1 => {
            emit_expr(value, ctx, instrs);
            emit_store_var(path[0], ctx, instrs);
        }
        ExprKind::VariableRef(path) => {
            emit_expr(value, ctx, instrs);
            instrs.push(Instr::StExternalField(path.clone()));
        }
        ExprKind::Indexer { base, indices } => {
            emit_expr(base, ctx, instrs);
            for idx in indices {
                emit_expr(idx, ctx, instrs);
            }
            emit_expr(value, ctx, instrs);
            instrs.push(Instr::CallArraySet);
        }
        // Evaluation rejects every other shape as an assignment target.
        _ => unreachable!("assignment target is always a variable or an indexer"),
    }
}

fn emit_expr(expr: &Expr<'_>, ctx: &mut EmitCtx<'_>, instrs: &mut Vec<Instr>) {
    match &expr.kind {
        ExprKind::Constant => unreachable!("evaluation always folds Constant to Literal first"),
        ExprKind::Literal(lit) => emit_literal(lit, instrs),
        ExprKind::VariableRef(path) => {
            if path.len() == 1 {
                emit_load_var(path[0], ctx, instrs);
            } else {
                instrs.push(Instr::LdExternalField(path.clone()));
            }
        }
        ExprKind::Indexer { base, indices } => {
            emit_expr(base, ctx, instrs);
            for idx in indices {
                emit_expr(idx, ctx, instrs);
            }
            instrs.push(Instr::CallArrayGet);
        }
        ExprKind::Call { path, args } => {
            for a in args {
                emit_expr(a, ctx, instrs);
            }
            if path.len() == 1 {
                instrs.push(Instr::Call(path[0], args.len()));
            } else {
                instrs.push(Instr::CallExternal(path.clone(), args.len()));
            }
        }
        ExprKind::Unary { op, operand } => {
            emit_expr(operand, ctx, instrs);
            match op {
                UnaryOp::Neg => instrs.push(Instr::Neg),
                UnaryOp::Not => {
                    instrs.push(Instr::LdcI4S(0));
                    instrs.push(Instr::Ceq);
                }
            }
        }
        ExprKind::Cast { target, operand } => {
            emit_expr(operand, ctx, instrs);
            match target {
                Type::Primitive(Primitive::Double) => instrs.push(Instr::ConvR8),
                Type::Primitive(Primitive::Int) => instrs.push(Instr::ConvI4),
                // Every other cast target is rejected by evaluation before
                // this tree is ever reached.
                _ => {}
            }
        }
        ExprKind::Binary { op, left, right } => emit_binary(*op, left, right, ctx, instrs),
    }
}

fn emit_literal(lit: &Literal, instrs: &mut Vec<Instr>) {
    match lit {
        Literal::Int(n) => instrs.push(instr::const_int(*n)),
        Literal::Double(d) => instrs.push(Instr::LdcR8(*d)),
        Literal::Str(s) => instrs.push(Instr::LdStr(*s)),
        Literal::Bool(b) => instrs.push(instr::const_bool(*b)),
    }
}

fn emit_binary(op: BinaryOp, left: &Expr<'_>, right: &Expr<'_>, ctx: &mut EmitCtx<'_>, instrs: &mut Vec<Instr>) {
    match op {
        BinaryOp::And => {
            let short_circuit = ctx.alloc_label();
            let end = ctx.alloc_label();
            emit_expr(left, ctx, instrs);
            instrs.push(Instr::Brfalse(short_circuit));
            emit_expr(right, ctx, instrs);
            instrs.push(Instr::Br(end));
            instrs.push(Instr::Mark(short_circuit));
            instrs.push(Instr::LdcI4S(0));
            instrs.push(Instr::Mark(end));
        }
        BinaryOp::Or => {
            let short_circuit = ctx.alloc_label();
            let end = ctx.alloc_label();
            emit_expr(left, ctx, instrs);
            instrs.push(Instr::Brtrue(short_circuit));
            emit_expr(right, ctx, instrs);
            instrs.push(Instr::Br(end));
            instrs.push(Instr::Mark(short_circuit));
            instrs.push(Instr::LdcI4S(1));
            instrs.push(Instr::Mark(end));
        }
        BinaryOp::Xor => {
            emit_expr(left, ctx, instrs);
            emit_expr(right, ctx, instrs);
            instrs.push(Instr::Xor);
        }
        BinaryOp::Add => {
            emit_expr(left, ctx, instrs);
            emit_expr(right, ctx, instrs);
            if left.return_type() == Some(Type::Primitive(Primitive::String)) {
                instrs.push(Instr::CallStringConcat);
            } else {
                instrs.push(Instr::Add);
            }
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            emit_expr(left, ctx, instrs);
            emit_expr(right, ctx, instrs);
            instrs.push(match op {
                BinaryOp::Sub => Instr::Sub,
                BinaryOp::Mul => Instr::Mul,
                BinaryOp::Div => Instr::Div,
                BinaryOp::Rem => Instr::Rem,
                _ => unreachable!(),
            });
        }
        BinaryOp::Eq | BinaryOp::Neq => {
            emit_expr(left, ctx, instrs);
            emit_expr(right, ctx, instrs);
            instrs.push(Instr::Ceq);
            if op == BinaryOp::Neq {
                instrs.push(Instr::LdcI4S(0));
                instrs.push(Instr::Ceq);
            }
        }
        BinaryOp::Lt | BinaryOp::Geq => {
            emit_expr(left, ctx, instrs);
            emit_expr(right, ctx, instrs);
            instrs.push(Instr::Clt);
            if op == BinaryOp::Geq {
                instrs.push(Instr::LdcI4S(0));
                instrs.push(Instr::Ceq);
            }
        }
        BinaryOp::Gt | BinaryOp::Leq => {
            emit_expr(left, ctx, instrs);
            emit_expr(right, ctx, instrs);
            instrs.push(Instr::Cgt);
            if op == BinaryOp::Leq {
                instrs.push(Instr::LdcI4S(0));
                instrs.push(Instr::Ceq);
            }
        }
    }
}

fn emit_stmt(stmt: &Stmt<'_>, ctx: &mut EmitCtx<'_>, instrs: &mut Vec<Instr>) {
    match &stmt.kind {
        StmtKind::Block(stmts) => {
            for s in stmts {
                emit_stmt(s, ctx, instrs);
            }
        }
        StmtKind::Assign { target, value } => emit_assign(target, value, ctx, instrs),
        StmtKind::Call(call) => {
            emit_expr(call, ctx, instrs);
            if call.return_type() != Some(Type::void()) {
                instrs.push(Instr::Pop);
            }
        }
        StmtKind::Return(expr) => {
            if let Some(e) = expr {
                emit_expr(e, ctx, instrs);
            }
            instrs.push(Instr::Ret);
        }
        StmtKind::If { cond, then_branch, else_branch } => {
            emit_if(cond, then_branch, *else_branch, ctx, instrs);
        }
        StmtKind::While { cond, body } => emit_while(cond, body, ctx, instrs),
        StmtKind::DoWhile { body, cond } => emit_do_while(body, cond, ctx, instrs),
        StmtKind::For { var, initial, bound, direction, body } => {
            emit_for(*var, initial, bound, *direction, body, ctx, instrs);
        }
    }
}

fn emit_if(
    cond: &Expr<'_>,
    then_branch: &Stmt<'_>,
    else_branch: Option<&Stmt<'_>>,
    ctx: &mut EmitCtx<'_>,
    instrs: &mut Vec<Instr>,
) {
    let else_label = ctx.alloc_label();
    emit_expr(cond, ctx, instrs);
    instrs.push(Instr::Brfalse(else_label));
    emit_stmt(then_branch, ctx, instrs);
    match else_branch {
        Some(else_branch) => {
            let end_label = ctx.alloc_label();
            instrs.push(Instr::Br(end_label));
            instrs.push(Instr::Mark(else_label));
            emit_stmt(else_branch, ctx, instrs);
            instrs.push(Instr::Mark(end_label));
        }
        None => instrs.push(Instr::Mark(else_label)),
    }
}

fn emit_while(cond: &Expr<'_>, body: &Stmt<'_>, ctx: &mut EmitCtx<'_>, instrs: &mut Vec<Instr>) {
    let loop_label = ctx.alloc_label();
    let end_label = ctx.alloc_label();
    instrs.push(Instr::Mark(loop_label));
    emit_expr(cond, ctx, instrs);
    instrs.push(Instr::Brfalse(end_label));
    emit_stmt(body, ctx, instrs);
    instrs.push(Instr::Br(loop_label));
    instrs.push(Instr::Mark(end_label));
}

fn emit_do_while(body: &Stmt<'_>, cond: &Expr<'_>, ctx: &mut EmitCtx<'_>, instrs: &mut Vec<Instr>) {
    let loop_label = ctx.alloc_label();
    instrs.push(Instr::Mark(loop_label));
    emit_stmt(body, ctx, instrs);
    emit_expr(cond, ctx, instrs);
    instrs.push(Instr::Brtrue(loop_label));
}

/// `assign initial; loop: load var; load final; Bgt/Blt end; body;
/// var := var +/- 1; Br loop; end:` — the exact order scenario 5 pins down.
#[allow(clippy::too_many_arguments)]
fn emit_for(
    var: Symbol,
    initial: &Expr<'_>,
    bound: &Expr<'_>,
    direction: ForDirection,
    body: &Stmt<'_>,
    ctx: &mut EmitCtx<'_>,
    instrs: &mut Vec<Instr>,
) {
    let loop_label = ctx.alloc_label();
    let end_label = ctx.alloc_label();

    emit_expr(initial, ctx, instrs);
    emit_store_var(var, ctx, instrs);

    instrs.push(Instr::Mark(loop_label));
    emit_load_var(var, ctx, instrs);
    emit_expr(bound, ctx, instrs);
    instrs.push(match direction {
        ForDirection::To => Instr::Bgt(end_label),
        ForDirection::DownTo => Instr::Blt(end_label),
    });

    emit_stmt(body, ctx, instrs);

    emit_load_var(var, ctx, instrs);
    instrs.push(Instr::LdcI4S(1));
    instrs.push(match direction {
        ForDirection::To => Instr::Add,
        ForDirection::DownTo => Instr::Sub,
    });
    emit_store_var(var, ctx, instrs);

    instrs.push(Instr::Br(loop_label));
    instrs.push(Instr::Mark(end_label));
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_base::{Arena, Interner, Span};
    use vc_lexer::{Token, TokenKind};

    fn tok() -> Token {
        Token::new(TokenKind::Identifier, Symbol::EMPTY, Span::new(0, 1), 1, 1)
    }

    fn resolved<'a>(expr_arena: &'a Arena<Expr<'a>>, kind: ExprKind<'a>, ty: Type) -> &'a Expr<'a> {
        let e = expr_arena.alloc(Expr::new(kind, tok()));
        e.set_return_type(ty);
        e
    }

    /// Scenario 5: `for i = 1 to 3 do i = i;` lowers to the exact instruction
    /// order the spec pins down.
    #[test]
    fn for_loop_lowers_to_the_documented_instruction_order() {
        let expr_arena: Arena<Expr> = Arena::new();
        let stmt_arena: Arena<Stmt> = Arena::new();
        let mut interner = Interner::new();
        let i = interner.intern("i");

        let initial = resolved(&expr_arena, ExprKind::Literal(Literal::Int(1)), Type::Primitive(Primitive::Int));
        let bound = resolved(&expr_arena, ExprKind::Literal(Literal::Int(3)), Type::Primitive(Primitive::Int));
        let i_ref_target = resolved(&expr_arena, ExprKind::VariableRef(vec![i]), Type::Primitive(Primitive::Int));
        let i_ref_value = resolved(&expr_arena, ExprKind::VariableRef(vec![i]), Type::Primitive(Primitive::Int));
        let assign = stmt_arena.alloc(Stmt::new(
            StmtKind::Assign { target: i_ref_target, value: i_ref_value },
            tok(),
        ));
        let body = stmt_arena.alloc(Stmt::new(StmtKind::Block(vec![assign]), tok()));

        let slots = VarSlots::top_level();
        let mut ctx = EmitCtx { slots: &slots, next_label: 0 };
        let mut instrs = Vec::new();
        emit_for(i, initial, bound, ForDirection::To, body, &mut ctx, &mut instrs);

        assert_eq!(
            instrs,
            vec![
                Instr::LdcI4S(1),
                Instr::Stsfld(i),
                Instr::Mark(Label(0)),
                Instr::Ldsfld(i),
                Instr::LdcI4S(3),
                Instr::Bgt(Label(1)),
                Instr::Ldsfld(i),
                Instr::Stsfld(i),
                Instr::Ldsfld(i),
                Instr::LdcI4S(1),
                Instr::Add,
                Instr::Stsfld(i),
                Instr::Br(Label(0)),
                Instr::Mark(Label(1)),
            ]
        );
    }

    #[test]
    fn string_addition_lowers_to_the_runtime_concat_call() {
        let expr_arena: Arena<Expr> = Arena::new();
        let mut interner = Interner::new();
        let s = interner.intern("hi");
        let left = resolved(&expr_arena, ExprKind::Literal(Literal::Str(s)), Type::Primitive(Primitive::String));
        let right = resolved(&expr_arena, ExprKind::Literal(Literal::Str(s)), Type::Primitive(Primitive::String));

        let slots = VarSlots::top_level();
        let mut ctx = EmitCtx { slots: &slots, next_label: 0 };
        let mut instrs = Vec::new();
        emit_binary(BinaryOp::Add, left, right, &mut ctx, &mut instrs);

        assert_eq!(instrs, vec![Instr::LdStr(s), Instr::LdStr(s), Instr::CallStringConcat]);
    }

    #[test]
    fn not_equal_is_synthesized_from_ceq_and_zero_compare() {
        let expr_arena: Arena<Expr> = Arena::new();
        let left = resolved(&expr_arena, ExprKind::Literal(Literal::Int(1)), Type::Primitive(Primitive::Int));
        let right = resolved(&expr_arena, ExprKind::Literal(Literal::Int(2)), Type::Primitive(Primitive::Int));

        let slots = VarSlots::top_level();
        let mut ctx = EmitCtx { slots: &slots, next_label: 0 };
        let mut instrs = Vec::new();
        emit_binary(BinaryOp::Neq, left, right, &mut ctx, &mut instrs);

        assert_eq!(
            instrs,
            vec![instr::const_int(1), instr::const_int(2), Instr::Ceq, Instr::LdcI4S(0), Instr::Ceq]
        );
    }

    #[test]
    fn call_used_as_a_statement_pops_a_non_void_result() {
        let expr_arena: Arena<Expr> = Arena::new();
        let stmt_arena: Arena<Stmt> = Arena::new();
        let mut interner = Interner::new();
        let f = interner.intern("f");
        let call = resolved(&expr_arena, ExprKind::Call { path: vec![f], args: vec![] }, Type::Primitive(Primitive::Int));
        let stmt = stmt_arena.alloc(Stmt::new(StmtKind::Call(call), tok()));

        let slots = VarSlots::top_level();
        let mut ctx = EmitCtx { slots: &slots, next_label: 0 };
        let mut instrs = Vec::new();
        emit_stmt(stmt, &mut ctx, &mut instrs);

        assert_eq!(instrs, vec![Instr::Call(f, 0), Instr::Pop]);
    }

    #[test]
    fn void_call_used_as_a_statement_is_not_popped() {
        let expr_arena: Arena<Expr> = Arena::new();
        let stmt_arena: Arena<Stmt> = Arena::new();
        let mut interner = Interner::new();
        let f = interner.intern("f");
        let call = resolved(&expr_arena, ExprKind::Call { path: vec![f], args: vec![] }, Type::void());
        let stmt = stmt_arena.alloc(Stmt::new(StmtKind::Call(call), tok()));

        let slots = VarSlots::top_level();
        let mut ctx = EmitCtx { slots: &slots, next_label: 0 };
        let mut instrs = Vec::new();
        emit_stmt(stmt, &mut ctx, &mut instrs);

        assert_eq!(instrs, vec![Instr::Call(f, 0)]);
    }
}
