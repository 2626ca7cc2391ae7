//! # vc-parser
//!
//! An LL(1) recursive-descent parser over `vc-lexer`'s token stream,
//! producing a `vc_ast::Program` plus the scope tree built alongside it.
//! Syntax errors accumulate in a `vc_base::Sink` rather than aborting
//! parsing; only a scanner-level fatal error (`ScanError`) stops the parse
//! outright.

mod decl;
mod expr;
mod parser;
mod stmt;

pub use parser::Parser;

use vc_ast::{Expr, Program, ScopeTable, Stmt};
use vc_base::{Arena, Sink};
use vc_lexer::{ScanError, Scanner};

/// Parses a complete program, returning the AST, the scope tree built
/// during parsing, and the diagnostic sink (which may hold syntax errors
/// even on a successful return — check `Sink::has_errors` before emitting).
pub fn parse<'src, 'intern, 'ast>(
    scanner: Scanner<'src, 'intern>,
    expr_arena: &'ast Arena<Expr<'ast>>,
    stmt_arena: &'ast Arena<Stmt<'ast>>,
    libraries: Vec<String>,
) -> Result<(Program<'ast>, ScopeTable, Sink), ScanError> {
    let mut parser = Parser::new(scanner, expr_arena, stmt_arena, libraries)?;
    let program = parser.parse_program()?;
    let (scopes, sink) = parser.into_parts();
    Ok((program, scopes, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_ast::StmtKind;
    use vc_base::Interner;

    fn parse_source(src: &str) -> (Program<'static>, ScopeTable, Sink) {
        let expr_arena: &'static Arena<Expr<'static>> = Box::leak(Box::new(Arena::new()));
        let stmt_arena: &'static Arena<Stmt<'static>> = Box::leak(Box::new(Arena::new()));
        let interner: &'static mut Interner = Box::leak(Box::new(Interner::new()));
        let source: &'static str = Box::leak(src.to_string().into_boxed_str());
        let scanner = Scanner::new(source, interner).expect("valid source");
        parse(scanner, expr_arena, stmt_arena, vec![]).expect("no fatal scan error")
    }

    #[test]
    fn minimal_program_parses_with_no_errors() {
        let (program, _scopes, sink) = parse_source("program P; begin end");
        assert!(!sink.has_errors());
        assert!(program.functions.is_empty());
        assert!(program.globals.is_empty());
        match &program.main_body.kind {
            StmtKind::Block(stmts) => assert!(stmts.is_empty()),
            other => panic!("expected an empty block, got {other:?}"),
        }
    }

    #[test]
    fn function_with_params_and_return_type_registers_signature() {
        let (program, scopes, sink) =
            parse_source("program P; function f(int a, double b) : int begin return a; end begin end");
        assert!(!sink.has_errors());
        assert_eq!(program.functions.len(), 1);
        let f = &program.functions[0];
        assert_eq!(f.params.len(), 2);
        assert_eq!(scopes.program().overloads(f.name).len(), 1);
    }

    #[test]
    fn global_var_decls_register_in_program_scope() {
        let (program, scopes, sink) = parse_source("program P; var int x, y; double z; begin end");
        assert!(!sink.has_errors());
        assert_eq!(program.globals.len(), 3);
        assert!(scopes.program().variable(program.globals[2].name).is_some());
    }

    #[test]
    fn operator_precedence_nests_logical_inside_equality() {
        let (program, _scopes, sink) =
            parse_source("program P; var bool r; begin r = 1 == 1 and 2 == 2; end");
        assert!(!sink.has_errors());
        match &program.main_body.kind {
            StmtKind::Block(stmts) => assert_eq!(stmts.len(), 1),
            _ => panic!(),
        }
    }

    #[test]
    fn array_type_parses_rank_from_bracket_count() {
        let (program, _scopes, sink) = parse_source("program P; var int[3,4] a; begin end");
        assert!(!sink.has_errors());
        assert!(program.globals[0].ty.is_array());
        assert_eq!(program.globals[0].ty.rank(), 2);
    }

    #[test]
    fn for_loop_with_non_identifier_variable_is_a_semantic_error() {
        // The grammar parses `Expr` in the variable slot; anything other
        // than a plain identifier is rejected once it's clear it can't name
        // a variable to increment.
        let (_program, _scopes, sink) = parse_source("program P; var int i; begin for 1 = 1 to 3 do i = i; end");
        assert!(sink.has_errors());
    }
}
