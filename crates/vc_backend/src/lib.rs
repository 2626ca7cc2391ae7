//! # vc-backend
//!
//! The backend: lowers a fully evaluated `vc_ast::Program` to a stack-machine
//! bytecode stream and hands it to an injectable `Assembler`. Declaration
//! (pass one) and emission (pass two) are split the same way the frontend
//! splits scope registration from evaluation, so a call to a function
//! declared later in the source still resolves without a forward-reference
//! pass of its own.

mod assembler;
mod declare;
mod emit;
mod file_assembler;
mod instr;

pub use assembler::{Assembler, MethodSig};
pub use file_assembler::FileAssembler;
pub use instr::{Instr, Label};

use vc_ast::Program;
use vc_base::Interner;

/// Declares then emits `program` against `assembler`, finishing with the
/// entry point set to the synthetic `Main` method built from the top-level
/// statement block. Also declares and emits a synthetic static initializer
/// when the program has at least one array-typed global.
pub fn compile<A: Assembler>(program: &Program<'_>, interner: &mut Interner, assembler: &mut A) {
    log::info!("compiling program {}", interner.resolve(program.name));
    let entry_points = declare::declare(program, interner, assembler);
    emit::emit_program(program, entry_points.main, entry_points.static_initializer, assembler);
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_ast::{Stmt, StmtKind};
    use vc_base::{Arena, Span};
    use vc_lexer::{Token, TokenKind};

    fn tok() -> Token {
        Token::new(TokenKind::Identifier, vc_base::Symbol::EMPTY, Span::new(0, 1), 1, 1)
    }

    #[test]
    fn compile_writes_an_artifact_for_an_empty_program() {
        let stmt_arena: Arena<Stmt> = Arena::new();
        let body = stmt_arena.alloc(Stmt::new(StmtKind::Block(Vec::new()), tok()));
        let mut interner = Interner::new();
        let name = interner.intern("P");
        let program = Program::new(name, Vec::new(), Vec::new(), body, tok());

        let dir = tempfile::tempdir().unwrap();
        let mut assembler = FileAssembler::new(dir.path());
        compile(&program, &mut interner, &mut assembler);
        let path = assembler.finish(&interner).unwrap();
        assert!(std::path::Path::new(&path).exists());
    }
}
