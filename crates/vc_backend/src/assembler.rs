//! The injectable bytecode-assembler boundary: the backend's `declare`/
//! `emit` passes drive any `impl Assembler`, so tests can stub it to assert
//! exact instruction sequences without a real metadata writer, the same way
//! `vc_reflect::TypeProvider` abstracts reading external types.

use vc_ast::Type;
use vc_base::{Interner, Symbol};

use crate::instr::Instr;

/// A declared method's full signature, the shape `declare_method` hands the
/// assembler ahead of `emit` supplying its body.
#[derive(Debug, Clone)]
pub struct MethodSig {
    pub name: Symbol,
    pub params: Vec<Type>,
    pub return_type: Type,
}

pub trait Assembler {
    /// Declares the container assembly named after the program.
    fn declare_type(&mut self, name: Symbol);

    /// Declares a global static method handle ahead of any call site that
    /// references it.
    fn declare_method(&mut self, sig: MethodSig);

    /// Declares a public static field on the globals holder type.
    fn declare_field(&mut self, name: Symbol, ty: Type);

    /// Emits one method's complete instruction stream, including any local
    /// slot / array-instantiation prologue the emitter inserted ahead of the
    /// statement body.
    fn emit(&mut self, method: Symbol, body: Vec<Instr>);

    /// Marks `method` as the program's entry point.
    fn set_entry_point(&mut self, method: Symbol);

    /// Marks `method` as the globals holder's static initializer, run before
    /// the entry point. Only called when the program declares at least one
    /// array-typed global.
    fn set_static_initializer(&mut self, method: Symbol);

    /// Finalizes and persists the artifact, returning the path written.
    /// Takes the interner by reference rather than storing it, so a caller
    /// can still hold the interner mutably while `declare`/`emit` run.
    fn finish(&mut self, interner: &Interner) -> std::io::Result<String>;
}
