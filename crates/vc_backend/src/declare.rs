//! Pass one of the backend: declares the container type, every global
//! field, every user function's method handle, and the synthetic `Main`
//! entry point, before any body is emitted. Emission (pass two) can then
//! freely reference a call target regardless of declaration order in the
//! source.

use vc_ast::{Program, Type};
use vc_base::{Interner, Symbol};

use crate::assembler::{Assembler, MethodSig};

/// The names `declare` hands back so `emit` can address the same methods
/// the assembler now has declared.
pub struct DeclaredEntryPoints {
    pub main: Symbol,
    /// Set only when the program declares at least one array-typed global,
    /// which needs a `Newobj` to instantiate before anything can read it.
    pub static_initializer: Option<Symbol>,
}

/// Declares `program`'s globals, static methods, and globals-holder fields,
/// and interns the synthetic entry-point name (and, if any global is
/// array-typed, the synthetic static-initializer name).
pub fn declare<A: Assembler>(program: &Program<'_>, interner: &mut Interner, assembler: &mut A) -> DeclaredEntryPoints {
    assembler.declare_type(program.name);

    for global in &program.globals {
        assembler.declare_field(global.name, global.ty.clone());
    }

    for function in &program.functions {
        assembler.declare_method(MethodSig {
            name: function.name,
            params: function.param_types(),
            return_type: function.return_type.clone(),
        });
    }

    let main_name = interner.intern("Main");
    assembler.declare_method(MethodSig { name: main_name, params: Vec::new(), return_type: Type::void() });

    let static_initializer = if program.globals.iter().any(|g| matches!(g.ty, Type::Array { .. })) {
        let cctor_name = interner.intern(".cctor");
        assembler.declare_method(MethodSig { name: cctor_name, params: Vec::new(), return_type: Type::void() });
        assembler.set_static_initializer(cctor_name);
        Some(cctor_name)
    } else {
        None
    };

    DeclaredEntryPoints { main: main_name, static_initializer }
}
