//! Declarations: variables (globals, parameters, locals) and functions.

use vc_lexer::Token;

use crate::scope::ScopeId;
use crate::stmt::Stmt;
use crate::types::Type;

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: vc_base::Symbol,
    pub ty: Type,
    pub token: Token,
}

impl Variable {
    pub fn new(name: vc_base::Symbol, ty: Type, token: Token) -> Self {
        Variable { name, ty, token }
    }
}

#[derive(Debug)]
pub struct Function<'a> {
    pub name: vc_base::Symbol,
    pub return_type: Type,
    pub params: Vec<Variable>,
    /// Locally declared variables, in source order, distinct from `params`.
    /// The local scope's variable map is the lookup index over both; this
    /// list is what the backend walks to allocate local slots.
    pub locals: Vec<Variable>,
    pub body: &'a Stmt<'a>,
    /// The local scope holding `params` plus the function's local
    /// declarations, allocated once the function's signature is known.
    pub local_scope: ScopeId,
    pub token: Token,
}

impl<'a> Function<'a> {
    pub fn new(
        name: vc_base::Symbol,
        return_type: Type,
        params: Vec<Variable>,
        locals: Vec<Variable>,
        body: &'a Stmt<'a>,
        local_scope: ScopeId,
        token: Token,
    ) -> Self {
        Function { name, return_type, params, locals, body, local_scope, token }
    }

    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }
}

/// The root AST node: a program's global variables and function
/// declarations, in source order, plus the top-level statement block. The
/// backend lowers `main_body` into the synthetic entry-point method rather
/// than carrying it in `functions`, since it has no name token of its own.
#[derive(Debug)]
pub struct Program<'a> {
    pub name: vc_base::Symbol,
    pub globals: Vec<Variable>,
    pub functions: Vec<Function<'a>>,
    pub main_body: &'a Stmt<'a>,
    pub token: Token,
}

impl<'a> Program<'a> {
    pub fn new(
        name: vc_base::Symbol,
        globals: Vec<Variable>,
        functions: Vec<Function<'a>>,
        main_body: &'a Stmt<'a>,
        token: Token,
    ) -> Self {
        Program { name, globals, functions, main_body, token }
    }
}
