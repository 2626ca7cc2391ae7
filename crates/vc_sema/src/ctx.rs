//! The bundle of mutable state every evaluation function threads through:
//! the scope tree, the reflective providers, the interner (needed to
//! resolve constant tokens and to intern folded strings), the arenas new
//! nodes are allocated from, and the diagnostic sink.

use vc_ast::{Expr, ScopeTable, Stmt};
use vc_base::{Arena, Interner, Sink};
use vc_reflect::TypeProvider;

pub struct EvalCtx<'a, 'ast> {
    pub scopes: &'a mut ScopeTable,
    pub providers: &'a [Box<dyn TypeProvider>],
    pub interner: &'a mut Interner,
    pub expr_arena: &'ast Arena<Expr<'ast>>,
    pub stmt_arena: &'ast Arena<Stmt<'ast>>,
    pub sink: &'a mut Sink,
}
