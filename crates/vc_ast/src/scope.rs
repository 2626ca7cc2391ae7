//! The scope chain.
//!
//! Global/Program/Local scopes are variants of one tagged `ScopeKind` rather
//! than a trait object hierarchy — there are exactly three kinds, the set is
//! closed, and a `match` reads better here than a vtable. Scopes are stored
//! in a flat `ScopeTable` and referenced by `ScopeId`, so the parent chain is
//! a sequence of integer lookups instead of a borrowed pointer graph; that
//! sidesteps the lifetime friction a `parent: &'a Scope<'a>` field would
//! otherwise impose on the evaluator, which needs to mutate a scope's memo
//! tables while other code still holds a reference to the chain.

use std::collections::HashMap;

use vc_base::Symbol;

use crate::decl::Variable;
use crate::signature::Signature;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// The root scope: library references and the memoized result of asking a
/// `TypeProvider` (in `vc-reflect`) about a qualified name. The provider
/// calls themselves live in the evaluator, which owns both a `ScopeTable`
/// and a list of providers; `GlobalScope` only holds the cache and the
/// library list so `vc-ast` doesn't need to depend on `vc-reflect`.
#[derive(Debug, Default)]
pub struct GlobalScope {
    pub libraries: Vec<String>,
    field_cache: HashMap<Vec<Symbol>, Type>,
    call_cache: HashMap<Vec<Symbol>, Vec<Signature>>,
}

impl GlobalScope {
    pub fn new(libraries: Vec<String>) -> Self {
        GlobalScope { libraries, field_cache: HashMap::new(), call_cache: HashMap::new() }
    }

    pub fn cached_field(&self, path: &[Symbol]) -> Option<&Type> {
        self.field_cache.get(path)
    }

    pub fn cache_field(&mut self, path: Vec<Symbol>, ty: Type) {
        self.field_cache.insert(path, ty);
    }

    pub fn cached_calls(&self, path: &[Symbol]) -> Option<&[Signature]> {
        self.call_cache.get(path).map(Vec::as_slice)
    }

    pub fn cache_calls(&mut self, path: Vec<Symbol>, sigs: Vec<Signature>) {
        self.call_cache.insert(path, sigs);
    }
}

/// Holds the program's top-level variables and the overload sets of its
/// declared functions, keyed by name.
#[derive(Debug, Default)]
pub struct ProgramScope {
    pub variables: HashMap<Symbol, Variable>,
    pub functions: HashMap<Symbol, Vec<Signature>>,
}

impl ProgramScope {
    pub fn new() -> Self {
        ProgramScope::default()
    }

    pub fn declare_variable(&mut self, var: Variable) {
        self.variables.insert(var.name, var);
    }

    pub fn declare_function(&mut self, sig: Signature) {
        self.functions.entry(sig.name).or_default().push(sig);
    }

    pub fn variable(&self, name: Symbol) -> Option<&Variable> {
        self.variables.get(&name)
    }

    pub fn overloads(&self, name: Symbol) -> &[Signature] {
        self.functions.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A function body's parameters and local variables.
#[derive(Debug)]
pub struct LocalScope {
    pub parent: ScopeId,
    pub variables: HashMap<Symbol, Variable>,
}

impl LocalScope {
    pub fn new(parent: ScopeId) -> Self {
        LocalScope { parent, variables: HashMap::new() }
    }

    pub fn declare(&mut self, var: Variable) {
        self.variables.insert(var.name, var);
    }

    pub fn variable(&self, name: Symbol) -> Option<&Variable> {
        self.variables.get(&name)
    }
}

#[derive(Debug)]
pub enum ScopeKind {
    Global(GlobalScope),
    Program(ProgramScope),
    Local(LocalScope),
}

/// Flat storage for every scope in a compilation; scope 0 is always the
/// global scope.
#[derive(Debug)]
pub struct ScopeTable {
    scopes: Vec<ScopeKind>,
}

impl ScopeTable {
    pub const GLOBAL: ScopeId = ScopeId(0);
    pub const PROGRAM: ScopeId = ScopeId(1);

    /// Builds a table pre-seeded with the global and program scopes, the
    /// two that always exist in a V compilation.
    pub fn new(libraries: Vec<String>) -> Self {
        ScopeTable {
            scopes: vec![
                ScopeKind::Global(GlobalScope::new(libraries)),
                ScopeKind::Program(ProgramScope::new()),
            ],
        }
    }

    pub fn alloc_local(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeKind::Local(LocalScope::new(parent)));
        id
    }

    pub fn get(&self, id: ScopeId) -> &ScopeKind {
        &self.scopes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut ScopeKind {
        &mut self.scopes[id.0 as usize]
    }

    pub fn global(&self) -> &GlobalScope {
        match self.get(Self::GLOBAL) {
            ScopeKind::Global(g) => g,
            _ => unreachable!("scope 0 is always global"),
        }
    }

    pub fn global_mut(&mut self) -> &mut GlobalScope {
        match self.get_mut(Self::GLOBAL) {
            ScopeKind::Global(g) => g,
            _ => unreachable!("scope 0 is always global"),
        }
    }

    pub fn program(&self) -> &ProgramScope {
        match self.get(Self::PROGRAM) {
            ScopeKind::Program(p) => p,
            _ => unreachable!("scope 1 is always program"),
        }
    }

    pub fn program_mut(&mut self) -> &mut ProgramScope {
        match self.get_mut(Self::PROGRAM) {
            ScopeKind::Program(p) => p,
            _ => unreachable!("scope 1 is always program"),
        }
    }

    pub fn local(&self, id: ScopeId) -> &LocalScope {
        match self.get(id) {
            ScopeKind::Local(l) => l,
            _ => panic!("scope {id:?} is not a local scope"),
        }
    }

    pub fn local_mut(&mut self, id: ScopeId) -> &mut LocalScope {
        match self.get_mut(id) {
            ScopeKind::Local(l) => l,
            _ => panic!("scope {id:?} is not a local scope"),
        }
    }

    /// Resolves a plain (unqualified) identifier by walking local -> program.
    /// Global scope is reached only through dotted `VariableRef` paths, not
    /// through this chain, since it resolves fully-qualified names only.
    pub fn resolve_variable(&self, from: ScopeId, name: Symbol) -> Option<&Variable> {
        if let ScopeKind::Local(local) = self.get(from) {
            if let Some(v) = local.variable(name) {
                return Some(v);
            }
        }
        self.program().variable(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;
    use vc_base::{Interner, Span};
    use vc_lexer::{Token, TokenKind};

    fn dummy_token() -> Token {
        Token::new(TokenKind::Identifier, Symbol::EMPTY, Span::new(0, 1), 1, 1)
    }

    #[test]
    fn local_scope_shadows_program_scope() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut table = ScopeTable::new(vec![]);
        table.program_mut().declare_variable(Variable::new(
            x,
            Type::Primitive(Primitive::Int),
            dummy_token(),
        ));
        let local_id = table.alloc_local(ScopeTable::PROGRAM);
        table.local_mut(local_id).declare(Variable::new(
            x,
            Type::Primitive(Primitive::Double),
            dummy_token(),
        ));

        let resolved = table.resolve_variable(local_id, x).unwrap();
        assert_eq!(resolved.ty, Type::Primitive(Primitive::Double));
    }

    #[test]
    fn falls_back_to_program_scope_when_not_local() {
        let mut interner = Interner::new();
        let g = interner.intern("g");
        let mut table = ScopeTable::new(vec![]);
        table.program_mut().declare_variable(Variable::new(
            g,
            Type::Primitive(Primitive::Bool),
            dummy_token(),
        ));
        let local_id = table.alloc_local(ScopeTable::PROGRAM);
        assert!(table.resolve_variable(local_id, g).is_some());
    }

    #[test]
    fn global_scope_caches_field_lookups() {
        let mut table = ScopeTable::new(vec!["System".to_string()]);
        let mut interner = Interner::new();
        let path = vec![interner.intern("System"), interner.intern("Console")];
        assert!(table.global().cached_field(&path).is_none());
        table.global_mut().cache_field(path.clone(), Type::unsupported());
        assert_eq!(table.global().cached_field(&path), Some(&Type::unsupported()));
    }

    #[test]
    fn overload_sets_accumulate_per_name() {
        let mut interner = Interner::new();
        let f = interner.intern("f");
        let mut table = ScopeTable::new(vec![]);
        table.program_mut().declare_function(Signature::new(
            f,
            vec![Type::Primitive(Primitive::Int)],
            Type::void(),
        ));
        table.program_mut().declare_function(Signature::new(
            f,
            vec![Type::Primitive(Primitive::Double)],
            Type::void(),
        ));
        assert_eq!(table.program().overloads(f).len(), 2);
    }
}
