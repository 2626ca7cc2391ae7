//! Declaration grammar: `Program`, `FuncDecl`, `VarDecls`, `Type`.
//!
//! Parsing only builds declaration nodes and inserts them into their
//! enclosing scope — no name resolution or typing happens here, that's the
//! evaluator's job.

use vc_ast::{Function, Primitive, Program, ScopeTable, Signature, Type, Variable};
use vc_lexer::{ScanError, TokenKind};

use crate::parser::Parser;

impl<'src, 'intern, 'ast> Parser<'src, 'intern, 'ast> {
    pub fn parse_program(&mut self) -> Result<Program<'ast>, ScanError> {
        let tok = self.expect(TokenKind::Program)?;
        let name_tok = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Semi)?;

        let mut globals = Vec::new();
        let mut functions = Vec::new();

        loop {
            match self.la().kind {
                TokenKind::Function => functions.push(self.parse_func_decl()?),
                TokenKind::Var => {
                    let mut vars = self.parse_var_decls()?;
                    for v in &vars {
                        self.scopes.program_mut().declare_variable(v.clone());
                    }
                    globals.append(&mut vars);
                }
                _ => break,
            }
        }

        let main_body = self.parse_block()?;
        Ok(Program::new(name_tok.text, globals, functions, main_body, tok))
    }

    fn parse_func_decl(&mut self) -> Result<Function<'ast>, ScanError> {
        let tok = self.expect(TokenKind::Function)?;
        let name_tok = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::LParen)?;

        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let ty = self.parse_type()?;
                let pname = self.expect(TokenKind::Identifier)?;
                params.push(Variable::new(pname.text, ty, pname));
                if self.at(TokenKind::Comma) {
                    self.advance()?;
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let return_type = if self.at(TokenKind::Colon) {
            self.advance()?;
            self.parse_type()?
        } else {
            Type::void()
        };

        let local_scope = self.scopes.alloc_local(ScopeTable::PROGRAM);
        for p in &params {
            self.scopes.local_mut(local_scope).declare(p.clone());
        }

        let mut locals = Vec::new();
        while self.at(TokenKind::Var) {
            let mut vars = self.parse_var_decls()?;
            for v in &vars {
                self.scopes.local_mut(local_scope).declare(v.clone());
            }
            locals.append(&mut vars);
        }

        let body = self.parse_block()?;

        let param_types: Vec<Type> = params.iter().map(|p| p.ty.clone()).collect();
        self.scopes.program_mut().declare_function(Signature::new(
            name_tok.text,
            param_types,
            return_type.clone(),
        ));

        Ok(Function::new(name_tok.text, return_type, params, locals, body, local_scope, tok))
    }

    /// `'var' Type ident {',' ident} ';' { Type ident {',' ident} ';' }` —
    /// after the leading `var`, each further group is recognized purely by
    /// the next token being a primitive-type keyword, with no repeated
    /// `var`.
    fn parse_var_decls(&mut self) -> Result<Vec<Variable>, ScanError> {
        self.expect(TokenKind::Var)?;
        let mut out = Vec::new();
        while self.is_type_start() {
            let ty = self.parse_type()?;
            loop {
                let name_tok = self.expect(TokenKind::Identifier)?;
                out.push(Variable::new(name_tok.text, ty.clone(), name_tok));
                if self.at(TokenKind::Comma) {
                    self.advance()?;
                    continue;
                }
                break;
            }
            self.expect(TokenKind::Semi)?;
        }
        Ok(out)
    }

    fn is_type_start(&self) -> bool {
        self.at_any(&[TokenKind::KwInt, TokenKind::KwDouble, TokenKind::KwString, TokenKind::KwBool])
    }

    /// `Type = Primitive [ '[' int { ',' int } ']' ]`
    fn parse_type(&mut self) -> Result<Type, ScanError> {
        let element = self.parse_primitive()?;
        if !self.at(TokenKind::LBracket) {
            return Ok(Type::Primitive(element));
        }
        self.advance()?;
        let mut sizes = vec![self.parse_array_size()?];
        while self.at(TokenKind::Comma) {
            self.advance()?;
            sizes.push(self.parse_array_size()?);
        }
        self.expect(TokenKind::RBracket)?;
        let dimensions = sizes.len();
        Ok(Type::Array { element, dimensions, sizes })
    }

    fn parse_array_size(&mut self) -> Result<usize, ScanError> {
        let tok = self.expect(TokenKind::IntLiteral)?;
        let text = self.resolve(tok.text);
        Ok(text.parse::<usize>().unwrap_or_else(|_| {
            self.sink.error("array size must be a non-negative integer", tok.line, tok.col, tok.span);
            0
        }))
    }

    fn parse_primitive(&mut self) -> Result<Primitive, ScanError> {
        let tok = self.la();
        let prim = match tok.kind {
            TokenKind::KwInt => Primitive::Int,
            TokenKind::KwDouble => Primitive::Double,
            TokenKind::KwString => Primitive::String,
            TokenKind::KwBool => Primitive::Bool,
            _ => {
                self.sink.syntax_error(
                    format!("expected a type, found {:?}", tok.kind),
                    tok.line,
                    tok.col,
                    tok.span,
                );
                return Ok(Primitive::Unsupported);
            }
        };
        self.advance()?;
        Ok(prim)
    }
}
