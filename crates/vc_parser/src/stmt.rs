//! Statement grammar: `Stmt = Block | CallOrAssign | Return | If | While |
//! DoWhile | For`.

use vc_ast::{ForDirection, Stmt, StmtKind};
use vc_lexer::{ScanError, TokenKind};

use crate::expr::as_simple_name;
use crate::parser::Parser;

/// Tokens that can start a statement, used to resynchronize after a
/// syntax error inside one.
const STMT_FOLLOW: &[TokenKind] = &[
    TokenKind::Begin,
    TokenKind::Return,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Do,
    TokenKind::For,
    TokenKind::End,
    TokenKind::Eof,
];

impl<'src, 'intern, 'ast> Parser<'src, 'intern, 'ast> {
    pub(crate) fn parse_stmt(&mut self) -> Result<&'ast Stmt<'ast>, ScanError> {
        match self.la().kind {
            TokenKind::Begin => self.parse_block(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            _ => self.parse_call_or_assign(),
        }
    }

    pub(crate) fn parse_block(&mut self) -> Result<&'ast Stmt<'ast>, ScanError> {
        let tok = self.expect(TokenKind::Begin)?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::End) && !self.at(TokenKind::Eof) {
            match self.parse_stmt() {
                Ok(s) => stmts.push(s),
                Err(e) => return Err(e),
            }
        }
        self.expect(TokenKind::End)?;
        Ok(self.stmt_arena.alloc(Stmt::new(StmtKind::Block(stmts), tok)))
    }

    fn parse_call_or_assign(&mut self) -> Result<&'ast Stmt<'ast>, ScanError> {
        let tok = self.la();
        let lhs = match self.parse_expr() {
            Ok(e) => e,
            Err(e) => return Err(e),
        };
        let kind = if self.at(TokenKind::Assign) {
            self.advance()?;
            let rhs = self.parse_expr()?;
            StmtKind::Assign { target: lhs, value: rhs }
        } else {
            StmtKind::Call(lhs)
        };
        if self.expect(TokenKind::Semi).is_err() {
            self.synchronize(STMT_FOLLOW)?;
        }
        Ok(self.stmt_arena.alloc(Stmt::new(kind, tok)))
    }

    fn parse_return(&mut self) -> Result<&'ast Stmt<'ast>, ScanError> {
        let tok = self.expect(TokenKind::Return)?;
        let value = if self.at(TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        self.expect(TokenKind::Semi)?;
        Ok(self.stmt_arena.alloc(Stmt::new(StmtKind::Return(value), tok)))
    }

    fn parse_if(&mut self) -> Result<&'ast Stmt<'ast>, ScanError> {
        let tok = self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = self.parse_stmt()?;
        let else_branch = if self.at(TokenKind::Else) {
            self.advance()?;
            Some(self.parse_stmt()?)
        } else {
            None
        };
        Ok(self.stmt_arena.alloc(Stmt::new(StmtKind::If { cond, then_branch, else_branch }, tok)))
    }

    fn parse_while(&mut self) -> Result<&'ast Stmt<'ast>, ScanError> {
        let tok = self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_stmt()?;
        Ok(self.stmt_arena.alloc(Stmt::new(StmtKind::While { cond, body }, tok)))
    }

    fn parse_do_while(&mut self) -> Result<&'ast Stmt<'ast>, ScanError> {
        let tok = self.expect(TokenKind::Do)?;
        let body = self.parse_stmt()?;
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semi)?;
        Ok(self.stmt_arena.alloc(Stmt::new(StmtKind::DoWhile { body, cond }, tok)))
    }

    fn parse_for(&mut self) -> Result<&'ast Stmt<'ast>, ScanError> {
        let tok = self.expect(TokenKind::For)?;
        let var_expr = self.parse_expr()?;
        let var = as_simple_name(var_expr).unwrap_or_else(|| {
            self.sink_mut().error(
                "for-loop variable must be a simple identifier",
                tok.line,
                tok.col,
                tok.span,
            );
            vc_base::Symbol::EMPTY
        });
        self.expect(TokenKind::Assign)?;
        let initial = self.parse_expr()?;
        let direction = if self.at(TokenKind::To) {
            self.advance()?;
            ForDirection::To
        } else {
            self.expect(TokenKind::DownTo)?;
            ForDirection::DownTo
        };
        let bound = self.parse_expr()?;
        self.expect(TokenKind::Do)?;
        let body = self.parse_stmt()?;
        Ok(self
            .stmt_arena
            .alloc(Stmt::new(StmtKind::For { var, initial, bound, direction, body }, tok)))
    }
}
