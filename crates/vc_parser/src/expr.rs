//! Expression grammar, precedence lowest to highest: equality, logical,
//! additive, multiplicative, unary. This reverses the usual C convention —
//! `and`/`or`/`xor` bind *tighter* than `==`/`!=`/`<`/… — which must be
//! preserved rather than "fixed".

use vc_ast::{BinaryOp, Expr, ExprKind, Type, UnaryOp};
use vc_base::Symbol;
use vc_lexer::{ScanError, Token, TokenKind};

use crate::parser::Parser;

impl<'src, 'intern, 'ast> Parser<'src, 'intern, 'ast> {
    pub(crate) fn parse_expr(&mut self) -> Result<&'ast Expr<'ast>, ScanError> {
        self.parse_eq_expr()
    }

    fn parse_eq_expr(&mut self) -> Result<&'ast Expr<'ast>, ScanError> {
        let mut lhs = self.parse_log_expr()?;
        loop {
            let op = match self.la().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Neq,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Leq => BinaryOp::Leq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Geq => BinaryOp::Geq,
                _ => break,
            };
            let op_tok = self.advance()?;
            let rhs = self.parse_log_expr()?;
            lhs = self.alloc_binary(op, lhs, rhs, op_tok);
        }
        Ok(lhs)
    }

    fn parse_log_expr(&mut self) -> Result<&'ast Expr<'ast>, ScanError> {
        let mut lhs = self.parse_add_expr()?;
        loop {
            let op = match self.la().kind {
                TokenKind::And => BinaryOp::And,
                TokenKind::Or => BinaryOp::Or,
                TokenKind::Xor => BinaryOp::Xor,
                _ => break,
            };
            let op_tok = self.advance()?;
            let rhs = self.parse_add_expr()?;
            lhs = self.alloc_binary(op, lhs, rhs, op_tok);
        }
        Ok(lhs)
    }

    fn parse_add_expr(&mut self) -> Result<&'ast Expr<'ast>, ScanError> {
        let mut lhs = self.parse_mul_expr()?;
        loop {
            let op = match self.la().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let op_tok = self.advance()?;
            let rhs = self.parse_mul_expr()?;
            lhs = self.alloc_binary(op, lhs, rhs, op_tok);
        }
        Ok(lhs)
    }

    fn parse_mul_expr(&mut self) -> Result<&'ast Expr<'ast>, ScanError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.la().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            let op_tok = self.advance()?;
            let rhs = self.parse_unary()?;
            lhs = self.alloc_binary(op, lhs, rhs, op_tok);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<&'ast Expr<'ast>, ScanError> {
        match self.la().kind {
            TokenKind::Minus => {
                let tok = self.advance()?;
                let operand = self.parse_unary()?;
                Ok(self.expr_arena.alloc(Expr::new(
                    ExprKind::Unary { op: UnaryOp::Neg, operand },
                    tok,
                )))
            }
            TokenKind::Bang => {
                let tok = self.advance()?;
                let operand = self.parse_unary()?;
                Ok(self.expr_arena.alloc(Expr::new(
                    ExprKind::Unary { op: UnaryOp::Not, operand },
                    tok,
                )))
            }
            TokenKind::LBrace => {
                // `{ int }` Unary — the only explicit cast syntax, always
                // narrowing to `int`.
                let tok = self.advance()?;
                self.expect(TokenKind::KwInt)?;
                self.expect(TokenKind::RBrace)?;
                let operand = self.parse_unary()?;
                Ok(self.expr_arena.alloc(Expr::new(
                    ExprKind::Cast { target: Type::Primitive(vc_ast::Primitive::Int), operand },
                    tok,
                )))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<&'ast Expr<'ast>, ScanError> {
        match self.la().kind {
            TokenKind::IntLiteral
            | TokenKind::RealLiteral
            | TokenKind::StringLiteral
            | TokenKind::True
            | TokenKind::False => {
                let tok = self.advance()?;
                Ok(self.expr_arena.alloc(Expr::new(ExprKind::Constant, tok)))
            }
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Identifier => self.parse_name_expr(),
            _ => {
                let tok = self.la();
                self.sink_mut().syntax_error(
                    format!("expected an expression, found {:?}", tok.kind),
                    tok.line,
                    tok.col,
                    tok.span,
                );
                // Best-effort: treat the unexpected token as an empty
                // constant so the caller gets a node to hang a type on.
                Ok(self.expr_arena.alloc(Expr::new(ExprKind::Constant, tok)))
            }
        }
    }

    /// `ident { '.' ident } [ '(' args ')' | '[' indices ']' ]`
    fn parse_name_expr(&mut self) -> Result<&'ast Expr<'ast>, ScanError> {
        let start = self.la();
        let mut path = vec![start.text];
        self.advance()?;
        while self.at(TokenKind::Dot) {
            self.advance()?;
            let seg = self.expect(TokenKind::Identifier)?;
            path.push(seg.text);
        }

        if self.at(TokenKind::LParen) {
            self.advance()?;
            let args = self.parse_arg_list(TokenKind::RParen)?;
            self.expect(TokenKind::RParen)?;
            return Ok(self.expr_arena.alloc(Expr::new(ExprKind::Call { path, args }, start)));
        }

        if self.at(TokenKind::LBracket) {
            self.advance()?;
            let indices = self.parse_arg_list(TokenKind::RBracket)?;
            self.expect(TokenKind::RBracket)?;
            let base = self.expr_arena.alloc(Expr::new(ExprKind::VariableRef(path), start));
            return Ok(self.expr_arena.alloc(Expr::new(ExprKind::Indexer { base, indices }, start)));
        }

        Ok(self.expr_arena.alloc(Expr::new(ExprKind::VariableRef(path), start)))
    }

    fn parse_arg_list(&mut self, closing: TokenKind) -> Result<Vec<&'ast Expr<'ast>>, ScanError> {
        let mut args = Vec::new();
        if self.at(closing) {
            return Ok(args);
        }
        args.push(self.parse_expr()?);
        while self.at(TokenKind::Comma) {
            self.advance()?;
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }

    fn alloc_binary(
        &self,
        op: BinaryOp,
        left: &'ast Expr<'ast>,
        right: &'ast Expr<'ast>,
        token: Token,
    ) -> &'ast Expr<'ast> {
        self.expr_arena.alloc(Expr::new(ExprKind::Binary { op, left, right }, token))
    }
}

/// Extracts the single identifier a `for`-loop variable must be; used by
/// `stmt::parse_for` to reject anything more complex than a plain name.
pub(crate) fn as_simple_name(expr: &Expr<'_>) -> Option<Symbol> {
    match &expr.kind {
        ExprKind::VariableRef(path) if path.len() == 1 => Some(path[0]),
        _ => None,
    }
}
