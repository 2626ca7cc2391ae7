//! Token management: the one-token-lookahead core every grammar rule in
//! `decl`, `stmt`, and `expr` is implemented against.

use vc_ast::{Expr, ScopeTable, Stmt};
use vc_base::{Arena, Sink, Span};
use vc_lexer::{ScanError, Scanner, Token, TokenKind};

/// An LL(1) recursive-descent parser: `la` is the unconsumed lookahead
/// token, `prev` is the last token actually consumed. Error recovery
/// synchronizes to a caller-supplied follow set rather than aborting, so
/// one syntax error doesn't prevent discovering the next.
pub struct Parser<'src, 'intern, 'ast> {
    scanner: Scanner<'src, 'intern>,
    la: Token,
    prev: Token,
    pub(crate) expr_arena: &'ast Arena<Expr<'ast>>,
    pub(crate) stmt_arena: &'ast Arena<Stmt<'ast>>,
    pub(crate) scopes: ScopeTable,
    pub(crate) sink: Sink,
}

impl<'src, 'intern, 'ast> Parser<'src, 'intern, 'ast> {
    pub fn new(
        mut scanner: Scanner<'src, 'intern>,
        expr_arena: &'ast Arena<Expr<'ast>>,
        stmt_arena: &'ast Arena<Stmt<'ast>>,
        libraries: Vec<String>,
    ) -> Result<Self, ScanError> {
        let la = scanner.scan()?;
        Ok(Parser {
            scanner,
            prev: la,
            la,
            expr_arena,
            stmt_arena,
            scopes: ScopeTable::new(libraries),
            sink: Sink::new(),
        })
    }

    pub fn into_parts(self) -> (ScopeTable, Sink) {
        (self.scopes, self.sink)
    }

    pub(crate) fn sink_mut(&mut self) -> &mut Sink {
        &mut self.sink
    }

    pub(crate) fn la(&self) -> Token {
        self.la
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.la.kind == kind
    }

    pub(crate) fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.la.kind)
    }

    /// Consumes `la` unconditionally and returns the token consumed.
    pub(crate) fn advance(&mut self) -> Result<Token, ScanError> {
        let consumed = self.la;
        self.prev = consumed;
        self.la = self.scanner.scan()?;
        self.sink.note_token_consumed();
        Ok(consumed)
    }

    /// Consumes `la` if it matches `kind`; otherwise reports a syntax error
    /// at the current position and returns the (wrong) token anyway so
    /// callers that don't need recovery can keep building a best-effort
    /// tree.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ScanError> {
        if self.la.kind == kind {
            return self.advance();
        }
        self.sink.syntax_error(
            format!("expected {:?}, found {:?}", kind, self.la.kind),
            self.la.line,
            self.la.col,
            self.la.span,
        );
        Ok(self.la)
    }

    /// Skips tokens until one is in `follow` (or EOF), used after a
    /// reported syntax error to resynchronize before continuing.
    pub(crate) fn synchronize(&mut self, follow: &[TokenKind]) -> Result<(), ScanError> {
        while !self.at_any(follow) && !self.at(TokenKind::Eof) {
            self.advance()?;
        }
        Ok(())
    }

    pub(crate) fn span_from(&self, start: Token) -> Span {
        start.span.merge(self.prev.span)
    }

    /// Resolves a token's interned text, for grammar positions (array
    /// sizes) that need a literal's source text during parsing itself
    /// rather than deferring to evaluation.
    pub(crate) fn resolve(&self, sym: vc_base::Symbol) -> &str {
        self.scanner.interner().resolve(sym)
    }
}
