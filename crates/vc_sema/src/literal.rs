//! Parses a `Constant` node's source token into a typed `Literal`.
//!
//! The scanner has already validated lexical shape (digit groups, escape
//! sequences); this stage does the actual numeric conversion and is where a
//! malformed numeral becomes a semantic error rather than a lexical one.
//! Per the specification's defaulting rule, any parse failure yields a
//! zero/false value of the expected kind rather than propagating an error
//! out of evaluation.

use vc_ast::Literal;
use vc_base::{Interner, Sink};
use vc_lexer::{Token, TokenKind};

pub fn eval_constant(token: Token, interner: &Interner, sink: &mut Sink) -> Literal {
    let text = interner.resolve(token.text);
    match token.kind {
        TokenKind::IntLiteral => Literal::Int(parse_int(text, token, sink)),
        TokenKind::RealLiteral => Literal::Double(parse_double(text, token, sink)),
        TokenKind::StringLiteral => Literal::Str(token.text),
        TokenKind::True => Literal::Bool(true),
        TokenKind::False => Literal::Bool(false),
        other => {
            sink.error(format!("'{other:?}' is not a constant token"), token.line, token.col, token.span);
            Literal::Bool(false)
        }
    }
}

fn parse_int(text: &str, token: Token, sink: &mut Sink) -> i64 {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else {
        text.parse::<i64>()
    };
    parsed.unwrap_or_else(|_| {
        sink.error(format!("'{text}' is not a valid integer literal"), token.line, token.col, token.span);
        0
    })
}

fn parse_double(text: &str, token: Token, sink: &mut Sink) -> f64 {
    let trimmed = text.strip_suffix('D').or_else(|| text.strip_suffix('d')).unwrap_or(text);
    trimmed.parse::<f64>().unwrap_or_else(|_| {
        sink.error(format!("'{text}' is not a valid real literal"), token.line, token.col, token.span);
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_base::{Interner, Span};

    fn tok(kind: TokenKind, text: vc_base::Symbol) -> Token {
        Token::new(kind, text, Span::new(0, 1), 1, 1)
    }

    #[test]
    fn parses_decimal_and_hex_ints() {
        let mut interner = Interner::new();
        let mut sink = Sink::new();
        let dec = interner.intern("42");
        let hex = interner.intern("0x2A");
        assert_eq!(eval_constant(tok(TokenKind::IntLiteral, dec), &interner, &mut sink), Literal::Int(42));
        assert_eq!(eval_constant(tok(TokenKind::IntLiteral, hex), &interner, &mut sink), Literal::Int(42));
        assert!(!sink.has_errors());
    }

    #[test]
    fn malformed_int_defaults_to_zero_and_errors() {
        let mut interner = Interner::new();
        let mut sink = Sink::new();
        let bad = interner.intern("12x");
        assert_eq!(eval_constant(tok(TokenKind::IntLiteral, bad), &interner, &mut sink), Literal::Int(0));
        assert!(sink.has_errors());
    }

    #[test]
    fn double_suffix_is_stripped() {
        let mut interner = Interner::new();
        let mut sink = Sink::new();
        let d = interner.intern("1.5D");
        assert_eq!(eval_constant(tok(TokenKind::RealLiteral, d), &interner, &mut sink), Literal::Double(1.5));
    }

    #[test]
    fn booleans_come_from_token_kind_not_text() {
        let interner = Interner::new();
        let mut sink = Sink::new();
        assert_eq!(
            eval_constant(tok(TokenKind::True, vc_base::Symbol::EMPTY), &interner, &mut sink),
            Literal::Bool(true)
        );
    }
}
