//! Constant folding: per-primitive arithmetic over already-evaluated
//! `Literal` operands. Each function returns `None` when the operands
//! don't support the operation (a division by zero, a combination the
//! type checker should never have admitted) so the caller can fall back to
//! leaving the node unfolded rather than panicking.

use vc_ast::{BinaryOp, Literal, Type, UnaryOp};
use vc_base::Interner;

pub fn fold_unary(op: UnaryOp, operand: &Literal) -> Option<Literal> {
    match (op, operand) {
        (UnaryOp::Neg, Literal::Int(a)) => Some(Literal::Int(-a)),
        (UnaryOp::Neg, Literal::Double(a)) => Some(Literal::Double(-a)),
        (UnaryOp::Not, Literal::Bool(a)) => Some(Literal::Bool(!a)),
        _ => None,
    }
}

pub fn fold_binary(op: BinaryOp, left: &Literal, right: &Literal, interner: &mut Interner) -> Option<Literal> {
    use Literal::*;
    match (op, left, right) {
        (BinaryOp::Add, Int(a), Int(b)) => Some(Int(a + b)),
        (BinaryOp::Add, Double(a), Double(b)) => Some(Double(a + b)),
        (BinaryOp::Add, Str(a), Str(b)) => {
            let joined = format!("{}{}", interner.resolve(*a), interner.resolve(*b));
            Some(Str(interner.intern(&joined)))
        }
        (BinaryOp::Sub, Int(a), Int(b)) => Some(Int(a - b)),
        (BinaryOp::Sub, Double(a), Double(b)) => Some(Double(a - b)),
        (BinaryOp::Mul, Int(a), Int(b)) => Some(Int(a * b)),
        (BinaryOp::Mul, Double(a), Double(b)) => Some(Double(a * b)),
        (BinaryOp::Div, Int(a), Int(b)) if *b != 0 => Some(Int(a / b)),
        (BinaryOp::Div, Double(a), Double(b)) => Some(Double(a / b)),
        (BinaryOp::Rem, Int(a), Int(b)) if *b != 0 => Some(Int(a % b)),

        (BinaryOp::Eq, Int(a), Int(b)) => Some(Bool(a == b)),
        (BinaryOp::Eq, Double(a), Double(b)) => Some(Bool(a == b)),
        (BinaryOp::Eq, Bool(a), Bool(b)) => Some(Bool(a == b)),
        (BinaryOp::Eq, Str(a), Str(b)) => Some(Bool(interner.resolve(*a) == interner.resolve(*b))),
        (BinaryOp::Neq, a, b) => fold_binary(BinaryOp::Eq, a, b, interner).map(negate),

        (BinaryOp::Lt, Int(a), Int(b)) => Some(Bool(a < b)),
        (BinaryOp::Lt, Double(a), Double(b)) => Some(Bool(a < b)),
        (BinaryOp::Leq, Int(a), Int(b)) => Some(Bool(a <= b)),
        (BinaryOp::Leq, Double(a), Double(b)) => Some(Bool(a <= b)),
        (BinaryOp::Gt, Int(a), Int(b)) => Some(Bool(a > b)),
        (BinaryOp::Gt, Double(a), Double(b)) => Some(Bool(a > b)),
        (BinaryOp::Geq, Int(a), Int(b)) => Some(Bool(a >= b)),
        (BinaryOp::Geq, Double(a), Double(b)) => Some(Bool(a >= b)),

        (BinaryOp::And, Bool(a), Bool(b)) => Some(Bool(*a && *b)),
        (BinaryOp::Or, Bool(a), Bool(b)) => Some(Bool(*a || *b)),
        (BinaryOp::Xor, Bool(a), Bool(b)) => Some(Bool(a != b)),

        _ => None,
    }
}

fn negate(lit: Literal) -> Literal {
    match lit {
        Literal::Bool(b) => Literal::Bool(!b),
        other => other,
    }
}

/// Converts a literal to `target` when the conversion is the implicit
/// `Int -> Double` widening or the one explicit `Double -> Int` narrowing;
/// `None` otherwise (including when no conversion is needed — the caller
/// handles the identity case itself so it can emit the "redundant cast"
/// warning).
pub fn fold_cast(target: &Type, operand: &Literal) -> Option<Literal> {
    match (target, operand) {
        (Type::Primitive(vc_ast::Primitive::Double), Literal::Int(a)) => Some(Literal::Double(*a as f64)),
        (Type::Primitive(vc_ast::Primitive::Int), Literal::Double(a)) => Some(Literal::Int(*a as i64)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_division_truncates() {
        assert_eq!(fold_binary(BinaryOp::Div, &Literal::Int(7), &Literal::Int(2), &mut Interner::new()), Some(Literal::Int(3)));
    }

    #[test]
    fn division_by_zero_does_not_fold() {
        assert_eq!(fold_binary(BinaryOp::Div, &Literal::Int(1), &Literal::Int(0), &mut Interner::new()), None);
    }

    #[test]
    fn string_concatenation_interns_a_new_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        let folded = fold_binary(BinaryOp::Add, &Literal::Str(a), &Literal::Str(b), &mut interner).unwrap();
        match folded {
            Literal::Str(sym) => assert_eq!(interner.resolve(sym), "foobar"),
            _ => panic!("expected a string literal"),
        }
    }

    #[test]
    fn neq_is_derived_from_eq() {
        assert_eq!(fold_binary(BinaryOp::Neq, &Literal::Int(1), &Literal::Int(2), &mut Interner::new()), Some(Literal::Bool(true)));
    }

    #[test]
    fn cast_double_to_int_truncates() {
        assert_eq!(fold_cast(&Type::Primitive(vc_ast::Primitive::Int), &Literal::Double(3.9)), Some(Literal::Int(3)));
    }

    #[test]
    fn unary_neg_folds_both_numeric_kinds() {
        assert_eq!(fold_unary(UnaryOp::Neg, &Literal::Int(5)), Some(Literal::Int(-5)));
        assert_eq!(fold_unary(UnaryOp::Neg, &Literal::Double(5.0)), Some(Literal::Double(-5.0)));
    }
}
