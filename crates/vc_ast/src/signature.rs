//! Call signatures and the exact-match / compatibility relations overload
//! resolution is built on.

use vc_base::Symbol;

use crate::types::Type;

#[derive(Debug, Clone)]
pub struct Signature {
    pub name: Symbol,
    pub params: Vec<Type>,
    pub return_type: Type,
}

impl Signature {
    pub fn new(name: Symbol, params: Vec<Type>, return_type: Type) -> Self {
        Signature { name, params, return_type }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// True when `args` could call this signature without any widening:
    /// same arity, every argument type equal to the matching parameter type.
    pub fn exact_match(&self, args: &[Type]) -> bool {
        self.arity() == args.len() && self.params.iter().zip(args).all(|(p, a)| p == a)
    }

    /// True when `args` could call this signature at all: same arity, every
    /// argument either equal to or wideneable to the matching parameter.
    pub fn is_applicable(&self, args: &[Type]) -> bool {
        self.arity() == args.len()
            && self.params.iter().zip(args).all(|(p, a)| a.is_assignable_to(p))
    }

    /// Whether `self` dominates `other` as a candidate for the same call:
    /// both are applicable and every one of `self`'s parameters is at least
    /// as specific (equal, never a strict widening) as `other`'s in the
    /// same position, with at least one strictly more specific.
    pub fn dominates(&self, other: &Signature) -> bool {
        if self.arity() != other.arity() {
            return false;
        }
        let mut strictly_better = false;
        for (a, b) in self.params.iter().zip(&other.params) {
            if a == b {
                continue;
            }
            if a.widens_to(b) {
                // self's parameter is narrower (int) than other's (double):
                // self is the more specific candidate in this position.
                strictly_better = true;
            } else {
                return false;
            }
        }
        strictly_better
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;
    use vc_base::Interner;

    fn sig(name: Symbol, params: Vec<Type>) -> Signature {
        Signature::new(name, params, Type::void())
    }

    #[test]
    fn exact_match_requires_identical_types() {
        let mut i = Interner::new();
        let f = sig(i.intern("f"), vec![Type::Primitive(Primitive::Int)]);
        assert!(f.exact_match(&[Type::Primitive(Primitive::Int)]));
        assert!(!f.exact_match(&[Type::Primitive(Primitive::Double)]));
    }

    #[test]
    fn applicable_allows_widening() {
        let mut i = Interner::new();
        let f = sig(i.intern("f"), vec![Type::Primitive(Primitive::Double)]);
        assert!(f.is_applicable(&[Type::Primitive(Primitive::Int)]));
    }

    #[test]
    fn narrower_signature_dominates_wider_one() {
        let mut i = Interner::new();
        let name = i.intern("f");
        let narrow = sig(name, vec![Type::Primitive(Primitive::Int)]);
        let wide = sig(name, vec![Type::Primitive(Primitive::Double)]);
        assert!(narrow.dominates(&wide));
        assert!(!wide.dominates(&narrow));
    }

    #[test]
    fn identical_signatures_do_not_dominate_each_other() {
        let mut i = Interner::new();
        let name = i.intern("f");
        let a = sig(name, vec![Type::Primitive(Primitive::Int)]);
        let b = sig(name, vec![Type::Primitive(Primitive::Int)]);
        assert!(!a.dominates(&b));
        assert!(!b.dominates(&a));
    }
}
