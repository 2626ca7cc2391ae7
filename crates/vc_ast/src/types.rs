//! The V type model.
//!
//! Arrays compare equal by rank alone: two `Array` types with the same
//! dimension count are interchangeable as function arguments even if their
//! element types or declared sizes differ. This is deliberate, not an
//! oversight — it mirrors the runtime's erased array representation, which
//! tracks rank but not element size at the call boundary.

use std::fmt;

/// The primitive scalar types plus the two escape hatches: `Void` (a
/// function with no return value) and `Unsupported` (a reflected member
/// whose type the compiler cannot represent, e.g. a generic or pointer type
/// from an external library).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int,
    Double,
    String,
    Void,
    Unsupported,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Void => "void",
            Primitive::Unsupported => "<unsupported>",
        };
        f.write_str(s)
    }
}

/// A V type: a primitive scalar or an array of known rank.
#[derive(Debug, Clone)]
pub enum Type {
    Primitive(Primitive),
    Array {
        element: Primitive,
        dimensions: usize,
        sizes: Vec<usize>,
    },
}

impl Type {
    pub fn void() -> Type {
        Type::Primitive(Primitive::Void)
    }

    pub fn unsupported() -> Type {
        Type::Primitive(Primitive::Unsupported)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Unsupported))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Void))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    pub fn rank(&self) -> usize {
        match self {
            Type::Array { dimensions, .. } => *dimensions,
            Type::Primitive(_) => 0,
        }
    }

    /// Numeric widening: `int` can stand in for `double` wherever a `double`
    /// is expected, but not the reverse.
    pub fn widens_to(&self, other: &Type) -> bool {
        matches!(
            (self, other),
            (
                Type::Primitive(Primitive::Int),
                Type::Primitive(Primitive::Double)
            )
        )
    }

    /// Whether a value of `self` may be used where `target` is expected,
    /// either because the types are equal (by the rank-only rule for
    /// arrays) or because `self` widens to `target`.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        self == target || self.widens_to(target)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (
                Type::Array { dimensions: d1, .. },
                Type::Array { dimensions: d2, .. },
            ) => d1 == d2,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{p}"),
            Type::Array { element, dimensions, .. } => {
                write!(f, "{element}")?;
                for _ in 0..*dimensions {
                    write!(f, "[]")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_compare_equal_by_rank_alone() {
        let a = Type::Array { element: Primitive::Int, dimensions: 2, sizes: vec![3, 4] };
        let b = Type::Array { element: Primitive::Double, dimensions: 2, sizes: vec![9] };
        assert_eq!(a, b);
    }

    #[test]
    fn arrays_of_different_rank_are_unequal() {
        let a = Type::Array { element: Primitive::Int, dimensions: 1, sizes: vec![3] };
        let b = Type::Array { element: Primitive::Int, dimensions: 2, sizes: vec![3] };
        assert_ne!(a, b);
    }

    #[test]
    fn array_never_equals_primitive() {
        let a = Type::Array { element: Primitive::Int, dimensions: 1, sizes: vec![1] };
        assert_ne!(a, Type::Primitive(Primitive::Int));
    }

    #[test]
    fn int_widens_to_double_not_reverse() {
        let int_t = Type::Primitive(Primitive::Int);
        let dbl_t = Type::Primitive(Primitive::Double);
        assert!(int_t.widens_to(&dbl_t));
        assert!(!dbl_t.widens_to(&int_t));
        assert!(int_t.is_assignable_to(&dbl_t));
        assert!(!dbl_t.is_assignable_to(&int_t));
    }

    #[test]
    fn unsupported_is_tracked_explicitly() {
        let u = Type::unsupported();
        assert!(u.is_unsupported());
        assert_ne!(u, Type::Primitive(Primitive::Void));
    }
}
