//! Overload resolution, shared between `GlobalScope` (external methods) and
//! `ProgramScope` (user functions): gather applicable candidates, take an
//! exact match if one exists, otherwise run a pairwise "best so far"
//! tournament using per-argument exact-match votes.

use vc_ast::{Signature, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadError {
    NoCandidates,
    Ambiguous,
}

enum Preference {
    Left,
    Right,
    Ambiguous,
}

/// Compares two candidates position-by-position: a parameter that matches
/// the actual argument type exactly outvotes one that merely accepts it
/// through widening. Conflicting votes (each candidate wins at least one
/// position) or no votes at all are both reported as `Ambiguous` — the
/// caller treats "can't tell them apart" the same whether the cause is
/// genuine conflict or a true tie.
fn compare(left: &Signature, right: &Signature, args: &[Type]) -> Preference {
    let mut left_votes = false;
    let mut right_votes = false;
    for (i, actual) in args.iter().enumerate() {
        let left_exact = left.params[i] == *actual;
        let right_exact = right.params[i] == *actual;
        if left_exact && !right_exact {
            left_votes = true;
        } else if right_exact && !left_exact {
            right_votes = true;
        }
    }
    match (left_votes, right_votes) {
        (true, false) => Preference::Left,
        (false, true) => Preference::Right,
        _ => Preference::Ambiguous,
    }
}

/// Resolves a call against `candidates` (all same name, arity not yet
/// filtered) for the given actual argument types.
pub fn resolve<'a>(candidates: &'a [Signature], args: &[Type]) -> Result<&'a Signature, OverloadError> {
    let applicable: Vec<&Signature> = candidates.iter().filter(|c| c.is_applicable(args)).collect();
    if applicable.is_empty() {
        return Err(OverloadError::NoCandidates);
    }
    if let Some(exact) = applicable.iter().find(|c| c.exact_match(args)) {
        return Ok(exact);
    }

    let mut best: Vec<&Signature> = Vec::new();
    for candidate in applicable {
        let mut discard_candidate = false;
        let mut kept = Vec::new();
        for existing in &best {
            match compare(existing, candidate, args) {
                Preference::Left => {
                    discard_candidate = true;
                    kept.push(*existing);
                }
                Preference::Right => {
                    // `existing` loses to `candidate`; drop it.
                }
                Preference::Ambiguous => kept.push(*existing),
            }
        }
        if !discard_candidate {
            kept.push(candidate);
        }
        best = kept;
    }

    match best.len() {
        1 => Ok(best[0]),
        0 => Err(OverloadError::NoCandidates),
        _ => Err(OverloadError::Ambiguous),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_ast::Primitive;
    use vc_base::Interner;

    fn sig(name: vc_base::Symbol, params: Vec<Type>) -> Signature {
        Signature::new(name, params, Type::void())
    }

    #[test]
    fn exact_match_wins_even_with_other_applicable_overloads() {
        let mut i = Interner::new();
        let f = i.intern("f");
        let candidates = vec![
            sig(f, vec![Type::Primitive(Primitive::Double)]),
            sig(f, vec![Type::Primitive(Primitive::Int)]),
        ];
        let args = vec![Type::Primitive(Primitive::Int)];
        let chosen = resolve(&candidates, &args).unwrap();
        assert_eq!(chosen.params[0], Type::Primitive(Primitive::Int));
    }

    #[test]
    fn crossed_overloads_are_ambiguous() {
        let mut i = Interner::new();
        let f = i.intern("f");
        let candidates = vec![
            sig(f, vec![Type::Primitive(Primitive::Int), Type::Primitive(Primitive::Double)]),
            sig(f, vec![Type::Primitive(Primitive::Double), Type::Primitive(Primitive::Int)]),
        ];
        let args = vec![Type::Primitive(Primitive::Int), Type::Primitive(Primitive::Int)];
        assert_eq!(resolve(&candidates, &args), Err(OverloadError::Ambiguous));
    }

    #[test]
    fn no_applicable_candidate_is_reported() {
        let mut i = Interner::new();
        let f = i.intern("f");
        let candidates = vec![sig(f, vec![Type::Primitive(Primitive::Bool)])];
        let args = vec![Type::Primitive(Primitive::Int)];
        assert_eq!(resolve(&candidates, &args), Err(OverloadError::NoCandidates));
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut i = Interner::new();
        let f = i.intern("f");
        let candidates = vec![
            sig(f, vec![Type::Primitive(Primitive::Double)]),
            sig(f, vec![Type::Primitive(Primitive::Int)]),
        ];
        let args = vec![Type::Primitive(Primitive::Int)];
        let first = resolve(&candidates, &args).unwrap().params.clone();
        let second = resolve(&candidates, &args).unwrap().params.clone();
        assert_eq!(first, second);
    }
}
