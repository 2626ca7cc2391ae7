//! The `TypeProvider` capability boundary.
//!
//! In the real toolchain this wraps .NET reflection over an assembly named
//! by a `library` declaration. Here it's a trait so tests can substitute a
//! stub provider instead of loading anything, and so the evaluator doesn't
//! need to know how a library's types were actually discovered.

use crate::descriptor::TypeDescriptor;

pub trait TypeProvider {
    /// The library name this provider answers for, as it appears in a V
    /// `library "Name";` declaration.
    fn library_name(&self) -> &str;

    /// Looks up a type by its fully-qualified path, e.g. `["System",
    /// "Console"]`. Returns `None` if this provider's library has no such
    /// type.
    fn find_type(&self, path: &[&str]) -> Option<TypeDescriptor>;
}

/// Looks across every referenced library for a type at `path`, returning
/// the first match. Library order is significant: earlier libraries shadow
/// later ones, matching the order they were declared in the source file.
pub fn resolve_type(providers: &[Box<dyn TypeProvider>], path: &[&str]) -> Option<TypeDescriptor> {
    providers.iter().find_map(|p| p.find_type(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;
    impl TypeProvider for Empty {
        fn library_name(&self) -> &str {
            "Empty"
        }
        fn find_type(&self, _path: &[&str]) -> Option<TypeDescriptor> {
            None
        }
    }

    struct One;
    impl TypeProvider for One {
        fn library_name(&self) -> &str {
            "One"
        }
        fn find_type(&self, path: &[&str]) -> Option<TypeDescriptor> {
            if path == ["Thing"] {
                Some(TypeDescriptor::new("Thing"))
            } else {
                None
            }
        }
    }

    #[test]
    fn earlier_library_is_tried_first_and_later_one_fills_gaps() {
        let providers: Vec<Box<dyn TypeProvider>> = vec![Box::new(Empty), Box::new(One)];
        assert!(resolve_type(&providers, &["Thing"]).is_some());
        assert!(resolve_type(&providers, &["Nothing"]).is_none());
    }
}
