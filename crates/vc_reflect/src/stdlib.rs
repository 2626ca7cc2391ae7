//! A minimal built-in `TypeProvider` for the handful of external members a
//! V program typically needs without shipping a real assembly: console
//! output, basic input, and a few `Math` functions. Anything else resolves
//! through a genuine provider, or falls through to `Type::unsupported()`.

use vc_ast::{Primitive, Type};

use crate::descriptor::TypeDescriptor;
use crate::provider::TypeProvider;

pub struct StdlibProvider;

impl TypeProvider for StdlibProvider {
    fn library_name(&self) -> &str {
        "Stdlib"
    }

    fn find_type(&self, path: &[&str]) -> Option<TypeDescriptor> {
        match path {
            ["System", "Console"] | ["Console"] => Some(console_descriptor()),
            ["System", "Math"] | ["Math"] => Some(math_descriptor()),
            _ => None,
        }
    }
}

fn console_descriptor() -> TypeDescriptor {
    let void = Type::void();
    let string = Type::Primitive(Primitive::String);
    let int = Type::Primitive(Primitive::Int);
    let double = Type::Primitive(Primitive::Double);
    let bool_t = Type::Primitive(Primitive::Bool);
    TypeDescriptor::new("Console")
        .with_method("WriteLine", vec![string.clone()], void.clone())
        .with_method("WriteLine", vec![int], void.clone())
        .with_method("WriteLine", vec![double], void.clone())
        .with_method("WriteLine", vec![bool_t], void.clone())
        .with_method("WriteLine", vec![], void)
        .with_method("ReadLine", vec![], string)
}

fn math_descriptor() -> TypeDescriptor {
    let double = Type::Primitive(Primitive::Double);
    let int = Type::Primitive(Primitive::Int);
    TypeDescriptor::new("Math")
        .with_method("Sqrt", vec![double.clone()], double.clone())
        .with_method("Abs", vec![int.clone()], int)
        .with_method("Abs", vec![double.clone()], double.clone())
        .with_field("PI", double)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_write_line_is_overloaded_per_primitive() {
        let console = StdlibProvider.find_type(&["System", "Console"]).unwrap();
        assert_eq!(console.methods_named("WriteLine").count(), 5);
    }

    #[test]
    fn unqualified_math_path_also_resolves() {
        let math = StdlibProvider.find_type(&["Math"]).unwrap();
        assert!(math.field("PI").is_some());
    }

    #[test]
    fn unknown_path_resolves_to_nothing() {
        assert!(StdlibProvider.find_type(&["Nope"]).is_none());
    }
}
