//! The shape a `TypeProvider` reports back: fields and overloaded methods
//! on a single external type.

use vc_ast::Type;

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
}

#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        TypeDescriptor { name: name.into(), fields: Vec::new(), methods: Vec::new() }
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(FieldDescriptor { name: name.into(), ty });
        self
    }

    pub fn with_method(mut self, name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        self.methods.push(MethodDescriptor { name: name.into(), params, return_type });
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All overloads of `name`, regardless of arity — the caller narrows by
    /// argument types.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDescriptor> {
        self.methods.iter().filter(move |m| m.name == name)
    }
}
