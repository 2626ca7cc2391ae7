//! # vc-reflect
//!
//! The reflective type-provider capability boundary: the evaluator asks a
//! `TypeProvider` what a referenced external library exposes instead of
//! hard-coding knowledge of any particular assembly. `stdlib` is a minimal
//! built-in provider covering `System.Console` and `System.Math`; a real
//! deployment would plug in a provider backed by actual assembly metadata.

pub mod descriptor;
pub mod provider;
pub mod stdlib;

pub use descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
pub use provider::{resolve_type, TypeProvider};
pub use stdlib::StdlibProvider;
