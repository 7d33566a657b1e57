//! Compiler passes.
//!
//! - [`definition`]: Pass 1 - build the scope tree and define every declared name
//! - [`reference`]: Pass 2 - resolve every use and type every expression
//! - [`codegen`]: Pass 3 - generate instructions through a [`CodeGenerator`]
//!
//! Each pass is one complete top-down traversal. Later passes read the
//! annotation maps earlier passes produced and never modify them.
//!
//! [`CodeGenerator`]: crate::emit::CodeGenerator

pub mod codegen;
pub mod definition;
pub mod reference;

pub use codegen::{CodegenOutput, CodegenPass};
pub use definition::{DefinitionOutput, DefinitionPass};
pub use reference::{ReferenceOutput, ReferencePass};
