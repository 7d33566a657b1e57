//! Micro Compiler
//!
//! A 3-pass compiler for Micro programs.
//!
//! ## Architecture
//!
//! - **Pass 1 (Definition)**: Build the scope tree and define every declared name
//! - **Pass 2 (Reference)**: Resolve uses, type every expression, check operands
//! - **Pass 3 (Codegen)**: Emit instructions through a [`CodeGenerator`]
//!
//! Passes communicate only through the annotation maps in [`annotations`];
//! the syntax tree is never modified.
//!
//! ## Modules
//!
//! - [`annotations`]: Per-node scope and type side tables
//! - [`emit`]: Code generator interface, instruction lists and the in-memory assembler
//! - [`operators`]: Operator typing rules
//! - [`passes`]: The three compiler passes
//! - [`scope`]: Scope tree and symbols
//! - [`types`]: Semantic types

pub mod annotations;
pub mod emit;
pub mod operators;
pub mod passes;
pub mod scope;
pub mod types;

pub use annotations::{NodeMap, ScopeMap, TypeMap};
pub use emit::{AssembledUnit, Assembler, CodeGenerator};
pub use passes::{
    CodegenOutput, CodegenPass, DefinitionOutput, DefinitionPass, ReferenceOutput, ReferencePass,
};
pub use scope::{ScopeId, ScopeKind, ScopeTree, Symbol};
pub use types::{CallableType, PrimitiveType, Type};

// Re-export CompilationError from core for convenience
pub use micro_core::CompilationError;

use log::{info, warn};
use micro_core::Diagnostics;
use micro_parser::ast::Program;

/// Errors of every pass, in pass order.
#[derive(Debug, Default)]
pub struct CompilationResult {
    pub errors: Vec<CompilationError>,
    /// Whether the codegen pass ran.
    pub generated: bool,
}

impl CompilationResult {
    /// Check if compilation succeeded (no errors).
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The main compiler entry point.
pub struct Compiler;

impl Compiler {
    /// Run all three passes, generating into `generator`.
    ///
    /// With `gate_codegen` set, code generation is skipped when the first two
    /// passes reported errors.
    pub fn compile<G: CodeGenerator>(
        program: &Program<'_>,
        generator: &mut G,
        source_name: &str,
        gate_codegen: bool,
    ) -> CompilationResult {
        let definitions = DefinitionPass::new().run(program);
        let references = ReferencePass::new(&definitions).run(program);

        let mut diagnostics = Diagnostics::new();
        diagnostics.extend(definitions.errors.iter().cloned());
        diagnostics.extend(references.errors.iter().cloned());

        if gate_codegen && !diagnostics.is_empty() {
            info!(
                "skipping code generation for {}: {} errors",
                program.name,
                diagnostics.len()
            );
            return CompilationResult {
                errors: diagnostics.take_errors(),
                generated: false,
            };
        }

        let codegen = CodegenPass::new(generator, &definitions, &references).run(program, source_name);
        diagnostics.extend(codegen.errors);
        if diagnostics.has_fatal() {
            warn!("{}: generated code omits statements with fatal errors", program.name);
        }
        info!("compiled {} with {} errors", program.name, diagnostics.len());

        CompilationResult {
            errors: diagnostics.take_errors(),
            generated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use micro_parser::Parser;

    #[test]
    fn gated_compile_skips_codegen() {
        let arena = Bump::new();
        let program = Parser::parse("program P; int x; begin x := y; end.", &arena).unwrap();
        let mut asm = Assembler::new();
        let result = Compiler::compile(&program, &mut asm, "p.micro", true);
        assert!(!result.is_success());
        assert!(!result.generated);
        assert!(asm.unit_name().is_empty());
    }

    #[test]
    fn ungated_compile_generates_despite_errors() {
        let arena = Bump::new();
        let program = Parser::parse("program P; int x; begin x := y; end.", &arena).unwrap();
        let mut asm = Assembler::new();
        let result = Compiler::compile(&program, &mut asm, "p.micro", false);
        assert_eq!(result.errors.len(), 2);
        assert!(result.generated);
        assert_eq!(asm.unit_name(), "P");
    }
}
