//! Micro
//!
//! Compiles Micro programs to an assembled unit of static fields and
//! routines.
//!
//! ```
//! use micro::{Compiler, CompilerConfig};
//!
//! let compiler = Compiler::new(CompilerConfig::new().source_name("hello.micro"));
//! let program = compiler
//!     .compile("program Hello; begin write('h', 'i'); end.")
//!     .expect("valid syntax");
//!
//! assert!(program.is_success());
//! let unit = program.unit.expect("code was generated");
//! assert_eq!(unit.name, "Hello");
//! assert!(unit.routine("main").is_some());
//! ```

mod config;
mod error;

pub use config::CompilerConfig;
pub use error::{Error, Result};

pub use micro_compiler::emit::{AssembledRoutine, AssembledUnit, Instruction, Opcode, Operand};
pub use micro_core::{CompilationError, ErrorKind, MicroError, Span};

use bumpalo::Bump;
use log::debug;
use micro_compiler::emit::Assembler;
use micro_parser::Parser;

/// Outcome of compiling one source text.
#[derive(Debug)]
pub struct CompiledProgram {
    /// `None` when code generation was skipped.
    pub unit: Option<AssembledUnit>,
    /// Semantic errors from every pass, in pass order.
    pub errors: Vec<CompilationError>,
}

impl CompiledProgram {
    /// No pass reported an error.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of errors of one kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }

    /// Textual listing of the generated unit.
    pub fn listing(&self) -> Option<String> {
        self.unit.as_ref().map(ToString::to_string)
    }
}

/// Parse, analyse and generate one compilation unit.
#[derive(Debug, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `source`.
    ///
    /// Syntax errors fail the call. Semantic errors do not; they are
    /// returned in [`CompiledProgram::errors`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, source: &str) -> Result<CompiledProgram> {
        let arena = Bump::new();
        let program = Parser::parse(source, &arena)?;
        debug!(
            "parsed {} ({} nodes) from {}",
            program.name,
            program.node_count,
            self.config.get_source_name()
        );

        let mut assembler = Assembler::new();
        let result = micro_compiler::Compiler::compile(
            &program,
            &mut assembler,
            self.config.get_source_name(),
            self.config.gates_codegen(),
        );

        let unit = if result.generated {
            Some(assembler.finish()?)
        } else {
            None
        };
        Ok(CompiledProgram {
            unit,
            errors: result.errors,
        })
    }
}
