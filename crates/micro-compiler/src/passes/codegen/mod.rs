//! Code Generation Pass (Pass 3) - Emit instructions for a program.
//!
//! Walks the annotated tree and hands instruction lists to a
//! [`CodeGenerator`]. The pass trusts the scope and type annotations made
//! by the earlier passes and runs whether or not they reported errors.
//!
//! ## Layout of the generated unit
//!
//! - One static field per global variable
//! - One public static routine per procedure and function
//! - `main` for the program body
//! - A module initializer, created only when a global array or a `read`
//!   needs one-time setup
//!
//! Declarations that lost their name to an earlier one are not emitted.
//!
//! A load or store of a type with no storage strategy reports
//! [`CompilationError::UnsupportedVariableType`] and abandons the code of
//! the enclosing top-level statement.

mod decl;
mod expr;
mod stmt;

use log::debug;
use micro_core::{CompilationError, Diagnostics, Span};
use micro_parser::ast::{Ident, NodeId, Program};

use crate::annotations::{ScopeMap, TypeMap};
use crate::emit::{
    CodeGenerator, InstructionList, MODULE_INITIALIZER, Opcode, Operand, RoutineFlags,
    RoutineHandle,
};
use crate::passes::definition::DefinitionOutput;
use crate::passes::reference::ReferenceOutput;
use crate::scope::{ScopeId, ScopeKind, ScopeTree};
use crate::types::{PrimitiveType, Type};

/// Static field holding the shared input reader.
const READER_FIELD: &str = "$in";
const READER_TYPE: &str = "reader";

/// Output of the code generation pass.
#[derive(Debug, Default)]
pub struct CodegenOutput {
    pub errors: Vec<CompilationError>,
}

/// Where a variable lives and how to move it on and off the operand stack.
enum Storage {
    Static { field: String, type_name: String },
    Local { name: String, load: Opcode, store: Opcode },
}

/// Pass 3: generate code through a [`CodeGenerator`].
pub struct CodegenPass<'a, G: CodeGenerator> {
    generator: &'a mut G,
    scopes: &'a ScopeTree,
    scope_map: &'a ScopeMap,
    definitions: &'a DefinitionOutput,
    types: &'a TypeMap,
    global: ScopeId,
    current: ScopeId,
    unit: String,
    initializer: Option<RoutineHandle>,
    reader_ready: bool,
    /// Fatal reports so far; a statement that raises it is discarded.
    fatal: usize,
    diagnostics: Diagnostics,
}

impl<'a, G: CodeGenerator> CodegenPass<'a, G> {
    pub fn new(
        generator: &'a mut G,
        definitions: &'a DefinitionOutput,
        references: &'a ReferenceOutput,
    ) -> Self {
        Self {
            generator,
            scopes: &definitions.scopes,
            scope_map: &definitions.scope_map,
            definitions,
            types: &references.types,
            global: definitions.global,
            current: definitions.global,
            unit: String::new(),
            initializer: None,
            reader_ready: false,
            fatal: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Generate the whole unit for `program`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>, source_name: &str) -> CodegenOutput {
        self.unit = program.name.name.to_string();
        self.generator.begin_unit(&self.unit, source_name);
        if let Some(&scope) = self.scope_map.get(program.id) {
            self.global = scope;
            self.current = scope;
        }

        for var in program.globals() {
            self.visit_global(var);
        }
        for routine in program.routines() {
            self.visit_routine(routine);
        }
        self.visit_main(&program.body);

        if let Some(initializer) = self.initializer.take() {
            let mut code = self.generator.new_instruction_list();
            code.add_instruction(Opcode::Return, vec![]);
            self.generator.append_code(initializer, code);
            self.generator.end_routine(initializer);
        }
        self.generator.end_unit();

        debug!("codegen pass: {} errors", self.diagnostics.len());
        CodegenOutput {
            errors: self.diagnostics.take_errors(),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn owns_symbol(&self, node: NodeId) -> bool {
        self.definitions.owns_symbol(node)
    }

    fn list(&mut self) -> InstructionList {
        self.generator.new_instruction_list()
    }

    fn qualified(&self, name: &str) -> String {
        format!("{}.{}", self.unit, name)
    }

    /// The module initializer, opened on first use.
    fn initializer(&mut self) -> RoutineHandle {
        if let Some(handle) = self.initializer {
            return handle;
        }
        debug!("opening module initializer for {}", self.unit);
        let handle =
            self.generator
                .begin_routine(RoutineFlags::STATIC, "void", MODULE_INITIALIZER, &[]);
        self.initializer = Some(handle);
        handle
    }

    /// Declare the reader field and create the reader in the initializer.
    fn ensure_reader(&mut self) {
        if self.reader_ready {
            return;
        }
        self.reader_ready = true;
        self.generator.add_static_field(READER_FIELD, READER_TYPE);

        let initializer = self.initializer();
        let mut code = self.list();
        code.add_instruction(Opcode::NewReader, vec![]);
        code.add_instruction(
            Opcode::PutStatic,
            vec![
                Operand::Name(self.qualified(READER_FIELD)),
                Operand::Type(READER_TYPE.to_string()),
            ],
        );
        self.generator.append_code(initializer, code);
    }

    fn unsupported(&mut self, construct: String, ty: &Type, span: Span) {
        self.fatal += 1;
        self.diagnostics
            .report(CompilationError::UnsupportedVariableType {
                construct,
                type_name: ty.display_name(),
                span,
            });
    }

    /// Storage of the variable `ident` names, as seen from the current scope.
    ///
    /// Unresolved names and the program name were reported by the reference
    /// pass and yield `None` silently.
    fn storage(&mut self, ident: &Ident<'_>) -> Option<Storage> {
        let scopes = self.scopes;
        let symbol = scopes.resolve(self.current, ident.name)?;
        let ty = symbol.ty.as_ref()?;

        if scopes.kind(symbol.scope) == ScopeKind::Global && !matches!(ty, Type::Callable(_)) {
            return Some(Storage::Static {
                field: self.qualified(ident.name),
                type_name: ty.target_name(),
            });
        }

        let (load, store) = match ty {
            Type::Primitive(PrimitiveType::Int | PrimitiveType::Char | PrimitiveType::Bool) => {
                (Opcode::ILoad, Opcode::IStore)
            }
            Type::Primitive(PrimitiveType::Real) => (Opcode::DLoad, Opcode::DStore),
            Type::Array { .. } => (Opcode::ALoad, Opcode::AStore),
            other => {
                self.unsupported(format!("variable '{}'", ident.name), other, ident.span);
                return None;
            }
        };
        Some(Storage::Local {
            name: ident.name.to_string(),
            load,
            store,
        })
    }

    fn emit_load(&mut self, il: &mut InstructionList, ident: &Ident<'_>) {
        match self.storage(ident) {
            Some(Storage::Static { field, type_name }) => {
                il.add_instruction(
                    Opcode::GetStatic,
                    vec![Operand::Name(field), Operand::Type(type_name)],
                );
            }
            Some(Storage::Local { name, load, .. }) => {
                il.add_instruction(load, vec![Operand::Name(name)]);
            }
            None => {}
        }
    }

    fn emit_store(&mut self, il: &mut InstructionList, ident: &Ident<'_>) {
        match self.storage(ident) {
            Some(Storage::Static { field, type_name }) => {
                il.add_instruction(
                    Opcode::PutStatic,
                    vec![Operand::Name(field), Operand::Type(type_name)],
                );
            }
            Some(Storage::Local { name, store, .. }) => {
                il.add_instruction(store, vec![Operand::Name(name)]);
            }
            None => {}
        }
    }

    /// Convert the top of stack from `from` to `to` when they differ.
    fn emit_cast(il: &mut InstructionList, from: &Type, to: &Type) {
        let (Some(from), Some(to)) = (from.as_primitive(), to.as_primitive()) else {
            return;
        };
        if from == to || from == PrimitiveType::Void || to == PrimitiveType::Void {
            return;
        }
        il.add_instruction(
            Opcode::Cast,
            vec![
                Operand::Type(from.target_name().to_string()),
                Operand::Type(to.target_name().to_string()),
            ],
        );
    }

    /// Element type of an array access, or a fatal report if it has none.
    fn element_type(&mut self, ty: Type, construct: &str, span: Span) -> Option<PrimitiveType> {
        match ty.as_primitive() {
            Some(p) if p != PrimitiveType::Void => Some(p),
            _ => {
                self.unsupported(construct.to_string(), &ty, span);
                None
            }
        }
    }
}
