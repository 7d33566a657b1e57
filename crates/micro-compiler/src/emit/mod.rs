//! Code generator interface.
//!
//! The code generation pass talks to its target only through the
//! [`CodeGenerator`] trait: it frames a unit and its routines, declares
//! storage, and hands over finished [`InstructionList`]s. Binary layout is
//! the implementor's concern.
//!
//! [`Assembler`] is the in-memory implementation used by the compiler
//! facade and the tests.
//!
//! # Example
//!
//! ```
//! use micro_compiler::emit::{Assembler, CodeGenerator, Opcode, Operand, RoutineFlags};
//!
//! let mut asm = Assembler::new();
//! asm.begin_unit("Demo", "demo.micro");
//! let main = asm.begin_routine(RoutineFlags::PUBLIC | RoutineFlags::STATIC, "void", "main", &[]);
//! let mut code = asm.new_instruction_list();
//! code.add_instruction(Opcode::Return, vec![]);
//! asm.append_code(main, code);
//! asm.end_routine(main);
//! asm.end_unit();
//!
//! let unit = asm.finish().expect("valid unit");
//! assert_eq!(unit.routines[0].code.len(), 1);
//! ```

mod assembler;
mod instruction_list;

use bitflags::bitflags;

pub use assembler::{AssembledRoutine, AssembledUnit, Assembler, AssemblyError, StaticField};
pub use instruction_list::{
    Condition, Handle, HandleAllocator, Instruction, InstructionList, Opcode, Operand,
};

bitflags! {
    /// Routine visibility and storage flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RoutineFlags: u8 {
        const PUBLIC = 1 << 0;
        const STATIC = 1 << 1;
    }
}

/// Opaque reference to a routine opened with
/// [`CodeGenerator::begin_routine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoutineHandle(pub(crate) u32);

/// Name of the module initializer routine.
pub const MODULE_INITIALIZER: &str = "<clinit>";

/// Target of the code generation pass.
pub trait CodeGenerator {
    /// Start the unit. Fields and routines belong to the current unit.
    fn begin_unit(&mut self, name: &str, source_name: &str);

    fn end_unit(&mut self);

    fn unit_name(&self) -> &str;

    /// Open a routine frame. `params` are `(type name, name)` pairs in
    /// declaration order.
    fn begin_routine(
        &mut self,
        flags: RoutineFlags,
        return_type_name: &str,
        name: &str,
        params: &[(String, String)],
    ) -> RoutineHandle;

    /// Append code to the end of an open routine.
    fn append_code(&mut self, routine: RoutineHandle, code: InstructionList);

    /// Close a routine. Its branch targets are resolved here.
    fn end_routine(&mut self, routine: RoutineHandle);

    fn add_static_field(&mut self, name: &str, type_name: &str);

    fn add_local_slot(&mut self, routine: RoutineHandle, name: &str, type_name: &str);

    fn new_instruction_list(&mut self) -> InstructionList;
}
