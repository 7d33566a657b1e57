//! In-memory [`CodeGenerator`].
//!
//! Collects the unit's static fields and routines, resolves each routine's
//! branch targets to instruction offsets when the routine is closed, and
//! renders the result as a textual listing.

use std::fmt;

use log::debug;
use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{
    CodeGenerator, Handle, HandleAllocator, Instruction, InstructionList, Operand, RoutineFlags,
    RoutineHandle,
};

/// Structural problems found while assembling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("no unit was started")]
    NoUnit,

    #[error("routine handle {0} does not exist")]
    UnknownRoutine(u32),

    #[error("routine '{0}' was already closed")]
    RoutineClosed(String),

    #[error("routine '{0}' was never closed")]
    RoutineNotClosed(String),

    #[error("branch in routine '{routine}' targets {target}, which is not in the routine")]
    UnresolvedTarget { routine: String, target: Handle },
}

/// A unit-level storage slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticField {
    pub name: String,
    pub type_name: String,
}

/// A finished routine.
#[derive(Debug, Clone)]
pub struct AssembledRoutine {
    pub flags: RoutineFlags,
    pub return_type: String,
    pub name: String,
    /// `(type name, name)` pairs.
    pub params: Vec<(String, String)>,
    /// `(name, type name)` pairs in declaration order.
    pub locals: Vec<(String, String)>,
    pub code: Vec<Instruction>,
    offsets: FxHashMap<Handle, usize>,
}

impl AssembledRoutine {
    /// Offset of the instruction `handle` within this routine.
    pub fn offset_of(&self, handle: Handle) -> Option<usize> {
        self.offsets.get(&handle).copied()
    }

    /// Offset the branch at `index` jumps to.
    pub fn branch_target(&self, index: usize) -> Option<usize> {
        self.code
            .get(index)
            .and_then(Instruction::target)
            .and_then(|h| self.offset_of(h))
    }
}

/// A finished compilation unit.
#[derive(Debug, Clone)]
pub struct AssembledUnit {
    pub name: String,
    pub source_name: String,
    pub fields: Vec<StaticField>,
    pub routines: Vec<AssembledRoutine>,
}

impl AssembledUnit {
    pub fn routine(&self, name: &str) -> Option<&AssembledRoutine> {
        self.routines.iter().find(|r| r.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&StaticField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug)]
struct OpenRoutine {
    routine: AssembledRoutine,
    closed: bool,
}

/// Builds an [`AssembledUnit`] through the [`CodeGenerator`] interface.
#[derive(Debug, Default)]
pub struct Assembler {
    handles: HandleAllocator,
    started: bool,
    name: String,
    source_name: String,
    fields: Vec<StaticField>,
    routines: Vec<OpenRoutine>,
    errors: Vec<AssemblyError>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[AssemblyError] {
        &self.errors
    }

    /// Take the assembled unit, or the first structural error.
    pub fn finish(self) -> Result<AssembledUnit, AssemblyError> {
        if !self.started {
            return Err(AssemblyError::NoUnit);
        }
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }
        if let Some(open) = self.routines.iter().find(|r| !r.closed) {
            return Err(AssemblyError::RoutineNotClosed(open.routine.name.clone()));
        }
        Ok(AssembledUnit {
            name: self.name,
            source_name: self.source_name,
            fields: self.fields,
            routines: self.routines.into_iter().map(|r| r.routine).collect(),
        })
    }

    fn open_routine(&mut self, handle: RoutineHandle) -> Option<&mut AssembledRoutine> {
        let index = handle.0 as usize;
        let error = match self.routines.get(index) {
            Some(open) if !open.closed => None,
            Some(open) => Some(AssemblyError::RoutineClosed(open.routine.name.clone())),
            None => Some(AssemblyError::UnknownRoutine(handle.0)),
        };
        if let Some(error) = error {
            self.errors.push(error);
            return None;
        }
        self.routines.get_mut(index).map(|r| &mut r.routine)
    }
}

impl CodeGenerator for Assembler {
    fn begin_unit(&mut self, name: &str, source_name: &str) {
        debug!("begin unit {name}");
        self.started = true;
        self.name = name.to_string();
        self.source_name = source_name.to_string();
    }

    fn end_unit(&mut self) {
        debug!(
            "end unit {} ({} fields, {} routines)",
            self.name,
            self.fields.len(),
            self.routines.len()
        );
    }

    fn unit_name(&self) -> &str {
        &self.name
    }

    fn begin_routine(
        &mut self,
        flags: RoutineFlags,
        return_type_name: &str,
        name: &str,
        params: &[(String, String)],
    ) -> RoutineHandle {
        let handle = RoutineHandle(self.routines.len() as u32);
        self.routines.push(OpenRoutine {
            routine: AssembledRoutine {
                flags,
                return_type: return_type_name.to_string(),
                name: name.to_string(),
                params: params.to_vec(),
                locals: Vec::new(),
                code: Vec::new(),
                offsets: FxHashMap::default(),
            },
            closed: false,
        });
        handle
    }

    fn append_code(&mut self, routine: RoutineHandle, code: InstructionList) {
        if let Some(routine) = self.open_routine(routine) {
            routine.code.extend(code.into_instructions());
        }
    }

    fn end_routine(&mut self, handle: RoutineHandle) {
        let Some(routine) = self.open_routine(handle) else {
            return;
        };
        routine.offsets = routine
            .code
            .iter()
            .enumerate()
            .map(|(offset, i)| (i.handle, offset))
            .collect();
        let unresolved: Vec<AssemblyError> = routine
            .code
            .iter()
            .filter_map(Instruction::target)
            .filter(|target| !routine.offsets.contains_key(target))
            .map(|target| AssemblyError::UnresolvedTarget {
                routine: routine.name.clone(),
                target,
            })
            .collect();
        debug!("end routine {} ({} instructions)", routine.name, routine.code.len());
        self.errors.extend(unresolved);
        if let Some(open) = self.routines.get_mut(handle.0 as usize) {
            open.closed = true;
        }
    }

    fn add_static_field(&mut self, name: &str, type_name: &str) {
        if self.fields.iter().any(|f| f.name == name) {
            return;
        }
        self.fields.push(StaticField {
            name: name.to_string(),
            type_name: type_name.to_string(),
        });
    }

    fn add_local_slot(&mut self, routine: RoutineHandle, name: &str, type_name: &str) {
        if let Some(routine) = self.open_routine(routine) {
            if !routine.locals.iter().any(|(n, _)| n == name) {
                routine.locals.push((name.to_string(), type_name.to_string()));
            }
        }
    }

    fn new_instruction_list(&mut self) -> InstructionList {
        InstructionList::new(self.handles.clone())
    }
}

// ============================================================================
// Listing
// ============================================================================

impl fmt::Display for AssembledUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "unit {} ({})", self.name, self.source_name)?;
        for field in &self.fields {
            writeln!(f, "  field {}: {}", field.name, field.type_name)?;
        }
        for routine in &self.routines {
            write!(f, "{routine}")?;
        }
        Ok(())
    }
}

impl fmt::Display for AssembledRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modifiers = String::new();
        if self.flags.contains(RoutineFlags::PUBLIC) {
            modifiers.push_str("public ");
        }
        if self.flags.contains(RoutineFlags::STATIC) {
            modifiers.push_str("static ");
        }
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(ty, name)| format!("{ty} {name}"))
            .collect();
        writeln!(
            f,
            "  routine {modifiers}{} {}({})",
            self.return_type,
            self.name,
            params.join(", ")
        )?;
        for (name, ty) in &self.locals {
            writeln!(f, "    local {name}: {ty}")?;
        }
        for (offset, instruction) in self.code.iter().enumerate() {
            write!(f, "    {offset:>4}: {}", instruction.opcode.mnemonic())?;
            for operand in &instruction.operands {
                match operand {
                    Operand::Label(h) => match self.offset_of(*h) {
                        Some(target) => write!(f, " @{target}")?,
                        None => write!(f, " {h}")?,
                    },
                    other => write!(f, " {other}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
