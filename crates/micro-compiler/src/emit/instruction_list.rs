//! Instruction lists with symbolic branch targets.
//!
//! Every instruction gets a [`Handle`] when it is added. Handles come from a
//! counter shared by all lists of one unit, so a handle stays valid while
//! lists are appended and spliced into each other. Branches name their
//! target by handle; offsets are only computed when a routine is
//! finalized by the code generator.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use ordered_float::OrderedFloat;

/// Stable reference to one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Source of unit-unique handles.
#[derive(Debug, Clone, Default)]
pub struct HandleAllocator {
    next: Rc<Cell<u32>>,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> Handle {
        let id = self.next.get();
        self.next.set(id + 1);
        Handle(id)
    }
}

/// Target machine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Does nothing; used as a branch target.
    Nop,
    /// Push a constant: `[value]`.
    Const,
    /// Load a local int/char/bool: `[name]`.
    ILoad,
    /// Load a local real: `[name]`.
    DLoad,
    /// Load a local array reference: `[name]`.
    ALoad,
    IStore,
    DStore,
    AStore,
    /// Load a static field: `[qualified name, type]`.
    GetStatic,
    PutStatic,
    /// Allocate an array with the length on the stack: `[component type]`.
    NewArray,
    /// `[component type]`
    ArrayLoad,
    ArrayStore,
    /// Convert the top of stack: `[from type, to type]`.
    Cast,
    /// `[type]`
    Neg,
    /// Binary operator: `[symbol, type]`.
    Op,
    /// Call a static routine: `[descriptor]`.
    InvokeStatic,
    /// Print the top of stack: `[type]`.
    Print,
    /// Create the shared input reader.
    NewReader,
    /// Read the next value from the reader on the stack: `[type]`.
    ReadValue,
    Pop,
    Return,
    /// `[target]`
    Goto,
    /// Conditional branch: `[condition, type, target]`.
    If,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Const => "const",
            Self::ILoad => "iload",
            Self::DLoad => "dload",
            Self::ALoad => "aload",
            Self::IStore => "istore",
            Self::DStore => "dstore",
            Self::AStore => "astore",
            Self::GetStatic => "getstatic",
            Self::PutStatic => "putstatic",
            Self::NewArray => "newarray",
            Self::ArrayLoad => "arrayload",
            Self::ArrayStore => "arraystore",
            Self::Cast => "cast",
            Self::Neg => "neg",
            Self::Op => "op",
            Self::InvokeStatic => "invokestatic",
            Self::Print => "print",
            Self::NewReader => "newreader",
            Self::ReadValue => "readvalue",
            Self::Pop => "pop",
            Self::Return => "return",
            Self::Goto => "goto",
            Self::If => "if",
        }
    }
}

/// Branch conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Compare the two topmost values.
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Test the topmost value against zero.
    IfZero,
    IfNonZero,
}

impl Condition {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::IfZero => "==0",
            Self::IfNonZero => "!=0",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Int(i32),
    Real(OrderedFloat<f64>),
    Char(char),
    Bool(bool),
    /// Variable, field or routine name, or an operator symbol.
    Name(String),
    /// Target type name.
    Type(String),
    Condition(Condition),
    Label(Handle),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{:?}", v.into_inner()),
            Self::Char(c) => write!(f, "{c:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Name(n) => f.write_str(n),
            Self::Type(t) => write!(f, "<{t}>"),
            Self::Condition(c) => f.write_str(c.symbol()),
            Self::Label(h) => write!(f, "{h}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub handle: Handle,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Branch target, if this instruction is a branch.
    pub fn target(&self) -> Option<Handle> {
        self.operands.iter().find_map(|op| match op {
            Operand::Label(h) => Some(*h),
            _ => None,
        })
    }

    pub fn condition(&self) -> Option<Condition> {
        self.operands.iter().find_map(|op| match op {
            Operand::Condition(c) => Some(*c),
            _ => None,
        })
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.opcode, Opcode::Goto | Opcode::If)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// An ordered, splicable sequence of instructions.
#[derive(Debug)]
pub struct InstructionList {
    handles: HandleAllocator,
    instructions: Vec<Instruction>,
}

impl InstructionList {
    pub fn new(handles: HandleAllocator) -> Self {
        Self {
            handles,
            instructions: Vec::new(),
        }
    }

    /// Append one instruction and return its handle.
    pub fn add_instruction(&mut self, opcode: Opcode, operands: Vec<Operand>) -> Handle {
        let handle = self.handles.next();
        self.instructions.push(Instruction {
            handle,
            opcode,
            operands,
        });
        handle
    }

    /// Branch to `target` when `condition` holds for operands of `type_name`.
    pub fn create_conditional_branch(
        &mut self,
        condition: Condition,
        type_name: &str,
        target: Handle,
    ) -> Handle {
        self.add_instruction(
            Opcode::If,
            vec![
                Operand::Condition(condition),
                Operand::Type(type_name.to_string()),
                Operand::Label(target),
            ],
        )
    }

    pub fn create_unconditional_branch(&mut self, target: Handle) -> Handle {
        self.add_instruction(Opcode::Goto, vec![Operand::Label(target)])
    }

    /// Move every instruction of `other` to the end of this list.
    pub fn append(&mut self, other: InstructionList) {
        self.instructions.extend(other.instructions);
    }

    /// Splice `other` in directly after the instruction `handle`.
    ///
    /// Returns `false` and drops `other` if `handle` is not in this list.
    pub fn insert_after(&mut self, handle: Handle, other: InstructionList) -> bool {
        let Some(pos) = self.position(handle) else {
            return false;
        };
        let tail = self.instructions.split_off(pos + 1);
        self.instructions.extend(other.instructions);
        self.instructions.extend(tail);
        true
    }

    /// Discard every instruction. Handles into this list become dangling.
    pub fn dispose(&mut self) {
        self.instructions.clear();
    }

    pub fn position(&self, handle: Handle) -> Option<usize> {
        self.instructions.iter().position(|i| i.handle == handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&Instruction> {
        self.instructions.iter().find(|i| i.handle == handle)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// A new empty list sharing this list's handle counter.
    pub fn sibling(&self) -> InstructionList {
        InstructionList::new(self.handles.clone())
    }
}
