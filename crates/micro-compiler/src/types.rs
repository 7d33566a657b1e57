//! Semantic types.
//!
//! A [`Type`] is one of three shapes: a primitive, a one-dimensional array
//! of a primitive, or a callable routine signature. Types are plain values
//! compared by variant and fields.
//!
//! Every type has two spellings: a display name used in diagnostics
//! (`int`, `real[10]`) and a target name used when talking to the code
//! generator (`int`, `double[]`).

use micro_parser::ast::{ParamType, PrimitiveKind, TypeExpr};
use std::fmt;
use std::rc::Rc;

/// The primitive types, plus `Void`.
///
/// `Void` is both the result of a procedure and the sentinel carried by an
/// expression that failed to type-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    Real,
    Char,
    Bool,
    Void,
}

impl PrimitiveType {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Real => "real",
            Self::Char => "char",
            Self::Bool => "bool",
            Self::Void => "void",
        }
    }

    /// Name of this type on the target machine.
    pub fn target_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Real => "double",
            Self::Char => "char",
            Self::Bool => "boolean",
            Self::Void => "void",
        }
    }
}

impl From<PrimitiveKind> for PrimitiveType {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Int => Self::Int,
            PrimitiveKind::Real => Self::Real,
            PrimitiveKind::Char => Self::Char,
            PrimitiveKind::Bool => Self::Bool,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Signature of a procedure or function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallableType {
    /// `Program.routine`
    pub qualified_name: String,
    /// `Void` for procedures.
    pub return_type: PrimitiveType,
    pub param_names: Vec<String>,
    /// Target type names, parallel to `param_names`.
    pub param_type_names: Vec<String>,
}

impl CallableType {
    /// Descriptor used to invoke the routine: `P.f(int,double[])void`.
    pub fn invocation_descriptor(&self) -> String {
        format!(
            "{}({}){}",
            self.qualified_name,
            self.param_type_names.join(","),
            self.return_type.target_name()
        )
    }

    pub fn is_procedure(&self) -> bool {
        self.return_type == PrimitiveType::Void
    }
}

/// A semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveType),
    /// Length is 0 for array parameters, whose size is not known.
    Array {
        component: PrimitiveType,
        length: u32,
    },
    Callable(Rc<CallableType>),
}

impl Type {
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);
    pub const REAL: Type = Type::Primitive(PrimitiveType::Real);
    pub const CHAR: Type = Type::Primitive(PrimitiveType::Char);
    pub const BOOL: Type = Type::Primitive(PrimitiveType::Bool);
    pub const VOID: Type = Type::Primitive(PrimitiveType::Void);

    /// Type of a declared variable.
    pub fn from_decl(ty: &TypeExpr) -> Type {
        match ty.array_len {
            Some(length) => Type::Array {
                component: ty.base.into(),
                length,
            },
            None => Type::Primitive(ty.base.into()),
        }
    }

    /// Type of a declared parameter. Array parameters have length 0.
    pub fn from_param(ty: &ParamType) -> Type {
        if ty.is_array {
            Type::Array {
                component: ty.base.into(),
                length: 0,
            }
        } else {
            Type::Primitive(ty.base.into())
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Type::Primitive(p) => p.display_name().to_string(),
            Type::Array { component, length: 0 } => format!("{component}[]"),
            Type::Array { component, length } => format!("{component}[{length}]"),
            Type::Callable(c) => c.qualified_name.clone(),
        }
    }

    pub fn target_name(&self) -> String {
        match self {
            Type::Primitive(p) => p.target_name().to_string(),
            Type::Array { component, .. } => format!("{}[]", component.target_name()),
            Type::Callable(c) => c.invocation_descriptor(),
        }
    }

    /// Element type of an array.
    pub fn component_type(&self) -> Option<Type> {
        match self {
            Type::Array { component, .. } => Some(Type::Primitive(*component)),
            _ => None,
        }
    }

    pub fn is_primitive(&self, kind: PrimitiveType) -> bool {
        matches!(self, Type::Primitive(p) if *p == kind)
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&CallableType> {
        match self {
            Type::Callable(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        self.is_primitive(PrimitiveType::Void)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }
}

impl From<PrimitiveType> for Type {
    fn from(p: PrimitiveType) -> Self {
        Type::Primitive(p)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}
