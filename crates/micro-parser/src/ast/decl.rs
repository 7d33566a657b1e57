//! Declaration AST nodes for Micro.
//!
//! A program declares global variables and routines. Routines declare
//! parameters and local variables; routine declarations do not nest.

use crate::ast::{Block, Ident, NodeId};
use micro_core::Span;
use std::fmt;

/// A top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decl<'ast> {
    Var(&'ast VarDecl<'ast>),
    Routine(&'ast RoutineDecl<'ast>),
}

impl<'ast> Decl<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Var(d) => d.id,
            Self::Routine(d) => d.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Var(d) => d.span,
            Self::Routine(d) => d.span,
        }
    }
}

/// One of the four primitive type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Real,
    Char,
    Bool,
}

impl PrimitiveKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Real => "real",
            Self::Char => "char",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Declared type of a variable: `int` or `int[10]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeExpr {
    pub base: PrimitiveKind,
    /// Element count for arrays.
    pub array_len: Option<u32>,
    pub span: Span,
}

/// `int x` or `int a[10]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    pub id: NodeId,
    pub ty: TypeExpr,
    pub name: Ident<'ast>,
    pub span: Span,
}

/// Declared type of a parameter: arrays carry no length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamType {
    pub base: PrimitiveKind,
    pub is_array: bool,
}

/// `int x` or `int a[]` in a parameter list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDecl<'ast> {
    pub id: NodeId,
    pub ty: ParamType,
    pub name: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Procedure,
    /// A function with its declared return type.
    Function(PrimitiveKind),
}

/// A procedure or function declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutineDecl<'ast> {
    pub id: NodeId,
    pub kind: RoutineKind,
    pub name: Ident<'ast>,
    pub params: &'ast [ParamDecl<'ast>],
    pub locals: &'ast [VarDecl<'ast>],
    pub body: Block<'ast>,
    pub span: Span,
}

impl<'ast> RoutineDecl<'ast> {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, RoutineKind::Function(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_keywords() {
        assert_eq!(PrimitiveKind::Real.to_string(), "real");
        assert_eq!(PrimitiveKind::Bool.keyword(), "bool");
    }
}
