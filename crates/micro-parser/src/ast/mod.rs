//! Abstract Syntax Tree (AST) for Micro.
//!
//! This module provides:
//! - AST node definitions for programs, declarations, statements and expressions
//! - The parser that turns tokens into that tree
//!
//! Every node that later passes annotate carries a [`NodeId`]. Ids are
//! assigned in parse order, are unique within one [`Program`], and never
//! exceed [`Program::node_count`].

pub mod ops;

mod parser;

pub mod expr;
mod expr_parser;

pub mod stmt;
mod stmt_parser;

pub mod decl;

pub use micro_core::{ParseError, ParseErrorKind, ParseErrors};

pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use parser::Parser;
pub use stmt::*;

use micro_core::Span;
use std::fmt;

/// Stable identity of a syntax-tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An identifier with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A parsed Micro program.
///
/// Borrows from the arena the parser allocated into.
#[derive(Debug, Clone, Copy)]
pub struct Program<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub decls: &'ast [Decl<'ast>],
    pub body: Block<'ast>,
    pub span: Span,
    /// Number of node ids handed out while parsing.
    pub node_count: u32,
}

impl<'ast> Program<'ast> {
    /// Routine declarations in source order.
    pub fn routines(&self) -> impl Iterator<Item = &'ast RoutineDecl<'ast>> + '_ {
        self.decls.iter().filter_map(|d| match d {
            Decl::Routine(r) => Some(*r),
            Decl::Var(_) => None,
        })
    }

    /// Global variable declarations in source order.
    pub fn globals(&self) -> impl Iterator<Item = &'ast VarDecl<'ast>> + '_ {
        self.decls.iter().filter_map(|d| match d {
            Decl::Var(v) => Some(*v),
            Decl::Routine(_) => None,
        })
    }
}
