//! Statement AST nodes for Micro.

use crate::ast::{Expr, Ident, NodeId};
use micro_core::Span;

/// A sequence of statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

impl<'ast> Block<'ast> {
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

/// A statement. Every statement is terminated by `;` in source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// `lv := e;`
    Assign(&'ast AssignStmt<'ast>),
    /// `read(lv, ...);`
    Read(&'ast ReadStmt<'ast>),
    /// `write(e, ...);`
    Write(&'ast WriteStmt<'ast>),
    /// `call f(e, ...);`
    Call(&'ast CallStmt<'ast>),
    /// `return e?;`
    Return(&'ast ReturnStmt<'ast>),
    /// `if .. then .. elif .. else .. fi;`
    If(&'ast IfStmt<'ast>),
    /// `while e do .. od;`
    While(&'ast WhileStmt<'ast>),
    /// `do .. until e;`
    DoUntil(&'ast DoUntilStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Assign(s) => s.id,
            Self::Read(s) => s.id,
            Self::Write(s) => s.id,
            Self::Call(s) => s.id,
            Self::Return(s) => s.id,
            Self::If(s) => s.id,
            Self::While(s) => s.id,
            Self::DoUntil(s) => s.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Assign(s) => s.span,
            Self::Read(s) => s.span,
            Self::Write(s) => s.span,
            Self::Call(s) => s.span,
            Self::Return(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::DoUntil(s) => s.span,
        }
    }
}

/// A storable location: `x` or `a[i]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lvalue<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    /// Element index for array targets.
    pub index: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

impl<'ast> Lvalue<'ast> {
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignStmt<'ast> {
    pub id: NodeId,
    pub target: Lvalue<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadStmt<'ast> {
    pub id: NodeId,
    pub targets: &'ast [Lvalue<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriteStmt<'ast> {
    pub id: NodeId,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallStmt<'ast> {
    pub id: NodeId,
    pub callee: Ident<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub id: NodeId,
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub id: NodeId,
    pub guard: &'ast Expr<'ast>,
    pub then_branch: Block<'ast>,
    pub elifs: &'ast [ElifClause<'ast>],
    pub else_branch: Option<Block<'ast>>,
    pub span: Span,
}

impl<'ast> IfStmt<'ast> {
    /// Whether any branch besides `then` exists.
    pub fn has_alternatives(&self) -> bool {
        !self.elifs.is_empty() || self.else_branch.is_some()
    }
}

/// `elif e then ...`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElifClause<'ast> {
    pub guard: &'ast Expr<'ast>,
    pub body: Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub id: NodeId,
    pub guard: &'ast Expr<'ast>,
    pub body: Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoUntilStmt<'ast> {
    pub id: NodeId,
    pub body: Block<'ast>,
    pub guard: &'ast Expr<'ast>,
    pub span: Span,
}
