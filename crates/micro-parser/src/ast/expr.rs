//! Expression AST nodes for Micro.
//!
//! # Expression Precedence
//!
//! The parser uses Pratt parsing with the following precedence levels:
//! 1. Logical (`and`, `or`)
//! 2. Bitwise (`&`, `^`, `|`)
//! 3. Equality (`=`, `!=`)
//! 4. Relational (`<`, `<=`, `>`, `>=`)
//! 5. Shift (`<<`, `>>`, `>>>`)
//! 6. Additive (`+`, `-`)
//! 7. Multiplicative (`*`, `/`, `%`)
//! 8. Prefix unary (`+`, `-`, `~`, `not`)
//! 9. Power (`**`), right associative

use crate::ast::{BinaryOp, Ident, NodeId, UnaryOp};
use micro_core::Span;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr),
    /// Variable reference
    Ident(IdentExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Function call used as a value
    Call(&'ast CallExpr<'ast>),
    /// Array element read
    Index(&'ast IndexExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Literal(e) => e.id,
            Self::Ident(e) => e.id,
            Self::Binary(e) => e.id,
            Self::Unary(e) => e.id,
            Self::Call(e) => e.id,
            Self::Index(e) => e.id,
            Self::Paren(e) => e.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.ident.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Call(e) => e.span,
            Self::Index(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr {
    pub id: NodeId,
    pub kind: LiteralKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind {
    Int(i32),
    Real(f64),
    Char(char),
    Bool(bool),
}

/// A use of a named variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    pub id: NodeId,
    pub ident: Ident<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub id: NodeId,
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub id: NodeId,
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// `f(a, b)` in value position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub id: NodeId,
    pub callee: Ident<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// `a[i]` in value position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub id: NodeId,
    pub array: Ident<'ast>,
    pub index: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub id: NodeId,
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_expr_span_is_identifier_span() {
        let expr = Expr::Ident(IdentExpr {
            id: NodeId(3),
            ident: Ident::new("x", Span::new(1, 4, 1)),
        });
        assert_eq!(expr.id(), NodeId(3));
        assert_eq!(expr.span(), Span::new(1, 4, 1));
    }

    #[test]
    fn nested_expression_ids() {
        use bumpalo::Bump;
        let arena = Bump::new();
        let left = arena.alloc(Expr::Literal(LiteralExpr {
            id: NodeId(0),
            kind: LiteralKind::Int(1),
            span: Span::new(1, 1, 1),
        }));
        let right = arena.alloc(Expr::Literal(LiteralExpr {
            id: NodeId(1),
            kind: LiteralKind::Real(2.5),
            span: Span::new(1, 5, 3),
        }));
        let sum = Expr::Binary(arena.alloc(BinaryExpr {
            id: NodeId(2),
            left,
            op: BinaryOp::Add,
            right,
            span: Span::new(1, 1, 7),
        }));
        assert_eq!(sum.id(), NodeId(2));
        let Expr::Binary(binary) = sum else {
            panic!("expected binary");
        };
        assert_eq!(binary.right.id(), NodeId(1));
    }
}
