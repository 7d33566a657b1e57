//! Operator definitions for Micro expressions.
//!
//! Provides enums for binary and unary operators along with the binding
//! powers the Pratt parser climbs with.

use crate::lexer::TokenKind;
use std::fmt;

/// Binary operators in Micro.
///
/// Organized by precedence from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical (precedence 1)
    /// `or` or `∨`
    Or,
    /// `and` or `∧`
    And,

    // Bitwise (precedence 2)
    /// `&`
    BitAnd,
    /// `^`
    BitXor,
    /// `|`
    BitOr,

    // Equality (precedence 3)
    /// `=`
    Equal,
    /// `!=`
    NotEqual,

    // Relational (precedence 4)
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Shift (precedence 5)
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `>>>`
    ShiftRightUnsigned,

    // Additive (precedence 6)
    Add,
    Sub,

    // Multiplicative (precedence 7)
    Mul,
    Div,
    Mod,

    // Power (precedence 9, above unary)
    /// `**`
    Pow,
}

/// How an operator is checked and lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCategory {
    /// `and` / `or`, short-circuiting.
    Logical,
    /// `= != < <= > >=`, producing a bool.
    Comparison,
    /// Arithmetic, shift and bitwise operators.
    Arithmetic,
    /// `**`, lowered to a runtime call.
    Power,
}

impl BinaryOp {
    /// Get the binding power for this operator.
    ///
    /// Returns (left_bp, right_bp). Left-associative operators have
    /// right_bp = left_bp + 1; `**` is right-associative.
    pub fn binding_power(&self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            Or | And => (1, 2),
            BitAnd | BitXor | BitOr => (3, 4),
            Equal | NotEqual => (5, 6),
            Less | LessEqual | Greater | GreaterEqual => (7, 8),
            ShiftLeft | ShiftRight | ShiftRightUnsigned => (9, 10),
            Add | Sub => (11, 12),
            Mul | Div | Mod => (13, 14),
            Pow => (17, 16),
        }
    }

    /// Try to convert a token kind to a binary operator.
    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;

        Some(match token {
            TokenKind::Or => BinaryOp::Or,
            TokenKind::And => BinaryOp::And,
            Amp => BinaryOp::BitAnd,
            Caret => BinaryOp::BitXor,
            Pipe => BinaryOp::BitOr,
            TokenKind::Equal => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            TokenKind::Less => BinaryOp::Less,
            TokenKind::LessEqual => BinaryOp::LessEqual,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
            LessLess => BinaryOp::ShiftLeft,
            GreaterGreater => BinaryOp::ShiftRight,
            GreaterGreaterGreater => BinaryOp::ShiftRightUnsigned,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Mod,
            StarStar => BinaryOp::Pow,
            _ => return None,
        })
    }

    pub fn category(&self) -> OpCategory {
        use BinaryOp::*;
        match self {
            Or | And => OpCategory::Logical,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => OpCategory::Comparison,
            Pow => OpCategory::Power,
            _ => OpCategory::Arithmetic,
        }
    }

    /// Source spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            Or => "or",
            And => "and",
            BitAnd => "&",
            BitXor => "^",
            BitOr => "|",
            Equal => "=",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            ShiftRightUnsigned => ">>>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Pow => "**",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Neg,
    /// `~`
    BitNot,
    /// `not` or `¬`
    Not,
}

impl UnaryOp {
    /// Binding power of a prefix operator's operand.
    ///
    /// Sits between multiplicative operators and `**`, so `-a ** b` is
    /// `-(a ** b)` and `-a * b` is `(-a) * b`.
    pub const fn binding_power() -> u8 {
        15
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        match token {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Not => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "not",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_is_right_associative_and_binds_tightest() {
        let (l, r) = BinaryOp::Pow.binding_power();
        assert!(l > r);
        assert!(r > UnaryOp::binding_power());
        assert!(BinaryOp::Mul.binding_power().1 < UnaryOp::binding_power());
    }

    #[test]
    fn precedence_order() {
        let order = [
            BinaryOp::Or,
            BinaryOp::BitAnd,
            BinaryOp::Equal,
            BinaryOp::Less,
            BinaryOp::ShiftLeft,
            BinaryOp::Add,
            BinaryOp::Mul,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].binding_power().0 < pair[1].binding_power().0);
        }
    }

    #[test]
    fn categories() {
        assert_eq!(BinaryOp::And.category(), OpCategory::Logical);
        assert_eq!(BinaryOp::Equal.category(), OpCategory::Comparison);
        assert_eq!(BinaryOp::ShiftRightUnsigned.category(), OpCategory::Arithmetic);
        assert_eq!(BinaryOp::Pow.category(), OpCategory::Power);
    }

    #[test]
    fn from_token() {
        assert_eq!(BinaryOp::from_token(TokenKind::Equal), Some(BinaryOp::Equal));
        assert_eq!(BinaryOp::from_token(TokenKind::ColonEqual), None);
        assert_eq!(UnaryOp::from_token(TokenKind::Tilde), Some(UnaryOp::BitNot));
    }
}
