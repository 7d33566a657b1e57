//! Operator typing rules.
//!
//! Pure functions over [`Type`] that decide whether an operator accepts its
//! operands and what it produces. `None` means the combination is invalid;
//! the reference pass reports it and substitutes `Void`.
//!
//! Non-primitive operands (arrays, callables) behave like `Void`.

use micro_parser::ast::{BinaryOp, OpCategory, UnaryOp};

use crate::types::{PrimitiveType, Type};

use PrimitiveType::{Bool, Char, Int, Real, Void};

fn primitive(ty: &Type) -> PrimitiveType {
    ty.as_primitive().unwrap_or(Void)
}

/// Whether a value of type `rhs` may be stored into a location of type `lhs`.
///
/// ```text
/// lhs \ rhs  Bool Char Int Real
/// Bool        ✓    ✗    ✗   ✗
/// Char        ✗    ✓    ✗   ✗
/// Int         ✗    ✗    ✓   ✓
/// Real        ✗    ✗    ✓   ✓
/// ```
pub fn assignment_valid(lhs: &Type, rhs: &Type) -> bool {
    matches!(
        (primitive(lhs), primitive(rhs)),
        (Bool, Bool) | (Char, Char) | (Int | Real, Int | Real)
    )
}

/// Baseline result of combining two operands.
///
/// Bool with Bool gives Bool, Int with Int gives Int, any other numeric mix
/// gives Real. Everything else gives Void.
pub fn expression_result(lhs: &Type, rhs: &Type) -> Type {
    let result = match (primitive(lhs), primitive(rhs)) {
        (Bool, Bool) => Bool,
        (Int, Int) => Int,
        (Int | Real, Int | Real) => Real,
        _ => Void,
    };
    Type::Primitive(result)
}

/// Arithmetic, shift and bitwise operators.
///
/// Char arithmetic is limited: `char - char` is an int distance,
/// `char + int` and `char - int` offset a char, and `int + char` offsets a
/// char. `int - char` and every other char combination are rejected.
pub fn arithmetic_result(op: BinaryOp, lhs: &Type, rhs: &Type) -> Option<Type> {
    let additive = matches!(op, BinaryOp::Add | BinaryOp::Sub);
    match (primitive(lhs), primitive(rhs)) {
        (Char, Char) => (op == BinaryOp::Sub).then_some(Type::INT),
        (Char, Int) => additive.then_some(Type::CHAR),
        (Int, Char) => (op == BinaryOp::Add).then_some(Type::CHAR),
        (Char, _) | (_, Char) => None,
        _ => Some(expression_result(lhs, rhs)).filter(|t| !t.is_void()),
    }
}

/// Comparison operators always produce Bool.
///
/// Chars compare only with chars. Other operands must have a baseline
/// result.
pub fn comparison_result(lhs: &Type, rhs: &Type) -> Option<Type> {
    match (primitive(lhs), primitive(rhs)) {
        (Char, Char) => Some(Type::BOOL),
        (Char, _) | (_, Char) => None,
        _ => (!expression_result(lhs, rhs).is_void()).then_some(Type::BOOL),
    }
}

/// Type both comparison operands are brought to before comparing.
pub fn comparison_operand_type(lhs: &Type, rhs: &Type) -> Type {
    match (primitive(lhs), primitive(rhs)) {
        (Char, Char) => Type::CHAR,
        _ => expression_result(lhs, rhs),
    }
}

/// `and` / `or` take and produce Bool.
pub fn logical_result(lhs: &Type, rhs: &Type) -> Option<Type> {
    matches!((primitive(lhs), primitive(rhs)), (Bool, Bool)).then_some(Type::BOOL)
}

/// `**` on numeric operands. Int with Int stays Int.
pub fn power_result(lhs: &Type, rhs: &Type) -> Option<Type> {
    match expression_result(lhs, rhs).as_primitive() {
        Some(Int) => Some(Type::INT),
        Some(Real) => Some(Type::REAL),
        _ => None,
    }
}

pub fn unary_result(op: UnaryOp, operand: &Type) -> Option<Type> {
    match (op, primitive(operand)) {
        (UnaryOp::Plus | UnaryOp::Neg, Int) => Some(Type::INT),
        (UnaryOp::Plus | UnaryOp::Neg, Real) => Some(Type::REAL),
        (UnaryOp::BitNot, Int) => Some(Type::INT),
        (UnaryOp::Not, Bool) => Some(Type::BOOL),
        _ => None,
    }
}

/// Result of any binary operator, dispatched on its category.
pub fn binary_result(op: BinaryOp, lhs: &Type, rhs: &Type) -> Option<Type> {
    match op.category() {
        OpCategory::Logical => logical_result(lhs, rhs),
        OpCategory::Comparison => comparison_result(lhs, rhs),
        OpCategory::Arithmetic => arithmetic_result(op, lhs, rhs),
        OpCategory::Power => power_result(lhs, rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Type; 5] = [Type::BOOL, Type::CHAR, Type::INT, Type::REAL, Type::VOID];

    #[test]
    fn assignment_table() {
        let valid: Vec<(String, String)> = ALL
            .iter()
            .flat_map(|l| ALL.iter().map(move |r| (l, r)))
            .filter(|(l, r)| assignment_valid(l, r))
            .map(|(l, r)| (l.to_string(), r.to_string()))
            .collect();
        let expected: Vec<(String, String)> = [
            ("bool", "bool"),
            ("char", "char"),
            ("int", "int"),
            ("int", "real"),
            ("real", "int"),
            ("real", "real"),
        ]
        .iter()
        .map(|(l, r)| (l.to_string(), r.to_string()))
        .collect();
        assert_eq!(valid, expected);
    }

    #[test]
    fn assignment_rejects_non_primitives() {
        let array = Type::Array {
            component: PrimitiveType::Int,
            length: 2,
        };
        assert!(!assignment_valid(&array, &array));
        assert!(!assignment_valid(&Type::INT, &array));
    }

    #[test]
    fn baseline_table() {
        assert_eq!(expression_result(&Type::BOOL, &Type::BOOL), Type::BOOL);
        assert_eq!(expression_result(&Type::INT, &Type::INT), Type::INT);
        assert_eq!(expression_result(&Type::INT, &Type::REAL), Type::REAL);
        assert_eq!(expression_result(&Type::REAL, &Type::INT), Type::REAL);
        assert_eq!(expression_result(&Type::REAL, &Type::REAL), Type::REAL);
        assert_eq!(expression_result(&Type::CHAR, &Type::CHAR), Type::VOID);
        assert_eq!(expression_result(&Type::BOOL, &Type::INT), Type::VOID);
        for ty in &ALL {
            assert_eq!(expression_result(ty, &Type::VOID), Type::VOID);
            assert_eq!(expression_result(&Type::VOID, ty), Type::VOID);
        }
    }

    #[test]
    fn char_arithmetic() {
        use BinaryOp::*;
        assert_eq!(arithmetic_result(Sub, &Type::CHAR, &Type::CHAR), Some(Type::INT));
        assert_eq!(arithmetic_result(Add, &Type::CHAR, &Type::CHAR), None);
        assert_eq!(arithmetic_result(Add, &Type::CHAR, &Type::INT), Some(Type::CHAR));
        assert_eq!(arithmetic_result(Sub, &Type::CHAR, &Type::INT), Some(Type::CHAR));
        assert_eq!(arithmetic_result(Mul, &Type::CHAR, &Type::INT), None);
        assert_eq!(arithmetic_result(Add, &Type::INT, &Type::CHAR), Some(Type::CHAR));
        assert_eq!(arithmetic_result(Sub, &Type::INT, &Type::CHAR), None);
        assert_eq!(arithmetic_result(Add, &Type::CHAR, &Type::REAL), None);
    }

    #[test]
    fn numeric_arithmetic_uses_baseline() {
        use BinaryOp::*;
        assert_eq!(arithmetic_result(Mul, &Type::INT, &Type::REAL), Some(Type::REAL));
        assert_eq!(arithmetic_result(ShiftLeft, &Type::INT, &Type::INT), Some(Type::INT));
        assert_eq!(arithmetic_result(BitAnd, &Type::BOOL, &Type::BOOL), Some(Type::BOOL));
        assert_eq!(arithmetic_result(Add, &Type::BOOL, &Type::INT), None);
        assert_eq!(arithmetic_result(Add, &Type::VOID, &Type::INT), None);
    }

    #[test]
    fn comparisons() {
        assert_eq!(comparison_result(&Type::CHAR, &Type::CHAR), Some(Type::BOOL));
        assert_eq!(comparison_result(&Type::CHAR, &Type::INT), None);
        assert_eq!(comparison_result(&Type::INT, &Type::REAL), Some(Type::BOOL));
        assert_eq!(comparison_result(&Type::BOOL, &Type::BOOL), Some(Type::BOOL));
        assert_eq!(comparison_result(&Type::BOOL, &Type::REAL), None);

        assert_eq!(comparison_operand_type(&Type::CHAR, &Type::CHAR), Type::CHAR);
        assert_eq!(comparison_operand_type(&Type::INT, &Type::REAL), Type::REAL);
    }

    #[test]
    fn logical_requires_bools() {
        assert_eq!(logical_result(&Type::BOOL, &Type::BOOL), Some(Type::BOOL));
        assert_eq!(logical_result(&Type::BOOL, &Type::INT), None);
    }

    #[test]
    fn power() {
        assert_eq!(power_result(&Type::INT, &Type::INT), Some(Type::INT));
        assert_eq!(power_result(&Type::INT, &Type::REAL), Some(Type::REAL));
        assert_eq!(power_result(&Type::BOOL, &Type::BOOL), None);
        assert_eq!(power_result(&Type::CHAR, &Type::INT), None);
    }

    #[test]
    fn unary() {
        assert_eq!(unary_result(UnaryOp::Neg, &Type::REAL), Some(Type::REAL));
        assert_eq!(unary_result(UnaryOp::Plus, &Type::INT), Some(Type::INT));
        assert_eq!(unary_result(UnaryOp::BitNot, &Type::INT), Some(Type::INT));
        assert_eq!(unary_result(UnaryOp::BitNot, &Type::REAL), None);
        assert_eq!(unary_result(UnaryOp::Not, &Type::BOOL), Some(Type::BOOL));
        assert_eq!(unary_result(UnaryOp::Neg, &Type::CHAR), None);
        assert_eq!(unary_result(UnaryOp::Not, &Type::INT), None);
    }

    #[test]
    fn binary_dispatch() {
        assert_eq!(binary_result(BinaryOp::And, &Type::BOOL, &Type::BOOL), Some(Type::BOOL));
        assert_eq!(binary_result(BinaryOp::Less, &Type::INT, &Type::INT), Some(Type::BOOL));
        assert_eq!(binary_result(BinaryOp::Pow, &Type::REAL, &Type::INT), Some(Type::REAL));
        assert_eq!(binary_result(BinaryOp::Add, &Type::CHAR, &Type::CHAR), None);
    }
}
