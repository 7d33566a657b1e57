//! Expression code generation.
//!
//! Every expression leaves exactly one value on the stack. Operands are cast
//! to the operator's working type before the operator runs; comparisons and
//! logical operators materialize their result as a `bool` constant on one of
//! two paths.

use log::warn;
use micro_parser::ast::{BinaryExpr, BinaryOp, Expr, LiteralKind, OpCategory, UnaryExpr, UnaryOp};
use ordered_float::OrderedFloat;

use super::CodegenPass;
use crate::emit::{CodeGenerator, Condition, InstructionList, Opcode, Operand};
use crate::operators;
use crate::types::{PrimitiveType, Type};

/// Static routine computing `double ** double`.
const POW_DESCRIPTOR: &str = "Math.pow(double,double)double";

fn comparison_condition(op: BinaryOp) -> Option<Condition> {
    match op {
        BinaryOp::Equal => Some(Condition::Eq),
        BinaryOp::NotEqual => Some(Condition::Ne),
        BinaryOp::Less => Some(Condition::Lt),
        BinaryOp::LessEqual => Some(Condition::Le),
        BinaryOp::Greater => Some(Condition::Gt),
        BinaryOp::GreaterEqual => Some(Condition::Ge),
        _ => None,
    }
}

impl<G: CodeGenerator> CodegenPass<'_, G> {
    pub(super) fn visit_expr(&mut self, expr: &Expr<'_>) -> InstructionList {
        let mut il = self.list();
        match expr {
            Expr::Literal(lit) => {
                let value = match lit.kind {
                    LiteralKind::Int(v) => Operand::Int(v),
                    LiteralKind::Real(v) => Operand::Real(OrderedFloat(v)),
                    LiteralKind::Char(c) => Operand::Char(c),
                    LiteralKind::Bool(b) => Operand::Bool(b),
                };
                il.add_instruction(Opcode::Const, vec![value]);
            }
            Expr::Ident(ident) => self.emit_load(&mut il, &ident.ident),
            Expr::Binary(binary) => il.append(self.visit_binary(binary)),
            Expr::Unary(unary) => il.append(self.visit_unary(unary)),
            Expr::Call(call) => {
                warn!(
                    "at {}: call to {} in an expression is not lowered; \
                     the enclosing store or operation has no operand and the listing is not valid code",
                    call.span, call.callee
                );
            }
            Expr::Index(index) => {
                self.emit_load(&mut il, &index.array);
                il.append(self.visit_expr(index.index));
                let ty = self.types.type_of(index.id);
                if let Some(element) = self.element_type(ty, "array load", index.span) {
                    il.add_instruction(
                        Opcode::ArrayLoad,
                        vec![Operand::Type(element.target_name().to_string())],
                    );
                }
            }
            Expr::Paren(paren) => il.append(self.visit_expr(paren.expr)),
        }
        il
    }

    /// Evaluate `expr` and convert it to `to`.
    fn visit_operand(&mut self, expr: &Expr<'_>, to: &Type) -> InstructionList {
        let mut il = self.visit_expr(expr);
        let from = self.types.type_of(expr.id());
        Self::emit_cast(&mut il, &from, to);
        il
    }

    fn visit_binary(&mut self, binary: &BinaryExpr<'_>) -> InstructionList {
        match binary.op.category() {
            OpCategory::Logical => self.visit_logical(binary),
            OpCategory::Comparison => self.visit_comparison(binary),
            OpCategory::Arithmetic => self.visit_arithmetic(binary),
            OpCategory::Power => self.visit_power(binary),
        }
    }

    fn visit_arithmetic(&mut self, binary: &BinaryExpr<'_>) -> InstructionList {
        let result = self.types.type_of(binary.id);
        let mut il = self.visit_operand(binary.left, &result);
        il.append(self.visit_operand(binary.right, &result));
        il.add_instruction(
            Opcode::Op,
            vec![
                Operand::Name(binary.op.symbol().to_string()),
                Operand::Type(result.target_name()),
            ],
        );
        il
    }

    /// Both operands are computed as `double`; an int result is truncated back.
    fn visit_power(&mut self, binary: &BinaryExpr<'_>) -> InstructionList {
        let result = self.types.type_of(binary.id);
        let mut il = self.visit_operand(binary.left, &Type::REAL);
        il.append(self.visit_operand(binary.right, &Type::REAL));
        il.add_instruction(
            Opcode::InvokeStatic,
            vec![Operand::Name(POW_DESCRIPTOR.to_string())],
        );
        if result.is_primitive(PrimitiveType::Int) {
            Self::emit_cast(&mut il, &Type::REAL, &Type::INT);
        }
        il
    }

    /// ```text
    ///         left, right
    ///         if <cond> -> true
    ///         const false
    ///         goto end
    /// true:   const true
    /// end:    nop
    /// ```
    fn visit_comparison(&mut self, binary: &BinaryExpr<'_>) -> InstructionList {
        let left_type = self.types.type_of(binary.left.id());
        let right_type = self.types.type_of(binary.right.id());
        let operand_type = operators::comparison_operand_type(&left_type, &right_type);

        let mut il = self.visit_operand(binary.left, &operand_type);
        il.append(self.visit_operand(binary.right, &operand_type));

        let mut on_true = self.list();
        let true_handle = on_true.add_instruction(Opcode::Const, vec![Operand::Bool(true)]);
        let mut end = self.list();
        let end_handle = end.add_instruction(Opcode::Nop, vec![]);

        let condition = comparison_condition(binary.op).unwrap_or(Condition::Eq);
        il.create_conditional_branch(condition, &operand_type.target_name(), true_handle);
        il.add_instruction(Opcode::Const, vec![Operand::Bool(false)]);
        il.create_unconditional_branch(end_handle);
        il.append(on_true);
        il.append(end);
        il
    }

    /// The right operand is skipped once the left one decides the result.
    ///
    /// ```text
    ///         left
    ///         ifzero -> short     (and; ifnonzero for or)
    ///         right
    ///         goto end
    /// short:  const false         (and; const true for or)
    /// end:    nop
    /// ```
    fn visit_logical(&mut self, binary: &BinaryExpr<'_>) -> InstructionList {
        let (condition, short_value) = match binary.op {
            BinaryOp::Or => (Condition::IfNonZero, true),
            _ => (Condition::IfZero, false),
        };

        let mut il = self.visit_expr(binary.left);
        let mut short = self.list();
        let short_handle = short.add_instruction(Opcode::Const, vec![Operand::Bool(short_value)]);
        let mut end = self.list();
        let end_handle = end.add_instruction(Opcode::Nop, vec![]);

        il.create_conditional_branch(condition, "int", short_handle);
        il.append(self.visit_expr(binary.right));
        il.create_unconditional_branch(end_handle);
        il.append(short);
        il.append(end);
        il
    }

    fn visit_unary(&mut self, unary: &UnaryExpr<'_>) -> InstructionList {
        let mut il = self.visit_expr(unary.operand);
        match unary.op {
            UnaryOp::Plus => {}
            UnaryOp::Neg => {
                let ty = self.types.type_of(unary.id);
                il.add_instruction(Opcode::Neg, vec![Operand::Type(ty.target_name())]);
            }
            // Both flip bits with an xor mask: all ones for `~`, the low bit for `not`.
            UnaryOp::BitNot | UnaryOp::Not => {
                let mask = if unary.op == UnaryOp::BitNot { -1 } else { 1 };
                il.add_instruction(Opcode::Const, vec![Operand::Int(mask)]);
                il.add_instruction(
                    Opcode::Op,
                    vec![Operand::Name("^".to_string()), Operand::Type("int".to_string())],
                );
            }
        }
        il
    }
}
