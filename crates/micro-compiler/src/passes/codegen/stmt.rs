//! Statement code generation.
//!
//! Control flow is built from separate instruction lists whose first
//! instruction is the branch target, then appended in layout order. Guards
//! leave 0 or 1 on the stack and are tested against zero as `int`.

use log::warn;
use micro_parser::ast::{
    AssignStmt, Block, CallStmt, DoUntilStmt, IfStmt, Lvalue, ReadStmt, Stmt, WhileStmt,
    WriteStmt,
};

use super::{CodegenPass, READER_FIELD, READER_TYPE};
use crate::emit::{CodeGenerator, Condition, InstructionList, Opcode, Operand};

/// Type name used when testing a guard.
const GUARD_TYPE: &str = "int";

impl<G: CodeGenerator> CodegenPass<'_, G> {
    pub(super) fn visit_block(&mut self, block: &Block<'_>) -> InstructionList {
        let mut il = self.list();
        for stmt in block.stmts {
            il.append(self.visit_stmt(stmt));
        }
        il
    }

    fn visit_stmt(&mut self, stmt: &Stmt<'_>) -> InstructionList {
        let fatal = self.fatal;
        let mut il = match stmt {
            Stmt::Assign(assign) => self.visit_assign(assign),
            Stmt::Read(read) => self.visit_read(read),
            Stmt::Write(write) => self.visit_write(write),
            Stmt::Call(call) => self.visit_call_stmt(call),
            Stmt::Return(ret) => {
                warn!("at {}: return statements are not lowered", ret.span);
                self.list()
            }
            Stmt::If(stmt) => self.visit_if(stmt),
            Stmt::While(stmt) => self.visit_while(stmt),
            Stmt::DoUntil(stmt) => self.visit_do_until(stmt),
        };
        if self.fatal > fatal {
            il.dispose();
        }
        il
    }

    fn visit_assign(&mut self, assign: &AssignStmt<'_>) -> InstructionList {
        let mut il = self.list();
        let target = &assign.target;
        let target_type = self.types.type_of(target.id);
        let value_type = self.types.type_of(assign.value.id());

        match target.index {
            Some(index) => {
                self.emit_load(&mut il, &target.name);
                il.append(self.visit_expr(index));
                il.append(self.visit_expr(assign.value));
                Self::emit_cast(&mut il, &value_type, &target_type);
                if let Some(element) =
                    self.element_type(target_type, "array store", target.span)
                {
                    il.add_instruction(
                        Opcode::ArrayStore,
                        vec![Operand::Type(element.target_name().to_string())],
                    );
                }
            }
            None => {
                il.append(self.visit_expr(assign.value));
                Self::emit_cast(&mut il, &value_type, &target_type);
                self.emit_store(&mut il, &target.name);
            }
        }
        il
    }

    /// Push the shared reader and read one value of the target's type.
    fn emit_read_value(&mut self, il: &mut InstructionList, type_name: String) {
        il.add_instruction(
            Opcode::GetStatic,
            vec![
                Operand::Name(self.qualified(READER_FIELD)),
                Operand::Type(READER_TYPE.to_string()),
            ],
        );
        il.add_instruction(Opcode::ReadValue, vec![Operand::Type(type_name)]);
    }

    fn visit_read(&mut self, read: &ReadStmt<'_>) -> InstructionList {
        self.ensure_reader();
        let mut il = self.list();
        for target in read.targets {
            self.visit_read_target(&mut il, target);
        }
        il
    }

    fn visit_read_target(&mut self, il: &mut InstructionList, target: &Lvalue<'_>) {
        let ty = self.types.type_of(target.id);
        match target.index {
            Some(index) => {
                self.emit_load(il, &target.name);
                il.append(self.visit_expr(index));
                if let Some(element) = self.element_type(ty, "array read", target.span) {
                    let type_name = element.target_name().to_string();
                    self.emit_read_value(il, type_name.clone());
                    il.add_instruction(Opcode::ArrayStore, vec![Operand::Type(type_name)]);
                }
            }
            None if ty.is_array() || ty.is_void() => {}
            None => {
                self.emit_read_value(il, ty.target_name());
                self.emit_store(il, &target.name);
            }
        }
    }

    fn visit_write(&mut self, write: &WriteStmt<'_>) -> InstructionList {
        let mut il = self.list();
        for arg in write.args {
            il.append(self.visit_expr(arg));
            let ty = self.types.type_of(arg.id());
            il.add_instruction(Opcode::Print, vec![Operand::Type(ty.target_name())]);
        }
        il
    }

    fn visit_call_stmt(&mut self, call: &CallStmt<'_>) -> InstructionList {
        let mut il = self.list();
        for arg in call.args {
            il.append(self.visit_expr(arg));
        }

        let callable = self
            .scopes
            .resolve(self.current, call.callee.name)
            .and_then(|symbol| symbol.ty.as_ref())
            .and_then(|ty| ty.as_callable());
        if let Some(callable) = callable {
            il.add_instruction(
                Opcode::InvokeStatic,
                vec![Operand::Name(callable.invocation_descriptor())],
            );
            if !callable.is_procedure() {
                il.add_instruction(Opcode::Pop, vec![]);
            }
        }
        il
    }

    /// ```text
    ///         guard
    ///         ifzero -> next0
    ///         then
    ///         goto end            (only with elif/else)
    /// next0:  nop
    ///         guard1
    ///         ifzero -> next1
    ///         body1
    ///         goto end
    /// next1:  nop
    ///         else
    /// end:    nop                 (only with elif/else)
    /// ```
    fn visit_if(&mut self, stmt: &IfStmt<'_>) -> InstructionList {
        let mut il = self.visit_expr(stmt.guard);
        let mut end = self.list();
        let end_handle = end.add_instruction(Opcode::Nop, vec![]);

        let mut next = self.list();
        let next_handle = next.add_instruction(Opcode::Nop, vec![]);
        il.create_conditional_branch(Condition::IfZero, GUARD_TYPE, next_handle);
        il.append(self.visit_block(&stmt.then_branch));
        if stmt.has_alternatives() {
            il.create_unconditional_branch(end_handle);
        }
        il.append(next);

        for elif in stmt.elifs {
            il.append(self.visit_expr(elif.guard));
            let mut next = self.list();
            let next_handle = next.add_instruction(Opcode::Nop, vec![]);
            il.create_conditional_branch(Condition::IfZero, GUARD_TYPE, next_handle);
            il.append(self.visit_block(&elif.body));
            il.create_unconditional_branch(end_handle);
            il.append(next);
        }

        if let Some(else_branch) = &stmt.else_branch {
            il.append(self.visit_block(else_branch));
        }

        if stmt.has_alternatives() {
            il.append(end);
        } else {
            end.dispose();
        }
        il
    }

    /// ```text
    ///         goto guard
    /// top:    nop
    ///         body
    /// guard:  nop
    ///         guard
    ///         ifnonzero -> top
    /// ```
    fn visit_while(&mut self, stmt: &WhileStmt<'_>) -> InstructionList {
        let mut il = self.list();
        let mut guard = self.list();
        let guard_handle = guard.add_instruction(Opcode::Nop, vec![]);

        il.create_unconditional_branch(guard_handle);
        let top = il.add_instruction(Opcode::Nop, vec![]);
        il.append(guard);
        il.append(self.visit_expr(stmt.guard));
        il.create_conditional_branch(Condition::IfNonZero, GUARD_TYPE, top);

        let body = self.visit_block(&stmt.body);
        il.insert_after(top, body);
        il
    }

    /// ```text
    /// top:    nop
    ///         body
    ///         guard
    ///         ifzero -> top
    /// ```
    fn visit_do_until(&mut self, stmt: &DoUntilStmt<'_>) -> InstructionList {
        let mut il = self.list();
        let top = il.add_instruction(Opcode::Nop, vec![]);
        il.append(self.visit_block(&stmt.body));
        il.append(self.visit_expr(stmt.guard));
        il.create_conditional_branch(Condition::IfZero, GUARD_TYPE, top);
        il
    }
}

#[cfg(test)]
mod tests {
    use crate::emit::{AssembledRoutine, Condition, Opcode, Operand};
    use crate::passes::codegen::tests::{generate, main_of, opcodes};

    fn target_of(routine: &AssembledRoutine, index: usize) -> usize {
        match routine.branch_target(index) {
            Some(target) => target,
            None => panic!("instruction {index} is not a resolved branch"),
        }
    }

    #[test]
    fn if_without_alternatives_has_no_end_label() {
        let out = generate("program P; bool b; begin if b then write(1); fi; end.");
        let main = main_of(&out.unit);
        assert_eq!(
            opcodes(main),
            vec![
                Opcode::GetStatic,
                Opcode::If,
                Opcode::Const,
                Opcode::Print,
                Opcode::Nop,
                Opcode::Return,
            ]
        );
        assert_eq!(main.code[1].condition(), Some(Condition::IfZero));
        assert_eq!(target_of(main, 1), 4);
    }

    #[test]
    fn if_elif_else_layout() {
        let source = "
            program P;
            bool a;
            bool b;
            begin
                if a then write(1);
                elif b then write(2);
                else write(3);
                fi;
            end.
        ";
        let out = generate(source);
        let main = main_of(&out.unit);
        assert_eq!(
            opcodes(main),
            vec![
                Opcode::GetStatic, // 0: a
                Opcode::If,        // 1: ifzero -> 5
                Opcode::Const,
                Opcode::Print,
                Opcode::Goto,      // 4: -> end
                Opcode::Nop,       // 5
                Opcode::GetStatic, // 6: b
                Opcode::If,        // 7: ifzero -> 11
                Opcode::Const,
                Opcode::Print,
                Opcode::Goto,      // 10: -> end
                Opcode::Nop,       // 11
                Opcode::Const,
                Opcode::Print,
                Opcode::Nop,       // 14: end
                Opcode::Return,
            ]
        );
        assert_eq!(target_of(main, 1), 5);
        assert_eq!(target_of(main, 4), 14);
        assert_eq!(target_of(main, 7), 11);
        assert_eq!(target_of(main, 10), 14);
    }

    #[test]
    fn while_tests_the_guard_at_the_bottom() {
        let source = "
            program P;
            int i;
            begin
                while i < 10 do
                    i := i + 1;
                od;
            end.
        ";
        let out = generate(source);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let main = main_of(&out.unit);
        let code = opcodes(main);

        // goto guard; top: nop; body...; guard: nop; ...; ifnonzero -> top
        assert_eq!(code[0], Opcode::Goto);
        assert_eq!(code[1], Opcode::Nop);
        assert_eq!(
            &code[2..6],
            &[Opcode::GetStatic, Opcode::Const, Opcode::Op, Opcode::PutStatic]
        );
        assert_eq!(code[6], Opcode::Nop);
        assert_eq!(target_of(main, 0), 6);

        let last_branch = code.len() - 2;
        assert_eq!(code[last_branch], Opcode::If);
        assert_eq!(main.code[last_branch].condition(), Some(Condition::IfNonZero));
        assert_eq!(target_of(main, last_branch), 1);
        assert_eq!(code[code.len() - 1], Opcode::Return);
    }

    #[test]
    fn do_until_loops_while_guard_is_false() {
        let out = generate("program P; bool b; begin do write(1); until b; end.");
        let main = main_of(&out.unit);
        assert_eq!(
            opcodes(main),
            vec![
                Opcode::Nop,
                Opcode::Const,
                Opcode::Print,
                Opcode::GetStatic,
                Opcode::If,
                Opcode::Return,
            ]
        );
        assert_eq!(main.code[4].condition(), Some(Condition::IfZero));
        assert_eq!(target_of(main, 4), 0);
    }

    #[test]
    fn write_prints_each_value_with_its_type() {
        let out = generate("program P; begin write(1, 2.5, 'c', true); end.");
        let main = main_of(&out.unit);
        let printed: Vec<_> = main
            .code
            .iter()
            .filter(|i| i.opcode == Opcode::Print)
            .map(|i| i.operands.clone())
            .collect();
        assert_eq!(
            printed,
            vec![
                vec![Operand::Type("int".into())],
                vec![Operand::Type("double".into())],
                vec![Operand::Type("char".into())],
                vec![Operand::Type("boolean".into())],
            ]
        );
    }

    #[test]
    fn read_into_array_element() {
        let out = generate("program P; char s[8]; begin read(s[2]); end.");
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        let main = main_of(&out.unit);
        assert_eq!(
            opcodes(main),
            vec![
                Opcode::GetStatic,
                Opcode::Const,
                Opcode::GetStatic,
                Opcode::ReadValue,
                Opcode::ArrayStore,
                Opcode::Return,
            ]
        );
        assert_eq!(main.code[3].operands, vec![Operand::Type("char".into())]);
        assert_eq!(
            main.code[2].operands,
            vec![Operand::Name("P.$in".into()), Operand::Type("reader".into())]
        );
    }

    #[test]
    fn return_is_not_lowered() {
        let source = "
            program P;
            procedure f() begin return; end;
            begin end.
        ";
        let out = generate(source);
        let Some(f) = out.unit.routine("f") else {
            panic!("no routine f");
        };
        assert_eq!(opcodes(f), vec![Opcode::Return]);
    }
}
