//! Declarations: storage for variables, frames for routines and `main`.

use log::debug;
use micro_parser::ast::{Block, RoutineDecl, RoutineKind, VarDecl};

use super::CodegenPass;
use crate::emit::{CodeGenerator, InstructionList, Opcode, Operand, RoutineFlags, RoutineHandle};
use crate::scope::ScopeId;
use crate::types::{PrimitiveType, Type};

impl<G: CodeGenerator> CodegenPass<'_, G> {
    /// Type of a declaration that owns its symbol. `None` for a redeclaration.
    fn declared_type(&self, scope: ScopeId, var: &VarDecl<'_>) -> Option<Type> {
        if !self.owns_symbol(var.id) {
            debug!("skipping redeclared {}", var.name);
            return None;
        }
        self.scopes
            .lookup_local(scope, var.name.name)
            .and_then(|symbol| symbol.ty.clone())
    }

    /// Push a new array of `length` elements.
    fn emit_new_array(il: &mut InstructionList, component: PrimitiveType, length: u32) {
        let length = i32::try_from(length).unwrap_or(i32::MAX);
        il.add_instruction(Opcode::Const, vec![Operand::Int(length)]);
        il.add_instruction(
            Opcode::NewArray,
            vec![Operand::Type(component.target_name().to_string())],
        );
    }

    /// A static field, plus array creation in the module initializer.
    pub(super) fn visit_global(&mut self, var: &VarDecl<'_>) {
        let Some(ty) = self.declared_type(self.global, var) else {
            return;
        };
        let type_name = ty.target_name();
        self.generator.add_static_field(var.name.name, &type_name);

        if let Type::Array { component, length } = ty {
            let initializer = self.initializer();
            let mut code = self.list();
            Self::emit_new_array(&mut code, component, length);
            code.add_instruction(
                Opcode::PutStatic,
                vec![
                    Operand::Name(self.qualified(var.name.name)),
                    Operand::Type(type_name),
                ],
            );
            self.generator.append_code(initializer, code);
        }
    }

    /// A local slot; arrays are created in place at routine entry.
    fn visit_local(&mut self, routine: RoutineHandle, var: &VarDecl<'_>, il: &mut InstructionList) {
        let Some(ty) = self.declared_type(self.current, var) else {
            return;
        };
        self.generator
            .add_local_slot(routine, var.name.name, &ty.target_name());

        if let Type::Array { component, length } = ty {
            Self::emit_new_array(il, component, length);
            il.add_instruction(Opcode::AStore, vec![Operand::Name(var.name.name.to_string())]);
        }
    }

    pub(super) fn visit_routine(&mut self, routine: &RoutineDecl<'_>) {
        if !self.owns_symbol(routine.id) {
            debug!("skipping redefined routine {}", routine.name);
            return;
        }
        let return_type = match routine.kind {
            RoutineKind::Procedure => PrimitiveType::Void,
            RoutineKind::Function(kind) => kind.into(),
        };
        let params: Vec<(String, String)> = routine
            .params
            .iter()
            .map(|p| (Type::from_param(&p.ty).target_name(), p.name.name.to_string()))
            .collect();

        debug!("generating routine {}", routine.name);
        let handle = self.generator.begin_routine(
            RoutineFlags::PUBLIC | RoutineFlags::STATIC,
            return_type.target_name(),
            routine.name.name,
            &params,
        );

        let parent = self.current;
        if let Some(&scope) = self.scope_map.get(routine.id) {
            self.current = scope;
        }

        let mut il = self.list();
        for local in routine.locals {
            self.visit_local(handle, local, &mut il);
        }
        il.append(self.visit_block(&routine.body));

        // Functions get no implicit return; `return` values are not lowered yet.
        if !routine.is_function() {
            il.add_instruction(Opcode::Return, vec![]);
        }

        self.generator.append_code(handle, il);
        self.generator.end_routine(handle);
        self.current = parent;
    }

    /// The program body becomes the unit's entry point.
    pub(super) fn visit_main(&mut self, body: &Block<'_>) {
        let params = [("String[]".to_string(), "args".to_string())];
        let handle = self.generator.begin_routine(
            RoutineFlags::PUBLIC | RoutineFlags::STATIC,
            "void",
            "main",
            &params,
        );
        self.current = self.global;

        let mut il = self.visit_block(body);
        il.add_instruction(Opcode::Return, vec![]);
        self.generator.append_code(handle, il);
        self.generator.end_routine(handle);
    }
}
