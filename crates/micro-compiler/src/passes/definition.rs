//! Definition Pass (Pass 1) - Build scopes and define every declared name.
//!
//! ## Responsibilities
//!
//! - Create the global scope and define the program name in it as a marker
//! - Define global variables
//! - Create one local scope per routine, define its parameters and locals
//! - Define each routine's callable signature in the enclosing scope once
//!   its body has been visited
//! - Annotate the program root and every routine with its scope
//!
//! Duplicate names are reported and the first definition is kept. The ids
//! of the declarations that won their name are recorded so later passes can
//! leave the rejected ones out.

use log::debug;
use micro_core::{CompilationError, Diagnostics};
use micro_parser::ast::{Ident, NodeId, Program, RoutineDecl, RoutineKind, VarDecl};
use rustc_hash::FxHashSet;
use std::rc::Rc;

use crate::annotations::ScopeMap;
use crate::scope::{ScopeId, ScopeKind, ScopeTree};
use crate::types::{CallableType, PrimitiveType, Type};

/// Output of the definition pass.
#[derive(Debug)]
pub struct DefinitionOutput {
    pub scopes: ScopeTree,
    pub scope_map: ScopeMap,
    pub global: ScopeId,
    /// Variable, parameter and routine declarations that own their symbol.
    pub declared: FxHashSet<NodeId>,
    pub errors: Vec<CompilationError>,
}

impl DefinitionOutput {
    /// `node` declared its name without a redefinition.
    pub fn owns_symbol(&self, node: NodeId) -> bool {
        self.declared.contains(&node)
    }
}

/// Pass 1: define every declared name.
pub struct DefinitionPass {
    scopes: ScopeTree,
    scope_map: ScopeMap,
    declared: FxHashSet<NodeId>,
    current: ScopeId,
    global: ScopeId,
    program_name: String,
    diagnostics: Diagnostics,
}

impl Default for DefinitionPass {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionPass {
    pub fn new() -> Self {
        let mut scopes = ScopeTree::new();
        let global = scopes.create(ScopeKind::Global, None);
        Self {
            scopes,
            scope_map: ScopeMap::new(),
            declared: FxHashSet::default(),
            current: global,
            global,
            program_name: String::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Run the definition pass on a program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> DefinitionOutput {
        self.program_name = program.name.name.to_string();
        self.scopes.define_marker(self.global, program.name.name);
        self.scope_map.insert(program.id, self.global);

        for var in program.globals() {
            self.visit_var_decl(var);
        }
        for routine in program.routines() {
            self.visit_routine(routine);
        }

        debug!(
            "definition pass: {} scopes, {} errors",
            self.scopes.len(),
            self.diagnostics.len()
        );

        DefinitionOutput {
            scopes: self.scopes,
            scope_map: self.scope_map,
            global: self.global,
            declared: self.declared,
            errors: self.diagnostics.take_errors(),
        }
    }

    fn visit_var_decl(&mut self, var: &VarDecl<'_>) {
        self.define(var.id, &var.name, Type::from_decl(&var.ty));
    }

    fn visit_routine(&mut self, routine: &RoutineDecl<'_>) {
        let return_type = match routine.kind {
            RoutineKind::Procedure => PrimitiveType::Void,
            RoutineKind::Function(kind) => kind.into(),
        };

        let parent = self.current;
        let scope = self.scopes.create(ScopeKind::Local, Some(parent));
        self.scope_map.insert(routine.id, scope);
        self.current = scope;

        let mut param_names = Vec::with_capacity(routine.params.len());
        let mut param_type_names = Vec::with_capacity(routine.params.len());
        for param in routine.params {
            let ty = Type::from_param(&param.ty);
            param_names.push(param.name.name.to_string());
            param_type_names.push(ty.target_name());
            self.define(param.id, &param.name, ty);
        }

        for local in routine.locals {
            self.visit_var_decl(local);
        }

        let callable = CallableType {
            qualified_name: format!("{}.{}", self.program_name, routine.name.name),
            return_type,
            param_names,
            param_type_names,
        };
        debug!("defined routine {}", callable.invocation_descriptor());

        self.current = parent;
        self.define(routine.id, &routine.name, Type::Callable(Rc::new(callable)));
    }

    fn define(&mut self, node: NodeId, name: &Ident<'_>, ty: Type) {
        if self.scopes.define(self.current, name.name, ty) {
            self.declared.insert(node);
        } else {
            self.diagnostics.report(CompilationError::Redefinition {
                name: name.name.to_string(),
                span: name.span,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use micro_core::ErrorKind;
    use micro_parser::Parser;

    fn define(source: &str) -> DefinitionOutput {
        let arena = Bump::new();
        let program = match Parser::parse(source, &arena) {
            Ok(program) => program,
            Err(errors) => panic!("parse failed: {errors}"),
        };
        DefinitionPass::new().run(&program)
    }

    #[test]
    fn globals_and_program_marker() {
        let out = define("program P; int x; real a[5]; begin end.");
        assert!(out.errors.is_empty());
        assert!(out.scopes.resolve(out.global, "P").is_some_and(|s| s.is_marker()));
        assert_eq!(
            out.scopes.resolve(out.global, "x").and_then(|s| s.ty.clone()),
            Some(Type::INT)
        );
        assert_eq!(
            out.scopes.resolve(out.global, "a").and_then(|s| s.ty.clone()),
            Some(Type::Array {
                component: PrimitiveType::Real,
                length: 5
            })
        );
    }

    #[test]
    fn redefinition_keeps_first_declaration() {
        let out = define("program P; int x; real x; begin end.");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind(), ErrorKind::Redefinition);
        assert_eq!(
            out.scopes.resolve(out.global, "x").and_then(|s| s.ty.clone()),
            Some(Type::INT)
        );
    }

    #[test]
    fn routine_scope_and_signature() {
        let source = "
            program P;
            int x;
            function char f(int a[], real r)
                bool x;
            begin
            end;
            begin end.
        ";
        let out = define(source);
        assert!(out.errors.is_empty());
        assert_eq!(out.scopes.len(), 2);

        let f = out.scopes.resolve(out.global, "f").and_then(|s| s.ty.clone());
        let Some(Type::Callable(callable)) = f else {
            panic!("expected callable, got {f:?}");
        };
        assert_eq!(callable.qualified_name, "P.f");
        assert_eq!(callable.return_type, PrimitiveType::Char);
        assert_eq!(callable.param_names, vec!["a", "r"]);
        assert_eq!(callable.param_type_names, vec!["int[]", "double"]);
    }

    #[test]
    fn locals_shadow_globals() {
        let arena = Bump::new();
        let source = "program P; int x; procedure f() bool x; begin end; begin end.";
        let program = Parser::parse(source, &arena).unwrap();
        let out = DefinitionPass::new().run(&program);
        assert!(out.errors.is_empty());

        let routine = program.routines().next().unwrap();
        let local = *out.scope_map.get(routine.id).unwrap();
        assert_eq!(out.scopes.kind(local), ScopeKind::Local);
        assert_eq!(out.scopes.parent(local), Some(out.global));
        assert_eq!(
            out.scopes.resolve(local, "x").and_then(|s| s.ty.clone()),
            Some(Type::BOOL)
        );
        assert_eq!(out.scope_map.get(program.id), Some(&out.global));
    }

    #[test]
    fn duplicate_parameter_is_reported() {
        let out = define("program P; procedure f(int a, real a) begin end; begin end.");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind(), ErrorKind::Redefinition);
    }

    #[test]
    fn only_first_declaration_owns_its_name() {
        let arena = Bump::new();
        let source = "
            program P;
            int a[3];
            int a[5];
            procedure f(int n) real n; begin end;
            procedure f() begin end;
            begin end.
        ";
        let program = Parser::parse(source, &arena).unwrap();
        let out = DefinitionPass::new().run(&program);
        assert_eq!(out.errors.len(), 3);

        let globals: Vec<_> = program.globals().collect();
        assert!(out.owns_symbol(globals[0].id));
        assert!(!out.owns_symbol(globals[1].id));

        let routines: Vec<_> = program.routines().collect();
        assert!(out.owns_symbol(routines[0].id));
        assert!(out.owns_symbol(routines[0].params[0].id));
        assert!(!out.owns_symbol(routines[0].locals[0].id));
        assert!(!out.owns_symbol(routines[1].id));
    }

    #[test]
    fn routine_named_like_global_is_reported() {
        let out = define("program P; int f; procedure f() begin end; begin end.");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            out.scopes.resolve(out.global, "f").and_then(|s| s.ty.clone()),
            Some(Type::INT)
        );
    }

    #[test]
    fn parameter_array_length_is_erased() {
        let arena = Bump::new();
        let source = "program P; procedure f(char s[]) begin end; begin end.";
        let program = Parser::parse(source, &arena).unwrap();
        let out = DefinitionPass::new().run(&program);
        let routine = program.routines().next().unwrap();
        let local = *out.scope_map.get(routine.id).unwrap();
        assert_eq!(
            out.scopes.lookup_local(local, "s").and_then(|s| s.ty.clone()),
            Some(Type::Array {
                component: PrimitiveType::Char,
                length: 0
            })
        );
    }
}
