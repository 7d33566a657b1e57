//! Reference Pass (Pass 2) - Resolve names and type-check.
//!
//! ## Responsibilities
//!
//! - Resolve every identifier use against the scope chain
//! - Annotate every expression and lvalue with its type, statements with `Void`
//! - Check assignments, operator operands, guards and call targets
//!
//! Every error is reported and traversal continues with `Void` in place of
//! the offending type, so one mistake may produce follow-up reports.

use log::trace;
use micro_core::{CompilationError, Diagnostics, Span};
use micro_parser::ast::{
    BinaryExpr, Block, Expr, Ident, LiteralKind, Lvalue, NodeId, OpCategory, Program,
    RoutineDecl, Stmt, UnaryExpr,
};

use crate::annotations::{ScopeMap, TypeMap};
use crate::operators;
use crate::passes::definition::DefinitionOutput;
use crate::scope::{ScopeId, ScopeTree, Symbol};
use crate::types::{PrimitiveType, Type};

/// Output of the reference pass.
#[derive(Debug)]
pub struct ReferenceOutput {
    pub types: TypeMap,
    pub errors: Vec<CompilationError>,
}

/// Pass 2: resolve and type every use.
pub struct ReferencePass<'a> {
    scopes: &'a ScopeTree,
    scope_map: &'a ScopeMap,
    types: TypeMap,
    current: ScopeId,
    diagnostics: Diagnostics,
}

impl<'a> ReferencePass<'a> {
    pub fn new(definitions: &'a DefinitionOutput) -> Self {
        Self {
            scopes: &definitions.scopes,
            scope_map: &definitions.scope_map,
            types: TypeMap::new(),
            current: definitions.global,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Run the reference pass on a program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> ReferenceOutput {
        if let Some(&scope) = self.scope_map.get(program.id) {
            self.current = scope;
        }

        for routine in program.routines() {
            self.visit_routine(routine);
        }
        self.visit_block(&program.body);

        ReferenceOutput {
            types: self.types,
            errors: self.diagnostics.take_errors(),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn lookup(&self, name: &str) -> Option<&'a Symbol> {
        self.scopes.resolve(self.current, name)
    }

    fn annotate(&mut self, node: NodeId, ty: Type) -> Type {
        trace!("{node}: {ty}");
        self.types.insert(node, ty.clone());
        ty
    }

    fn report(&mut self, error: CompilationError) {
        self.diagnostics.report(error);
    }

    fn undefined(&mut self, ident: &Ident<'_>) {
        self.report(CompilationError::UndefinedIdentifier {
            name: ident.name.to_string(),
            span: ident.span,
        });
    }

    /// Type of a name used as a value. The program marker is not a value.
    fn value_type(&mut self, ident: &Ident<'_>) -> Type {
        match self.lookup(ident.name).and_then(|symbol| symbol.ty.clone()) {
            Some(ty) => ty,
            None => {
                self.undefined(ident);
                Type::VOID
            }
        }
    }

    /// Return type of a called name.
    fn call_type(&mut self, callee: &Ident<'_>) -> Type {
        let Some(symbol) = self.lookup(callee.name) else {
            self.undefined(callee);
            return Type::VOID;
        };
        match symbol.ty.as_ref().and_then(Type::as_callable) {
            Some(callable) => Type::Primitive(callable.return_type),
            None => {
                self.report(CompilationError::NotAFunction {
                    name: callee.name.to_string(),
                    span: callee.span,
                });
                Type::VOID
            }
        }
    }

    fn check_guard(&mut self, construct: &'static str, guard: &Expr<'_>) {
        let ty = self.visit_expr(guard);
        if !ty.is_primitive(PrimitiveType::Bool) {
            self.report(CompilationError::InvalidGuardType {
                construct,
                found: ty.display_name(),
                span: guard.span(),
            });
        }
    }

    fn invalid_operands(&mut self, message: String, span: Span) {
        self.report(CompilationError::InvalidOperandType { message, span });
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn visit_routine(&mut self, routine: &RoutineDecl<'_>) {
        let parent = self.current;
        if let Some(&scope) = self.scope_map.get(routine.id) {
            self.current = scope;
        }
        self.visit_block(&routine.body);
        self.annotate(routine.id, Type::VOID);
        self.current = parent;
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn visit_block(&mut self, block: &Block<'_>) {
        for stmt in block.stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt<'_>) {
        match stmt {
            Stmt::Assign(assign) => {
                let target = self.visit_lvalue(&assign.target);
                let value = self.visit_expr(assign.value);
                if !operators::assignment_valid(&target, &value) {
                    self.report(CompilationError::AssignmentTypeMismatch {
                        target: target.display_name(),
                        value: value.display_name(),
                        span: assign.span,
                    });
                }
            }
            Stmt::Read(read) => {
                for target in read.targets {
                    let ty = self.visit_lvalue(target);
                    if ty.is_array() {
                        self.report(CompilationError::InvalidAssignmentTarget {
                            name: target.name.name.to_string(),
                            span: target.span,
                        });
                    }
                }
            }
            Stmt::Write(write) => {
                for arg in write.args {
                    self.visit_expr(arg);
                }
            }
            Stmt::Call(call) => {
                for arg in call.args {
                    self.visit_expr(arg);
                }
                self.call_type(&call.callee);
            }
            Stmt::Return(ret) => {
                if let Some(value) = ret.value {
                    self.visit_expr(value);
                }
            }
            Stmt::If(stmt) => {
                self.check_guard("if", stmt.guard);
                self.visit_block(&stmt.then_branch);
                for elif in stmt.elifs {
                    self.check_guard("elif", elif.guard);
                    self.visit_block(&elif.body);
                }
                if let Some(else_branch) = &stmt.else_branch {
                    self.visit_block(else_branch);
                }
            }
            Stmt::While(stmt) => {
                self.check_guard("while", stmt.guard);
                self.visit_block(&stmt.body);
            }
            Stmt::DoUntil(stmt) => {
                self.visit_block(&stmt.body);
                self.check_guard("until", stmt.guard);
            }
        }
        self.annotate(stmt.id(), Type::VOID);
    }

    /// Type of a storable location.
    ///
    /// Routines and the program name are not storable. An indexed target
    /// has its array's component type; indexing a non-array yields `Void`.
    fn visit_lvalue(&mut self, lvalue: &Lvalue<'_>) -> Type {
        if let Some(index) = lvalue.index {
            self.visit_expr(index);
        }

        let ty = match self.lookup(lvalue.name.name) {
            None => {
                self.undefined(&lvalue.name);
                Type::VOID
            }
            Some(symbol) => match &symbol.ty {
                None | Some(Type::Callable(_)) => {
                    self.report(CompilationError::InvalidAssignmentTarget {
                        name: lvalue.name.name.to_string(),
                        span: lvalue.name.span,
                    });
                    Type::VOID
                }
                Some(ty) if lvalue.is_indexed() => ty.component_type().unwrap_or(Type::VOID),
                Some(ty) => ty.clone(),
            },
        };
        self.annotate(lvalue.id, ty)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn visit_expr(&mut self, expr: &Expr<'_>) -> Type {
        let ty = match expr {
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Int(_) => Type::INT,
                LiteralKind::Real(_) => Type::REAL,
                LiteralKind::Char(_) => Type::CHAR,
                LiteralKind::Bool(_) => Type::BOOL,
            },
            Expr::Ident(ident) => self.value_type(&ident.ident),
            Expr::Binary(binary) => self.visit_binary(binary),
            Expr::Unary(unary) => self.visit_unary(unary),
            Expr::Call(call) => {
                for arg in call.args {
                    self.visit_expr(arg);
                }
                self.call_type(&call.callee)
            }
            Expr::Index(index) => {
                self.visit_expr(index.index);
                let array = self.value_type(&index.array);
                array.component_type().unwrap_or(Type::VOID)
            }
            Expr::Paren(paren) => self.visit_expr(paren.expr),
        };
        self.annotate(expr.id(), ty)
    }

    fn visit_binary(&mut self, binary: &BinaryExpr<'_>) -> Type {
        let left = self.visit_expr(binary.left);
        let right = self.visit_expr(binary.right);
        if let Some(ty) = operators::binary_result(binary.op, &left, &right) {
            return ty;
        }

        let message = match binary.op.category() {
            OpCategory::Logical => format!("{left} and {right} cannot be combined with '{}'", binary.op),
            OpCategory::Comparison => format!("{left} cannot be compared with {right}"),
            OpCategory::Arithmetic => format!("{left} and {right} cannot be combined with '{}'", binary.op),
            OpCategory::Power => format!("{left} cannot be raised to {right}"),
        };
        self.invalid_operands(message, binary.span);
        Type::VOID
    }

    fn visit_unary(&mut self, unary: &UnaryExpr<'_>) -> Type {
        let operand = self.visit_expr(unary.operand);
        match operators::unary_result(unary.op, &operand) {
            Some(ty) => ty,
            None => {
                self.invalid_operands(
                    format!("'{}' cannot be applied to {operand}", unary.op),
                    unary.span,
                );
                Type::VOID
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::DefinitionPass;
    use bumpalo::Bump;
    use micro_core::ErrorKind;
    use micro_parser::Parser;

    struct Checked {
        types: TypeMap,
        errors: Vec<CompilationError>,
    }

    fn check(source: &str) -> Checked {
        let arena = Bump::new();
        let program = match Parser::parse(source, &arena) {
            Ok(program) => program,
            Err(errors) => panic!("parse failed: {errors}"),
        };
        let definitions = DefinitionPass::new().run(&program);
        let mut errors = definitions.errors.clone();
        let out = ReferencePass::new(&definitions).run(&program);
        errors.extend(out.errors);
        Checked {
            types: out.types,
            errors,
        }
    }

    fn kinds(errors: &[CompilationError]) -> Vec<ErrorKind> {
        errors.iter().map(CompilationError::kind).collect()
    }

    /// Type of the value assigned by the first statement of the main body.
    fn first_value_type(source: &str) -> (Type, Vec<ErrorKind>) {
        let arena = Bump::new();
        let program = Parser::parse(source, &arena).unwrap();
        let definitions = DefinitionPass::new().run(&program);
        let out = ReferencePass::new(&definitions).run(&program);
        let Stmt::Assign(assign) = program.body.stmts[0] else {
            panic!("expected assignment");
        };
        (out.types.type_of(assign.value.id()), kinds(&out.errors))
    }

    #[test]
    fn clean_program_has_no_errors() {
        let source = "
            program P;
            int x;
            real r;
            bool b;
            char c;
            real a[4];
            begin
                x := 5;
                r := x * 2;
                b := x < 10 and not (r = 1.5);
                c := 'a' + 1;
                a[x - 2] := r / 3;
                write(x, r, b, c);
            end.
        ";
        let arena = Bump::new();
        let program = Parser::parse(source, &arena).unwrap();
        let definitions = DefinitionPass::new().run(&program);
        let out = ReferencePass::new(&definitions).run(&program);
        assert!(definitions.errors.is_empty(), "{:?}", definitions.errors);
        assert!(out.errors.is_empty(), "{:?}", out.errors);

        let mut assignments = 0;
        for stmt in program.body.stmts {
            let Stmt::Assign(assign) = stmt else {
                continue;
            };
            let target = out.types.type_of(assign.target.id);
            let value = out.types.type_of(assign.value.id());
            assert!(
                operators::assignment_valid(&target, &value),
                "{} := {}",
                target.display_name(),
                value.display_name()
            );
            assignments += 1;
        }
        assert_eq!(assignments, 5);
    }

    #[test]
    fn mixed_arithmetic_widens_to_real() {
        let (ty, errors) = first_value_type("program P; real r; begin r := 1 + 2.5; end.");
        assert!(errors.is_empty());
        assert_eq!(ty, Type::REAL);
    }

    #[test]
    fn char_arithmetic() {
        let (ty, _) = first_value_type("program P; int d; begin d := 'b' - 'a'; end.");
        assert_eq!(ty, Type::INT);

        let (ty, _) = first_value_type("program P; char c; begin c := 'a' + 1; end.");
        assert_eq!(ty, Type::CHAR);

        let (ty, _) = first_value_type("program P; char c; begin c := 1 + 'a'; end.");
        assert_eq!(ty, Type::CHAR);

        let (ty, errors) = first_value_type("program P; char c; begin c := 1 - 'a'; end.");
        assert_eq!(ty, Type::VOID);
        assert_eq!(errors[0], ErrorKind::InvalidOperandType);
    }

    #[test]
    fn power_types() {
        let (ty, _) = first_value_type("program P; int x; begin x := 2 ** 3; end.");
        assert_eq!(ty, Type::INT);
        let (ty, _) = first_value_type("program P; real x; begin x := 2 ** 0.5; end.");
        assert_eq!(ty, Type::REAL);
        let (_, errors) = first_value_type("program P; bool b; begin b := true ** true; end.");
        assert_eq!(errors[0], ErrorKind::InvalidOperandType);
    }

    #[test]
    fn comparison_of_char_with_int_is_rejected() {
        let (ty, errors) = first_value_type("program P; bool b; begin b := 'a' < 1; end.");
        assert_eq!(ty, Type::VOID);
        assert_eq!(errors[0], ErrorKind::InvalidOperandType);
    }

    #[test]
    fn undefined_identifier_cascades() {
        let checked = check("program P; int x; begin x := y; end.");
        assert_eq!(
            kinds(&checked.errors),
            vec![ErrorKind::UndefinedIdentifier, ErrorKind::AssignmentTypeMismatch]
        );
    }

    #[test]
    fn assignment_mismatch() {
        let checked = check("program P; int x; begin x := true; end.");
        assert_eq!(kinds(&checked.errors), vec![ErrorKind::AssignmentTypeMismatch]);
        assert!(
            checked.errors[0]
                .to_string()
                .ends_with("bool cannot be assigned to int")
        );
    }

    #[test]
    fn int_and_real_assign_both_ways() {
        let checked = check("program P; int i; real r; begin i := 2.5; r := 3; end.");
        assert!(checked.errors.is_empty());
    }

    #[test]
    fn guards_must_be_bool() {
        let source = "
            program P;
            int x;
            begin
                if x then write(x); elif 1 then write(x); fi;
                while x do x := 1; od;
                do x := 1; until x + 1;
            end.
        ";
        let checked = check(source);
        let constructs: Vec<_> = checked
            .errors
            .iter()
            .map(|e| match e {
                CompilationError::InvalidGuardType { construct, .. } => *construct,
                other => panic!("unexpected {other}"),
            })
            .collect();
        assert_eq!(constructs, vec!["if", "elif", "while", "until"]);
    }

    #[test]
    fn calls_check_the_callee() {
        let source = "
            program P;
            int x;
            function int f(int a) begin return a; end;
            procedure g() begin end;
            begin
                x := f(1);
                call g();
                call x();
                call h();
                call P();
            end.
        ";
        let checked = check(source);
        assert_eq!(
            kinds(&checked.errors),
            vec![
                ErrorKind::NotAFunction,
                ErrorKind::UndefinedIdentifier,
                ErrorKind::NotAFunction
            ]
        );
    }

    #[test]
    fn program_name_is_not_a_value() {
        let checked = check("program P; int x; begin x := P; P := 1; end.");
        assert_eq!(
            kinds(&checked.errors),
            vec![
                ErrorKind::UndefinedIdentifier,
                ErrorKind::AssignmentTypeMismatch,
                ErrorKind::InvalidAssignmentTarget,
                ErrorKind::AssignmentTypeMismatch,
            ]
        );
    }

    #[test]
    fn routine_is_not_assignable() {
        let checked = check("program P; procedure f() begin end; begin f := 1; end.");
        assert_eq!(
            kinds(&checked.errors)[0],
            ErrorKind::InvalidAssignmentTarget
        );
    }

    #[test]
    fn array_element_types() {
        let source = "
            program P;
            int a[10];
            real r;
            begin
                a[1] := 3;
                r := a[2] + 0.5;
                read(a[0]);
            end.
        ";
        let checked = check(source);
        assert!(checked.errors.is_empty(), "{:?}", checked.errors);
    }

    #[test]
    fn reading_whole_array_is_rejected() {
        let checked = check("program P; int a[3]; begin read(a); end.");
        assert_eq!(kinds(&checked.errors), vec![ErrorKind::InvalidAssignmentTarget]);
    }

    #[test]
    fn indexing_a_scalar_degrades_to_void() {
        let (ty, errors) = first_value_type("program P; int x; int y; begin x := y[1]; end.");
        assert_eq!(ty, Type::VOID);
        assert_eq!(errors, vec![ErrorKind::AssignmentTypeMismatch]);
    }

    #[test]
    fn locals_shadow_globals() {
        let source = "
            program P;
            int x;
            procedure f()
                bool x;
            begin
                x := true;
            end;
            begin
                x := 1;
            end.
        ";
        let checked = check(source);
        assert!(checked.errors.is_empty(), "{:?}", checked.errors);
    }

    #[test]
    fn unary_operands() {
        let checked = check(
            "program P; int x; bool b; begin x := -x; x := ~x; b := not b; x := ~1.5; b := not 1; end.",
        );
        assert_eq!(
            kinds(&checked.errors),
            vec![
                ErrorKind::InvalidOperandType,
                ErrorKind::AssignmentTypeMismatch,
                ErrorKind::InvalidOperandType,
                ErrorKind::AssignmentTypeMismatch,
            ]
        );
    }

    #[test]
    fn statements_are_typed_void() {
        let arena = Bump::new();
        let program = Parser::parse("program P; int x; begin x := 1; end.", &arena).unwrap();
        let definitions = DefinitionPass::new().run(&program);
        let out = ReferencePass::new(&definitions).run(&program);
        let stmt = program.body.stmts[0];
        assert_eq!(out.types.get(stmt.id()), Some(&Type::VOID));
    }
}
