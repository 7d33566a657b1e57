//! Statement parsing functions for Micro.
//!
//! Every statement ends with `;`, including the structured ones
//! (`if .. fi;`, `while .. od;`, `do .. until e;`).

use super::parser::Parser;
use crate::ast::stmt::*;
use crate::ast::{Expr, ParseError, ParseErrorKind};
use crate::lexer::TokenKind;
use bumpalo::collections::Vec as BVec;

impl<'ast> Parser<'ast> {
    /// Parse a statement.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        match self.peek().kind {
            TokenKind::Read => self.parse_read(),
            TokenKind::Write => self.parse_write(),
            TokenKind::Call => self.parse_call_stmt(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_until(),
            TokenKind::Identifier => self.parse_assign(),
            _ => {
                let mut error = self.unexpected("statement");
                if error.kind == ParseErrorKind::ExpectedToken {
                    error.kind = ParseErrorKind::ExpectedStatement;
                }
                Err(error)
            }
        }
    }

    /// Parse statements until one of `terminators` is next. The terminator
    /// is not consumed.
    pub(super) fn parse_block_until(
        &mut self,
        terminators: &[TokenKind],
    ) -> Result<Block<'ast>, ParseError> {
        let start = self.peek().span;
        let mut stmts = BVec::new_in(self.arena);
        while !terminators.contains(&self.peek().kind) {
            stmts.push(self.parse_statement()?);
        }
        let span = match stmts.last() {
            Some(last) => start.to(last.span()),
            None => micro_core::Span::point(start.line, start.col),
        };
        Ok(Block {
            stmts: stmts.into_bump_slice(),
            span,
        })
    }

    /// Grammar: `ID ('[' EXPR ']')?`
    fn parse_lvalue(&mut self) -> Result<Lvalue<'ast>, ParseError> {
        let id = self.next_id();
        let name = self.expect_ident()?;
        let index = if self.eat(TokenKind::LeftBracket).is_some() {
            let index = self.parse_expr(0)?;
            self.expect(TokenKind::RightBracket)?;
            Some(index)
        } else {
            None
        };
        Ok(Lvalue {
            id,
            name,
            index,
            span: name.span.to(self.previous_span()),
        })
    }

    /// Grammar: `'(' (EXPR (',' EXPR)*)? ')'`
    pub(super) fn parse_expr_list(&mut self) -> Result<&'ast [&'ast Expr<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            args.push(self.parse_expr(0)?);
            while self.eat(TokenKind::Comma).is_some() {
                args.push(self.parse_expr(0)?);
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(args.into_bump_slice())
    }

    /// Grammar: `LVALUE ':=' EXPR ';'`
    fn parse_assign(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let id = self.next_id();
        let target = self.parse_lvalue()?;
        self.expect(TokenKind::ColonEqual)?;
        let value = self.parse_expr(0)?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Assign(self.arena.alloc(AssignStmt {
            id,
            target,
            value,
            span: target.span.to(end),
        })))
    }

    /// Grammar: `'read' '(' LVALUE (',' LVALUE)* ')' ';'`
    fn parse_read(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let id = self.next_id();
        let start = self.expect(TokenKind::Read)?.span;
        self.expect(TokenKind::LeftParen)?;
        let mut targets = BVec::new_in(self.arena);
        targets.push(self.parse_lvalue()?);
        while self.eat(TokenKind::Comma).is_some() {
            targets.push(self.parse_lvalue()?);
        }
        self.expect(TokenKind::RightParen)?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Read(self.arena.alloc(ReadStmt {
            id,
            targets: targets.into_bump_slice(),
            span: start.to(end),
        })))
    }

    /// Grammar: `'write' '(' EXPR_LIST ')' ';'`
    fn parse_write(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let id = self.next_id();
        let start = self.expect(TokenKind::Write)?.span;
        let args = self.parse_expr_list()?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Write(self.arena.alloc(WriteStmt {
            id,
            args,
            span: start.to(end),
        })))
    }

    /// Grammar: `'call' ID '(' EXPR_LIST ')' ';'`
    fn parse_call_stmt(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let id = self.next_id();
        let start = self.expect(TokenKind::Call)?.span;
        let callee = self.expect_ident()?;
        let args = self.parse_expr_list()?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Call(self.arena.alloc(CallStmt {
            id,
            callee,
            args,
            span: start.to(end),
        })))
    }

    /// Grammar: `'return' EXPR? ';'`
    fn parse_return(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let id = self.next_id();
        let start = self.expect(TokenKind::Return)?.span;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Return(self.arena.alloc(ReturnStmt {
            id,
            value,
            span: start.to(end),
        })))
    }

    /// Grammar:
    /// `'if' EXPR 'then' STMT* ('elif' EXPR 'then' STMT*)* ('else' STMT*)? 'fi' ';'`
    fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        const BRANCH_END: &[TokenKind] = &[TokenKind::Elif, TokenKind::Else, TokenKind::Fi];

        let id = self.next_id();
        let start = self.expect(TokenKind::If)?.span;
        let guard = self.parse_expr(0)?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_block_until(BRANCH_END)?;

        let mut elifs = BVec::new_in(self.arena);
        while let Some(elif) = self.eat(TokenKind::Elif) {
            let guard = self.parse_expr(0)?;
            self.expect(TokenKind::Then)?;
            let body = self.parse_block_until(BRANCH_END)?;
            elifs.push(ElifClause {
                guard,
                body,
                span: elif.span.to(self.previous_span()),
            });
        }

        let else_branch = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_block_until(&[TokenKind::Fi])?)
        } else {
            None
        };

        self.expect(TokenKind::Fi)?;
        let end = self.expect(TokenKind::Semicolon)?.span;

        Ok(Stmt::If(self.arena.alloc(IfStmt {
            id,
            guard,
            then_branch,
            elifs: elifs.into_bump_slice(),
            else_branch,
            span: start.to(end),
        })))
    }

    /// Grammar: `'while' EXPR 'do' STMT* 'od' ';'`
    fn parse_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let id = self.next_id();
        let start = self.expect(TokenKind::While)?.span;
        let guard = self.parse_expr(0)?;
        self.expect(TokenKind::Do)?;
        let body = self.parse_block_until(&[TokenKind::Od])?;
        self.expect(TokenKind::Od)?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            id,
            guard,
            body,
            span: start.to(end),
        })))
    }

    /// Grammar: `'do' STMT* 'until' EXPR ';'`
    fn parse_do_until(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let id = self.next_id();
        let start = self.expect(TokenKind::Do)?.span;
        let body = self.parse_block_until(&[TokenKind::Until])?;
        self.expect(TokenKind::Until)?;
        let guard = self.parse_expr(0)?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::DoUntil(self.arena.alloc(DoUntilStmt {
            id,
            body,
            guard,
            span: start.to(end),
        })))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use bumpalo::Bump;

    fn body<'a>(stmts: &str, arena: &'a Bump) -> &'a [Stmt<'a>] {
        let source = arena.alloc_str(&format!("program P; begin {stmts} end."));
        match Parser::parse(source, arena) {
            Ok(program) => program.body.stmts,
            Err(errors) => panic!("parse failed: {errors}"),
        }
    }

    #[test]
    fn assignment_to_array_element() {
        let arena = Bump::new();
        let stmts = body("a[i + 1] := 'z';", &arena);
        let Stmt::Assign(assign) = stmts[0] else {
            panic!("expected assignment");
        };
        assert_eq!(assign.target.name.name, "a");
        assert!(assign.target.is_indexed());
        assert!(matches!(assign.value, Expr::Literal(_)));
    }

    #[test]
    fn if_with_elifs_and_else() {
        let arena = Bump::new();
        let stmts = body(
            "if x < 1 then y := 1; elif x < 2 then y := 2; elif x < 3 then else y := 4; y := 5; fi;",
            &arena,
        );
        let Stmt::If(stmt) = stmts[0] else {
            panic!("expected if");
        };
        assert_eq!(stmt.then_branch.stmts.len(), 1);
        assert_eq!(stmt.elifs.len(), 2);
        assert!(stmt.elifs[1].body.is_empty());
        assert_eq!(stmt.else_branch.map(|b| b.stmts.len()), Some(2));
        assert!(stmt.has_alternatives());
    }

    #[test]
    fn bare_if_has_no_alternatives() {
        let arena = Bump::new();
        let stmts = body("if b then fi;", &arena);
        let Stmt::If(stmt) = stmts[0] else {
            panic!("expected if");
        };
        assert!(!stmt.has_alternatives());
    }

    #[test]
    fn loops() {
        let arena = Bump::new();
        let stmts = body("while x < 10 do x := x + 1; od; do x := x - 1; until x = 0;", &arena);
        assert!(matches!(stmts[0], Stmt::While(w) if w.body.stmts.len() == 1));
        assert!(matches!(stmts[1], Stmt::DoUntil(d) if d.body.stmts.len() == 1));
    }

    #[test]
    fn io_and_calls() {
        let arena = Bump::new();
        let stmts = body("read(x, a[2]); write(x, 1.5, 'c'); call f(); call g(1, x); return; return x;", &arena);
        assert!(matches!(stmts[0], Stmt::Read(r) if r.targets.len() == 2 && r.targets[1].is_indexed()));
        assert!(matches!(stmts[1], Stmt::Write(w) if w.args.len() == 3));
        assert!(matches!(stmts[2], Stmt::Call(c) if c.args.is_empty()));
        assert!(matches!(stmts[3], Stmt::Call(c) if c.callee.name == "g" && c.args.len() == 2));
        assert!(matches!(stmts[4], Stmt::Return(r) if r.value.is_none()));
        assert!(matches!(stmts[5], Stmt::Return(r) if r.value.is_some()));
    }

    #[test]
    fn missing_semicolon_is_an_error() {
        let arena = Bump::new();
        let errors = Parser::parse("program P; begin x := 1 end.", &arena).unwrap_err();
        assert_eq!(errors.first().map(|e| e.kind), Some(ParseErrorKind::ExpectedToken));
    }

    #[test]
    fn expression_cannot_start_a_statement() {
        let arena = Bump::new();
        let errors = Parser::parse("program P; begin 1 := x; end.", &arena).unwrap_err();
        assert_eq!(errors.first().map(|e| e.kind), Some(ParseErrorKind::ExpectedStatement));
    }
}
