//! Core parser state and declaration parsing.
//!
//! The parser is a recursive descent parser for declarations and
//! statements, with Pratt parsing for expressions (see `expr_parser`).
//! It stops at the first syntax error and reports it.

use crate::ast::*;
use crate::lexer::{Lexer, Token, TokenKind};
use bumpalo::Bump;
use bumpalo::collections::Vec as BVec;
use micro_core::Span;

/// Parser for Micro source.
pub struct Parser<'ast> {
    tokens: Vec<Token<'ast>>,
    pos: usize,
    pub(super) arena: &'ast Bump,
    next_id: u32,
}

impl<'ast> Parser<'ast> {
    /// Parse a whole program, allocating its tree in `arena`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &'ast str, arena: &'ast Bump) -> Result<Program<'ast>, ParseErrors> {
        let tokens = Lexer::new(source)
            .tokenize()
            .map_err(|e| ParseErrors::from(ParseError::from(e)))?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            arena,
            next_id: 0,
        };
        parser.parse_program().map_err(ParseErrors::from)
    }

    // =========================================
    // Token navigation
    // =========================================

    pub(super) fn peek(&self) -> &Token<'ast> {
        // The token stream always ends with Eof, which is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(super) fn peek_nth(&self, n: usize) -> &Token<'ast> {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    pub(super) fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.description()))
        }
    }

    pub(super) fn expect_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Ident::new(token.lexeme, token.span))
    }

    /// Error for the current token when `expected` was wanted.
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            ParseError::new(
                ParseErrorKind::UnexpectedEof,
                token.span,
                format!("expected {expected}, found end of input"),
            )
        } else {
            ParseError::expected_token(token.span, expected, &format!("'{}'", token.lexeme))
        }
    }

    /// Span of the most recently consumed token.
    pub(super) fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    pub(super) fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // =========================================
    // Program and declarations
    // =========================================

    /// Grammar: `'program' ID ';'? decl* body EOF`
    fn parse_program(&mut self) -> Result<Program<'ast>, ParseError> {
        let id = self.next_id();
        let start = self.expect(TokenKind::Program)?.span;
        let name = self.expect_ident()?;
        self.eat(TokenKind::Semicolon);

        let mut decls = BVec::new_in(self.arena);
        loop {
            let kind = self.peek().kind;
            if kind.is_primitive_type() {
                let var = self.parse_var_decl()?;
                self.expect(TokenKind::Semicolon)?;
                decls.push(Decl::Var(self.arena.alloc(var)));
            } else if matches!(kind, TokenKind::Procedure | TokenKind::Function) {
                let routine = self.parse_routine()?;
                decls.push(Decl::Routine(self.arena.alloc(routine)));
            } else {
                break;
            }
        }

        let body = self.parse_body()?;
        if !self.check(TokenKind::Eof) {
            return Err(self.unexpected(TokenKind::Eof.description()));
        }

        Ok(Program {
            id,
            name,
            decls: decls.into_bump_slice(),
            body,
            span: start.to(self.previous_span()),
            node_count: self.next_id,
        })
    }

    /// Grammar: `'begin' stmt* 'end' (';' | '.')`
    pub(super) fn parse_body(&mut self) -> Result<Block<'ast>, ParseError> {
        let start = self.expect(TokenKind::Begin)?.span;
        let block = self.parse_block_until(&[TokenKind::End])?;
        self.expect(TokenKind::End)?;
        if self.eat(TokenKind::Semicolon).is_none() && self.eat(TokenKind::Dot).is_none() {
            return Err(self.unexpected("';' or '.'"));
        }
        Ok(Block {
            stmts: block.stmts,
            span: start.to(self.previous_span()),
        })
    }

    /// Grammar: `primType`
    pub(super) fn parse_primitive_type(&mut self) -> Result<(PrimitiveKind, Span), ParseError> {
        let token = *self.peek();
        let kind = match token.kind {
            TokenKind::Int => PrimitiveKind::Int,
            TokenKind::Real => PrimitiveKind::Real,
            TokenKind::Char => PrimitiveKind::Char,
            TokenKind::Bool => PrimitiveKind::Bool,
            _ => {
                let mut error = self.unexpected("type");
                if error.kind == ParseErrorKind::ExpectedToken {
                    error.kind = ParseErrorKind::ExpectedType;
                }
                return Err(error);
            }
        };
        self.advance();
        Ok((kind, token.span))
    }

    /// Grammar: `primType ID ('[' INT ']')?`
    pub(super) fn parse_var_decl(&mut self) -> Result<VarDecl<'ast>, ParseError> {
        let id = self.next_id();
        let (base, type_span) = self.parse_primitive_type()?;
        let name = self.expect_ident()?;

        let array_len = if self.eat(TokenKind::LeftBracket).is_some() {
            let token = *self.peek();
            let len = match token.kind {
                TokenKind::IntLiteral => token.lexeme.parse::<u32>().ok(),
                _ => None,
            };
            let Some(len) = len else {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidArrayLength,
                    token.span,
                    format!("expected array length, found '{}'", token.lexeme),
                ));
            };
            self.advance();
            self.expect(TokenKind::RightBracket)?;
            Some(len)
        } else {
            None
        };

        Ok(VarDecl {
            id,
            ty: TypeExpr {
                base,
                array_len,
                span: type_span,
            },
            name,
            span: type_span.to(self.previous_span()),
        })
    }

    /// Grammar:
    /// ```text
    /// 'procedure' ID '(' params ')' (varDecl ';')* body
    /// 'function' primType ID '(' params ')' (varDecl ';')* body
    /// ```
    fn parse_routine(&mut self) -> Result<RoutineDecl<'ast>, ParseError> {
        let id = self.next_id();
        let start = self.peek().span;
        let kind = if self.eat(TokenKind::Function).is_some() {
            let (ret, _) = self.parse_primitive_type()?;
            RoutineKind::Function(ret)
        } else {
            self.expect(TokenKind::Procedure)?;
            RoutineKind::Procedure
        };
        let name = self.expect_ident()?;

        self.expect(TokenKind::LeftParen)?;
        let mut params = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            params.push(self.parse_param()?);
            while self.eat(TokenKind::Comma).is_some() {
                params.push(self.parse_param()?);
            }
        }
        self.expect(TokenKind::RightParen)?;

        let mut locals = BVec::new_in(self.arena);
        while self.peek().kind.is_primitive_type() {
            locals.push(self.parse_var_decl()?);
            self.expect(TokenKind::Semicolon)?;
        }

        let body = self.parse_body()?;

        Ok(RoutineDecl {
            id,
            kind,
            name,
            params: params.into_bump_slice(),
            locals: locals.into_bump_slice(),
            body,
            span: start.to(self.previous_span()),
        })
    }

    /// Grammar: `primType ID ('[' ']')?`
    fn parse_param(&mut self) -> Result<ParamDecl<'ast>, ParseError> {
        let id = self.next_id();
        let (base, start) = self.parse_primitive_type()?;
        let name = self.expect_ident()?;
        let is_array = if self.eat(TokenKind::LeftBracket).is_some() {
            self.expect(TokenKind::RightBracket)?;
            true
        } else {
            false
        };
        Ok(ParamDecl {
            id,
            ty: ParamType { base, is_array },
            name,
            span: start.to(self.previous_span()),
        })
    }
}
