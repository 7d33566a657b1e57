//! Expression parsing using Pratt parsing (precedence climbing).

use super::parser::Parser;
use crate::ast::expr::*;
use crate::ast::{BinaryOp, Ident, ParseError, ParseErrorKind, UnaryOp};
use crate::lexer::TokenKind;
use micro_core::{LexError, Span};

impl<'ast> Parser<'ast> {
    /// Parse an expression with a minimum binding power.
    ///
    /// Only operators whose left binding power is at least `min_bp` are
    /// consumed, which is what gives the table in [`BinaryOp::binding_power`]
    /// its precedence and associativity.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        while let Some(op) = BinaryOp::from_token(self.peek().kind) {
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }

            self.advance();
            let rhs = self.parse_expr(r_bp)?;
            let id = self.next_id();
            let span = lhs.span().to(rhs.span());
            lhs = self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
                id,
                left: lhs,
                op,
                right: rhs,
                span,
            })));
        }

        Ok(lhs)
    }

    /// Parse a prefix expression (the start of an expression).
    fn parse_prefix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = *self.peek();

        if let Some(op) = UnaryOp::from_token(token.kind) {
            self.advance();
            let operand = self.parse_expr(UnaryOp::binding_power())?;
            let id = self.next_id();
            return Ok(self.arena.alloc(Expr::Unary(self.arena.alloc(UnaryExpr {
                id,
                op,
                operand,
                span: token.span.to(operand.span()),
            }))));
        }

        let kind = match token.kind {
            TokenKind::IntLiteral => {
                let value = token.lexeme.parse::<i32>().map_err(|_| {
                    ParseError::from(LexError::InvalidNumber {
                        text: token.lexeme.to_string(),
                        span: token.span,
                    })
                })?;
                LiteralKind::Int(value)
            }
            TokenKind::RealLiteral => {
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    ParseError::from(LexError::InvalidNumber {
                        text: token.lexeme.to_string(),
                        span: token.span,
                    })
                })?;
                LiteralKind::Real(value)
            }
            TokenKind::CharLiteral => LiteralKind::Char(decode_char(token.lexeme, token.span)?),
            TokenKind::True => LiteralKind::Bool(true),
            TokenKind::False => LiteralKind::Bool(false),
            TokenKind::Identifier => return self.parse_name_expr(),
            TokenKind::LeftParen => return self.parse_paren(),
            _ => {
                let mut error = self.unexpected("expression");
                if error.kind == ParseErrorKind::ExpectedToken {
                    error.kind = ParseErrorKind::ExpectedExpression;
                }
                return Err(error);
            }
        };

        self.advance();
        let id = self.next_id();
        Ok(self.arena.alloc(Expr::Literal(LiteralExpr {
            id,
            kind,
            span: token.span,
        })))
    }

    /// `x`, `f(args)` or `a[i]`.
    fn parse_name_expr(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let name = self.expect_ident()?;

        if self.check(TokenKind::LeftParen) {
            let args = self.parse_expr_list()?;
            let id = self.next_id();
            return Ok(self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr {
                id,
                callee: name,
                args,
                span: name.span.to(self.previous_span()),
            }))));
        }

        if self.eat(TokenKind::LeftBracket).is_some() {
            let index = self.parse_expr(0)?;
            let end = self.expect(TokenKind::RightBracket)?.span;
            let id = self.next_id();
            return Ok(self.arena.alloc(Expr::Index(self.arena.alloc(IndexExpr {
                id,
                array: name,
                index,
                span: name.span.to(end),
            }))));
        }

        let id = self.next_id();
        Ok(self.arena.alloc(Expr::Ident(IdentExpr {
            id,
            ident: Ident::new(name.name, name.span),
        })))
    }

    fn parse_paren(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.expect(TokenKind::LeftParen)?.span;
        let expr = self.parse_expr(0)?;
        let end = self.expect(TokenKind::RightParen)?.span;
        let id = self.next_id();
        Ok(self.arena.alloc(Expr::Paren(self.arena.alloc(ParenExpr {
            id,
            expr,
            span: start.to(end),
        }))))
    }
}

/// Decode the body of a character literal lexeme such as `'a'` or `'\n'`.
fn decode_char(lexeme: &str, span: Span) -> Result<char, ParseError> {
    let inner = lexeme
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(lexeme);
    let mut chars = inner.chars();
    let decoded = match (chars.next(), chars.next()) {
        (Some('\\'), Some(escape)) => match escape {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            other => return Err(LexError::InvalidEscape { ch: other, span }.into()),
        },
        (Some(c), None) => c,
        _ => return Err(LexError::UnterminatedChar { span }.into()),
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use bumpalo::Bump;

    fn expr<'a>(text: &str, arena: &'a Bump) -> &'a Expr<'a> {
        let source = arena.alloc_str(&format!("program P; begin x := {text}; end."));
        let program = match Parser::parse(source, arena) {
            Ok(program) => program,
            Err(errors) => panic!("parse failed: {errors}"),
        };
        let Stmt::Assign(assign) = program.body.stmts[0] else {
            panic!("expected assignment");
        };
        assign.value
    }

    /// Render with explicit parentheses to check tree shape.
    fn shape(expr: &Expr<'_>) -> String {
        match expr {
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Int(v) => v.to_string(),
                LiteralKind::Real(v) => format!("{v:?}"),
                LiteralKind::Char(c) => format!("{c:?}"),
                LiteralKind::Bool(b) => b.to_string(),
            },
            Expr::Ident(id) => id.ident.name.to_string(),
            Expr::Binary(b) => format!("({} {} {})", shape(b.left), b.op, shape(b.right)),
            Expr::Unary(u) => format!("({} {})", u.op, shape(u.operand)),
            Expr::Call(c) => format!("{}/{}", c.callee.name, c.args.len()),
            Expr::Index(i) => format!("{}[{}]", i.array.name, shape(i.index)),
            Expr::Paren(p) => shape(p.expr),
        }
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let arena = Bump::new();
        assert_eq!(shape(expr("1 + 2 * 3", &arena)), "(1 + (2 * 3))");
        assert_eq!(shape(expr("1 - 2 - 3", &arena)), "((1 - 2) - 3)");
    }

    #[test]
    fn power_is_right_associative_and_above_unary() {
        let arena = Bump::new();
        assert_eq!(shape(expr("2 ** 3 ** 2", &arena)), "(2 ** (3 ** 2))");
        assert_eq!(shape(expr("-a ** 2", &arena)), "(- (a ** 2))");
        assert_eq!(shape(expr("-a * b", &arena)), "((- a) * b)");
    }

    #[test]
    fn comparison_and_logic() {
        let arena = Bump::new();
        assert_eq!(
            shape(expr("a < b and c = d", &arena)),
            "((a < b) and (c = d))"
        );
        assert_eq!(
            shape(expr("a ∨ ¬b", &arena)),
            "(a or (not b))"
        );
        assert_eq!(shape(expr("a & b = c", &arena)), "(a & (b = c))");
        assert_eq!(shape(expr("1 << 2 + 3", &arena)), "(1 << (2 + 3))");
    }

    #[test]
    fn parentheses_override_precedence() {
        let arena = Bump::new();
        assert_eq!(shape(expr("(1 + 2) * 3", &arena)), "((1 + 2) * 3)");
    }

    #[test]
    fn calls_and_indexing() {
        let arena = Bump::new();
        assert_eq!(shape(expr("f(1, 2) + a[i - 1]", &arena)), "(f/2 + a[(i - 1)])");
    }

    #[test]
    fn literals() {
        let arena = Bump::new();
        assert_eq!(shape(expr("'\\n'", &arena)), "'\\n'");
        assert_eq!(shape(expr("2.5e1", &arena)), "25.0");
        assert_eq!(shape(expr("true", &arena)), "true");
    }

    #[test]
    fn integer_overflow_is_rejected() {
        let arena = Bump::new();
        let errors = Parser::parse("program P; begin x := 99999999999; end.", &arena).unwrap_err();
        assert_eq!(errors.first().map(|e| e.kind), Some(ParseErrorKind::Lexical));
    }

    #[test]
    fn missing_operand() {
        let arena = Bump::new();
        let errors = Parser::parse("program P; begin x := 1 + ; end.", &arena).unwrap_err();
        assert_eq!(
            errors.first().map(|e| e.kind),
            Some(ParseErrorKind::ExpectedExpression)
        );
    }
}
