//! Lexer implementation.
//!
//! The [`Lexer`] scans the whole source up front into a token vector that
//! the parser indexes into. It dispatches on the first character of each
//! token and stops at the first character it cannot classify.

use micro_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Converts Micro source text into tokens.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Scan all tokens. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token<'src>>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    // =========================================
    // Token scanning
    // =========================================

    fn scan_token(&mut self) -> Result<Token<'src>, LexError> {
        self.skip_trivia();

        let line = self.cursor.line();
        let col = self.cursor.column();
        let start = self.cursor.offset();

        let Some(c) = self.cursor.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", Span::point(line, col)));
        };

        let kind = match c {
            c if c.is_ascii_digit() => self.scan_number(line, col, start)?,
            c if is_ident_start(c) => {
                self.cursor.eat_while(is_ident_continue);
                lookup_keyword(self.cursor.slice_from(start)).unwrap_or(TokenKind::Identifier)
            }
            '\'' => self.scan_char(line, col)?,
            _ => self.scan_operator(line, col)?,
        };

        Ok(self.make_token(kind, line, col, start))
    }

    /// Skip whitespace and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(char::is_whitespace);
            if self.cursor.peek() == Some('/') && self.cursor.peek_nth(1) == Some('/') {
                self.cursor.eat_while(|c| c != '\n');
            } else {
                return;
            }
        }
    }

    fn make_token(&self, kind: TokenKind, line: u32, col: u32, start: usize) -> Token<'src> {
        let lexeme = self.cursor.slice_from(start);
        Token::new(kind, lexeme, Span::new(line, col, lexeme.len() as u32))
    }

    /// Integer `42`, real `4.2`, `4.2e-1`, `42e3`.
    fn scan_number(&mut self, line: u32, col: u32, start: usize) -> Result<TokenKind, LexError> {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut kind = TokenKind::IntLiteral;

        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            kind = TokenKind::RealLiteral;
        }

        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            let signed = matches!(self.cursor.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.cursor.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.cursor.advance();
                if signed {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit());
                kind = TokenKind::RealLiteral;
            }
        }

        if self.cursor.peek().is_some_and(is_ident_start) {
            self.cursor.eat_while(is_ident_continue);
            let text = self.cursor.slice_from(start).to_string();
            let len = text.len() as u32;
            return Err(LexError::InvalidNumber {
                text,
                span: Span::new(line, col, len),
            });
        }

        Ok(kind)
    }

    /// Character literal `'a'` or an escape `'\n'`, `'\t'`, `'\\'`, `'\''`, `'\0'`.
    fn scan_char(&mut self, line: u32, col: u32) -> Result<TokenKind, LexError> {
        self.cursor.advance();
        match self.cursor.advance() {
            Some('\\') => match self.cursor.advance() {
                Some('n' | 't' | 'r' | '0' | '\\' | '\'') => {}
                Some(other) => {
                    return Err(LexError::InvalidEscape {
                        ch: other,
                        span: Span::new(line, col, 3),
                    });
                }
                None => return Err(LexError::UnterminatedChar { span: Span::point(line, col) }),
            },
            Some('\'') | Some('\n') | None => {
                return Err(LexError::UnterminatedChar { span: Span::point(line, col) });
            }
            Some(_) => {}
        }
        if self.cursor.eat('\'') {
            Ok(TokenKind::CharLiteral)
        } else {
            Err(LexError::UnterminatedChar { span: Span::point(line, col) })
        }
    }

    fn scan_operator(&mut self, line: u32, col: u32) -> Result<TokenKind, LexError> {
        use TokenKind::*;
        let Some(c) = self.cursor.advance() else {
            return Ok(Eof);
        };
        let kind = match c {
            ';' => Semicolon,
            '.' => Dot,
            ',' => Comma,
            '(' => LeftParen,
            ')' => RightParen,
            '[' => LeftBracket,
            ']' => RightBracket,
            '+' => Plus,
            '-' => Minus,
            '~' => Tilde,
            '%' => Percent,
            '/' => Slash,
            '&' => Amp,
            '^' => Caret,
            '|' => Pipe,
            '=' => Equal,
            '∧' => And,
            '∨' => Or,
            '¬' => Not,
            '*' => {
                if self.cursor.eat('*') {
                    StarStar
                } else {
                    Star
                }
            }
            ':' if self.cursor.eat('=') => ColonEqual,
            '!' if self.cursor.eat('=') => BangEqual,
            '<' => {
                if self.cursor.eat('<') {
                    LessLess
                } else if self.cursor.eat('=') {
                    LessEqual
                } else {
                    Less
                }
            }
            '>' => {
                if self.cursor.eat('>') {
                    if self.cursor.eat('>') {
                        GreaterGreaterGreater
                    } else {
                        GreaterGreater
                    }
                } else if self.cursor.eat('=') {
                    GreaterEqual
                } else {
                    Greater
                }
            }
            other => {
                return Err(LexError::UnexpectedChar {
                    ch: other,
                    span: Span::new(line, col, other.len_utf8() as u32),
                });
            }
        };
        Ok(kind)
    }
}
