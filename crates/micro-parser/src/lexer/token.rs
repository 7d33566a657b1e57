//! Token definitions for the Micro lexer.

use micro_core::Span;
use std::fmt;

/// A token with its source text.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub span: Span,
}

impl<'src> Token<'src> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'src str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// Every token kind of the Micro language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals and identifiers
    // =========================================
    IntLiteral,
    RealLiteral,
    CharLiteral,
    Identifier,

    // =========================================
    // Keywords
    // =========================================
    Program,
    Begin,
    End,
    Procedure,
    Function,
    Int,
    Real,
    Char,
    Bool,
    Read,
    Write,
    Call,
    Return,
    If,
    Then,
    Elif,
    Else,
    Fi,
    While,
    Do,
    Od,
    Until,
    True,
    False,
    /// `and` or `∧`
    And,
    /// `or` or `∨`
    Or,
    /// `not` or `¬`
    Not,

    // =========================================
    // Punctuation
    // =========================================
    Semicolon,
    Dot,
    Comma,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    /// `:=`
    ColonEqual,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Tilde,
    /// `**`
    StarStar,
    Star,
    Slash,
    Percent,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `>>>`
    GreaterGreaterGreater,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// `=`
    Equal,
    /// `!=`
    BangEqual,
    Amp,
    Caret,
    Pipe,

    Eof,
}

impl TokenKind {
    /// Human-readable description used in "expected X, found Y" messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            RealLiteral => "real literal",
            CharLiteral => "character literal",
            Identifier => "identifier",
            Program => "'program'",
            Begin => "'begin'",
            End => "'end'",
            Procedure => "'procedure'",
            Function => "'function'",
            Int => "'int'",
            Real => "'real'",
            Char => "'char'",
            Bool => "'bool'",
            Read => "'read'",
            Write => "'write'",
            Call => "'call'",
            Return => "'return'",
            If => "'if'",
            Then => "'then'",
            Elif => "'elif'",
            Else => "'else'",
            Fi => "'fi'",
            While => "'while'",
            Do => "'do'",
            Od => "'od'",
            Until => "'until'",
            True => "'true'",
            False => "'false'",
            And => "'and'",
            Or => "'or'",
            Not => "'not'",
            Semicolon => "';'",
            Dot => "'.'",
            Comma => "','",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            ColonEqual => "':='",
            Plus => "'+'",
            Minus => "'-'",
            Tilde => "'~'",
            StarStar => "'**'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            LessLess => "'<<'",
            GreaterGreater => "'>>'",
            GreaterGreaterGreater => "'>>>'",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            Equal => "'='",
            BangEqual => "'!='",
            Amp => "'&'",
            Caret => "'^'",
            Pipe => "'|'",
            Eof => "end of input",
        }
    }

    /// Whether this token starts a primitive type.
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Real | TokenKind::Char | TokenKind::Bool
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Map an identifier-shaped word to its keyword, if it is one.
///
/// Keywords are case-sensitive.
pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
        "program" => Program,
        "begin" => Begin,
        "end" => End,
        "procedure" => Procedure,
        "function" => Function,
        "int" => Int,
        "real" => Real,
        "char" => Char,
        "bool" => Bool,
        "read" => Read,
        "write" => Write,
        "call" => Call,
        "return" => Return,
        "if" => If,
        "then" => Then,
        "elif" => Elif,
        "else" => Else,
        "fi" => Fi,
        "while" => While,
        "do" => Do,
        "od" => Od,
        "until" => Until,
        "true" => True,
        "false" => False,
        "and" => And,
        "or" => Or,
        "not" => Not,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(lookup_keyword("while"), Some(TokenKind::While));
        assert_eq!(lookup_keyword("While"), None);
        assert_eq!(lookup_keyword("x"), None);
    }

    #[test]
    fn primitive_type_tokens() {
        assert!(TokenKind::Real.is_primitive_type());
        assert!(!TokenKind::Identifier.is_primitive_type());
    }
}
