//! Error types for every stage of the Micro compiler.
//!
//! ```text
//! MicroError (top-level wrapper)
//! ├── LexError          - tokenization errors
//! ├── ParseErrors       - syntax errors (each a ParseError with ParseErrorKind)
//! └── CompilationError  - semantic analysis and code generation errors
//! ```
//!
//! Lexing and parsing errors stop the front end. Semantic errors never do:
//! the passes report a [`CompilationError`] into a
//! [`Diagnostics`](crate::Diagnostics) sink and keep going so one compile
//! surfaces as many independent problems as possible.

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("at {span}: unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },

    #[error("at {span}: unterminated character literal")]
    UnterminatedChar { span: Span },

    #[error("at {span}: invalid escape sequence '\\{ch}'")]
    InvalidEscape { ch: char, span: Span },

    #[error("at {span}: invalid number '{text}'")]
    InvalidNumber { text: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar { span, .. }
            | Self::UnterminatedChar { span }
            | Self::InvalidEscape { span, .. }
            | Self::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Category of a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but something else was found.
    ExpectedToken,
    /// Input ended in the middle of a construct.
    UnexpectedEof,
    /// An expression was expected.
    ExpectedExpression,
    /// A primitive type keyword was expected.
    ExpectedType,
    /// A statement was expected.
    ExpectedStatement,
    /// An array length is missing or out of range.
    InvalidArrayLength,
    /// The lexer rejected part of the input.
    Lexical,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ExpectedToken => "expected token",
            Self::UnexpectedEof => "unexpected end of input",
            Self::ExpectedExpression => "expected expression",
            Self::ExpectedType => "expected type",
            Self::ExpectedStatement => "expected statement",
            Self::InvalidArrayLength => "invalid array length",
            Self::Lexical => "lexical error",
        };
        f.write_str(text)
    }
}

/// A single syntax error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("at {span}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// "expected X, found Y".
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError::new(ParseErrorKind::Lexical, error.span(), error.to_string())
    }
}

/// All syntax errors from one parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Semantic errors reported by the definition, reference and code
/// generation passes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A name was used that no enclosing scope defines.
    #[error("at {span}: undefined identifier '{name}'")]
    UndefinedIdentifier { name: String, span: Span },

    /// A name was declared twice in the same scope.
    #[error("at {span}: '{name}' is already defined")]
    Redefinition { name: String, span: Span },

    /// A name was called but does not denote a procedure or function.
    #[error("at {span}: '{name}' is not a function")]
    NotAFunction { name: String, span: Span },

    /// The target of an assignment or read is not a storable location.
    #[error("at {span}: '{name}' cannot be assigned to")]
    InvalidAssignmentTarget { name: String, span: Span },

    /// The value's type cannot be stored into the target's type.
    #[error("at {span}: {value} cannot be assigned to {target}")]
    AssignmentTypeMismatch {
        target: String,
        value: String,
        span: Span,
    },

    /// An operator was applied to operands it does not accept.
    #[error("at {span}: {message}")]
    InvalidOperandType { message: String, span: Span },

    /// An `if`, `elif`, `while` or `until` guard is not boolean.
    #[error("at {span}: {construct} guard must be bool, found {found}")]
    InvalidGuardType {
        construct: &'static str,
        found: String,
        span: Span,
    },

    /// Code generation met a type it has no load/store strategy for.
    ///
    /// This indicates a gap between analysis and generation, not a user
    /// error, and abandons the instruction list of the offending construct.
    #[error("at {span}: {type_name} is not a supported variable type for {construct}")]
    UnsupportedVariableType {
        construct: String,
        type_name: String,
        span: Span,
    },
}

/// Field-less mirror of [`CompilationError`] for matching and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UndefinedIdentifier,
    Redefinition,
    NotAFunction,
    InvalidAssignmentTarget,
    AssignmentTypeMismatch,
    InvalidOperandType,
    InvalidGuardType,
    UnsupportedVariableType,
}

impl CompilationError {
    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedIdentifier { span, .. }
            | Self::Redefinition { span, .. }
            | Self::NotAFunction { span, .. }
            | Self::InvalidAssignmentTarget { span, .. }
            | Self::AssignmentTypeMismatch { span, .. }
            | Self::InvalidOperandType { span, .. }
            | Self::InvalidGuardType { span, .. }
            | Self::UnsupportedVariableType { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UndefinedIdentifier { .. } => ErrorKind::UndefinedIdentifier,
            Self::Redefinition { .. } => ErrorKind::Redefinition,
            Self::NotAFunction { .. } => ErrorKind::NotAFunction,
            Self::InvalidAssignmentTarget { .. } => ErrorKind::InvalidAssignmentTarget,
            Self::AssignmentTypeMismatch { .. } => ErrorKind::AssignmentTypeMismatch,
            Self::InvalidOperandType { .. } => ErrorKind::InvalidOperandType,
            Self::InvalidGuardType { .. } => ErrorKind::InvalidGuardType,
            Self::UnsupportedVariableType { .. } => ErrorKind::UnsupportedVariableType,
        }
    }

    /// Fatal errors abandon code generation for the enclosing construct.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedVariableType { .. })
    }
}

// ============================================================================
// Top-level
// ============================================================================

/// Any error the compiler front door can return.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MicroError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("{0}")]
    Parse(#[from] ParseErrors),

    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compilation_error_display_has_position() {
        let error = CompilationError::AssignmentTypeMismatch {
            target: "bool".into(),
            value: "int".into(),
            span: Span::new(3, 8, 6),
        };
        assert_eq!(error.to_string(), "at 3:8: int cannot be assigned to bool");
        assert_eq!(error.kind(), ErrorKind::AssignmentTypeMismatch);
        assert!(!error.is_fatal());
    }

    #[test]
    fn only_unsupported_variable_type_is_fatal() {
        let fatal = CompilationError::UnsupportedVariableType {
            construct: "store".into(),
            type_name: "void".into(),
            span: Span::default(),
        };
        let plain = CompilationError::Redefinition {
            name: "x".into(),
            span: Span::default(),
        };
        assert!(fatal.is_fatal());
        assert!(!plain.is_fatal());
    }

    #[test]
    fn lex_error_converts_to_parse_error() {
        let lex = LexError::UnexpectedChar {
            ch: '$',
            span: Span::new(2, 5, 1),
        };
        let parse: ParseError = lex.into();
        assert_eq!(parse.kind, ParseErrorKind::Lexical);
        assert_eq!(parse.span, Span::new(2, 5, 1));
        assert!(parse.message.contains('$'));
    }

    #[test]
    fn parse_errors_display_joins_lines() {
        let mut errors = ParseErrors::new();
        errors.push(ParseError::expected_token(Span::new(1, 1, 1), "';'", "'begin'"));
        errors.push(ParseError::new(
            ParseErrorKind::ExpectedType,
            Span::new(2, 1, 3),
            "expected type, found 'foo'",
        ));
        let text = errors.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("at 1:1: expected ';', found 'begin'"));
    }

    #[test]
    fn micro_error_wraps_compilation_error() {
        let inner = CompilationError::UndefinedIdentifier {
            name: "y".into(),
            span: Span::new(1, 2, 1),
        };
        let wrapped: MicroError = inner.clone().into();
        assert_eq!(wrapped.to_string(), inner.to_string());
    }
}
