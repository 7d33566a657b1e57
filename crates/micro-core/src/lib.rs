//! Micro Core
//!
//! Shared leaf types used by every stage of the Micro compiler:
//!
//! - [`span`]: source positions attached to tokens, nodes and diagnostics
//! - [`error`]: the error hierarchy for lexing, parsing and semantic analysis
//! - [`diagnostics`]: the sink semantic passes report into

pub mod diagnostics;
pub mod error;
pub mod span;

pub use diagnostics::Diagnostics;
pub use error::{
    CompilationError, ErrorKind, LexError, MicroError, ParseError, ParseErrorKind, ParseErrors,
};
pub use span::Span;
