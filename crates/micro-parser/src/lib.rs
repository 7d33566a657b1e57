//! Micro Parser crate.
//!
//! Lexer and parser for the Micro language. The parser produces an
//! immutable syntax tree allocated in a [`bumpalo::Bump`] arena; every node
//! carries a [`NodeId`](ast::NodeId) that later compiler passes use as the
//! key for their per-node annotations.
//!
//! # Example
//!
//! ```
//! use micro_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     program P;
//!     int x;
//!     begin
//!         x := 5;
//!     end.
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(program) => println!("parsed {} declarations", program.decls.len()),
//!     Err(errors) => eprintln!("parse errors: {}", errors),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::Parser;
pub use lexer::{Lexer, Token, TokenKind};
pub use micro_core::{ParseError, ParseErrorKind, ParseErrors, Span};
