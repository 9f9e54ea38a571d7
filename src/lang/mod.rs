/*!
# Language Module

Lexical analysis and parsing of BASIC source text into an abstract
syntax tree, validated against a configurable dialect.

*/

#[macro_use]
mod error;
mod lex;
mod options;
mod token;

pub mod ast;
mod parse;

pub use error::Error;
pub use lex::lex;
pub use options::{BasicOptions, VarNaming, ALL_FUNCTIONS};
pub use parse::{parse, Listing, Parser};
pub use token::{Token, TokenKind};

/// Character span of a token or node within its source line.
pub type Column = std::ops::Range<usize>;

/// One-based source line number, `None` when not yet attributed.
pub type SourceLine = Option<usize>;
