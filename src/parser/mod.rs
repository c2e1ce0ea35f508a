//! Tokenizer and state-machine parser for substitution files.

mod machine;
mod tokens;

pub use machine::parse;
pub use tokens::{Token, TokenKind, Tokenizer};
