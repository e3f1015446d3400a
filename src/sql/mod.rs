//! SQL module
//!
//! Tokenizer, AST, and recursive-descent parser for the minidb dialect.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Statement;
pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use token::Token;
