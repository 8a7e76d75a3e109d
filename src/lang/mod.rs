/*!
# Rill Language Module

Lexical analysis and the shared error type for the Rill language.

*/

#[macro_use]
mod error;
mod lex;
mod token;

pub use error::Error;
pub use lex::Lexer;
pub use token::Literal;
pub use token::Operator;
pub use token::Token;
pub use token::Word;
