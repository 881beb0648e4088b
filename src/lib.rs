mod buffer;
mod conditional;
mod engine;
mod error;
mod expression;
mod interface;
mod lexer;
mod options;
mod parser;
mod report;
mod resolver;
mod template;
mod token;

// Public exports.
pub use engine::CondlateEngine;
pub use error::{CondlateError, CondlateResult, ParseError, ParseErrorKind, ParseResult};
pub use interface::{CondlateInterface, Context, Variable, VariableTy};
pub use lexer::{Lexer, tokenize};
pub use options::{DEFAULT_MAX_DEPTH, ParserOptions};
pub use parser::Parser;
pub use template::Template;
pub use token::{Token, TokenKind};
