pub mod compiler;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod promotion;
pub mod scope;
pub mod token;
pub mod value;

pub use compiler::{compile_files, compile_source, CompilationUnit};
pub use config::Config;
pub use error::{CompilerError, ConfigError, InterpreterError, LexError, ParseError, ScopeError};
pub use evaluator::Interpreter;
pub use lexer::tokenize;
pub use parser::{parse, Expression, Literal, Statement, Tree};
pub use scope::{ScopeId, Scopes};
pub use token::{Kind, Position, Token};
pub use value::{Number, NumberKind, Value};
