use crate::token::{Position, Token};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything the driver can report for one compilation.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("FileNotFoundError: Invalid file path: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("IOError: {}: {source}", .path.display())]
    IO {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("LexError: {source}\n  --> {}:{}", .path.display(), .source.position)]
    Lexing { path: PathBuf, source: LexError },
    #[error("ParseError: {source}{}", location(.path, .source.token.as_ref()))]
    Syntax { path: PathBuf, source: ParseError },
    #[error("InterpreterError: {source}\n  --> {}", .path.display())]
    Interpreter {
        path: PathBuf,
        source: InterpreterError,
    },
}

fn location(path: &Path, token: Option<&Token>) -> String {
    match token {
        Some(token) => format!("\n  --> {}:{}", path.display(), token.start),
        None => format!("\n  --> {}", path.display()),
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl LexError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
#[error("{message}{}", found(.token.as_ref()))]
pub struct ParseError {
    pub message: String,
    pub token: Option<Token>,
}

fn found(token: Option<&Token>) -> String {
    match token {
        Some(token) => format!(" (found {:?} {:?})", token.kind, token.value),
        None => String::new(),
    }
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            token: None,
        }
    }

    pub fn from_token(token: &Token, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            token: Some(token.clone()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ScopeError {
    #[error("Couldn't find '{0}' in this context")]
    Undefined(String),
    #[error("'{0}' is already defined in this scope")]
    AlreadyDefined(String),
    #[error("Cannot assign to constant '{0}'")]
    Constant(String),
    #[error("Scope handle was released or belongs to another interpreter")]
    InvalidScope,
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum InterpreterError {
    #[error("Cannot do operation [{operator}] for those types [{left}, {right}]")]
    UnsupportedOperation {
        operator: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("Cannot do comparison [{operator}] for those types [{left}, {right}]")]
    UnsupportedComparison {
        operator: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("Operator [{operator}] expects Boolean operands but got [{operand}]")]
    NonBooleanOperand {
        operator: String,
        operand: &'static str,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
