use crate::error::CompilerError;
use crate::evaluator::Interpreter;
use crate::lexer::tokenize;
use crate::parser::{parse, Tree};
use crate::token::Token;
use crate::value::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything produced while running one source file through the pipeline.
#[derive(Debug)]
pub struct CompilationUnit {
    pub path: PathBuf,
    pub tokens: Vec<Token>,
    pub tree: Tree,
    pub values: Vec<Value>,
}

/// Scans, parses and evaluates `source`. `path` only labels errors.
pub fn compile_source(path: &Path, source: &str) -> Result<CompilationUnit, CompilerError> {
    let tokens = tokenize(source).map_err(|source| CompilerError::Lexing {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("{}: scanned {} tokens", path.display(), tokens.len());

    let tree = parse(tokens.clone()).map_err(|source| CompilerError::Syntax {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("{}: parsed {} statements", path.display(), tree.body.len());

    let values = Interpreter::new()
        .evaluate_tree(&tree)
        .map_err(|source| CompilerError::Interpreter {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(CompilationUnit {
        path: path.to_path_buf(),
        tokens,
        tree,
        values,
    })
}

fn read_source(path: &Path) -> Result<String, CompilerError> {
    if !path.is_file() {
        return Err(CompilerError::FileNotFound(path.to_path_buf()));
    }

    fs::read_to_string(path).map_err(|source| CompilerError::IO {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks every path up front, then compiles the first file. Files are not
/// linked together, so the rest are skipped.
pub fn compile_files(paths: &[PathBuf]) -> Result<Vec<CompilationUnit>, CompilerError> {
    if let Some(missing) = paths.iter().find(|path| !path.is_file()) {
        return Err(CompilerError::FileNotFound(missing.clone()));
    }

    let Some(first) = paths.first() else {
        return Ok(Vec::new());
    };

    if paths.len() > 1 {
        warn!(
            "only the first file is compiled; skipping {} more",
            paths.len() - 1
        );
    }

    let source = read_source(first)?;
    Ok(vec![compile_source(first, &source)?])
}
