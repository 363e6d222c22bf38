//! Job files: a small `key value` format describing one calculation
//!
//! ```text
//! # 6 mm end mill, adaptive pass in 6061
//! machine shapeoko-4
//! spindle vfd-1.5kw
//! tool em-6-3fl
//! material aluminum-6061
//! cut adaptive
//! doc 6
//! woc 0.6
//! hobby on
//! ```

use std::ops::Range;
use std::path::Path;
use thiserror::Error;

use crate::model::Inputs;

pub mod diagnostics;
pub mod lexer;
pub mod parser;

pub use diagnostics::render;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    #[error("unrecognised input")]
    Lex { span: Range<usize> },

    #[error("expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        span: Range<usize>,
    },

    #[error("expected {expected}, found end of file")]
    UnexpectedEof { expected: String, span: Range<usize> },

    #[error("'{key}' is set more than once")]
    Duplicate { key: &'static str, span: Range<usize> },

    #[error("missing required setting '{key}'")]
    Missing { key: &'static str },

    #[error("invalid {key}: {message}")]
    InvalidValue {
        key: &'static str,
        message: String,
        span: Range<usize>,
    },
}

impl JobError {
    /// Byte range the error points at, if it has one
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            JobError::Lex { span }
            | JobError::Expected { span, .. }
            | JobError::UnexpectedEof { span, .. }
            | JobError::Duplicate { span, .. }
            | JobError::InvalidValue { span, .. } => Some(span.clone()),
            JobError::Missing { .. } => None,
        }
    }
}

/// Parse job text into calculation inputs
pub fn parse_job(source: &str) -> Result<Inputs, JobError> {
    let tokens = lexer::lex(source).map_err(|span| JobError::Lex { span })?;
    tracing::debug!(tokens = tokens.len(), "job lexed");
    parser::Parser::new(tokens, source.len()).parse()
}

/// Read and parse a job file. Returns the source text alongside the result
/// so callers can render diagnostics.
pub fn load_job(path: impl AsRef<Path>) -> std::io::Result<(String, Result<Inputs, JobError>)> {
    let source = std::fs::read_to_string(path)?;
    let result = parse_job(&source);
    Ok((source, result))
}
