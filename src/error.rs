//! Stable public error codes.
//!
//! The lexer and parser raise position-carrying [`crate::diag::Diag`]
//! values internally. This module is the outward-facing surface: a small
//! `thiserror`-derived enum with one variant per stable code, each
//! implementing `miette::Diagnostic` so callers get both a stable
//! matchable code and, where one exists, a rendered source span.

use crate::diag::Diag;
use miette::Diagnostic;
use thiserror::Error;

/// A tagged failure surfaced by `compile`, `compile_for_index`, or the
/// query optimizer.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum Error {
    /// Lexing or parsing encountered a token that could not start (or
    /// continue) a production, or the input ended unexpectedly.
    #[error("{message}")]
    #[diagnostic(code(docquery::unexpected_token))]
    UnexpectedToken {
        message: String,
        /// 0-based character offset, when the failure has a clear locus.
        position: Option<usize>,
    },

    /// A where-term is neither a predicate nor an `OR` of predicates, or
    /// carries a construct the optimizer refuses (e.g. `*` in `WHERE`).
    #[error("{message}")]
    #[diagnostic(code(docquery::invalid_expression_type))]
    InvalidExpressionType { message: String },

    /// An index name failed validation (reserved name, invalid characters).
    #[error("{message}")]
    #[diagnostic(code(docquery::invalid_index_name))]
    InvalidIndexName { message: String },

    /// An update targeted a field that cannot be written (e.g. `_id`).
    #[error("{message}")]
    #[diagnostic(code(docquery::invalid_update_field))]
    InvalidUpdateField { message: String },

    /// A value did not have the type an operation required.
    #[error("{message}")]
    #[diagnostic(code(docquery::invalid_data_type))]
    InvalidDataType { message: String },

    /// A document key contained the reserved `\0` character.
    #[error("document keys may not contain the null character")]
    #[diagnostic(code(docquery::invalid_null_char_in_string))]
    InvalidNullCharInString,
}

impl Error {
    /// The stable, independent-of-rendering error code, distinct from
    /// `miette`'s `code()` (which returns the dotted diagnostic code used
    /// for terminal rendering).
    pub fn stable_code(&self) -> &'static str {
        match self {
            Error::UnexpectedToken { .. } => "UnexpectedToken",
            Error::InvalidExpressionType { .. } => "InvalidExpressionType",
            Error::InvalidIndexName { .. } => "InvalidIndexName",
            Error::InvalidUpdateField { .. } => "InvalidUpdateField",
            Error::InvalidDataType { .. } => "InvalidDataType",
            Error::InvalidNullCharInString => "InvalidNullCharInString",
        }
    }

    pub fn invalid_expression_type(message: impl Into<String>) -> Self {
        Error::InvalidExpressionType { message: message.into() }
    }

    pub fn invalid_index_name(message: impl Into<String>) -> Self {
        Error::InvalidIndexName { message: message.into() }
    }

    pub fn invalid_data_type(message: impl Into<String>) -> Self {
        Error::InvalidDataType { message: message.into() }
    }

    /// Converts a parser/lexer-level `Diag` into the public `UnexpectedToken`
    /// variant, taking the position from its first label if any.
    pub fn from_diag(diag: &Diag) -> Self {
        Error::UnexpectedToken {
            message: diag.message.clone(),
            position: diag.labels.first().map(|l| l.span.start),
        }
    }
}

impl From<Box<Diag>> for Error {
    fn from(diag: Box<Diag>) -> Self {
        Error::from_diag(&diag)
    }
}
