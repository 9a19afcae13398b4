//! Error types for unit parsing, formatting and registry operations.

use thiserror::Error;

/// Result type for unit operations.
pub type UnitResult<T> = Result<T, UnitError>;

/// Error types for unit operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// A label or alias that cannot be used as a unit identifier
    #[error("'{name}' is not a valid {dialect} unit identifier")]
    InvalidIdentifier { name: String, dialect: String },

    /// Unit expression that cannot be parsed
    #[error("{message} (in \"{text}\" at index {offset})")]
    MalformedUnitExpression {
        message: String,
        text: String,
        offset: usize,
    },

    /// Unit algebra that has no defined result (zero divisor, zero root)
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
}

impl UnitError {
    pub(crate) fn malformed(message: impl Into<String>, text: &str, offset: usize) -> Self {
        UnitError::MalformedUnitExpression {
            message: message.into(),
            text: text.to_string(),
            offset,
        }
    }

    /// Character offset of a parse failure, if this is one
    pub fn offset(&self) -> Option<usize> {
        match self {
            UnitError::MalformedUnitExpression { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
