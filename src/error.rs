//! Engine boundary errors.
//!
//! Engines do no I/O, so every error here is an input-contract violation.
//! Each variant names the offending field so callers can map it back to the
//! request that produced it.

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("division by zero: {field} must be nonzero")]
    DivisionByZero { field: &'static str },
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Field name of the input that failed, regardless of variant.
    pub fn field(&self) -> &'static str {
        match self {
            EngineError::Validation { field, .. } => field,
            EngineError::DivisionByZero { field } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_includes_field() {
        let err = EngineError::validation("pre_money_shares", "must be positive");
        assert_eq!(err.to_string(), "pre_money_shares: must be positive");
        assert_eq!(err.field(), "pre_money_shares");
    }

    #[test]
    fn division_by_zero_names_field() {
        let err = EngineError::DivisionByZero { field: "shares" };
        assert_eq!(err.field(), "shares");
        assert!(err.to_string().contains("shares"));
    }
}
