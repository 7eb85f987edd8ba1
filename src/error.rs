use thiserror::Error;

/// Errors raised when user-supplied settings cannot be used as-is.
///
/// These only reach the user at explicit start-time validation; background
/// code coerces bad values to defaults instead of returning them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be a whole number, got {input:?}")]
    NotANumber { field: &'static str, input: String },

    #[error("{field} must be greater than 0, got {value}")]
    NonPositive { field: &'static str, value: i64 },

    #[error("the message list cannot be empty")]
    EmptyMessages,
}
