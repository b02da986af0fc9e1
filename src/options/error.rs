//! Error types for option resolution.

use thiserror::Error;

/// Reasons a tool's argument list can be rejected.
///
/// The `Display` output is the one-line diagnostic each tool prints to
/// standard error before exiting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// Token is not any flag the tool declares
    #[error("Invalid option: {token}")]
    UnknownOption { token: String },

    /// Declared flag with a disallowed or malformed value, or no value at all
    #[error("Invalid keyword value pair: ({key}, {value}).")]
    InvalidKeywordValue { key: String, value: String },

    /// Individually valid values that cannot be used together
    #[error("{detail}")]
    InfeasibleCombination { detail: String },

    /// Tool requires arguments but received none
    #[error("Usage -> {usage}")]
    MissingRequiredOption { usage: String },
}

impl OptionError {
    pub(crate) fn invalid_value(key: &str, value: &str) -> Self {
        OptionError::InvalidKeywordValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}
