//! # Core Error Types
//!
//! Parse and construction failures for the primitives in this crate.

use thiserror::Error;

/// Errors raised while constructing or parsing core primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A timestamp string could not be parsed.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// An amount string or number could not be represented exactly.
    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A role name is not one of CLIENT, FREELANCER, ADMIN.
    #[error("unknown role {0:?}")]
    UnknownRole(String),
}
