//! # Lifecycle Errors
//!
//! Every failure the manager reports falls into one class:
//!
//! | Class | Raised when | Retry |
//! |---|---|---|
//! | `Validation` | a field fails pre-flight checks | after correcting input |
//! | `Authorization` | the actor may not act, or the store refused (401/403/409/422) | no |
//! | `Transient` | transport error, timeout, 5xx, malformed response | yes |
//! | `NotFound` | the contract or conflict does not exist | no |
//! | `Busy` | the view already has an action in flight | once it finishes |
//! | `Inconsistent` | the store returned data that breaks a contract invariant | no |

use thiserror::Error;

use sfl_arbitration::{ConflictStatusError, ReportError};
use sfl_state::{FieldErrors, InvariantViolation, TransitionError};

use crate::notify::Severity;
use crate::store::StoreError;

/// Shown in place of any server message that looks technical.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Longest server message shown verbatim.
const MAX_DISPLAY_LEN: usize = 250;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// `reason` is safe to show to the user.
    #[error("not permitted: {reason}")]
    Authorization { reason: String },

    /// `reason` is for logs only.
    #[error("temporarily unavailable: {reason}")]
    Transient { reason: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("another action is already in progress for this contract")]
    Busy,

    #[error("inconsistent store data: {detail}")]
    Inconsistent { detail: String },
}

impl LifecycleError {
    pub fn authorization(reason: impl Into<String>) -> Self {
        Self::Authorization {
            reason: reason.into(),
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    pub fn inconsistent(detail: impl Into<String>) -> Self {
        Self::Inconsistent {
            detail: detail.into(),
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Authorization { .. } => "authorization",
            Self::Transient { .. } => "transient",
            Self::NotFound { .. } => "not_found",
            Self::Busy => "busy",
            Self::Inconsistent { .. } => "inconsistent",
        }
    }

    /// Trying the same action again may succeed without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Busy)
    }

    /// The action cannot succeed for this actor and contract as they stand.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::Authorization { .. } | Self::NotFound { .. } | Self::Inconsistent { .. }
        )
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Validation(_) | Self::Busy => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Message fit for the notification sink.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => format!("Please correct the form: {errors}"),
            Self::Authorization { reason } => reason.clone(),
            Self::Transient { .. } => {
                "The service is temporarily unavailable. Please try again.".to_string()
            }
            Self::NotFound { .. } => "Resource not found.".to_string(),
            Self::Busy => "Please wait for the current action to finish.".to_string(),
            Self::Inconsistent { .. } => {
                "The server returned inconsistent contract data. Please reload.".to_string()
            }
        }
    }
}

impl From<FieldErrors> for LifecycleError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<TransitionError> for LifecycleError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::EmptySignature { .. } => {
                let mut errors = FieldErrors::new();
                errors.add("signature", "Please provide a signature.");
                Self::Validation(errors)
            }
            other => Self::authorization(other.to_string()),
        }
    }
}

impl From<ReportError> for LifecycleError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::Fields(errors) => Self::Validation(errors),
            other => Self::authorization(other.to_string()),
        }
    }
}

impl From<ConflictStatusError> for LifecycleError {
    fn from(e: ConflictStatusError) -> Self {
        Self::authorization(e.to_string())
    }
}

impl From<InvariantViolation> for LifecycleError {
    fn from(e: InvariantViolation) -> Self {
        Self::inconsistent(e.to_string())
    }
}

impl From<StoreError> for LifecycleError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { what } => Self::NotFound { what },
            StoreError::Rejected { status, message } => match status {
                404 => Self::NotFound { what: message },
                408 | 429 => Self::transient(format!("{status}: {message}")),
                s if s >= 500 => Self::transient(format!("{status}: {message}")),
                s => Self::authorization(displayable(s, &message)),
            },
            StoreError::Unavailable { message } => Self::transient(message),
            StoreError::Malformed { message } => Self::transient(format!("malformed response: {message}")),
        }
    }
}

/// The server message if it is fit to show, else a generic one for the
/// status.
fn displayable(status: u16, message: &str) -> String {
    let message = message.trim();
    if !message.is_empty() && !is_technical_message(message) {
        return message.to_string();
    }
    match status {
        401 => "Your session has expired. Please sign in again.".to_string(),
        403 => "You do not have permission for this action.".to_string(),
        409 => "This action is not allowed in the contract's current state.".to_string(),
        _ => GENERIC_MESSAGE.to_string(),
    }
}

/// Whether a server message leaks implementation detail (stack traces, SQL,
/// exception names) or is too long to show.
pub fn is_technical_message(message: &str) -> bool {
    if message.chars().count() > MAX_DISPLAY_LEN {
        return true;
    }
    let lower = message.to_lowercase();
    const MARKERS: [&str; 18] = [
        "jdbc",
        "sql ",
        "table ",
        "doesn't exist",
        "exception",
        "constraint",
        "syntax",
        "java.",
        "jakarta.",
        "org.springframework",
        "at com.",
        "at org.",
        "at java.",
        "caused by",
        "nullpointer",
        "stacktrace",
        "nested exception",
        "panicked at",
    ];
    MARKERS.iter().any(|marker| lower.contains(marker))
        || message.contains(".getMessage()")
        || message.contains(".toString()")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_status_maps_to_authorization_with_server_message() {
        let e = LifecycleError::from(StoreError::rejected(409, "Contract is already signed by CLIENT"));
        assert_eq!(
            e,
            LifecycleError::authorization("Contract is already signed by CLIENT")
        );
        assert!(e.is_blocking());
        assert!(!e.is_retryable());
    }

    #[test]
    fn server_errors_are_transient_and_never_shown() {
        let e = LifecycleError::from(StoreError::rejected(500, "NullPointerException at org.example"));
        assert_eq!(e.kind(), "transient");
        assert!(e.is_retryable());
        assert!(!e.user_message().contains("NullPointer"));
    }

    #[test]
    fn technical_messages_are_replaced() {
        let e = LifecycleError::from(StoreError::rejected(
            422,
            "could not execute statement; SQL [n/a]; constraint [fk_contract]",
        ));
        assert_eq!(e.user_message(), GENERIC_MESSAGE);

        let e = LifecycleError::from(StoreError::rejected(403, ""));
        assert_eq!(e.user_message(), "You do not have permission for this action.");
    }

    #[test]
    fn long_messages_are_technical() {
        assert!(is_technical_message(&"a".repeat(251)));
        assert!(!is_technical_message("End date must be after the start date."));
        assert!(is_technical_message("java.lang.IllegalStateException: boom"));
    }

    #[test]
    fn unavailable_and_malformed_are_transient() {
        assert!(LifecycleError::from(StoreError::unavailable("connection refused")).is_retryable());
        assert!(LifecycleError::from(StoreError::Malformed {
            message: "expected object".into()
        })
        .is_retryable());
    }

    #[test]
    fn validation_is_a_warning() {
        let mut errors = FieldErrors::new();
        errors.add("title", "Title is required.");
        let e = LifecycleError::from(errors);
        assert_eq!(e.severity(), Severity::Warning);
        assert_eq!(e.user_message(), "Please correct the form: title: Title is required.");
    }
}
