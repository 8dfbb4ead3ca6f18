//! # sfl-cli: Contract lifecycle from the command line
//!
//! Drives the lifecycle manager against a Contract Store gateway
//! (`SFL_GATEWAY_URL`, or `--gateway`). Every command acts as the user
//! given by `--as-user` and `--as-role`.
//!
//! ```bash
//! sfl --as-role client --as-user 1 contract create --freelancer 2 \
//!     --title "Website Redesign" --terms "..." --amount 500 \
//!     --start 2026-01-15 --end 2026-02-14
//! sfl --as-role client --as-user 1 contract submit --id 7
//! sfl --as-role freelancer --as-user 2 contract sign --id 7 --signature data:image/png;base64,...
//! sfl --as-role admin --as-user 9 conflict status --id 3 --to RESOLVED
//! ```
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | success |
//! | 1 | setup or I/O failure |
//! | 2 | validation failed |
//! | 3 | not permitted, not found, or inconsistent data |
//! | 4 | temporarily unavailable; retry |

pub mod conflict;
pub mod context;
pub mod contract;
pub mod seed;

use sfl_lifecycle::LifecycleError;

/// Exit code for a failed lifecycle action.
pub fn exit_code(error: &LifecycleError) -> u8 {
    match error {
        LifecycleError::Validation(_) => 2,
        LifecycleError::Authorization { .. }
        | LifecycleError::NotFound { .. }
        | LifecycleError::Inconsistent { .. } => 3,
        LifecycleError::Transient { .. } | LifecycleError::Busy => 4,
    }
}

/// Print the value on success; map a lifecycle failure to its exit code.
///
/// The failure message itself has already gone through the notification
/// sink.
pub(crate) fn finish<T>(result: Result<T, LifecycleError>, print: impl FnOnce(T)) -> u8 {
    match result {
        Ok(value) => {
            print(value);
            0
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            exit_code(&e)
        }
    }
}
