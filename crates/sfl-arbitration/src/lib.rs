//! # sfl-arbitration: Contract Conflicts
//!
//! Disputes raised by either party of an active contract:
//!
//! - **Conflict** (`conflict.rs`): the conflict record as the store returns
//!   it, the fixed list of reasons, the report payload and its pre-flight
//!   validation, and the `OPEN → IN_REVIEW → RESOLVED` status lifecycle.
//!
//! - **Grouping** (`grouping.rs`): partitions a contract's conflicts by the
//!   party that raised them and surfaces attribution inconsistencies.
//!
//! ## Crate Policy
//!
//! - Depends on `sfl-core` and `sfl-state` internally.
//! - Conflict resolution is an administrative store operation; parties only
//!   raise and read conflicts.

pub mod conflict;
pub mod grouping;

pub use conflict::{
    validate_report, ConflictReason, ConflictReport, ConflictStatus, ConflictStatusError,
    ContractConflict, ReportError, MIN_DESCRIPTION_LEN,
};
pub use grouping::{group_conflicts, AttributionInconsistency, ConflictGroups};
