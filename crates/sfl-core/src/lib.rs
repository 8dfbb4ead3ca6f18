//! # sfl-core: Foundational Types for the Contract Stack
//!
//! Every other `sfl-*` crate depends on this one; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `ContractId`, `ConflictId` and `UserId` are
//!    distinct types over the store's numeric ids. A conflict id cannot be
//!    passed where a contract id is expected.
//!
//! 2. **Explicit actor context.** The identity and role of whoever invokes an
//!    operation travels as an [`ActorContext`] value. There is no ambient
//!    "current user".
//!
//! 3. **UTC timestamps.** [`Timestamp`] renders as `YYYY-MM-DDTHH:MM:SSZ` and
//!    accepts the zone-less local datetimes the Contract Store emits.
//!
//! 4. **Exact money.** [`Amount`] holds minor units (cents) so validation and
//!    comparisons never go through floating point.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sfl-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod actor;
pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;

pub use actor::{ActorContext, Role};
pub use error::CoreError;
pub use identity::{ConflictId, ContractId, UserId};
pub use money::Amount;
pub use temporal::Timestamp;
