//! # sfl-lifecycle: Contract Lifecycle Manager
//!
//! Orchestrates the contract workflow between a client and a freelancer:
//! signature collection, conflict reporting, and status transitions.
//!
//! ## Architecture
//!
//! ```text
//!   ContractSession (one per view: busy guard, detach, view replacement)
//!          │
//!          ▼
//!   LifecycleManager (pre-flight guards, timeout, response verification,
//!          │          notifications, metrics)
//!          ├──▶ ContractStore     (HTTP client or in-memory)
//!          ├──▶ UserDirectory     (party names, degrades to #id)
//!          └──▶ NotificationSink  (fire-and-forget outcome messages)
//! ```
//!
//! The store is the single source of truth. The manager never mutates a
//! contract locally: each action is validated against the caller's
//! snapshot, sent as one store operation, and the store's response replaces
//! the snapshot only on success.

pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod manager;
pub mod memory;
pub mod notify;
pub mod session;
pub mod store;

pub use config::LifecycleConfig;
pub use directory::{PartyNames, UserDirectory};
pub use error::LifecycleError;
pub use manager::{ConflictReported, LifecycleManager, SignOutcome};
pub use memory::{InMemoryContractStore, InMemoryUserDirectory};
pub use notify::{NotificationSink, RecordingSink, Severity};
pub use session::ContractSession;
pub use store::{ContractStore, StoreError};
