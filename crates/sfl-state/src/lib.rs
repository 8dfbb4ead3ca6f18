//! # sfl-state: Contract Lifecycle State Machine
//!
//! Models a bilateral contract between a client and a freelancer and the
//! rules that govern how it moves through its lifecycle.
//!
//! ## States
//!
//! ```text
//! DRAFT ──submit──▶ PENDING_SIGNATURE ──2nd sign──▶ ACTIVE ──complete──▶ COMPLETED
//!   ▲                   │      ▲  │                   │
//!   └──reject/propose───┘      └──┘ 1st sign          └──report──▶ IN_CONFLICT ◀─┐
//!      changes/withdraw                                              └──report──┘
//!
//! CANCELLED: admin override only. COMPLETED and CANCELLED are terminal.
//! ```
//!
//! ## Modules
//!
//! - **Contract** (`contract.rs`): wire-compatible data model, status enum,
//!   signature slots, invariants.
//! - **Transition** (`transition.rs`): triggers, actor guards, and the
//!   store-side read-modify-write for status changes and signatures.
//! - **Eligibility** (`eligibility.rs`): pure `(contract, actor)` predicates
//!   used to gate controls.
//! - **Validation** (`validation.rs`): per-field pre-flight checks for drafts
//!   and edits.
//! - **Query** (`query.rs`): status filters and counts for list views.
//!
//! ## Design
//!
//! The state lives in the remote store, so the status is a runtime enum
//! rather than a typestate. Every rule is a pure function over a snapshot
//! plus an explicit [`sfl_core::ActorContext`].

pub mod contract;
pub mod eligibility;
pub mod query;
pub mod transition;
pub mod validation;

// ─── Contract re-exports ────────────────────────────────────────────

pub use contract::{Contract, ContractDraft, ContractPatch, ContractStatus, InvariantViolation, Party};

// ─── Transition re-exports ──────────────────────────────────────────

pub use transition::{
    apply_signature, apply_status, authorize, SignatureEffect, Transition, TransitionError,
};

// ─── Eligibility / validation / query re-exports ────────────────────

pub use eligibility::Eligibility;
pub use query::{ListScope, StatusCounts, StatusFilter};
pub use validation::{validate_draft, validate_merged, FieldErrors, MIN_TERMS_LEN, MIN_TITLE_LEN};
