//! Per-field pre-flight validation for contract drafts and edits.
//!
//! Runs before any network call. Each field reports at most one message,
//! the first rule it fails.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sfl_core::{Amount, UserId};

use crate::contract::{Contract, ContractDraft};

/// Minimum title length, in characters.
pub const MIN_TITLE_LEN: usize = 5;

/// Minimum terms length after trimming, in characters.
pub const MIN_TERMS_LEN: usize = 20;

/// Field name → message for every field that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. The first message recorded wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// ─── Rules ───────────────────────────────────────────────────────────

fn check_title(title: &str, errors: &mut FieldErrors) {
    let title = title.trim();
    let len = title.chars().count();
    if title.is_empty() {
        errors.add("title", "Title is required.");
    } else if !title.chars().next().is_some_and(|c| c.is_uppercase()) {
        errors.add(
            "title",
            "Title must start with an uppercase letter (e.g. \"Website Redesign\").",
        );
    } else if len < MIN_TITLE_LEN {
        errors.add(
            "title",
            format!("Title must be at least {MIN_TITLE_LEN} characters (currently {len})."),
        );
    }
}

fn check_terms(terms: &str, errors: &mut FieldErrors) {
    let terms = terms.trim();
    let len = terms.chars().count();
    if terms.is_empty() {
        errors.add("terms", "Terms & Conditions are required.");
    } else if len < MIN_TERMS_LEN {
        errors.add(
            "terms",
            format!("Terms must be at least {MIN_TERMS_LEN} characters (currently {len})."),
        );
    }
}

/// The fields shared by drafts and stored contracts.
struct Terms<'a> {
    title: &'a str,
    terms: &'a str,
    amount: Amount,
    client: UserId,
    freelancer: UserId,
    start: NaiveDate,
    end: NaiveDate,
}

impl<'a> From<&'a ContractDraft> for Terms<'a> {
    fn from(d: &'a ContractDraft) -> Self {
        Self {
            title: &d.title,
            terms: &d.terms,
            amount: d.amount,
            client: d.client_id,
            freelancer: d.freelancer_id,
            start: d.start_date,
            end: d.end_date,
        }
    }
}

impl<'a> From<&'a Contract> for Terms<'a> {
    fn from(c: &'a Contract) -> Self {
        Self {
            title: &c.title,
            terms: &c.terms,
            amount: c.amount,
            client: c.client_id,
            freelancer: c.freelancer_id,
            start: c.start_date,
            end: c.end_date,
        }
    }
}

fn check_common(fields: Terms<'_>, errors: &mut FieldErrors) {
    check_title(fields.title, errors);
    check_terms(fields.terms, errors);
    if !fields.amount.is_positive() {
        errors.add("amount", "Budget must be greater than 0.");
    }
    if !fields.client.is_resolved() {
        errors.add("client", "The contract must belong to a client.");
    }
    if !fields.freelancer.is_resolved() {
        errors.add("freelancer", "Use the lookup to find and confirm the freelancer.");
    } else if fields.freelancer == fields.client {
        errors.add("freelancer", "The freelancer must be a different user than the client.");
    }
    if fields.end <= fields.start {
        errors.add("endDate", "End date must be after the start date.");
    }
}

/// Validate a creation payload. `today` is the caller's calendar date.
pub fn validate_draft(draft: &ContractDraft, today: NaiveDate) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if draft.start_date < today {
        errors.add("startDate", "Start date cannot be in the past.");
    }
    check_common(draft.into(), &mut errors);
    errors.into_result()
}

/// Validate the result of merging an edit into a stored contract.
///
/// Same rules as creation except that the start date may lie in the past.
pub fn validate_merged(contract: &Contract) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_common(contract.into(), &mut errors);
    errors.into_result()
}
