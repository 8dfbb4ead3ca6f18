//! End-to-end flows through the manager and sessions against the in-memory
//! store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use sfl_core::Amount;
use sfl_lifecycle::{ContractSession, LifecycleError, Severity, SignOutcome, StoreError};
use sfl_state::{eligibility, ContractPatch, ContractStatus, Eligibility, Party};

#[tokio::test]
async fn full_lifecycle_from_draft_to_completed() {
    let h = harness();

    let c = h.drafted().await;
    assert_eq!(c.status, ContractStatus::Draft);

    let c = h.manager.submit_for_signature(&client(), &c).await.unwrap();
    assert_eq!(c.status, ContractStatus::PendingSignature);
    assert_eq!(h.sink.last().unwrap().0, "Sent for signature!");

    let outcome = h.manager.sign(&client(), &c, CLIENT_SIG).await.unwrap();
    assert!(matches!(outcome, SignOutcome::AwaitingOtherParty(_)));
    let c = outcome.into_contract();
    assert_eq!(c.status, ContractStatus::PendingSignature);
    assert!(c.signed_at.is_none());

    let outcome = h.manager.sign(&freelancer(), &c, FREELANCER_SIG).await.unwrap();
    assert!(outcome.is_activated());
    let c = outcome.into_contract();
    assert_eq!(c.status, ContractStatus::Active);
    assert!(c.signed_at.is_some());

    let c = h.manager.complete(&client(), &c).await.unwrap();
    assert_eq!(c.status, ContractStatus::Completed);
    assert_eq!(h.sink.last().unwrap().0, "Contract marked as completed!");

    assert!(!eligibility::can_report_conflict(&c, &client()));
    assert!(!eligibility::can_report_conflict(&c, &freelancer()));
    assert!(Eligibility::evaluate(&c, &client()).granted().is_empty());
}

#[tokio::test]
async fn freelancer_signing_first_also_waits() {
    let h = harness();
    let c = h.pending().await;
    let c = h
        .manager
        .sign(&freelancer(), &c, FREELANCER_SIG)
        .await
        .unwrap()
        .into_contract();
    assert_eq!(c.status, ContractStatus::PendingSignature);
    assert!(c.has_signed(Party::Freelancer));
    assert!(!c.has_signed(Party::Client));
    assert!(!eligibility::can_sign(&c, &freelancer()));
    assert!(eligibility::can_sign(&c, &client()));
}

#[tokio::test]
async fn re_signing_is_refused_before_the_store() {
    let h = harness();
    let c = h.pending().await;
    let c = h.manager.sign(&client(), &c, CLIENT_SIG).await.unwrap().into_contract();
    assert!(!eligibility::can_sign(&c, &client()));

    let calls = h.store.calls();
    let err = h.manager.sign(&client(), &c, CLIENT_SIG).await.unwrap_err();
    assert_eq!(err.kind(), "authorization");
    assert_eq!(h.store.calls(), calls);
}

#[tokio::test]
async fn reject_returns_to_draft_and_clears_signatures() {
    let h = harness();
    let c = h.pending().await;
    let c = h.manager.sign(&client(), &c, CLIENT_SIG).await.unwrap().into_contract();

    let c = h.manager.reject(&freelancer(), &c).await.unwrap();
    assert_eq!(c.status, ContractStatus::Draft);
    assert!(!c.has_signed(Party::Client));
    assert_eq!(h.sink.last().unwrap().0, "Contract sent back for revision.");
}

#[tokio::test]
async fn client_cannot_reject() {
    let h = harness();
    let c = h.pending().await;
    let err = h.manager.reject(&client(), &c).await.unwrap_err();
    assert_eq!(err.kind(), "authorization");
}

#[tokio::test]
async fn propose_changes_edits_and_resets_in_one_call() {
    let h = harness();
    let c = h.pending().await;
    let patch = ContractPatch {
        amount: Some(Amount::from_major_units(650)),
        ..ContractPatch::default()
    };
    let calls = h.store.calls();
    let c = h.manager.propose_changes(&freelancer(), &c, &patch).await.unwrap();
    assert_eq!(h.store.calls(), calls + 1);
    assert_eq!(c.status, ContractStatus::Draft);
    assert_eq!(c.amount, Amount::from_major_units(650));
    assert_eq!(h.sink.last().unwrap().0, "Changes saved. Contract is back in Draft.");
}

#[tokio::test]
async fn withdraw_with_edits_returns_to_draft() {
    let h = harness();
    let c = h.pending().await;
    let patch = ContractPatch {
        title: Some("Website Redesign, phase one".into()),
        ..ContractPatch::default()
    };
    let c = h.manager.withdraw(&client(), &c, Some(&patch)).await.unwrap();
    assert_eq!(c.status, ContractStatus::Draft);
    assert_eq!(c.title, "Website Redesign, phase one");
}

#[tokio::test]
async fn empty_edit_is_a_validation_error() {
    let h = harness();
    let c = h.drafted().await;
    let err = h
        .manager
        .update_contract(&client(), &c, &ContractPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(ref e) if e.contains("patch")));
}

#[tokio::test]
async fn edit_that_breaks_the_dates_is_refused() {
    let h = harness();
    let c = h.drafted().await;
    let patch = ContractPatch {
        end_date: Some(c.start_date),
        ..ContractPatch::default()
    };
    let err = h.manager.update_contract(&client(), &c, &patch).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(ref e) if e.contains("endDate")));
    assert_eq!(h.store.contract(c.id).unwrap(), c);
}

#[tokio::test]
async fn failed_status_change_leaves_the_view_untouched() {
    let h = harness();
    let c = h.drafted().await;
    let session = ContractSession::new(h.manager.clone(), client(), c.clone());

    h.store.fail_next(StoreError::rejected(500, "java.lang.IllegalStateException"));
    let err = session.submit_for_signature().await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(session.contract(), c);
    assert_eq!(h.store.contract(c.id).unwrap(), c);
    let (message, severity) = h.sink.last().unwrap();
    assert_eq!(severity, Severity::Error);
    assert!(!message.contains("java"));

    let updated = session.submit_for_signature().await.unwrap();
    assert_eq!(session.contract(), updated);
}

#[tokio::test]
async fn store_conflict_is_blocking_and_keeps_the_server_message() {
    let h = harness();
    let c = h.pending().await;
    h.store.fail_next(StoreError::rejected(409, "Contract is already signed by CLIENT"));
    let err = h.manager.sign(&client(), &c, CLIENT_SIG).await.unwrap_err();
    assert!(err.is_blocking());
    assert_eq!(
        h.sink.last(),
        Some(("Contract is already signed by CLIENT".to_string(), Severity::Error))
    );
}

#[tokio::test]
async fn session_rejects_a_second_action_while_busy() {
    let h = harness();
    let c = h.drafted().await;
    let session = Arc::new(ContractSession::new(h.manager.clone(), client(), c));
    h.store.set_latency(Some(Duration::from_millis(200)));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_for_signature().await })
    };
    while !session.is_busy() {
        tokio::task::yield_now().await;
    }
    let second = session.submit_for_signature().await;
    assert_eq!(second, Err(LifecycleError::Busy));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status, ContractStatus::PendingSignature);
    assert!(!session.is_busy());
    assert_eq!(session.status(), ContractStatus::PendingSignature);
}

#[tokio::test]
async fn detached_session_drops_late_responses() {
    let h = harness();
    let c = h.drafted().await;
    let session = Arc::new(ContractSession::new(h.manager.clone(), client(), c.clone()));
    h.store.set_latency(Some(Duration::from_millis(100)));

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_for_signature().await })
    };
    while !session.is_busy() {
        tokio::task::yield_now().await;
    }
    session.detach();

    let result = pending.await.unwrap().unwrap();
    assert_eq!(result.status, ContractStatus::PendingSignature);
    assert_eq!(session.contract(), c);
    assert!(session.is_detached());
}

#[tokio::test]
async fn slow_store_surfaces_as_transient() {
    let h = harness_with_timeout(Duration::from_millis(50));
    let c = h.drafted().await;
    h.store.set_latency(Some(Duration::from_millis(500)));
    let err = h.manager.complete(&client(), &c).await;
    // Pre-flight refuses before any store call: DRAFT cannot complete.
    assert_eq!(err.unwrap_err().kind(), "authorization");

    let err = h.manager.submit_for_signature(&client(), &c).await.unwrap_err();
    assert_eq!(err.kind(), "transient");
    assert_eq!(
        h.sink.last().unwrap().0,
        "The service is temporarily unavailable. Please try again."
    );
}

#[tokio::test]
async fn admin_override_respects_invariants() {
    let h = harness();
    let c = h.pending().await;
    let err = h
        .manager
        .override_status(&admin(), &c, ContractStatus::Active)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "authorization");

    let c = h
        .manager
        .override_status(&admin(), &c, ContractStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(c.status, ContractStatus::Cancelled);

    let err = h
        .manager
        .override_status(&admin(), &c, ContractStatus::Draft)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "authorization");
}

#[tokio::test]
async fn non_admin_cannot_override() {
    let h = harness();
    let c = h.drafted().await;
    let err = h
        .manager
        .override_status(&client(), &c, ContractStatus::Cancelled)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "authorization");
}

#[tokio::test]
async fn delete_rules_and_session_detach() {
    let h = harness();
    let c = h.pending().await;
    let err = h.manager.delete_contract(&client(), &c).await.unwrap_err();
    assert_eq!(err.kind(), "authorization");

    let session = ContractSession::new(h.manager.clone(), admin(), c.clone());
    assert!(session.delete().await.unwrap());
    assert!(session.is_detached());
    assert!(h.store.contract(c.id).is_none());
    assert!(!h.manager.delete_contract(&admin(), &c).await.unwrap());
}

#[tokio::test]
async fn session_opens_from_the_store_and_refreshes() {
    let h = harness();
    let c = h.drafted().await;
    let session = ContractSession::open(h.manager.clone(), client(), c.id).await.unwrap();
    assert!(session.eligibility().can_edit);

    h.manager.submit_for_signature(&client(), &c).await.unwrap();
    assert_eq!(session.status(), ContractStatus::Draft);
    let refreshed = session.refresh().await.unwrap();
    assert_eq!(refreshed.status, ContractStatus::PendingSignature);
    assert!(!session.eligibility().can_edit);
}

#[tokio::test]
async fn party_names_fall_back_to_ids() {
    let h = harness();
    let c = h.drafted().await;
    let names = h.manager.party_names(&c).await;
    assert_eq!(names.client, "Grace Hopper");
    assert_eq!(names.freelancer, "#2");
}

#[tokio::test]
async fn list_hides_inconsistent_contracts_with_a_warning() {
    let h = harness();
    let good = h.drafted().await;
    let mut bad = h.drafted().await;
    bad.status = ContractStatus::Active;
    h.store.seed_contract(bad);

    let listed = h
        .manager
        .list_contracts(&client(), sfl_state::StatusFilter::All)
        .await
        .unwrap();
    assert_eq!(listed, vec![good]);
    assert_eq!(h.sink.count(Severity::Warning), 1);
}
