//! Contract tests for the store client against the gateway paths.
//!
//! Every test mounts a wiremock server in place of the gateway and checks
//! the method, path, query and body the client sends, plus how it maps the
//! response.

use sfl_arbitration::{ConflictReason, ConflictReport, ConflictStatus};
use sfl_core::{Amount, ConflictId, ContractId, UserId};
use sfl_state::{ContractDraft, ContractPatch, ContractStatus, Party};
use sfl_store_client::{StoreApiConfig, StoreApiError, StoreClient};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> StoreClient {
    let config = StoreApiConfig {
        gateway_url: mock_server.uri().parse().unwrap(),
        api_token: None,
        timeout_secs: 5,
    };
    StoreClient::new(config).unwrap()
}

fn contract_json(id: u64, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "clientId": 1,
        "freelancerId": 2,
        "title": "Website Redesign",
        "terms": "Deliverables in three milestones, net 15.",
        "amount": 500.0,
        "startDate": "2026-01-15",
        "endDate": "2026-02-14",
        "status": status,
        "createdAt": "2026-01-10T09:00:00"
    })
}

// ── Reads ────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_by_client_hits_client_path() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contract/api/contracts/client/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([contract_json(7, "DRAFT"), contract_json(8, "ACTIVE")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let contracts = test_client(&mock_server)
        .contracts()
        .list_by_client(UserId(1))
        .await
        .unwrap();
    assert_eq!(contracts.len(), 2);
    assert_eq!(contracts[1].status, ContractStatus::Active);
}

#[tokio::test]
async fn get_contract_returns_none_on_404() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contract/api/contracts/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = test_client(&mock_server).contracts().get(ContractId(99)).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn malformed_body_is_a_deserialization_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contract/api/contracts/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).contracts().get(ContractId(7)).await.unwrap_err();
    assert!(matches!(err, StoreApiError::Deserialization { .. }), "got {err:?}");
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contract/api/contracts"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = StoreApiConfig::with_gateway(&mock_server.uri()).unwrap();
    config.api_token = Some("test-token".into());
    let client = StoreClient::new(config).unwrap();
    assert!(client.contracts().list().await.unwrap().is_empty());
}

// ── Mutations ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_posts_camel_case_draft() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contract/api/contracts"))
        .and(body_json(serde_json::json!({
            "clientId": 1,
            "freelancerId": 2,
            "title": "Website Redesign",
            "terms": "Deliverables in three milestones, net 15.",
            "amount": 500,
            "startDate": "2026-01-15",
            "endDate": "2026-02-14"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(contract_json(7, "DRAFT")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let draft = ContractDraft {
        client_id: UserId(1),
        freelancer_id: UserId(2),
        project_application_id: None,
        offer_application_id: None,
        title: "Website Redesign".into(),
        description: None,
        terms: "Deliverables in three milestones, net 15.".into(),
        amount: Amount::from_major_units(500),
        start_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        end_date: chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
    };
    let created = test_client(&mock_server).contracts().create(&draft).await.unwrap();
    assert_eq!(created.id, ContractId(7));
    assert_eq!(created.status, ContractStatus::Draft);
}

#[tokio::test]
async fn set_status_sends_query_parameter() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/contract/api/contracts/7/status"))
        .and(query_param("status", "PENDING_SIGNATURE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(contract_json(7, "PENDING_SIGNATURE")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let updated = test_client(&mock_server)
        .contracts()
        .set_status(ContractId(7), ContractStatus::PendingSignature)
        .await
        .unwrap();
    assert_eq!(updated.status, ContractStatus::PendingSignature);
}

#[tokio::test]
async fn sign_sends_role_and_signature_data() {
    let mock_server = MockServer::start().await;
    let mut signed = contract_json(7, "PENDING_SIGNATURE");
    signed["clientSignatureUrl"] = serde_json::json!("data:image/png;base64,AAA");
    Mock::given(method("PATCH"))
        .and(path("/contract/api/contracts/7/sign"))
        .and(body_json(serde_json::json!({
            "role": "CLIENT",
            "signatureData": "data:image/png;base64,AAA"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(signed))
        .expect(1)
        .mount(&mock_server)
        .await;

    let contract = test_client(&mock_server)
        .contracts()
        .sign(ContractId(7), Party::Client, "data:image/png;base64,AAA")
        .await
        .unwrap();
    assert!(contract.has_signed(Party::Client));
}

#[tokio::test]
async fn rejected_mutation_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/contract/api/contracts/7/status"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Illegal transition"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .contracts()
        .set_status(ContractId(7), ContractStatus::Completed)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    match err {
        StoreApiError::ApiError { body, .. } => assert_eq!(body, "Illegal transition"),
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn update_sends_only_present_fields() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/contract/api/contracts/7"))
        .and(body_json(serde_json::json!({"amount": 750, "status": "DRAFT"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(contract_json(7, "DRAFT")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let patch = ContractPatch {
        amount: Some(Amount::from_major_units(750)),
        status: Some(ContractStatus::Draft),
        ..ContractPatch::default()
    };
    test_client(&mock_server)
        .contracts()
        .update(ContractId(7), &patch)
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_maps_404_to_false() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/contract/api/contracts/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(true)))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/contract/api/contracts/8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(client.contracts().delete(ContractId(7)).await.unwrap());
    assert!(!client.contracts().delete(ContractId(8)).await.unwrap());
}

// ── Conflicts and users ──────────────────────────────────────────────

#[tokio::test]
async fn report_conflict_posts_to_contract_path() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contract/api/conflicts/contract/7"))
        .and(body_json(serde_json::json!({
            "raisedById": 2,
            "reason": "Missed Deadline",
            "description": "Second milestone is two weeks overdue."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3,
            "raisedById": 2,
            "reason": "Missed Deadline",
            "description": "Second milestone is two weeks overdue.",
            "status": "OPEN"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = ConflictReport::new(
        2,
        ConflictReason::MissedDeadline,
        "Second milestone is two weeks overdue.",
        None,
    );
    let conflict = test_client(&mock_server)
        .conflicts()
        .report(ContractId(7), &report)
        .await
        .unwrap();
    assert_eq!(conflict.id, ConflictId(3));
    assert_eq!(conflict.status, ConflictStatus::Open);
}

#[tokio::test]
async fn update_conflict_status_uses_put_with_query() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/contract/api/conflicts/3/status"))
        .and(query_param("status", "RESOLVED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3,
            "raisedById": 2,
            "reason": "Missed Deadline",
            "description": "Second milestone is two weeks overdue.",
            "status": "RESOLVED",
            "resolvedAt": "2026-02-03T10:00:00"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let conflict = test_client(&mock_server)
        .conflicts()
        .update_status(ConflictId(3), ConflictStatus::Resolved)
        .await
        .unwrap();
    assert!(conflict.resolved_at.is_some());
}

#[tokio::test]
async fn get_user_reads_directory_path() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/api/users/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 42,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": "FREELANCER",
            "email": "ada@example.com"
        })))
        .mount(&mock_server)
        .await;

    let user = test_client(&mock_server).users().get(UserId(42)).await.unwrap().unwrap();
    assert_eq!(user.display_name().as_deref(), Some("Ada Lovelace"));
}

#[tokio::test]
async fn server_error_carries_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contract/api/conflicts/contract/7"))
        .respond_with(ResponseTemplate::new(500).set_body_string("NullPointerException"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .conflicts()
        .list_for_contract(ContractId(7))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn read_is_retried_through_a_gateway_restart() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contract/api/contracts/7"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contract/api/contracts/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(contract_json(7, "DRAFT")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let contract = test_client(&mock_server)
        .contracts()
        .get(ContractId(7))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contract.id, ContractId(7));
}

#[tokio::test]
async fn gateway_error_on_a_mutation_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/contract/api/contracts/7/status"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .contracts()
        .set_status(ContractId(7), ContractStatus::PendingSignature)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
}
