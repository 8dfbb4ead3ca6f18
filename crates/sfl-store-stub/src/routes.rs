//! Route definitions for the Contract Store stub.
//!
//! Mirrors the paths `sfl-store-client` calls, with camelCase bodies that
//! deserialize straight into its types.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use sfl_arbitration::{ConflictReport, ConflictStatus, ContractConflict};
use sfl_core::{ConflictId, ContractId, UserId};
use sfl_lifecycle::ContractStore;
use sfl_state::{Contract, ContractDraft, ContractPatch, ContractStatus};
use sfl_store_client::{NewUser, SignRequest, UserProfile};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Contracts
        .route("/contract/api/contracts", get(contract_list).post(contract_create))
        .route("/contract/api/contracts/client/:id", get(contract_list_by_client))
        .route(
            "/contract/api/contracts/freelancer/:id",
            get(contract_list_by_freelancer),
        )
        .route(
            "/contract/api/contracts/:id",
            get(contract_get).put(contract_update).delete(contract_delete),
        )
        .route("/contract/api/contracts/:id/status", patch(contract_set_status))
        .route("/contract/api/contracts/:id/sign", patch(contract_sign))
        // Conflicts
        .route("/contract/api/conflicts", get(conflict_list))
        .route(
            "/contract/api/conflicts/contract/:id",
            get(conflict_list_for_contract).post(conflict_report),
        )
        .route("/contract/api/conflicts/:id", get(conflict_get))
        .route("/contract/api/conflicts/:id/status", put(conflict_set_status))
        // Users
        .route("/user/api/users", post(user_create))
        .route("/user/api/users/:id", get(user_get))
        .fallback(not_implemented)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}

#[derive(Deserialize)]
struct StatusQuery {
    status: String,
}

// ── Contracts ───────────────────────────────────────────────────────

async fn contract_list(State(state): State<AppState>) -> ApiResult<Vec<Contract>> {
    Ok(Json(state.store().list_contracts().await?))
}

async fn contract_list_by_client(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Vec<Contract>> {
    Ok(Json(state.store().list_contracts_by_client(UserId(id)).await?))
}

async fn contract_list_by_freelancer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Vec<Contract>> {
    Ok(Json(state.store().list_contracts_by_freelancer(UserId(id)).await?))
}

async fn contract_get(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Contract> {
    Ok(Json(state.store().get_contract(ContractId(id)).await?))
}

async fn contract_create(
    State(state): State<AppState>,
    Json(draft): Json<ContractDraft>,
) -> Result<Response, ApiError> {
    let contract = state.store().create_contract(&draft).await?;
    tracing::info!(contract_id = contract.id.get(), "contract created");
    Ok((StatusCode::CREATED, Json(contract)).into_response())
}

async fn contract_update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<ContractPatch>,
) -> ApiResult<Contract> {
    Ok(Json(state.store().update_contract(ContractId(id), &patch).await?))
}

async fn contract_set_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Contract> {
    let status: ContractStatus = query
        .status
        .parse()
        .map_err(ApiError::Validation)?;
    let contract = state.store().set_status(ContractId(id), status).await?;
    tracing::info!(contract_id = id, %status, "status changed");
    Ok(Json(contract))
}

async fn contract_sign(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<SignRequest>,
) -> ApiResult<Contract> {
    let contract = state
        .store()
        .sign(ContractId(id), body.role, &body.signature_data)
        .await?;
    tracing::info!(contract_id = id, role = %body.role, status = %contract.status, "signature recorded");
    Ok(Json(contract))
}

async fn contract_delete(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode, ApiError> {
    if state.store().delete_contract(ContractId(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("{} not found", ContractId(id))))
    }
}

// ── Conflicts ───────────────────────────────────────────────────────

async fn conflict_list(State(state): State<AppState>) -> Json<Vec<ContractConflict>> {
    Json(state.store().all_conflicts())
}

async fn conflict_get(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<ContractConflict> {
    state
        .store()
        .conflict(ConflictId(id))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", ConflictId(id))))
}

async fn conflict_list_for_contract(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Vec<ContractConflict>> {
    Ok(Json(state.store().list_conflicts(ContractId(id)).await?))
}

async fn conflict_report(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(report): Json<ConflictReport>,
) -> Result<Response, ApiError> {
    let conflict = state.store().report_conflict(ContractId(id), &report).await?;
    tracing::info!(contract_id = id, conflict_id = conflict.id.get(), "conflict reported");
    Ok((StatusCode::CREATED, Json(conflict)).into_response())
}

async fn conflict_set_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<ContractConflict> {
    let status: ConflictStatus = query
        .status
        .parse()
        .map_err(ApiError::Validation)?;
    Ok(Json(
        state.store().update_conflict_status(ConflictId(id), status).await?,
    ))
}

// ── Users ───────────────────────────────────────────────────────────

async fn user_create(State(state): State<AppState>, Json(user): Json<NewUser>) -> Response {
    let profile = state.users().create(user);
    (StatusCode::CREATED, Json(profile)).into_response()
}

async fn user_get(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<UserProfile> {
    state
        .users()
        .get(UserId(id))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", UserId(id))))
}
