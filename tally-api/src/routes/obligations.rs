/// Recurring obligation endpoints
///
/// # Endpoints
///
/// - `GET /v1/obligations` - List the caller's obligations by next due date
/// - `POST /v1/obligations` - Register an obligation and record its first payment
/// - `PUT /v1/obligations/:id` - Change amount, description or next due date
/// - `DELETE /v1/obligations/:id` - Cancel an obligation
///
/// Expenses already materialized from an obligation are kept when it is
/// edited or cancelled.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tally_shared::{
    auth::middleware::AuthContext,
    ledger,
    models::{
        expense::Expense,
        obligation::{CreateObligation, RecurringObligation, UpdateObligation},
    },
};
use uuid::Uuid;

/// List obligations response
#[derive(Debug, Serialize)]
pub struct ListObligationsResponse {
    pub obligations: Vec<RecurringObligation>,
}

/// Register obligation response
#[derive(Debug, Serialize)]
pub struct RegisterObligationResponse {
    /// The stored obligation, due one period after `first_date`
    pub obligation: RecurringObligation,

    /// The expense recorded for `first_date`
    pub first_expense: Expense,
}

pub async fn list_obligations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ListObligationsResponse>> {
    let obligations = ledger::list_obligations(state.store.as_ref(), auth.user_id).await?;
    Ok(Json(ListObligationsResponse { obligations }))
}

/// Register a recurring obligation
///
/// # Request
///
/// ```json
/// {
///   "amount": "50.00",
///   "description": "Streaming",
///   "category_id": "uuid",
///   "first_date": "2024-01-15",
///   "cadence": "monthly"
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Category belongs to another user
/// - `404 Not Found`: Category does not exist
/// - `422 Unprocessable Entity`: Amount out of range or finer than cents, or empty description
pub async fn register_obligation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateObligation>,
) -> ApiResult<(StatusCode, Json<RegisterObligationResponse>)> {
    let (obligation, first_expense) =
        ledger::register_obligation(state.store.as_ref(), auth.user_id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterObligationResponse {
            obligation,
            first_expense,
        }),
    ))
}

pub async fn update_obligation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateObligation>,
) -> ApiResult<Json<RecurringObligation>> {
    let obligation =
        ledger::update_obligation(state.store.as_ref(), auth.user_id, id, req).await?;
    Ok(Json(obligation))
}

pub async fn cancel_obligation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ledger::cancel_obligation(state.store.as_ref(), auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
