/// Budget endpoints
///
/// # Endpoints
///
/// - `GET /v1/budgets` - List the caller's budgets
/// - `PUT /v1/budgets` - Set the monthly limit for a category (creates or replaces)
/// - `DELETE /v1/budgets/:id` - Remove a budget
/// - `GET /v1/budgets/status?as_of=` - Spend against each budget for the month containing `as_of`

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::{
    auth::middleware::AuthContext,
    ledger::{self, BudgetStatus},
    models::budget::{Budget, SetBudget},
};
use uuid::Uuid;

/// List budgets response
#[derive(Debug, Serialize)]
pub struct ListBudgetsResponse {
    pub budgets: Vec<Budget>,
}

pub async fn list_budgets(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ListBudgetsResponse>> {
    let budgets = ledger::list_budgets(state.store.as_ref(), auth.user_id).await?;
    Ok(Json(ListBudgetsResponse { budgets }))
}

/// Set a budget
///
/// # Request
///
/// ```json
/// { "category_id": "uuid", "limit_amount": "200.00" }
/// ```
///
/// Setting a budget for a category that already has one replaces its limit.
///
/// # Errors
///
/// - `403 Forbidden`: Category belongs to another user
/// - `404 Not Found`: Category does not exist
/// - `422 Unprocessable Entity`: Limit is not positive, not below 10^10, or finer than cents
pub async fn set_budget(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SetBudget>,
) -> ApiResult<Json<Budget>> {
    let budget = ledger::set_budget(state.store.as_ref(), auth.user_id, req).await?;
    Ok(Json(budget))
}

pub async fn remove_budget(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ledger::remove_budget(state.store.as_ref(), auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Budget status query
#[derive(Debug, Deserialize)]
pub struct BudgetStatusQuery {
    /// Any day in the month to report on; defaults to today (UTC)
    pub as_of: Option<NaiveDate>,
}

/// Budget status response
#[derive(Debug, Serialize)]
pub struct BudgetStatusResponse {
    pub as_of: NaiveDate,
    pub budgets: Vec<BudgetStatus>,
}

/// Report spend against each budget
///
/// # Response
///
/// ```json
/// {
///   "as_of": "2024-02-10",
///   "budgets": [
///     {
///       "budget_id": "uuid",
///       "category_id": "uuid",
///       "category_name": "Groceries",
///       "limit": "200",
///       "spent": "150",
///       "percentage": 75.0
///     }
///   ]
/// }
/// ```
pub async fn budget_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<BudgetStatusQuery>,
) -> ApiResult<Json<BudgetStatusResponse>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let budgets = ledger::budget_status(state.store.as_ref(), auth.user_id, as_of).await?;
    Ok(Json(BudgetStatusResponse { as_of, budgets }))
}
