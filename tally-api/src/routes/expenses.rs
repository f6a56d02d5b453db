/// Expense endpoints
///
/// # Endpoints
///
/// - `GET /v1/expenses?from=&to=` - List the caller's expenses, optionally within a date range
/// - `POST /v1/expenses` - Record an expense
/// - `GET /v1/expenses/:id` - Fetch one expense
/// - `PUT /v1/expenses/:id` - Partially update an expense
/// - `DELETE /v1/expenses/:id` - Delete an expense

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_shared::{
    auth::middleware::AuthContext,
    calendar::DateRange,
    ledger,
    models::expense::{CreateExpense, Expense, UpdateExpense},
};
use uuid::Uuid;

/// Date filter for listing expenses
///
/// Both bounds are inclusive; either may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ExpenseRangeQuery {
    /// Converts the query into a date range
    ///
    /// Returns `Ok(None)` when neither bound is given.
    pub fn into_range(self) -> ApiResult<Option<DateRange>> {
        if self.from.is_none() && self.to.is_none() {
            return Ok(None);
        }

        let start = self.from.unwrap_or(NaiveDate::MIN);
        let end = self.to.unwrap_or(NaiveDate::MAX);
        DateRange::new(start, end)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest("`from` must not be after `to`".to_string()))
    }
}

/// List expenses response
#[derive(Debug, Serialize)]
pub struct ListExpensesResponse {
    pub expenses: Vec<Expense>,
}

/// List the caller's expenses, ordered by date
///
/// # Errors
///
/// - `400 Bad Request`: `from` is after `to`
pub async fn list_expenses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExpenseRangeQuery>,
) -> ApiResult<Json<ListExpensesResponse>> {
    let range = query.into_range()?;
    let expenses = ledger::list_expenses(state.store.as_ref(), auth.user_id, range).await?;
    Ok(Json(ListExpensesResponse { expenses }))
}

/// Record an expense
///
/// # Request
///
/// ```json
/// {
///   "amount": "12.50",
///   "description": "Lunch",
///   "expense_date": "2024-01-15",
///   "category_id": "uuid"
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Category belongs to another user
/// - `404 Not Found`: Category does not exist
/// - `422 Unprocessable Entity`: Amount out of range or finer than cents, or empty description
pub async fn create_expense(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateExpense>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let expense = ledger::create_expense(state.store.as_ref(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Expense>> {
    let expense = ledger::get_expense(state.store.as_ref(), auth.user_id, id).await?;
    Ok(Json(expense))
}

/// Partially update an expense
///
/// Only fields present in the body change.
pub async fn update_expense(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateExpense>,
) -> ApiResult<Json<Expense>> {
    let expense = ledger::update_expense(state.store.as_ref(), auth.user_id, id, req).await?;
    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ledger::delete_expense(state.store.as_ref(), auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_query_has_no_range() {
        assert_eq!(ExpenseRangeQuery::default().into_range().unwrap(), None);
    }

    #[test]
    fn test_open_ended_range() {
        let range = ExpenseRangeQuery {
            from: Some(date(2024, 1, 1)),
            to: None,
        }
        .into_range()
        .unwrap()
        .unwrap();

        assert!(range.contains(date(2030, 1, 1)));
        assert!(!range.contains(date(2023, 12, 31)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = ExpenseRangeQuery {
            from: Some(date(2024, 2, 1)),
            to: Some(date(2024, 1, 1)),
        }
        .into_range();

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
