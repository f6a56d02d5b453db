/// Category endpoints
///
/// # Endpoints
///
/// - `GET /v1/categories` - List global categories plus the caller's own
/// - `POST /v1/categories` - Create a private category

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use tally_shared::{
    auth::middleware::AuthContext,
    ledger,
    models::category::{Category, CreateCategory},
};

/// List categories response
#[derive(Debug, Serialize)]
pub struct ListCategoriesResponse {
    pub categories: Vec<Category>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ListCategoriesResponse>> {
    let categories = ledger::list_categories(state.store.as_ref(), auth.user_id).await?;
    Ok(Json(ListCategoriesResponse { categories }))
}

/// Create a private category
///
/// # Request
///
/// ```json
/// { "name": "Coffee" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty or overlong name
pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = ledger::create_category(state.store.as_ref(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
