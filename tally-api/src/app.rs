/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tally_api::{app::{build_router, AppState}, config::Config};
/// use tally_shared::db::pool::{create_pool, DatabaseConfig};
/// use tally_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::new(config.database.url.clone(), 10)).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::error_path::error_path_layer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;
use tally_shared::auth::{
    jwt,
    middleware::{bearer_token, AuthContext},
};
use tally_shared::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Ledger persistence
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token validation
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                     # Health check (public)
/// └── /v1/                        # Bearer JWT required
///     ├── /categories             GET, POST
///     ├── /expenses               GET (?from=&to=), POST
///     │   └── /:id                GET, PUT, DELETE
///     ├── /budgets                GET, PUT
///     │   ├── /status             GET (?as_of=)
///     │   └── /:id                DELETE
///     └── /obligations            GET, POST
///         └── /:id                PUT, DELETE
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. CORS (tower-http CorsLayer)
/// 2. Logging (tower-http TraceLayer)
/// 3. Error path stamping
/// 4. Authentication (`/v1` only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let category_routes = Router::new().route(
        "/",
        get(routes::categories::list_categories).post(routes::categories::create_category),
    );

    let expense_routes = Router::new()
        .route(
            "/",
            get(routes::expenses::list_expenses).post(routes::expenses::create_expense),
        )
        .route(
            "/:id",
            get(routes::expenses::get_expense)
                .put(routes::expenses::update_expense)
                .delete(routes::expenses::delete_expense),
        );

    let budget_routes = Router::new()
        .route(
            "/",
            get(routes::budgets::list_budgets).put(routes::budgets::set_budget),
        )
        .route("/status", get(routes::budgets::budget_status))
        .route("/:id", delete(routes::budgets::remove_budget));

    let obligation_routes = Router::new()
        .route(
            "/",
            get(routes::obligations::list_obligations)
                .post(routes::obligations::register_obligation),
        )
        .route(
            "/:id",
            put(routes::obligations::update_obligation)
                .delete(routes::obligations::cancel_obligation),
        );

    let v1_routes = Router::new()
        .nest("/categories", category_routes)
        .nest("/expenses", expense_routes)
        .nest("/budgets", budget_routes)
        .nest("/obligations", obligation_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .fallback(route_not_found)
        .layer(axum::middleware::from_fn(error_path_layer))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects [`AuthContext`] into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = bearer_token(auth_header)
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::from_claims(&claims));

    Ok(next.run(req).await)
}
