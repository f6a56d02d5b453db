/// Integration tests for the Tally API
///
/// Drive the full router (auth layer, error mapping, handlers) against an
/// in-memory store:
/// - Authentication failures
/// - Expense, budget and obligation CRUD
/// - Ownership guard and validation errors
/// - Budget status

mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{sign, TestContext, TEST_SECRET};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tally_shared::auth::jwt::Claims;
use uuid::Uuid;

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.send_anonymous(Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.send_anonymous(Method::GET, "/v1/categories").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["path"], "/v1/categories");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_bad_tokens_are_unauthorized() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .send_as("not-a-jwt", Method::GET, "/v1/expenses", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong_secret = sign(
        &Claims::new(ctx.user.id, Duration::hours(1)),
        "some-other-secret-that-is-also-32-bytes",
    );
    let (status, _) = ctx
        .send_as(&wrong_secret, Method::GET, "/v1/expenses", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = sign(&Claims::new(ctx.user.id, Duration::hours(-2)), TEST_SECRET);
    let (status, body) = ctx
        .send_as(&expired, Method::GET, "/v1/expenses", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let ctx = TestContext::new().await;
    let token = common::token_for(Uuid::new_v4());

    let (status, body) = ctx
        .send_as(&token, Method::GET, "/v1/budgets", None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_unknown_route_is_structured_not_found() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.send_anonymous(Method::GET, "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["path"], "/nope");
}

#[tokio::test]
async fn test_categories_global_and_private() {
    let ctx = TestContext::new().await;
    ctx.store.add_category("Groceries", None).await;
    let (bob, _) = ctx.other_user("bob@example.com").await;
    ctx.store.add_category("Bob's hobby", Some(bob.id)).await;

    let (status, created) = ctx
        .send(Method::POST, "/v1/categories", Some(json!({ "name": "Coffee" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["owner_id"], ctx.user.id.to_string());

    let (status, body) = ctx.send(Method::GET, "/v1/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Coffee", "Groceries"]);

    let (status, body) = ctx
        .send(Method::POST, "/v1/categories", Some(json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");
}

#[tokio::test]
async fn test_expense_lifecycle() {
    let ctx = TestContext::new().await;
    let groceries = ctx.store.add_category("Groceries", None).await;

    let (status, created) = ctx
        .send(
            Method::POST,
            "/v1/expenses",
            Some(json!({
                "amount": "42.10",
                "description": "Weekly shop",
                "expense_date": "2024-02-10",
                "category_id": groceries.id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&created["amount"]), Decimal::new(4210, 2));
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/v1/expenses/{}", id);

    let (status, fetched) = ctx.send(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["description"], "Weekly shop");

    let (status, updated) = ctx
        .send(Method::PUT, &uri, Some(json!({ "amount": "45.00" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&updated["amount"]), Decimal::from(45));
    assert_eq!(updated["description"], "Weekly shop");

    let (status, body) = ctx.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = ctx.send(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["path"], uri);
}

#[tokio::test]
async fn test_expense_validation() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/v1/expenses",
            Some(json!({
                "amount": "0",
                "description": "Free lunch",
                "expense_date": "2024-02-10",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
    assert_eq!(body["details"][0]["field"], "amount");
}

#[tokio::test]
async fn test_expense_range_filter() {
    let ctx = TestContext::new().await;
    for date in ["2024-01-31", "2024-02-01", "2024-02-29", "2024-03-01"] {
        let (status, _) = ctx
            .send(
                Method::POST,
                "/v1/expenses",
                Some(json!({ "amount": "1", "description": "x", "expense_date": date })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = ctx
        .send(Method::GET, "/v1/expenses?from=2024-02-01&to=2024-02-29", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = body["expenses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["expense_date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-02-01", "2024-02-29"]);

    let (status, body) = ctx.send(Method::GET, "/v1/expenses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expenses"].as_array().unwrap().len(), 4);

    let (status, body) = ctx
        .send(Method::GET, "/v1/expenses?from=2024-03-01&to=2024-02-01", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_cannot_touch_another_users_expense() {
    let ctx = TestContext::new().await;
    let (_, bob_token) = ctx.other_user("bob@example.com").await;

    let (_, created) = ctx
        .send_as(
            &bob_token,
            Method::POST,
            "/v1/expenses",
            Some(json!({ "amount": "9.99", "description": "Bob's", "expense_date": "2024-02-10" })),
        )
        .await;
    let uri = format!("/v1/expenses/{}", created["id"].as_str().unwrap());

    let (status, body) = ctx.send(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "access_denied");
    assert_eq!(body["path"], uri);

    let (status, _) = ctx
        .send(Method::PUT, &uri, Some(json!({ "description": "Mine now" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Still there for Bob
    let (status, body) = ctx.send_as(&bob_token, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Bob's");
}

#[tokio::test]
async fn test_cannot_use_another_users_category() {
    let ctx = TestContext::new().await;
    let (bob, _) = ctx.other_user("bob@example.com").await;
    let private = ctx.store.add_category("Bob's hobby", Some(bob.id)).await;

    let (status, _) = ctx
        .send(
            Method::POST,
            "/v1/expenses",
            Some(json!({
                "amount": "5",
                "description": "Sneaky",
                "expense_date": "2024-02-10",
                "category_id": private.id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(
            Method::PUT,
            "/v1/budgets",
            Some(json!({ "category_id": private.id, "limit_amount": "100" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(
            Method::POST,
            "/v1/expenses",
            Some(json!({
                "amount": "5",
                "description": "Nowhere",
                "expense_date": "2024-02-10",
                "category_id": Uuid::new_v4(),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_budget_twice_replaces_limit() {
    let ctx = TestContext::new().await;
    let groceries = ctx.store.add_category("Groceries", None).await;

    let (status, first) = ctx
        .send(
            Method::PUT,
            "/v1/budgets",
            Some(json!({ "category_id": groceries.id, "limit_amount": "200" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = ctx
        .send(
            Method::PUT,
            "/v1/budgets",
            Some(json!({ "category_id": groceries.id, "limit_amount": "250" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], second["id"]);

    let (_, body) = ctx.send(Method::GET, "/v1/budgets", None).await;
    let budgets = body["budgets"].as_array().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(decimal(&budgets[0]["limit_amount"]), Decimal::from(250));
}

#[tokio::test]
async fn test_budget_rejects_non_positive_limit() {
    let ctx = TestContext::new().await;
    let groceries = ctx.store.add_category("Groceries", None).await;

    let (status, body) = ctx
        .send(
            Method::PUT,
            "/v1/budgets",
            Some(json!({ "category_id": groceries.id, "limit_amount": "0" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "limit_amount");
}

#[tokio::test]
async fn test_budget_status() {
    let ctx = TestContext::new().await;
    let groceries = ctx.store.add_category("Groceries", None).await;

    ctx.send(
        Method::PUT,
        "/v1/budgets",
        Some(json!({ "category_id": groceries.id, "limit_amount": "200" })),
    )
    .await;

    for (amount, date) in [("100", "2024-02-03"), ("50", "2024-02-20"), ("80", "2024-01-31")] {
        ctx.send(
            Method::POST,
            "/v1/expenses",
            Some(json!({
                "amount": amount,
                "description": "Shop",
                "expense_date": date,
                "category_id": groceries.id,
            })),
        )
        .await;
    }

    let (status, body) = ctx
        .send(Method::GET, "/v1/budgets/status?as_of=2024-02-10", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["as_of"], "2024-02-10");

    let entry = &body["budgets"][0];
    assert_eq!(entry["category_name"], "Groceries");
    assert_eq!(decimal(&entry["spent"]), Decimal::from(150));
    assert_eq!(entry["percentage"].as_f64().unwrap(), 75.0);

    let (status, body) = ctx
        .send(Method::GET, "/v1/budgets/status?as_of=2024-03-01", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budgets"][0]["percentage"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn test_remove_budget() {
    let ctx = TestContext::new().await;
    let groceries = ctx.store.add_category("Groceries", None).await;
    let (_, bob_token) = ctx.other_user("bob@example.com").await;

    let (_, budget) = ctx
        .send(
            Method::PUT,
            "/v1/budgets",
            Some(json!({ "category_id": groceries.id, "limit_amount": "200" })),
        )
        .await;
    let uri = format!("/v1/budgets/{}", budget["id"].as_str().unwrap());

    let (status, _) = ctx.send_as(&bob_token, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = ctx.send(Method::GET, "/v1/budgets", None).await;
    assert!(body["budgets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_obligation_lifecycle() {
    let ctx = TestContext::new().await;
    let subscriptions = ctx.store.add_category("Subscriptions", None).await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/v1/obligations",
            Some(json!({
                "amount": "50",
                "description": "Streaming",
                "category_id": subscriptions.id,
                "first_date": "2024-01-15",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["obligation"]["next_due_date"], "2024-02-15");
    assert_eq!(body["obligation"]["cadence"], "monthly");
    assert_eq!(body["first_expense"]["expense_date"], "2024-01-15");
    assert_eq!(body["first_expense"]["description"], "Streaming");

    let uri = format!(
        "/v1/obligations/{}",
        body["obligation"]["id"].as_str().unwrap()
    );

    let (status, updated) = ctx
        .send(Method::PUT, &uri, Some(json!({ "amount": "55" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&updated["amount"]), Decimal::from(55));
    assert_eq!(updated["next_due_date"], "2024-02-15");

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(json!({ "amount": "-1" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "amount");

    let (_, body) = ctx.send(Method::GET, "/v1/obligations", None).await;
    assert_eq!(body["obligations"].as_array().unwrap().len(), 1);

    let (status, _) = ctx.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = ctx.send(Method::GET, "/v1/obligations", None).await;
    assert!(body["obligations"].as_array().unwrap().is_empty());

    // The first payment stays on the ledger
    let (_, body) = ctx.send(Method::GET, "/v1/expenses", None).await;
    assert_eq!(body["expenses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cannot_cancel_another_users_obligation() {
    let ctx = TestContext::new().await;
    let subscriptions = ctx.store.add_category("Subscriptions", None).await;
    let (_, bob_token) = ctx.other_user("bob@example.com").await;

    let (_, body) = ctx
        .send_as(
            &bob_token,
            Method::POST,
            "/v1/obligations",
            Some(json!({
                "amount": "12",
                "description": "Gym",
                "category_id": subscriptions.id,
                "first_date": "2024-01-01",
            })),
        )
        .await;
    let uri = format!(
        "/v1/obligations/{}",
        body["obligation"]["id"].as_str().unwrap()
    );

    let (status, _) = ctx.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = ctx.send_as(&bob_token, Method::GET, "/v1/obligations", None).await;
    assert_eq!(body["obligations"].as_array().unwrap().len(), 1);
}
