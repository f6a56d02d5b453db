/// Integration tests for the budget aggregator

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::ledger::{self, budget_status};
use tally_shared::models::budget::SetBudget;
use tally_shared::models::expense::{CreateExpense, NewExpense};
use tally_shared::store::{BudgetStore, ExpenseStore, MemoryStore};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn spend(store: &MemoryStore, user_id: Uuid, category_id: Option<Uuid>, amount: i64, on: NaiveDate) {
    ledger::create_expense(
        store,
        user_id,
        CreateExpense {
            amount: Decimal::from(amount),
            description: "Spend".to_string(),
            expense_date: on,
            category_id,
        },
    )
    .await
    .unwrap();
}

async fn budget(store: &MemoryStore, user_id: Uuid, category_id: Uuid, limit: i64) {
    ledger::set_budget(
        store,
        user_id,
        SetBudget {
            category_id,
            limit_amount: Decimal::from(limit),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_status_seventy_five_percent() {
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let groceries = store.add_category("Groceries", None).await;

    budget(&store, user.id, groceries.id, 200).await;
    spend(&store, user.id, Some(groceries.id), 100, date(2024, 3, 2)).await;
    spend(&store, user.id, Some(groceries.id), 50, date(2024, 3, 28)).await;

    let statuses = budget_status(&store, user.id, date(2024, 3, 15)).await.unwrap();

    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].category_name, "Groceries");
    assert_eq!(statuses[0].limit, Decimal::from(200));
    assert_eq!(statuses[0].spent, Decimal::from(150));
    assert_eq!(statuses[0].percentage, 75.0);
}

#[tokio::test]
async fn test_status_nothing_spent() {
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let groceries = store.add_category("Groceries", None).await;
    budget(&store, user.id, groceries.id, 200).await;

    let statuses = budget_status(&store, user.id, date(2024, 3, 15)).await.unwrap();
    assert_eq!(statuses[0].spent, Decimal::ZERO);
    assert_eq!(statuses[0].percentage, 0.0);
}

#[tokio::test]
async fn test_status_exactly_at_limit() {
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let groceries = store.add_category("Groceries", None).await;

    budget(&store, user.id, groceries.id, 200).await;
    spend(&store, user.id, Some(groceries.id), 200, date(2024, 3, 1)).await;

    let statuses = budget_status(&store, user.id, date(2024, 3, 31)).await.unwrap();
    assert_eq!(statuses[0].percentage, 100.0);
}

#[tokio::test]
async fn test_status_zero_limit_is_zero_percent() {
    // Validation refuses zero limits, so plant one the way legacy data could
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let groceries = store.add_category("Groceries", None).await;

    store
        .upsert_budget(
            user.id,
            &SetBudget {
                category_id: groceries.id,
                limit_amount: Decimal::ZERO,
            },
        )
        .await
        .unwrap();
    spend(&store, user.id, Some(groceries.id), 10, date(2024, 3, 3)).await;

    let statuses = budget_status(&store, user.id, date(2024, 3, 15)).await.unwrap();
    assert_eq!(statuses[0].spent, Decimal::from(10));
    assert_eq!(statuses[0].percentage, 0.0);
    assert!(statuses[0].percentage.is_finite());
}

#[tokio::test]
async fn test_status_excludes_other_months() {
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let groceries = store.add_category("Groceries", None).await;

    budget(&store, user.id, groceries.id, 100).await;
    spend(&store, user.id, Some(groceries.id), 30, date(2024, 2, 29)).await;
    spend(&store, user.id, Some(groceries.id), 25, date(2024, 3, 1)).await;
    spend(&store, user.id, Some(groceries.id), 25, date(2024, 3, 31)).await;
    spend(&store, user.id, Some(groceries.id), 40, date(2024, 4, 1)).await;

    let statuses = budget_status(&store, user.id, date(2024, 3, 10)).await.unwrap();
    assert_eq!(statuses[0].spent, Decimal::from(50));
    assert_eq!(statuses[0].percentage, 50.0);
}

#[tokio::test]
async fn test_status_excludes_other_categories_and_uncategorized() {
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let groceries = store.add_category("Groceries", None).await;
    let transport = store.add_category("Transport", None).await;

    budget(&store, user.id, groceries.id, 100).await;
    spend(&store, user.id, Some(groceries.id), 20, date(2024, 3, 5)).await;
    spend(&store, user.id, Some(transport.id), 60, date(2024, 3, 5)).await;
    spend(&store, user.id, None, 70, date(2024, 3, 5)).await;

    let statuses = budget_status(&store, user.id, date(2024, 3, 10)).await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].spent, Decimal::from(20));
}

#[tokio::test]
async fn test_status_ignores_other_users() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice@example.com").await;
    let bob = store.add_user("bob@example.com").await;
    let groceries = store.add_category("Groceries", None).await;

    budget(&store, alice.id, groceries.id, 100).await;
    spend(&store, bob.id, Some(groceries.id), 90, date(2024, 3, 5)).await;

    let statuses = budget_status(&store, alice.id, date(2024, 3, 10)).await.unwrap();
    assert_eq!(statuses[0].spent, Decimal::ZERO);

    assert!(budget_status(&store, bob.id, date(2024, 3, 10)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_status_counts_auto_generated_expenses() {
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let subscriptions = store.add_category("Subscriptions", None).await;
    budget(&store, user.id, subscriptions.id, 40).await;

    store
        .insert_expense(&NewExpense {
            user_id: user.id,
            category_id: Some(subscriptions.id),
            amount: Decimal::new(1099, 2),
            description: "Music (Auto)".to_string(),
            expense_date: date(2024, 3, 12),
        })
        .await
        .unwrap();

    let statuses = budget_status(&store, user.id, date(2024, 3, 12)).await.unwrap();
    assert_eq!(statuses[0].spent, Decimal::new(1099, 2));
    assert!((statuses[0].percentage - 27.475).abs() < 1e-9);
}

#[tokio::test]
async fn test_status_keeps_budget_order() {
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let transport = store.add_category("Transport", None).await;
    let groceries = store.add_category("Groceries", None).await;

    budget(&store, user.id, transport.id, 80).await;
    budget(&store, user.id, groceries.id, 300).await;
    // Updating the first budget does not move it
    budget(&store, user.id, transport.id, 90).await;

    let names: Vec<String> = budget_status(&store, user.id, date(2024, 3, 1))
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.category_name)
        .collect();
    assert_eq!(names, vec!["Transport", "Groceries"]);
}

#[tokio::test]
async fn test_status_unknown_user() {
    let store = MemoryStore::new();
    assert!(budget_status(&store, Uuid::new_v4(), date(2024, 3, 1)).await.is_err());
}

#[tokio::test]
async fn test_status_cent_amounts() {
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let coffee = store.add_category("Coffee", None).await;

    ledger::set_budget(
        &store,
        user.id,
        SetBudget {
            category_id: coffee.id,
            limit_amount: Decimal::new(30, 2),
        },
    )
    .await
    .unwrap();

    for cents in [10, 20] {
        ledger::create_expense(
            &store,
            user.id,
            CreateExpense {
                amount: Decimal::new(cents, 2),
                description: "Refill".to_string(),
                expense_date: date(2024, 3, 4),
                category_id: Some(coffee.id),
            },
        )
        .await
        .unwrap();
    }

    let statuses = budget_status(&store, user.id, date(2024, 3, 20)).await.unwrap();
    assert_eq!(statuses[0].spent, Decimal::new(30, 2));
    assert_eq!(statuses[0].percentage, 100.0);
}

#[tokio::test]
async fn test_status_largest_storable_amounts() {
    let store = MemoryStore::new();
    let user = store.add_user("alice@example.com").await;
    let housing = store.add_category("Housing", None).await;
    let largest = Decimal::new(999_999_999_999, 2);

    ledger::set_budget(
        &store,
        user.id,
        SetBudget {
            category_id: housing.id,
            limit_amount: Decimal::new(1, 2),
        },
    )
    .await
    .unwrap();

    for _ in 0..3 {
        ledger::create_expense(
            &store,
            user.id,
            CreateExpense {
                amount: largest,
                description: "Mansion".to_string(),
                expense_date: date(2024, 3, 4),
                category_id: Some(housing.id),
            },
        )
        .await
        .unwrap();
    }

    let statuses = budget_status(&store, user.id, date(2024, 3, 20)).await.unwrap();
    assert_eq!(statuses[0].spent, largest * Decimal::from(3));
    assert!(statuses[0].percentage.is_finite());
    assert!(statuses[0].percentage > 1e13);
}
