/// Budget model and database operations
///
/// A budget is a monthly spending limit for one (user, category) pair. The
/// pair is unique: setting a budget again replaces the limit in place.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE budgets (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     category_id UUID NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
///     limit_amount NUMERIC(12, 2) NOT NULL CHECK (limit_amount > 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT budgets_user_category_unique UNIQUE (user_id, category_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::validate_positive_amount;

/// Monthly spending limit for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Budget {
    /// Unique budget ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Budgeted category
    pub category_id: Uuid,

    /// Monthly limit
    pub limit_amount: Decimal,

    /// When the budget was first set
    pub created_at: DateTime<Utc>,

    /// When the limit last changed
    pub updated_at: DateTime<Utc>,
}

/// Input for setting (creating or replacing) a budget
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetBudget {
    /// Category to budget
    pub category_id: Uuid,

    /// Monthly limit
    #[validate(custom(function = "validate_positive_amount"))]
    pub limit_amount: Decimal,
}

impl Budget {
    /// Builds a budget value without touching the database
    pub fn new(user_id: Uuid, data: &SetBudget) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id: data.category_id,
            limit_amount: data.limit_amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates the budget or replaces the limit of the existing one
    ///
    /// Relies on the `(user_id, category_id)` unique constraint so two
    /// concurrent calls still leave a single row.
    pub async fn upsert(pool: &PgPool, user_id: Uuid, data: &SetBudget) -> Result<Self, sqlx::Error> {
        let budget = sqlx::query_as::<_, Budget>(
            r#"
            INSERT INTO budgets (user_id, category_id, limit_amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, category_id)
            DO UPDATE SET limit_amount = EXCLUDED.limit_amount,
                          updated_at = NOW()
            RETURNING id, user_id, category_id, limit_amount, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.category_id)
        .bind(data.limit_amount)
        .fetch_one(pool)
        .await?;

        Ok(budget)
    }

    /// Finds a budget by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let budget = sqlx::query_as::<_, Budget>(
            r#"
            SELECT id, user_id, category_id, limit_amount, created_at, updated_at
            FROM budgets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(budget)
    }

    /// Lists a user's budgets in creation order
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let budgets = sqlx::query_as::<_, Budget>(
            r#"
            SELECT id, user_id, category_id, limit_amount, created_at, updated_at
            FROM budgets
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(budgets)
    }

    /// Deletes a budget
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
