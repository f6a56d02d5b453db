/// Expense model and database operations
///
/// Expenses are the realized ledger entries. They are entered directly by a
/// user or produced by the obligation materializer, in which case the
/// description carries [`AUTO_GENERATED_SUFFIX`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE expenses (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
///     amount NUMERIC(12, 2) NOT NULL CHECK (amount > 0),
///     description VARCHAR(255) NOT NULL,
///     expense_date DATE NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tally_shared::models::expense::{Expense, NewExpense};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let expense = Expense::insert(&pool, &NewExpense {
///     user_id: Uuid::new_v4(),
///     category_id: None,
///     amount: Decimal::new(1250, 2),
///     description: "Lunch".to_string(),
///     expense_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::validate_positive_amount;
use crate::calendar::DateRange;

/// Marker appended to descriptions of materialized expenses
pub const AUTO_GENERATED_SUFFIX: &str = " (Auto)";

/// Realized ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Expense {
    /// Unique expense ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Category, if any
    pub category_id: Option<Uuid>,

    /// Amount spent (always positive)
    pub amount: Decimal,

    /// Free-form description
    pub description: String,

    /// Day the expense applies to
    pub expense_date: NaiveDate,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

/// Fully resolved expense ready to be written
///
/// Built by the ledger services after validation and ownership checks, and by
/// the materializer from an obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub description: String,
    pub expense_date: NaiveDate,
}

/// Input for recording an expense
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateExpense {
    /// Amount spent
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,

    /// Description
    #[validate(length(min = 1, max = 255, message = "Description must be 1-255 characters"))]
    pub description: String,

    /// Day of the expense
    pub expense_date: NaiveDate,

    /// Optional category
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

/// Input for updating an expense
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateExpense {
    /// New amount
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Option<Decimal>,

    /// New description
    #[validate(length(min = 1, max = 255, message = "Description must be 1-255 characters"))]
    pub description: Option<String>,

    /// New expense date
    pub expense_date: Option<NaiveDate>,

    /// New category
    pub category_id: Option<Uuid>,
}

impl NewExpense {
    /// Builds a new expense owned by `user_id` from validated input
    pub fn from_input(user_id: Uuid, data: CreateExpense) -> Self {
        Self {
            user_id,
            category_id: data.category_id,
            amount: data.amount,
            description: data.description,
            expense_date: data.expense_date,
        }
    }

    /// Materializes the row without touching the database
    pub fn into_expense(self) -> Expense {
        let now = Utc::now();
        Expense {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            category_id: self.category_id,
            amount: self.amount,
            description: self.description,
            expense_date: self.expense_date,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Expense {
    /// Checks whether the materializer produced this expense
    pub fn is_auto_generated(&self) -> bool {
        self.description.ends_with(AUTO_GENERATED_SUFFIX)
    }

    /// Applies a partial update in place
    pub fn apply(&mut self, changes: &UpdateExpense) {
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(ref description) = changes.description {
            self.description = description.clone();
        }
        if let Some(date) = changes.expense_date {
            self.expense_date = date;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = Some(category_id);
        }
        self.updated_at = Utc::now();
    }

    /// Inserts an expense
    ///
    /// Accepts any executor so it can run inside the materializer's
    /// transaction as well as directly on the pool.
    pub async fn insert<'e, E>(executor: E, data: &NewExpense) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (user_id, category_id, amount, description, expense_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, category_id, amount, description, expense_date,
                      created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.category_id)
        .bind(data.amount)
        .bind(&data.description)
        .bind(data.expense_date)
        .fetch_one(executor)
        .await?;

        Ok(expense)
    }

    /// Finds an expense by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, category_id, amount, description, expense_date,
                   created_at, updated_at
            FROM expenses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(expense)
    }

    /// Lists a user's expenses, optionally restricted to a date range
    ///
    /// Ordered by expense date, then creation time.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, category_id, amount, description, expense_date,
                   created_at, updated_at
            FROM expenses
            WHERE user_id = $1
              AND ($2::date IS NULL OR expense_date >= $2)
              AND ($3::date IS NULL OR expense_date <= $3)
            ORDER BY expense_date ASC, created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(pool)
        .await?;

        Ok(expenses)
    }

    /// Updates an expense
    ///
    /// # Returns
    ///
    /// The updated expense, or None if it no longer exists
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &UpdateExpense,
    ) -> Result<Option<Self>, sqlx::Error> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET amount = COALESCE($2, amount),
                description = COALESCE($3, description),
                expense_date = COALESCE($4, expense_date),
                category_id = COALESCE($5, category_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, category_id, amount, description, expense_date,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.amount)
        .bind(data.description.as_deref())
        .bind(data.expense_date)
        .bind(data.category_id)
        .fetch_optional(pool)
        .await?;

        Ok(expense)
    }

    /// Deletes an expense
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
