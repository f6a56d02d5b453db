/// Recurring obligation model and database operations
///
/// An obligation is a template for an expense that repeats on a fixed
/// cadence (a subscription, rent, ...). The materializer turns each due
/// occurrence into a realized [`Expense`] and moves `next_due_date` forward.
///
/// # Lifecycle
///
/// ```text
/// register ──> due (next_due_date <= today) ──materialize──> scheduled (next_due_date + 1 month)
///    │                                                          │
///    └───────────── user edit / cancel at any point ────────────┘
/// ```
///
/// `next_due_date` is the only completion marker: an occurrence counts as
/// materialized exactly when the date has moved past it.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE obligation_cadence AS ENUM ('monthly');
///
/// CREATE TABLE recurring_obligations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     category_id UUID NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
///     amount NUMERIC(12, 2) NOT NULL CHECK (amount > 0),
///     description VARCHAR(255) NOT NULL,
///     cadence obligation_cadence NOT NULL DEFAULT 'monthly',
///     next_due_date DATE NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::expense::{Expense, NewExpense, AUTO_GENERATED_SUFFIX};
use super::validate_positive_amount;
use crate::calendar::add_months;

/// How often an obligation repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "obligation_cadence", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// Once per calendar month, on the same day of month
    #[default]
    Monthly,
}

impl Cadence {
    /// Gets cadence as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Monthly => "monthly",
        }
    }

    /// Computes the occurrence following `date`
    ///
    /// Monthly cadence keeps the day of month, clamped to the end of shorter
    /// months. Returns None on calendar overflow.
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Cadence::Monthly => add_months(date, 1),
        }
    }
}

/// Recurring obligation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecurringObligation {
    /// Unique obligation ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Category of the generated expenses
    pub category_id: Uuid,

    /// Amount of each occurrence
    pub amount: Decimal,

    /// Description copied onto each generated expense
    pub description: String,

    /// Repeat cadence
    pub cadence: Cadence,

    /// Date of the next occurrence that has not been materialized yet
    pub next_due_date: NaiveDate,

    /// When the obligation was registered
    pub created_at: DateTime<Utc>,

    /// When the obligation was last advanced or edited
    pub updated_at: DateTime<Utc>,
}

/// Fully resolved obligation ready to be written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewObligation {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub cadence: Cadence,
    pub next_due_date: NaiveDate,
}

/// Input for registering an obligation
///
/// `first_date` is the date of the first payment, which is recorded right
/// away; the obligation then falls due one period later.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateObligation {
    /// Amount of each occurrence
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,

    /// Description
    #[validate(length(min = 1, max = 255, message = "Description must be 1-255 characters"))]
    pub description: String,

    /// Category of the generated expenses
    pub category_id: Uuid,

    /// Date of the first payment
    pub first_date: NaiveDate,

    /// Repeat cadence
    #[serde(default)]
    pub cadence: Cadence,
}

/// Input for editing an obligation
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateObligation {
    /// New amount
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Option<Decimal>,

    /// New description
    #[validate(length(min = 1, max = 255, message = "Description must be 1-255 characters"))]
    pub description: Option<String>,

    /// New next-due date
    pub next_due_date: Option<NaiveDate>,
}

impl NewObligation {
    /// Materializes the row without touching the database
    pub fn into_obligation(self) -> RecurringObligation {
        let now = Utc::now();
        RecurringObligation {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            category_id: self.category_id,
            amount: self.amount,
            description: self.description,
            cadence: self.cadence,
            next_due_date: self.next_due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

impl RecurringObligation {
    /// Checks whether the obligation has an occurrence on or before `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_due_date <= today
    }

    /// Date the next-due date moves to once the current occurrence is materialized
    pub fn following_due_date(&self) -> Option<NaiveDate> {
        self.cadence.advance(self.next_due_date)
    }

    /// Builds the expense for the current occurrence
    ///
    /// The expense is dated on the occurrence itself, not on the day the
    /// materializer happens to run.
    pub fn occurrence_expense(&self) -> NewExpense {
        NewExpense {
            user_id: self.user_id,
            category_id: Some(self.category_id),
            amount: self.amount,
            description: format!("{}{}", self.description, AUTO_GENERATED_SUFFIX),
            expense_date: self.next_due_date,
        }
    }

    /// Applies a partial update in place
    pub fn apply(&mut self, changes: &UpdateObligation) {
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(ref description) = changes.description {
            self.description = description.clone();
        }
        if let Some(date) = changes.next_due_date {
            self.next_due_date = date;
        }
        self.updated_at = Utc::now();
    }

    /// Registers an obligation together with its first expense
    ///
    /// Both rows are written in one transaction.
    pub async fn create_with_first_expense(
        pool: &PgPool,
        data: &NewObligation,
        first_expense: &NewExpense,
    ) -> Result<(Self, Expense), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let obligation = sqlx::query_as::<_, RecurringObligation>(
            r#"
            INSERT INTO recurring_obligations
                (user_id, category_id, amount, description, cadence, next_due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, category_id, amount, description, cadence,
                      next_due_date, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.category_id)
        .bind(data.amount)
        .bind(&data.description)
        .bind(data.cadence)
        .bind(data.next_due_date)
        .fetch_one(&mut *tx)
        .await?;

        let expense = Expense::insert(&mut *tx, first_expense).await?;

        tx.commit().await?;

        Ok((obligation, expense))
    }

    /// Finds an obligation by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let obligation = sqlx::query_as::<_, RecurringObligation>(
            r#"
            SELECT id, user_id, category_id, amount, description, cadence,
                   next_due_date, created_at, updated_at
            FROM recurring_obligations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(obligation)
    }

    /// Lists a user's obligations by next-due date
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let obligations = sqlx::query_as::<_, RecurringObligation>(
            r#"
            SELECT id, user_id, category_id, amount, description, cadence,
                   next_due_date, created_at, updated_at
            FROM recurring_obligations
            WHERE user_id = $1
            ORDER BY next_due_date ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(obligations)
    }

    /// Gets every obligation due on or before `today`, across all users
    ///
    /// Ordered by due date, then ID, so repeated runs over the same data
    /// process obligations in the same order.
    pub async fn find_due(pool: &PgPool, today: NaiveDate) -> Result<Vec<Self>, sqlx::Error> {
        let obligations = sqlx::query_as::<_, RecurringObligation>(
            r#"
            SELECT id, user_id, category_id, amount, description, cadence,
                   next_due_date, created_at, updated_at
            FROM recurring_obligations
            WHERE next_due_date <= $1
            ORDER BY next_due_date ASC, id ASC
            "#,
        )
        .bind(today)
        .fetch_all(pool)
        .await?;

        Ok(obligations)
    }

    /// Updates an obligation
    ///
    /// # Returns
    ///
    /// The updated obligation, or None if it no longer exists
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &UpdateObligation,
    ) -> Result<Option<Self>, sqlx::Error> {
        let obligation = sqlx::query_as::<_, RecurringObligation>(
            r#"
            UPDATE recurring_obligations
            SET amount = COALESCE($2, amount),
                description = COALESCE($3, description),
                next_due_date = COALESCE($4, next_due_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, category_id, amount, description, cadence,
                      next_due_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.amount)
        .bind(data.description.as_deref())
        .bind(data.next_due_date)
        .fetch_optional(pool)
        .await?;

        Ok(obligation)
    }

    /// Materializes the current occurrence
    ///
    /// Advances `next_due_date` and inserts the expense in one transaction.
    /// The advance only applies if the row is unchanged since `self` was
    /// read (same due date and `updated_at`); otherwise nothing is written.
    ///
    /// # Returns
    ///
    /// The created expense, or None if the obligation was edited, advanced
    /// or cancelled concurrently
    pub async fn materialize(
        &self,
        pool: &PgPool,
        expense: &NewExpense,
        next_due_date: NaiveDate,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let advanced = sqlx::query(
            r#"
            UPDATE recurring_obligations
            SET next_due_date = $4,
                updated_at = NOW()
            WHERE id = $1 AND next_due_date = $2 AND updated_at = $3
            "#,
        )
        .bind(self.id)
        .bind(self.next_due_date)
        .bind(self.updated_at)
        .bind(next_due_date)
        .execute(&mut *tx)
        .await?;

        if advanced.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let expense = Expense::insert(&mut *tx, expense).await?;

        tx.commit().await?;

        Ok(Some(expense))
    }

    /// Deletes (cancels) an obligation
    ///
    /// Expenses it already produced stay in the ledger.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recurring_obligations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
