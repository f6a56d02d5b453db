/// Persistence seams for the ledger
///
/// The ledger services, the budget aggregator and the materializer only talk
/// to storage through these traits, so they run unchanged against Postgres
/// ([`PgStore`]) and against the in-memory [`MemoryStore`] used by tests.
///
/// Method names are unique across the traits so calls on a `dyn Store`
/// never need disambiguation.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tally_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::calendar::DateRange;
use crate::models::budget::{Budget, SetBudget};
use crate::models::category::{Category, CreateCategory};
use crate::models::expense::{Expense, NewExpense, UpdateExpense};
use crate::models::obligation::{NewObligation, RecurringObligation, UpdateObligation};
use crate::models::user::User;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend unavailable or refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Creates a category; `owner_id` None makes it global
    async fn create_category(
        &self,
        owner_id: Option<Uuid>,
        data: &CreateCategory,
    ) -> StoreResult<Category>;

    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>>;

    /// Global categories plus the user's private ones
    async fn list_categories_for(&self, user_id: Uuid) -> StoreResult<Vec<Category>>;
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn insert_expense(&self, data: &NewExpense) -> StoreResult<Expense>;

    async fn find_expense(&self, id: Uuid) -> StoreResult<Option<Expense>>;

    /// Lists a user's expenses ordered by date, optionally within `range`
    async fn list_expenses(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> StoreResult<Vec<Expense>>;

    /// Returns None if the expense no longer exists
    async fn update_expense(&self, id: Uuid, data: &UpdateExpense)
        -> StoreResult<Option<Expense>>;

    async fn delete_expense(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Creates the (user, category) budget or replaces its limit
    async fn upsert_budget(&self, user_id: Uuid, data: &SetBudget) -> StoreResult<Budget>;

    async fn find_budget(&self, id: Uuid) -> StoreResult<Option<Budget>>;

    /// Lists a user's budgets in the store's natural order
    async fn list_budgets(&self, user_id: Uuid) -> StoreResult<Vec<Budget>>;

    async fn delete_budget(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ObligationStore: Send + Sync {
    /// Writes the obligation and its first expense atomically
    async fn create_obligation(
        &self,
        data: &NewObligation,
        first_expense: &NewExpense,
    ) -> StoreResult<(RecurringObligation, Expense)>;

    async fn find_obligation(&self, id: Uuid) -> StoreResult<Option<RecurringObligation>>;

    async fn list_obligations(&self, user_id: Uuid) -> StoreResult<Vec<RecurringObligation>>;

    /// All obligations with `next_due_date <= today`, by due date then id
    async fn find_due_obligations(&self, today: NaiveDate)
        -> StoreResult<Vec<RecurringObligation>>;

    async fn update_obligation(
        &self,
        id: Uuid,
        data: &UpdateObligation,
    ) -> StoreResult<Option<RecurringObligation>>;

    async fn delete_obligation(&self, id: Uuid) -> StoreResult<bool>;

    /// Inserts `expense` and moves the obligation to `next_due_date` as one unit
    ///
    /// Only applies if the stored obligation still matches `obligation`
    /// (same due date, not edited since it was read). Returns None, having
    /// written nothing, when it does not.
    async fn materialize(
        &self,
        obligation: &RecurringObligation,
        expense: &NewExpense,
        next_due_date: NaiveDate,
    ) -> StoreResult<Option<Expense>>;
}

/// Everything the ledger needs from persistence
#[async_trait]
pub trait Store: UserStore + CategoryStore + ExpenseStore + BudgetStore + ObligationStore {
    /// Checks the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}
