/// Postgres-backed store
///
/// Thin delegation to the model functions; each call is its own statement or
/// transaction.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    BudgetStore, CategoryStore, ExpenseStore, ObligationStore, Store, StoreResult, UserStore,
};
use crate::calendar::DateRange;
use crate::db::pool::health_check;
use crate::models::budget::{Budget, SetBudget};
use crate::models::category::{Category, CreateCategory};
use crate::models::expense::{Expense, NewExpense, UpdateExpense};
use crate::models::obligation::{NewObligation, RecurringObligation, UpdateObligation};
use crate::models::user::User;

/// Store over a sqlx Postgres pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn create_category(
        &self,
        owner_id: Option<Uuid>,
        data: &CreateCategory,
    ) -> StoreResult<Category> {
        Ok(Category::create(&self.pool, owner_id, data).await?)
    }

    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(Category::find_by_id(&self.pool, id).await?)
    }

    async fn list_categories_for(&self, user_id: Uuid) -> StoreResult<Vec<Category>> {
        Ok(Category::list_usable_by(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl ExpenseStore for PgStore {
    async fn insert_expense(&self, data: &NewExpense) -> StoreResult<Expense> {
        Ok(Expense::insert(&self.pool, data).await?)
    }

    async fn find_expense(&self, id: Uuid) -> StoreResult<Option<Expense>> {
        Ok(Expense::find_by_id(&self.pool, id).await?)
    }

    async fn list_expenses(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> StoreResult<Vec<Expense>> {
        Ok(Expense::list_by_user(&self.pool, user_id, range).await?)
    }

    async fn update_expense(
        &self,
        id: Uuid,
        data: &UpdateExpense,
    ) -> StoreResult<Option<Expense>> {
        Ok(Expense::update(&self.pool, id, data).await?)
    }

    async fn delete_expense(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Expense::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl BudgetStore for PgStore {
    async fn upsert_budget(&self, user_id: Uuid, data: &SetBudget) -> StoreResult<Budget> {
        Ok(Budget::upsert(&self.pool, user_id, data).await?)
    }

    async fn find_budget(&self, id: Uuid) -> StoreResult<Option<Budget>> {
        Ok(Budget::find_by_id(&self.pool, id).await?)
    }

    async fn list_budgets(&self, user_id: Uuid) -> StoreResult<Vec<Budget>> {
        Ok(Budget::list_by_user(&self.pool, user_id).await?)
    }

    async fn delete_budget(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Budget::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl ObligationStore for PgStore {
    async fn create_obligation(
        &self,
        data: &NewObligation,
        first_expense: &NewExpense,
    ) -> StoreResult<(RecurringObligation, Expense)> {
        Ok(RecurringObligation::create_with_first_expense(&self.pool, data, first_expense).await?)
    }

    async fn find_obligation(&self, id: Uuid) -> StoreResult<Option<RecurringObligation>> {
        Ok(RecurringObligation::find_by_id(&self.pool, id).await?)
    }

    async fn list_obligations(&self, user_id: Uuid) -> StoreResult<Vec<RecurringObligation>> {
        Ok(RecurringObligation::list_by_user(&self.pool, user_id).await?)
    }

    async fn find_due_obligations(
        &self,
        today: NaiveDate,
    ) -> StoreResult<Vec<RecurringObligation>> {
        Ok(RecurringObligation::find_due(&self.pool, today).await?)
    }

    async fn update_obligation(
        &self,
        id: Uuid,
        data: &UpdateObligation,
    ) -> StoreResult<Option<RecurringObligation>> {
        Ok(RecurringObligation::update(&self.pool, id, data).await?)
    }

    async fn delete_obligation(&self, id: Uuid) -> StoreResult<bool> {
        Ok(RecurringObligation::delete(&self.pool, id).await?)
    }

    async fn materialize(
        &self,
        obligation: &RecurringObligation,
        expense: &NewExpense,
        next_due_date: NaiveDate,
    ) -> StoreResult<Option<Expense>> {
        Ok(obligation.materialize(&self.pool, expense, next_due_date).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
