/// In-memory store for tests and local demos
///
/// All state sits behind a single `RwLock`, so every trait call is atomic
/// with respect to the others, including [`ObligationStore::materialize`].
/// Collections are `Vec`s to keep insertion order as the natural order.
///
/// With the `test-util` feature, two hooks let tests reproduce production
/// hazards deterministically:
///
/// - `MemoryStore::fail_next_materialize` makes the next materialization of
///   one obligation return a store error
/// - `MemoryStore::edit_before_materialize` applies a user edit right before
///   the next materialization of one obligation commits, as if a request had
///   raced the worker
///
/// # Example
///
/// ```
/// use tally_shared::store::{MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store.add_user("ada@example.com").await;
/// assert!(store.find_user(user.id).await?.is_some());
/// # Ok(())
/// # }
/// ```

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    BudgetStore, CategoryStore, ExpenseStore, ObligationStore, Store, StoreError, StoreResult,
    UserStore,
};
use crate::calendar::DateRange;
use crate::models::budget::{Budget, SetBudget};
use crate::models::category::{Category, CreateCategory};
use crate::models::expense::{Expense, NewExpense, UpdateExpense};
use crate::models::obligation::{NewObligation, RecurringObligation, UpdateObligation};
use crate::models::user::User;

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    categories: Vec<Category>,
    expenses: Vec<Expense>,
    budgets: Vec<Budget>,
    obligations: Vec<RecurringObligation>,
    fail_materialize: HashSet<Uuid>,
    pending_edits: HashMap<Uuid, UpdateObligation>,
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

/// Next modification stamp, strictly after `previous`
fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user as the external auth service would
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Creates and inserts a user with the given email
    pub async fn add_user(&self, email: &str) -> User {
        let user = User::new(email, None);
        self.insert_user(user.clone()).await;
        user
    }

    /// Removes a user and everything it owns, like `ON DELETE CASCADE`
    pub async fn remove_user(&self, user_id: Uuid) -> bool {
        let mut state = self.state.write().await;
        let removed = state.users.remove(&user_id).is_some();
        state.categories.retain(|c| c.owner_id != Some(user_id));
        state.expenses.retain(|e| e.user_id != user_id);
        state.budgets.retain(|b| b.user_id != user_id);
        state.obligations.retain(|o| o.user_id != user_id);
        removed
    }

    /// Creates a category directly, bypassing validation
    pub async fn add_category(&self, name: &str, owner_id: Option<Uuid>) -> Category {
        let category = Category::new(name, owner_id);
        self.state.write().await.categories.push(category.clone());
        category
    }

    /// Makes the next materialization of `obligation_id` fail with a store error
    #[cfg(any(test, feature = "test-util"))]
    pub async fn fail_next_materialize(&self, obligation_id: Uuid) {
        self.state.write().await.fail_materialize.insert(obligation_id);
    }

    /// Applies `edit` to `obligation_id` just before its next materialization
    #[cfg(any(test, feature = "test-util"))]
    pub async fn edit_before_materialize(&self, obligation_id: Uuid, edit: UpdateObligation) {
        self.state
            .write()
            .await
            .pending_edits
            .insert(obligation_id, edit);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn create_category(
        &self,
        owner_id: Option<Uuid>,
        data: &CreateCategory,
    ) -> StoreResult<Category> {
        let category = Category::new(data.name.clone(), owner_id);
        self.state.write().await.categories.push(category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_categories_for(&self, user_id: Uuid) -> StoreResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state
            .categories
            .iter()
            .filter(|c| c.is_usable_by(user_id))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn insert_expense(&self, data: &NewExpense) -> StoreResult<Expense> {
        let expense = data.clone().into_expense();
        self.state.write().await.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn find_expense(&self, id: Uuid) -> StoreResult<Option<Expense>> {
        let state = self.state.read().await;
        Ok(state.expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn list_expenses(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> StoreResult<Vec<Expense>> {
        let state = self.state.read().await;
        let mut expenses: Vec<Expense> = state
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| range.map_or(true, |r| r.contains(e.expense_date)))
            .cloned()
            .collect();
        // stable: same-day expenses keep insertion order
        expenses.sort_by_key(|e| e.expense_date);
        Ok(expenses)
    }

    async fn update_expense(
        &self,
        id: Uuid,
        data: &UpdateExpense,
    ) -> StoreResult<Option<Expense>> {
        let mut state = self.state.write().await;
        let Some(expense) = state.expenses.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        let previous = expense.updated_at;
        expense.apply(data);
        expense.updated_at = touch(previous);
        Ok(Some(expense.clone()))
    }

    async fn delete_expense(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.expenses.len();
        state.expenses.retain(|e| e.id != id);
        Ok(state.expenses.len() < before)
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn upsert_budget(&self, user_id: Uuid, data: &SetBudget) -> StoreResult<Budget> {
        let mut state = self.state.write().await;
        if let Some(budget) = state
            .budgets
            .iter_mut()
            .find(|b| b.user_id == user_id && b.category_id == data.category_id)
        {
            budget.limit_amount = data.limit_amount;
            budget.updated_at = touch(budget.updated_at);
            return Ok(budget.clone());
        }

        let budget = Budget::new(user_id, data);
        state.budgets.push(budget.clone());
        Ok(budget)
    }

    async fn find_budget(&self, id: Uuid) -> StoreResult<Option<Budget>> {
        let state = self.state.read().await;
        Ok(state.budgets.iter().find(|b| b.id == id).cloned())
    }

    async fn list_budgets(&self, user_id: Uuid) -> StoreResult<Vec<Budget>> {
        let state = self.state.read().await;
        Ok(state
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_budget(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.budgets.len();
        state.budgets.retain(|b| b.id != id);
        Ok(state.budgets.len() < before)
    }
}

#[async_trait]
impl ObligationStore for MemoryStore {
    async fn create_obligation(
        &self,
        data: &NewObligation,
        first_expense: &NewExpense,
    ) -> StoreResult<(RecurringObligation, Expense)> {
        let obligation = data.clone().into_obligation();
        let expense = first_expense.clone().into_expense();

        let mut state = self.state.write().await;
        state.obligations.push(obligation.clone());
        state.expenses.push(expense.clone());

        Ok((obligation, expense))
    }

    async fn find_obligation(&self, id: Uuid) -> StoreResult<Option<RecurringObligation>> {
        let state = self.state.read().await;
        Ok(state.obligations.iter().find(|o| o.id == id).cloned())
    }

    async fn list_obligations(&self, user_id: Uuid) -> StoreResult<Vec<RecurringObligation>> {
        let state = self.state.read().await;
        let mut obligations: Vec<RecurringObligation> = state
            .obligations
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        obligations.sort_by(|a, b| a.next_due_date.cmp(&b.next_due_date).then(a.id.cmp(&b.id)));
        Ok(obligations)
    }

    async fn find_due_obligations(
        &self,
        today: NaiveDate,
    ) -> StoreResult<Vec<RecurringObligation>> {
        let state = self.state.read().await;
        let mut due: Vec<RecurringObligation> = state
            .obligations
            .iter()
            .filter(|o| o.is_due(today))
            .cloned()
            .collect();
        due.sort_by(|a, b| a.next_due_date.cmp(&b.next_due_date).then(a.id.cmp(&b.id)));
        Ok(due)
    }

    async fn update_obligation(
        &self,
        id: Uuid,
        data: &UpdateObligation,
    ) -> StoreResult<Option<RecurringObligation>> {
        let mut state = self.state.write().await;
        let Some(obligation) = state.obligations.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        let previous = obligation.updated_at;
        obligation.apply(data);
        obligation.updated_at = touch(previous);
        Ok(Some(obligation.clone()))
    }

    async fn delete_obligation(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.obligations.len();
        state.obligations.retain(|o| o.id != id);
        Ok(state.obligations.len() < before)
    }

    async fn materialize(
        &self,
        obligation: &RecurringObligation,
        expense: &NewExpense,
        next_due_date: NaiveDate,
    ) -> StoreResult<Option<Expense>> {
        let mut state = self.state.write().await;

        if state.fail_materialize.remove(&obligation.id) {
            return Err(StoreError::Unavailable(format!(
                "injected failure for obligation {}",
                obligation.id
            )));
        }

        if let Some(edit) = state.pending_edits.remove(&obligation.id) {
            if let Some(stored) = state.obligations.iter_mut().find(|o| o.id == obligation.id) {
                let previous = stored.updated_at;
                stored.apply(&edit);
                stored.updated_at = touch(previous);
            }
        }

        let Some(stored) = state.obligations.iter_mut().find(|o| o.id == obligation.id) else {
            return Ok(None);
        };
        if stored.next_due_date != obligation.next_due_date
            || stored.updated_at != obligation.updated_at
        {
            return Ok(None);
        }

        stored.next_due_date = next_due_date;
        stored.updated_at = touch(stored.updated_at);

        let expense = expense.clone().into_expense();
        state.expenses.push(expense.clone());

        Ok(Some(expense))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
