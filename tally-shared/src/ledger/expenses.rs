/// Expense operations
///
/// Expenses are owner-only. Assigning a category (on create or update)
/// requires the category to be usable by the owner.

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{require_user, usable_category};
use crate::auth::authorization::authorize_expense;
use crate::calendar::DateRange;
use crate::error::{LedgerError, LedgerResult};
use crate::models::expense::{CreateExpense, Expense, NewExpense, UpdateExpense};
use crate::store::Store;

/// Records an expense for the user
pub async fn create_expense<S>(
    store: &S,
    user_id: Uuid,
    input: CreateExpense,
) -> LedgerResult<Expense>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    input.validate()?;

    if let Some(category_id) = input.category_id {
        usable_category(store, user_id, category_id).await?;
    }

    let expense = store
        .insert_expense(&NewExpense::from_input(user_id, input))
        .await?;

    info!(user_id = %user_id, expense_id = %expense.id, "Expense recorded");
    Ok(expense)
}

/// Lists the user's expenses, optionally within a date range
pub async fn list_expenses<S>(
    store: &S,
    user_id: Uuid,
    range: Option<DateRange>,
) -> LedgerResult<Vec<Expense>>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    Ok(store.list_expenses(user_id, range).await?)
}

/// Gets one of the user's expenses
pub async fn get_expense<S>(store: &S, user_id: Uuid, expense_id: Uuid) -> LedgerResult<Expense>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    owned_expense(store, user_id, expense_id).await
}

/// Applies a partial update to one of the user's expenses
pub async fn update_expense<S>(
    store: &S,
    user_id: Uuid,
    expense_id: Uuid,
    input: UpdateExpense,
) -> LedgerResult<Expense>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    input.validate()?;

    owned_expense(store, user_id, expense_id).await?;
    if let Some(category_id) = input.category_id {
        usable_category(store, user_id, category_id).await?;
    }

    let expense = store
        .update_expense(expense_id, &input)
        .await?
        .ok_or_else(|| LedgerError::not_found("Expense", expense_id))?;

    debug!(user_id = %user_id, expense_id = %expense_id, "Expense updated");
    Ok(expense)
}

/// Deletes one of the user's expenses
pub async fn delete_expense<S>(store: &S, user_id: Uuid, expense_id: Uuid) -> LedgerResult<()>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    owned_expense(store, user_id, expense_id).await?;

    if !store.delete_expense(expense_id).await? {
        return Err(LedgerError::not_found("Expense", expense_id));
    }

    info!(user_id = %user_id, expense_id = %expense_id, "Expense deleted");
    Ok(())
}

async fn owned_expense<S>(store: &S, user_id: Uuid, expense_id: Uuid) -> LedgerResult<Expense>
where
    S: Store + ?Sized,
{
    let expense = store
        .find_expense(expense_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("Expense", expense_id))?;

    authorize_expense(user_id, &expense)?;

    Ok(expense)
}
