use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{require_user, usable_category};
use crate::auth::authorization::authorize_budget;
use crate::error::{LedgerError, LedgerResult};
use crate::models::budget::{Budget, SetBudget};
use crate::store::Store;

/// Sets the user's monthly limit for a category
///
/// Creates the budget, or replaces the limit if the user already has one for
/// that category.
pub async fn set_budget<S>(store: &S, user_id: Uuid, input: SetBudget) -> LedgerResult<Budget>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    input.validate()?;
    usable_category(store, user_id, input.category_id).await?;

    let budget = store.upsert_budget(user_id, &input).await?;

    info!(
        user_id = %user_id,
        budget_id = %budget.id,
        category_id = %budget.category_id,
        limit = %budget.limit_amount,
        "Budget set"
    );
    Ok(budget)
}

/// Lists the user's budgets in store order
pub async fn list_budgets<S>(store: &S, user_id: Uuid) -> LedgerResult<Vec<Budget>>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    Ok(store.list_budgets(user_id).await?)
}

/// Removes one of the user's budgets
pub async fn remove_budget<S>(store: &S, user_id: Uuid, budget_id: Uuid) -> LedgerResult<()>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;

    let budget = store
        .find_budget(budget_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("Budget", budget_id))?;
    authorize_budget(user_id, &budget)?;

    if !store.delete_budget(budget_id).await? {
        return Err(LedgerError::not_found("Budget", budget_id));
    }

    info!(user_id = %user_id, budget_id = %budget_id, "Budget removed");
    Ok(())
}
