/// Recurring obligation operations
///
/// Registering an obligation records its first payment right away and
/// schedules the next one a period later; from then on the materializer owns
/// the schedule, while the user can still edit or cancel it.

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{require_user, usable_category};
use crate::auth::authorization::authorize_obligation;
use crate::error::{LedgerError, LedgerResult};
use crate::models::expense::{Expense, NewExpense};
use crate::models::obligation::{
    CreateObligation, NewObligation, RecurringObligation, UpdateObligation,
};
use crate::store::Store;

/// Registers an obligation and records its first expense
///
/// # Returns
///
/// The stored obligation (due one period after `first_date`) and the
/// expense dated `first_date`
pub async fn register_obligation<S>(
    store: &S,
    user_id: Uuid,
    input: CreateObligation,
) -> LedgerResult<(RecurringObligation, Expense)>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    input.validate()?;
    usable_category(store, user_id, input.category_id).await?;

    let next_due_date = input
        .cadence
        .advance(input.first_date)
        .ok_or_else(|| LedgerError::invalid("first_date", "Date is out of range"))?;

    let first_expense = NewExpense {
        user_id,
        category_id: Some(input.category_id),
        amount: input.amount,
        description: input.description.clone(),
        expense_date: input.first_date,
    };
    let obligation = NewObligation {
        user_id,
        category_id: input.category_id,
        amount: input.amount,
        description: input.description,
        cadence: input.cadence,
        next_due_date,
    };

    let (obligation, expense) = store.create_obligation(&obligation, &first_expense).await?;

    info!(
        user_id = %user_id,
        obligation_id = %obligation.id,
        next_due_date = %obligation.next_due_date,
        "Obligation registered"
    );
    Ok((obligation, expense))
}

/// Lists the user's obligations by next-due date
pub async fn list_obligations<S>(store: &S, user_id: Uuid) -> LedgerResult<Vec<RecurringObligation>>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    Ok(store.list_obligations(user_id).await?)
}

/// Edits amount, description or next-due date of one of the user's obligations
pub async fn update_obligation<S>(
    store: &S,
    user_id: Uuid,
    obligation_id: Uuid,
    input: UpdateObligation,
) -> LedgerResult<RecurringObligation>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    input.validate()?;
    owned_obligation(store, user_id, obligation_id).await?;

    let obligation = store
        .update_obligation(obligation_id, &input)
        .await?
        .ok_or_else(|| LedgerError::not_found("Obligation", obligation_id))?;

    info!(user_id = %user_id, obligation_id = %obligation_id, "Obligation updated");
    Ok(obligation)
}

/// Cancels one of the user's obligations
///
/// Expenses it already produced are kept.
pub async fn cancel_obligation<S>(store: &S, user_id: Uuid, obligation_id: Uuid) -> LedgerResult<()>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    owned_obligation(store, user_id, obligation_id).await?;

    if !store.delete_obligation(obligation_id).await? {
        return Err(LedgerError::not_found("Obligation", obligation_id));
    }

    info!(user_id = %user_id, obligation_id = %obligation_id, "Obligation cancelled");
    Ok(())
}

async fn owned_obligation<S>(
    store: &S,
    user_id: Uuid,
    obligation_id: Uuid,
) -> LedgerResult<RecurringObligation>
where
    S: Store + ?Sized,
{
    let obligation = store
        .find_obligation(obligation_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("Obligation", obligation_id))?;

    authorize_obligation(user_id, &obligation)?;

    Ok(obligation)
}
