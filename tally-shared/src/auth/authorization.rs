/// Ownership guard
///
/// Pure checks run before every mutation made on behalf of a user. They take
/// already-loaded entities and never touch the store, so "does it exist" is
/// answered by the caller (NotFound) before "may you touch it" (AccessDenied).
///
/// # Rules
///
/// - Category: usable if global (no owner) or owned by the user
/// - Expense, budget, obligation: only the owning user
///
/// The materializer acts on behalf of the system and does not go through
/// the guard.
///
/// # Example
///
/// ```
/// use tally_shared::auth::authorization::authorize_category;
/// use tally_shared::models::category::Category;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let groceries = Category::new("Groceries", None);
/// assert!(authorize_category(user_id, &groceries).is_ok());
///
/// let someone_elses = Category::new("Hobby", Some(Uuid::new_v4()));
/// assert!(authorize_category(user_id, &someone_elses).is_err());
/// ```

use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::budget::Budget;
use crate::models::category::Category;
use crate::models::expense::Expense;
use crate::models::obligation::RecurringObligation;

/// Checks the user may use the category
pub fn authorize_category(user_id: Uuid, category: &Category) -> Result<(), LedgerError> {
    if !category.is_usable_by(user_id) {
        return Err(LedgerError::AccessDenied(format!(
            "category {} belongs to another user",
            category.id
        )));
    }

    Ok(())
}

/// Checks the user owns the expense
pub fn authorize_expense(user_id: Uuid, expense: &Expense) -> Result<(), LedgerError> {
    require_owner(user_id, expense.user_id, "expense", expense.id)
}

/// Checks the user owns the budget
pub fn authorize_budget(user_id: Uuid, budget: &Budget) -> Result<(), LedgerError> {
    require_owner(user_id, budget.user_id, "budget", budget.id)
}

/// Checks the user owns the obligation
pub fn authorize_obligation(
    user_id: Uuid,
    obligation: &RecurringObligation,
) -> Result<(), LedgerError> {
    require_owner(user_id, obligation.user_id, "obligation", obligation.id)
}

fn require_owner(
    user_id: Uuid,
    owner_id: Uuid,
    entity: &str,
    entity_id: Uuid,
) -> Result<(), LedgerError> {
    if user_id != owner_id {
        return Err(LedgerError::AccessDenied(format!(
            "{} {} belongs to another user",
            entity, entity_id
        )));
    }

    Ok(())
}
