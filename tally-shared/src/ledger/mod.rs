/// Ledger services
///
/// The operations behind every user request. Each one resolves the acting
/// user, validates its input, runs the ownership guard and only then talks
/// to the store:
///
/// ```text
/// resolve user ──> validate input ──> load referenced entities ──> guard ──> write
///    NotFound          Validation            NotFound              AccessDenied
/// ```
///
/// All functions are generic over `S: Store + ?Sized` so they accept both a
/// concrete store and `&dyn Store`.

pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod obligations;
pub mod status;

use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::category::Category;
use crate::models::user::User;
use crate::store::Store;

pub use budgets::{list_budgets, remove_budget, set_budget};
pub use categories::{create_category, list_categories};
pub use expenses::{create_expense, delete_expense, get_expense, list_expenses, update_expense};
pub use obligations::{cancel_obligation, list_obligations, register_obligation, update_obligation};
pub use status::{budget_status, BudgetStatus};

/// Resolves the acting user
pub(crate) async fn require_user<S>(store: &S, user_id: Uuid) -> LedgerResult<User>
where
    S: Store + ?Sized,
{
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("User", user_id))
}

/// Loads a category the user is allowed to use
pub(crate) async fn usable_category<S>(
    store: &S,
    user_id: Uuid,
    category_id: Uuid,
) -> LedgerResult<Category>
where
    S: Store + ?Sized,
{
    let category = store
        .find_category(category_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("Category", category_id))?;

    crate::auth::authorization::authorize_category(user_id, &category)?;

    Ok(category)
}
