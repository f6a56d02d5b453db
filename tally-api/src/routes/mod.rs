/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `categories`: Global and private categories
/// - `expenses`: Expense CRUD
/// - `budgets`: Budget upsert/removal and monthly status
/// - `obligations`: Recurring obligation registration and edits
///
/// Handlers are thin: they pull the acting user from [`AuthContext`] and
/// delegate to `tally_shared::ledger`.
///
/// [`AuthContext`]: tally_shared::auth::middleware::AuthContext

pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod health;
pub mod obligations;
