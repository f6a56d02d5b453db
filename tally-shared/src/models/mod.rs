/// Ledger models
///
/// This module contains the ledger entities, their input types and the
/// Postgres operations backing [`crate::store::PgStore`].
///
/// # Models
///
/// - `user`: ledger owners (provisioned by the auth service)
/// - `category`: global or private expense categories
/// - `expense`: realized ledger entries
/// - `budget`: per-category monthly spending limits
/// - `obligation`: recurring obligations that materialize into expenses
///
/// # Ownership
///
/// Every entity points at its owner through a `user_id` (or `owner_id` for
/// categories) foreign key. Nothing points back; lookups in the other
/// direction go through the store's indexed queries.
///
/// # Example
///
/// ```no_run
/// use tally_shared::models::budget::{Budget, SetBudget};
/// use tally_shared::db::pool::{create_pool, DatabaseConfig};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let budget = Budget::upsert(&pool, Uuid::new_v4(), &SetBudget {
///     category_id: Uuid::new_v4(),
///     limit_amount: Decimal::from(200),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use rust_decimal::Decimal;
use validator::ValidationError;

pub mod budget;
pub mod category;
pub mod expense;
pub mod obligation;
pub mod user;

/// Decimal places a stored amount keeps (`NUMERIC(12, 2)`)
pub const AMOUNT_SCALE: u32 = 2;

/// Smallest amount that no longer fits `NUMERIC(12, 2)`
pub const AMOUNT_CEILING: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Accepts money amounts in `(0, 10^10)` with at most two decimal places
pub(crate) fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(amount_error(
            "positive_amount",
            "Amount must be greater than zero",
        ));
    }

    if *value >= AMOUNT_CEILING {
        return Err(amount_error(
            "amount_range",
            "Amount must be less than 10000000000",
        ));
    }

    if value.normalize().scale() > AMOUNT_SCALE {
        return Err(amount_error(
            "amount_precision",
            "Amount must have at most 2 decimal places",
        ));
    }

    Ok(())
}

fn amount_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}
