/// Budget aggregator
///
/// Computes spent-vs-limit for every budget a user has, over the calendar
/// month containing `as_of`. Read-only: one budget query, one ranged expense
/// query, one category lookup per distinct budgeted category.
///
/// A read that races a materializer tick may see the ledger either before or
/// after that tick's writes.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_user;
use crate::calendar::month_window;
use crate::error::{LedgerError, LedgerResult};
use crate::models::expense::Expense;
use crate::store::Store;

/// Spend against one budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Budget the status belongs to
    pub budget_id: Uuid,

    /// Budgeted category
    pub category_id: Uuid,

    /// Name of the budgeted category
    pub category_name: String,

    /// Monthly limit
    pub limit: Decimal,

    /// Sum of in-window expenses in the category
    pub spent: Decimal,

    /// `spent / limit * 100`, or 0 when the limit is not positive
    pub percentage: f64,
}

/// Computes `spent / limit * 100`
///
/// Never NaN or infinite: a zero or negative limit yields 0. A ratio too
/// large for `Decimal` is computed in floating point, saturating at
/// `f64::MAX`.
pub fn percentage(spent: Decimal, limit: Decimal) -> f64 {
    if limit <= Decimal::ZERO {
        return 0.0;
    }

    if let Some(pct) = spent
        .checked_div(limit)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|pct| pct.to_f64())
    {
        return pct;
    }

    let spent = spent.to_f64().unwrap_or(f64::MAX);
    let limit = limit.to_f64().unwrap_or(f64::MIN_POSITIVE);
    let pct = spent / limit * 100.0;
    if pct.is_finite() {
        pct
    } else {
        f64::MAX
    }
}

/// Sums the expenses filed under `category_id`
///
/// Uncategorized expenses never count. A sum beyond `Decimal`'s range is an
/// internal error; validation keeps stored amounts far below it.
pub fn spent_in_category(expenses: &[Expense], category_id: Uuid) -> LedgerResult<Decimal> {
    expenses
        .iter()
        .filter(|e| e.category_id == Some(category_id))
        .try_fold(Decimal::ZERO, |total, e| {
            total.checked_add(e.amount).ok_or_else(|| {
                LedgerError::Internal(format!(
                    "Spend in category {} overflows the money range",
                    category_id
                ))
            })
        })
}

/// Budget status for every budget of the user, in the budget store's order
pub async fn budget_status<S>(
    store: &S,
    user_id: Uuid,
    as_of: NaiveDate,
) -> LedgerResult<Vec<BudgetStatus>>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;

    let window = month_window(as_of)
        .ok_or_else(|| LedgerError::invalid("as_of", "Date is out of range"))?;

    let budgets = store.list_budgets(user_id).await?;
    if budgets.is_empty() {
        return Ok(Vec::new());
    }

    let expenses: Vec<Expense> = store
        .list_expenses(user_id, Some(window))
        .await?
        .into_iter()
        .filter(|e| window.contains(e.expense_date))
        .collect();

    let mut names: HashMap<Uuid, String> = HashMap::new();
    let mut statuses = Vec::with_capacity(budgets.len());

    for budget in budgets {
        let category_name = match names.get(&budget.category_id) {
            Some(name) => name.clone(),
            None => {
                let name = store
                    .find_category(budget.category_id)
                    .await?
                    .map(|c| c.name)
                    .ok_or_else(|| LedgerError::not_found("Category", budget.category_id))?;
                names.insert(budget.category_id, name.clone());
                name
            }
        };

        let spent = spent_in_category(&expenses, budget.category_id)?;

        statuses.push(BudgetStatus {
            budget_id: budget.id,
            category_id: budget.category_id,
            category_name,
            limit: budget.limit_amount,
            spent,
            percentage: percentage(spent, budget.limit_amount),
        });
    }

    Ok(statuses)
}
