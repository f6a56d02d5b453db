/// Obligation materializer
///
/// Turns due recurring obligations into realized expenses. One call to
/// [`Materializer::tick`] processes every obligation with
/// `next_due_date <= today`:
///
/// ```text
/// find_due_obligations(today)          ordered by (next_due_date, id)
///   └─> for each obligation
///         ├─> expense = amount, "<description> (Auto)", dated on next_due_date
///         ├─> next    = next_due_date + 1 month (clamped)
///         └─> store.materialize(obligation, expense, next)   one atomic unit
/// ```
///
/// # Guarantees
///
/// - **Idempotent**: the advanced due date is the only completion marker, so
///   running `tick` again with the same date writes nothing new
/// - **One period per tick**: an obligation N periods behind needs N ticks
/// - **Isolated failures**: an error on one obligation is logged and the
///   tick moves on; the obligation is retried on the next tick
/// - **Race-safe**: if a user edits or cancels an obligation after it was
///   selected, the store refuses the write and the obligation is skipped
///
/// Running two materializers against the same database at once is not
/// supported.

use std::sync::Arc;

use chrono::NaiveDate;
use tally_shared::models::expense::Expense;
use tally_shared::models::obligation::RecurringObligation;
use tally_shared::store::{Store, StoreError};
use uuid::Uuid;

/// Error for a single obligation
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    /// Store rejected the write
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Next due date falls outside the supported calendar
    #[error("Cannot advance obligation {0} past {1}")]
    DateOverflow(Uuid, NaiveDate),
}

/// Outcome of one tick
///
/// Informational only; nothing depends on it beyond logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Obligations found due
    pub due: usize,

    /// Obligations that produced an expense
    pub materialized: usize,

    /// Obligations changed concurrently and left for the next tick
    pub skipped: usize,

    /// Obligations that failed and will be retried next tick
    pub failed: usize,
}

/// Materializes due obligations
pub struct Materializer<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> Clone for Materializer<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Store + ?Sized> Materializer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Processes every obligation due on or before `today`
    ///
    /// # Errors
    ///
    /// Only fails if the due obligations cannot be listed. Per-obligation
    /// failures are counted in the report instead.
    pub async fn tick(&self, today: NaiveDate) -> Result<TickReport, StoreError> {
        let mut due = self.store.find_due_obligations(today).await?;
        due.sort_by(|a, b| {
            a.next_due_date
                .cmp(&b.next_due_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut report = TickReport {
            due: due.len(),
            ..Default::default()
        };

        for obligation in &due {
            match self.materialize_one(obligation).await {
                Ok(Some(expense)) => {
                    report.materialized += 1;
                    tracing::debug!(
                        obligation_id = %obligation.id,
                        expense_id = %expense.id,
                        expense_date = %expense.expense_date,
                        "Obligation materialized"
                    );
                }
                Ok(None) => {
                    report.skipped += 1;
                    tracing::info!(
                        obligation_id = %obligation.id,
                        "Obligation changed during tick, skipping"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        obligation_id = %obligation.id,
                        user_id = %obligation.user_id,
                        error = %e,
                        "Failed to materialize obligation"
                    );
                }
            }
        }

        if report.due > 0 {
            tracing::info!(
                today = %today,
                due = report.due,
                materialized = report.materialized,
                skipped = report.skipped,
                failed = report.failed,
                "Tick finished"
            );
        }

        Ok(report)
    }

    async fn materialize_one(
        &self,
        obligation: &RecurringObligation,
    ) -> Result<Option<Expense>, MaterializeError> {
        let next_due_date = obligation
            .following_due_date()
            .ok_or(MaterializeError::DateOverflow(obligation.id, obligation.next_due_date))?;

        let expense = obligation.occurrence_expense();

        Ok(self
            .store
            .materialize(obligation, &expense, next_due_date)
            .await?)
    }
}
