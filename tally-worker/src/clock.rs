/// Clock abstraction
///
/// The materializer never reads the wall clock itself: the scheduler asks a
/// [`Clock`] for "today" and passes it into `tick`, so tests can pin or move
/// the date freely.

use chrono::{Days, NaiveDate, Utc};
use std::sync::RwLock;

/// Source of the current calendar day
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    today: RwLock<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: RwLock::new(today),
        }
    }

    /// Jumps to `date`
    pub fn set(&self, date: NaiveDate) {
        let mut today = self.today.write().unwrap_or_else(|e| e.into_inner());
        *today = date;
    }

    /// Moves forward by `days`, saturating at the end of the calendar
    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.write().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = today.checked_add_days(Days::new(days)) {
            *today = next;
        }
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.today.read().unwrap_or_else(|e| e.into_inner())
    }
}
