//! # Tally Worker Library
//!
//! Background side of Tally: the obligation materializer and the timer that
//! drives it.
//!
//! ## Modules
//!
//! - `materializer`: turns due obligations into expenses, one period per tick
//! - `scheduler`: repeating tick loop with graceful shutdown
//! - `clock`: injectable source of "today"
//! - `config`: environment configuration for the worker binary
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use tally_shared::store::MemoryStore;
//! use tally_worker::materializer::Materializer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let materializer = Materializer::new(Arc::new(MemoryStore::new()));
//! let report = materializer.tick(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()).await?;
//! println!("Materialized {} obligations", report.materialized);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod materializer;
pub mod scheduler;
