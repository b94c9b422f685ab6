//! Data models
//!
//! Shared between karvon-server and the web frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all event timestamps
//! are Unix millis, day-keyed fields are `YYYY-MM-DD` strings.

pub mod cashbook;
pub mod client;
pub mod day_status;
pub mod delivery;
pub mod driver;
pub mod expense;
pub mod ledger;
pub mod product;
pub mod report;

// Re-exports
pub use cashbook::*;
pub use client::*;
pub use day_status::*;
pub use delivery::*;
pub use driver::*;
pub use expense::*;
pub use ledger::*;
pub use product::*;
pub use report::*;
