//! A per-user transaction ledger and the dashboard highlights derived from it.
//!
//! - `ledger` appends and loads the records of one user in a `store::KeyValueStore`.
//! - `aggregate` turns loaded records into the display list and the three highlight cards.
//! - `format` renders amounts and dates for a locale.
//! - `dashboard` decides which of several overlapping refreshes gets shown.

pub mod aggregate;
pub mod args;
pub mod commands;
mod config;
pub mod dashboard;
mod error;
pub mod format;
pub mod ledger;
pub mod model;
mod session;
pub mod store;
mod utils;

pub use aggregate::{aggregate, Dashboard, HighlightData, HighlightProps, LastTransaction};
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use format::{Formatter, Locale};
pub use ledger::{Ledger, LedgerKey};
pub use session::Session;
