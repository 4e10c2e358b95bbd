//! Poultry Ledger: traders grouped by delivery line, daily bird rates,
//! and a purchase/payment ledger that nets into each trader's debt.
//!
//! Layering:
//!   - `store`  : the only module that runs SQL.
//!   - `billing`: pure bill arithmetic.
//!   - `ledger` : the service every caller goes through.
//!   - `command`: the same operations as serde-tagged requests.

pub mod billing;
pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod ledger;
pub mod print;
pub mod report;
pub mod store;
pub mod types;

pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
