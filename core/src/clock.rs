//! Ledger clock. Decides what "today" means for bills, payments and rates.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LedgerClock {
    /// The local calendar date of the machine.
    #[default]
    System,
    /// A pinned date (tests, back-dated data entry).
    Fixed { date: NaiveDate },
}

impl LedgerClock {
    pub fn fixed(date: NaiveDate) -> Self {
        Self::Fixed { date }
    }

    pub fn today(&self) -> NaiveDate {
        match self {
            Self::System        => Local::now().date_naive(),
            Self::Fixed { date } => *date,
        }
    }

    /// Move a fixed clock forward. No-op on the system clock.
    pub fn advance_days(&mut self, days: u64) {
        if let Self::Fixed { date } = self {
            *date = *date + chrono::Days::new(days);
        }
    }
}
