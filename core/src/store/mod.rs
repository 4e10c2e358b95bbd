//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Services call store methods, they never execute SQL directly.
//! Every write that touches a trader's debt runs in one transaction.

mod rate;
mod report;
mod trader;
mod transaction;

pub use report::LineSalesRow;
pub use transaction::{LedgerOrder, PostedEntry};

use crate::{
    error::LedgerResult,
    types::{Money, TraderId, TransactionId, TransactionKind},
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    /// Open (or create) the ledger database at `path`.
    pub fn open(path: &str) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;
        // In-memory databases answer "memory" here rather than failing.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply the schema. Safe to run on an existing database.
    pub fn migrate(&self) -> LedgerResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_ledger.sql"))?;
        Ok(())
    }

    /// Load the sample traders, rates and ledger rows the business started with.
    pub fn seed_demo(&mut self) -> LedgerResult<()> {
        let tx = self.conn.transaction()?;

        let traders: [(TraderId, &str, &str, &str); 5] = [
            (1, "Rajesh Kumar", "Pati", "5400.50"),
            (2, "Suresh Patel", "Pati", "0.00"),
            (3, "Amit Singh", "Anjad", "1230.00"),
            (4, "Deepak Jain", "Dahi", "7800.00"),
            (5, "Local Customer 1", "Local", "250.00"),
        ];
        for (id, name, line, debt) in traders {
            tx.execute(
                "INSERT INTO trader (id, name, line, total_debt) VALUES (?1, ?2, ?3, ?4)",
                params![id, name, line, debt],
            )?;
        }

        let ledger: [(TransactionId, TraderId, &str, &str, &str, &str, &str); 3] = [
            (1, 1, "Purchase", "2025-09-27", "Broiler: 50.0 kg @ 110.00", "5500.50", "100.00"),
            (2, 3, "Purchase", "2025-09-26", "Minar: 15 units @ 82.00", "1230.00", "0.00"),
            (3, 1, "Payment", "2025-09-28", "Standalone Payment", "0", "2000.00"),
        ];
        for (id, trader_id, kind, date, details, total, paid) in ledger {
            tx.execute(
                "INSERT INTO ledger_transaction
                    (id, trader_id, kind, date, details, total_amount, amount_paid)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, trader_id, kind, date, details, total, paid],
            )?;
        }

        let rates = [
            ("2025-09-28", "Pati", "Minar", "85.00"),
            ("2025-09-28", "Pati", "Broiler", "112.50"),
            ("2025-09-28", "Pati", "Parent", "105.00"),
            ("2025-09-28", "Anjad", "Minar", "86.00"),
            ("2025-09-28", "Anjad", "Broiler", "114.00"),
            ("2025-09-27", "Pati", "Broiler", "110.00"),
        ];
        for (date, line, bird, rate) in rates {
            tx.execute(
                "INSERT INTO daily_rate (date, line, bird_type, rate) VALUES (?1, ?2, ?3, ?4)",
                params![date, line, bird, rate],
            )?;
        }

        tx.commit()?;
        log::info!(
            "Demo data loaded: {} traders, {} transactions, {} rates",
            traders.len(),
            ledger.len(),
            rates.len()
        );
        Ok(())
    }
}

// ── Row types ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraderRow {
    pub id:         TraderId,
    pub name:       String,
    pub line:       String,
    pub total_debt: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateRow {
    pub date:      NaiveDate,
    pub line:      String,
    pub bird_type: String,
    pub rate:      Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRow {
    pub id:           TransactionId,
    pub trader_id:    TraderId,
    pub kind:         TransactionKind,
    pub date:         NaiveDate,
    pub details:      Option<String>,
    pub driver_name:  Option<String>,
    pub total_amount: Money,
    pub amount_paid:  Money,
}

impl TransactionRow {
    /// How much this entry moved the trader's debt.
    pub fn debt_delta(&self) -> Money {
        self.total_amount - self.amount_paid
    }
}

/// A ledger row about to be written.
/// Payments carry a zero `total_amount`, so the debt delta of every
/// entry is `total_amount - amount_paid`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub trader_id:    TraderId,
    pub kind:         TransactionKind,
    pub date:         NaiveDate,
    pub details:      Option<String>,
    pub driver_name:  Option<String>,
    pub total_amount: Money,
    pub amount_paid:  Money,
}

impl NewTransaction {
    pub fn debt_delta(&self) -> Money {
        self.total_amount - self.amount_paid
    }
}

// ── Column helpers ─────────────────────────────────────────────

pub(crate) fn money_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Money> {
    let raw: String = row.get(idx)?;
    Money::from_str(raw.trim()).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn kind_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<TransactionKind> {
    let raw: String = row.get(idx)?;
    TransactionKind::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, trader_id, kind, date, details, driver_name, total_amount, amount_paid";

pub(crate) fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok(TransactionRow {
        id:           row.get(0)?,
        trader_id:    row.get(1)?,
        kind:         kind_col(row, 2)?,
        date:         row.get(3)?,
        details:      row.get(4)?,
        driver_name:  row.get(5)?,
        total_amount: money_col(row, 6)?,
        amount_paid:  money_col(row, 7)?,
    })
}

pub(crate) fn trader_from_row(row: &Row<'_>) -> rusqlite::Result<TraderRow> {
    Ok(TraderRow {
        id:         row.get(0)?,
        name:       row.get(1)?,
        line:       row.get(2)?,
        total_debt: money_col(row, 3)?,
    })
}
