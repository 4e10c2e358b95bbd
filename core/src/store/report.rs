use super::{money_col, LedgerStore};
use crate::{error::LedgerResult, types::Money};
use chrono::NaiveDate;
use rusqlite::params;

/// One purchase total tagged with the line of the trader who made it.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSalesRow {
    pub line:         String,
    pub total_amount: Money,
}

impl LedgerStore {
    // ── Report inputs ─────────────────────────────────────────────
    // Money is text in SQLite, so sums are taken in Rust by the caller.

    /// Totals of every purchase dated from `since` through `until`, inclusive.
    pub fn purchase_totals_between(
        &self,
        since: NaiveDate,
        until: NaiveDate,
    ) -> LedgerResult<Vec<Money>> {
        let mut stmt = self.conn.prepare(
            "SELECT total_amount FROM ledger_transaction
             WHERE kind = 'Purchase' AND date >= ?1 AND date <= ?2",
        )?;
        let rows = stmt.query_map(params![since, until], |row| money_col(row, 0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every purchase total joined to its trader's current line.
    pub fn purchase_totals_by_line(&self) -> LedgerResult<Vec<LineSalesRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.line, tx.total_amount
             FROM ledger_transaction tx
             JOIN trader t ON tx.trader_id = t.id
             WHERE tx.kind = 'Purchase'",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LineSalesRow {
                line:         row.get(0)?,
                total_amount: money_col(row, 1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
