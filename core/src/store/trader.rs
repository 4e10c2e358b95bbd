use super::{trader_from_row, LedgerStore, TraderRow};
use crate::{
    error::{LedgerError, LedgerResult},
    types::{Money, TraderId},
};
use rusqlite::{params, OptionalExtension};

const TRADER_COLUMNS: &str = "id, name, line, total_debt";

impl LedgerStore {
    // ── Trader ────────────────────────────────────────────────────

    pub fn insert_trader(&self, name: &str, line: &str) -> LedgerResult<TraderRow> {
        let opening = Money::ZERO;
        self.conn.execute(
            "INSERT INTO trader (name, line, total_debt) VALUES (?1, ?2, ?3)",
            params![name, line, opening.to_string()],
        )?;
        Ok(TraderRow {
            id:         self.conn.last_insert_rowid(),
            name:       name.to_string(),
            line:       line.to_string(),
            total_debt: opening,
        })
    }

    pub fn trader(&self, trader_id: TraderId) -> LedgerResult<Option<TraderRow>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {TRADER_COLUMNS} FROM trader WHERE id = ?1"),
                params![trader_id],
                trader_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Like `trader`, but absence is an error.
    pub fn require_trader(&self, trader_id: TraderId) -> LedgerResult<TraderRow> {
        self.trader(trader_id)?
            .ok_or_else(|| LedgerError::trader_not_found(trader_id))
    }

    pub fn traders_by_line(&self, line: &str) -> LedgerResult<Vec<TraderRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRADER_COLUMNS} FROM trader WHERE line = ?1 ORDER BY name, id"
        ))?;
        let rows = stmt.query_map(params![line], trader_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn all_traders(&self) -> LedgerResult<Vec<TraderRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRADER_COLUMNS} FROM trader ORDER BY line, name, id"
        ))?;
        let rows = stmt.query_map([], trader_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Rename or move a trader. The debt column is never touched here.
    /// Returns false when no such trader exists.
    pub fn update_trader(&self, trader_id: TraderId, name: &str, line: &str) -> LedgerResult<bool> {
        let changed = self.conn.execute(
            "UPDATE trader SET name = ?1, line = ?2 WHERE id = ?3",
            params![name, line, trader_id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a trader and every ledger row it owns, atomically.
    /// Returns the number of ledger rows removed, or None if the trader was absent.
    pub fn delete_trader(&mut self, trader_id: TraderId) -> LedgerResult<Option<usize>> {
        let tx = self.conn.transaction()?;
        let exists = tx
            .query_row("SELECT 1 FROM trader WHERE id = ?1", params![trader_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Ok(None);
        }
        // Explicit delete so the count is known; the FK cascade covers the rest.
        let removed = tx.execute(
            "DELETE FROM ledger_transaction WHERE trader_id = ?1",
            params![trader_id],
        )?;
        tx.execute("DELETE FROM trader WHERE id = ?1", params![trader_id])?;
        tx.commit()?;
        Ok(Some(removed))
    }

    pub fn trader_count(&self) -> LedgerResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM trader", [], |row| row.get(0))?;
        Ok(n)
    }
}
