use super::{money_col, LedgerStore, RateRow};
use crate::{error::LedgerResult, types::BirdAmounts};
use chrono::NaiveDate;
use rusqlite::params;

impl LedgerStore {
    // ── Daily rates ───────────────────────────────────────────────

    /// Rates recorded for exactly this date and line.
    /// A bird type with no row is simply absent from the map.
    pub fn rates_for(&self, date: NaiveDate, line: &str) -> LedgerResult<BirdAmounts> {
        let mut stmt = self.conn.prepare(
            "SELECT bird_type, rate FROM daily_rate WHERE date = ?1 AND line = ?2",
        )?;
        let rows = stmt.query_map(params![date, line], |row| {
            Ok((row.get::<_, String>(0)?, money_col(row, 1)?))
        })?;
        rows.collect::<Result<BirdAmounts, _>>().map_err(Into::into)
    }

    /// Every rate row for a date, all lines.
    pub fn rates_on(&self, date: NaiveDate) -> LedgerResult<Vec<RateRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, line, bird_type, rate FROM daily_rate
             WHERE date = ?1 ORDER BY line, bird_type",
        )?;
        let rows = stmt.query_map(params![date], |row| {
            Ok(RateRow {
                date:      row.get(0)?,
                line:      row.get(1)?,
                bird_type: row.get(2)?,
                rate:      money_col(row, 3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Insert or overwrite the given (date, line, bird) rates in one transaction.
    pub fn upsert_rates(&mut self, rates: &[RateRow]) -> LedgerResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO daily_rate (date, line, bird_type, rate) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(date, line, bird_type) DO UPDATE SET rate = excluded.rate",
            )?;
            for r in rates {
                stmt.execute(params![r.date, r.line, r.bird_type, r.rate.to_string()])?;
            }
        }
        tx.commit()?;
        Ok(rates.len())
    }

    pub fn rate_row_count(&self) -> LedgerResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM daily_rate", [], |row| row.get(0))?;
        Ok(n)
    }
}
