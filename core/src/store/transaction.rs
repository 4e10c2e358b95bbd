use super::{
    money_col, transaction_from_row, LedgerStore, NewTransaction, TransactionRow,
    TRANSACTION_COLUMNS,
};
use crate::{
    error::{LedgerError, LedgerResult},
    types::{Money, TraderId, TransactionId},
};
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// Result of a committed ledger write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostedEntry {
    pub transaction: TransactionRow,
    pub debt_before: Money,
    pub debt_after:  Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOrder {
    /// date DESC, id DESC, the on-screen ledger.
    NewestFirst,
    /// date ASC, id ASC, for statements.
    OldestFirst,
}

impl LedgerStore {
    // ── Ledger transactions ───────────────────────────────────────

    /// Append a ledger row and move the trader's debt by the row's delta.
    ///
    /// Both writes happen inside one IMMEDIATE transaction: the write lock is
    /// taken before the debt is read, so two writers on the same file cannot
    /// both read the old balance. Any error, including a balance that would
    /// leave the `Decimal` range, rolls back both writes.
    pub fn post_entry(&mut self, entry: &NewTransaction) -> LedgerResult<PostedEntry> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let debt_before = tx
            .query_row(
                "SELECT total_debt FROM trader WHERE id = ?1",
                params![entry.trader_id],
                |row| money_col(row, 0),
            )
            .optional()?
            .ok_or_else(|| LedgerError::trader_not_found(entry.trader_id))?;
        let debt_after = entry
            .total_amount
            .checked_sub(entry.amount_paid)
            .and_then(|delta| debt_before.checked_add(delta))
            .ok_or_else(|| {
                log::warn!(
                    "trader={} entry rejected: debt {debt_before} cannot absorb it",
                    entry.trader_id
                );
                LedgerError::amount_too_large()
            })?;

        tx.execute(
            "UPDATE trader SET total_debt = ?1 WHERE id = ?2",
            params![debt_after.to_string(), entry.trader_id],
        )?;
        tx.execute(
            "INSERT INTO ledger_transaction
                (trader_id, kind, date, details, driver_name, total_amount, amount_paid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.trader_id,
                entry.kind.as_str(),
                entry.date,
                entry.details,
                entry.driver_name,
                entry.total_amount.to_string(),
                entry.amount_paid.to_string(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(PostedEntry {
            transaction: TransactionRow {
                id,
                trader_id:    entry.trader_id,
                kind:         entry.kind,
                date:         entry.date,
                details:      entry.details.clone(),
                driver_name:  entry.driver_name.clone(),
                total_amount: entry.total_amount,
                amount_paid:  entry.amount_paid,
            },
            debt_before,
            debt_after,
        })
    }

    pub fn transaction(&self, transaction_id: TransactionId) -> LedgerResult<Option<TransactionRow>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {TRANSACTION_COLUMNS} FROM ledger_transaction WHERE id = ?1"),
                params![transaction_id],
                transaction_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn transactions_for_trader(
        &self,
        trader_id: TraderId,
        order: LedgerOrder,
    ) -> LedgerResult<Vec<TransactionRow>> {
        let order_by = match order {
            LedgerOrder::NewestFirst => "date DESC, id DESC",
            LedgerOrder::OldestFirst => "date ASC, id ASC",
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM ledger_transaction
             WHERE trader_id = ?1 ORDER BY {order_by}"
        ))?;
        let rows = stmt.query_map(params![trader_id], transaction_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn transaction_count(&self) -> LedgerResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM ledger_transaction", [], |row| row.get(0))?;
        Ok(n)
    }
}
