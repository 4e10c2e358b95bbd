//! Printable documents: a single bill and a full account statement.
//!
//! Both are plain data with a `Display` impl producing fixed-width text.

use crate::{
    error::{LedgerError, LedgerResult},
    store::{TraderRow, TransactionRow},
    types::{checked_sum, format_money, Money, TransactionKind},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const PRINT_DATE: &str = "%d-%b-%Y";
const RULE: &str = "----------------------------------------------------------------";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillPrint {
    pub trader: TraderRow,
    pub bill:   TransactionRow,
}

impl BillPrint {
    pub fn balance_due(&self) -> Money {
        self.bill.debt_delta()
    }
}

impl fmt::Display for BillPrint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BILL #{}", self.bill.id)?;
        writeln!(f, "Date:    {}", self.bill.date.format(PRINT_DATE))?;
        writeln!(f, "Trader:  {} ({})", self.trader.name, self.trader.line)?;
        if let Some(driver) = &self.bill.driver_name {
            writeln!(f, "Driver:  {driver}")?;
        }
        writeln!(f, "{RULE}")?;
        for line in self.bill.details.as_deref().unwrap_or_default().lines() {
            writeln!(f, "  {line}")?;
        }
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total:        {:>14}", format_money(self.bill.total_amount))?;
        writeln!(f, "Paid:         {:>14}", format_money(self.bill.amount_paid))?;
        write!(f, "Balance due:  {:>14}", format_money(self.balance_due()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementRow {
    pub transaction: TransactionRow,
    /// Debt after this row was applied.
    pub balance:     Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statement {
    pub trader:          TraderRow,
    pub printed_on:      NaiveDate,
    /// Debt carried in before the first listed row.
    pub opening_balance: Money,
    pub rows:            Vec<StatementRow>,
    pub total_billed:    Money,
    pub total_paid:      Money,
    pub closing_balance: Money,
}

impl Statement {
    /// `transactions` must be oldest first. The opening balance is whatever
    /// makes the running total land on the trader's stored debt.
    pub fn new(
        trader: TraderRow,
        transactions: Vec<TransactionRow>,
        printed_on: NaiveDate,
    ) -> LedgerResult<Self> {
        let too_large = LedgerError::amount_too_large;

        let movement = transactions
            .iter()
            .map(|t| t.total_amount.checked_sub(t.amount_paid))
            .collect::<Option<Vec<Money>>>()
            .and_then(checked_sum)
            .ok_or_else(too_large)?;
        let opening_balance = trader.total_debt.checked_sub(movement).ok_or_else(too_large)?;

        let total_billed = checked_sum(
            transactions
                .iter()
                .filter(|t| t.kind == TransactionKind::Purchase)
                .map(|t| t.total_amount),
        )
        .ok_or_else(too_large)?;
        let total_paid =
            checked_sum(transactions.iter().map(|t| t.amount_paid)).ok_or_else(too_large)?;

        let mut balance = opening_balance;
        let mut rows = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            balance = balance
                .checked_add(transaction.debt_delta())
                .ok_or_else(too_large)?;
            rows.push(StatementRow { transaction, balance });
        }

        Ok(Self {
            closing_balance: trader.total_debt,
            trader,
            printed_on,
            opening_balance,
            rows,
            total_billed,
            total_paid,
        })
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ACCOUNT STATEMENT")?;
        writeln!(f, "Trader:  {} ({})", self.trader.name, self.trader.line)?;
        writeln!(f, "Printed: {}", self.printed_on.format(PRINT_DATE))?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "{:<11} {:<8} {:>12} {:>12} {:>14}",
            "Date", "Type", "Billed", "Paid", "Balance"
        )?;
        writeln!(f, "{:<11} {:<8} {:>12} {:>12} {:>14}", "", "Opening", "", "", format_money(self.opening_balance))?;
        for row in &self.rows {
            let t = &row.transaction;
            writeln!(
                f,
                "{:<11} {:<8} {:>12} {:>12} {:>14}",
                t.date.format(PRINT_DATE).to_string(),
                t.kind.as_str(),
                format_money(t.total_amount),
                format_money(t.amount_paid),
                format_money(row.balance),
            )?;
        }
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total billed: {:>14}", format_money(self.total_billed))?;
        writeln!(f, "Total paid:   {:>14}", format_money(self.total_paid))?;
        write!(f, "Amount owed:  {:>14}", format_money(self.closing_balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(id: i64, kind: TransactionKind, total: Money, paid: Money) -> TransactionRow {
        TransactionRow {
            id,
            trader_id: 1,
            kind,
            date: NaiveDate::from_ymd_opt(2025, 9, 20 + id as u32).unwrap(),
            details: None,
            driver_name: None,
            total_amount: total,
            amount_paid: paid,
        }
    }

    #[test]
    fn running_balance_ends_at_stored_debt() {
        let trader = TraderRow {
            id: 1,
            name: "Rajesh Kumar".into(),
            line: "Pati".into(),
            total_debt: dec!(3900.50),
        };
        let txs = vec![
            row(1, TransactionKind::Purchase, dec!(5500.50), dec!(100)),
            row(2, TransactionKind::Payment, dec!(0), dec!(2000)),
        ];
        let printed = NaiveDate::from_ymd_opt(2025, 9, 28).unwrap();
        let statement = Statement::new(trader, txs, printed).unwrap();

        assert_eq!(statement.opening_balance, dec!(500));
        let balances: Vec<Money> = statement.rows.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![dec!(5900.50), dec!(3900.50)]);
        assert_eq!(statement.total_billed, dec!(5500.50));
        assert_eq!(statement.total_paid, dec!(2100));

        let text = statement.to_string();
        assert!(text.contains("28-Sep-2025"));
        assert!(text.ends_with("3900.50"));
    }

    #[test]
    fn totals_past_decimal_range_are_an_error() {
        let trader = TraderRow {
            id: 1,
            name: "Big Buyer".into(),
            line: "Pati".into(),
            total_debt: Money::ZERO,
        };
        // Each bill is paid in full, so the debt never moves, but the
        // billed total cannot be represented.
        let txs = vec![
            row(1, TransactionKind::Purchase, Money::MAX, Money::MAX),
            row(2, TransactionKind::Purchase, Money::MAX, Money::MAX),
        ];
        let printed = NaiveDate::from_ymd_opt(2025, 9, 28).unwrap();
        let err = Statement::new(trader, txs, printed).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{err:?}");
    }
}
