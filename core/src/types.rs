//! Shared primitive types used across the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Row id of a trader.
pub type TraderId = i64;

/// Row id of a ledger transaction.
pub type TransactionId = i64;

/// A signed money amount. Stored as canonical decimal text.
pub type Money = Decimal;

/// Bird type name → amount (a rate sheet, or bill quantities).
pub type BirdAmounts = BTreeMap<String, Decimal>;

/// The two kinds of ledger entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Purchase,
    Payment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "Purchase",
            Self::Payment  => "Payment",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Purchase" => Ok(Self::Purchase),
            "Payment"  => Ok(Self::Payment),
            other      => Err(format!("unknown transaction kind '{other}'")),
        }
    }
}

/// Render an amount with exactly two decimal places.
pub fn format_money(amount: Money) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Sum of `amounts`, or `None` if it leaves the `Decimal` range.
pub fn checked_sum<I>(amounts: I) -> Option<Money>
where
    I: IntoIterator<Item = Money>,
{
    amounts
        .into_iter()
        .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
}
