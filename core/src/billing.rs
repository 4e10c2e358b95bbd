//! Bill calculation. Turns per-bird quantities and rates into a bill.
//!
//! Pure: nothing here touches the store. The ledger service posts the
//! result once the whole bill has validated.

use crate::{
    config::LedgerConfig,
    error::{LedgerError, LedgerResult},
    types::{checked_sum, format_money, BirdAmounts, Money},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillItem {
    pub bird_type: String,
    pub quantity:  Money,
    pub unit:      String,
    pub rate:      Money,
    pub amount:    Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillComputation {
    pub items:         Vec<BillItem>,
    pub total:         Money,
    pub amount_paid:   Money,
    /// Added to the trader's debt. Negative when the trader overpaid.
    pub remaining_due: Money,
}

impl BillComputation {
    /// One line per bird, e.g. `Broiler: 50 kg @ 110.00`.
    pub fn details(&self) -> String {
        self.items
            .iter()
            .map(|item| {
                format!(
                    "{}: {} {} @ {}",
                    item.bird_type,
                    item.quantity.normalize(),
                    item.unit,
                    format_money(item.rate)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Price a bill.
///
/// Every bird with quantity > 0 needs a non-zero rate. Birds are priced in
/// configured order so the details text is stable.
pub fn compute_bill(
    config: &LedgerConfig,
    quantities: &BirdAmounts,
    rates: &BirdAmounts,
    amount_paid: Money,
) -> LedgerResult<BillComputation> {
    if amount_paid < Money::ZERO {
        return Err(LedgerError::Validation(format!(
            "Amount paid cannot be negative (got {})",
            format_money(amount_paid)
        )));
    }

    for (bird, qty) in quantities {
        if config.bird_type(bird).is_none() {
            return Err(LedgerError::Validation(format!("Unknown bird type '{bird}'")));
        }
        if *qty < Money::ZERO {
            return Err(LedgerError::Validation(format!(
                "Quantity for {bird} cannot be negative"
            )));
        }
    }

    let mut items = Vec::new();
    for bird in &config.bird_types {
        let quantity = match quantities.get(&bird.name) {
            Some(q) if *q > Money::ZERO => *q,
            _ => continue,
        };
        let rate = match rates.get(&bird.name) {
            Some(r) if !r.is_zero() => *r,
            _ => {
                return Err(LedgerError::Validation(format!(
                    "Rate for {} was not provided",
                    bird.name
                )))
            }
        };
        if rate < Money::ZERO {
            return Err(LedgerError::Validation(format!(
                "Rate for {} cannot be negative",
                bird.name
            )));
        }
        items.push(BillItem {
            bird_type: bird.name.clone(),
            quantity,
            unit: bird.unit.clone(),
            rate,
            amount: quantity
                .checked_mul(rate)
                .ok_or_else(LedgerError::amount_too_large)?,
        });
    }

    if items.is_empty() {
        return Err(LedgerError::Validation(
            "No quantities entered, bill not created".into(),
        ));
    }

    let total = checked_sum(items.iter().map(|i| i.amount))
        .ok_or_else(LedgerError::amount_too_large)?;
    let remaining_due = total
        .checked_sub(amount_paid)
        .ok_or_else(LedgerError::amount_too_large)?;
    Ok(BillComputation {
        items,
        total,
        amount_paid,
        remaining_due,
    })
}
