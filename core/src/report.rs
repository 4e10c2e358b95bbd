//! Weekly business report: recent revenue, top debtors, sales per line.

use crate::{
    config::LedgerConfig,
    error::{LedgerError, LedgerResult},
    store::{LedgerStore, TraderRow},
    types::{checked_sum, Money},
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueSummary {
    /// First day of the window, inclusive.
    pub since:            NaiveDate,
    /// Last day of the window, inclusive. Later-dated rows are left out.
    pub until:            NaiveDate,
    pub total_revenue:    Money,
    pub num_transactions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineSales {
    pub line:        String,
    pub total_sales: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyReport {
    pub summary:          RevenueSummary,
    pub top_debtors:      Vec<TraderRow>,
    /// All-time purchase totals per line, best first.
    pub line_performance: Vec<LineSales>,
}

impl WeeklyReport {
    pub fn build(store: &LedgerStore, config: &LedgerConfig, today: NaiveDate) -> LedgerResult<Self> {
        let since = today
            .checked_sub_days(Days::new(config.report_window_days))
            .unwrap_or(NaiveDate::MIN);

        let totals = store.purchase_totals_between(since, today)?;
        let summary = RevenueSummary {
            since,
            until: today,
            total_revenue: checked_sum(totals.iter().copied())
                .ok_or_else(LedgerError::amount_too_large)?,
            num_transactions: totals.len(),
        };

        let top_debtors = top_debtors(store.all_traders()?, config.top_debtor_limit);

        let mut per_line: HashMap<String, Money> = HashMap::new();
        for row in store.purchase_totals_by_line()? {
            let total = per_line.entry(row.line).or_default();
            *total = total
                .checked_add(row.total_amount)
                .ok_or_else(LedgerError::amount_too_large)?;
        }
        let mut line_performance: Vec<LineSales> = per_line
            .into_iter()
            .map(|(line, total_sales)| LineSales { line, total_sales })
            .collect();
        line_performance.sort_by(|a, b| {
            b.total_sales.cmp(&a.total_sales).then_with(|| a.line.cmp(&b.line))
        });

        log::debug!(
            "report {since}..={today}: revenue={} over {} purchases",
            summary.total_revenue,
            summary.num_transactions
        );

        Ok(Self { summary, top_debtors, line_performance })
    }
}

/// Traders who owe money, largest debt first, at most `limit`.
fn top_debtors(traders: Vec<TraderRow>, limit: usize) -> Vec<TraderRow> {
    let mut owing: Vec<TraderRow> = traders
        .into_iter()
        .filter(|t| t.total_debt > Money::ZERO)
        .collect();
    owing.sort_by(|a, b| {
        b.total_debt.cmp(&a.total_debt).then_with(|| a.id.cmp(&b.id))
    });
    owing.truncate(limit);
    owing
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn trader(id: i64, debt: Money) -> TraderRow {
        TraderRow { id, name: format!("T{id}"), line: "Pati".into(), total_debt: debt }
    }

    #[test]
    fn top_debtors_skips_settled_and_caps() {
        let traders = vec![
            trader(1, dec!(10)),
            trader(2, dec!(0)),
            trader(3, dec!(-50)),
            trader(4, dec!(300.5)),
            trader(5, dec!(300.5)),
            trader(6, dec!(20)),
        ];
        let ids: Vec<i64> = top_debtors(traders, 3).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 5, 6]);
    }
}
