use crate::{
    error::LedgerResult,
    ledger::{BillRequest, DeletedTrader, Ledger, PostedBill, RateSheet, TraderLedger},
    print::{BillPrint, Statement},
    report::WeeklyReport,
    store::{PostedEntry, TraderRow},
    types::{BirdAmounts, Money, TraderId, TransactionId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every operation the ledger offers, as a transport-neutral request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum LedgerCommand {
    // ── Browsing ──────────────────────────────────
    ListLines,
    ListTraders,
    TradersByLine { line: String },
    TraderLedger { trader_id: TraderId },

    // ── Ledger writes ─────────────────────────────
    AddBill {
        trader_id: TraderId,
        #[serde(flatten)]
        bill:      BillRequest,
    },
    AddPayment { trader_id: TraderId, amount: Money },

    // ── Trader management ─────────────────────────
    AddTrader { name: String, line: String },
    UpdateTrader { trader_id: TraderId, name: String, line: String },
    DeleteTrader { trader_id: TraderId },

    // ── Rates ─────────────────────────────────────
    RateSheet,
    SetRates { rates: BTreeMap<String, BirdAmounts> },

    // ── Reports and prints ────────────────────────
    WeeklyReport,
    PrintBill { transaction_id: TransactionId },
    Statement { trader_id: TraderId },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CommandOutput {
    Lines(Vec<String>),
    Traders(Vec<TraderRow>),
    TraderLedger(TraderLedger),
    BillPosted(PostedBill),
    PaymentRecorded(PostedEntry),
    Trader(TraderRow),
    TraderDeleted(DeletedTrader),
    RateSheet(RateSheet),
    RatesSaved { saved: usize },
    WeeklyReport(WeeklyReport),
    BillPrint { document: BillPrint, text: String },
    Statement { document: Statement, text: String },
}

impl LedgerCommand {
    /// Stable name of the command, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListLines          => "list_lines",
            Self::ListTraders        => "list_traders",
            Self::TradersByLine { .. } => "traders_by_line",
            Self::TraderLedger { .. }  => "trader_ledger",
            Self::AddBill { .. }       => "add_bill",
            Self::AddPayment { .. }    => "add_payment",
            Self::AddTrader { .. }     => "add_trader",
            Self::UpdateTrader { .. }  => "update_trader",
            Self::DeleteTrader { .. }  => "delete_trader",
            Self::RateSheet          => "rate_sheet",
            Self::SetRates { .. }      => "set_rates",
            Self::WeeklyReport       => "weekly_report",
            Self::PrintBill { .. }     => "print_bill",
            Self::Statement { .. }     => "statement",
        }
    }

    pub fn execute(self, ledger: &mut Ledger) -> LedgerResult<CommandOutput> {
        log::debug!("command {}", self.name());
        let out = match self {
            Self::ListLines => CommandOutput::Lines(ledger.lines().to_vec()),
            Self::ListTraders => CommandOutput::Traders(ledger.all_traders()?),
            Self::TradersByLine { line } => CommandOutput::Traders(ledger.traders_by_line(&line)?),
            Self::TraderLedger { trader_id } => {
                CommandOutput::TraderLedger(ledger.trader_ledger(trader_id)?)
            }
            Self::AddBill { trader_id, bill } => {
                CommandOutput::BillPosted(ledger.add_bill(trader_id, &bill)?)
            }
            Self::AddPayment { trader_id, amount } => {
                CommandOutput::PaymentRecorded(ledger.add_payment(trader_id, amount)?)
            }
            Self::AddTrader { name, line } => {
                CommandOutput::Trader(ledger.register_trader(&name, &line)?)
            }
            Self::UpdateTrader { trader_id, name, line } => {
                CommandOutput::Trader(ledger.update_trader(trader_id, &name, &line)?)
            }
            Self::DeleteTrader { trader_id } => {
                CommandOutput::TraderDeleted(ledger.delete_trader(trader_id)?)
            }
            Self::RateSheet => CommandOutput::RateSheet(ledger.today_rate_sheet()?),
            Self::SetRates { rates } => CommandOutput::RatesSaved {
                saved: ledger.set_today_rates(&rates)?,
            },
            Self::WeeklyReport => CommandOutput::WeeklyReport(ledger.weekly_report()?),
            Self::PrintBill { transaction_id } => {
                let document = ledger.print_bill(transaction_id)?;
                let text = document.to_string();
                CommandOutput::BillPrint { document, text }
            }
            Self::Statement { trader_id } => {
                let document = ledger.statement(trader_id)?;
                let text = document.to_string();
                CommandOutput::Statement { document, text }
            }
        };
        Ok(out)
    }
}
