//! The ledger service: every boundary operation of the application.
//!
//! RULES:
//!   - The service owns its store; nothing here is global.
//!   - Input is validated before the store is asked to write.
//!   - A debt only moves through `LedgerStore::post_entry`, which writes the
//!     ledger row and the new balance in one transaction.

use crate::{
    billing::{compute_bill, BillComputation},
    clock::LedgerClock,
    config::LedgerConfig,
    error::{LedgerError, LedgerResult},
    print::{BillPrint, Statement},
    report::WeeklyReport,
    store::{
        LedgerOrder, LedgerStore, NewTransaction, PostedEntry, RateRow, TraderRow,
        TransactionRow,
    },
    types::{format_money, BirdAmounts, Money, TraderId, TransactionId, TransactionKind},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PAYMENT_DETAILS: &str = "Standalone Payment";

/// A bill as entered at the counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BillRequest {
    #[serde(default)]
    pub quantities:  BirdAmounts,
    #[serde(default)]
    pub rates:       BirdAmounts,
    #[serde(default)]
    pub driver:      Option<String>,
    #[serde(default)]
    pub amount_paid: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostedBill {
    pub bill:  BillComputation,
    pub entry: PostedEntry,
}

/// A trader's page: history newest first plus what today's bill would use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraderLedger {
    pub trader:       TraderRow,
    pub transactions: Vec<TransactionRow>,
    pub today:        NaiveDate,
    pub today_rates:  BirdAmounts,
    pub drivers:      Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineRates {
    pub line:  String,
    pub rates: BirdAmounts,
}

/// All lines' rates for one date. Every configured line is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateSheet {
    pub date:       NaiveDate,
    pub bird_types: Vec<String>,
    pub lines:      Vec<LineRates>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeletedTrader {
    pub trader:               TraderRow,
    pub transactions_removed: usize,
}

pub struct Ledger {
    store:  LedgerStore,
    config: LedgerConfig,
    clock:  LedgerClock,
}

impl Ledger {
    pub fn new(store: LedgerStore, config: LedgerConfig, clock: LedgerClock) -> Self {
        Self { store, config, clock }
    }

    /// Fresh in-memory ledger with the test config and a pinned date.
    pub fn in_memory_test(today: NaiveDate) -> LedgerResult<Self> {
        let store = LedgerStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(store, LedgerConfig::default_test(), LedgerClock::fixed(today)))
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LedgerStore {
        &mut self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn clock_mut(&mut self) -> &mut LedgerClock {
        &mut self.clock
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ── Lines and traders ─────────────────────────────────────────

    pub fn lines(&self) -> &[String] {
        &self.config.lines
    }

    pub fn traders_by_line(&self, line: &str) -> LedgerResult<Vec<TraderRow>> {
        self.require_line(line)?;
        self.store.traders_by_line(line)
    }

    pub fn all_traders(&self) -> LedgerResult<Vec<TraderRow>> {
        self.store.all_traders()
    }

    pub fn register_trader(&mut self, name: &str, line: &str) -> LedgerResult<TraderRow> {
        let name = self.validate_trader_fields(name, line)?;
        let trader = self.store.insert_trader(&name, line)?;
        log::info!("trader={} registered: '{}' on {}", trader.id, trader.name, trader.line);
        Ok(trader)
    }

    pub fn update_trader(
        &mut self,
        trader_id: TraderId,
        name: &str,
        line: &str,
    ) -> LedgerResult<TraderRow> {
        let name = self.validate_trader_fields(name, line)?;
        if !self.store.update_trader(trader_id, &name, line)? {
            return Err(LedgerError::trader_not_found(trader_id));
        }
        log::info!("trader={trader_id} updated: '{name}' on {line}");
        self.store.require_trader(trader_id)
    }

    pub fn delete_trader(&mut self, trader_id: TraderId) -> LedgerResult<DeletedTrader> {
        let trader = self.store.require_trader(trader_id)?;
        let removed = self
            .store
            .delete_trader(trader_id)?
            .ok_or_else(|| LedgerError::trader_not_found(trader_id))?;
        log::info!(
            "trader={trader_id} deleted: '{}' and {removed} transactions",
            trader.name
        );
        Ok(DeletedTrader { trader, transactions_removed: removed })
    }

    pub fn trader_ledger(&self, trader_id: TraderId) -> LedgerResult<TraderLedger> {
        let trader = self.store.require_trader(trader_id)?;
        let today = self.today();
        let today_rates = self.store.rates_for(today, &trader.line)?;
        let transactions = self
            .store
            .transactions_for_trader(trader_id, LedgerOrder::NewestFirst)?;
        Ok(TraderLedger {
            trader,
            transactions,
            today,
            today_rates,
            drivers: self.config.drivers.clone(),
        })
    }

    // ── Bills and payments ────────────────────────────────────────

    pub fn add_bill(&mut self, trader_id: TraderId, request: &BillRequest) -> LedgerResult<PostedBill> {
        self.store.require_trader(trader_id)?;

        let bill = compute_bill(&self.config, &request.quantities, &request.rates, request.amount_paid)
            .inspect_err(|e| log::warn!("trader={trader_id} bill rejected: {e}"))?;

        let driver_name = request
            .driver
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);

        let entry = self.store.post_entry(&NewTransaction {
            trader_id,
            kind:         TransactionKind::Purchase,
            date:         self.today(),
            details:      Some(bill.details()),
            driver_name,
            total_amount: bill.total,
            amount_paid:  bill.amount_paid,
        })?;

        log::info!(
            "trader={trader_id} bill #{} posted: total={} paid={} debt {} -> {}",
            entry.transaction.id,
            format_money(bill.total),
            format_money(bill.amount_paid),
            format_money(entry.debt_before),
            format_money(entry.debt_after),
        );
        Ok(PostedBill { bill, entry })
    }

    pub fn add_payment(&mut self, trader_id: TraderId, amount: Money) -> LedgerResult<PostedEntry> {
        if amount <= Money::ZERO {
            log::warn!("trader={trader_id} payment rejected: amount {amount}");
            return Err(LedgerError::Validation(
                "Payment amount must be greater than zero".into(),
            ));
        }

        let entry = self.store.post_entry(&NewTransaction {
            trader_id,
            kind:         TransactionKind::Payment,
            date:         self.today(),
            details:      Some(PAYMENT_DETAILS.to_string()),
            driver_name:  None,
            total_amount: Money::ZERO,
            amount_paid:  amount,
        })?;

        log::info!(
            "trader={trader_id} payment #{} recorded: {} debt {} -> {}",
            entry.transaction.id,
            format_money(amount),
            format_money(entry.debt_before),
            format_money(entry.debt_after),
        );
        Ok(entry)
    }

    // ── Rates ─────────────────────────────────────────────────────

    /// Rates for one exact date and line. Unset birds are absent, not zero.
    pub fn rates_for(&self, date: NaiveDate, line: &str) -> LedgerResult<BirdAmounts> {
        self.store.rates_for(date, line)
    }

    pub fn rate_sheet(&self, date: NaiveDate) -> LedgerResult<RateSheet> {
        let mut by_line: BTreeMap<String, BirdAmounts> = BTreeMap::new();
        for row in self.store.rates_on(date)? {
            by_line.entry(row.line).or_default().insert(row.bird_type, row.rate);
        }
        let lines = self
            .config
            .lines
            .iter()
            .map(|line| LineRates {
                line:  line.clone(),
                rates: by_line.remove(line).unwrap_or_default(),
            })
            .collect();
        Ok(RateSheet {
            date,
            bird_types: self.config.bird_names().map(String::from).collect(),
            lines,
        })
    }

    pub fn today_rate_sheet(&self) -> LedgerResult<RateSheet> {
        self.rate_sheet(self.today())
    }

    /// Save today's rates, line → bird → rate. Pairs not supplied keep
    /// whatever they already had. All-or-nothing.
    pub fn set_today_rates(&mut self, rates: &BTreeMap<String, BirdAmounts>) -> LedgerResult<usize> {
        let date = self.today();
        let mut rows = Vec::new();
        for (line, birds) in rates {
            self.require_line(line)?;
            for (bird, rate) in birds {
                if self.config.bird_type(bird).is_none() {
                    return Err(LedgerError::Validation(format!("Unknown bird type '{bird}'")));
                }
                if *rate <= Money::ZERO {
                    return Err(LedgerError::Validation(format!(
                        "Rate for {bird} on {line} must be greater than zero"
                    )));
                }
                rows.push(RateRow {
                    date,
                    line:      line.clone(),
                    bird_type: bird.clone(),
                    rate:      *rate,
                });
            }
        }
        let saved = self.store.upsert_rates(&rows)?;
        log::info!("rates saved for {date}: {saved} entries");
        Ok(saved)
    }

    // ── Reports and prints ────────────────────────────────────────

    pub fn weekly_report(&self) -> LedgerResult<WeeklyReport> {
        WeeklyReport::build(&self.store, &self.config, self.today())
    }

    pub fn print_bill(&self, transaction_id: TransactionId) -> LedgerResult<BillPrint> {
        let bill = self
            .store
            .transaction(transaction_id)?
            .filter(|t| t.kind == TransactionKind::Purchase)
            .ok_or_else(|| LedgerError::transaction_not_found(transaction_id))?;
        let trader = self.store.require_trader(bill.trader_id)?;
        Ok(BillPrint { trader, bill })
    }

    pub fn statement(&self, trader_id: TraderId) -> LedgerResult<Statement> {
        let trader = self.store.require_trader(trader_id)?;
        let transactions = self
            .store
            .transactions_for_trader(trader_id, LedgerOrder::OldestFirst)?;
        Statement::new(trader, transactions, self.today())
    }

    // ── Validation ────────────────────────────────────────────────

    fn require_line(&self, line: &str) -> LedgerResult<()> {
        if self.config.has_line(line) {
            Ok(())
        } else {
            Err(LedgerError::Validation(format!("Unknown line '{line}'")))
        }
    }

    fn validate_trader_fields(&self, name: &str, line: &str) -> LedgerResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("Trader name is required".into()));
        }
        self.require_line(line)?;
        Ok(name.to_string())
    }
}
