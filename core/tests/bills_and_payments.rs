//! Integration tests for bills and payments.
//!
//! Tests verify:
//! 1. The worked bill and payment examples land on the expected debt
//! 2. A rejected bill or payment leaves balance and ledger untouched,
//!    including amounts too large to represent
//! 3. Any seeded sequence of bills and payments nets to the right debt
//! 4. Ledger rows carry kind, details, driver and today's date

use chrono::NaiveDate;
use poultry_ledger_core::{
    ledger::{BillRequest, PAYMENT_DETAILS},
    store::LedgerOrder,
    types::{BirdAmounts, Money, TransactionKind},
    Ledger, LedgerError,
};
use rand::{Rng, SeedableRng};
use rust_decimal_macros::dec;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 28).unwrap()
}

/// Ledger with the demo data loaded and the clock pinned to 2025-09-28.
fn build() -> Ledger {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut ledger = Ledger::in_memory_test(today()).expect("in-memory ledger");
    ledger.store_mut().seed_demo().expect("seed demo");
    ledger
}

fn amounts(pairs: &[(&str, Money)]) -> BirdAmounts {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn debt(ledger: &Ledger, trader_id: i64) -> Money {
    ledger.store().require_trader(trader_id).unwrap().total_debt
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: the worked examples
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn broiler_bill_then_payment() {
    let mut ledger = build();
    assert_eq!(debt(&ledger, 1), dec!(5400.50));

    let request = BillRequest {
        quantities:  amounts(&[("Broiler", dec!(50))]),
        rates:       amounts(&[("Broiler", dec!(110.00))]),
        driver:      Some("Firoj".into()),
        amount_paid: dec!(100.00),
    };
    let posted = ledger.add_bill(1, &request).unwrap();
    assert_eq!(posted.bill.total, dec!(5500.00));
    assert_eq!(posted.entry.debt_before, dec!(5400.50));
    assert_eq!(posted.entry.debt_after, dec!(10800.50));
    assert_eq!(debt(&ledger, 1), dec!(10800.50));

    let payment = ledger.add_payment(1, dec!(2000.00)).unwrap();
    assert_eq!(payment.debt_after, dec!(8800.50));
    assert_eq!(debt(&ledger, 1), dec!(8800.50));
}

#[test]
fn overpaying_a_bill_reduces_debt() {
    let mut ledger = build();
    let request = BillRequest {
        quantities:  amounts(&[("Minar", dec!(10))]),
        rates:       amounts(&[("Minar", dec!(85))]),
        driver:      None,
        amount_paid: dec!(1000),
    };
    ledger.add_bill(2, &request).unwrap();
    assert_eq!(debt(&ledger, 2), dec!(-150));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: rejected writes change nothing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn bill_missing_a_rate_is_rejected_without_side_effects() {
    let mut ledger = build();
    let rows_before = ledger.store().transaction_count().unwrap();

    let request = BillRequest {
        quantities:  amounts(&[("Broiler", dec!(20)), ("Parent", dec!(5))]),
        rates:       amounts(&[("Broiler", dec!(112.50))]),
        driver:      Some("Deepu".into()),
        amount_paid: Money::ZERO,
    };
    let err = ledger.add_bill(1, &request).unwrap_err();
    match err {
        LedgerError::Validation(msg) => assert!(msg.contains("Parent"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }

    assert_eq!(debt(&ledger, 1), dec!(5400.50));
    assert_eq!(ledger.store().transaction_count().unwrap(), rows_before);
}

#[test]
fn non_positive_payment_is_rejected() {
    let mut ledger = build();
    let rows_before = ledger.store().transaction_count().unwrap();

    for amount in [Money::ZERO, dec!(-10)] {
        let err = ledger.add_payment(4, amount).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{err:?}");
    }
    assert_eq!(debt(&ledger, 4), dec!(7800.00));
    assert_eq!(ledger.store().transaction_count().unwrap(), rows_before);
}

#[test]
fn unknown_trader_is_not_found() {
    let mut ledger = build();
    let request = BillRequest {
        quantities:  amounts(&[("Broiler", dec!(1))]),
        rates:       amounts(&[("Broiler", dec!(1))]),
        ..Default::default()
    };
    let bill_err = ledger.add_bill(99, &request).unwrap_err();
    let pay_err = ledger.add_payment(99, dec!(5)).unwrap_err();

    for err in [bill_err, pay_err] {
        assert!(
            matches!(err, LedgerError::NotFound { entity: "Trader", id: 99 }),
            "{err:?}"
        );
    }
    assert_eq!(ledger.store().transaction_count().unwrap(), 3);
}

#[test]
fn amounts_past_decimal_range_are_rejected_without_side_effects() {
    let mut ledger = build();
    let rows_before = ledger.store().transaction_count().unwrap();

    let huge = dec!(100000000000000000000);
    let request = BillRequest {
        quantities:  amounts(&[("Broiler", huge)]),
        rates:       amounts(&[("Broiler", huge)]),
        driver:      None,
        amount_paid: Money::ZERO,
    };
    let err = ledger.add_bill(1, &request).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)), "{err:?}");
    assert_eq!(debt(&ledger, 1), dec!(5400.50));
    assert_eq!(ledger.store().transaction_count().unwrap(), rows_before);

    // The first payment fits, the second would push the debt out of range.
    let first = ledger.add_payment(4, Money::MAX).unwrap();
    assert_eq!(first.debt_after, dec!(7800.00) - Money::MAX);

    let err = ledger.add_payment(4, Money::MAX).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)), "{err:?}");
    assert_eq!(debt(&ledger, 4), dec!(7800.00) - Money::MAX);
    assert_eq!(ledger.store().transaction_count().unwrap(), rows_before + 1);

    // The ledger stays printable.
    let statement = ledger.statement(4).unwrap();
    assert_eq!(statement.opening_balance, dec!(7800.00));
    assert_eq!(statement.closing_balance, dec!(7800.00) - Money::MAX);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: debt always equals start + bills − payments
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn random_sequences_net_to_expected_debt() {
    for seed in [1u64, 7, 42, 0xBEEF] {
        let mut rng = rand_pcg::Pcg64::seed_from_u64(seed);
        let mut ledger = build();
        let trader = ledger.register_trader("Sequence Trader", "Dahi").unwrap();
        let mut expected = Money::ZERO;

        for _ in 0..60 {
            if rng.gen_bool(0.6) {
                let qty = Money::new(rng.gen_range(1..=5_000), 1);
                let rate = Money::new(rng.gen_range(5_000..=15_000), 2);
                let paid = Money::new(rng.gen_range(0..=50_000), 2);
                let request = BillRequest {
                    quantities:  amounts(&[("Broiler", qty)]),
                    rates:       amounts(&[("Broiler", rate)]),
                    driver:      None,
                    amount_paid: paid,
                };
                let posted = ledger.add_bill(trader.id, &request).unwrap();
                expected += qty * rate - paid;
                assert_eq!(posted.entry.debt_after, expected);
            } else {
                let amount = Money::new(rng.gen_range(1..=100_000), 2);
                ledger.add_payment(trader.id, amount).unwrap();
                expected -= amount;
            }
        }

        assert_eq!(debt(&ledger, trader.id), expected, "seed {seed}");

        // The stored rows replay to the same balance.
        let replayed: Money = ledger
            .store()
            .transactions_for_trader(trader.id, LedgerOrder::OldestFirst)
            .unwrap()
            .iter()
            .map(|t| t.debt_delta())
            .sum();
        assert_eq!(replayed, expected, "seed {seed}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: what the ledger rows look like
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn ledger_rows_record_bill_and_payment_details() {
    let mut ledger = build();
    let request = BillRequest {
        quantities:  amounts(&[("Minar", dec!(15)), ("Broiler", dec!(12.5))]),
        rates:       amounts(&[("Minar", dec!(85)), ("Broiler", dec!(112.50))]),
        driver:      Some("   ".into()),
        amount_paid: Money::ZERO,
    };
    let bill = ledger.add_bill(2, &request).unwrap();
    ledger.add_payment(2, dec!(500)).unwrap();

    let view = ledger.trader_ledger(2).unwrap();
    assert_eq!(view.transactions.len(), 2);

    // Newest first: same date, so the higher id leads.
    let payment = &view.transactions[0];
    assert_eq!(payment.kind, TransactionKind::Payment);
    assert_eq!(payment.details.as_deref(), Some(PAYMENT_DETAILS));
    assert_eq!(payment.total_amount, Money::ZERO);
    assert_eq!(payment.amount_paid, dec!(500));

    let purchase = &view.transactions[1];
    assert_eq!(purchase.id, bill.entry.transaction.id);
    assert_eq!(purchase.kind, TransactionKind::Purchase);
    assert_eq!(purchase.date, today());
    assert_eq!(purchase.driver_name, None);
    assert_eq!(
        purchase.details.as_deref(),
        Some("Minar: 15 units @ 85.00\nBroiler: 12.5 kg @ 112.50")
    );
    assert_eq!(purchase.total_amount, dec!(1275) + dec!(1406.25));
}

#[test]
fn trader_ledger_shows_todays_rates_for_the_trader_line() {
    let ledger = build();
    let view = ledger.trader_ledger(3).unwrap();
    assert_eq!(view.trader.line, "Anjad");
    assert_eq!(view.today, today());
    assert_eq!(
        view.today_rates,
        amounts(&[("Minar", dec!(86.00)), ("Broiler", dec!(114.00))])
    );
    assert!(!view.today_rates.contains_key("Parent"));
    assert_eq!(view.drivers.len(), 7);
}
