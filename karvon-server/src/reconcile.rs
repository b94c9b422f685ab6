//! 对账计算 — 纯函数
//!
//! The arithmetic behind driver day reconciliation and client balances.
//! Everything here is pure so the rules stay testable without a database:
//! handlers fetch rows, this module folds them.

use shared::models::{
    BanknoteCount, DaySummary, DeliveryWithNames, DriverExpense, LedgerEntry,
};

/// Money comparisons tolerate sub-cent f64 noise
pub const MONEY_EPSILON: f64 = 0.005;

/// Σ denomination × count over a banknote mapping.
///
/// Denominations are decimal strings ("500", "0.5"); unparsable keys
/// contribute nothing rather than poisoning the whole count.
pub fn counted_total(banknotes: &BanknoteCount) -> f64 {
    banknotes
        .iter()
        .filter_map(|(denomination, count)| {
            denomination
                .parse::<f64>()
                .ok()
                .map(|value| value * (*count as f64))
        })
        .sum()
}

/// Compute the reconciliation summary for one driver-day.
///
/// `net_cash_due = Σ cash + Σ extra_payment − Σ expenses`: cash collected
/// for deliveries plus debt repayments taken in cash, minus what the
/// driver spent on the road.
pub fn day_summary(
    deliveries: &[DeliveryWithNames],
    expenses: &[DriverExpense],
    banknotes: Option<&BanknoteCount>,
) -> DaySummary {
    let total_cash: f64 = deliveries.iter().map(|d| d.cash_amount).sum();
    let total_card: f64 = deliveries.iter().map(|d| d.card_amount).sum();
    let total_transfer: f64 = deliveries.iter().map(|d| d.transfer_amount).sum();
    let total_debt: f64 = deliveries.iter().map(|d| d.debt_amount).sum();
    let total_goods: f64 = deliveries.iter().map(|d| d.goods_amount).sum();
    let total_extra_payment: f64 = deliveries.iter().map(|d| d.extra_payment).sum();
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();

    let net_cash_due = total_cash + total_extra_payment - total_expenses;
    let counted_total = banknotes.map(counted_total).unwrap_or(0.0);
    let difference = net_cash_due - counted_total;

    DaySummary {
        total_cash,
        total_card,
        total_transfer,
        total_debt,
        total_goods,
        total_extra_payment,
        total_expenses,
        net_cash_due,
        counted_total,
        difference,
        balanced: difference.abs() < MONEY_EPSILON,
    }
}

/// Σ incurred − Σ repaid over ledger entries
pub fn ledger_balance(entries: &[LedgerEntry]) -> f64 {
    entries.iter().map(|e| e.signed_amount()).sum()
}

/// Does the declared split add up to the declared total?
pub fn split_matches_total(
    amount: f64,
    cash: f64,
    card: f64,
    transfer: f64,
    debt: f64,
) -> bool {
    (amount - (cash + card + transfer + debt)).abs() < MONEY_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ExpenseType, LedgerEntryType};

    fn delivery(cash: f64, card: f64, transfer: f64, debt: f64, extra: f64) -> DeliveryWithNames {
        DeliveryWithNames {
            id: 1,
            driver_id: 1,
            driver_name: "Marek".into(),
            client_id: 1,
            client_name: "Sklep u Ani".into(),
            delivery_date: 0,
            amount: cash + card + transfer + debt,
            cash_amount: cash,
            card_amount: card,
            transfer_amount: transfer,
            debt_amount: debt,
            goods_amount: 0.0,
            extra_payment: extra,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn expense(amount: f64) -> DriverExpense {
        DriverExpense {
            id: 1,
            driver_id: 1,
            expense_type: ExpenseType::Fuel,
            name: None,
            amount,
            expense_date: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn ledger_entry(entry_type: LedgerEntryType, amount: f64, from_delivery: bool) -> LedgerEntry {
        LedgerEntry {
            id: 1,
            client_id: 1,
            delivery_id: from_delivery.then_some(9),
            entry_type,
            amount,
            entry_date: 0,
            description: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn counted_total_multiplies_denominations() {
        let mut notes = BanknoteCount::new();
        notes.insert("500".into(), 1);
        notes.insert("100".into(), 2);
        notes.insert("20".into(), 1);
        assert_eq!(counted_total(&notes), 720.0);
    }

    #[test]
    fn counted_total_skips_garbage_keys() {
        let mut notes = BanknoteCount::new();
        notes.insert("50".into(), 2);
        notes.insert("zloty".into(), 7);
        assert_eq!(counted_total(&notes), 100.0);
    }

    #[test]
    fn net_cash_due_adds_repayments_and_subtracts_expenses() {
        let deliveries = vec![
            delivery(200.0, 50.0, 0.0, 30.0, 10.0),
            delivery(300.0, 0.0, 80.0, 0.0, 0.0),
        ];
        let expenses = vec![expense(40.0), expense(25.0)];

        let summary = day_summary(&deliveries, &expenses, None);
        assert_eq!(summary.total_cash, 500.0);
        assert_eq!(summary.total_card, 50.0);
        assert_eq!(summary.total_transfer, 80.0);
        assert_eq!(summary.total_debt, 30.0);
        assert_eq!(summary.total_extra_payment, 10.0);
        assert_eq!(summary.total_expenses, 65.0);
        // 500 + 10 - 65
        assert_eq!(summary.net_cash_due, 445.0);
    }

    #[test]
    fn balanced_when_count_matches_net_due() {
        let deliveries = vec![delivery(700.0, 0.0, 0.0, 0.0, 20.0)];
        let mut notes = BanknoteCount::new();
        notes.insert("500".into(), 1);
        notes.insert("100".into(), 2);
        notes.insert("20".into(), 1);

        let summary = day_summary(&deliveries, &[], Some(&notes));
        assert_eq!(summary.counted_total, 720.0);
        assert_eq!(summary.difference, 0.0);
        assert!(summary.balanced);

        // One 20 note short: driver owes 20 more
        notes.insert("20".into(), 0);
        let summary = day_summary(&deliveries, &[], Some(&notes));
        assert_eq!(summary.difference, 20.0);
        assert!(!summary.balanced);
    }

    #[test]
    fn mixed_source_ledger_balance() {
        // Manual [DEBT 100, PAYMENT 40] + delivery {debt 30, extra 10} → 80
        let entries = vec![
            ledger_entry(LedgerEntryType::DebtIncurred, 100.0, false),
            ledger_entry(LedgerEntryType::DebtRepaid, 40.0, false),
            ledger_entry(LedgerEntryType::DebtIncurred, 30.0, true),
            ledger_entry(LedgerEntryType::DebtRepaid, 10.0, true),
        ];
        assert_eq!(ledger_balance(&entries), 80.0);
    }

    #[test]
    fn split_total_tolerates_float_noise() {
        assert!(split_matches_total(100.0, 60.0, 30.0, 10.0, 0.0));
        assert!(split_matches_total(0.3, 0.1, 0.1, 0.1, 0.0));
        assert!(!split_matches_total(100.0, 60.0, 30.0, 0.0, 0.0));
    }
}
