use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::expense::{ExpenseIssue, ValidExpense};
use crate::models::{Expense, SettlementTransaction, SplitSummary};
use crate::services::money::{is_settled, round_currency, SETTLEMENT_EPSILON};

pub const NO_EXPENSES_MESSAGE: &str = "No expenses logged.";
pub const NO_VALID_EXPENSES_MESSAGE: &str = "No valid expenses to settle.";

/// Running net position of every identifier seen in a batch, at full precision.
///
/// `volume` is the gross total of every recorded amount. Each balance, and
/// every partial sum of balances, stays within `[-volume, volume]`, so
/// keeping `volume` representable keeps every ledger update in range.
#[derive(Debug, Default)]
struct BalanceLedger {
    balances: BTreeMap<String, Decimal>,
    volume: Decimal,
}

impl BalanceLedger {
    /// Credits the payer the full amount and debits every participant an equal share.
    /// A payer who also participates nets `amount * (n - 1) / n`.
    fn record(&mut self, expense: &ValidExpense<'_>) -> Result<(), ExpenseIssue> {
        self.volume = self
            .volume
            .checked_add(expense.amount)
            .ok_or(ExpenseIssue::AmountOutOfRange)?;

        *self.entry(expense.payer) += expense.amount;

        let share = expense.amount / Decimal::from(expense.participants.len());
        for participant in &expense.participants {
            *self.entry(participant) -= share;
        }
        Ok(())
    }

    fn entry(&mut self, id: &str) -> &mut Decimal {
        self.balances.entry(id.to_string()).or_insert(Decimal::ZERO)
    }

    /// Rounds every balance to cents. When the rounding drift exceeds the
    /// settlement tolerance it is taken off the largest balance so the
    /// published figures still sum to zero.
    fn into_rounded(self) -> BTreeMap<String, Decimal> {
        let mut rounded: BTreeMap<String, Decimal> = self
            .balances
            .into_iter()
            .map(|(id, balance)| (id, round_currency(balance)))
            .collect();

        let Some(drift) = rounded
            .values()
            .try_fold(Decimal::ZERO, |sum, balance| sum.checked_add(*balance))
        else {
            tracing::warn!("Rounded balances exceed the representable range, drift left as-is");
            return rounded;
        };

        if drift.abs() > SETTLEMENT_EPSILON {
            if let Some((id, balance)) = rounded
                .iter_mut()
                .max_by(|a, b| a.1.abs().cmp(&b.1.abs()))
            {
                if let Some(adjusted) = balance.checked_sub(drift) {
                    tracing::debug!(participant = %id, drift = %drift, "Absorbing rounding drift");
                    *balance = round_currency(adjusted);
                }
            }
        }

        rounded
    }
}

/// Computes net balances for a batch of shared expenses and the ordered list
/// of payments that settles them.
///
/// Malformed expenses (unreadable entries, non-positive or missing amount,
/// missing payer, no participants, or an amount that would push the batch
/// total past the representable range) are skipped and counted; they never
/// abort the batch. The
/// matching is greedy: the largest debt is paid to the largest credit first.
/// This keeps the number of payments low but is not guaranteed minimal.
pub fn split(expenses: &[Expense]) -> SplitSummary {
    if expenses.is_empty() {
        return SplitSummary {
            message: Some(NO_EXPENSES_MESSAGE.to_string()),
            ..SplitSummary::default()
        };
    }

    let mut ledger = BalanceLedger::default();
    let mut skipped_expenses = 0;

    for (index, expense) in expenses.iter().enumerate() {
        if let Err(issue) = expense.validate().and_then(|valid| ledger.record(&valid)) {
            skipped_expenses += 1;
            tracing::warn!(
                expense_index = index,
                issue = %issue,
                "Skipping malformed expense"
            );
        }
    }

    if skipped_expenses == expenses.len() {
        return SplitSummary {
            skipped_expenses,
            message: Some(NO_VALID_EXPENSES_MESSAGE.to_string()),
            ..SplitSummary::default()
        };
    }

    let balances = ledger.into_rounded();
    let transactions = settle(&balances);

    tracing::debug!(
        participants = balances.len(),
        transactions = transactions.len(),
        skipped = skipped_expenses,
        "Expense split computed"
    );

    SplitSummary {
        balances,
        transactions,
        skipped_expenses,
        message: None,
    }
}

/// Greedy two-cursor matching of debtors against creditors
fn settle(balances: &BTreeMap<String, Decimal>) -> Vec<SettlementTransaction> {
    let (mut debtors, mut creditors) = partition(balances);

    // Stable sorts: ties keep identifier order from the BTreeMap.
    debtors.sort_by(|a, b| a.1.cmp(&b.1));
    creditors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transactions = Vec::new();
    let (mut debtor_idx, mut creditor_idx) = (0, 0);

    while debtor_idx < debtors.len() && creditor_idx < creditors.len() {
        let (debtor, debt) = debtors[debtor_idx];
        let (creditor, credit) = creditors[creditor_idx];

        let amount = debt.abs().min(credit);
        transactions.push(SettlementTransaction {
            from: debtor.to_string(),
            to: creditor.to_string(),
            amount: round_currency(amount),
        });

        debtors[debtor_idx].1 = debt + amount;
        creditors[creditor_idx].1 = credit - amount;

        if is_settled(debtors[debtor_idx].1) {
            debtor_idx += 1;
        }
        if is_settled(creditors[creditor_idx].1) {
            creditor_idx += 1;
        }
    }

    transactions
}

type Position<'a> = (&'a str, Decimal);

/// Splits balances into debtors and creditors, dropping settled entries
fn partition(balances: &BTreeMap<String, Decimal>) -> (Vec<Position<'_>>, Vec<Position<'_>>) {
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();

    for (id, balance) in balances {
        if is_settled(*balance) {
            continue;
        }
        if balance.is_sign_negative() {
            debtors.push((id.as_str(), *balance));
        } else {
            creditors.push((id.as_str(), *balance));
        }
    }

    (debtors, creditors)
}
