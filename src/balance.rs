//! Balance aggregation: folds every expense into one net position per person.
//!
//! Positions accumulate unrounded [`Money`]; figures are rounded to cents
//! only when a [`PersonBalance`] is produced. Rounding each expense's share
//! on the way in would drift by a cent every few expenses.

use crate::expense::Expense;
use crate::money::Money;
use crate::split::{derive_shares, Shares};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Running totals for one person.
///
/// # Invariants
///
/// - `paid` only grows by whole expense amounts the person paid
/// - `share` only grows by shares derived from accepted expenses
/// - `paid - share` is representable, so [`PersonPosition::net`] cannot
///   overflow
#[derive(Debug, Clone, PartialEq)]
pub struct PersonPosition {
    pub name: String,

    /// Sum of amounts this person paid, unrounded.
    pub paid: Money,

    /// Sum of this person's shares, unrounded.
    pub share: Money,
}

impl PersonPosition {
    /// Creates a position with zero totals.
    pub fn new(name: &str) -> Self {
        PersonPosition {
            name: name.to_string(),
            paid: Money::ZERO,
            share: Money::ZERO,
        }
    }

    /// Adds to the paid total. On overflow returns `None` and leaves the
    /// total unchanged.
    pub fn record_payment(&mut self, amount: Money) -> Option<()> {
        self.paid = self.paid.checked_add(amount)?;
        Some(())
    }

    /// Adds to the share total. On overflow returns `None` and leaves the
    /// total unchanged.
    pub fn record_share(&mut self, share: Money) -> Option<()> {
        self.share = self.share.checked_add(share)?;
        Some(())
    }

    /// Net position, unrounded. Positive means the person is owed money.
    pub fn net(&self) -> Money {
        self.paid - self.share
    }

    /// Rounds the totals for output.
    pub fn to_balance(&self) -> PersonBalance {
        PersonBalance {
            name: self.name.clone(),
            total_paid: self.paid.round_cents(),
            total_share: self.share.round_cents(),
            balance: self.net().round_cents(),
        }
    }
}

/// A person's rounded net position.
///
/// `balance > 0` means the person is owed money; `balance < 0` means they
/// owe money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonBalance {
    pub name: String,
    pub total_paid: Money,
    pub total_share: Money,
    pub balance: Money,
}

/// Accumulates unrounded positions for everyone named in `expenses`.
///
/// Everyone appearing as payer or participant gets a position, even if all
/// their records end up skipped. A record is skipped, with a warning, when
/// its shares cannot be derived, do not add up to its amount, or would push
/// a total out of range. Skipping the whole record keeps the books balanced
/// where clamping would not.
pub fn aggregate_positions(expenses: &[Expense]) -> BTreeMap<String, PersonPosition> {
    let mut positions: BTreeMap<String, PersonPosition> = BTreeMap::new();

    for expense in expenses {
        for name in std::iter::once(&expense.paid_by).chain(expense.participants.iter()) {
            positions
                .entry(name.clone())
                .or_insert_with(|| PersonPosition::new(name));
        }
    }

    for expense in expenses {
        if !expense.amount.is_positive() {
            warn!(
                "Expense {}: non-positive amount {}, skipping",
                expense.id, expense.amount
            );
            continue;
        }

        let shares = match derive_shares(expense) {
            Some(shares) => shares,
            None => {
                warn!(
                    "Expense {}: no shares derivable for {} split, skipping",
                    expense.id, expense.split_type
                );
                continue;
            }
        };

        let share_total = match Money::checked_sum(shares.iter().map(|(_, share)| *share)) {
            Some(total) => total,
            None => {
                warn!("Expense {}: shares overflow, skipping", expense.id);
                continue;
            }
        };
        if !share_total.within_tolerance_of(expense.amount) {
            warn!(
                "Expense {}: shares sum to {} but amount is {}, skipping",
                expense.id,
                share_total.round_cents(),
                expense.amount
            );
            continue;
        }

        match stage_expense(&positions, expense, &shares) {
            Some(staged) => positions.extend(staged),
            None => {
                warn!("Expense {}: totals would overflow, skipping", expense.id);
                continue;
            }
        }

        debug!(
            "Expense {}: {} paid {} ({} split)",
            expense.id, expense.paid_by, expense.amount, expense.split_type
        );
    }

    positions
}

/// Applies one expense to copies of the positions it touches.
///
/// Returns `None` if any total would overflow; `positions` is only read, so
/// a rejected record leaves no partial trace.
fn stage_expense(
    positions: &BTreeMap<String, PersonPosition>,
    expense: &Expense,
    shares: &Shares,
) -> Option<BTreeMap<String, PersonPosition>> {
    let mut staged: BTreeMap<String, PersonPosition> = BTreeMap::new();

    staged_position(&mut staged, positions, &expense.paid_by).record_payment(expense.amount)?;
    for (name, share) in shares {
        staged_position(&mut staged, positions, name).record_share(*share)?;
    }

    if staged
        .values()
        .any(|position| position.paid.checked_sub(position.share).is_none())
    {
        return None;
    }
    Some(staged)
}

fn staged_position<'a>(
    staged: &'a mut BTreeMap<String, PersonPosition>,
    positions: &BTreeMap<String, PersonPosition>,
    name: &str,
) -> &'a mut PersonPosition {
    staged.entry(name.to_string()).or_insert_with(|| {
        positions
            .get(name)
            .cloned()
            .unwrap_or_else(|| PersonPosition::new(name))
    })
}

/// Computes every person's balance from the full expense set.
///
/// Ordered by balance descending (largest creditor first), ties broken by
/// name ascending. No expenses yields an empty list.
pub fn compute_balances(expenses: &[Expense]) -> Vec<PersonBalance> {
    let mut balances: Vec<PersonBalance> = aggregate_positions(expenses)
        .values()
        .map(PersonPosition::to_balance)
        .collect();

    balances.sort_by(|a, b| b.balance.cmp(&a.balance).then_with(|| a.name.cmp(&b.name)));
    balances
}
