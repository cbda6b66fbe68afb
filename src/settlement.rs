//! Settlement minimization: turns net balances into point-to-point payments.
//!
//! # Algorithm
//!
//! Greedy largest-pair matching. Creditors are sorted by balance descending
//! and debtors by balance ascending (most negative first), both with name
//! as the secondary key. The head creditor and head debtor are matched for
//! `min(credit, -debt)`; whoever reaches zero (within [`Money::TOLERANCE`])
//! leaves their list. Each round retires at least one party, so at most
//! `creditors + debtors - 1` payments are emitted.
//!
//! # Known limitation
//!
//! Greedy matching is optimal or close to it for typical groups but does
//! not always reach the true minimum number of payments. Finding that
//! minimum means searching for zero-sum subsets of balances, which is
//! exponential in the group size.

use crate::balance::{compute_balances, PersonBalance};
use crate::expense::Expense;
use crate::money::Money;
use log::debug;
use serde::Serialize;

/// A single proposed payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub from_person: String,
    pub to_person: String,
    pub amount: Money,
}

/// Output of the minimizer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettlementPlan {
    /// Payments in the order they were matched.
    pub settlements: Vec<Settlement>,

    /// Total absolute balance left unsettled: sub-tolerance remainders plus
    /// anything left once one side ran out. Non-zero only when rounded
    /// balances did not sum to exactly zero.
    pub written_off: Money,
}

impl SettlementPlan {
    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.settlements.len()
    }
}

/// A party still in the matching queue.
struct Party {
    name: String,
    remaining: Money,
}

/// Computes the settlement plan for the full expense set.
pub fn compute_settlements(expenses: &[Expense]) -> SettlementPlan {
    minimize(&compute_balances(expenses))
}

/// Reduces balances to a short list of payments that zero them out.
pub fn minimize(balances: &[PersonBalance]) -> SettlementPlan {
    let mut creditors: Vec<Party> = balances
        .iter()
        .filter(|b| b.balance.is_positive())
        .map(|b| Party {
            name: b.name.clone(),
            remaining: b.balance,
        })
        .collect();
    let mut debtors: Vec<Party> = balances
        .iter()
        .filter(|b| b.balance.is_negative())
        .map(|b| Party {
            name: b.name.clone(),
            remaining: b.balance,
        })
        .collect();

    creditors.sort_by(|a, b| {
        b.remaining
            .cmp(&a.remaining)
            .then_with(|| a.name.cmp(&b.name))
    });
    debtors.sort_by(|a, b| {
        a.remaining
            .cmp(&b.remaining)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut plan = SettlementPlan::default();
    let mut next_creditor = 0;
    let mut next_debtor = 0;

    while next_creditor < creditors.len() && next_debtor < debtors.len() {
        let creditor = &mut creditors[next_creditor];
        let debtor = &mut debtors[next_debtor];

        let amount = creditor.remaining.min(-debtor.remaining).round_cents();

        if amount.is_positive() {
            debug!(
                "Settlement: {} pays {} {}",
                debtor.name, creditor.name, amount
            );
            plan.settlements.push(Settlement {
                from_person: debtor.name.clone(),
                to_person: creditor.name.clone(),
                amount,
            });
        }

        creditor.remaining -= amount;
        debtor.remaining += amount;

        if creditor.remaining.abs() < Money::TOLERANCE {
            plan.written_off += creditor.remaining.abs();
            next_creditor += 1;
        }
        if debtor.remaining.abs() < Money::TOLERANCE {
            plan.written_off += debtor.remaining.abs();
            next_debtor += 1;
        }
    }

    let leftover: Money = creditors[next_creditor..]
        .iter()
        .chain(debtors[next_debtor..].iter())
        .map(|party| party.remaining.abs())
        .sum();
    plan.written_off += leftover;

    if !plan.written_off.is_zero() {
        debug!(
            "Settlement: {} left unsettled after {} payments",
            plan.written_off,
            plan.settlements.len()
        );
    }

    plan
}
