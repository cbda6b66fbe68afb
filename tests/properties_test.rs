//! Property tests over randomly generated expense sets.

use proptest::prelude::*;
use rust_decimal::Decimal;
use split_engine::balance::aggregate_positions;
use split_engine::{
    compute_balances, compute_settlements, minimize, Expense, ExpenseDraft, ExpenseId, Money,
    SplitType,
};
use std::collections::BTreeMap;
use std::str::FromStr;

const NAMES: [&str; 6] = ["Ada", "Bea", "Cal", "Dev", "Eli", "Fay"];

/// (amount in cents, payer index, participant mask, split kind)
type ExpenseSpec = (i64, usize, Vec<bool>, u8);

fn expense_spec() -> impl Strategy<Value = ExpenseSpec> {
    (
        1i64..1_000_000i64,
        0usize..NAMES.len(),
        prop::collection::vec(any::<bool>(), NAMES.len()),
        0u8..3,
    )
}

fn build(specs: &[ExpenseSpec]) -> Vec<Expense> {
    specs
        .iter()
        .map(|(cents, payer, mask, kind)| {
            let participants: Vec<&str> = NAMES
                .iter()
                .zip(mask)
                .filter(|(_, included)| **included)
                .map(|(name, _)| *name)
                .collect();
            let split_type = match kind {
                0 => SplitType::Equal,
                1 => SplitType::Percentage,
                _ => SplitType::Exact,
            };
            ExpenseDraft::new(Money::new(Decimal::new(*cents, 2)), "Generated", NAMES[*payer])
                .with_participants(participants)
                .with_split(split_type, Vec::<(String, Decimal)>::new())
                .validate()
                .unwrap()
                .into_expense(ExpenseId::new())
        })
        .collect()
}

fn half_cent() -> Money {
    Money::from_str("0.005").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    /// Exact positions net to zero; rounding each person's figure moves
    /// the total by at most half a cent per person.
    #[test]
    fn money_is_conserved(specs in prop::collection::vec(expense_spec(), 0..20)) {
        let expenses = build(&specs);

        let exact_net: Money = aggregate_positions(&expenses)
            .values()
            .map(|p| p.net())
            .sum();
        prop_assert!(exact_net.abs() < Money::from_str("0.0000000001").unwrap());

        let balances = compute_balances(&expenses);
        let bound = balances.iter().map(|_| half_cent()).sum::<Money>();

        let paid: Money = balances.iter().map(|b| b.total_paid).sum();
        let share: Money = balances.iter().map(|b| b.total_share).sum();
        let net: Money = balances.iter().map(|b| b.balance).sum();

        prop_assert!((paid - share).abs() <= bound);
        prop_assert!(net.abs() <= bound);
    }

    /// Every payment is positive and whole cents, and applying the plan
    /// leaves exactly the reported write-off unsettled.
    #[test]
    fn settlements_account_for_every_cent(specs in prop::collection::vec(expense_spec(), 0..20)) {
        let expenses = build(&specs);
        let balances = compute_balances(&expenses);
        let plan = minimize(&balances);

        let mut remaining: BTreeMap<String, Money> = balances
            .iter()
            .map(|b| (b.name.clone(), b.balance))
            .collect();
        for s in &plan.settlements {
            prop_assert!(s.amount.is_positive());
            prop_assert_eq!(s.amount, s.amount.round_cents());
            prop_assert_ne!(&s.from_person, &s.to_person);
            *remaining.get_mut(&s.from_person).unwrap() += s.amount;
            *remaining.get_mut(&s.to_person).unwrap() -= s.amount;
        }

        let unsettled: Money = remaining.values().map(|m| m.abs()).sum();
        prop_assert_eq!(unsettled, plan.written_off);
        prop_assert!(plan.len() <= balances.len().saturating_sub(1));
    }

    /// Recomputing from the same records gives the same answer.
    #[test]
    fn computation_is_idempotent(specs in prop::collection::vec(expense_spec(), 0..12)) {
        let expenses = build(&specs);

        prop_assert_eq!(compute_balances(&expenses), compute_balances(&expenses));
        prop_assert_eq!(compute_settlements(&expenses), compute_settlements(&expenses));
    }
}
