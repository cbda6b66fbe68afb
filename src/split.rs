//! Split resolution: how much each participant owes for one expense.
//!
//! Pure functions only. [`resolve_split`] is the validating form used on
//! writes; [`derive_shares`] is the lenient form the balance aggregator
//! uses on stored records, which are re-derived but not re-validated.

use crate::error::ValidationError;
use crate::expense::{CustomSplit, Expense, SplitType};
use crate::money::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Each participant's share, unrounded.
pub type Shares = Vec<(String, Money)>;

/// Validates a split and returns each participant's share in participant
/// order.
///
/// An empty `custom_split` for percentage or exact splits is treated as
/// "not supplied" and replaced by the per-type default.
pub fn resolve_split(
    amount: Money,
    split_type: SplitType,
    participants: &[String],
    custom_split: &CustomSplit,
) -> Result<Shares, ValidationError> {
    let count = participants.len();
    let equal_share = amount
        .divide_evenly(count)
        .ok_or(ValidationError::NoParticipants)?;

    if split_type == SplitType::Equal {
        return Ok(participants
            .iter()
            .map(|p| (p.clone(), equal_share))
            .collect());
    }

    let defaulted;
    let values = if custom_split.is_empty() {
        defaulted = default_custom_split(split_type, amount, participants);
        &defaulted
    } else {
        custom_split
    };

    for participant in participants {
        if !values.contains_key(participant) {
            return Err(ValidationError::MissingSplitEntry {
                participant: participant.clone(),
            });
        }
    }
    if let Some(person) = values.keys().find(|name| !participants.contains(*name)) {
        return Err(ValidationError::UnknownSplitEntry {
            person: person.clone(),
        });
    }

    let total = values
        .iter()
        .try_fold(Money::ZERO, |acc, (name, value)| {
            acc.checked_add(Money::new(*value))
                .ok_or_else(|| value_too_large(name, *value))
        })?
        .value();
    match split_type {
        SplitType::Percentage => {
            if !Money::new(total).within_tolerance_of(Money::new(dec!(100))) {
                return Err(ValidationError::PercentageSumMismatch {
                    total,
                    tolerance: Money::TOLERANCE,
                });
            }
        }
        SplitType::Exact => {
            if !Money::new(total).within_tolerance_of(amount) {
                return Err(ValidationError::ExactSumMismatch {
                    expected: amount,
                    total: Money::new(total),
                    tolerance: Money::TOLERANCE,
                });
            }
        }
        SplitType::Equal => {}
    }

    participants
        .iter()
        .map(|p| {
            let value = values[p];
            share_for(split_type, amount, value)
                .map(|share| (p.clone(), share))
                .ok_or_else(|| value_too_large(p, value))
        })
        .collect()
}

fn value_too_large(name: &str, value: Decimal) -> ValidationError {
    ValidationError::ValueTooLarge {
        field: format!("custom_split[{}]", name),
        value: value.to_string(),
    }
}

/// `None` if a percentage share overflows.
fn share_for(split_type: SplitType, amount: Money, value: Decimal) -> Option<Money> {
    match split_type {
        SplitType::Percentage => amount.checked_percent(value),
        SplitType::Exact | SplitType::Equal => Some(Money::new(value)),
    }
}

/// Default custom split for a split type: empty for equal, otherwise the
/// per-type even split.
pub fn default_custom_split(
    split_type: SplitType,
    amount: Money,
    participants: &[String],
) -> CustomSplit {
    match split_type {
        SplitType::Equal => CustomSplit::new(),
        SplitType::Percentage => default_percentages(participants),
        SplitType::Exact => default_exact_shares(amount, participants),
    }
}

/// `100 / n` percent for every participant.
pub fn default_percentages(participants: &[String]) -> CustomSplit {
    match Money::new(dec!(100)).divide_evenly(participants.len()) {
        Some(pct) => participants
            .iter()
            .map(|p| (p.clone(), pct.value()))
            .collect(),
        None => CustomSplit::new(),
    }
}

/// `amount / n` for every participant.
pub fn default_exact_shares(amount: Money, participants: &[String]) -> CustomSplit {
    match amount.divide_evenly(participants.len()) {
        Some(share) => participants
            .iter()
            .map(|p| (p.clone(), share.value()))
            .collect(),
        None => CustomSplit::new(),
    }
}

/// Re-derives shares for a stored expense without validating it.
///
/// Equal splits divide over `participants`; percentage and exact splits
/// use whatever `custom_split` entries are stored. Returns `None` when no
/// share can be derived at all (no participants for an equal split, no
/// entries for the other types) or when a percentage share overflows.
pub fn derive_shares(expense: &Expense) -> Option<Shares> {
    match expense.split_type {
        SplitType::Equal => {
            let share = expense.amount.divide_evenly(expense.participants.len())?;
            Some(
                expense
                    .participants
                    .iter()
                    .map(|p| (p.clone(), share))
                    .collect(),
            )
        }
        split_type => {
            if expense.custom_split.is_empty() {
                return None;
            }
            expense
                .custom_split
                .iter()
                .map(|(p, value)| {
                    share_for(split_type, expense.amount, *value).map(|share| (p.clone(), share))
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::ExpenseId;
    use std::str::FromStr;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn people(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn split(entries: &[(&str, Decimal)]) -> CustomSplit {
        entries.iter().map(|(n, v)| (n.to_string(), *v)).collect()
    }

    fn share_of(shares: &Shares, name: &str) -> Money {
        shares
            .iter()
            .find(|(p, _)| p == name)
            .map(|(_, s)| *s)
            .unwrap()
    }

    #[test]
    fn test_equal_split() {
        let shares = resolve_split(
            money("600"),
            SplitType::Equal,
            &people(&["A", "B", "C"]),
            &CustomSplit::new(),
        )
        .unwrap();

        assert_eq!(shares.len(), 3);
        for (_, share) in &shares {
            assert_eq!(share.round_cents().to_string(), "200.00");
        }
    }

    #[test]
    fn test_equal_split_keeps_remainder() {
        let shares = resolve_split(
            money("100"),
            SplitType::Equal,
            &people(&["A", "B", "C"]),
            &CustomSplit::new(),
        )
        .unwrap();

        let total: Money = shares.iter().map(|(_, s)| *s).sum();
        assert_eq!(total.round_cents(), money("100"));
        assert_eq!(shares[0].1.round_cents(), money("33.33"));
    }

    #[test]
    fn test_percentage_split() {
        let shares = resolve_split(
            money("300"),
            SplitType::Percentage,
            &people(&["A", "B"]),
            &split(&[("A", dec!(50)), ("B", dec!(50))]),
        )
        .unwrap();

        assert_eq!(share_of(&shares, "A"), money("150"));
        assert_eq!(share_of(&shares, "B"), money("150"));
    }

    #[test]
    fn test_percentage_sum_rejected() {
        let err = resolve_split(
            money("300"),
            SplitType::Percentage,
            &people(&["A", "B"]),
            &split(&[("A", dec!(60)), ("B", dec!(30))]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::PercentageSumMismatch {
                total: dec!(90),
                tolerance: Money::TOLERANCE,
            }
        );
        assert!(err.to_string().contains("got 90%"));
    }

    #[test]
    fn test_percentage_tolerance_boundary() {
        let result = resolve_split(
            money("90"),
            SplitType::Percentage,
            &people(&["A", "B", "C"]),
            &split(&[("A", dec!(33.3)), ("B", dec!(33.3)), ("C", dec!(33.3))]),
        );
        assert!(result.is_err());

        let result = resolve_split(
            money("90"),
            SplitType::Percentage,
            &people(&["A", "B", "C"]),
            &split(&[("A", dec!(33.33)), ("B", dec!(33.33)), ("C", dec!(33.33))]),
        );
        assert!(result.is_ok());

        let result = resolve_split(
            money("90"),
            SplitType::Percentage,
            &people(&["A", "B", "C"]),
            &split(&[("A", dec!(33.33)), ("B", dec!(33.33)), ("C", dec!(33.34))]),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_percentage_defaults_when_empty() {
        let shares = resolve_split(
            money("90"),
            SplitType::Percentage,
            &people(&["A", "B", "C"]),
            &CustomSplit::new(),
        )
        .unwrap();

        let total: Money = shares.iter().map(|(_, s)| *s).sum();
        assert!(total.within_tolerance_of(money("90")));
        assert_eq!(share_of(&shares, "B").round_cents(), money("30"));
    }

    #[test]
    fn test_exact_split() {
        let shares = resolve_split(
            money("450"),
            SplitType::Exact,
            &people(&["A", "B"]),
            &split(&[("A", dec!(200)), ("B", dec!(250))]),
        )
        .unwrap();

        assert_eq!(share_of(&shares, "A"), money("200"));
        assert_eq!(share_of(&shares, "B"), money("250"));
    }

    #[test]
    fn test_exact_sum_rejected() {
        let err = resolve_split(
            money("450"),
            SplitType::Exact,
            &people(&["A", "B"]),
            &split(&[("A", dec!(200)), ("B", dec!(200))]),
        )
        .unwrap_err();

        assert!(matches!(err, ValidationError::ExactSumMismatch { .. }));
        assert!(err.to_string().contains("must sum to 450.00"));
        assert!(err.to_string().contains("got 400.00"));
    }

    #[test]
    fn test_missing_entry_rejected() {
        let err = resolve_split(
            money("450"),
            SplitType::Exact,
            &people(&["A", "B", "C"]),
            &split(&[("A", dec!(200)), ("B", dec!(250))]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::MissingSplitEntry {
                participant: "C".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_entry_rejected() {
        let err = resolve_split(
            money("450"),
            SplitType::Exact,
            &people(&["A", "B"]),
            &split(&[("A", dec!(200)), ("B", dec!(200)), ("Z", dec!(50))]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::UnknownSplitEntry {
                person: "Z".to_string()
            }
        );
    }

    #[test]
    fn test_split_sum_overflow_rejected() {
        let huge = dec!(70000000000000000000000000000);
        let err = resolve_split(
            money("10"),
            SplitType::Exact,
            &people(&["A", "B"]),
            &split(&[("A", huge), ("B", huge)]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::ValueTooLarge {
                field: "custom_split[B]".to_string(),
                value: huge.to_string(),
            }
        );
    }

    #[test]
    fn test_percentage_share_overflow_rejected() {
        // Entries cancel to 100% but each share overflows
        let huge = dec!(70000000000000000000000000000);
        let err = resolve_split(
            money("1000"),
            SplitType::Percentage,
            &people(&["A", "B"]),
            &split(&[("A", huge), ("B", dec!(100) - huge)]),
        )
        .unwrap_err();

        assert!(matches!(err, ValidationError::ValueTooLarge { .. }));
    }

    #[test]
    fn test_no_participants_rejected() {
        let err = resolve_split(money("10"), SplitType::Equal, &[], &CustomSplit::new()).unwrap_err();
        assert_eq!(err, ValidationError::NoParticipants);
    }

    #[test]
    fn test_defaults() {
        let names = people(&["A", "B", "C", "D"]);

        let pct = default_percentages(&names);
        assert_eq!(pct.get("A"), Some(&dec!(25)));

        let exact = default_exact_shares(money("10"), &names);
        assert_eq!(exact.get("D"), Some(&dec!(2.5)));

        assert!(default_custom_split(SplitType::Equal, money("10"), &names).is_empty());
        assert!(default_percentages(&[]).is_empty());
    }

    #[test]
    fn test_derive_shares_uses_stored_entries() {
        let expense = Expense {
            id: ExpenseId::new(),
            amount: money("100"),
            description: "Edited elsewhere".to_string(),
            paid_by: "A".to_string(),
            split_type: SplitType::Percentage,
            participants: people(&["A", "B"]),
            custom_split: split(&[("A", dec!(40)), ("B", dec!(40)), ("C", dec!(20))]),
        };

        let shares = derive_shares(&expense).unwrap();
        assert_eq!(shares.len(), 3);
        assert_eq!(share_of(&shares, "C"), money("20"));
    }

    #[test]
    fn test_derive_shares_none_without_inputs() {
        let expense = Expense {
            id: ExpenseId::new(),
            amount: money("100"),
            description: "Broken".to_string(),
            paid_by: "A".to_string(),
            split_type: SplitType::Equal,
            participants: Vec::new(),
            custom_split: CustomSplit::new(),
        };
        assert!(derive_shares(&expense).is_none());

        let expense = Expense {
            split_type: SplitType::Exact,
            participants: people(&["A"]),
            ..expense
        };
        assert!(derive_shares(&expense).is_none());
    }

    #[test]
    fn test_derive_shares_none_on_overflow() {
        let expense = Expense {
            id: ExpenseId::new(),
            amount: money("1000"),
            description: "Edited elsewhere".to_string(),
            paid_by: "A".to_string(),
            split_type: SplitType::Percentage,
            participants: people(&["A"]),
            custom_split: split(&[("A", Decimal::MAX)]),
        };
        assert!(derive_shares(&expense).is_none());
    }
}
