//! Expense models: CSV import records, write inputs, and stored records.
//!
//! Every write goes through [`ExpenseDraft::validate`], a single ordered
//! pass over the whole record. Cross-field rules (payer auto-inclusion,
//! split totals) are checked explicitly in that pass rather than relying on
//! the order fields happen to be declared in.

use crate::error::{SplitError, ValidationError};
use crate::money::Money;
use crate::split::{default_custom_split, resolve_split};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Per-participant override values. Percentages for
/// [`SplitType::Percentage`], currency amounts for [`SplitType::Exact`].
pub type CustomSplit = BTreeMap<String, Decimal>;

/// Rule governing how an expense's amount is divided among participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Everyone owes `amount / participants`.
    #[default]
    Equal,

    /// Each participant owes a percentage of the amount.
    Percentage,

    /// Each participant owes a fixed amount.
    Exact,
}

impl SplitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Percentage => "percentage",
            SplitType::Exact => "exact",
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equal" => Ok(SplitType::Equal),
            "percentage" => Ok(SplitType::Percentage),
            "exact" => Ok(SplitType::Exact),
            _ => Err(ValidationError::UnknownSplitType(s.trim().to_string())),
        }
    }
}

/// System-assigned opaque expense identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        ExpenseId(Uuid::new_v4())
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExpenseId {
    type Err = SplitError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(ExpenseId)
            .map_err(|_| SplitError::InvalidId { id: s.to_string() })
    }
}

/// Caller input for creating an expense.
///
/// `participants` and `custom_split` may be left empty; validation fills
/// them in (payer auto-inclusion, per-type default split).
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: Money,
    pub description: String,
    pub paid_by: String,
    pub split_type: SplitType,
    pub participants: Vec<String>,
    pub custom_split: CustomSplit,
}

impl ExpenseDraft {
    /// Creates an equal-split draft with no explicit participants.
    pub fn new(amount: Money, description: &str, paid_by: &str) -> Self {
        ExpenseDraft {
            amount,
            description: description.to_string(),
            paid_by: paid_by.to_string(),
            split_type: SplitType::Equal,
            participants: Vec::new(),
            custom_split: CustomSplit::new(),
        }
    }

    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_split<I, S>(mut self, split_type: SplitType, custom_split: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        self.split_type = split_type;
        self.custom_split = custom_split
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        self
    }

    /// Runs the validation pipeline over the whole record.
    ///
    /// Checks, in order: amount, description, payer, participants, then the
    /// split itself against the normalized participant list. The first
    /// failing check is reported; nothing is partially applied.
    pub fn validate(&self) -> std::result::Result<ValidatedExpense, ValidationError> {
        if self.amount < Money::MINIMUM_AMOUNT {
            return Err(ValidationError::AmountTooSmall {
                amount: self.amount,
                minimum: Money::MINIMUM_AMOUNT,
            });
        }
        if self.amount > Money::MAXIMUM_AMOUNT {
            return Err(ValidationError::AmountTooLarge {
                amount: self.amount,
                maximum: Money::MAXIMUM_AMOUNT,
            });
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        let paid_by = self.paid_by.trim();
        if paid_by.is_empty() {
            return Err(ValidationError::EmptyPayer);
        }

        let participants = normalize_participants(&self.participants, paid_by)?;

        let custom_split = match self.split_type {
            SplitType::Equal => CustomSplit::new(),
            split_type if self.custom_split.is_empty() => {
                default_custom_split(split_type, self.amount, &participants)
            }
            _ => {
                let mut trimmed = CustomSplit::new();
                for (name, value) in &self.custom_split {
                    insert_split_entry(&mut trimmed, name, *value)?;
                }
                trimmed
            }
        };

        resolve_split(self.amount, self.split_type, &participants, &custom_split)?;

        Ok(ValidatedExpense {
            amount: self.amount,
            description: description.to_string(),
            paid_by: paid_by.to_string(),
            split_type: self.split_type,
            participants,
            custom_split,
        })
    }
}

/// Trims names, drops repeats (first occurrence wins) and appends the payer
/// when missing.
fn normalize_participants(
    participants: &[String],
    paid_by: &str,
) -> std::result::Result<Vec<String>, ValidationError> {
    let mut normalized: Vec<String> = Vec::with_capacity(participants.len() + 1);

    for name in participants {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyParticipant);
        }
        if !normalized.iter().any(|existing| existing == name) {
            normalized.push(name.to_string());
        }
    }

    if !normalized.iter().any(|existing| existing == paid_by) {
        normalized.push(paid_by.to_string());
    }

    Ok(normalized)
}

/// A record that passed validation and is ready to be stored.
///
/// Only [`ExpenseDraft::validate`] produces one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedExpense {
    amount: Money,
    description: String,
    paid_by: String,
    split_type: SplitType,
    participants: Vec<String>,
    custom_split: CustomSplit,
}

impl ValidatedExpense {
    /// Attaches an identity, producing the stored form.
    pub fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            amount: self.amount,
            description: self.description,
            paid_by: self.paid_by,
            split_type: self.split_type,
            participants: self.participants,
            custom_split: self.custom_split,
        }
    }
}

/// A persisted expense record.
///
/// Fields are public because records can come back from a store in any
/// state; the aggregator treats them defensively rather than trusting them.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: Money,
    pub description: String,
    pub paid_by: String,
    pub split_type: SplitType,
    pub participants: Vec<String>,
    pub custom_split: CustomSplit,
}

impl Expense {
    /// Converts back into a draft, e.g. as the base for an update.
    pub fn to_draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            amount: self.amount,
            description: self.description.clone(),
            paid_by: self.paid_by.clone(),
            split_type: self.split_type,
            participants: self.participants.clone(),
            custom_split: self.custom_split.clone(),
        }
    }
}

/// Partial update: `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseUpdate {
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub paid_by: Option<String>,
    pub split_type: Option<SplitType>,
    pub participants: Option<Vec<String>>,
    pub custom_split: Option<CustomSplit>,
}

impl ExpenseUpdate {
    /// Merges this update over `current`, producing a draft to validate.
    ///
    /// When the split type changes and no new custom split is given, the
    /// stored custom split is discarded so validation recomputes the default
    /// for the new type instead of carrying stale values over.
    pub fn merge(&self, current: &Expense) -> ExpenseDraft {
        let mut draft = current.to_draft();

        if let Some(amount) = self.amount {
            draft.amount = amount;
        }
        if let Some(description) = &self.description {
            draft.description = description.clone();
        }
        if let Some(paid_by) = &self.paid_by {
            draft.paid_by = paid_by.clone();
        }
        if let Some(participants) = &self.participants {
            draft.participants = participants.clone();
        }
        if let Some(split_type) = self.split_type {
            if split_type != current.split_type {
                draft.custom_split = CustomSplit::new();
            }
            draft.split_type = split_type;
        }
        if let Some(custom_split) = &self.custom_split {
            draft.custom_split = custom_split.clone();
        }

        draft
    }
}

/// Raw expense record as read from CSV.
///
/// `participants` is a `;`-separated list of names; `custom_split` is a
/// `;`-separated list of `name:value` pairs.
#[derive(Debug, Deserialize)]
pub struct ExpenseRecord {
    pub description: String,
    pub amount: String,
    pub paid_by: String,
    pub split_type: Option<String>,
    pub participants: Option<String>,
    pub custom_split: Option<String>,
}

impl ExpenseRecord {
    /// Parses the raw CSV record into a draft. Validation happens later.
    pub fn parse(&self) -> std::result::Result<ExpenseDraft, ValidationError> {
        let amount = Money::from_str(&self.amount).map_err(|_| ValidationError::InvalidNumber {
            field: "amount".to_string(),
            value: self.amount.trim().to_string(),
        })?;

        let split_type = match self.split_type.as_deref().map(str::trim) {
            None | Some("") => SplitType::Equal,
            Some(raw) => SplitType::from_str(raw)?,
        };

        let participants = self
            .participants
            .as_deref()
            .map(split_list)
            .unwrap_or_default();

        let custom_split = match self.custom_split.as_deref() {
            Some(raw) => parse_custom_split(raw)?,
            None => CustomSplit::new(),
        };

        Ok(ExpenseDraft {
            amount,
            description: self.description.clone(),
            paid_by: self.paid_by.clone(),
            split_type,
            participants,
            custom_split,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_custom_split(raw: &str) -> std::result::Result<CustomSplit, ValidationError> {
    let mut split = CustomSplit::new();

    for entry in split_list(raw) {
        let (name, value) = entry
            .rsplit_once(':')
            .ok_or_else(|| ValidationError::InvalidNumber {
                field: "custom_split".to_string(),
                value: entry.clone(),
            })?;
        let value = Decimal::from_str(value.trim()).map_err(|_| ValidationError::InvalidNumber {
            field: format!("custom_split[{}]", name.trim()),
            value: value.trim().to_string(),
        })?;
        insert_split_entry(&mut split, name, value)?;
    }

    Ok(split)
}

/// Adds an entry under its trimmed name, rejecting a name already present.
fn insert_split_entry(
    split: &mut CustomSplit,
    name: &str,
    value: Decimal,
) -> std::result::Result<(), ValidationError> {
    let name = name.trim();
    if split.contains_key(name) {
        return Err(ValidationError::DuplicateSplitEntry {
            person: name.to_string(),
        });
    }
    split.insert(name.to_string(), value);
    Ok(())
}

/// Formats participants the way [`ExpenseRecord`] reads them.
pub fn format_participants(participants: &[String]) -> String {
    participants.join(";")
}

/// Formats a custom split the way [`ExpenseRecord`] reads it.
pub fn format_custom_split(split: &CustomSplit) -> String {
    split
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value.normalize()))
        .collect::<Vec<_>>()
        .join(";")
}
