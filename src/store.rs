//! Record store abstraction.
//!
//! The ledger never reaches for a global connection; a store is handed to
//! it at construction. [`MemoryStore`] is the in-process implementation
//! used by the CLI and the tests.

use crate::expense::{Expense, ExpenseId, ValidatedExpense};
use serde::Serialize;
use std::collections::BTreeMap;

/// A person named in expenses, with the number of expenses listing them as
/// a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantCount {
    pub name: String,
    pub count: usize,
}

/// Storage operations the ledger needs.
///
/// Implementations keep records in insertion order.
pub trait RecordStore {
    /// Every stored expense, in insertion order.
    fn list_all_expenses(&self) -> Vec<Expense>;

    /// One page of expenses.
    fn list_expenses(&self, skip: usize, limit: usize) -> Vec<Expense> {
        self.list_all_expenses()
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect()
    }

    fn find_expense_by_id(&self, id: ExpenseId) -> Option<Expense>;

    /// Stores a new record under a fresh id.
    fn insert_expense(&mut self, expense: ValidatedExpense) -> Expense;

    /// Replaces the record with `id`. Returns `None` if there is none.
    fn update_expense(&mut self, id: ExpenseId, expense: ValidatedExpense) -> Option<Expense>;

    /// Removes the record with `id`. Returns whether one was removed.
    fn delete_expense(&mut self, id: ExpenseId) -> bool;

    /// Distinct participant names with occurrence counts, sorted by name.
    fn list_distinct_participant_names(&self) -> Vec<ParticipantCount> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for expense in self.list_all_expenses() {
            for name in expense.participants {
                *counts.entry(name).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .map(|(name, count)| ParticipantCount { name, count })
            .collect()
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    expenses: Vec<Expense>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        MemoryStore {
            expenses: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Stores a record as-is, bypassing validation.
    ///
    /// Stands in for records written by something other than the ledger.
    pub fn insert_raw(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }
}

impl RecordStore for MemoryStore {
    fn list_all_expenses(&self) -> Vec<Expense> {
        self.expenses.clone()
    }

    fn list_expenses(&self, skip: usize, limit: usize) -> Vec<Expense> {
        self.expenses.iter().skip(skip).take(limit).cloned().collect()
    }

    fn find_expense_by_id(&self, id: ExpenseId) -> Option<Expense> {
        self.expenses.iter().find(|e| e.id == id).cloned()
    }

    fn insert_expense(&mut self, expense: ValidatedExpense) -> Expense {
        let stored = expense.into_expense(ExpenseId::new());
        self.expenses.push(stored.clone());
        stored
    }

    fn update_expense(&mut self, id: ExpenseId, expense: ValidatedExpense) -> Option<Expense> {
        let slot = self.expenses.iter_mut().find(|e| e.id == id)?;
        *slot = expense.into_expense(id);
        Some(slot.clone())
    }

    fn delete_expense(&mut self, id: ExpenseId) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        self.expenses.len() < before
    }
}
