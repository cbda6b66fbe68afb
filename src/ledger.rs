//! Expense ledger service.
//!
//! Wraps an injected [`RecordStore`] with validated writes and the derived
//! queries. Balances and settlements are recomputed from the full set of
//! stored expenses on every call; nothing derived is cached.

use crate::balance::{compute_balances, PersonBalance};
use crate::error::{Result, SplitError};
use crate::expense::{
    format_custom_split, format_participants, Expense, ExpenseDraft, ExpenseId, ExpenseRecord,
    ExpenseUpdate,
};
use crate::settlement::{compute_settlements, SettlementPlan};
use crate::store::{ParticipantCount, RecordStore};
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::io::{Read, Write};
use std::str::FromStr;

/// Outcome of a CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// The expense ledger.
///
/// # Output Ordering
///
/// Balances come out largest creditor first with name as tie-break;
/// people come out sorted by name. Both are deterministic for a given set
/// of records.
pub struct ExpenseLedger<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> ExpenseLedger<S> {
    pub fn new(store: S) -> Self {
        ExpenseLedger { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and stores a new expense.
    pub fn create_expense(&mut self, draft: ExpenseDraft) -> Result<Expense> {
        let validated = draft.validate()?;
        let expense = self.store.insert_expense(validated);
        debug!(
            "Created expense {}: {} paid {}",
            expense.id, expense.paid_by, expense.amount
        );
        Ok(expense)
    }

    pub fn get_expense(&self, id: &str) -> Result<Expense> {
        let id = ExpenseId::from_str(id)?;
        self.store
            .find_expense_by_id(id)
            .ok_or_else(|| SplitError::NotFound { id: id.to_string() })
    }

    /// One page of expenses in insertion order.
    pub fn list_expenses(&self, skip: usize, limit: usize) -> Vec<Expense> {
        self.store.list_expenses(skip, limit)
    }

    /// Applies a partial update. The merged record is fully re-validated;
    /// on failure the stored record is left untouched.
    pub fn update_expense(&mut self, id: &str, update: &ExpenseUpdate) -> Result<Expense> {
        let id = ExpenseId::from_str(id)?;
        let current = self
            .store
            .find_expense_by_id(id)
            .ok_or_else(|| SplitError::NotFound { id: id.to_string() })?;

        let validated = update.merge(&current).validate()?;
        let updated = self
            .store
            .update_expense(id, validated)
            .ok_or_else(|| SplitError::NotFound { id: id.to_string() })?;

        debug!("Updated expense {}", id);
        Ok(updated)
    }

    pub fn delete_expense(&mut self, id: &str) -> Result<()> {
        let id = ExpenseId::from_str(id)?;
        if !self.store.delete_expense(id) {
            return Err(SplitError::NotFound { id: id.to_string() });
        }
        debug!("Deleted expense {}", id);
        Ok(())
    }

    /// Everyone named as a participant, with how many expenses list them.
    pub fn people(&self) -> Vec<ParticipantCount> {
        self.store.list_distinct_participant_names()
    }

    pub fn balances(&self) -> Vec<PersonBalance> {
        compute_balances(&self.store.list_all_expenses())
    }

    pub fn settlements(&self) -> SettlementPlan {
        compute_settlements(&self.store.list_all_expenses())
    }

    /// Imports expenses from CSV in streaming fashion.
    ///
    /// Rows that fail to parse or validate are logged at warn level and
    /// skipped; every other row is stored.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<ImportSummary> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut summary = ImportSummary::default();

        for (row_idx, result) in csv_reader.deserialize::<ExpenseRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match self.import_row(result, row_num) {
                Ok(expense) => {
                    debug!("Row {}: stored expense {}", row_num, expense.id);
                    summary.imported += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "Imported {} expenses, skipped {} rows",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }

    fn import_row(
        &mut self,
        result: std::result::Result<ExpenseRecord, csv::Error>,
        row: usize,
    ) -> Result<Expense> {
        let invalid = |message: String| SplitError::InvalidRecord { row, message };

        let record = result.map_err(|e| invalid(e.to_string()))?;
        let draft = record.parse().map_err(|e| invalid(e.to_string()))?;
        let validated = draft.validate().map_err(|e| invalid(e.to_string()))?;
        Ok(self.store.insert_expense(validated))
    }

    /// Writes balances as CSV. Money columns carry exactly two decimals.
    pub fn write_balances<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["name", "total_paid", "total_share", "balance"])?;
        for balance in self.balances() {
            csv_writer.write_record([
                balance.name,
                balance.total_paid.to_string(),
                balance.total_share.to_string(),
                balance.balance.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes settlements as CSV, in the order they were matched.
    pub fn write_settlements<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let plan = self.settlements();

        csv_writer.write_record(["from_person", "to_person", "amount"])?;
        for settlement in &plan.settlements {
            csv_writer.write_record([
                settlement.from_person.as_str(),
                settlement.to_person.as_str(),
                settlement.amount.to_string().as_str(),
            ])?;
        }

        if !plan.written_off.is_zero() {
            info!("Rounding residue written off: {}", plan.written_off);
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_people<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["name", "count"])?;
        for person in self.people() {
            csv_writer.write_record([person.name, person.count.to_string()])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes stored expenses as CSV, ids included, in the import format.
    pub fn write_expenses<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "description",
            "amount",
            "paid_by",
            "split_type",
            "participants",
            "custom_split",
        ])?;

        for expense in self.store.list_all_expenses() {
            csv_writer.write_record([
                expense.id.to_string(),
                expense.description.clone(),
                expense.amount.to_string(),
                expense.paid_by.clone(),
                expense.split_type.to_string(),
                format_participants(&expense.participants),
                format_custom_split(&expense.custom_split),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
