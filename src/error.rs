//! Error types for the split engine.

use crate::money::Money;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SplitError>;

/// Reasons an expense write is rejected.
///
/// Each variant names the constraint that failed and, where one exists,
/// the observed value next to the expected one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be at least {minimum}, got {amount}")]
    AmountTooSmall { amount: Money, minimum: Money },

    #[error("Amount must be at most {maximum}, got {amount}")]
    AmountTooLarge { amount: Money, maximum: Money },

    #[error("Description cannot be empty")]
    EmptyDescription,

    #[error("Paid by cannot be empty")]
    EmptyPayer,

    #[error("Participant names cannot be empty")]
    EmptyParticipant,

    #[error("Expense must have at least one participant")]
    NoParticipants,

    #[error("Unknown split type '{0}', expected equal, percentage or exact")]
    UnknownSplitType(String),

    #[error("Missing split value for participant: {participant}")]
    MissingSplitEntry { participant: String },

    #[error("Split value given for non-participant: {person}")]
    UnknownSplitEntry { person: String },

    #[error("Split value given more than once for: {person}")]
    DuplicateSplitEntry { person: String },

    #[error("Percentage values must sum to 100% (±{tolerance}), got {total}%")]
    PercentageSumMismatch { total: Decimal, tolerance: Money },

    #[error("Exact amounts must sum to {expected} (±{tolerance}), got {total}")]
    ExactSumMismatch {
        expected: Money,
        total: Money,
        tolerance: Money,
    },

    #[error("Invalid decimal value '{value}' for {field}")]
    InvalidNumber { field: String, value: String },

    #[error("Value {value} for {field} is out of range")]
    ValueTooLarge { field: String, value: String },
}

/// Errors that can occur during engine operation.
#[derive(Error, Debug)]
pub enum SplitError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A write was rejected; nothing was stored
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Expense id is well formed but no record carries it
    #[error("Expense with ID {id} not found")]
    NotFound { id: String },

    /// Expense id could not be parsed
    #[error("Invalid expense ID format: {id}")]
    InvalidId { id: String },

    /// Invalid expense record in an import
    #[error("Invalid expense at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Missing command or input file argument
    #[error("Missing argument. Usage: split-engine <balances|settlements|people|expenses> <expenses.csv>")]
    MissingArgument,

    /// Command is not one the CLI knows
    #[error("Unknown command '{0}'. Expected balances, settlements, people or expenses")]
    UnknownCommand(String),
}
