//! # Split Engine
//!
//! Tracks shared expenses among a group and works out who owes whom,
//! using as few payments as the greedy matcher can find.
//!
//! ## Design Principles
//!
//! - **Exact decimal arithmetic**: `rust_decimal` throughout, no floats
//! - **Round at the boundary**: shares accumulate unrounded; figures are
//!   rounded to cents only when balances are produced
//! - **Recompute, never cache**: balances and settlements are derived from
//!   the full expense set on every query
//! - **Deterministic output**: every ordering has a name tie-break
//!
//! ## Example
//!
//! ```
//! use split_engine::{ExpenseDraft, ExpenseLedger, MemoryStore, Money};
//! use std::str::FromStr;
//!
//! let mut ledger = ExpenseLedger::new(MemoryStore::new());
//! ledger
//!     .create_expense(
//!         ExpenseDraft::new(Money::from_str("600").unwrap(), "Rent", "A")
//!             .with_participants(["A", "B", "C"]),
//!     )
//!     .unwrap();
//!
//! let plan = ledger.settlements();
//! assert_eq!(plan.settlements.len(), 2);
//! assert_eq!(plan.settlements[0].from_person, "B");
//! assert_eq!(plan.settlements[0].amount.to_string(), "200.00");
//! ```

pub mod balance;
pub mod error;
pub mod expense;
pub mod ledger;
pub mod money;
pub mod settlement;
pub mod split;
pub mod store;

pub use balance::{compute_balances, PersonBalance, PersonPosition};
pub use error::{Result, SplitError, ValidationError};
pub use expense::{
    CustomSplit, Expense, ExpenseDraft, ExpenseId, ExpenseRecord, ExpenseUpdate, SplitType,
    ValidatedExpense,
};
pub use ledger::{ExpenseLedger, ImportSummary};
pub use money::Money;
pub use settlement::{compute_settlements, minimize, Settlement, SettlementPlan};
pub use split::{resolve_split, Shares};
pub use store::{MemoryStore, ParticipantCount, RecordStore};
