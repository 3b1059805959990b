//! Contains traits and implementations for objects that store transactions and budgets.

mod budget;
mod transaction;

pub mod sqlite;

pub use budget::BudgetStore;
pub use transaction::{SortOrder, TransactionQuery, TransactionStore};
