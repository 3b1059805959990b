//! SQLite implementations of the store traits.

mod budget;
mod transaction;

pub use budget::{SQLiteBudgetStore, create_budget_table};
pub use transaction::{SQLiteTransactionStore, create_transaction_table};
