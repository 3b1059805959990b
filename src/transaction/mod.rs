//! Transactions: the income and expenses recorded by a user.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for validating new and updated transactions
//! - Route handlers for listing, totalling, creating, editing and deleting transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    NewTransaction, Transaction, TransactionId, TransactionKind, parse_date, parse_occurred_at,
};
pub use create_endpoint::{CreateTransactionState, TransactionData, create_transaction_endpoint};
pub use delete_endpoint::{DeleteTransactionState, delete_transaction_endpoint};
pub use edit_endpoint::{EditTransactionState, edit_transaction_endpoint};
pub use list_endpoint::{
    ListTransactionsState, TransactionFilters, TransactionTotals, get_transaction_totals,
    get_transactions_endpoint,
};
