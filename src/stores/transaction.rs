//! Defines the transaction store trait.

use std::fmt::Debug;

use time::OffsetDateTime;

use crate::{
    Error, UserID,
    transaction::{NewTransaction, Transaction, TransactionId, TransactionKind},
};

/// Handles the creation and retrieval of a user's transactions.
///
/// Every method is scoped to the owner: a transaction owned by another user
/// is reported as [Error::TransactionNotFound].
pub trait TransactionStore: Debug + Send + Sync {
    /// Create a new transaction for `owner`.
    fn create(&self, owner: UserID, transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Retrieve one of `owner`'s transactions.
    fn get(&self, owner: UserID, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve `owner`'s transactions in the way defined by `query`.
    fn get_query(&self, owner: UserID, query: &TransactionQuery)
    -> Result<Vec<Transaction>, Error>;

    /// Replace every field of one of `owner`'s transactions.
    fn update(
        &self,
        owner: UserID,
        id: TransactionId,
        transaction: NewTransaction,
    ) -> Result<Transaction, Error>;

    /// Delete one of `owner`'s transactions.
    fn delete(&self, owner: UserID, id: TransactionId) -> Result<(), Error>;
}

/// Defines how transactions should be fetched from [TransactionStore::get_query].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Only include income or only include expenses.
    pub kind: Option<TransactionKind>,
    /// Only include transactions with exactly this category.
    pub category: Option<String>,
    /// Only include transactions whose description contains this text, ignoring case.
    pub search: Option<String>,
    /// Only include transactions that happened at or after this time.
    pub occurred_from: Option<OffsetDateTime>,
    /// Only include transactions that happened strictly before this time.
    pub occurred_before: Option<OffsetDateTime>,
    /// Orders transactions by date in the order `sort_date`. None returns transactions in the
    /// order they are stored.
    pub sort_date: Option<SortOrder>,
}

impl TransactionQuery {
    /// A query for all transactions, newest first.
    pub fn newest_first() -> Self {
        Self {
            sort_date: Some(SortOrder::Descending),
            ..Default::default()
        }
    }
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}
