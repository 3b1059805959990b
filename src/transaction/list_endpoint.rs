//! Defines the endpoints for listing and totalling a user's transactions.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::{
    AppState, Error, Money, UserID,
    extract::QueryParams,
    stores::{SortOrder, TransactionQuery, TransactionStore},
    timezone::get_local_offset,
    transaction::{Transaction, TransactionKind, parse_date},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The store for managing transactions.
    pub transaction_store: Arc<dyn TransactionStore>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string filters for listing transactions. Empty values are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionFilters {
    /// "income", "expense" or "all".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Only transactions with exactly this category.
    pub category: Option<String>,
    /// Only transactions whose description contains this text, ignoring case.
    pub search: Option<String>,
    /// The first day to include, YYYY-MM-DD.
    pub from: Option<String>,
    /// The last day to include, YYYY-MM-DD.
    pub to: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl TransactionFilters {
    /// Convert the filters into a store query sorted newest first.
    ///
    /// Dates are whole days in `local_offset`, and `to` is inclusive.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionKind] or [Error::InvalidDate] for malformed filters.
    pub fn into_query(self, local_offset: UtcOffset) -> Result<TransactionQuery, Error> {
        let kind = match non_empty(&self.kind) {
            None | Some("all") => None,
            Some(kind) => Some(kind.parse::<TransactionKind>()?),
        };

        let occurred_from = non_empty(&self.from)
            .map(parse_date)
            .transpose()?
            .map(|date| date.midnight().assume_offset(local_offset));

        let occurred_before = non_empty(&self.to)
            .map(parse_date)
            .transpose()?
            .and_then(|date| date.next_day())
            .map(|date| date.midnight().assume_offset(local_offset));

        Ok(TransactionQuery {
            kind,
            category: non_empty(&self.category).map(str::to_owned),
            search: non_empty(&self.search).map(str::to_owned),
            occurred_from,
            occurred_before,
            sort_date: Some(SortOrder::Descending),
        })
    }
}

/// Income, expenses and their difference for a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTotals {
    /// The sum of all income.
    pub total_income: Money,
    /// The sum of all expenses.
    pub total_expenses: Money,
    /// Income minus expenses.
    pub total_balance: Money,
}

impl TransactionTotals {
    /// Sum `transactions` by kind.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total_income: Money = transactions
            .iter()
            .filter(|transaction| transaction.is_income())
            .map(|transaction| transaction.amount)
            .sum();
        let total_expenses: Money = transactions
            .iter()
            .filter(|transaction| transaction.is_expense())
            .map(|transaction| transaction.amount)
            .sum();

        Self {
            total_income,
            total_expenses,
            total_balance: total_income - total_expenses,
        }
    }
}

fn query_transactions(
    state: &ListTransactionsState,
    user_id: UserID,
    filters: TransactionFilters,
) -> Result<Vec<Transaction>, Error> {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezone(state.local_timezone.clone()));
    };

    let query = filters.into_query(local_offset)?;

    state.transaction_store.get_query(user_id, &query)
}

/// A route handler that lists the user's transactions newest first.
pub async fn get_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(filters): QueryParams<TransactionFilters>,
) -> Response {
    match query_transactions(&state, user_id, filters) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler that totals the user's transactions matching the filters.
pub async fn get_transaction_totals(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(filters): QueryParams<TransactionFilters>,
) -> Response {
    match query_transactions(&state, user_id, filters) {
        Ok(transactions) => Json(TransactionTotals::from_transactions(&transactions)).into_response(),
        Err(error) => error.into_response(),
    }
}
