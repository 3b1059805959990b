//! Account-level usage statistics.

use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    Error, UserID,
    aggregation::compute_budget_views,
    budget::Budget,
    profile::ProfileState,
    stores::{BudgetStore, TransactionQuery, TransactionStore},
    transaction::Transaction,
};

/// How much a user has used the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    /// The number of transactions the user has recorded, of either kind.
    pub total_transactions: usize,
    /// The number of distinct categories across all of the user's transactions.
    pub categories_used: usize,
    /// The number of budgets that still have room left.
    pub active_budgets: usize,
}

/// Compute the usage statistics for one user's transactions and budgets.
///
/// Categories are compared exactly, so "Food" and "food" count twice. A budget
/// without a positive limit is never counted as active.
pub fn compute_profile_stats(transactions: &[Transaction], budgets: &[Budget]) -> ProfileStats {
    let categories_used = transactions
        .iter()
        .map(|transaction| transaction.category.as_str())
        .collect::<HashSet<_>>()
        .len();

    let active_budgets = compute_budget_views(budgets, transactions)
        .iter()
        .filter(|view| view.is_active())
        .count();

    ProfileStats {
        total_transactions: transactions.len(),
        categories_used,
        active_budgets,
    }
}

/// Fetch the user's transactions and budgets and compute their usage statistics.
///
/// # Errors
/// Returns an error if either store fails.
pub fn load_profile_stats(
    transaction_store: &dyn TransactionStore,
    budget_store: &dyn BudgetStore,
    user_id: UserID,
) -> Result<ProfileStats, Error> {
    let transactions = transaction_store.get_query(user_id, &TransactionQuery::default())?;
    let budgets = budget_store.get_by_owner(user_id)?;

    Ok(compute_profile_stats(&transactions, &budgets))
}

/// A route handler for the user's usage statistics.
pub async fn get_profile_stats(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match load_profile_stats(
        state.transaction_store.as_ref(),
        state.budget_store.as_ref(),
        user_id,
    ) {
        Ok(stats) => Json(stats).into_response(),
        Err(error) => error.into_response(),
    }
}
