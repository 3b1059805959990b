//! SpendWise is a personal finance tracker.
//!
//! Users record income and expense transactions, set spending limits per
//! category and see where their money goes on a dashboard. This library
//! provides the JSON API and the aggregation engine behind it: category
//! totals, budget progress and calendar-month summaries computed from a
//! user's transaction log.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod aggregation;
mod app_state;
mod auth;
mod budget;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod extract;
mod logging;
mod money;
mod password;
mod profile;
mod routing;
mod stores;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use aggregation::{
    BudgetStatus, BudgetSummary, BudgetView, DashboardSummary, MonthBucket,
    compute_budget_views, compute_dashboard_summary, summarize_budgets,
};
pub use app_state::AppState;
pub use budget::{Budget, BudgetId, NewBudget};
pub use db::initialize as initialize_db;
pub use error::{Error, ErrorKind, error_detail_middleware};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::{Money, Percentage};
pub use password::{PasswordHash, ValidatedPassword};
pub use profile::{ProfileStats, compute_profile_stats};
pub use routing::build_router;
pub use stores::{
    BudgetStore, SortOrder, TransactionQuery, TransactionStore,
    sqlite::{SQLiteBudgetStore, SQLiteTransactionStore},
};
pub use timezone::get_local_offset;
pub use transaction::{NewTransaction, Transaction, TransactionId, TransactionKind};
pub use user::{
    NewUser, User, UserID, count_users, create_user, get_user_by_email, get_user_by_id,
    update_password,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
