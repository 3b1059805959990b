//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::{
    AppState, Error,
    auth::{auth_guard, post_log_in, post_log_out, register_user},
    budget::{
        create_budget_endpoint, delete_budget_endpoint, edit_budget_endpoint, get_budget_summary,
        get_budgets_endpoint,
    },
    dashboard::get_dashboard,
    endpoints,
    profile::{
        change_password, delete_account, export_transactions, get_profile, get_profile_stats,
        update_profile_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_totals, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_health))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_TOTALS, get(get_transaction_totals))
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::BUDGET_SUMMARY, get(get_budget_summary))
        .route(
            endpoints::BUDGET,
            put(edit_budget_endpoint).delete(delete_budget_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard))
        .route(
            endpoints::PROFILE,
            get(get_profile).put(update_profile_endpoint),
        )
        .route(endpoints::PROFILE_STATS, get(get_profile_stats))
        .route(endpoints::PASSWORD, put(change_password))
        .route(endpoints::EXPORT, post(export_transactions))
        .route(endpoints::ACCOUNT, delete(delete_account))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Lets clients and uptime checks know the server is up.
async fn get_health() -> &'static str {
    "SpendWise API is running"
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
