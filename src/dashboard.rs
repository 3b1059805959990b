//! Defines the endpoint for the dashboard overview of a user's finances.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error, UserID,
    aggregation::{DashboardSummary, compute_dashboard_summary},
    stores::{BudgetStore, TransactionQuery, TransactionStore},
    timezone::local_now,
};

/// The state needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The store for reading the user's transactions.
    pub transaction_store: Arc<dyn TransactionStore>,
    /// The store for reading the user's budgets.
    pub budget_store: Arc<dyn BudgetStore>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            budget_store: state.budget_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn get_dashboard_summary(
    state: &DashboardState,
    user_id: UserID,
) -> Result<DashboardSummary, Error> {
    let now = local_now(&state.local_timezone)?;
    let transactions = state
        .transaction_store
        .get_query(user_id, &TransactionQuery::newest_first())?;
    let budgets = state.budget_store.get_by_owner(user_id)?;

    Ok(compute_dashboard_summary(&transactions, &budgets, now))
}

/// A route handler for the dashboard summary of the user's transactions and budgets.
pub async fn get_dashboard(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match get_dashboard_summary(&state, user_id) {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod dashboard_endpoint_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use serde_json::json;
    use time::{Duration, OffsetDateTime};

    use crate::{
        AppState, Money, UserID,
        budget::NewBudget,
        dashboard::{DashboardState, get_dashboard},
        test_utils::{body_json, get_test_app_state, insert_test_user, insert_test_user_with_email},
        transaction::{NewTransaction, TransactionKind},
    };

    fn dashboard_state(app_state: &AppState) -> DashboardState {
        DashboardState {
            transaction_store: app_state.transaction_store.clone(),
            budget_store: app_state.budget_store.clone(),
            local_timezone: app_state.local_timezone.clone(),
        }
    }

    fn insert(
        app_state: &AppState,
        user_id: UserID,
        description: &str,
        cents: i64,
        category: &str,
        kind: TransactionKind,
        days_ago: i64,
    ) {
        let occurred_at = OffsetDateTime::now_utc() - Duration::days(days_ago);
        app_state
            .transaction_store
            .create(
                user_id,
                NewTransaction::new(
                    description,
                    Money::from_cents(cents),
                    category,
                    kind,
                    occurred_at,
                )
                .unwrap(),
            )
            .unwrap();
    }

    #[tokio::test]
    async fn empty_dashboard() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);

        let response = get_dashboard(State(dashboard_state(&app_state)), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totalIncome"], json!(0.0));
        assert_eq!(body["totalExpenses"], json!(0.0));
        assert_eq!(body["totalBalance"], json!(0.0));
        assert_eq!(body["topCategory"], "N/A");
        assert_eq!(body["categorySpending"], json!({}));
        assert_eq!(body["monthlyData"].as_array().unwrap().len(), 6);
        assert_eq!(body["topBudgets"], json!([]));
        assert_eq!(body["recentTransactions"], json!([]));
        assert_eq!(body["upcomingBills"], json!([]));
    }

    #[tokio::test]
    async fn summarises_only_the_users_data() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        let other_user = insert_test_user_with_email(&app_state, "other@example.com");
        insert(&app_state, user_id, "Salary", 1000_00, "Salary", TransactionKind::Income, 3);
        insert(&app_state, user_id, "Groceries", 120_00, "Food", TransactionKind::Expense, 2);
        insert(&app_state, user_id, "Power bill", 80_00, "Utilities", TransactionKind::Expense, 1);
        insert(&app_state, other_user, "Lottery", 5000_00, "Windfall", TransactionKind::Income, 1);
        app_state
            .budget_store
            .create(user_id, NewBudget::new("Food", Money::from_cents(100_00)).unwrap())
            .unwrap();

        let response = get_dashboard(State(dashboard_state(&app_state)), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totalIncome"], json!(1000.0));
        assert_eq!(body["totalExpenses"], json!(200.0));
        assert_eq!(body["totalBalance"], json!(800.0));
        assert_eq!(body["topCategory"], "Food");
        assert_eq!(body["categorySpending"], json!({"Utilities": 80.0, "Food": 120.0}));
        assert_eq!(body["topBudgets"][0]["progress"], json!(120.0));
        let recent: Vec<_> = body["recentTransactions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|transaction| transaction["description"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(recent, ["Power bill", "Groceries", "Salary"]);
        assert_eq!(body["upcomingBills"][0]["description"], "Power bill");
    }

    #[tokio::test]
    async fn invalid_timezone_is_internal_error() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        let mut state = dashboard_state(&app_state);
        state.local_timezone = "Middle/Earth".to_owned();

        let response = get_dashboard(State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
