//! Defines the endpoints for listing budgets with their progress and summarising them.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    aggregation::{BudgetStatus, BudgetView, compute_budget_views, summarize_budgets},
    extract::QueryParams,
    stores::{BudgetStore, TransactionQuery, TransactionStore},
    transaction::TransactionKind,
};

/// The state needed to list budgets.
#[derive(Debug, Clone)]
pub struct ListBudgetsState {
    /// The store for managing budgets.
    pub budget_store: Arc<dyn BudgetStore>,
    /// The store for reading the expenses counted against budgets.
    pub transaction_store: Arc<dyn TransactionStore>,
}

impl FromRef<AppState> for ListBudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// Fetch the user's budgets and expenses and compute how much of each budget has been spent.
///
/// # Errors
/// Returns an error if either store fails.
pub fn load_budget_views(
    budget_store: &dyn BudgetStore,
    transaction_store: &dyn TransactionStore,
    user_id: UserID,
) -> Result<Vec<BudgetView>, Error> {
    let budgets = budget_store.get_by_owner(user_id)?;
    let expenses = transaction_store.get_query(
        user_id,
        &TransactionQuery {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        },
    )?;

    Ok(compute_budget_views(&budgets, &expenses))
}

/// The query string for listing budgets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetListQuery {
    /// "all", "active", "completed" or "exceeded". Missing or empty means all.
    pub status: Option<String>,
}

impl BudgetListQuery {
    fn status(&self) -> Result<Option<BudgetStatus>, Error> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some("active") => Ok(Some(BudgetStatus::Active)),
            Some("completed") => Ok(Some(BudgetStatus::Completed)),
            Some("exceeded") => Ok(Some(BudgetStatus::Exceeded)),
            Some(other) => Err(Error::InvalidBudgetStatus(other.to_owned())),
        }
    }
}

fn list_budgets(
    state: &ListBudgetsState,
    user_id: UserID,
    query: &BudgetListQuery,
) -> Result<Vec<BudgetView>, Error> {
    let status = query.status()?;
    let views = load_budget_views(
        state.budget_store.as_ref(),
        state.transaction_store.as_ref(),
        user_id,
    )?;

    let Some(status) = status else {
        return Ok(views);
    };

    Ok(views
        .into_iter()
        .filter(|view| view.status() == Some(status))
        .collect())
}

/// A route handler that lists the user's budgets with how much has been spent against each.
pub async fn get_budgets_endpoint(
    State(state): State<ListBudgetsState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<BudgetListQuery>,
) -> Response {
    match list_budgets(&state, user_id, &query) {
        Ok(views) => Json(views).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for the totals across all of the user's budgets.
pub async fn get_budget_summary(
    State(state): State<ListBudgetsState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match load_budget_views(
        state.budget_store.as_ref(),
        state.transaction_store.as_ref(),
        user_id,
    ) {
        Ok(views) => Json(summarize_budgets(&views)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod list_budgets_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        AppState, Money, UserID,
        budget::{BudgetListQuery, ListBudgetsState, NewBudget, get_budget_summary, get_budgets_endpoint},
        extract::QueryParams,
        test_utils::{body_json, get_test_app_state, insert_test_user, insert_test_user_with_email},
        transaction::{NewTransaction, TransactionKind},
    };

    fn list_state(app_state: &AppState) -> ListBudgetsState {
        ListBudgetsState {
            budget_store: app_state.budget_store.clone(),
            transaction_store: app_state.transaction_store.clone(),
        }
    }

    fn add_transaction(app_state: &AppState, owner: UserID, category: &str, cents: i64, kind: TransactionKind) {
        app_state
            .transaction_store
            .create(
                owner,
                NewTransaction::new(
                    "test",
                    Money::from_cents(cents),
                    category,
                    kind,
                    datetime!(2024-03-05 12:00 UTC),
                )
                .unwrap(),
            )
            .unwrap();
    }

    fn add_budget(app_state: &AppState, owner: UserID, category: &str, cents: i64) {
        app_state
            .budget_store
            .create(owner, NewBudget::new(category, Money::from_cents(cents)).unwrap())
            .unwrap();
    }

    /// Food is exceeded, Rent is exactly spent and Travel is active.
    fn seed(app_state: &AppState, owner: UserID) {
        add_budget(app_state, owner, "Food", 100_00);
        add_budget(app_state, owner, "Rent", 900_00);
        add_budget(app_state, owner, "Travel", 50_00);
        add_transaction(app_state, owner, "Food", 120_00, TransactionKind::Expense);
        add_transaction(app_state, owner, "Food", 30_00, TransactionKind::Expense);
        add_transaction(app_state, owner, "Food", 1000_00, TransactionKind::Income);
        add_transaction(app_state, owner, "Rent", 900_00, TransactionKind::Expense);
    }

    async fn list(app_state: &AppState, user_id: UserID, status: Option<&str>) -> serde_json::Value {
        let response = get_budgets_endpoint(
            State(list_state(app_state)),
            Extension(user_id),
            QueryParams(BudgetListQuery {
                status: status.map(str::to_owned),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    fn categories(body: &serde_json::Value) -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|budget| budget["category"].as_str().unwrap().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn lists_budgets_with_spent_and_progress() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        seed(&app_state, user_id);

        let body = list(&app_state, user_id, None).await;

        assert_eq!(categories(&body), ["Food", "Rent", "Travel"]);
        assert_eq!(body[0]["spent"], json!(150.0));
        assert_eq!(body[0]["progress"], json!(150.0));
        assert_eq!(body[1]["progress"], json!(100.0));
        assert_eq!(body[2]["spent"], json!(0.0));
    }

    #[tokio::test]
    async fn filters_by_status() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        seed(&app_state, user_id);

        assert_eq!(categories(&list(&app_state, user_id, Some("all")).await), ["Food", "Rent", "Travel"]);
        assert_eq!(categories(&list(&app_state, user_id, Some("active")).await), ["Travel"]);
        assert_eq!(categories(&list(&app_state, user_id, Some("completed")).await), ["Rent"]);
        assert_eq!(categories(&list(&app_state, user_id, Some("exceeded")).await), ["Food"]);
    }

    #[tokio::test]
    async fn unknown_status_is_bad_request() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);

        let response = get_budgets_endpoint(
            State(list_state(&app_state)),
            Extension(user_id),
            QueryParams(BudgetListQuery {
                status: Some("paused".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn other_users_data_is_not_counted() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        let other_user = insert_test_user_with_email(&app_state, "other@example.com");
        add_budget(&app_state, user_id, "Food", 100_00);
        add_budget(&app_state, other_user, "Food", 100_00);
        add_transaction(&app_state, other_user, "Food", 99_00, TransactionKind::Expense);

        let body = list(&app_state, user_id, None).await;

        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["spent"], json!(0.0));
    }

    #[tokio::test]
    async fn summary_totals_budgets() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        seed(&app_state, user_id);

        let response = get_budget_summary(State(list_state(&app_state)), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "budgetCount": 3,
                "activeBudgets": 1,
                "totalLimit": 1050.0,
                "totalSpent": 1050.0,
                "remaining": 0.0
            })
        );
    }
}
