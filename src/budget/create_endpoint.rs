//! Defines the endpoint for creating a budget.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, Money, UserID,
    aggregation::{BudgetView, compute_budget_views},
    budget::NewBudget,
    extract::JsonBody,
    stores::{BudgetStore, TransactionQuery, TransactionStore},
    transaction::TransactionKind,
};

/// The state needed to create a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    /// The store for managing budgets.
    pub budget_store: Arc<dyn BudgetStore>,
    /// The store for reading the expenses already made in the budget's category.
    pub transaction_store: Arc<dyn TransactionStore>,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// The request body for creating a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetData {
    /// The category of expenses to limit.
    pub category: String,
    /// The most the user wants to spend in the category.
    pub limit: Money,
}

fn create_budget(
    state: &CreateBudgetState,
    user_id: UserID,
    data: BudgetData,
) -> Result<BudgetView, Error> {
    let new_budget = NewBudget::new(&data.category, data.limit)?;
    let budget = state.budget_store.create(user_id, new_budget)?;
    tracing::debug!("User {user_id} created budget {} for {}", budget.id, budget.category);

    let expenses = state.transaction_store.get_query(
        user_id,
        &TransactionQuery {
            kind: Some(TransactionKind::Expense),
            category: Some(budget.category.clone()),
            ..Default::default()
        },
    )?;

    compute_budget_views(std::slice::from_ref(&budget), &expenses)
        .pop()
        .ok_or(Error::BudgetNotFound)
}

/// A route handler for creating a budget, responds with the budget and how much
/// has already been spent in its category.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<BudgetData>,
) -> Response {
    match create_budget(&state, user_id, data) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod create_budget_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        AppState, Money,
        budget::{BudgetData, CreateBudgetState, create_budget_endpoint},
        extract::JsonBody,
        test_utils::{body_json, get_test_app_state, insert_test_user, insert_test_user_with_email},
        transaction::{NewTransaction, TransactionKind},
    };

    fn create_state(app_state: &AppState) -> CreateBudgetState {
        CreateBudgetState {
            budget_store: app_state.budget_store.clone(),
            transaction_store: app_state.transaction_store.clone(),
        }
    }

    fn data(category: &str, cents: i64) -> BudgetData {
        BudgetData {
            category: category.to_owned(),
            limit: Money::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn creates_budget_with_existing_spending() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        app_state
            .transaction_store
            .create(
                user_id,
                NewTransaction::new(
                    "Groceries",
                    Money::from_cents(25_00),
                    "Food",
                    TransactionKind::Expense,
                    datetime!(2024-03-05 12:00 UTC),
                )
                .unwrap(),
            )
            .unwrap();

        let response = create_budget_endpoint(
            State(create_state(&app_state)),
            Extension(user_id),
            JsonBody(data(" Food ", 100_00)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["category"], "Food");
        assert_eq!(body["limit"], json!(100.0));
        assert_eq!(body["spent"], json!(25.0));
        assert_eq!(body["progress"], json!(25.0));
    }

    #[tokio::test]
    async fn rejects_duplicate_category() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        let state = create_state(&app_state);
        create_budget_endpoint(State(state.clone()), Extension(user_id), JsonBody(data("Food", 100_00))).await;

        let response =
            create_budget_endpoint(State(state), Extension(user_id), JsonBody(data("Food", 50_00)))
                .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await,
            json!({
                "message": "A budget for 'Food' already exists. Please edit it instead.",
                "kind": "conflict"
            })
        );
    }

    #[tokio::test]
    async fn same_category_allowed_for_different_users() {
        let app_state = get_test_app_state();
        let alice = insert_test_user(&app_state);
        let bob = insert_test_user_with_email(&app_state, "bob@example.com");
        let state = create_state(&app_state);

        let first =
            create_budget_endpoint(State(state.clone()), Extension(alice), JsonBody(data("Food", 100_00)))
                .await;
        let second =
            create_budget_endpoint(State(state), Extension(bob), JsonBody(data("Food", 100_00))).await;

        assert_eq!(first.status(), StatusCode::CREATED);
        assert_eq!(second.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn rejects_non_positive_limit() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);

        let response = create_budget_endpoint(
            State(create_state(&app_state)),
            Extension(user_id),
            JsonBody(data("Food", 0)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Limit must be greater than 0"
        );
    }
}
