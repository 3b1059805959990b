use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, Error, UserID, budget::BudgetId, stores::BudgetStore};

/// The state needed to delete a budget.
#[derive(Debug, Clone)]
pub struct DeleteBudgetState {
    /// The store for managing budgets.
    pub budget_store: Arc<dyn BudgetStore>,
}

impl FromRef<AppState> for DeleteBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
        }
    }
}

fn delete_budget(state: &DeleteBudgetState, user_id: UserID, budget_id: BudgetId) -> Result<(), Error> {
    let budget = state.budget_store.get(budget_id)?;
    budget.ensure_owned_by(user_id)?;

    state.budget_store.delete(budget_id)
}

/// A route handler for deleting one of the user's budgets.
pub async fn delete_budget_endpoint(
    State(state): State<DeleteBudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    match delete_budget(&state, user_id, budget_id) {
        Ok(()) => {
            tracing::debug!("User {user_id} deleted budget {budget_id}");
            Json(json!({"message": "Budget removed"})).into_response()
        }
        Err(error) => error.into_response(),
    }
}
