//! Defines the endpoint for changing a budget's limit.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, Money, UserID,
    budget::{Budget, BudgetId, validate_limit},
    extract::JsonBody,
    stores::BudgetStore,
};

/// The state needed to edit a budget.
#[derive(Debug, Clone)]
pub struct EditBudgetState {
    /// The store for managing budgets.
    pub budget_store: Arc<dyn BudgetStore>,
}

impl FromRef<AppState> for EditBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
        }
    }
}

/// The request body for changing a budget's limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLimitData {
    /// The new limit.
    pub limit: Money,
}

fn edit_budget(
    state: &EditBudgetState,
    user_id: UserID,
    budget_id: BudgetId,
    limit: Money,
) -> Result<Budget, Error> {
    let budget = state.budget_store.get(budget_id)?;
    budget.ensure_owned_by(user_id)?;
    let limit = validate_limit(limit)?;

    state.budget_store.update_limit(budget_id, limit)
}

/// A route handler for changing the limit of one of the user's budgets.
pub async fn edit_budget_endpoint(
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
    JsonBody(data): JsonBody<BudgetLimitData>,
) -> Response {
    match edit_budget(&state, user_id, budget_id, data.limit) {
        Ok(budget) => Json(budget).into_response(),
        Err(error) => error.into_response(),
    }
}
