use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, UserID, stores::TransactionStore, transaction::TransactionId};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The store for managing transactions.
    pub transaction_store: Arc<dyn TransactionStore>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// A route handler for deleting one of the user's transactions.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    match state.transaction_store.delete(user_id, transaction_id) {
        Ok(()) => {
            tracing::debug!("User {user_id} deleted transaction {transaction_id}");
            Json(json!({"message": "Transaction deleted successfully"})).into_response()
        }
        Err(error) => error.into_response(),
    }
}
