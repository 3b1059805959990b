//! Defines the endpoint for creating a new transaction.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error, Money, UserID,
    extract::JsonBody,
    stores::TransactionStore,
    timezone::local_now,
    transaction::{NewTransaction, TransactionKind, parse_occurred_at},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The store for managing transactions.
    pub transaction_store: Arc<dyn TransactionStore>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for creating or editing a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    /// Text detailing the transaction.
    pub description: String,
    /// The amount of money, always positive.
    pub amount: Money,
    /// The category of the transaction.
    pub category: String,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: String,
    /// When the transaction happened, as an RFC 3339 date-time or a YYYY-MM-DD date.
    #[serde(default)]
    pub date: Option<String>,
}

impl TransactionData {
    /// Validate the request body.
    ///
    /// `default_date` is used when the body has no date. Plain dates are taken
    /// as midnight in the offset of `default_date`.
    pub(crate) fn validate(self, default_date: OffsetDateTime) -> Result<NewTransaction, Error> {
        let kind: TransactionKind = self.kind.trim().parse()?;

        let occurred_at = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_occurred_at(raw, default_date.offset())?,
            _ => default_date,
        };

        NewTransaction::new(
            &self.description,
            self.amount,
            &self.category,
            kind,
            occurred_at,
        )
    }
}

/// A route handler for creating a new transaction, responds with the created transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<TransactionData>,
) -> Response {
    let now = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error.into_response(),
    };

    let new_transaction = match data.validate(now) {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_response(),
    };

    match state.transaction_store.create(user_id, new_transaction) {
        Ok(transaction) => {
            tracing::debug!("User {user_id} created transaction {}", transaction.id);
            (StatusCode::CREATED, Json(transaction)).into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_response()
        }
    }
}
