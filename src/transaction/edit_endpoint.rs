//! Defines the endpoint for replacing the fields of a transaction.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error, UserID,
    extract::JsonBody,
    stores::TransactionStore,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionData, TransactionId},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The store for managing transactions.
    pub transaction_store: Arc<dyn TransactionStore>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for editing a transaction, responds with the updated transaction.
///
/// Every field is replaced. If the body has no date, the transaction keeps its date.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    JsonBody(data): JsonBody<TransactionData>,
) -> Response {
    match edit_transaction(&state, user_id, transaction_id, data) {
        Ok(transaction) => Json(transaction).into_response(),
        Err(error) => error.into_response(),
    }
}

fn edit_transaction(
    state: &EditTransactionState,
    user_id: UserID,
    transaction_id: TransactionId,
    data: TransactionData,
) -> Result<Transaction, Error> {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezone(state.local_timezone.clone()));
    };

    let existing = state.transaction_store.get(user_id, transaction_id)?;
    let updated = data.validate(existing.occurred_at.to_offset(local_offset))?;

    state
        .transaction_store
        .update(user_id, transaction_id, updated)
        .inspect(|_| tracing::debug!("User {user_id} edited transaction {transaction_id}"))
}

#[cfg(test)]
mod edit_transaction_tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::datetime;

    use crate::{
        Money, UserID,
        extract::JsonBody,
        test_utils::{body_json, get_test_app_state, insert_test_user, insert_test_user_with_email},
        transaction::{
            EditTransactionState, NewTransaction, TransactionData, TransactionKind,
            edit_transaction_endpoint,
        },
    };

    fn edit_state(app_state: &crate::AppState) -> EditTransactionState {
        EditTransactionState {
            transaction_store: app_state.transaction_store.clone(),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn new_data(date: Option<&str>) -> TransactionData {
        TransactionData {
            description: "Rent".to_owned(),
            amount: Money::from_cents(500_00),
            category: "Housing".to_owned(),
            kind: "expense".to_owned(),
            date: date.map(str::to_owned),
        }
    }

    fn insert_transaction(app_state: &crate::AppState, owner: UserID) -> i64 {
        app_state
            .transaction_store
            .create(
                owner,
                NewTransaction::new(
                    "Salary",
                    Money::from_cents(1000_00),
                    "Work",
                    TransactionKind::Income,
                    datetime!(2024-03-01 09:00 UTC),
                )
                .unwrap(),
            )
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn replaces_all_fields() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        let id = insert_transaction(&app_state, user_id);

        let response = edit_transaction_endpoint(
            State(edit_state(&app_state)),
            Extension(user_id),
            Path(id),
            JsonBody(new_data(Some("2024-03-02T10:00:00Z"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let got = app_state.transaction_store.get(user_id, id).unwrap();
        assert_eq!(got.description, "Rent");
        assert_eq!(got.amount, Money::from_cents(500_00));
        assert_eq!(got.category, "Housing");
        assert_eq!(got.kind, TransactionKind::Expense);
        assert_eq!(got.occurred_at, datetime!(2024-03-02 10:00 UTC));
    }

    #[tokio::test]
    async fn missing_date_keeps_existing_date() {
        let app_state = get_test_app_state();
        let user_id = insert_test_user(&app_state);
        let id = insert_transaction(&app_state, user_id);

        let response = edit_transaction_endpoint(
            State(edit_state(&app_state)),
            Extension(user_id),
            Path(id),
            JsonBody(new_data(None)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["date"], "2024-03-01T09:00:00Z");
    }

    #[tokio::test]
    async fn cannot_edit_another_users_transaction() {
        let app_state = get_test_app_state();
        let owner = insert_test_user(&app_state);
        let intruder = insert_test_user_with_email(&app_state, "intruder@example.com");
        let id = insert_transaction(&app_state, owner);

        let response = edit_transaction_endpoint(
            State(edit_state(&app_state)),
            Extension(intruder),
            Path(id),
            JsonBody(new_data(None)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Transaction not found");
        let unchanged = app_state.transaction_store.get(owner, id).unwrap();
        assert_eq!(unchanged.description, "Salary");
    }
}
