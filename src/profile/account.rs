//! Defines the endpoint for deleting the user's account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde_json::json;

use crate::{AppState, Error, UserID, auth::invalidate_auth_cookie, user::delete_user};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AccountState> for Key {
    fn from_ref(state: &AccountState) -> Self {
        state.cookie_key.clone()
    }
}

/// A route handler that deletes the user with all of their transactions and
/// budgets, and logs them out.
pub async fn delete_account(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Response {
    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| delete_user(user_id, &connection));

    match result {
        Ok(()) => {
            tracing::info!("Deleted user {user_id}");
            (
                invalidate_auth_cookie(jar),
                Json(json!({"message": "Account deleted successfully"})),
            )
                .into_response()
        }
        Err(error) => error.into_response(),
    }
}
