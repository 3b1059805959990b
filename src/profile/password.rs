//! Defines the endpoint for changing the user's password.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState, Error, PasswordHash, UserID, ValidatedPassword,
    extract::JsonBody,
    user::{get_user_by_id, update_password},
};

/// The state needed to change a password.
#[derive(Debug, Clone)]
pub struct PasswordState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used to hash the new password.
    pub hash_cost: u32,
}

impl FromRef<AppState> for PasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The request body for changing the password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordData {
    /// The user's password as it is now.
    pub current_password: String,
    /// The password to change to.
    pub new_password: String,
}

fn set_new_password(
    state: &PasswordState,
    user_id: UserID,
    data: ChangePasswordData,
) -> Result<(), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    if !user.password_hash.verify(&data.current_password)? {
        return Err(Error::IncorrectPassword);
    }

    let new_password = ValidatedPassword::new(&data.new_password)?;
    let password_hash = PasswordHash::new(new_password, state.hash_cost)?;

    update_password(user_id, &password_hash, &connection)
}

/// A route handler for changing the user's password.
///
/// # Errors
///
/// Responds with a:
/// - [Error::IncorrectPassword] if the current password is wrong,
/// - [Error::TooWeak] if the new password is too easy to guess.
pub async fn change_password(
    State(state): State<PasswordState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<ChangePasswordData>,
) -> Response {
    match set_new_password(&state, user_id, data) {
        Ok(()) => {
            tracing::info!("User {user_id} changed their password");
            Json(json!({"message": "Password updated successfully"})).into_response()
        }
        Err(error) => error.into_response(),
    }
}
