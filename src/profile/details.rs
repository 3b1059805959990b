//! Defines the endpoints for reading and updating the user's profile.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, UserID,
    extract::JsonBody,
    profile::{ProfileStats, load_profile_stats},
    stores::{BudgetStore, TransactionStore},
    user::{ProfileUpdate, PublicUser, get_user_by_id, update_profile},
};

/// The state needed for the profile endpoints.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The store for reading the user's transactions.
    pub transaction_store: Arc<dyn TransactionStore>,
    /// The store for reading the user's budgets.
    pub budget_store: Arc<dyn BudgetStore>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            transaction_store: state.transaction_store.clone(),
            budget_store: state.budget_store.clone(),
        }
    }
}

/// The user's public details together with their usage statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileResponse {
    /// The user's public details.
    pub user: PublicUser,
    /// How much the user has used the application.
    pub stats: ProfileStats,
}

/// The request body for updating the profile. Missing fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileData {
    /// The new display name. Blank names are ignored.
    #[serde(default)]
    pub name: Option<String>,
    /// The new display currency. Blank currencies are ignored.
    #[serde(default)]
    pub currency: Option<String>,
    /// Whether to send email notifications.
    #[serde(default)]
    pub notification: Option<bool>,
    /// Whether biometric log-in is enabled.
    #[serde(default)]
    pub biometric: Option<bool>,
}

impl From<ProfileData> for ProfileUpdate {
    fn from(data: ProfileData) -> Self {
        Self {
            username: non_blank(data.name),
            currency: non_blank(data.currency),
            email_notifications: data.notification,
            biometric_login: data.biometric,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn get_profile_response(state: &ProfileState, user_id: UserID) -> Result<ProfileResponse, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_id(user_id, &connection)?
    };

    let stats = load_profile_stats(
        state.transaction_store.as_ref(),
        state.budget_store.as_ref(),
        user_id,
    )?;

    Ok(ProfileResponse {
        user: PublicUser::from(&user),
        stats,
    })
}

/// A route handler for the user's profile and usage statistics.
pub async fn get_profile(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match get_profile_response(&state, user_id) {
        Ok(profile) => Json(profile).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for updating the user's display name, currency and settings.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<ProfileData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_profile(user_id, data.into(), &connection) {
        Ok(user) => Json(PublicUser::from(&user)).into_response(),
        Err(error) => error.into_response(),
    }
}
