//! Handles log-in requests.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::set_auth_cookie,
    extract::JsonBody,
    user::{PublicUser, get_user_by_email},
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub(super) const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client to log in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInData {
    /// The email address the user registered with.
    pub email: String,
    /// The user's password.
    pub password: String,
    /// Keep the user logged in for a week instead of a few minutes.
    #[serde(default)]
    pub remember_me: bool,
}

/// The response body for successful log-in and registration requests.
#[derive(Debug, Serialize)]
pub(crate) struct AuthResponse {
    pub user: PublicUser,
}

/// Handler for log-in requests.
///
/// On success the auth cookie is set and the user is returned.
///
/// # Errors
///
/// Responds with [Error::InvalidCredentials] if the email is not registered or
/// the password is wrong. The two cases are not distinguished.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    JsonBody(credentials): JsonBody<LogInData>,
) -> Response {
    match log_in(&state, jar, credentials) {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

fn log_in(
    state: &LogInState,
    jar: PrivateCookieJar,
    credentials: LogInData,
) -> Result<Response, Error> {
    let email = EmailAddress::from_str(credentials.email.trim()).map_err(|_| {
        tracing::debug!("Log-in attempt with malformed email {}", credentials.email);
        Error::InvalidCredentials
    })?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    if !user.password_hash.verify(&credentials.password)? {
        tracing::info!("Failed log-in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let cookie_duration = if credentials.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let jar = set_auth_cookie(jar, user.id, cookie_duration)?;
    tracing::info!("User {} logged in", user.id);

    Ok((
        jar,
        Json(AuthResponse {
            user: PublicUser::from(&user),
        }),
    )
        .into_response())
}
