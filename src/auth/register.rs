//! Handles user registration.

use std::str::FromStr;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash, ValidatedPassword,
    auth::{LogInState, log_in::AuthResponse, set_auth_cookie},
    extract::JsonBody,
    user::{NewUser, PublicUser, create_user},
};

/// The data sent by the client to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    /// The name shown to the user.
    pub username: String,
    /// The email address to log in with.
    pub email: String,
    /// The password to log in with.
    pub password: String,
}

/// Handler for registering a new user.
///
/// On success the new user is logged in and returned with the status 201.
///
/// # Errors
///
/// Responds with a:
/// - [Error::EmptyField] if the username is blank,
/// - [Error::InvalidEmail] if the email address is malformed,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::DuplicateEmail] if the email address is already registered.
pub async fn register_user(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    JsonBody(data): JsonBody<RegisterData>,
) -> Response {
    match register(&state, jar, data) {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

fn register(
    state: &LogInState,
    jar: PrivateCookieJar,
    data: RegisterData,
) -> Result<Response, Error> {
    let username = data.username.trim();
    if username.is_empty() {
        return Err(Error::EmptyField("username"));
    }

    let email = EmailAddress::from_str(data.email.trim())
        .map_err(|_| Error::InvalidEmail(data.email.clone()))?;
    let password = ValidatedPassword::new(&data.password)?;
    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(
            NewUser {
                username: username.to_owned(),
                email,
                password_hash,
            },
            &connection,
        )?
    };

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;
    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: PublicUser::from(&user),
        }),
    )
        .into_response())
}
