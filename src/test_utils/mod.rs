#![allow(missing_docs)]

use axum::{body::Body, response::Response};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde_json::Value;

use crate::{
    AppState, PasswordHash, UserID,
    user::{NewUser, create_user},
};

/// A password that passes the strength check.
pub(crate) const TEST_PASSWORD: &str = "averylongandsecurepassword";

pub(crate) fn get_test_app_state() -> AppState {
    let db_connection =
        Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(db_connection, "42", "Etc/UTC").expect("Could not create app state.")
}

pub(crate) fn insert_test_user(state: &AppState) -> UserID {
    insert_test_user_with_email(state, "test@test.com")
}

pub(crate) fn insert_test_user_with_email(state: &AppState, email: &str) -> UserID {
    let connection = state.db_connection.lock().unwrap();

    create_user(
        NewUser {
            username: "Test User".to_owned(),
            email: EmailAddress::new_unchecked(email),
            password_hash: PasswordHash::from_raw_password(TEST_PASSWORD, 4).unwrap(),
        },
        &connection,
    )
    .expect("Could not create test user.")
    .id
}

pub(crate) async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body.");

    serde_json::from_slice(&bytes).expect("Response body is not JSON.")
}
