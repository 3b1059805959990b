//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    extract::{
        Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Money;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid, unexpired auth token.
    #[error("not authorized, no valid token")]
    Unauthenticated,

    /// The current password given when changing passwords was wrong.
    #[error("current password is incorrect")]
    IncorrectPassword,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The email address is already used by another user.
    #[error("a user with the email {0} already exists")]
    DuplicateEmail(String),

    /// An amount could not be parsed or is not a usable number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A transaction amount was zero or negative.
    #[error("amount must be greater than 0")]
    NonPositiveAmount,

    /// A budget limit was zero or negative.
    #[error("Limit must be greater than 0")]
    NonPositiveLimit,

    /// A transaction amount was larger than [Money::MAX].
    #[error("amount must not be more than {max}", max = Money::MAX)]
    AmountTooLarge,

    /// A budget limit was larger than [Money::MAX].
    #[error("Limit must not be more than {max}", max = Money::MAX)]
    LimitTooLarge,

    /// A required text field was missing or blank.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// The transaction type was something other than "income" or "expense".
    #[error("Type must be \"income\" or \"expense\", got \"{0}\"")]
    InvalidTransactionKind(String),

    /// A date or date-time string could not be parsed.
    #[error("invalid date \"{0}\", expected an RFC 3339 date-time or a YYYY-MM-DD date")]
    InvalidDate(String),

    /// The budget status filter was not one of the known statuses.
    #[error("invalid budget status \"{0}\"")]
    InvalidBudgetStatus(String),

    /// Data export was requested in a format other than CSV.
    #[error("unsupported export format \"{0}\"")]
    UnsupportedExportFormat(String),

    /// The request body or query string could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The transaction does not exist or belongs to another user.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// The budget does not exist.
    #[error("Budget not found")]
    BudgetNotFound,

    /// The user tried to modify a resource owned by another user.
    #[error("Not authorized")]
    Forbidden,

    /// The user already has a budget for the category.
    #[error("A budget for '{0}' already exists. Please edit it instead.")]
    DuplicateBudgetCategory(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The auth token could not be serialized or the cookie expiry computed.
    #[error("could not create auth token: {0}")]
    TokenError(String),

    /// Writing the CSV export failed.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

/// The classification of an [Error] as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A missing or invalid field.
    Validation,
    /// Missing or invalid credentials.
    Unauthorized,
    /// The resource belongs to someone else.
    Forbidden,
    /// The resource does not exist.
    NotFound,
    /// The request clashes with existing data.
    Conflict,
    /// Something went wrong on the server.
    Internal,
}

impl ErrorKind {
    fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Error {
    /// How the error is classified for clients.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCredentials | Error::Unauthenticated | Error::IncorrectPassword => {
                ErrorKind::Unauthorized
            }
            Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::InvalidAmount(_)
            | Error::NonPositiveAmount
            | Error::NonPositiveLimit
            | Error::AmountTooLarge
            | Error::LimitTooLarge
            | Error::EmptyField(_)
            | Error::InvalidTransactionKind(_)
            | Error::InvalidDate(_)
            | Error::InvalidBudgetStatus(_)
            | Error::UnsupportedExportFormat(_)
            | Error::InvalidRequest(_) => ErrorKind::Validation,
            Error::NotFound | Error::TransactionNotFound | Error::BudgetNotFound => {
                ErrorKind::NotFound
            }
            Error::Forbidden => ErrorKind::Forbidden,
            Error::DuplicateEmail(_) | Error::DuplicateBudgetCategory(_) => ErrorKind::Conflict,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::TokenError(_)
            | Error::CsvError(_)
            | Error::InvalidTimezone(_) => ErrorKind::Internal,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

/// The message sent to clients in place of internal error details.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "An unexpected error occurred, check the server logs for more details.";

/// The JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

/// The text of an internal error, attached to the response so that
/// [error_detail_middleware] can expose it in development mode.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();

        if kind == ErrorKind::Internal {
            tracing::error!("An unexpected error occurred: {}", self);

            let mut response = (
                kind.status_code(),
                Json(ErrorBody {
                    message: INTERNAL_ERROR_MESSAGE,
                    kind,
                    detail: None,
                }),
            )
                .into_response();
            response
                .extensions_mut()
                .insert(ErrorDetail(self.to_string()));

            return response;
        }

        let message = self.to_string();

        (
            kind.status_code(),
            Json(ErrorBody {
                message: &message,
                kind,
                detail: None,
            }),
        )
            .into_response()
    }
}

/// Middleware that adds the underlying error text to internal error responses.
///
/// Only install this in development mode.
pub async fn error_detail_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    (
        response.status(),
        Json(ErrorBody {
            message: INTERNAL_ERROR_MESSAGE,
            kind: ErrorKind::Internal,
            detail: Some(&detail),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod error_response_tests {
    use axum::{
        Router, body::Body, http::StatusCode, middleware, response::IntoResponse, routing::get,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{Error, INTERNAL_ERROR_MESSAGE, error_detail_middleware};

    async fn body_json(response: axum::response::Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn too_large_amount_names_the_maximum() {
        let response = Error::AmountTooLarge.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"message": "amount must not be more than 100000000000.00", "kind": "validation"})
        );
    }

    #[tokio::test]
    async fn validation_error_is_bad_request() {
        let response = Error::NonPositiveLimit.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Limit must be greater than 0", "kind": "validation"})
        );
    }

    #[tokio::test]
    async fn duplicate_budget_is_conflict() {
        let response = Error::DuplicateBudgetCategory("Food".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await,
            json!({
                "message": "A budget for 'Food' already exists. Please edit it instead.",
                "kind": "conflict"
            })
        );
    }

    #[tokio::test]
    async fn ownership_errors_map_to_expected_status() {
        assert_eq!(
            Error::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::BudgetNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let response = Error::DatabaseLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"message": INTERNAL_ERROR_MESSAGE, "kind": "internal"})
        );
    }

    async fn failing_handler() -> Error {
        Error::CsvError("disk full".to_owned())
    }

    #[tokio::test]
    async fn detail_middleware_exposes_internal_error_text() {
        let app = Router::new()
            .route("/fail", get(failing_handler))
            .layer(middleware::from_fn(error_detail_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get("/fail").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({
            "message": INTERNAL_ERROR_MESSAGE,
            "kind": "internal",
            "detail": "could not write CSV: disk full"
        }));
    }

    #[tokio::test]
    async fn detail_middleware_leaves_client_errors_alone() {
        let app = Router::new()
            .route("/missing", get(|| async { Error::BudgetNotFound }))
            .layer(middleware::from_fn(error_detail_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get("/missing").await;

        response.assert_status_not_found();
        response.assert_json(&json!({"message": "Budget not found", "kind": "not_found"}));
    }
}
