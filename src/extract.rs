//! Extractors that report malformed requests as [Error::InvalidRequest].

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// A JSON request body. Bodies that fail to parse are answered with a
/// validation error instead of axum's plain text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// A query string. Query strings that fail to parse are answered with a
/// validation error instead of axum's plain text rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);
