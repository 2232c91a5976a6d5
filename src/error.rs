//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a bearer token that resolves to a live
    /// session.
    #[error("missing or invalid session token")]
    Unauthorized,

    /// The request body could not be parsed.
    #[error("malformed request body: {0}")]
    BadRequest(String),

    /// An aggregator call failed.
    ///
    /// Carries the upstream status code and response body. The body may
    /// contain account details, so it must only be logged server-side and
    /// never echoed back to the client.
    #[error("aggregator request failed with status {status}")]
    Upstream {
        /// The HTTP status code returned by the aggregator, or 599 if the
        /// request failed before a response was received.
        status: u16,
        /// The upstream response body.
        body: String,
    },

    /// An aggregator response did not have the expected shape, e.g. a JSON
    /// object where a list was required.
    #[error("unexpected aggregator response shape: {0}")]
    Mapping(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
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

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        // 599 when the request never got a response (connect error, timeout).
        let status = value.status().map(|code| code.as_u16()).unwrap_or(599);

        Error::Upstream {
            status,
            body: value.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
            Error::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "The requested resource could not be found".to_owned(),
            ),
            Error::Upstream { status, body } => {
                tracing::error!("aggregator request failed: status {status}, body {body:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The aggregator request failed".to_owned(),
                )
            }
            Error::Mapping(detail) => {
                tracing::error!("could not map aggregator response: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The aggregator returned an unexpected response".to_owned(),
                )
            }
            Error::DatabaseLock | Error::SqlError(_) => {
                tracing::error!("persistence error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, check the server logs".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
