//! JSON request body extraction with the app's error responses.
//!
//! Axum's stock JSON extractor answers an undeserializable body with a 422;
//! this wrapper reports every malformed body as a 400 JSON error in the same
//! `{"error": ...}` shape as the rest of the API.

use axum::{
    extract::{FromRequest, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// A JSON request or response body.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
