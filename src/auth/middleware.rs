//! Authentication middleware that validates bearer tokens against the session
//! table.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;

use crate::{AppState, Error, auth::session::get_session_user};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The database connection holding the session table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that checks for a valid `Authorization: Bearer` token.
/// The user ID is placed into the request and the request executed normally if
/// the session is valid, otherwise a 401 JSON error is returned before any
/// handler (and therefore any upstream aggregator call) runs.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user_id): Extension<UserId>` to receive the user ID.
pub async fn auth_guard(
    State(state): State<AuthState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        tracing::debug!("rejecting request without a bearer token");
        return Error::Unauthorized.into_response();
    };

    let user_id = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return Error::DatabaseLock.into_response();
            }
        };

        match get_session_user(bearer.token(), &connection) {
            Ok(user_id) => user_id,
            Err(error) => return error.into_response(),
        }
    };

    request.extensions_mut().insert(user_id);

    next.run(request).await
}
