//! Defines the endpoint for creating an aggregator link token.

use axum::{Extension, Json, extract::State};
use serde::Serialize;

use crate::{Error, UserId, sync::state::SyncState};

/// The response body for a created link token.
#[derive(Debug, Serialize)]
pub struct LinkTokenResponse {
    /// The token the client-side link flow opens with.
    pub link_token: String,
}

/// A route handler that asks the aggregator for a link token bound to the
/// caller's user ID.
///
/// # Errors
/// Responds with a 500 JSON error if the aggregator call fails, or a 404 for
/// aggregators whose link flow does not use server-issued tokens.
pub async fn create_link_token_endpoint(
    State(state): State<SyncState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<LinkTokenResponse>, Error> {
    let link_token = state.aggregator.create_link_token(&user_id).await?;

    Ok(Json(LinkTokenResponse { link_token }))
}
