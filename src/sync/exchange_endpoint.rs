//! Defines the endpoint for exchanging a public token for an access credential
//! and running the initial sync.

use axum::{Extension, extract::State};
use serde::Deserialize;

use crate::{
    Error, UserId,
    enrollment::{NewEnrollment, upsert_enrollment},
    extract::Json,
    sync::{enroll_endpoint::SyncResponse, orchestrator::run_full_sync, state::SyncState},
};

/// The request body for exchanging a public token.
#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    /// The short-lived public token issued by the aggregator's link flow.
    pub public_token: String,
}

/// A route handler that exchanges a public token for an access credential,
/// stores the resulting enrollment, and syncs its accounts.
///
/// # Errors
/// Responds with a 500 JSON error if the exchange fails, the credential
/// cannot be stored, or the initial account fetch fails.
pub async fn exchange_token_endpoint(
    State(state): State<SyncState>,
    Extension(user_id): Extension<UserId>,
    Json(request): Json<ExchangeRequest>,
) -> Result<Json<SyncResponse>, Error> {
    let credential = state
        .aggregator
        .exchange_public_token(&request.public_token)
        .await?;

    let new_enrollment = NewEnrollment {
        aggregator: state.aggregator.name().to_owned(),
        item_id: credential.item_id,
        access_token: credential.access_token.clone(),
        institution_name: None,
    };

    {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLock
        })?;
        upsert_enrollment(&new_enrollment, &user_id, &connection)?;
    }

    let summary = run_full_sync(
        state.aggregator.as_ref(),
        &credential.access_token,
        &user_id,
        &state.db_connection,
    )
    .await?;

    Ok(Json(SyncResponse {
        success: true,
        summary,
    }))
}
