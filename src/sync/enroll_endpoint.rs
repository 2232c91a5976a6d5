//! Defines the endpoint for registering an enrollment and running the initial
//! sync.

use axum::{Extension, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error, UserId,
    enrollment::{NewEnrollment, upsert_enrollment},
    extract::Json,
    sync::{
        orchestrator::{SyncSummary, run_full_sync},
        state::SyncState,
    },
};

/// The request body for registering an enrollment.
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    /// The access token issued by the aggregator's link flow.
    pub access_token: String,
    /// The aggregator's ID for the enrollment, if it reports one.
    pub enrollment_id: Option<String>,
    /// The institution the user linked, if known.
    pub institution_name: Option<String>,
}

/// The response body for a completed sync.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    /// Always true; partial failures are reported in `errors`.
    pub success: bool,
    /// The counts and per-account errors for the run.
    #[serde(flatten)]
    pub summary: SyncSummary,
}

/// A route handler that stores the enrollment credential and syncs its
/// accounts, balances, and transactions.
///
/// # Errors
/// Responds with a 500 JSON error if the credential cannot be stored or the
/// initial account fetch fails.
pub async fn create_enrollment_endpoint(
    State(state): State<SyncState>,
    Extension(user_id): Extension<UserId>,
    Json(request): Json<EnrollRequest>,
) -> Result<Json<SyncResponse>, Error> {
    let new_enrollment = NewEnrollment {
        aggregator: state.aggregator.name().to_owned(),
        // Aggregators without a separate enrollment ID key the link by its
        // token, which preserves upsert semantics on relink.
        item_id: request
            .enrollment_id
            .unwrap_or_else(|| request.access_token.clone()),
        access_token: request.access_token.clone(),
        institution_name: request.institution_name,
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
        &request.access_token,
        &user_id,
        &state.db_connection,
    )
    .await?;

    Ok(Json(SyncResponse {
        success: true,
        summary,
    }))
}
