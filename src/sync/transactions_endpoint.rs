//! Defines the endpoint for re-syncing transactions for specific accounts.

use axum::{Extension, extract::State};
use serde::Deserialize;

use crate::{
    Error, UserId,
    extract::Json,
    sync::{
        enroll_endpoint::SyncResponse, orchestrator::run_transactions_sync, state::SyncState,
    },
};

/// The request body for a transactions-only sync.
#[derive(Debug, Deserialize)]
pub struct SyncTransactionsRequest {
    /// The access token for the enrollment that owns the accounts.
    pub access_token: String,
    /// The aggregator account IDs to sync.
    pub account_ids: Vec<String>,
}

/// A route handler that re-syncs transactions for the requested accounts.
///
/// Accounts that do not belong to the caller are reported in the response's
/// `errors` rather than failing the request.
///
/// # Errors
/// Responds with a 500 JSON error if the account lookup fails.
pub async fn sync_transactions_endpoint(
    State(state): State<SyncState>,
    Extension(user_id): Extension<UserId>,
    Json(request): Json<SyncTransactionsRequest>,
) -> Result<Json<SyncResponse>, Error> {
    let summary = run_transactions_sync(
        state.aggregator.as_ref(),
        &request.access_token,
        &user_id,
        &request.account_ids,
        &state.db_connection,
    )
    .await?;

    Ok(Json(SyncResponse {
        success: true,
        summary,
    }))
}

#[cfg(test)]
mod sync_transactions_endpoint_tests {
    use std::{collections::HashMap, sync::Arc};

    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::{Duration, OffsetDateTime, macros::date};

    use crate::{
        AppState, UserId,
        account::{test_new_account, upsert_account},
        aggregator::{FetchedTransaction, MockAggregatorClient},
        auth::session::insert_session,
        build_router,
    };

    fn get_test_server(aggregator: Arc<MockAggregatorClient>) -> (TestServer, AppState) {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, aggregator).unwrap();

        {
            let connection = state.db_connection.lock().unwrap();
            insert_session(
                "tok_valid",
                &UserId::new("user-1"),
                OffsetDateTime::now_utc() + Duration::hours(1),
                &connection,
            )
            .unwrap();
            upsert_account(
                &test_new_account("acc_1", "depository"),
                &UserId::new("user-1"),
                &connection,
            )
            .unwrap();
        }

        let server = TestServer::new(build_router(state.clone()));
        (server, state)
    }

    fn mock_transaction(external_id: &str) -> FetchedTransaction {
        FetchedTransaction {
            external_id: external_id.to_owned(),
            amount: 5.0,
            description: "CARD PAYMENT".to_owned(),
            merchant: None,
            category: "general".to_owned(),
            date: date!(2025 - 06 - 01),
            status: "posted".to_owned(),
            transaction_type: "debit".to_owned(),
        }
    }

    #[tokio::test]
    async fn syncs_requested_accounts_and_reports_unknown_ones() {
        let aggregator = Arc::new(MockAggregatorClient {
            transactions: HashMap::from([(
                "acc_1".to_owned(),
                vec![mock_transaction("txn_1")],
            )]),
            ..Default::default()
        });
        let (server, _state) = get_test_server(aggregator);

        let response = server
            .post("/api/transactions/sync")
            .add_header("Authorization", "Bearer tok_valid")
            .json(&json!({
                "access_token": "token_abc",
                "account_ids": ["acc_1", "acc_unknown"]
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["transactions_inserted"], 1);
        assert_eq!(body["errors"][0]["account_id"], "acc_unknown");
        assert_eq!(body["errors"][0]["stage"], "transactions");
    }

    #[tokio::test]
    async fn unauthorized_request_makes_no_upstream_calls() {
        let aggregator = Arc::new(MockAggregatorClient::default());
        let (server, _state) = get_test_server(aggregator.clone());

        let response = server
            .post("/api/transactions/sync")
            .json(&json!({ "access_token": "token_abc", "account_ids": ["acc_1"] }))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(aggregator.call_count(), 0);
    }
}
