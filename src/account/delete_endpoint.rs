//! Defines the endpoint for unlinking an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{AppState, Error, UserId, account::core::{AccountId, delete_account}};

/// The state needed to delete an account.
#[derive(Clone)]
pub struct DeleteAccountState {
    /// The database connection holding the account table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that deletes an account and its transactions.
///
/// # Errors
/// Responds with a 404 JSON error if the account does not exist or belongs to
/// another user.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Extension(user_id): Extension<UserId>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Value>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLock
    })?;

    delete_account(&user_id, account_id, &connection)?;

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod delete_account_endpoint_tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        AppState, UserId,
        account::{core::AccountId, test_new_account, upsert_account},
        aggregator::MockAggregatorClient,
        auth::session::insert_session,
        build_router,
    };

    fn get_test_server() -> (TestServer, AppState, AccountId) {
        let connection = Connection::open_in_memory().unwrap();
        let state =
            AppState::new(connection, Arc::new(MockAggregatorClient::default())).unwrap();

        let account_id = {
            let connection = state.db_connection.lock().unwrap();
            insert_session(
                "tok_valid",
                &UserId::new("user-1"),
                OffsetDateTime::now_utc() + Duration::hours(1),
                &connection,
            )
            .unwrap();
            insert_session(
                "tok_other",
                &UserId::new("user-2"),
                OffsetDateTime::now_utc() + Duration::hours(1),
                &connection,
            )
            .unwrap();

            let (account_id, _) = upsert_account(
                &test_new_account("acc_1", "depository"),
                &UserId::new("user-1"),
                &connection,
            )
            .unwrap();
            account_id
        };

        let server = TestServer::new(build_router(state.clone()));
        (server, state, account_id)
    }

    #[tokio::test]
    async fn deletes_the_account() {
        let (server, state, account_id) = get_test_server();

        let response = server
            .delete(&format!("/api/accounts/{account_id}"))
            .add_header("Authorization", "Bearer tok_valid")
            .await;

        response.assert_status_ok();
        let connection = state.db_connection.lock().unwrap();
        let accounts =
            crate::account::list_accounts(&UserId::new("user-1"), &connection).unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn missing_account_is_404() {
        let (server, _state, account_id) = get_test_server();

        let response = server
            .delete(&format!("/api/accounts/{}", account_id + 1))
            .add_header("Authorization", "Bearer tok_valid")
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn cannot_delete_another_users_account() {
        let (server, state, account_id) = get_test_server();

        let response = server
            .delete(&format!("/api/accounts/{account_id}"))
            .add_header("Authorization", "Bearer tok_other")
            .await;

        response.assert_status_not_found();
        let connection = state.db_connection.lock().unwrap();
        let accounts =
            crate::account::list_accounts(&UserId::new("user-1"), &connection).unwrap();
        assert_eq!(accounts.len(), 1);
    }
}
