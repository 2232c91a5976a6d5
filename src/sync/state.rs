//! Shared state for the sync endpoints.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, aggregator::AggregatorClient};

/// The state needed to run a sync: the database and the aggregator client.
#[derive(Clone)]
pub struct SyncState {
    /// The database connection for persisting synced data.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The aggregator to fetch accounts and transactions from.
    pub aggregator: Arc<dyn AggregatorClient>,
}

impl FromRef<AppState> for SyncState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            aggregator: state.aggregator.clone(),
        }
    }
}
