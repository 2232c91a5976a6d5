//! Defines the endpoint serving the dashboard summary.

use std::sync::{Arc, Mutex};

use axum::{Extension, Json, extract::{FromRef, State}};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error, UserId,
    account::{Account, list_accounts},
    branding::{Branding, institution_branding},
    dashboard::core::{credit_available, credit_used, total_debt, total_depository_balance},
    transaction::{Transaction, recent_transactions},
};

/// How many recent transactions the dashboard shows.
const RECENT_TRANSACTION_LIMIT: u32 = 10;

/// The state needed to build the dashboard.
#[derive(Clone)]
pub struct DashboardState {
    /// The database connection holding the synced records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// An account row on the dashboard, with branding.
#[derive(Debug, Serialize)]
pub struct DashboardAccount {
    #[serde(flatten)]
    account: Account,
    #[serde(flatten)]
    branding: Branding,
}

/// The dashboard summary returned to the client.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Sum of current balances across depository accounts.
    pub total_balance: f64,
    /// Total owed across credit accounts.
    pub total_debt: f64,
    /// Total credit used across credit accounts.
    pub credit_used: f64,
    /// Total credit available across credit accounts.
    pub credit_available: f64,
    /// The user's accounts with branding.
    pub accounts: Vec<DashboardAccount>,
    /// The most recent transactions, date descending.
    pub recent_transactions: Vec<Transaction>,
}

/// A route handler that computes the dashboard summary from the user's synced
/// accounts and transactions. Aggregates are recomputed on every request.
///
/// # Errors
/// Responds with a 500 JSON error if the records cannot be read.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<DashboardResponse>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLock
    })?;

    let accounts = list_accounts(&user_id, &connection)?;
    let transactions = recent_transactions(&user_id, RECENT_TRANSACTION_LIMIT, &connection)?;

    let response = DashboardResponse {
        total_balance: total_depository_balance(&accounts),
        total_debt: total_debt(&accounts),
        credit_used: credit_used(&accounts),
        credit_available: credit_available(&accounts),
        accounts: accounts
            .into_iter()
            .map(|account| {
                let branding = institution_branding(&account.institution_name);

                DashboardAccount { account, branding }
            })
            .collect(),
        recent_transactions: transactions,
    };

    Ok(Json(response))
}
