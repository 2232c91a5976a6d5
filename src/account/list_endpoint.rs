//! Defines the endpoint for listing the user's accounts with branding.

use std::sync::{Arc, Mutex};

use axum::{Extension, Json, extract::{FromRef, State}};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error, UserId,
    account::core::{Account, list_accounts},
    branding::institution_branding,
};

/// The state needed to list accounts.
#[derive(Clone)]
pub struct ListAccountsState {
    /// The database connection holding the account table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListAccountsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// An account decorated with the institution's brand color and logo.
#[derive(Debug, Serialize)]
pub struct AccountView {
    #[serde(flatten)]
    account: Account,
    /// The institution's brand color as a hex string.
    color: &'static str,
    /// A URL for the institution's logo.
    logo_url: &'static str,
}

/// A route handler that lists the user's accounts, each decorated with
/// institution branding.
///
/// # Errors
/// Responds with a 500 JSON error if the accounts cannot be read.
pub async fn get_accounts_endpoint(
    State(state): State<ListAccountsState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<AccountView>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLock
    })?;

    let accounts = list_accounts(&user_id, &connection)?;

    let views = accounts
        .into_iter()
        .map(|account| {
            let branding = institution_branding(&account.institution_name);

            AccountView {
                account,
                color: branding.color,
                logo_url: branding.logo_url,
            }
        })
        .collect();

    Ok(Json(views))
}
