//! Ledgerlink is a backend for a personal-finance dashboard: users link their
//! bank accounts through a data aggregator (Teller or Plaid), the server syncs
//! accounts, balances, and transactions into a local SQLite database, and a
//! dashboard read path serves aggregate summaries as JSON.
//!
//! This library provides a REST API that serves JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod account;
mod aggregator;
mod app_state;
mod auth;
mod branding;
mod dashboard;
mod db;
mod endpoints;
mod enrollment;
mod error;
mod extract;
mod logging;
mod routing;
mod sync;
mod transaction;
mod user;

pub use aggregator::{
    AggregatorClient, PLAID_SANDBOX_BASE_URL, PlaidClient, TELLER_BASE_URL, TellerClient,
};
pub use app_state::AppState;
pub use auth::insert_session;
pub use db::initialize as initialize_db;
pub use enrollment::{Enrollment, list_enrollments};
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use user::UserId;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
