//! Synchronizes accounts, balances, and transactions from an aggregator into
//! the application database.

mod enroll_endpoint;
mod exchange_endpoint;
mod link_token_endpoint;
mod orchestrator;
mod state;
mod transactions_endpoint;

pub use enroll_endpoint::{EnrollRequest, SyncResponse, create_enrollment_endpoint};
pub use exchange_endpoint::{ExchangeRequest, exchange_token_endpoint};
pub use link_token_endpoint::{LinkTokenResponse, create_link_token_endpoint};
pub use orchestrator::{
    AccountSyncError, SyncStage, SyncSummary, run_full_sync, run_transactions_sync,
};
pub use transactions_endpoint::{SyncTransactionsRequest, sync_transactions_endpoint};
