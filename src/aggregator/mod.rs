//! Clients for the bank data aggregators that provide read access to a user's
//! accounts, balances, and transactions.
//!
//! Each aggregator speaks its own JSON dialect; the adapters in this module
//! deserialize into per-aggregator wire schemas and hand back one normalized
//! shape, so the sync orchestrator never sees aggregator-specific fields.

mod map;
#[cfg(test)]
mod mock;
mod plaid;
mod teller;
mod wire;

use async_trait::async_trait;
use time::Date;

use crate::{Error, UserId, account::NewAccount};

pub use plaid::{PLAID_SANDBOX_BASE_URL, PlaidClient};
pub use teller::{TELLER_BASE_URL, TellerClient};

#[cfg(test)]
pub(crate) use mock::MockAggregatorClient;

pub use map::normalize_transaction;

/// An access credential for a linked institution.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    /// The token that authorizes accounts/balances/transactions calls.
    pub access_token: String,
    /// The aggregator's identifier for the link (Plaid item ID, Teller
    /// enrollment ID).
    pub item_id: String,
}

/// Balances for a single account as reported by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountBalances {
    /// The current (ledger) balance.
    pub current: f64,
    /// The balance available for spending.
    pub available: f64,
}

/// A transaction as fetched from an aggregator, normalized in shape but still
/// carrying the aggregator's native amount sign.
///
/// Sign normalization happens in [normalize_transaction] because it needs the
/// owning account's type, which the adapter does not know.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTransaction {
    /// The aggregator's ID for the transaction.
    pub external_id: String,
    /// The amount in the aggregator's native sign convention.
    pub amount: f64,
    /// A description of the transaction.
    pub description: String,
    /// The merchant or counterparty name, if reported.
    pub merchant: Option<String>,
    /// The transaction category.
    pub category: String,
    /// The date the transaction was posted.
    pub date: Date,
    /// The transaction status, e.g. "posted" or "pending".
    pub status: String,
    /// "debit" or "credit", as reported by the aggregator.
    pub transaction_type: String,
}

/// A client for one aggregator's REST API.
///
/// Implementations perform no retries, and a failure for one account must not
/// prevent the caller from processing other accounts; that isolation is the
/// sync orchestrator's responsibility.
#[async_trait]
pub trait AggregatorClient: Send + Sync {
    /// The aggregator's name, e.g. "teller", used to tag enrollments.
    fn name(&self) -> &'static str;

    /// Create a short-lived link token, bound to the user, that the
    /// client-side link flow opens with.
    ///
    /// # Errors
    /// Returns [Error::Upstream] if the call fails, or [Error::NotFound] for
    /// aggregators whose link flow does not use server-issued tokens.
    async fn create_link_token(&self, user_id: &UserId) -> Result<String, Error>;

    /// Exchange a public token from the aggregator's link flow for an access
    /// credential.
    ///
    /// # Errors
    /// Returns [Error::Upstream] if the exchange call fails.
    async fn exchange_public_token(&self, public_token: &str) -> Result<Credential, Error>;

    /// Fetch all accounts visible through the credential.
    ///
    /// # Errors
    /// Returns [Error::Upstream] if the call fails, or [Error::Mapping] if the
    /// response is not list-shaped.
    async fn fetch_accounts(&self, access_token: &str) -> Result<Vec<NewAccount>, Error>;

    /// Fetch the balances for one account.
    ///
    /// # Errors
    /// Returns [Error::Upstream] if the call fails.
    async fn fetch_balance(
        &self,
        access_token: &str,
        external_account_id: &str,
    ) -> Result<AccountBalances, Error>;

    /// Fetch the transactions for one account.
    ///
    /// # Errors
    /// Returns [Error::Upstream] if the call fails, or [Error::Mapping] if the
    /// response is not list-shaped.
    async fn fetch_transactions(
        &self,
        access_token: &str,
        external_account_id: &str,
    ) -> Result<Vec<FetchedTransaction>, Error>;
}
