//! A scripted aggregator client for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    Error, UserId,
    account::NewAccount,
    aggregator::{AccountBalances, AggregatorClient, Credential, FetchedTransaction},
};

/// An [AggregatorClient] that serves canned data and records how many calls
/// were made, so tests can assert both sync results and that unauthorized
/// requests never reach upstream.
#[derive(Default)]
pub struct MockAggregatorClient {
    /// The accounts returned by `fetch_accounts`.
    pub accounts: Vec<NewAccount>,
    /// Balances keyed by external account ID.
    pub balances: HashMap<String, AccountBalances>,
    /// Transactions keyed by external account ID.
    pub transactions: HashMap<String, Vec<FetchedTransaction>>,
    /// Fail `fetch_accounts` outright.
    pub fail_accounts: bool,
    /// External account IDs whose balance fetch fails.
    pub fail_balance_for: HashSet<String>,
    /// External account IDs whose transaction fetch fails.
    pub fail_transactions_for: HashSet<String>,
    /// Total number of upstream calls made.
    pub calls: AtomicUsize,
}

impl MockAggregatorClient {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn upstream_failure() -> Error {
        Error::Upstream {
            status: 502,
            body: "mock upstream failure".to_owned(),
        }
    }
}

#[async_trait]
impl AggregatorClient for MockAggregatorClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_link_token(&self, user_id: &UserId) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Ok(format!("link-{user_id}"))
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<Credential, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Ok(Credential {
            access_token: format!("access-{public_token}"),
            item_id: format!("item-{public_token}"),
        })
    }

    async fn fetch_accounts(&self, _access_token: &str) -> Result<Vec<NewAccount>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_accounts {
            return Err(Self::upstream_failure());
        }

        Ok(self.accounts.clone())
    }

    async fn fetch_balance(
        &self,
        _access_token: &str,
        external_account_id: &str,
    ) -> Result<AccountBalances, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_balance_for.contains(external_account_id) {
            return Err(Self::upstream_failure());
        }

        Ok(self
            .balances
            .get(external_account_id)
            .copied()
            .unwrap_or(AccountBalances {
                current: 0.0,
                available: 0.0,
            }))
    }

    async fn fetch_transactions(
        &self,
        _access_token: &str,
        external_account_id: &str,
    ) -> Result<Vec<FetchedTransaction>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_transactions_for.contains(external_account_id) {
            return Err(Self::upstream_failure());
        }

        Ok(self
            .transactions
            .get(external_account_id)
            .cloned()
            .unwrap_or_default())
    }
}
