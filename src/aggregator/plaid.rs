//! The Plaid API client.
//!
//! Plaid authenticates with per-request `PLAID-CLIENT-ID`/`PLAID-SECRET`
//! headers and serves everything as JSON POST endpoints. Balances come inline
//! with accounts, so the balance fetch re-reads the accounts endpoint and
//! picks out the matching account.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use time::{
    Duration as TimeDuration, OffsetDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    Error, UserId,
    account::NewAccount,
    aggregator::{
        AccountBalances, AggregatorClient, Credential, FetchedTransaction,
        map::{map_plaid_account, map_plaid_transaction},
        teller::parse_list,
        wire::{
            PlaidAccount, PlaidAccountsResponse, PlaidExchangeResponse, PlaidLinkTokenResponse,
            PlaidTransaction, PlaidTransactionsResponse,
        },
    },
};

/// The base URL for the Plaid sandbox environment.
pub const PLAID_SANDBOX_BASE_URL: &str = "https://sandbox.plaid.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How far back `fetch_transactions` looks.
const TRANSACTION_WINDOW_DAYS: i64 = 30;

const MAX_TRANSACTIONS_PER_PAGE: u32 = 100;

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A client for the Plaid API.
#[derive(Debug, Clone)]
pub struct PlaidClient {
    client: Client,
    base_url: String,
    client_id: String,
    secret: String,
}

impl PlaidClient {
    /// Create a Plaid client against `base_url` (see [PLAID_SANDBOX_BASE_URL])
    /// with the given API credentials.
    ///
    /// # Errors
    /// Returns [Error::Upstream] if the underlying HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, client_id: &str, secret: &str) -> Result<Self, Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            client_id: client_id.to_owned(),
            secret: secret.to_owned(),
        })
    }

    fn post(&self, path: &str, body: &serde_json::Value) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("PLAID-CLIENT-ID", &self.client_id)
            .header("PLAID-SECRET", &self.secret)
            .json(body)
    }

    async fn fetch_plaid_accounts(&self, access_token: &str) -> Result<Vec<PlaidAccount>, Error> {
        let response: PlaidAccountsResponse = send_and_parse(
            self.post("/accounts/get", &json!({ "access_token": access_token })),
        )
        .await?;

        parse_list::<PlaidAccount, _>(response.accounts, "accounts", |account| account)
    }
}

async fn send_and_parse<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, Error> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

#[async_trait]
impl AggregatorClient for PlaidClient {
    fn name(&self) -> &'static str {
        "plaid"
    }

    async fn create_link_token(&self, user_id: &UserId) -> Result<String, Error> {
        let body = json!({
            "user": { "client_user_id": user_id.as_str() },
            "client_name": "Ledgerlink",
            "products": ["auth", "transactions"],
            "country_codes": ["US"],
            "language": "en",
        });

        let response: PlaidLinkTokenResponse =
            send_and_parse(self.post("/link/token/create", &body)).await?;

        Ok(response.link_token)
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<Credential, Error> {
        let response: PlaidExchangeResponse = send_and_parse(self.post(
            "/item/public_token/exchange",
            &json!({ "public_token": public_token }),
        ))
        .await?;

        Ok(Credential {
            access_token: response.access_token,
            item_id: response.item_id,
        })
    }

    async fn fetch_accounts(&self, access_token: &str) -> Result<Vec<NewAccount>, Error> {
        let accounts = self.fetch_plaid_accounts(access_token).await?;

        Ok(accounts.into_iter().map(map_plaid_account).collect())
    }

    async fn fetch_balance(
        &self,
        access_token: &str,
        external_account_id: &str,
    ) -> Result<AccountBalances, Error> {
        let accounts = self.fetch_plaid_accounts(access_token).await?;

        let account = accounts
            .into_iter()
            .find(|account| account.account_id == external_account_id)
            .ok_or(Error::NotFound)?;

        let balances = map_plaid_account(account);

        Ok(AccountBalances {
            current: balances.balance_current,
            available: balances.balance_available,
        })
    }

    async fn fetch_transactions(
        &self,
        access_token: &str,
        external_account_id: &str,
    ) -> Result<Vec<FetchedTransaction>, Error> {
        let end_date = OffsetDateTime::now_utc().date();
        let start_date = end_date - TimeDuration::days(TRANSACTION_WINDOW_DAYS);

        let body = json!({
            "access_token": access_token,
            "start_date": start_date.format(DATE_FORMAT).unwrap_or_default(),
            "end_date": end_date.format(DATE_FORMAT).unwrap_or_default(),
            "options": { "count": MAX_TRANSACTIONS_PER_PAGE, "offset": 0 },
        });

        let response: PlaidTransactionsResponse =
            send_and_parse(self.post("/transactions/get", &body)).await?;

        let transactions =
            parse_list::<PlaidTransaction, _>(response.transactions, "transactions", |t| t)?;

        // /transactions/get returns transactions for every account on the
        // item; keep only the requested account's.
        Ok(transactions
            .into_iter()
            .filter(|transaction| transaction.account_id == external_account_id)
            .map(map_plaid_transaction)
            .collect())
    }
}
