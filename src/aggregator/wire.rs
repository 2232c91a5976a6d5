//! Per-aggregator wire schemas.
//!
//! Every optional field is `#[serde(default)]` so that a sparse upstream
//! payload deserializes cleanly and the mapper can fill in defaults, rather
//! than one missing field sinking a whole sync.

use serde::Deserialize;

/// An account in Teller's `GET /accounts` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TellerAccount {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub last_four: Option<String>,
    #[serde(default)]
    pub institution: Option<TellerInstitution>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TellerInstitution {
    #[serde(default)]
    pub name: Option<String>,
}

/// Teller's `GET /accounts/{id}/balances` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TellerBalance {
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub available: Option<f64>,
}

/// A transaction in Teller's `GET /accounts/{id}/transactions` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TellerTransaction {
    pub id: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "type", default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub counterparty: Option<TellerCounterparty>,
    #[serde(default)]
    pub details: Option<TellerTransactionDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TellerCounterparty {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TellerTransactionDetails {
    #[serde(default)]
    pub category: Option<String>,
}

/// Plaid's `POST /link/token/create` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidLinkTokenResponse {
    pub link_token: String,
}

/// Plaid's `POST /item/public_token/exchange` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidExchangeResponse {
    pub access_token: String,
    pub item_id: String,
}

/// Plaid's `POST /accounts/get` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidAccountsResponse {
    pub accounts: serde_json::Value,
}

/// An account in Plaid's `POST /accounts/get` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidAccount {
    pub account_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub official_name: Option<String>,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub balances: Option<PlaidBalances>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaidBalances {
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub available: Option<f64>,
}

/// Plaid's `POST /transactions/get` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidTransactionsResponse {
    pub transactions: serde_json::Value,
}

/// A transaction in Plaid's `POST /transactions/get` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaidTransaction {
    pub transaction_id: String,
    pub account_id: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub category: Option<Vec<String>>,
    #[serde(default)]
    pub pending: bool,
}
