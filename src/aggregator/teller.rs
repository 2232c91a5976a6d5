//! The Teller API client.
//!
//! Teller authenticates with HTTP basic auth where the username is the access
//! token and the password is empty, and serves accounts, balances, and
//! transactions as plain GET endpoints.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::{
    Error, UserId,
    account::NewAccount,
    aggregator::{
        AccountBalances, AggregatorClient, Credential, FetchedTransaction,
        map::{map_teller_account, map_teller_transaction},
        wire::{TellerAccount, TellerBalance, TellerTransaction},
    },
};

/// The base URL for the Teller API.
pub const TELLER_BASE_URL: &str = "https://api.teller.io";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A client for the Teller API.
#[derive(Debug, Clone)]
pub struct TellerClient {
    client: Client,
    base_url: String,
}

impl TellerClient {
    /// Create a Teller client against `base_url` (see [TELLER_BASE_URL]).
    ///
    /// # Errors
    /// Returns [Error::Upstream] if the underlying HTTP client cannot be
    /// built.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn get(&self, access_token: &str, path: &str) -> RequestBuilder {
        // Teller expects `Basic base64("{token}:")`, i.e. token as username
        // with an empty password.
        let authorization = format!("Basic {}", BASE64.encode(format!("{access_token}:")));

        self.client
            .get(format!("{}{}", self.base_url, path))
            .header(reqwest::header::AUTHORIZATION, authorization)
    }
}

/// Send a request and parse the response body, surfacing non-2xx statuses as
/// [Error::Upstream] with the upstream body attached.
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

/// Parse a JSON value that must be a list, mapping each element and skipping
/// (with a warning) elements that do not match the expected schema.
pub(super) fn parse_list<T, U>(
    value: serde_json::Value,
    what: &str,
    map_element: impl Fn(T) -> U,
) -> Result<Vec<U>, Error>
where
    T: DeserializeOwned,
{
    let serde_json::Value::Array(elements) = value else {
        return Err(Error::Mapping(format!("expected a list of {what}")));
    };

    let mut mapped = Vec::with_capacity(elements.len());

    for element in elements {
        match serde_json::from_value::<T>(element) {
            Ok(parsed) => mapped.push(map_element(parsed)),
            Err(error) => {
                tracing::warn!("skipping {what} entry with unexpected shape: {error}");
            }
        }
    }

    Ok(mapped)
}

#[async_trait]
impl AggregatorClient for TellerClient {
    fn name(&self) -> &'static str {
        "teller"
    }

    /// Teller Connect is configured entirely client-side, so there is no
    /// server-issued link token to hand out.
    async fn create_link_token(&self, _user_id: &UserId) -> Result<String, Error> {
        Err(Error::NotFound)
    }

    /// Teller Connect hands the access token to the client directly, so the
    /// "public token" already is the credential. The item ID is derived from
    /// the token digest so that relinking the same token maps to the same
    /// enrollment row.
    async fn exchange_public_token(&self, public_token: &str) -> Result<Credential, Error> {
        let digest = Sha256::digest(public_token.as_bytes());
        let fingerprint: String = digest
            .iter()
            .take(8)
            .map(|byte| format!("{byte:02x}"))
            .collect();

        Ok(Credential {
            access_token: public_token.to_owned(),
            item_id: format!("teller_{fingerprint}"),
        })
    }

    async fn fetch_accounts(&self, access_token: &str) -> Result<Vec<NewAccount>, Error> {
        let value: serde_json::Value =
            send_and_parse(self.get(access_token, "/accounts")).await?;

        parse_list::<TellerAccount, _>(value, "accounts", map_teller_account)
    }

    async fn fetch_balance(
        &self,
        access_token: &str,
        external_account_id: &str,
    ) -> Result<AccountBalances, Error> {
        let balance: TellerBalance = send_and_parse(
            self.get(
                access_token,
                &format!("/accounts/{external_account_id}/balances"),
            ),
        )
        .await?;

        Ok(AccountBalances {
            current: balance.balance.unwrap_or(0.0),
            available: balance.available.unwrap_or(0.0),
        })
    }

    async fn fetch_transactions(
        &self,
        access_token: &str,
        external_account_id: &str,
    ) -> Result<Vec<FetchedTransaction>, Error> {
        let value: serde_json::Value = send_and_parse(
            self.get(
                access_token,
                &format!("/accounts/{external_account_id}/transactions"),
            ),
        )
        .await?;

        parse_list::<TellerTransaction, _>(value, "transactions", map_teller_transaction)
    }
}

#[cfg(test)]
mod parse_list_tests {
    use serde_json::json;

    use crate::{
        Error,
        aggregator::{map::map_teller_account, wire::TellerAccount},
    };

    use super::parse_list;

    #[test]
    fn object_where_list_expected_is_a_mapping_error() {
        let value = json!({"error": "not a list"});

        let result = parse_list::<TellerAccount, _>(value, "accounts", map_teller_account);

        assert_eq!(
            result,
            Err(Error::Mapping("expected a list of accounts".to_owned()))
        );
    }

    #[test]
    fn malformed_elements_are_skipped() {
        let value = json!([
            {"id": "acc_1"},
            42,
            {"id": "acc_2"}
        ]);

        let accounts =
            parse_list::<TellerAccount, _>(value, "accounts", map_teller_account).unwrap();

        let external_ids: Vec<&str> = accounts
            .iter()
            .map(|account| account.external_id.as_str())
            .collect();
        assert_eq!(external_ids, vec!["acc_1", "acc_2"]);
    }

    #[test]
    fn empty_list_is_fine() {
        let accounts =
            parse_list::<TellerAccount, _>(json!([]), "accounts", map_teller_account).unwrap();

        assert!(accounts.is_empty());
    }
}
