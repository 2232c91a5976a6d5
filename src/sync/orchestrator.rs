//! Drives the account/balance/transaction synchronization flow.
//!
//! The orchestration is transient and per-request: fetch the accounts (fatal
//! on failure, since everything depends on them), persist them, then refresh
//! balances and transactions account by account, where a failure for one
//! account is recorded in the summary and the remaining accounts still sync.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error, UserId, account,
    aggregator::{AggregatorClient, normalize_transaction},
    transaction,
};

/// Which step of the per-account sync failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    Balance,
    Transactions,
}

/// A per-account failure recorded during a sync run.
///
/// These are reported to the caller but never fail the run: partial success
/// is still success, and a rerun will pick up whatever was missed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSyncError {
    /// The aggregator's ID for the affected account.
    pub account_id: String,
    /// The step that failed.
    pub stage: SyncStage,
    /// A short description of the failure, safe to show to the client.
    pub message: String,
}

/// The outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSummary {
    /// How many accounts were newly inserted (as opposed to refreshed).
    pub accounts_inserted: usize,
    /// How many transactions the aggregator returned across all accounts.
    pub transactions_fetched: usize,
    /// How many of those were new and actually inserted.
    pub transactions_inserted: usize,
    /// Per-account failures encountered along the way.
    pub errors: Vec<AccountSyncError>,
}

/// An account that survived the persist step and is eligible for balance and
/// transaction refresh.
struct SyncedAccount {
    id: account::AccountId,
    external_id: String,
    account_type: String,
}

fn lock_connection(
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLock
    })
}

/// Run the full sync flow for a credential: fetch and persist accounts, then
/// refresh each account's balances and transactions.
///
/// # Errors
/// Returns an error only for prerequisite failures: the initial account fetch
/// ([Error::Upstream] or [Error::Mapping]) or the account persist step
/// ([Error::SqlError]). Later per-account failures are reported in the
/// summary instead.
pub async fn run_full_sync(
    aggregator: &dyn AggregatorClient,
    access_token: &str,
    user_id: &UserId,
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<SyncSummary, Error> {
    let fetched_accounts = aggregator.fetch_accounts(access_token).await?;
    tracing::info!(
        "fetched {} accounts from {} for user {user_id}",
        fetched_accounts.len(),
        aggregator.name()
    );

    let mut summary = SyncSummary::default();
    let mut synced_accounts = Vec::with_capacity(fetched_accounts.len());

    {
        let connection = lock_connection(db_connection)?;

        for new_account in &fetched_accounts {
            let (id, inserted) = account::upsert_account(new_account, user_id, &connection)?;

            if inserted {
                summary.accounts_inserted += 1;
            }

            synced_accounts.push(SyncedAccount {
                id,
                external_id: new_account.external_id.clone(),
                account_type: new_account.account_type.clone(),
            });
        }
    }

    for synced_account in &synced_accounts {
        refresh_balance(
            aggregator,
            access_token,
            user_id,
            synced_account,
            db_connection,
            &mut summary,
        )
        .await;
    }

    for synced_account in &synced_accounts {
        refresh_transactions(
            aggregator,
            access_token,
            user_id,
            synced_account,
            db_connection,
            &mut summary,
        )
        .await;
    }

    tracing::info!(
        "sync complete for user {user_id}: {} accounts inserted, \
        {} transactions fetched, {} inserted, {} errors",
        summary.accounts_inserted,
        summary.transactions_fetched,
        summary.transactions_inserted,
        summary.errors.len()
    );

    Ok(summary)
}

/// Re-sync transactions only, for an explicit list of aggregator account IDs.
///
/// Account IDs that do not belong to the user are reported as per-account
/// errors rather than failing the run, matching the isolation rule for the
/// full sync.
///
/// # Errors
/// Returns [Error::DatabaseLock] or [Error::SqlError] if the account lookup
/// fails.
pub async fn run_transactions_sync(
    aggregator: &dyn AggregatorClient,
    access_token: &str,
    user_id: &UserId,
    external_account_ids: &[String],
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<SyncSummary, Error> {
    let account_refs = {
        let connection = lock_connection(db_connection)?;
        account::account_refs_by_external_id(user_id, external_account_ids, &connection)?
    };

    let mut summary = SyncSummary::default();

    for external_id in external_account_ids {
        let Some(account_ref) = account_refs.get(external_id) else {
            summary.errors.push(AccountSyncError {
                account_id: external_id.clone(),
                stage: SyncStage::Transactions,
                message: "no such account for this user".to_owned(),
            });
            continue;
        };

        let synced_account = SyncedAccount {
            id: account_ref.id,
            external_id: external_id.clone(),
            account_type: account_ref.account_type.clone(),
        };

        refresh_transactions(
            aggregator,
            access_token,
            user_id,
            &synced_account,
            db_connection,
            &mut summary,
        )
        .await;
    }

    Ok(summary)
}

async fn refresh_balance(
    aggregator: &dyn AggregatorClient,
    access_token: &str,
    user_id: &UserId,
    synced_account: &SyncedAccount,
    db_connection: &Arc<Mutex<Connection>>,
    summary: &mut SyncSummary,
) {
    let result = async {
        let balances = aggregator
            .fetch_balance(access_token, &synced_account.external_id)
            .await?;

        let connection = lock_connection(db_connection)?;
        account::update_account_balances(
            user_id,
            &synced_account.external_id,
            balances.current,
            balances.available,
            &connection,
        )
    }
    .await;

    if let Err(error) = result {
        tracing::warn!(
            "balance refresh failed for account {}: {error}",
            synced_account.external_id
        );
        summary.errors.push(AccountSyncError {
            account_id: synced_account.external_id.clone(),
            stage: SyncStage::Balance,
            message: "could not refresh the account balance".to_owned(),
        });
    }
}

async fn refresh_transactions(
    aggregator: &dyn AggregatorClient,
    access_token: &str,
    user_id: &UserId,
    synced_account: &SyncedAccount,
    db_connection: &Arc<Mutex<Connection>>,
    summary: &mut SyncSummary,
) {
    let result = async {
        let fetched = aggregator
            .fetch_transactions(access_token, &synced_account.external_id)
            .await?;

        let transactions: Vec<_> = fetched
            .into_iter()
            .map(|transaction| {
                normalize_transaction(
                    transaction,
                    synced_account.id,
                    &synced_account.account_type,
                )
            })
            .collect();

        let connection = lock_connection(db_connection)?;
        let inserted = transaction::upsert_transactions(&transactions, user_id, &connection)?;

        Ok::<_, Error>((transactions.len(), inserted))
    }
    .await;

    match result {
        Ok((fetched, inserted)) => {
            summary.transactions_fetched += fetched;
            summary.transactions_inserted += inserted;
        }
        Err(error) => {
            tracing::warn!(
                "transaction sync failed for account {}: {error}",
                synced_account.external_id
            );
            summary.errors.push(AccountSyncError {
                account_id: synced_account.external_id.clone(),
                stage: SyncStage::Transactions,
                message: "could not sync the account's transactions".to_owned(),
            });
        }
    }
}
