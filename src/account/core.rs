//! The account model and its database operations.
//!
//! Accounts are created by the enrollment sync flows, so unlike most CRUD
//! modules there is no user-facing create endpoint: rows enter through
//! [upsert_account] keyed on the aggregator's account ID.

use std::collections::HashMap;

use rusqlite::{Connection, params};
use serde::Serialize;

use crate::{Error, UserId};

pub type AccountId = i64;

/// A bank account synced from an aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The ID for the account in the application database.
    pub id: AccountId,
    /// The owning user.
    pub user_id: UserId,
    /// The aggregator's ID for this account, unique per user.
    pub external_id: String,
    /// The display name of the account.
    pub name: String,
    /// The account type, e.g. "depository" or "credit".
    pub account_type: String,
    /// The current balance reported by the institution.
    pub balance_current: f64,
    /// The balance available for spending.
    pub balance_available: f64,
    /// The last four digits of the account number, if known.
    pub last_four: Option<String>,
    /// The name of the institution holding the account.
    pub institution_name: String,
}

/// An account as produced by the record mapper, before it has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The aggregator's ID for this account.
    pub external_id: String,
    /// The display name of the account.
    pub name: String,
    /// The account type, e.g. "depository" or "credit".
    pub account_type: String,
    /// The current balance reported by the institution.
    pub balance_current: f64,
    /// The balance available for spending.
    pub balance_available: f64,
    /// The last four digits of the account number, if known.
    pub last_four: Option<String>,
    /// The name of the institution holding the account.
    pub institution_name: String,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            external_id TEXT NOT NULL,
            name TEXT NOT NULL,
            account_type TEXT NOT NULL,
            balance_current REAL NOT NULL,
            balance_available REAL NOT NULL,
            last_four TEXT,
            institution_name TEXT NOT NULL,
            UNIQUE(user_id, external_id)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        user_id: UserId::new(row.get::<_, String>(1)?),
        external_id: row.get(2)?,
        name: row.get(3)?,
        account_type: row.get(4)?,
        balance_current: row.get(5)?,
        balance_available: row.get(6)?,
        last_four: row.get(7)?,
        institution_name: row.get(8)?,
    })
}

/// Insert an account, or refresh its descriptive fields if the user already
/// has an account with the same external ID.
///
/// Balances are left untouched on update since the balance refresh step owns
/// them. Returns the account's database ID and whether a new row was inserted.
///
/// # Errors
/// Returns [Error::SqlError] if the write fails.
pub fn upsert_account(
    new_account: &NewAccount,
    user_id: &UserId,
    connection: &Connection,
) -> Result<(AccountId, bool), Error> {
    let existing_id = connection
        .query_row(
            "SELECT id FROM account WHERE user_id = ?1 AND external_id = ?2",
            params![user_id.as_str(), new_account.external_id],
            |row| row.get::<_, AccountId>(0),
        )
        .map(Some)
        .or_else(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            error => Err(Error::from(error)),
        })?;

    match existing_id {
        Some(id) => {
            connection.execute(
                "UPDATE account
                SET name = ?1, account_type = ?2, last_four = ?3, institution_name = ?4
                WHERE id = ?5",
                params![
                    new_account.name,
                    new_account.account_type,
                    new_account.last_four,
                    new_account.institution_name,
                    id
                ],
            )?;

            Ok((id, false))
        }
        None => {
            connection.execute(
                "INSERT INTO account (
                    user_id, external_id, name, account_type,
                    balance_current, balance_available, last_four, institution_name
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    user_id.as_str(),
                    new_account.external_id,
                    new_account.name,
                    new_account.account_type,
                    new_account.balance_current,
                    new_account.balance_available,
                    new_account.last_four,
                    new_account.institution_name
                ],
            )?;

            Ok((connection.last_insert_rowid(), true))
        }
    }
}

/// Overwrite the stored balances for one of the user's accounts.
///
/// # Errors
/// Returns [Error::NotFound] if the user has no account with `external_id`.
pub fn update_account_balances(
    user_id: &UserId,
    external_id: &str,
    balance_current: f64,
    balance_available: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_changed = connection.execute(
        "UPDATE account SET balance_current = ?1, balance_available = ?2
        WHERE user_id = ?3 AND external_id = ?4",
        params![
            balance_current,
            balance_available,
            user_id.as_str(),
            external_id
        ],
    )?;

    if rows_changed == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get all of the user's accounts, ordered by institution then name.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn list_accounts(user_id: &UserId, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, external_id, name, account_type,
                balance_current, balance_available, last_four, institution_name
            FROM account
            WHERE user_id = ?1
            ORDER BY institution_name, name",
        )?
        .query_map(params![user_id.as_str()], map_row_to_account)?
        .map(|account| account.map_err(Error::from))
        .collect()
}

/// A reference to a stored account, used when resolving aggregator account
/// IDs during a transactions-only sync.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRef {
    /// The account's database ID.
    pub id: AccountId,
    /// The account type, e.g. "depository" or "credit".
    pub account_type: String,
}

/// Look up the database ID and account type for each of the given external
/// account IDs, scoped to the user.
///
/// External IDs with no matching account are simply absent from the returned
/// map; the caller decides whether that is an error.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn account_refs_by_external_id(
    user_id: &UserId,
    external_ids: &[String],
    connection: &Connection,
) -> Result<HashMap<String, AccountRef>, Error> {
    let mut statement = connection.prepare(
        "SELECT external_id, id, account_type FROM account
        WHERE user_id = ?1 AND external_id = ?2",
    )?;

    let mut refs = HashMap::new();

    for external_id in external_ids {
        let account_ref = statement
            .query_row(params![user_id.as_str(), external_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    AccountRef {
                        id: row.get(1)?,
                        account_type: row.get(2)?,
                    },
                ))
            })
            .map(Some)
            .or_else(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                error => Err(Error::from(error)),
            })?;

        if let Some((external_id, account_ref)) = account_ref {
            refs.insert(external_id, account_ref);
        }
    }

    Ok(refs)
}

/// Delete one of the user's accounts and its transactions.
///
/// # Errors
/// Returns [Error::NotFound] if the user has no account with `account_id`.
pub fn delete_account(
    user_id: &UserId,
    account_id: AccountId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM bank_transaction WHERE user_id = ?1 AND account_id = ?2",
        params![user_id.as_str(), account_id],
    )?;

    let rows_changed = connection.execute(
        "DELETE FROM account WHERE user_id = ?1 AND id = ?2",
        params![user_id.as_str(), account_id],
    )?;

    if rows_changed == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn test_new_account(external_id: &str, account_type: &str) -> NewAccount {
    NewAccount {
        external_id: external_id.to_owned(),
        name: "Everyday Checking".to_owned(),
        account_type: account_type.to_owned(),
        balance_current: 0.0,
        balance_available: 0.0,
        last_four: Some("4242".to_owned()),
        institution_name: "Chase".to_owned(),
    }
}





#[cfg(test)]
mod delete_account_tests {
    use rusqlite::Connection;

    use crate::{Error, UserId};

    use super::{create_account_table, delete_account, list_accounts, test_new_account, upsert_account};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_account_table(&connection).unwrap();
        crate::transaction::create_transaction_table(&connection).unwrap();
        connection
    }

    #[test]
    fn deletes_account() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");
        let (id, _) =
            upsert_account(&test_new_account("acc_123", "depository"), &user_id, &connection)
                .unwrap();

        delete_account(&user_id, id, &connection).unwrap();

        assert!(list_accounts(&user_id, &connection).unwrap().is_empty());
    }

    #[test]
    fn deleting_missing_account_returns_not_found() {
        let connection = get_test_connection();

        let result = delete_account(&UserId::new("user-1"), 999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn cannot_delete_another_users_account() {
        let connection = get_test_connection();
        let owner = UserId::new("user-1");
        let (id, _) =
            upsert_account(&test_new_account("acc_123", "depository"), &owner, &connection)
                .unwrap();

        let result = delete_account(&UserId::new("user-2"), id, &connection);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(list_accounts(&owner, &connection).unwrap().len(), 1);
    }
}
