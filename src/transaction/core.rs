//! The transaction model and its database operations.

use rusqlite::{Connection, params};
use serde::Serialize;
use time::Date;

use crate::{Error, UserId, account::AccountId};

pub type TransactionId = i64;

/// A bank transaction synced from an aggregator.
///
/// Amounts are sign-normalized at the mapping boundary: positive is an inflow
/// and negative is an outflow, regardless of the native sign convention of the
/// account the transaction belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID for the transaction in the application database.
    pub id: TransactionId,
    /// The owning user.
    pub user_id: UserId,
    /// The account this transaction belongs to.
    pub account_id: AccountId,
    /// The aggregator's ID for this transaction. Globally unique, used as the
    /// idempotent upsert key.
    pub external_id: String,
    /// The sign-normalized amount.
    pub amount: f64,
    /// A description of the transaction.
    pub description: String,
    /// The merchant or counterparty name, if known.
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

/// A transaction as produced by the record mapper, before it has been
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The account this transaction belongs to.
    pub account_id: AccountId,
    /// The aggregator's ID for this transaction.
    pub external_id: String,
    /// The sign-normalized amount.
    pub amount: f64,
    /// A description of the transaction.
    pub description: String,
    /// The merchant or counterparty name, if known.
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

// "transaction" is a reserved word in SQL, hence the table name.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS bank_transaction (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            account_id INTEGER NOT NULL REFERENCES account(id),
            external_id TEXT NOT NULL UNIQUE,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            merchant TEXT,
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            status TEXT NOT NULL,
            transaction_type TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_transaction(row: &rusqlite::Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(row.get::<_, String>(1)?),
        account_id: row.get(2)?,
        external_id: row.get(3)?,
        amount: row.get(4)?,
        description: row.get(5)?,
        merchant: row.get(6)?,
        category: row.get(7)?,
        date: row.get(8)?,
        status: row.get(9)?,
        transaction_type: row.get(10)?,
    })
}

/// Insert transactions, skipping any whose external ID is already stored.
///
/// This is the idempotence mechanism for repeated syncs: re-running a sync
/// with identical upstream data inserts nothing. Returns the number of rows
/// actually inserted.
///
/// # Errors
/// Returns [Error::SqlError] if a write fails.
pub fn upsert_transactions(
    transactions: &[NewTransaction],
    user_id: &UserId,
    connection: &Connection,
) -> Result<usize, Error> {
    let mut statement = connection.prepare(
        "INSERT INTO bank_transaction (
            user_id, account_id, external_id, amount,
            description, merchant, category, date, status, transaction_type
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(external_id) DO NOTHING",
    )?;

    let mut inserted = 0;

    for transaction in transactions {
        inserted += statement.execute(params![
            user_id.as_str(),
            transaction.account_id,
            transaction.external_id,
            transaction.amount,
            transaction.description,
            transaction.merchant,
            transaction.category,
            transaction.date,
            transaction.status,
            transaction.transaction_type
        ])?;
    }

    Ok(inserted)
}

/// Get the user's `limit` most recently dated transactions across all
/// accounts, most recent first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn recent_transactions(
    user_id: &UserId,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, account_id, external_id, amount,
                description, merchant, category, date, status, transaction_type
            FROM bank_transaction
            WHERE user_id = ?1
            ORDER BY date DESC, id DESC
            LIMIT ?2",
        )?
        .query_map(params![user_id.as_str(), limit], map_row_to_transaction)?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}

#[cfg(test)]
pub(crate) fn test_new_transaction(
    account_id: AccountId,
    external_id: &str,
    amount: f64,
    date: Date,
) -> NewTransaction {
    NewTransaction {
        account_id,
        external_id: external_id.to_owned(),
        amount,
        description: "COFFEE SHOP".to_owned(),
        merchant: Some("Coffee Shop".to_owned()),
        category: "dining".to_owned(),
        date,
        status: "posted".to_owned(),
        transaction_type: "debit".to_owned(),
    }
}


#[cfg(test)]
mod upsert_transactions_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{UserId, account};

    use super::{
        create_transaction_table, recent_transactions, test_new_transaction, upsert_transactions,
    };

    fn get_test_connection() -> (Connection, UserId, account::AccountId) {
        let connection = Connection::open_in_memory().unwrap();
        account::create_account_table(&connection).unwrap();
        create_transaction_table(&connection).unwrap();

        let user_id = UserId::new("user-1");
        let (account_id, _) = account::upsert_account(
            &account::test_new_account("acc_123", "depository"),
            &user_id,
            &connection,
        )
        .unwrap();

        (connection, user_id, account_id)
    }

    #[test]
    fn inserts_all_new_transactions() {
        let (connection, user_id, account_id) = get_test_connection();
        let transactions = vec![
            test_new_transaction(account_id, "txn_1", -4.5, date!(2025 - 06 - 01)),
            test_new_transaction(account_id, "txn_2", -12.0, date!(2025 - 06 - 02)),
        ];

        let inserted = upsert_transactions(&transactions, &user_id, &connection).unwrap();

        assert_eq!(inserted, 2);
    }

    #[test]
    fn repeated_sync_inserts_nothing() {
        let (connection, user_id, account_id) = get_test_connection();
        let transactions = vec![
            test_new_transaction(account_id, "txn_1", -4.5, date!(2025 - 06 - 01)),
            test_new_transaction(account_id, "txn_2", -12.0, date!(2025 - 06 - 02)),
        ];
        upsert_transactions(&transactions, &user_id, &connection).unwrap();

        let inserted = upsert_transactions(&transactions, &user_id, &connection).unwrap();

        assert_eq!(inserted, 0);
        let stored = recent_transactions(&user_id, 10, &connection).unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn stores_the_debit_credit_marker() {
        let (connection, user_id, account_id) = get_test_connection();
        let mut credit = test_new_transaction(account_id, "txn_1", 20.0, date!(2025 - 06 - 01));
        credit.transaction_type = "credit".to_owned();

        upsert_transactions(&[credit], &user_id, &connection).unwrap();

        let stored = recent_transactions(&user_id, 10, &connection).unwrap();
        assert_eq!(stored[0].transaction_type, "credit");
    }

    #[test]
    fn overlapping_sync_inserts_only_new_rows() {
        let (connection, user_id, account_id) = get_test_connection();
        upsert_transactions(
            &[test_new_transaction(account_id, "txn_1", -4.5, date!(2025 - 06 - 01))],
            &user_id,
            &connection,
        )
        .unwrap();

        let inserted = upsert_transactions(
            &[
                test_new_transaction(account_id, "txn_1", -4.5, date!(2025 - 06 - 01)),
                test_new_transaction(account_id, "txn_2", -12.0, date!(2025 - 06 - 02)),
            ],
            &user_id,
            &connection,
        )
        .unwrap();

        assert_eq!(inserted, 1);
    }
}
