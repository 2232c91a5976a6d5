//! Database initialization for the application's tables.

use rusqlite::{Connection, TransactionBehavior};

use crate::{Error, account, auth, enrollment, transaction};

/// Create the application's tables if they do not exist.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let sql_transaction =
        rusqlite::Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    account::create_account_table(&sql_transaction)?;
    transaction::create_transaction_table(&sql_transaction)?;
    enrollment::create_enrollment_table(&sql_transaction)?;
    auth::create_session_table(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        initialize(&connection).expect("Could not initialize database");

        let mut statement = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let tables: Vec<String> = statement
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();

        for table in ["account", "bank_transaction", "enrollment", "session"] {
            assert!(tables.contains(&table.to_owned()), "missing table {table}");
        }
    }

    #[test]
    fn is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();
        initialize(&connection).expect("second initialize should succeed");
    }
}
