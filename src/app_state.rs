//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, aggregator::AggregatorClient, db::initialize};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The aggregator used for all sync flows.
    pub aggregator: Arc<dyn AggregatorClient>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection and an
    /// aggregator client.
    ///
    /// This function will initialize the database by adding the tables for the
    /// domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        aggregator: Arc<dyn AggregatorClient>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            aggregator,
        })
    }
}
