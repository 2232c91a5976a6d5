//! The session table and bearer-token validation.
//!
//! Sessions are issued by the hosted auth provider, not by this server: rows
//! are provisioned externally (or by `create_test_db` for manual testing) and
//! this module only validates presented tokens. Only the SHA-256 digest of a
//! token is stored, so a leaked database does not leak usable credentials.

use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::{Error, UserId};

pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS session (
            token_hash TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// The hex-encoded SHA-256 digest of a session token.
pub fn hash_session_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());

    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Store a session for `user_id` that expires at `expires_at`.
///
/// # Errors
/// Returns [Error::SqlError] if the write fails.
pub fn insert_session(
    token: &str,
    user_id: &UserId,
    expires_at: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT OR REPLACE INTO session (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
        params![hash_session_token(token), user_id.as_str(), expires_at],
    )?;

    Ok(())
}

/// Resolve a bearer token to the owning user.
///
/// # Errors
/// Returns [Error::Unauthorized] if the token is unknown or the session has
/// expired.
pub fn get_session_user(token: &str, connection: &Connection) -> Result<UserId, Error> {
    let (user_id, expires_at) = connection
        .query_row(
            "SELECT user_id, expires_at FROM session WHERE token_hash = ?1",
            params![hash_session_token(token)],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, OffsetDateTime>(1)?,
                ))
            },
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::Unauthorized,
            error => Error::from(error),
        })?;

    if expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::Unauthorized);
    }

    Ok(UserId::new(user_id))
}
