//! The enrollment model: the access credential created when a user links an
//! institution through an aggregator.

use rusqlite::{Connection, params};

use crate::{Error, UserId};

pub type EnrollmentId = i64;

/// A user's consent to link one institution, holding the aggregator access
/// credential used to authorize balance and transaction fetches.
///
/// An enrollment belongs to exactly one user and is never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    /// The ID for the enrollment in the application database.
    pub id: EnrollmentId,
    /// The owning user.
    pub user_id: UserId,
    /// Which aggregator issued the credential, e.g. "teller" or "plaid".
    pub aggregator: String,
    /// The aggregator's identifier for the linked institution (Plaid item ID
    /// or Teller enrollment ID).
    pub item_id: String,
    /// The access token used to authorize aggregator calls.
    pub access_token: String,
    /// The institution the user linked, if the aggregator reported one.
    pub institution_name: Option<String>,
}

/// An enrollment that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnrollment {
    /// Which aggregator issued the credential.
    pub aggregator: String,
    /// The aggregator's identifier for the linked institution.
    pub item_id: String,
    /// The access token used to authorize aggregator calls.
    pub access_token: String,
    /// The institution the user linked, if known.
    pub institution_name: Option<String>,
}

pub fn create_enrollment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS enrollment (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            aggregator TEXT NOT NULL,
            item_id TEXT NOT NULL,
            access_token TEXT NOT NULL,
            institution_name TEXT,
            UNIQUE(user_id, item_id)
        )",
        (),
    )?;

    Ok(())
}

/// Insert an enrollment, or refresh its access token if the user has already
/// linked the item.
///
/// Relinking an institution issues a fresh token for the same item ID, so the
/// stored token must be replaced rather than duplicated. The conflict key is
/// `(user_id, item_id)`: an item ID presented by one user must never touch
/// another user's credential.
///
/// # Errors
/// Returns [Error::SqlError] if the write fails.
pub fn upsert_enrollment(
    new_enrollment: &NewEnrollment,
    user_id: &UserId,
    connection: &Connection,
) -> Result<EnrollmentId, Error> {
    connection.execute(
        "INSERT INTO enrollment (user_id, aggregator, item_id, access_token, institution_name)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(user_id, item_id) DO UPDATE SET
            access_token = excluded.access_token,
            institution_name = excluded.institution_name",
        params![
            user_id.as_str(),
            new_enrollment.aggregator,
            new_enrollment.item_id,
            new_enrollment.access_token,
            new_enrollment.institution_name
        ],
    )?;

    let id = connection.query_row(
        "SELECT id FROM enrollment WHERE user_id = ?1 AND item_id = ?2",
        params![user_id.as_str(), new_enrollment.item_id],
        |row| row.get(0),
    )?;

    Ok(id)
}

/// Get all of the user's enrollments.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn list_enrollments(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<Enrollment>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, aggregator, item_id, access_token, institution_name
            FROM enrollment
            WHERE user_id = ?1
            ORDER BY id",
        )?
        .query_map(params![user_id.as_str()], |row| {
            Ok(Enrollment {
                id: row.get(0)?,
                user_id: UserId::new(row.get::<_, String>(1)?),
                aggregator: row.get(2)?,
                item_id: row.get(3)?,
                access_token: row.get(4)?,
                institution_name: row.get(5)?,
            })
        })?
        .map(|enrollment| enrollment.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod enrollment_tests {
    use rusqlite::Connection;

    use crate::UserId;

    use super::{NewEnrollment, create_enrollment_table, list_enrollments, upsert_enrollment};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_enrollment_table(&connection).unwrap();
        connection
    }

    fn test_enrollment(item_id: &str, access_token: &str) -> NewEnrollment {
        NewEnrollment {
            aggregator: "teller".to_owned(),
            item_id: item_id.to_owned(),
            access_token: access_token.to_owned(),
            institution_name: Some("Chase".to_owned()),
        }
    }

    #[test]
    fn sql_is_valid() {
        let connection = Connection::open_in_memory().unwrap();

        assert_eq!(Ok(()), create_enrollment_table(&connection));
    }

    #[test]
    fn inserts_enrollment() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");

        upsert_enrollment(&test_enrollment("enr_1", "token_abc"), &user_id, &connection).unwrap();

        let enrollments = list_enrollments(&user_id, &connection).unwrap();
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0].access_token, "token_abc");
    }

    #[test]
    fn relinking_replaces_token() {
        let connection = get_test_connection();
        let user_id = UserId::new("user-1");
        let first_id =
            upsert_enrollment(&test_enrollment("enr_1", "token_abc"), &user_id, &connection)
                .unwrap();

        let second_id =
            upsert_enrollment(&test_enrollment("enr_1", "token_def"), &user_id, &connection)
                .unwrap();

        assert_eq!(first_id, second_id);
        let enrollments = list_enrollments(&user_id, &connection).unwrap();
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0].access_token, "token_def");
    }

    #[test]
    fn same_item_id_cannot_touch_another_users_credential() {
        let connection = get_test_connection();
        let owner = UserId::new("user-1");
        upsert_enrollment(&test_enrollment("enr_1", "owner_token"), &owner, &connection).unwrap();

        upsert_enrollment(
            &test_enrollment("enr_1", "attacker_token"),
            &UserId::new("user-2"),
            &connection,
        )
        .unwrap();

        let enrollments = list_enrollments(&owner, &connection).unwrap();
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0].access_token, "owner_token");
    }

    #[test]
    fn does_not_list_other_users_enrollments() {
        let connection = get_test_connection();
        upsert_enrollment(
            &test_enrollment("enr_1", "token_abc"),
            &UserId::new("user-1"),
            &connection,
        )
        .unwrap();

        let enrollments = list_enrollments(&UserId::new("user-2"), &connection).unwrap();

        assert!(enrollments.is_empty());
    }
}
