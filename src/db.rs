/*! Database initialisation and the scoped sessions used by request handlers. */

use std::sync::Mutex;

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, transaction::create_transaction_table, user::create_user_table};

/// Create the application's tables if they do not exist and switch on
/// foreign key enforcement for `connection`.
///
/// Foreign key enforcement is a per-connection setting in SQLite, so this
/// must be called on every connection the application uses.
///
/// # Errors
/// Returns an error if the tables could not be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Run `operation` inside a database session scoped to the caller.
///
/// A session holds the connection lock and an open SQL transaction. The
/// transaction is committed only if `operation` succeeds. On every path the
/// lock is released when this function returns, and an uncommitted
/// transaction is rolled back when it is dropped.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the connection lock is poisoned,
/// otherwise any error returned by `operation` or by the commit.
pub fn with_session<T, F>(db_connection: &Mutex<Connection>, operation: F) -> Result<T, Error>
where
    F: FnOnce(&Connection) -> Result<T, Error>,
{
    let connection = db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    // Holding the lock for the whole session rules out nested transactions.
    let transaction = connection.unchecked_transaction()?;
    let result = operation(&transaction)?;
    transaction.commit()?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::with_session;

    fn get_test_connection() -> Mutex<Connection> {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        Mutex::new(connection)
    }

    fn count_users(connection: &Connection) -> i64 {
        connection
            .query_row("SELECT COUNT(id) FROM users", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert_eq!(initialize(&connection), Ok(()));
    }

    #[test]
    fn initialize_enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let enabled: bool = connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();

        assert!(enabled);
    }

    #[test]
    fn session_commits_on_success() {
        let db_connection = get_test_connection();

        with_session(&db_connection, |connection| {
            connection.execute(
                "INSERT INTO users (name, email) VALUES ('Alice', 'alice@example.com')",
                (),
            )?;
            Ok(())
        })
        .unwrap();

        assert_eq!(count_users(&db_connection.lock().unwrap()), 1);
    }

    #[test]
    fn session_rolls_back_on_error() {
        let db_connection = get_test_connection();

        let result: Result<(), Error> = with_session(&db_connection, |connection| {
            connection.execute(
                "INSERT INTO users (name, email) VALUES ('Alice', 'alice@example.com')",
                (),
            )?;
            Err(Error::TransactionNotFound(1))
        });

        assert_eq!(result, Err(Error::TransactionNotFound(1)));
        assert_eq!(count_users(&db_connection.lock().unwrap()), 0);
    }

    #[test]
    fn session_releases_lock_after_error() {
        let db_connection = get_test_connection();

        let _ = with_session(&db_connection, |_| -> Result<(), Error> {
            Err(Error::TransactionNotFound(1))
        });

        assert!(db_connection.try_lock().is_ok());
    }
}
