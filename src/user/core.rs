//! Defines the user model, its validation and the database queries for users.

use std::fmt::Display;

use email_address::{EmailAddress, Options};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The name of a user, guaranteed to be non-empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// Create a user name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `name` is an empty string.
    pub fn new(name: String) -> Result<Self, Error> {
        if name.is_empty() {
            Err(Error::Validation {
                field: "name",
                reason: "must contain at least one character".to_owned(),
            })
        } else {
            Ok(Self(name))
        }
    }

    /// Create a user name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's name.
    pub name: UserName,
    /// The user's email address, unique among users.
    pub email: EmailAddress,
}

/// The request body for creating a user, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// The name of the new user.
    pub name: String,
    /// The email address of the new user.
    pub email: String,
}

/// The validated data for creating a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The name of the new user.
    pub name: UserName,
    /// The email address of the new user.
    pub email: EmailAddress,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = Error;

    fn try_from(request: CreateUserRequest) -> Result<Self, Self::Error> {
        let name = UserName::new(request.name)?;
        let email = EmailAddress::parse_with_options(
            &request.email,
            Options::default().without_display_text(),
        )
        .map_err(|error| Error::Validation {
            field: "email",
            reason: format!("\"{}\" is not a valid email address: {error}", request.email),
        })?;

        Ok(Self { name, email })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the user table.
///
/// Email uniqueness is checked by [create_user] rather than by a constraint
/// on the table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 50),
                email TEXT NOT NULL COLLATE NOCASE CHECK (length(email) <= 50)
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// The email address is looked up before inserting, so this should be called
/// inside a session to keep the check and the insert in the same SQL transaction.
///
/// # Errors
///
/// This function will return a:
/// - [Error::DuplicateEmail] if a user with the same email already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    if get_user_by_email(&new_user.email, connection)?.is_some() {
        return Err(Error::DuplicateEmail(new_user.email.to_string()));
    }

    let user = connection
        .prepare("INSERT INTO users (name, email) VALUES (?1, ?2) RETURNING id, name, email")?
        .query_row(
            (new_user.name.as_ref(), new_user.email.as_str()),
            map_user_row,
        )?;

    Ok(user)
}

/// Get the user with the email address `email`, if one exists.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_user_by_email(
    email: &EmailAddress,
    connection: &Connection,
) -> Result<Option<User>, Error> {
    connection
        .prepare("SELECT id, name, email FROM users WHERE email = :email COLLATE NOCASE")?
        .query_row(&[(":email", email.as_str())], map_user_row)
        .optional()
        .map_err(|error| error.into())
}

/// Get every user in the database, ordered by ID.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare("SELECT id, name, email FROM users ORDER BY id")?
        .query_map([], map_user_row)?
        .map(|maybe_user| maybe_user.map_err(Error::from))
        .collect()
}

/// Delete the user with the ID `user_id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::UserNotFound] if there is no user with the ID `user_id`,
/// - [Error::UserHasTransactions] if transactions still refer to the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let has_transactions: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM transactions WHERE user_id = :id)",
        &[(":id", &user_id.as_i64())],
        |row| row.get(0),
    )?;

    if has_transactions {
        return Err(Error::UserHasTransactions(user_id));
    }

    let rows_affected = connection.execute(
        "DELETE FROM users WHERE id = :id",
        &[(":id", &user_id.as_i64())],
    )?;

    if rows_affected == 0 {
        return Err(Error::UserNotFound(user_id));
    }

    Ok(())
}

/// Map a database row to a [User].
pub fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = UserID::new(row.get(0)?);
    let name = UserName::new_unchecked(row.get(1)?);
    let email = EmailAddress::new_unchecked(row.get::<_, String>(2)?);

    Ok(User { id, name, email })
}

// ============================================================================
// TESTS
// ============================================================================
