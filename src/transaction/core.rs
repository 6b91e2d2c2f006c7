//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, database_id::TransactionId, user::UserID};

/// The number of digits stored after the decimal point of an amount.
const AMOUNT_SCALE: u32 = 2;

/// The largest magnitude an amount may have, in hundredths.
///
/// Amounts are stored with ten significant digits, two of which are after the
/// decimal point, so the largest amount is 99,999,999.99.
const MAX_AMOUNT_HUNDREDTHS: i128 = 9_999_999_999;

/// The format of transaction dates in request bodies, e.g. "2024-01-15".
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user the transaction belongs to.
    pub user_id: UserID,
    /// The amount of money spent or earned in this transaction.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    /// What the money was spent on or earned from, e.g. "groceries".
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
}

/// The request body for creating a transaction, before validation.
///
/// The handler echoes this back to the client once the transaction is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// The ID of the user the transaction belongs to.
    pub user_id: UserID,
    /// The amount of money spent or earned, as a JSON number or a numeric string.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    /// What the money was spent on or earned from.
    pub category: String,
    /// The date of the transaction in the form "YYYY-MM-DD".
    pub date: String,
}

/// The validated data for creating a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The ID of the user the transaction belongs to.
    ///
    /// This is not checked against the user table here, the database's
    /// foreign key constraint rejects unknown users on insert.
    pub user_id: UserID,
    /// The amount of money spent or earned.
    pub amount: Decimal,
    /// What the money was spent on or earned from.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
}

impl TryFrom<&CreateTransactionRequest> for NewTransaction {
    type Error = Error;

    fn try_from(request: &CreateTransactionRequest) -> Result<Self, Self::Error> {
        let date = Date::parse(&request.date, DATE_FORMAT).map_err(|error| Error::Validation {
            field: "date",
            reason: format!(
                "\"{}\" is not a calendar date in the form YYYY-MM-DD: {error}",
                request.date
            ),
        })?;

        Ok(Self {
            user_id: request.user_id,
            amount: request.amount,
            category: request.category.clone(),
            date,
        })
    }
}

/// Convert `amount` to the whole number of hundredths stored in the database.
///
/// Amounts with more than two decimal places are rounded half away from zero.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the amount has more than eight digits
/// before the decimal point.
fn amount_to_hundredths(amount: Decimal) -> Result<i64, Error> {
    let mut rounded =
        amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AMOUNT_SCALE);

    let hundredths = rounded.mantissa();

    if rounded.scale() != AMOUNT_SCALE || hundredths.abs() > MAX_AMOUNT_HUNDREDTHS {
        return Err(Error::AmountOutOfRange(amount));
    }

    i64::try_from(hundredths).map_err(|_| Error::AmountOutOfRange(amount))
}

fn hundredths_to_amount(hundredths: i64) -> Decimal {
    Decimal::new(hundredths, AMOUNT_SCALE)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// Amounts are stored as a whole number of hundredths. Deleting a user that
/// transactions still refer to is restricted.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                category TEXT NOT NULL CHECK (length(category) <= 50),
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id) ON UPDATE CASCADE ON DELETE RESTRICT
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_id ON transactions(user_id);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::AmountOutOfRange] if the amount does not fit into the amount column,
/// - or [Error::SqlError] if there is some other SQL error, including a
///   `user_id` that does not refer to a user.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = amount_to_hundredths(new_transaction.amount)?;

    let transaction = connection
        .prepare(
            "INSERT INTO transactions (user_id, amount, category, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, amount, category, date",
        )?
        .query_row(
            (
                new_transaction.user_id.as_i64(),
                amount,
                new_transaction.category,
                new_transaction.date,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare("SELECT id, user_id, amount, category, date FROM transactions WHERE id = :id")?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound(id),
            error => error.into(),
        })
}

/// Retrieve every transaction in the database, ordered by ID.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare("SELECT id, user_id, amount, category, date FROM transactions ORDER BY id")?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Delete the transaction with the ID `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound(id));
    }

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let amount = hundredths_to_amount(row.get(2)?);
    let category = row.get(3)?;
    let date = row.get(4)?;

    Ok(Transaction {
        id,
        user_id,
        amount,
        category,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod validation_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{Error, UserID};

    use super::{CreateTransactionRequest, NewTransaction};

    fn request(date: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            user_id: UserID::new(1),
            amount: Decimal::new(4250, 2),
            category: "groceries".to_owned(),
            date: date.to_owned(),
        }
    }

    #[test]
    fn new_transaction_succeeds_with_calendar_date() {
        let new_transaction = NewTransaction::try_from(&request("2024-01-15")).unwrap();

        assert_eq!(
            new_transaction,
            NewTransaction {
                user_id: UserID::new(1),
                amount: Decimal::new(4250, 2),
                category: "groceries".to_owned(),
                date: date!(2024 - 01 - 15),
            }
        );
    }

    #[test]
    fn new_transaction_accepts_future_dates() {
        assert!(NewTransaction::try_from(&request("2999-12-31")).is_ok());
    }

    #[test]
    fn new_transaction_fails_on_malformed_date() {
        for date in ["15/01/2024", "2024-13-01", "2023-02-29", "yesterday", ""] {
            let result = NewTransaction::try_from(&request(date));

            assert!(
                matches!(result, Err(Error::Validation { field: "date", .. })),
                "want a validation error for {date:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn request_accepts_float_and_integer_amounts() {
        let from_float: CreateTransactionRequest = serde_json::from_str(
            r#"{"user_id": 1, "amount": 42.5, "category": "groceries", "date": "2024-01-15"}"#,
        )
        .unwrap();
        let from_integer: CreateTransactionRequest = serde_json::from_str(
            r#"{"user_id": 1, "amount": 42, "category": "groceries", "date": "2024-01-15"}"#,
        )
        .unwrap();

        assert_eq!(from_float.amount, Decimal::new(4250, 2));
        assert_eq!(from_integer.amount, Decimal::new(42, 0));
    }

    #[test]
    fn request_accepts_numeric_string_amount() {
        let request: CreateTransactionRequest = serde_json::from_str(
            r#"{"user_id": 1, "amount": "-12.34", "category": "refund", "date": "2024-01-15"}"#,
        )
        .unwrap();

        assert_eq!(request.amount, Decimal::new(-1234, 2));
    }

    #[test]
    fn amount_is_serialized_as_json_number() {
        let json = serde_json::to_value(request("2024-01-15")).unwrap();

        assert_eq!(json["amount"], serde_json::json!(42.5));
    }

    #[test]
    fn request_rejects_non_numeric_amount() {
        let result = serde_json::from_str::<CreateTransactionRequest>(
            r#"{"user_id": 1, "amount": "lots", "category": "groceries", "date": "2024-01-15"}"#,
        );

        assert!(result.is_err());
    }
}
