//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionID, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction added money to the budget or took money out of it.
///
/// The sign of a transaction is carried by its kind, amounts are always
/// strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// The lowercase string used in the database and in form values.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// The capitalized label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid transaction kind {other:?}").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The category name and icon are snapshots copied from the category when the
/// transaction was created, not foreign keys, so deleting a category leaves
/// existing transactions untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionID,
    /// The ID of the user the transaction belongs to.
    pub user_id: UserID,
    /// Whether this transaction is an income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened. Never in the future.
    pub date: Date,
    /// An optional text description of what the transaction was for.
    pub description: Option<String>,
    /// The amount of money spent or earned in this transaction. Always
    /// strictly positive.
    pub amount: f64,
    /// The name of the category at the time the transaction was created.
    pub category: String,
    /// The icon of the category at the time the transaction was created.
    pub category_icon: String,
}

/// The data needed to insert a transaction row.
///
/// The ID is assigned by the database, see [create_transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: UserID,
    pub kind: TransactionKind,
    pub date: Date,
    pub description: Option<String>,
    pub amount: f64,
    pub category: String,
    pub category_icon: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            date TEXT NOT NULL,
            description TEXT,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            category_icon TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id)
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Insert a new transaction row and return it with its generated ID.
///
/// This only writes the transaction row. Callers are responsible for updating
/// the history buckets in the same SQL transaction, see
/// [crate::history::record_in_history].
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or negative,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if new_transaction.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(new_transaction.amount));
    }

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, kind, date, description, amount, category, category_icon)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id, user_id, kind, date, description, amount, category, category_icon",
        )?
        .query_row(
            (
                new_transaction.user_id.as_i64(),
                new_transaction.kind,
                new_transaction.date,
                new_transaction.description,
                new_transaction.amount,
                new_transaction.category,
                new_transaction.category_icon,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve one of the user's transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionID,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, kind, date, description, amount, category, category_icon
            FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(Error::from)?;

    Ok(transaction)
}

/// Get the total number of transactions the user has.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = :user_id",
            &[(":user_id", &user_id.as_i64())],
            |row| row.get(0).map(|count: i64| count as u64),
        )
        .map_err(|error| error.into())
}

/// Get one page of the user's transactions, most recent first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_transactions_page(
    user_id: UserID,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, date, description, amount, category, category_icon
            FROM \"transaction\"
            WHERE user_id = :user_id
            ORDER BY date DESC, id DESC
            LIMIT :limit OFFSET :offset",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64()),
                (":limit", &(limit as i64)),
                (":offset", &(offset as i64)),
            ],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Get all of the user's transactions in chronological order, for the CSV
/// export.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub(super) fn get_all_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, date, description, amount, category, category_icon
            FROM \"transaction\"
            WHERE user_id = :user_id
            ORDER BY date ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the user's transactions and return the deleted row so the
/// caller can reverse the corresponding history bucket increments.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub(super) fn delete_transaction(
    id: TransactionID,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id
            RETURNING id, user_id, kind, date, description, amount, category, category_icon",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::DeleteMissingTransaction,
            error => error.into(),
        })
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: i64 = row.get(1)?;
    let kind = row.get(2)?;
    let date = row.get(3)?;
    let description = row.get(4)?;
    let amount = row.get(5)?;
    let category = row.get(6)?;
    let category_icon = row.get(7)?;

    Ok(Transaction {
        id,
        user_id: UserID::new(raw_user_id),
        kind,
        date,
        description,
        amount,
        category,
        category_icon,
    })
}

// ============================================================================
// TESTS
// ============================================================================
