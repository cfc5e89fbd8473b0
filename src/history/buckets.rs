//! Write-side maintenance of the history buckets.

use rusqlite::Connection;
use time::Date;

use crate::{Error, transaction::TransactionKind, user::UserID};

/// Initialize the month and year history bucket tables.
///
/// `month_history` holds one row per (user, year, month, day) and backs the
/// per-day chart for a single month. `year_history` holds one row per
/// (user, year, month) and backs the per-month chart for a single year.
pub fn create_history_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS month_history (
            user_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            day INTEGER NOT NULL,
            income REAL NOT NULL DEFAULT 0,
            expense REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, year, month, day)
        );

        CREATE TABLE IF NOT EXISTS year_history (
            user_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            income REAL NOT NULL DEFAULT 0,
            expense REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, year, month)
        );",
    )?;

    Ok(())
}

/// Add a transaction's amount to its month and year buckets, creating the
/// buckets on first use.
///
/// Callers must run this in the same SQL transaction as the transaction row
/// insert so that bucket sums never drift from the transaction log.
pub fn record_in_history(
    user_id: UserID,
    date: Date,
    kind: TransactionKind,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let (income, expense) = match kind {
        TransactionKind::Income => (amount, 0.0),
        TransactionKind::Expense => (0.0, amount),
    };

    apply_history_delta(user_id, date, income, expense, connection)
}

/// Subtract a deleted transaction's amount from its month and year buckets.
///
/// Callers must run this in the same SQL transaction as the transaction row
/// deletion so that bucket sums never drift from the transaction log.
pub fn remove_from_history(
    user_id: UserID,
    date: Date,
    kind: TransactionKind,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let (income, expense) = match kind {
        TransactionKind::Income => (-amount, 0.0),
        TransactionKind::Expense => (0.0, -amount),
    };

    apply_history_delta(user_id, date, income, expense, connection)
}

fn apply_history_delta(
    user_id: UserID,
    date: Date,
    income: f64,
    expense: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let year = date.year();
    let month = date.month() as u8;
    let day = date.day();

    connection.execute(
        "INSERT INTO month_history (user_id, year, month, day, income, expense)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT (user_id, year, month, day)
        DO UPDATE SET income = income + excluded.income, expense = expense + excluded.expense",
        (user_id.as_i64(), year, month, day, income, expense),
    )?;

    connection.execute(
        "INSERT INTO year_history (user_id, year, month, income, expense)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (user_id, year, month)
        DO UPDATE SET income = income + excluded.income, expense = expense + excluded.expense",
        (user_id.as_i64(), year, month, income, expense),
    )?;

    Ok(())
}
