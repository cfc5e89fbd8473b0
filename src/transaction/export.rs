//! Defines the endpoint for exporting transactions as CSV.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    transaction::core::get_all_transactions,
    user::UserID,
};

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that downloads all of the user's transactions as a CSV
/// file, oldest first.
pub async fn export_transactions_endpoint(
    State(state): State<ExportTransactionsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_all_transactions(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "kind", "category", "description", "amount"])
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.date.to_string(),
                transaction.kind.to_string(),
                transaction.category,
                transaction.description.unwrap_or_default(),
                transaction.amount.to_string(),
            ])
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    let csv_bytes = writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv_bytes,
    )
        .into_response())
}
