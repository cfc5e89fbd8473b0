//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    category::get_category_by_name,
    history::record_in_history,
    timezone::get_local_offset,
    transaction::{NewTransaction, TransactionKind, core::create_transaction},
    user::UserID,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The value of the transaction in the user's currency.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    pub description: String,
    /// The name of one of the user's categories matching `kind`.
    pub category: String,
}

/// A route handler for creating a new transaction, redirects to the
/// transactions view on success.
///
/// The transaction row and its history buckets are written in one SQL
/// transaction so the log and the aggregates cannot drift apart.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(local_timezone) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    if form.date > today {
        tracing::error!("Tried to create a transaction dated in the future");

        return Error::FutureDate(form.date).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let category = match get_category_by_name(user_id, &form.category, form.kind, &connection) {
        Ok(category) => category,
        Err(error @ Error::CategoryNotFound(_)) => return error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not look up category: {error}");
            return error.into_alert_response();
        }
    };

    let new_transaction = NewTransaction {
        user_id,
        kind: form.kind,
        date: form.date,
        description: match form.description.trim() {
            "" => None,
            description => Some(description.to_owned()),
        },
        amount: form.amount,
        category: category.name.to_string(),
        category_icon: category.icon,
    };

    if let Err(error) = create_with_history(new_transaction, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// Inserts the transaction row and bumps its history buckets atomically.
fn create_with_history(new_transaction: NewTransaction, connection: &Connection) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let created = create_transaction(new_transaction, &sql_transaction)?;
    record_in_history(
        created.user_id,
        created.date,
        created.kind,
        created.amount,
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(())
}
