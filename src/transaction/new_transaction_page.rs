//! The page for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    category::{Category, get_categories},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        currency_input_styles,
    },
    navigation::NavBar,
    settings::get_user_settings,
    timezone::get_local_offset,
    transaction::TransactionKind,
    user::UserID,
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for accessing categories and settings.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    // Redirects to the settings wizard when no currency has been chosen yet.
    let settings = get_user_settings(user_id, &connection)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(new_transaction_view(today, &categories, settings.currency.symbol()).into_response())
}

fn new_transaction_view(today: Date, categories: &[Category], currency_symbol: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let kind_radio = |kind: TransactionKind, checked: bool| {
        let id = format!("kind-{kind}");

        html! {
            div class="flex items-center gap-2"
            {
                input
                    id=(id)
                    type="radio"
                    name="kind"
                    value=(kind)
                    checked[checked]
                    class=(FORM_RADIO_INPUT_STYLE);

                label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (kind.label()) }
            }
        }
    };

    let category_options = |kind: TransactionKind| {
        html! {
            optgroup label=(kind.label())
            {
                @for category in categories.iter().filter(|category| category.kind == kind) {
                    option value=(category.name)
                    {
                        (category.icon) " " (category.name)
                    }
                }
            }
        }
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Type" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        (kind_radio(TransactionKind::Expense, true))
                        (kind_radio(TransactionKind::Income, false))
                    }
                }

                div class="input-wrapper w-full"
                {
                    label
                        for="amount"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Amount"
                    }

                    input
                        id="amount"
                        type="number"
                        name="amount"
                        min="0"
                        step="0.01"
                        placeholder="0.00"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label
                        for="date"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Date"
                    }

                    input
                        id="date"
                        type="date"
                        name="date"
                        value=(today)
                        max=(today)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label
                        for="category"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Category"
                    }

                    @if categories.is_empty() {
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "You have no categories yet. "
                            a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE)
                            {
                                "Create a category"
                            }
                            " first."
                        }
                    } @else {
                        select
                            id="category"
                            name="category"
                            required
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            (category_options(TransactionKind::Expense))
                            (category_options(TransactionKind::Income))
                        }
                    }
                }

                div
                {
                    label
                        for="description"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Description (optional)"
                    }

                    input
                        id="description"
                        type="text"
                        name="description"
                        placeholder="Weekly grocery shop"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button
                    type="submit"
                    disabled[categories.is_empty()]
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    "Create Transaction"
                }
            }
        }
    };

    base(
        "New Transaction",
        &[currency_input_styles(currency_symbol)],
        &content,
    )
}
