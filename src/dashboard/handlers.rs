//! Route handlers for the dashboard page and its history chart partials.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Month, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    dashboard::charts::{
        ECHARTS_SCRIPT_URL, history_chart_view, history_no_data_view, month_history_chart,
        year_history_chart,
    },
    history::{get_history_periods, get_month_series, get_year_series},
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    settings::get_user_settings,
    stats::{get_balance_stats, get_category_stats, month_date_range, stats_section},
    timezone::get_local_offset,
    user::UserID,
};

/// The state needed for the dashboard page and history partials.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions, settings and history.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Which aggregation the history chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// One bar pair per day of the selected month.
    Month,
    /// One bar pair per month of the selected year.
    Year,
}

/// Controls which period the history chart partial shows.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub timeframe: Timeframe,
    pub year: Option<i32>,
    pub month: Option<u8>,
}

/// Render the dashboard with stats for the current month and the history
/// chart for the current month's daily buckets.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
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

    // Sends users without settings to the set-up wizard.
    let settings = get_user_settings(user_id, &connection)?;

    let date_range = month_date_range(today);
    let balance = get_balance_stats(user_id, date_range.clone(), &connection)?;
    let category_stats = get_category_stats(user_id, date_range.clone(), &connection)?;

    let chart = month_history_markup(user_id, today.year(), today.month(), &connection)?;

    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-4"
            {
                h1 class="text-2xl font-bold" { "Dashboard" }

                (stats_section(&balance, &category_stats, &date_range, settings.currency.symbol()))

                (history_section(today.month(), &chart))
            }
        }
    };

    Ok(base(
        "Dashboard",
        &[HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned())],
        &content,
    )
    .into_response())
}

/// Render the history chart for the requested timeframe and period.
///
/// Targeted by the dashboard's timeframe/period selectors. Missing period
/// parameters default to the current month or year.
pub async fn get_history_partial(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let year = query.year.unwrap_or(today.year());
    let month = query
        .month
        .and_then(|month_number| Month::try_from(month_number).ok())
        .unwrap_or(today.month());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let markup = match query.timeframe {
        Timeframe::Month => month_history_markup(user_id, year, month, &connection)?,
        Timeframe::Year => year_history_markup(user_id, year, &connection)?,
    };

    Ok(markup.into_response())
}

/// Render the options for the dashboard's year selector.
///
/// The selector loads its options with htmx once the page is ready, so the
/// list always reflects the years the user has history for.
pub async fn get_history_periods_partial(
    State(state): State<DashboardState>,
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

    let years = get_history_periods(user_id, today.year(), &connection)?;

    let markup = html! {
        @for year in years {
            option value=(year) selected[year == today.year()] { (year) }
        }
    };

    Ok(markup.into_response())
}

fn month_history_markup(
    user_id: UserID,
    year: i32,
    month: Month,
    connection: &Connection,
) -> Result<Markup, Error> {
    let series = get_month_series(user_id, year, month, connection)?;

    if series.is_empty() {
        return Ok(history_no_data_view());
    }

    Ok(history_chart_view(&month_history_chart(year, month, &series)))
}

fn year_history_markup(
    user_id: UserID,
    year: i32,
    connection: &Connection,
) -> Result<Markup, Error> {
    let series = get_year_series(user_id, year, connection)?;

    if series.is_empty() {
        return Ok(history_no_data_view());
    }

    Ok(history_chart_view(&year_history_chart(year, &series)))
}

fn history_section(current_month: Month, initial_chart: &Markup) -> Markup {
    let month_options = (1u8..=12).map(|month_number| {
        Month::try_from(month_number).expect("month numbers 1-12 are always valid")
    });

    html! {
        section class="w-full bg-white dark:bg-gray-800 border border-gray-200
            dark:border-gray-700 rounded-lg p-4 shadow-md space-y-4"
        {
            h2 class="text-lg font-semibold" { "History" }

            form
                hx-get=(endpoints::HISTORY_API)
                hx-target="#history-chart"
                hx-swap="innerHTML"
                hx-trigger="change"
                class="flex flex-wrap items-end gap-4"
            {
                div
                {
                    label for="timeframe" class=(FORM_LABEL_STYLE) { "Timeframe" }
                    select id="timeframe" name="timeframe" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="month" selected { "Monthly" }
                        option value="year" { "Yearly" }
                    }
                }

                div
                {
                    label for="year" class=(FORM_LABEL_STYLE) { "Year" }
                    // The options are filled in once the page loads so the
                    // list tracks the years the user actually has history for.
                    select
                        id="year"
                        name="year"
                        hx-get=(endpoints::HISTORY_PERIODS_API)
                        hx-trigger="load"
                        hx-target="this"
                        hx-swap="innerHTML"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {}
                }

                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                    select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for month in month_options {
                            option value=(month as u8) selected[month == current_month]
                            {
                                (month)
                            }
                        }
                    }
                }
            }

            div id="history-chart"
            {
                (initial_chart)
            }
        }
    }
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        db::initialize,
        endpoints,
        history::record_in_history,
        settings::{Currency, upsert_user_settings},
        test_utils::{assert_valid_html, get_header, parse_html_document},
        transaction::{NewTransaction, TransactionKind, create_transaction},
        user::UserID,
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> DashboardState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn page_renders_stats_and_history_chart() {
        let state = get_test_state();
        let user_id = UserID::new(1);
        let today = OffsetDateTime::now_utc().date();
        {
            let connection = state.db_connection.lock().unwrap();
            upsert_user_settings(user_id, Currency::USD, &connection)
                .expect("Could not upsert settings");
            create_transaction(
                NewTransaction {
                    user_id,
                    kind: TransactionKind::Expense,
                    date: today,
                    description: None,
                    amount: 42.0,
                    category: "Groceries".to_string(),
                    category_icon: "🛒".to_string(),
                },
                &connection,
            )
            .expect("Could not create test transaction");
            record_in_history(user_id, today, TransactionKind::Expense, 42.0, &connection)
                .expect("Could not record history");
        }

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.html();
        assert!(text.contains("Groceries"));
        assert!(text.contains("History"));
        assert!(
            text.contains("history-chart-canvas"),
            "want the history chart container in the page"
        );
        assert!(text.contains("echarts"), "want the echarts script loaded");
    }

    #[tokio::test]
    async fn page_shows_no_data_message_without_history() {
        let state = get_test_state();
        let user_id = UserID::new(1);
        upsert_user_settings(user_id, Currency::USD, &state.db_connection.lock().unwrap())
            .expect("Could not upsert settings");

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .into_response();

        let html = parse_html_document(response).await;
        assert!(html.html().contains("No history for this period yet."));
    }

    #[tokio::test]
    async fn page_redirects_to_settings_wizard_without_settings() {
        let state = get_test_state();

        let response = get_dashboard_page(State(state), Extension(UserID::new(1)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::SETTINGS_VIEW);
    }
}
