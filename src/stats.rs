//! Aggregated statistics over a date range.
//!
//! Totals are computed from the transaction log rather than the history
//! buckets so an arbitrary [from, to] range can be queried. The buckets in
//! [crate::history] only serve the fixed month/year chart series.

use std::{
    ops::RangeInclusive,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, currency_rounded_with_tooltip, format_currency},
    settings::get_user_settings,
    timezone::get_local_offset,
    transaction::TransactionKind,
    user::UserID,
};

/// Total income and expense for a user over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BalanceStats {
    pub income: f64,
    pub expense: f64,
}

impl BalanceStats {
    /// Income minus expense.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// The amount spent or earned per category over a date range.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub kind: TransactionKind,
    pub category: String,
    pub category_icon: String,
    pub amount: f64,
}

/// Sum the user's income and expense over an inclusive date range.
pub fn get_balance_stats(
    user_id: UserID,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<BalanceStats, Error> {
    let mut stats = BalanceStats::default();

    let mut statement = connection.prepare(
        "SELECT kind, COALESCE(SUM(amount), 0) FROM \"transaction\"
        WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
        GROUP BY kind",
    )?;
    let rows = statement.query_map(
        (user_id.as_i64(), date_range.start(), date_range.end()),
        |row| {
            let kind: TransactionKind = row.get(0)?;
            let total: f64 = row.get(1)?;
            Ok((kind, total))
        },
    )?;

    for row in rows {
        let (kind, total) = row?;

        match kind {
            TransactionKind::Income => stats.income = total,
            TransactionKind::Expense => stats.expense = total,
        }
    }

    Ok(stats)
}

/// Sum the user's transactions per (kind, category, icon) over an inclusive
/// date range, largest amounts first.
pub fn get_category_stats(
    user_id: UserID,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<CategoryStat>, Error> {
    connection
        .prepare(
            "SELECT kind, category, category_icon, SUM(amount) FROM \"transaction\"
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
            GROUP BY kind, category, category_icon
            ORDER BY SUM(amount) DESC",
        )?
        .query_map(
            (user_id.as_i64(), date_range.start(), date_range.end()),
            |row| {
                Ok(CategoryStat {
                    kind: row.get(0)?,
                    category: row.get(1)?,
                    category_icon: row.get(2)?,
                    amount: row.get(3)?,
                })
            },
        )?
        .map(|maybe_stat| maybe_stat.map_err(|error| error.into()))
        .collect()
}

/// The first and last day of the month containing `date`.
pub fn month_date_range(date: Date) -> RangeInclusive<Date> {
    let first_day = date.replace_day(1).expect("day 1 is valid for every month");
    let last_day = date
        .replace_day(time::util::days_in_month(date.month(), date.year()))
        .expect("the last day of the month is valid");

    first_day..=last_day
}

/// The state needed for the stats partial.
#[derive(Debug, Clone)]
pub struct StatsState {
    /// The database connection for reading transactions and settings.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for StatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Controls the date range of the stats partial.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

/// Render the stat cards and category breakdown for a date range.
///
/// Used by the dashboard's date-range picker to refresh the stats without a
/// full page reload. Missing bounds default to the current month.
pub async fn get_stats_partial(
    State(state): State<StatsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<StatsQuery>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();
    let default_range = month_date_range(today);

    let from = query.from.unwrap_or(*default_range.start());
    let to = query.to.unwrap_or(*default_range.end());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let settings = get_user_settings(user_id, &connection)?;
    let balance = get_balance_stats(user_id, from..=to, &connection)?;
    let category_stats = get_category_stats(user_id, from..=to, &connection)?;

    Ok(stats_view(&balance, &category_stats, settings.currency.symbol()).into_response())
}

/// The date-range picker that drives [get_stats_partial], plus the initial
/// stats content. Rendered once by the dashboard page.
pub fn stats_section(
    balance: &BalanceStats,
    category_stats: &[CategoryStat],
    date_range: &RangeInclusive<Date>,
    currency_symbol: &str,
) -> Markup {
    html!(
        section class="w-full mx-auto mb-4 space-y-4"
        {
            form
                hx-get=(endpoints::STATS_API)
                hx-target="#stats-content"
                hx-swap="innerHTML"
                hx-trigger="change"
                class="flex flex-wrap items-end gap-4"
            {
                div
                {
                    label for="from" class=(FORM_LABEL_STYLE) { "From" }
                    input
                        id="from"
                        type="date"
                        name="from"
                        value=(date_range.start())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="to" class=(FORM_LABEL_STYLE) { "To" }
                    input
                        id="to"
                        type="date"
                        name="to"
                        value=(date_range.end())
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div id="stats-content"
            {
                (stats_view(balance, category_stats, currency_symbol))
            }
        }
    )
}

fn stats_view(
    balance: &BalanceStats,
    category_stats: &[CategoryStat],
    currency_symbol: &str,
) -> Markup {
    html!(
        div class="grid grid-cols-1 sm:grid-cols-3 gap-4 mb-4"
        {
            (stat_card("Income", balance.income, "text-green-600 dark:text-green-400", currency_symbol))
            (stat_card("Expenses", balance.expense, "text-red-600 dark:text-red-400", currency_symbol))
            (stat_card("Balance", balance.balance(), "text-blue-600 dark:text-blue-400", currency_symbol))
        }

        div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
        {
            (category_panel("Expenses by Category", TransactionKind::Expense, category_stats, balance.expense, currency_symbol))
            (category_panel("Income by Category", TransactionKind::Income, category_stats, balance.income, currency_symbol))
        }
    )
}

fn stat_card(title: &str, amount: f64, amount_style: &str, currency_symbol: &str) -> Markup {
    html!(
        div class="bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700
            rounded-lg p-4 shadow-md"
        {
            h4 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }

            div class=(format!("text-3xl font-bold {amount_style}"))
            {
                (currency_rounded_with_tooltip(amount, currency_symbol))
            }
        }
    )
}

fn category_panel(
    title: &str,
    kind: TransactionKind,
    category_stats: &[CategoryStat],
    kind_total: f64,
    currency_symbol: &str,
) -> Markup {
    let stats = category_stats
        .iter()
        .filter(|stat| stat.kind == kind)
        .collect::<Vec<_>>();

    html!(
        div class="bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700
            rounded-lg p-4 shadow-md"
        {
            h4 class="text-lg font-semibold mb-3" { (title) }

            @if stats.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "No transactions in this range."
                }
            }

            div class="space-y-3"
            {
                @for stat in stats {
                    (category_bar(stat, kind_total, currency_symbol))
                }
            }
        }
    )
}

fn category_bar(stat: &CategoryStat, kind_total: f64, currency_symbol: &str) -> Markup {
    let percentage = if kind_total > 0.0 {
        (stat.amount / kind_total * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    html!(
        div
        {
            div class="flex justify-between items-baseline text-sm mb-1"
            {
                span
                {
                    span aria-hidden="true" class="mr-1" { (stat.category_icon) }
                    (stat.category)
                }

                span class="tabular-nums"
                {
                    (format_currency(stat.amount, currency_symbol))
                    span class="text-gray-500 dark:text-gray-400"
                    {
                        " (" (format!("{percentage:.0}")) "%)"
                    }
                }
            }

            div
                class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5"
                role="progressbar"
                aria-valuenow=(format!("{percentage:.0}"))
                aria-valuemin="0"
                aria-valuemax="100"
            {
                @if percentage > 0.0 {
                    div
                        class="bg-blue-600 dark:bg-blue-500 h-2.5 rounded-full"
                        style=(format!("width: {:.1}%", percentage.max(3.0)))
                    {}
                }
            }
        }
    )
}


#[cfg(test)]
mod stats_partial_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        db::initialize,
        settings::{Currency, upsert_user_settings},
        test_utils::{assert_valid_html, parse_html_fragment},
        transaction::{NewTransaction, TransactionKind, create_transaction},
        user::UserID,
    };

    use super::{StatsQuery, StatsState, get_stats_partial};

    fn get_test_state() -> StatsState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        StatsState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn partial_defaults_to_current_month() {
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
        }

        let response = get_stats_partial(
            State(state),
            Extension(user_id),
            Query(StatsQuery {
                from: None,
                to: None,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.html();
        assert!(text.contains("Groceries"));
        assert!(text.contains("$42"));
    }

    #[tokio::test]
    async fn partial_respects_explicit_range() {
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
        }

        let response = get_stats_partial(
            State(state),
            Extension(user_id),
            Query(StatsQuery {
                from: Some(today - Duration::days(60)),
                to: Some(today - Duration::days(30)),
            }),
        )
        .await
        .into_response();

        let html = parse_html_fragment(response).await;
        let text = html.html();
        assert!(text.contains("No transactions in this range."));
    }
}
