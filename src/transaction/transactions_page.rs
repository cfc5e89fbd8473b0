//! The paginated overview of the user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators},
    settings::get_user_settings,
    transaction::{Transaction, TransactionKind, count_transactions, get_transactions_page},
    user::UserID,
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Configuration for pagination controls.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Controls pagination of the transactions table.
#[derive(Deserialize)]
pub struct Pagination {
    /// The page number to display. Starts from 1.
    pub page: Option<u64>,
    /// The maximum number of transactions to display per page.
    pub per_page: Option<u64>,
}

/// Render an overview of the user's transactions.
pub async fn get_transactions_page_view(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query_params): Query<Pagination>,
) -> Result<Response, Error> {
    let current_page = query_params
        .page
        .unwrap_or(state.pagination_config.default_page)
        .max(1);
    let per_page = query_params
        .per_page
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let settings = get_user_settings(user_id, &connection)?;

    let transaction_count = count_transactions(user_id, &connection)?;
    let page_count = transaction_count.div_ceil(per_page);

    let limit = per_page;
    let offset = (current_page - 1) * per_page;
    let transactions = get_transactions_page(user_id, limit, offset, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;

    let pagination_indicators =
        create_pagination_indicators(current_page, page_count, state.pagination_config.max_pages);

    Ok(transactions_view(
        &transactions,
        &pagination_indicators,
        per_page,
        settings.currency.symbol(),
    )
    .into_response())
}

fn transactions_view(
    transactions: &[Transaction],
    pagination: &[PaginationIndicator],
    per_page: u64,
    currency_symbol: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let new_transaction_route = endpoints::NEW_TRANSACTION_VIEW;

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    div class="flex gap-4"
                    {
                        a href=(endpoints::EXPORT_TRANSACTIONS) class=(LINK_STYLE)
                        {
                            "Export CSV"
                        }

                        a href=(new_transaction_route) class=(LINK_STYLE)
                        {
                            "Create Transaction"
                        }
                    }
                }

                section class="dark:bg-gray-800 overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction, currency_symbol))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions yet. "
                                        a href=(new_transaction_route) class=(LINK_STYLE)
                                        {
                                            "Create your first transaction"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                @if pagination.len() > 1 {
                    (pagination_view(pagination, per_page))
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

fn transaction_row(transaction: &Transaction, currency_symbol: &str) -> Markup {
    let delete_url = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let (amount_style, signed_amount) = match transaction.kind {
        TransactionKind::Income => (
            "text-green-600 dark:text-green-400 tabular-nums",
            format!("+{}", format_currency(transaction.amount, currency_symbol)),
        ),
        TransactionKind::Expense => (
            "text-red-600 dark:text-red-400 tabular-nums",
            format!("-{}", format_currency(transaction.amount, currency_symbol)),
        ),
    };

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                (transaction.date)
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE)
                {
                    span aria-hidden="true" { (transaction.category_icon) }
                    (transaction.category)
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @match &transaction.description {
                    Some(description) => { (description) }
                    None => { span class="text-gray-400 dark:text-gray-500" { "-" } }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(amount_style) { (signed_amount) }
            }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-confirm="Are you sure you want to delete this transaction?"
                    hx-target="closest tr"
                    hx-swap="delete"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    )
}

fn pagination_view(pagination: &[PaginationIndicator], per_page: u64) -> Markup {
    let page_url = |page: u64| {
        format!(
            "{}?page={page}&per_page={per_page}",
            endpoints::TRANSACTIONS_VIEW
        )
    };

    let page_link_style = "px-3 py-1 rounded hover:bg-gray-200 dark:hover:bg-gray-700";
    let current_page_style = "px-3 py-1 rounded bg-blue-500 text-white";

    html!(
        nav class="pagination" aria-label="Transaction pages"
        {
            ul class="pagination flex gap-1 justify-center text-sm"
            {
                @for indicator in pagination {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) class=(page_link_style) { "Previous" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(page_link_style) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span class=(current_page_style) aria-current="page" { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="px-3 py-1" { "…" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) class=(page_link_style) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    )
}
