//! Settings page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, base,
    },
    navigation::NavBar,
    settings::{Currency, get_user_settings, upsert_user_settings},
    user::UserID,
};

/// The state needed for the settings page and endpoint.
#[derive(Debug, Clone)]
pub struct SettingsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for updating settings.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub currency: Currency,
}

/// Render the settings page.
///
/// New users land here straight after registration to pick a currency, so the
/// page renders with a sensible default selection rather than failing when no
/// settings row exists yet.
pub async fn get_settings_page(
    State(state): State<SettingsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let selected_currency = match get_user_settings(user_id, &connection) {
        Ok(settings) => settings.currency,
        Err(Error::SettingsNotFound) => Currency::USD,
        Err(error) => {
            tracing::error!("could not retrieve user settings: {error}");
            return error.into_alert_response();
        }
    };

    settings_view(selected_currency).into_response()
}

/// Handle the settings form submission, redirects to the dashboard on success.
pub async fn post_settings(
    State(state): State<SettingsPageState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<SettingsForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match upsert_user_settings(user_id, form.currency, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not update user settings: {error}");
            error.into_alert_response()
        }
    }
}

fn settings_view(selected_currency: Currency) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();

    let currency_radio = |currency: Currency| {
        let id = format!("currency-{currency}");

        html! {
            div class="flex items-center gap-2"
            {
                input
                    id=(id)
                    type="radio"
                    name="currency"
                    value=(currency)
                    checked[currency == selected_currency]
                    class=(FORM_RADIO_INPUT_STYLE);

                label for=(id) class=(FORM_RADIO_LABEL_STYLE)
                {
                    (currency.symbol()) " " (currency)
                }
            }
        }
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::SETTINGS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Currency" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        @for currency in Currency::ALL {
                            (currency_radio(currency))
                        }
                    }
                }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "The currency only changes how amounts are displayed. \
                    Existing amounts are not converted."
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Settings" }
            }
        }
    };

    base("Settings", &[], &content)
}

#[cfg(test)]
mod settings_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        db::initialize,
        endpoints,
        settings::{Currency, upsert_user_settings},
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
        user::UserID,
    };

    use super::{SettingsPageState, get_settings_page};

    fn get_test_state() -> SettingsPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SettingsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn render_page_for_new_user() {
        let state = get_test_state();

        let response = get_settings_page(State(state), Extension(UserID::new(1)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::SETTINGS_API, "hx-post");
        assert_form_input(&form, "currency", "radio");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn page_preselects_current_currency() {
        let state = get_test_state();
        let user_id = UserID::new(1);
        upsert_user_settings(user_id, Currency::GBP, &state.db_connection.lock().unwrap())
            .expect("Could not upsert settings");

        let response = get_settings_page(State(state), Extension(user_id))
            .await
            .into_response();

        let html = parse_html_document(response).await;
        let checked = html
            .select(&Selector::parse("input[type=radio][checked]").unwrap())
            .next()
            .expect("No checked radio found");
        assert_eq!(checked.value().attr("value"), Some("GBP"));
    }
}

#[cfg(test)]
mod post_settings_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        endpoints,
        settings::{Currency, get_user_settings},
        test_utils::assert_hx_redirect,
        user::UserID,
    };

    use super::{SettingsForm, SettingsPageState, post_settings};

    #[tokio::test]
    async fn saves_currency_and_redirects_to_dashboard() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let state = SettingsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let user_id = UserID::new(1);

        let response = post_settings(
            State(state.clone()),
            Extension(user_id),
            Form(SettingsForm {
                currency: Currency::EUR,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let settings = get_user_settings(user_id, &state.db_connection.lock().unwrap())
            .expect("Could not get settings");
        assert_eq!(settings.currency, Currency::EUR);
    }
}
