//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments that htmx swaps into the
//! `#alert-container` element at the bottom of every page, either via the
//! response-targets extension (`hx-target-error="#alert-container"`) or as the
//! normal swap target.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A success or error message to display to the user.
pub enum Alert {
    /// A success message with extra details on a second line.
    Success {
        message: String,
        details: String,
    },
    /// A success message without details.
    SuccessSimple {
        message: String,
    },
    /// An error message with extra details on a second line.
    Error {
        message: String,
        details: String,
    },
}

impl Alert {
    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a new success alert.
    pub fn success(message: &str, details: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    pub fn into_html(self) -> Markup {
        let (container_style, icon, message, details) = match self {
            Alert::Success { message, details } => (
                "flex items-start gap-3 rounded-lg border border-green-300 \
                bg-green-50 p-4 text-sm text-green-800 shadow-lg \
                dark:border-green-800 dark:bg-gray-800 dark:text-green-400",
                "✓",
                message,
                details,
            ),
            Alert::SuccessSimple { message } => (
                "flex items-start gap-3 rounded-lg border border-green-300 \
                bg-green-50 p-4 text-sm text-green-800 shadow-lg \
                dark:border-green-800 dark:bg-gray-800 dark:text-green-400",
                "✓",
                message,
                String::new(),
            ),
            Alert::Error { message, details } => (
                "flex items-start gap-3 rounded-lg border border-red-300 \
                bg-red-50 p-4 text-sm text-red-800 shadow-lg \
                dark:border-red-800 dark:bg-gray-800 dark:text-red-400",
                "!",
                message,
                details,
            ),
        };

        html!(
            div class=(container_style) role="alert"
            {
                span class="font-bold" aria-hidden="true" { (icon) }

                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p { (details) }
                    }
                }

                button
                    type="button"
                    class="font-bold cursor-pointer"
                    aria-label="Dismiss"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

/// Render `alert` as an HTTP response with `status_code`.
#[inline]
pub fn render_alert(status_code: StatusCode, alert: Alert) -> Response {
    (status_code, alert.into_html()).into_response()
}
