//! Defines the 404 page and its route handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// Route handler for unmatched routes.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Sorry, we couldn't find that page.",
            "Check the URL for typos, or head back to the dashboard.",
        ),
    )
        .into_response()
}

#[cfg(test)]
mod not_found_tests {
    use axum::http::StatusCode;

    use crate::test_utils::parse_html_document;

    use super::get_404_not_found;

    #[tokio::test]
    async fn returns_not_found_status_and_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let document = parse_html_document(response).await;
        let heading_selector = scraper::Selector::parse("h1").unwrap();
        let heading = document
            .select(&heading_selector)
            .next()
            .expect("want an h1 element");
        assert_eq!(heading.text().collect::<String>().trim(), "404");
    }
}
