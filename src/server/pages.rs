//! The two static pages. All behaviour lives in the JSON API they call.

use axum::response::Html;

pub async fn browser_page() -> Html<&'static str> {
    Html(include_str!("../../assets/browser.html"))
}

pub async fn runner_page() -> Html<&'static str> {
    Html(include_str!("../../assets/runner.html"))
}
