//! Handles GET / - Renders the application root page

use axum::{extract::State, response::IntoResponse};
use axum_template::RenderHtml;
use minijinja::context;

use super::context::AppState;
use crate::errors::Result;

/// Handle requests to the index page
pub async fn handle_index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(RenderHtml("index.html", state.template_env.clone(), context! {}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::context::test_support::memory_state;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_handle_index() {
        let (app_state, _, _) = memory_state();
        let response = handle_index(State(app_state)).await.unwrap().into_response();
        assert_eq!(response.status(), http::StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("href=\"/registro\""));
    }
}
