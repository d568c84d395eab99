//! Main router configuration for the registration pages and API.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::{
    context::AppState,
    handler_index::handle_index,
    handler_registro::{handle_registro_form, handle_registro_submit},
    handler_registro_api::handle_registro_api,
};

/// Build the application router
pub fn build_router(ctx: AppState) -> Router {
    let api_routes = Router::new().route("/registro", post(handle_registro_api));

    let mut router = Router::new()
        .route("/", get(handle_index))
        .route(
            "/registro",
            get(handle_registro_form).post(handle_registro_submit),
        )
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(&ctx.config.http_static_path));

    if let Some(cors) = cors_layer(ctx.config.cors_allowed_origins.as_ref()) {
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(ctx)
}

/// CORS for browser clients of the JSON API; none when no origin is configured
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(%origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_none());
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_some());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        use axum::body::Body;
        use http::{Request, StatusCode};
        use tower::ServiceExt;

        let (state, _, _) = crate::http::context::test_support::memory_state();
        let response = build_router(state)
            .oneshot(Request::get("/no-existe").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
