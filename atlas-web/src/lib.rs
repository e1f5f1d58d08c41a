pub mod api;
pub mod pages;
pub mod render;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Build the axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/regions/{region_id}/test", post(api::test_region))
        .route("/regions/test-all", post(api::test_all_regions))
        .route("/regions/{region_id}/health", post(api::region_health))
        .route("/regions/{region_id}/load-test", post(api::load_test))
        .route("/flags/{flag_key}/toggle", post(api::toggle_flag))
        .route("/flags", get(api::list_flags))
        .route("/flag-panel", get(api::list_flags))
        // compatibility aliases for templates that fetch instead of post
        .route("/test-connection/{region_id}", get(api::test_region))
        .route("/health/{region_id}", get(api::region_health))
        .route("/all-results", get(api::test_all_regions))
        .route("/load-test/{region_id}", post(api::load_test));

    Router::new()
        .route("/", get(pages::dashboard))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build the router with static asset serving for production builds.
pub fn build_router_with_static(state: Arc<AppState>, static_dir: &str) -> Router {
    build_router(state).nest_service("/static", ServeDir::new(static_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_data::PoolManager;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    fn demo_state() -> Arc<AppState> {
        AppState::new(PoolManager::new(), true)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_page_renders() {
        let app = build_router(demo_state());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("US East (Virginia)"));
        assert!(body.contains("EU West (Ireland)"));
        assert!(body.contains("Asia Pacific (Singapore)"));
    }

    #[tokio::test]
    async fn test_unknown_region_fragment() {
        let app = build_router(demo_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/regions/mars-north/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("Unknown region"));
    }

    #[tokio::test]
    async fn test_flag_panel_endpoint() {
        let app = build_router(demo_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/flags")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("region-us-east-enabled"));
        assert!(body.contains("dashboard-refresh-seconds"));
    }

    #[tokio::test]
    async fn test_flag_panel_alias_matches_flags_route() {
        let state = demo_state();
        let app = build_router(state.clone());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/flag-panel")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("enable-load-testing"));
    }

    #[tokio::test]
    async fn test_toggle_unknown_flag_still_returns_panel() {
        let app = build_router(demo_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/flags/no-such-flag/toggle")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("region-us-east-enabled"));
    }

    #[tokio::test]
    async fn test_get_alias_for_connection_test() {
        let app = build_router(demo_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/test-connection/us-east")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("US East (Virginia)"));
        assert!(body.contains("ms"));
    }
}
