//! HTTP routes / 接口路由

pub mod search;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

pub const SEARCH_ROUTE: &str = "/everything-search-api/search";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(SEARCH_ROUTE, get(search::search))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::search::backend::mock::{MockBackend, MockItem};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(backend: MockBackend) -> Router {
        router(Arc::new(AppState::new(AppConfig::default(), Box::new(backend))))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_empty_results() {
        let (status, body) = get_json(app(MockBackend::new(vec![])), "/everything-search-api/search?q=ab%20c").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "results": [],
                "query": "ab c",
                "count": 0,
                "total_count": 0,
                "original_query": "ab c",
            })
        );
    }

    #[tokio::test]
    async fn test_limit_caps_results() {
        let items = (0..5)
            .map(|i| MockItem::file(&format!("C:\\report\\{}.txt", i), 1))
            .collect();
        let (status, body) = get_json(app(MockBackend::new(items)), "/everything-search-api/search?q=report&limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], json!(1));
        assert_eq!(body["total_count"], json!(5));
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
        assert_eq!(body["results"][0]["path"], json!("C:\\report\\0.txt"));
        assert_eq!(body["results"][0]["filename"], json!("0.txt"));
    }

    #[tokio::test]
    async fn test_match_all_false_omits_original_query() {
        let items = vec![MockItem::file("C:\\a.txt", 1), MockItem::file("C:\\b.txt", 2)];
        let (status, body) = get_json(
            app(MockBackend::new(items)),
            "/everything-search-api/search?q=zzz&match_all=no",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], json!(2));
        assert!(body.get("original_query").is_none());
    }

    #[tokio::test]
    async fn test_invalid_limit() {
        let (status, body) = get_json(app(MockBackend::new(vec![])), "/everything-search-api/search?q=report&limit=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid limit parameter" }));

        let (status, body) = get_json(app(MockBackend::new(vec![])), "/everything-search-api/search?q=report&limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Limit must be a positive integer" }));
    }

    #[tokio::test]
    async fn test_missing_and_short_query() {
        let (status, body) = get_json(app(MockBackend::new(vec![])), "/everything-search-api/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing query parameter 'q'" }));

        let (status, body) = get_json(app(MockBackend::new(vec![])), "/everything-search-api/search?q=a%20b").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().ends_with("Current length: 2"));
    }

    #[tokio::test]
    async fn test_size_failure_is_null() {
        let mut broken = MockItem::file("C:\\report\\b.txt", 2);
        broken.size = Err("sharing violation".to_string());
        let items = vec![MockItem::file("C:\\report\\a.txt", 1), broken];
        let (status, body) = get_json(app(MockBackend::new(items)), "/everything-search-api/search?q=report").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], json!(2));
        assert!(body["results"][1]["size"].is_null());
        assert_eq!(body["results"][1]["filename"], json!("b.txt"));
        assert!(body["results"][1]["date_modified"].is_string());
    }

    #[tokio::test]
    async fn test_backend_failure() {
        let (status, body) = get_json(
            app(MockBackend::failing("IPC is not available")),
            "/everything-search-api/search?q=report",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Search failed: IPC is not available" }));
    }

    #[tokio::test]
    async fn test_repeated_query_key_uses_first() {
        let items = vec![MockItem::file("C:\\report\\a.txt", 1)];
        let (status, body) = get_json(
            app(MockBackend::new(items)),
            "/everything-search-api/search?q=report&q=other&limit=5&limit=abc",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], json!("report"));
        assert_eq!(body["count"], json!(1));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = get_json(app(MockBackend::new(vec![])), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Endpoint not found" }));
    }
}
