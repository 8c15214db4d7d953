//! HTTP route definitions.

mod admin;
mod catalog;
mod health;
mod profiles;
mod reservations;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(reservations::routes())
        .merge(admin::routes())
        .merge(profiles::routes())
        .merge(catalog::routes())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::create_routes;
    use crate::config::Config;
    use crate::websocket::ConnectionManager;
    use crate::AppState;

    /// Router over a pool that never connects. Only paths that are rejected
    /// before touching the database can be exercised.
    fn app(auth_secret: Option<&str>) -> Router {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: "postgres://localhost/mccoy_test".into(),
            max_connections: 1,
            auth_secret: auth_secret.map(str::to_string),
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .unwrap();

        create_routes().with_state(AppState {
            pool,
            config: Arc::new(config),
            conn_manager: ConnectionManager::new_shared(),
        })
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(None)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_ready_reports_unreachable_database() {
        let response = app(None)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["database"], "unavailable");
        assert_eq!(body["admin_connections"], 0);
    }

    #[tokio::test]
    async fn test_reservations_require_bearer_token() {
        let response = app(None)
            .oneshot(Request::get("/reservations").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["details"], "Missing authorization header");
    }

    #[tokio::test]
    async fn test_token_without_secret_is_rejected() {
        let response = app(Some("s3cret"))
            .oneshot(
                Request::get("/reservations")
                    .header(header::AUTHORIZATION, "Bearer u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_for_another_user_is_forbidden() {
        let rows = json!([{
            "user_id": "u2",
            "tour_id": "rafting-extremo",
            "date": "2024-03-01",
            "pax": 2,
            "status": "pending"
        }]);

        let response = app(None)
            .oneshot(json_request(Method::POST, "/reservations", Some("u1"), rows))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_owner_may_only_cancel() {
        let response = app(None)
            .oneshot(json_request(
                Method::PATCH,
                "/reservations/res-1/status",
                Some("u1"),
                json!({"status": "confirmed"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_contact_validation_happens_before_storage() {
        let response = app(None)
            .oneshot(json_request(
                Method::POST,
                "/contact",
                None,
                json!({"name": "Ana", "email": "not-an-email", "message": "hola"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
