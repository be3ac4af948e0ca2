//! HTTP router: public routes, the bot webhook, and the authenticated
//! dashboard API.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware, state::AppState};

pub fn build_router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let dashboard_routes = Router::new()
        .route("/api/v1/users", get(handlers::users::list_users))
        // Expenses
        .route(
            "/api/v1/expenses/daily",
            get(handlers::expenses::daily_expenses),
        )
        .route(
            "/api/v1/expenses/monthly",
            get(handlers::expenses::monthly_expenses),
        )
        .route(
            "/api/v1/expenses/{id}",
            put(handlers::expenses::update_expense),
        )
        // Receipts
        .route("/api/v1/receipts", get(handlers::receipts::list_receipts))
        .route(
            "/api/v1/receipts/{id}",
            put(handlers::receipts::update_receipt),
        )
        .route(
            "/api/v1/receipts/{id}/expenses",
            get(handlers::receipts::receipt_expenses),
        )
        // Stats
        .route("/api/v1/stats/summary", get(handlers::stats::summary))
        .route("/api/v1/stats/monthly", get(handlers::stats::monthly))
        .route("/api/v1/stats/trends", get(handlers::stats::trends))
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/tg-webhook", post(handlers::telegram::receive_update))
        .merge(dashboard_routes);

    let origins: Vec<HeaderValue> = cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::PUT])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        );
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use wiremock::MockServer;

    use super::*;
    use crate::{
        clients::{gemini::GeminiClient, telegram::TelegramClient},
        handlers::telegram::SECRET_HEADER,
        middleware::auth::hash_key,
        services::bot_service::BotService,
    };

    const DASHBOARD_KEY: &str = "dashboard-key";

    fn app(upstream: &MockServer) -> Router {
        // Lazily connected to a database that does not exist; only the
        // health check ever tries to use it
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect_lazy("postgres://localhost:1/unused")
            .unwrap();

        let bot = BotService::new(
            pool.clone(),
            TelegramClient::new(&upstream.uri(), "123:abc").unwrap(),
            GeminiClient::new(&upstream.uri(), "key", "gemini-test").unwrap(),
            vec!["alice".to_string()],
        );

        let state = AppState {
            pool,
            bot: Arc::new(bot),
            webhook_secret: Arc::from("hook-secret"),
            dashboard_key_hash: Arc::from(hash_key(DASHBOARD_KEY)),
        };

        build_router(state, &[])
    }

    fn webhook_request(secret: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/tg-webhook")
            .header("Content-Type", "application/json");

        if let Some(secret) = secret {
            builder = builder.header(SECRET_HEADER, secret);
        }

        builder.body(Body::from(body)).unwrap()
    }

    fn update_from(username: &str) -> String {
        json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "from": { "id": 5, "username": username },
                "chat": { "id": 5 },
                "text": "Tea\n1\ng"
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn webhook_rejects_missing_secret() {
        let upstream = MockServer::start().await;

        let response = app(&upstream)
            .oneshot(webhook_request(None, update_from("alice")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn webhook_rejects_wrong_secret() {
        let upstream = MockServer::start().await;

        let response = app(&upstream)
            .oneshot(webhook_request(Some("guess"), update_from("alice")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "invalid_webhook_secret");
        assert_eq!(body["error"]["message"], "invalid telegram secret");
    }

    #[tokio::test]
    async fn webhook_rejects_malformed_update() {
        let upstream = MockServer::start().await;

        let response = app(&upstream)
            .oneshot(webhook_request(Some("hook-secret"), "not json".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_acknowledges_ignored_update() {
        let upstream = MockServer::start().await;

        let response = app(&upstream)
            .oneshot(webhook_request(Some("hook-secret"), update_from("mallory")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn webhook_fails_when_reply_cannot_be_sent() {
        // No sendMessage mock: the upstream answers 404 without a JSON body
        let upstream = MockServer::start().await;

        let response = app(&upstream)
            .oneshot(webhook_request(
                Some("hook-secret"),
                json!({
                    "update_id": 11,
                    "message": {
                        "message_id": 1,
                        "from": { "id": 5, "username": "alice" },
                        "chat": { "id": 5 },
                        "text": "not an expense"
                    }
                })
                .to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_reports_unreachable_database() {
        let upstream = MockServer::start().await;

        let response = app(&upstream)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "internal_error");
    }

    #[tokio::test]
    async fn dashboard_requires_bearer_key() {
        let upstream = MockServer::start().await;

        let response = app(&upstream)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/receipts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn dashboard_rejects_wrong_key() {
        let upstream = MockServer::start().await;

        let response = app(&upstream)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/stats/summary")
                    .header("Authorization", "Bearer not-the-key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_expense_id_is_rejected_after_auth() {
        let upstream = MockServer::start().await;

        let response = app(&upstream)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/expenses/abc")
                    .header("Authorization", format!("Bearer {DASHBOARD_KEY}"))
                    .header("Content-Type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
