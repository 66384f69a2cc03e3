use std::net::SocketAddr;

use axum::{
    http::{header, HeaderName, HeaderValue},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::middleware::{rate_limit::rate_limit, sanitize::sanitize_request};
use crate::state::AppState;
use crate::{auth, tasks};

pub fn build_app(state: AppState) -> Router {
    // The auth group is the only rate-limited surface.
    let auth_routes = auth::router().layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit,
    ));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", tasks::router())
        .route("/health", get(health))
        .with_state(state)
        // Sanitization runs unconditionally, before routing.
        .layer(middleware::from_fn(sanitize_request))
        // Hardened response headers on every reply, errors included.
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
        ))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> (axum::http::StatusCode, Json<serde_json::Value>) {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({ "success": true, "database": "connected" })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "health check db ping failed");
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "database": "disconnected" })),
            )
        }
    }
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn tasks_without_token_is_401() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/tasks").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sixteenth_auth_request_from_one_client_is_429() {
        let app = build_app(AppState::fake());
        for i in 0..16 {
            let req = Request::post("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"email":null,"password":null}"#))
                .unwrap();
            let res = app.clone().oneshot(req).await.unwrap();
            if i < 15 {
                // missing fields, but the limiter let it through
                assert_eq!(res.status(), StatusCode::BAD_REQUEST, "request {i}");
            } else {
                assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
            }
        }
    }

    #[tokio::test]
    async fn rotating_forwarded_headers_do_not_reset_the_counter() {
        // Without a trusted proxy the header is attacker-controlled;
        // varying it per request must not mint fresh rate-limit keys.
        let app = build_app(AppState::fake());
        let mut saw_429 = false;
        for i in 0..40 {
            let req = Request::post("/auth/login")
                .header("content-type", "application/json")
                .header("x-forwarded-for", format!("10.0.{}.{}", i / 250, i % 250))
                .body(Body::from(r#"{"email":null,"password":null}"#))
                .unwrap();
            let res = app.clone().oneshot(req).await.unwrap();
            if res.status() == StatusCode::TOO_MANY_REQUESTS {
                saw_429 = true;
            }
        }
        assert!(saw_429, "limiter never fired despite 40 requests from one client");
    }

    #[tokio::test]
    async fn rate_limit_does_not_apply_to_task_routes() {
        let app = build_app(AppState::fake());
        for _ in 0..20 {
            let req = Request::get("/tasks")
                .header("x-forwarded-for", "5.5.5.5")
                .body(Body::empty())
                .unwrap();
            let res = app.clone().oneshot(req).await.unwrap();
            // always the bearer rejection, never 429
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn responses_carry_hardened_security_headers() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let headers = res.headers();
        assert_eq!(
            headers.get("strict-transport-security").unwrap(),
            "max-age=31536000; includeSubDomains"
        );
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
        assert!(headers.contains_key("permissions-policy"));
    }

    #[tokio::test]
    async fn sanitizer_rewrites_json_bodies_before_handlers() {
        // Missing-field validation still fires after sanitization, which
        // shows the rewritten body reached the handler as valid JSON.
        let app = build_app(AppState::fake());
        let req = Request::post("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"email":"$ne.x","password":null}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
