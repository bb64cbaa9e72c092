//! API routes for loyalty-gate

pub mod auth;
pub mod authz;
pub mod health;
pub mod me;
pub mod shops;

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, require_shop_access};
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Authentication proxy (public, rate limited per route)
    let authentication = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/password-reset", post(auth::request_password_reset))
        .route(
            "/api/auth/password-reset/confirm",
            post(auth::confirm_password_reset),
        );

    // Shop-scoped routes (principal must belong to the shop)
    let shops = Router::new()
        .route("/api/shops/{shop_id}/access", get(shops::shop_access))
        .route_layer(middleware::from_fn(require_shop_access));

    // Everything below needs a resolved principal
    let protected = Router::new()
        .route("/api/me", get(me::me))
        .route("/api/authz/decide", post(authz::decide))
        .merge(shops)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(authentication)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::HeaderIdentity;
    use crate::auth::rate_limit::{HEADER_LIMIT, HEADER_REMAINING, HEADER_RETRY_AFTER};
    use crate::config::Config;
    use crate::identity::{
        IdentityError, IdentityProvider, PasswordResetConfirm, PasswordResetRequest,
        SignInRequest, SignInResponse,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubDirectory {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityProvider for StubDirectory {
        async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.password == "correct horse" {
                Ok(SignInResponse(serde_json::json!({ "id_token": "tok" })))
            } else {
                Err(IdentityError::InvalidCredentials)
            }
        }

        async fn request_password_reset(
            &self,
            _request: &PasswordResetRequest,
        ) -> Result<(), IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn confirm_password_reset(
            &self,
            _request: &PasswordResetConfirm,
        ) -> Result<(), IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(IdentityError::Unavailable("directory down".into()))
        }
    }

    fn app() -> (Router, Arc<StubDirectory>) {
        let directory = Arc::new(StubDirectory::default());
        let state = AppState::with_parts(
            Config::default(),
            Arc::new(HeaderIdentity),
            directory.clone(),
        );
        (create_router(state), directory)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_as(uri: &str, identity: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in identity {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, identity: &[(&str, &str)], body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-forwarded-for", "198.51.100.4");
        for (name, value) in identity {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    const CASHIER: &[(&str, &str)] = &[
        ("x-user-id", "s1"),
        ("x-user-role", "SHOP_STAFF"),
        ("x-user-shop-id", "shop_1"),
        ("x-user-staff-role", "CASHIER"),
    ];

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let response = app.oneshot(get_as("/health", &[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_me_requires_identity() {
        let (app, _) = app();
        let response = app.oneshot(get_as("/api/me", &[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Authentication required");
    }

    #[tokio::test]
    async fn test_me_lists_effective_permissions() {
        let (app, _) = app();
        let response = app.oneshot(get_as("/api/me", CASHIER)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["role"], "SHOP_STAFF");
        assert_eq!(body["staff_role"], "CASHIER");
        assert_eq!(body["explicit_permissions"], false);
        let permissions = body["permissions"].as_array().unwrap();
        assert!(permissions.contains(&"VIEW_CUSTOMERS".into()));
        assert!(!permissions.contains(&"MANAGE_MENU".into()));
    }

    #[tokio::test]
    async fn test_unrecognized_role_is_forbidden() {
        let (app, _) = app();
        let response = app
            .oneshot(get_as(
                "/api/me",
                &[("x-user-id", "u1"), ("x-user-role", "OVERLORD")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_shop_access_own_and_foreign_shop() {
        let (app, _) = app();
        let response = app
            .clone()
            .oneshot(get_as("/api/shops/shop_1/access", CASHIER))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["can_access"], true);
        assert_eq!(body["can_modify"], false);
        assert!(body["permissions"]
            .as_array()
            .unwrap()
            .contains(&"CREATE_TRANSACTION".into()));

        let response = app
            .oneshot(get_as("/api/shops/shop_2/access", CASHIER))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["code"], 2003);
    }

    #[tokio::test]
    async fn test_decide() {
        let (app, _) = app();
        let allowed = post_json(
            "/api/authz/decide",
            CASHIER,
            serde_json::json!({
                "kind": "permission",
                "permission": "VIEW_CUSTOMERS",
                "shop_id": "shop_1",
            }),
        );
        let response = app.clone().oneshot(allowed).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["allowed"], true);
        assert_eq!(body["principal_id"], "s1");

        let denied = post_json(
            "/api/authz/decide",
            CASHIER,
            serde_json::json!({
                "kind": "permission",
                "permission": "MANAGE_MENU",
                "shop_id": "shop_1",
            }),
        );
        let response = app.clone().oneshot(denied).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let anonymous = post_json(
            "/api/authz/decide",
            &[],
            serde_json::json!({ "kind": "authenticated" }),
        );
        let response = app.oneshot(anonymous).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_decide_with_malformed_permissions_header() {
        let (app, _) = app();
        let mut identity = CASHIER.to_vec();
        identity.push(("x-user-permissions", "%%%not-json"));
        let request = post_json(
            "/api/authz/decide",
            &identity,
            serde_json::json!({
                "kind": "permission",
                "permission": "VIEW_CUSTOMERS",
                "shop_id": "shop_1",
            }),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_decide_role_check_reports_role_required() {
        let (app, _) = app();
        let request = post_json(
            "/api/authz/decide",
            CASHIER,
            serde_json::json!({ "kind": "role", "roles": ["SUPER_ADMIN", "SHOP_ADMIN"] }),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["code"], 2002);
        assert_eq!(body["details"]["roles"][1], "SHOP_ADMIN");
    }

    #[tokio::test]
    async fn test_unreadable_permissions_header_fails_closed() {
        let (app, _) = app();
        let manage_staff = serde_json::json!({
            "kind": "permission",
            "permission": "MANAGE_STAFF",
            "shop_id": "shop_1",
        });
        let manager = [
            ("x-user-id", "m1"),
            ("x-user-role", "SHOP_STAFF"),
            ("x-user-shop-id", "shop_1"),
            ("x-user-staff-role", "MANAGER"),
        ];

        let allowed = post_json("/api/authz/decide", &manager, manage_staff.clone());
        let response = app.clone().oneshot(allowed).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        for raw in [&b"[\"MANAGE_STAFF\xff\"]"[..], &b""[..]] {
            let mut request = post_json("/api/authz/decide", &manager, manage_staff.clone());
            request.headers_mut().insert(
                "x-user-permissions",
                http::HeaderValue::from_bytes(raw).unwrap(),
            );
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_login_rate_limited_after_budget() {
        let (app, directory) = app();
        let attempt = || {
            post_json(
                "/api/auth/login",
                &[],
                serde_json::json!({ "email": "alice@example.com", "password": "wrong" }),
            )
        };

        for remaining in (0..5).rev() {
            let response = app.clone().oneshot(attempt()).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.headers()[HEADER_REMAINING],
                remaining.to_string().as_str()
            );
        }

        let response = app.oneshot(attempt()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[HEADER_LIMIT], "5");
        assert!(response.headers().contains_key(HEADER_RETRY_AFTER));
        let body = body_json(response).await;
        assert_eq!(body["error"], "Too many requests, try again later");

        // The sixth attempt never reached the directory
        assert_eq!(directory.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_login_success_passes_tokens_through() {
        let (app, _) = app();
        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                &[],
                serde_json::json!({ "email": "alice@example.com", "password": "correct horse" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[HEADER_REMAINING], "4");
        assert_eq!(body_json(response).await["id_token"], "tok");
    }

    #[tokio::test]
    async fn test_login_rejects_missing_email() {
        let (app, directory) = app();
        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                &[],
                serde_json::json!({ "email": "  ", "password": "x" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_password_reset_budget_is_separate_from_login() {
        let (app, _) = app();
        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/api/auth/password-reset",
                    &[],
                    serde_json::json!({ "email": "bob@example.com" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/password-reset",
                &[],
                serde_json::json!({ "email": "BOB@example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                &[],
                serde_json::json!({ "email": "bob@example.com", "password": "correct horse" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_directory_outage_is_bad_gateway() {
        let (app, _) = app();
        let response = app
            .oneshot(post_json(
                "/api/auth/password-reset/confirm",
                &[],
                serde_json::json!({
                    "email": "c@example.com",
                    "code": "123456",
                    "new_password": "pw",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().contains_key(HEADER_LIMIT));
    }
}
