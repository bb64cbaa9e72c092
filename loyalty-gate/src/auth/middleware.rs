//! Authorization middleware
//!
//! Axum middleware that runs the adapter before a handler.
//!
//! | Failure | HTTP status |
//! |---------|------------|
//! | No identity metadata | 401 Unauthorized |
//! | Check fails | 403 Forbidden |
//!
//! Shop-scoped middleware reads the `shop_id` path parameter, so it must be
//! attached with `route_layer` (path params only exist after routing).

use axum::{
    RequestExt,
    extract::{RawPathParams, Request, State},
    middleware::Next,
    response::Response,
};
use shared::{AppError, AppResult, Permission};

use crate::auth::{AccessCheck, Principal, authorize};
use crate::security_log;
use crate::state::AppState;

/// Path parameter naming the target shop
pub const SHOP_ID_PARAM: &str = "shop_id";

type BoxFuture = std::pin::Pin<Box<dyn std::future::Future<Output = AppResult<Response>> + Send>>;

/// Authentication middleware - resolves the principal once per request
///
/// Resolved principals are stored in request extensions for the extractor
/// and the permission middleware below.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let metadata = state.sessions.resolve(&parts).await;

    match authorize(metadata, &AccessCheck::Authenticated) {
        Ok(principal) => {
            parts.extensions.insert(principal);
            Ok(next.run(Request::from_parts(parts, body)).await)
        }
        Err(rejection) => {
            security_log!(
                WARN,
                "auth_rejected",
                reason = %rejection,
                uri = %parts.uri
            );
            Err(rejection.into())
        }
    }
}

/// Shop read access middleware (`can_access_shop` on the `shop_id` param)
pub async fn require_shop_access(mut req: Request, next: Next) -> AppResult<Response> {
    let shop_id = shop_id_param(&mut req).await?;
    enforce(&req, &AccessCheck::access_shop(shop_id))?;
    Ok(next.run(req).await)
}

/// Shop modification middleware (`can_modify_shop` on the `shop_id` param)
pub async fn require_shop_modify(mut req: Request, next: Next) -> AppResult<Response> {
    let shop_id = shop_id_param(&mut req).await?;
    enforce(&req, &AccessCheck::modify_shop(shop_id))?;
    Ok(next.run(req).await)
}

/// Permission middleware - requires `permission` within the `shop_id` param
///
/// # Usage
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/api/shops/{shop_id}/menu", put(handler::update_menu))
///     .route_layer(middleware::from_fn(require_permission(Permission::ManageMenu)));
/// ```
pub fn require_permission(
    permission: Permission,
) -> impl Fn(Request, Next) -> BoxFuture + Clone {
    move |mut req: Request, next: Next| {
        Box::pin(async move {
            let shop_id = optional_shop_id_param(&mut req).await;
            enforce(&req, &AccessCheck::permission(permission, shop_id))?;
            Ok(next.run(req).await)
        })
    }
}

/// Evaluate `check` against the principal stored by [`require_auth`]
fn enforce(req: &Request, check: &AccessCheck) -> AppResult<()> {
    let principal = req.principal()?;

    if check.evaluate(principal) {
        return Ok(());
    }

    security_log!(
        WARN,
        "access_denied",
        user_id = %principal.id,
        role = %principal.role,
        check = check.label(),
        uri = %req.uri()
    );
    Err(check.denial())
}

async fn optional_shop_id_param(req: &mut Request) -> Option<String> {
    let params = req.extract_parts::<RawPathParams>().await.ok()?;
    params
        .iter()
        .find(|(key, _)| *key == SHOP_ID_PARAM)
        .map(|(_, value)| value.to_owned())
}

async fn shop_id_param(req: &mut Request) -> AppResult<String> {
    optional_shop_id_param(req).await.ok_or_else(|| {
        tracing::error!(uri = %req.uri(), "Shop middleware mounted on a route without {{shop_id}}");
        AppError::internal("Route is missing the shop_id parameter")
    })
}

/// Extension trait to pull the principal out of a request
pub trait PrincipalExt {
    /// Returns 401 when [`require_auth`] did not run or rejected silently
    fn principal(&self) -> Result<&Principal, AppError>;
}

impl PrincipalExt for Request {
    fn principal(&self) -> Result<&Principal, AppError> {
        self.extensions()
            .get::<Principal>()
            .ok_or(AppError::unauthorized())
    }
}
