//! Session guard and authentication extractors for admin.
//!
//! Every `/dashboard` route runs behind [`require_session`]. The guard loads
//! the operator and their API token from the session, refuses expired tokens
//! before any handler runs, and afterwards either persists a token the API
//! refreshed or, if the API rejected the token, logs the operator out.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::{Method, Uri, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;

use crate::api::{ApiSession, LoginPayload};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::notice::push_notice;
use crate::models::{CurrentAdmin, Notice, session_keys};

/// Public entry path.
pub const LOGIN_PATH: &str = "/";

/// The authenticated operator for one request.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub admin: CurrentAdmin,
    /// Bearer token for API calls made on the operator's behalf.
    pub api: Arc<ApiSession>,
}

/// Redirect to the login page, remembering where the operator was headed.
#[must_use]
pub fn login_redirect(method: &Method, uri: &Uri) -> Response {
    let target = if method == Method::GET {
        uri.path_and_query().map_or("/dashboard", |pq| pq.as_str())
    } else {
        "/dashboard"
    };
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    Redirect::to(&format!("{LOGIN_PATH}?redirect={encoded}")).into_response()
}

/// Record a successful login in the session.
///
/// The session id is cycled so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn start_session(
    session: &Session,
    payload: LoginPayload,
) -> Result<CurrentAdmin, tower_sessions::session::Error> {
    let admin = CurrentAdmin::from(payload.user);
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, &admin).await?;
    session.insert(session_keys::API_TOKEN, &payload.token).await?;
    set_sentry_user(admin.id.as_str(), Some(&admin.email));
    Ok(admin)
}

/// Clear everything the session holds (logout).
pub async fn end_session(session: &Session) {
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();
}

/// Guard for authenticated routes.
pub async fn require_session(session: Session, mut request: Request, next: Next) -> Response {
    let admin: Option<CurrentAdmin> = session
        .get(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten();
    let token: Option<String> = session.get(session_keys::API_TOKEN).await.ok().flatten();

    let (Some(admin), Some(token)) = (admin, token) else {
        return login_redirect(request.method(), request.uri());
    };

    let api = Arc::new(ApiSession::new(SecretString::from(token)));
    if api.is_expired() {
        tracing::info!(admin = %admin.id, "API token expired, logging out");
        return force_logout(&session, request.method().clone(), request.uri().clone()).await;
    }

    set_sentry_user(admin.id.as_str(), Some(&admin.email));
    let method = request.method().clone();
    let uri = request.uri().clone();
    request.extensions_mut().insert(AdminContext {
        admin,
        api: Arc::clone(&api),
    });

    let response = next.run(request).await;

    if api.requires_login() {
        tracing::info!("API rejected the session token, logging out");
        return force_logout(&session, method, uri).await;
    }

    if let Some(token) = api.take_refreshed()
        && let Err(e) = session
            .insert(session_keys::API_TOKEN, token.expose_secret())
            .await
    {
        tracing::warn!(error = %e, "Failed to store refreshed API token");
    }

    response
}

async fn force_logout(session: &Session, method: Method, uri: Uri) -> Response {
    end_session(session).await;
    if let Err(e) = push_notice(
        session,
        Notice::error("Your session has expired. Please sign in again."),
    )
    .await
    {
        tracing::warn!(error = %e, "Failed to queue logout notice");
    }
    login_redirect(&method, &uri)
}

/// Extractor that requires admin authentication.
///
/// Reads the [`AdminContext`] inserted by [`require_session`].
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdminAuth(ctx): RequireAdminAuth) -> impl IntoResponse {
///     format!("Hello, {}!", ctx.admin.name())
/// }
/// ```
pub struct RequireAdminAuth(pub AdminContext);

/// Returned when a handler needs an operator but the guard did not run.
#[derive(Debug)]
pub struct AdminAuthRejection;

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminContext>()
            .cloned()
            .map(Self)
            .ok_or(AdminAuthRejection)
    }
}

/// Extractor that optionally gets the current admin.
///
/// Used by the public login page to skip the form for signed-in operators.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header::LOCATION};

    use super::*;

    #[test]
    fn test_login_redirect_preserves_get_target() {
        let uri: Uri = "/dashboard/students?filter=pending&page=2".parse().unwrap_or_default();
        let response = login_redirect(&Method::GET, &uri);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/?redirect=%2Fdashboard%2Fstudents%3Ffilter%3Dpending%26page%3D2")
        );
    }

    #[test]
    fn test_login_redirect_for_form_posts_goes_to_dashboard() {
        let uri: Uri = "/dashboard/students/s1/approve".parse().unwrap_or_default();
        let response = login_redirect(&Method::POST, &uri);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/?redirect=%2Fdashboard")
        );
    }
}
