//! Login and logout.
//!
//! The public entry path `/` shows the login form. Credentials go to the
//! API's `login` mutation; the returned token and user are kept in the
//! server-side session, never in a browser-readable cookie.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tojumi_core::Email;
use tower_sessions::Session;
use tracing::instrument;

use super::local_dashboard_path;
use crate::api::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAdminAuth, end_session, start_session};
use crate::models::Notice;
use crate::models::notice::{push_notice, take_notices};
use crate::state::AppState;

/// Where operators land after logging in.
const DEFAULT_LANDING: &str = "/dashboard";

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub notices: Vec<Notice>,
    pub email: String,
    pub redirect: String,
}

/// Display the login page, or skip it for a signed-in operator.
pub async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Response {
    let redirect = local_dashboard_path(query.redirect.as_deref()).unwrap_or(DEFAULT_LANDING);
    if admin.is_some() {
        return Redirect::to(redirect).into_response();
    }

    LoginTemplate {
        error: None,
        notices: take_notices(&session).await,
        email: String::new(),
        redirect: redirect.to_string(),
    }
    .into_response()
}

/// Exchange credentials for an API token.
///
/// # Errors
///
/// Returns `AppError::Session` if the session cannot be written.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let redirect = local_dashboard_path(form.redirect.as_deref())
        .unwrap_or(DEFAULT_LANDING)
        .to_string();

    let retry = |error: String, email: String| LoginTemplate {
        error: Some(error),
        notices: Vec::new(),
        email,
        redirect: redirect.clone(),
    };

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(_) => {
            return Ok(retry("Enter a valid email address.".to_string(), form.email).into_response());
        }
    };
    if form.password.is_empty() {
        return Ok(retry("Enter your password.".to_string(), form.email).into_response());
    }

    match state
        .authenticator()
        .login(email.as_str(), &form.password)
        .await
    {
        Ok(payload) => {
            let admin = start_session(&session, payload).await?;
            tracing::info!(admin = %admin.id, "Operator logged in");
            push_notice(&session, Notice::success("Login successful")).await?;
            Ok(Redirect::to(&redirect).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(retry(login_error_message(&e), form.email).into_response())
        }
    }
}

/// Message for a failed login.
fn login_error_message(error: &ApiError) -> String {
    let message = error.operator_message("An unexpected error occurred during login");
    if message.eq_ignore_ascii_case("invalid password") {
        "Incorrect email or password".to_string()
    } else {
        message
    }
}

/// Log out and return to the login page.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    end_session(&session).await;
    tracing::info!("Operator logged out");
    Redirect::to("/")
}
