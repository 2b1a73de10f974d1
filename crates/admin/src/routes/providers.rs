//! Care provider (care business) list, detail and approval.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{OriginalUri, Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tojumi_core::Decision;
use tower_sessions::Session;
use tracing::instrument;

use super::approval::{self, ActionForm, ActionPanel};
use super::{detail_status, status_table};
use crate::api::CareBusiness;
use crate::components::{DataTable, Detail, Shell};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

const BASE: &str = "/dashboard/providers";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE, get(index))
        .route("/dashboard/providers/{id}", get(show))
        .route("/dashboard/providers/{id}/approve", post(approve))
        .route("/dashboard/providers/{id}/reject", post(reject))
}

#[derive(Template, WebTemplate)]
#[template(path = "providers/index.html")]
pub struct ProvidersTemplate {
    pub shell: Shell,
    pub table: DataTable<CareBusiness>,
}

#[derive(Template, WebTemplate)]
#[template(path = "providers/show.html")]
pub struct ProviderTemplate {
    pub shell: Shell,
    pub detail: Detail<CareBusiness>,
    pub actions: Option<ActionPanel>,
}

#[instrument(skip(ctx, state, session, uri))]
pub async fn index(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> ProvidersTemplate {
    let snapshot = state.providers().fetch_all(&ctx.api).await;
    ProvidersTemplate {
        shell: Shell::load(&ctx.admin, &session, BASE, "Care Providers").await,
        table: status_table(&snapshot, uri.query(), state.config().pagination()),
    }
}

#[instrument(skip(ctx, state, session))]
pub async fn show(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let detail = Detail::from(state.providers().fetch_one(&ctx.api, &id).await);
    let path = format!("{BASE}/{id}");
    let actions = match &detail {
        Detail::Found(provider) => Some(ActionPanel::new(
            state.providers(),
            provider,
            path.clone(),
            None,
        )),
        _ => None,
    };
    let status = detail_status(&detail);
    let template = ProviderTemplate {
        shell: Shell::load(&ctx.admin, &session, &path, "Care provider details").await,
        detail,
        actions,
    };
    (status, template).into_response()
}

/// Approve a pending care business.
///
/// # Errors
///
/// Returns `AppError::Session` if the outcome notice cannot be stored.
#[instrument(skip(ctx, state, session, form))]
pub async fn approve(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, AppError> {
    approval::decide(state.providers(), &ctx, &session, &id, Decision::Approve, form, BASE).await
}

/// Reject a pending care business.
///
/// # Errors
///
/// Returns `AppError::Session` if the outcome notice cannot be stored.
#[instrument(skip(ctx, state, session, form))]
pub async fn reject(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, AppError> {
    approval::decide(state.providers(), &ctx, &session, &id, Decision::Reject, form, BASE).await
}
