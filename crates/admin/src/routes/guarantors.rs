//! Guarantor list, detail and verification.

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
use crate::api::Guarantor;
use crate::components::{DataTable, Detail, Shell};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

const BASE: &str = "/dashboard/guarantors";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE, get(index))
        .route("/dashboard/guarantors/{id}", get(show))
        .route("/dashboard/guarantors/{id}/approve", post(approve))
        .route("/dashboard/guarantors/{id}/reject", post(reject))
}

#[derive(Template, WebTemplate)]
#[template(path = "guarantors/index.html")]
pub struct GuarantorsTemplate {
    pub shell: Shell,
    pub table: DataTable<Guarantor>,
}

#[derive(Template, WebTemplate)]
#[template(path = "guarantors/show.html")]
pub struct GuarantorTemplate {
    pub shell: Shell,
    pub detail: Detail<Guarantor>,
    pub actions: Option<ActionPanel>,
}

#[instrument(skip(ctx, state, session, uri))]
pub async fn index(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> GuarantorsTemplate {
    let snapshot = state.guarantors().fetch_all(&ctx.api).await;
    GuarantorsTemplate {
        shell: Shell::load(&ctx.admin, &session, BASE, "Guarantors").await,
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
    let detail = Detail::from(state.guarantors().fetch_one(&ctx.api, &id).await);
    let path = format!("{BASE}/{id}");
    let actions = match &detail {
        Detail::Found(guarantor) => Some(ActionPanel::new(
            state.guarantors(),
            guarantor,
            path.clone(),
            None,
        )),
        _ => None,
    };
    let status = detail_status(&detail);
    let template = GuarantorTemplate {
        shell: Shell::load(&ctx.admin, &session, &path, "Guarantor details").await,
        detail,
        actions,
    };
    (status, template).into_response()
}

/// Verify a pending guarantor.
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
    approval::decide(state.guarantors(), &ctx, &session, &id, Decision::Approve, form, BASE).await
}

/// Reject a pending guarantor.
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
    approval::decide(state.guarantors(), &ctx, &session, &id, Decision::Reject, form, BASE).await
}
