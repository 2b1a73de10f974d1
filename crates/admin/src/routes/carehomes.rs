//! Care home list, detail (pricing, capacity, gallery) and approval.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{OriginalUri, Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tojumi_core::Decision;
use tojumi_core::format::format_amenity;
use tower_sessions::Session;
use tracing::instrument;

use super::approval::{self, ActionForm, ActionPanel};
use super::{detail_status, status_table};
use crate::api::Carehome;
use crate::components::{DataTable, Detail, Shell};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

const BASE: &str = "/dashboard/carehomes";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE, get(index))
        .route("/dashboard/carehomes/{id}", get(show))
        .route("/dashboard/carehomes/{id}/approve", post(approve))
        .route("/dashboard/carehomes/{id}/reject", post(reject))
}

#[derive(Template, WebTemplate)]
#[template(path = "carehomes/index.html")]
pub struct CarehomesTemplate {
    pub shell: Shell,
    pub table: DataTable<Carehome>,
}

#[derive(Template, WebTemplate)]
#[template(path = "carehomes/show.html")]
pub struct CarehomeTemplate {
    pub shell: Shell,
    pub detail: Detail<Carehome>,
    pub actions: Option<ActionPanel>,
    pub amenities: Vec<String>,
    pub gallery: Vec<GalleryItem>,
}

/// One photo or video of a care home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub url: String,
    pub video: bool,
}

fn gallery(carehome: &Carehome) -> Vec<GalleryItem> {
    carehome
        .images_videos
        .iter()
        .filter(|url| !url.trim().is_empty())
        .map(|url| GalleryItem {
            url: url.clone(),
            video: Carehome::is_video(url),
        })
        .collect()
}

#[instrument(skip(ctx, state, session, uri))]
pub async fn index(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> CarehomesTemplate {
    let snapshot = state.carehomes().fetch_all(&ctx.api).await;
    CarehomesTemplate {
        shell: Shell::load(&ctx.admin, &session, BASE, "Care Homes").await,
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
    let detail = Detail::from(state.carehomes().fetch_one(&ctx.api, &id).await);
    let path = format!("{BASE}/{id}");
    let (actions, amenities, gallery) = match &detail {
        Detail::Found(carehome) => (
            Some(ActionPanel::new(state.carehomes(), carehome, path.clone(), None)),
            carehome.amenities.iter().map(|a| format_amenity(a)).collect::<Vec<_>>(),
            gallery(carehome),
        ),
        _ => (None, Vec::new(), Vec::new()),
    };
    let status = detail_status(&detail);
    let template = CarehomeTemplate {
        shell: Shell::load(&ctx.admin, &session, &path, "Care home details").await,
        detail,
        actions,
        amenities,
        gallery,
    };
    (status, template).into_response()
}

/// Approve a pending care home.
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
    approval::decide(state.carehomes(), &ctx, &session, &id, Decision::Approve, form, BASE).await
}

/// Reject a pending care home.
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
    approval::decide(state.carehomes(), &ctx, &session, &id, Decision::Reject, form, BASE).await
}
