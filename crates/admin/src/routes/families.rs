//! Family list and detail pages. Families are read-only.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{OriginalUri, Path, State},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_sessions::Session;
use tracing::instrument;

use super::{detail_status, plain_table};
use crate::api::Family;
use crate::components::{DataTable, Detail, Shell};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

const BASE: &str = "/dashboard/family";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE, get(index))
        .route("/dashboard/family/{id}", get(show))
}

#[derive(Template, WebTemplate)]
#[template(path = "families/index.html")]
pub struct FamiliesTemplate {
    pub shell: Shell,
    pub table: DataTable<Family>,
}

#[derive(Template, WebTemplate)]
#[template(path = "families/show.html")]
pub struct FamilyTemplate {
    pub shell: Shell,
    pub detail: Detail<Family>,
}

#[instrument(skip(ctx, state, session, uri))]
pub async fn index(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> FamiliesTemplate {
    let snapshot = state.families().fetch_all(&ctx.api).await;
    FamiliesTemplate {
        shell: Shell::load(&ctx.admin, &session, BASE, "Families").await,
        table: plain_table(&snapshot, uri.query(), state.config().pagination()),
    }
}

/// Family detail with its dependents.
#[instrument(skip(ctx, state, session))]
pub async fn show(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let detail = Detail::from(state.families().fetch_one(&ctx.api, &id).await);
    let status = detail_status(&detail);
    let template = FamilyTemplate {
        shell: Shell::load(&ctx.admin, &session, &format!("{BASE}/{id}"), "Family details").await,
        detail,
    };
    (status, template).into_response()
}
