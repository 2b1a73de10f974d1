//! Dependent list and detail pages, with appointments and care logs.
//! Dependents are read-only.

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
use crate::api::Dependent;
use crate::components::{DataTable, Detail, Shell};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

const BASE: &str = "/dashboard/dependents";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE, get(index))
        .route("/dashboard/dependents/{id}", get(show))
}

#[derive(Template, WebTemplate)]
#[template(path = "dependents/index.html")]
pub struct DependentsTemplate {
    pub shell: Shell,
    pub table: DataTable<Dependent>,
}

#[derive(Template, WebTemplate)]
#[template(path = "dependents/show.html")]
pub struct DependentTemplate {
    pub shell: Shell,
    pub detail: Detail<Dependent>,
}

#[instrument(skip(ctx, state, session, uri))]
pub async fn index(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> DependentsTemplate {
    let snapshot = state.dependents().fetch_all(&ctx.api).await;
    DependentsTemplate {
        shell: Shell::load(&ctx.admin, &session, BASE, "Dependents").await,
        table: plain_table(&snapshot, uri.query(), state.config().pagination()),
    }
}

#[instrument(skip(ctx, state, session))]
pub async fn show(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let detail = Detail::from(state.dependents().fetch_one(&ctx.api, &id).await);
    let status = detail_status(&detail);
    let template = DependentTemplate {
        shell: Shell::load(&ctx.admin, &session, &format!("{BASE}/{id}"), "Dependent details")
            .await,
        detail,
    };
    (status, template).into_response()
}
