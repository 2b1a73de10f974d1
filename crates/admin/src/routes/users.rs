//! User list and detail pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{OriginalUri, Path, State},
    response::{IntoResponse, Response},
    routing::get,
};
use tojumi_core::filter::filter_param;
use tojumi_core::{Pagination, VerificationFilter};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::User;
use crate::components::{DataTable, Detail, FilterTab, Shell};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

use super::detail_status;

const BASE: &str = "/dashboard/users";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE, get(index))
        .route("/dashboard/users/{id}", get(show))
}

#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub shell: Shell,
    pub table: DataTable<User>,
}

#[derive(Template, WebTemplate)]
#[template(path = "users/show.html")]
pub struct UserTemplate {
    pub shell: Shell,
    pub detail: Detail<User>,
}

/// User list with the verified filter.
#[instrument(skip(ctx, state, session, uri))]
pub async fn index(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> UsersTemplate {
    let snapshot = state.users().fetch_all(&ctx.api).await;
    let query = uri.query();
    let filter = VerificationFilter::from_query(filter_param(query).as_deref());
    let filtered = filter.apply(&snapshot.items, User::is_verified);
    let pagination = Pagination::from_query(state.config().pagination(), query);

    UsersTemplate {
        shell: Shell::load(&ctx.admin, &session, BASE, "Users").await,
        table: DataTable::new(
            &snapshot,
            &filtered,
            FilterTab::verification_tabs(query, filter),
            &pagination,
            filter.label(),
        ),
    }
}

/// User detail.
#[instrument(skip(ctx, state, session))]
pub async fn show(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let detail = Detail::from(state.users().fetch_one(&ctx.api, &id).await);
    let status = detail_status(&detail);
    let template = UserTemplate {
        shell: Shell::load(&ctx.admin, &session, &format!("{BASE}/{id}"), "User details").await,
        detail,
    };
    (status, template).into_response()
}

