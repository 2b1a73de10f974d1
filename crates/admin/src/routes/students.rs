//! Student (caregiver) list, detail and approval.
//!
//! Approving a student assigns a level. The level is picked on the detail
//! page (`?level=`) and travels with the approve form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{OriginalUri, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tojumi_core::{Decision, Level};
use tower_sessions::Session;
use serde::Deserialize;
use tracing::instrument;

use super::approval::{self, ActionForm, ActionPanel};
use super::{detail_status, status_table};
use crate::api::Student;
use crate::components::{DataTable, Detail, Shell};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

const BASE: &str = "/dashboard/students";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE, get(index))
        .route("/dashboard/students/{id}", get(show))
        .route("/dashboard/students/{id}/approve", post(approve))
        .route("/dashboard/students/{id}/reject", post(reject))
}

#[derive(Template, WebTemplate)]
#[template(path = "students/index.html")]
pub struct StudentsTemplate {
    pub shell: Shell,
    pub table: DataTable<Student>,
}

#[derive(Template, WebTemplate)]
#[template(path = "students/show.html")]
pub struct StudentTemplate {
    pub shell: Shell,
    pub detail: Detail<Student>,
    pub actions: Option<ActionPanel>,
}

#[instrument(skip(ctx, state, session, uri))]
pub async fn index(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> StudentsTemplate {
    let snapshot = state.students().fetch_all(&ctx.api).await;
    StudentsTemplate {
        shell: Shell::load(&ctx.admin, &session, BASE, "Students").await,
        table: status_table(&snapshot, uri.query(), state.config().pagination()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LevelQuery {
    pub level: Option<String>,
}

impl LevelQuery {
    /// The picked level; unknown values are ignored.
    fn level(&self) -> Option<Level> {
        self.level.as_deref().and_then(|raw| raw.parse().ok())
    }
}

#[instrument(skip(ctx, state, session))]
pub async fn show(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<LevelQuery>,
) -> Response {
    let detail = Detail::from(state.students().fetch_one(&ctx.api, &id).await);
    let path = format!("{BASE}/{id}");
    let actions = match &detail {
        Detail::Found(student) => Some(ActionPanel::new(
            state.students(),
            student,
            path.clone(),
            query.level().or(student.level),
        )),
        _ => None,
    };
    let status = detail_status(&detail);
    let template = StudentTemplate {
        shell: Shell::load(&ctx.admin, &session, &path, "Student details").await,
        detail,
        actions,
    };
    (status, template).into_response()
}

/// Approve a pending student.
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
    approval::decide(state.students(), &ctx, &session, &id, Decision::Approve, form, BASE).await
}

/// Reject a pending student.
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
    approval::decide(state.students(), &ctx, &session, &id, Decision::Reject, form, BASE).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_query() {
        let picked = LevelQuery {
            level: Some("INTERMEDIATE".to_string()),
        };
        assert_eq!(picked.level(), Some(Level::Intermediate));
        let unknown = LevelQuery {
            level: Some("guru".to_string()),
        };
        assert_eq!(unknown.level(), None);
        assert_eq!(LevelQuery::default().level(), None);
    }
}
