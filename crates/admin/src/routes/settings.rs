//! Settings: the care service type catalogue.
//!
//! Service types are the only records the panel edits directly. Each change
//! is a form post that redirects back to the settings page with a notice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{CareServiceType, Entity};
use crate::components::Shell;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::Notice;
use crate::models::notice::push_notice;
use crate::state::AppState;
use crate::store::catalog::{MAX_NAME_LENGTH, NEW_SERVICE_TYPE};
use crate::store::{ActionError, ActionKind, ActionTracker};

const BASE: &str = "/dashboard/settings";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE, get(index))
        .route("/dashboard/settings/service-types", post(create))
        .route("/dashboard/settings/service-types/{id}", post(update))
        .route("/dashboard/settings/service-types/{id}/delete", post(delete))
}

// =============================================================================
// Templates
// =============================================================================

/// One row of the service type list.
#[derive(Debug, Clone)]
pub struct ServiceTypeRow {
    pub id: String,
    pub name: String,
    /// Shown as an inline rename form.
    pub editing: bool,
    pub updating: bool,
    pub deleting: bool,
}

impl ServiceTypeRow {
    fn new(service_type: &CareServiceType, editing: Option<&str>, actions: &ActionTracker) -> Self {
        let id = service_type.id().to_string();
        let running = actions.in_flight(&id);
        Self {
            editing: editing == Some(id.as_str()),
            updating: running == Some(ActionKind::Update),
            deleting: running == Some(ActionKind::Delete),
            name: service_type.name.clone(),
            id,
        }
    }

    #[must_use]
    pub const fn busy(&self) -> bool {
        self.updating || self.deleting
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "settings/index.html")]
pub struct SettingsTemplate {
    pub shell: Shell,
    pub service_types: Vec<ServiceTypeRow>,
    pub error: Option<String>,
    pub loading: bool,
    pub creating: bool,
    pub max_name_length: usize,
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    /// Id of the service type being renamed.
    pub edit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceTypeForm {
    pub name: String,
}

#[instrument(skip(ctx, state, session))]
pub async fn index(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SettingsQuery>,
) -> SettingsTemplate {
    let store = state.service_types();
    let snapshot = store.fetch_all(&ctx.api).await;
    let editing = query.edit.as_deref();
    let loading = snapshot.is_first_load();

    SettingsTemplate {
        shell: Shell::load(&ctx.admin, &session, BASE, "Settings").await,
        service_types: snapshot
            .items
            .iter()
            .map(|t| ServiceTypeRow::new(t, editing, store.actions()))
            .collect(),
        error: snapshot.error,
        loading,
        creating: store.actions().in_flight(NEW_SERVICE_TYPE).is_some(),
        max_name_length: MAX_NAME_LENGTH,
    }
}

/// Create a service type.
///
/// # Errors
///
/// Returns `AppError::Session` if the outcome notice cannot be stored.
#[instrument(skip(ctx, state, session, form))]
pub async fn create(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ServiceTypeForm>,
) -> Result<Redirect, AppError> {
    let outcome = state.service_types().create(&ctx.api, &form.name).await;
    report(&session, ActionKind::Create, outcome.map(drop)).await?;
    Ok(Redirect::to(BASE))
}

/// Rename a service type. A failed rename stays in edit mode.
///
/// # Errors
///
/// Returns `AppError::Session` if the outcome notice cannot be stored.
#[instrument(skip(ctx, state, session, form))]
pub async fn update(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ServiceTypeForm>,
) -> Result<Redirect, AppError> {
    let outcome = state
        .service_types()
        .update(&ctx.api, &id, &form.name)
        .await;
    let succeeded = report(&session, ActionKind::Update, outcome.map(drop)).await?;
    if succeeded {
        Ok(Redirect::to(BASE))
    } else {
        Ok(Redirect::to(&edit_href(&id)))
    }
}

/// Delete a service type.
///
/// # Errors
///
/// Returns `AppError::Session` if the outcome notice cannot be stored.
#[instrument(skip(ctx, state, session))]
pub async fn delete(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let outcome = state.service_types().delete(&ctx.api, &id).await;
    report(&session, ActionKind::Delete, outcome).await?;
    Ok(Redirect::to(BASE))
}

/// Queue the notice for a catalogue change. Returns whether it succeeded.
async fn report(
    session: &Session,
    kind: ActionKind,
    outcome: Result<(), ActionError>,
) -> Result<bool, AppError> {
    match outcome {
        Ok(()) => {
            push_notice(
                session,
                Notice::success(format!("Service type {} successfully!", kind.past_tense())),
            )
            .await?;
            Ok(true)
        }
        Err(e) if e.requires_login() => {
            tracing::info!(action = %kind, "Service type change abandoned: session expired");
            Ok(false)
        }
        Err(e) => {
            tracing::warn!(action = %kind, error = %e, "Service type change failed");
            push_notice(session, Notice::error(failure_message(kind, &e))).await?;
            Ok(false)
        }
    }
}

fn failure_message(kind: ActionKind, error: &ActionError) -> String {
    match error {
        ActionError::InvalidInput(message) => message.clone(),
        _ => format!(
            "Error {} service type: {}",
            gerund(kind),
            error.operator_message(CareServiceType::NAME, kind)
        ),
    }
}

const fn gerund(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Create => "creating",
        ActionKind::Update => "updating",
        ActionKind::Delete => "deleting",
        ActionKind::Approve => "approving",
        ActionKind::Reject => "rejecting",
    }
}

fn edit_href(id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("{BASE}?edit={encoded}")
}

#[cfg(test)]
mod tests {
    use tojumi_core::CareServiceTypeId;

    use super::*;
    use crate::api::{ApiError, GraphQLError};

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            failure_message(
                ActionKind::Create,
                &ActionError::InvalidInput("Service type name cannot be empty.".to_string())
            ),
            "Service type name cannot be empty."
        );
        let remote = ActionError::Api(ApiError::GraphQL(vec![GraphQLError {
            message: "service type already exists".to_string(),
            path: None,
        }]));
        assert_eq!(
            failure_message(ActionKind::Create, &remote),
            "Error creating service type: Service type already exists"
        );
    }

    #[test]
    fn test_row_reflects_edit_and_running_action() {
        let actions = ActionTracker::new();
        let service_type = CareServiceType {
            id: CareServiceTypeId::new("t1"),
            name: "Nursing".to_string(),
        };
        let row = ServiceTypeRow::new(&service_type, Some("t1"), &actions);
        assert!(row.editing);
        assert!(!row.busy());

        let _ticket = actions.begin("t1", ActionKind::Delete).unwrap_or_else(|e| panic!("{e}"));
        let row = ServiceTypeRow::new(&service_type, None, &actions);
        assert!(!row.editing);
        assert!(row.deleting);
        assert!(row.busy());
    }

    #[test]
    fn test_edit_href_encodes_id() {
        assert_eq!(edit_href("t 1"), "/dashboard/settings?edit=t+1");
    }
}
