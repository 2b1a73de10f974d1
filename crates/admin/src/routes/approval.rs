//! Approve/reject plumbing shared by the provider, care home, student and
//! guarantor pages.

use axum::response::Redirect;
use serde::Deserialize;
use tojumi_core::format::capitalize_first;
use tojumi_core::{ApprovalStatus, Decision, Level};
use tower_sessions::Session;
use tracing::instrument;

use super::local_dashboard_path;
use crate::api::Approvable;
use crate::error::AppError;
use crate::middleware::AdminContext;
use crate::models::Notice;
use crate::models::notice::push_notice;
use crate::store::{ActionError, ActionKind, EntityStore};

/// Body of an approve or reject form.
#[derive(Debug, Default, Deserialize)]
pub struct ActionForm {
    /// Selected level, for student approvals.
    pub level: Option<String>,
    /// Page to return to afterwards.
    pub return_to: Option<String>,
}

/// One option of the level picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Approve/reject controls for one record.
///
/// Controls exist only while the record is pending; while an action runs on
/// it every control is disabled and the active one shows a spinner.
#[derive(Debug, Clone)]
pub struct ActionPanel {
    /// `/dashboard/{entity}/{id}`; forms post to `{base}/approve|reject`.
    pub base: String,
    pub pending: bool,
    pub approving: bool,
    pub rejecting: bool,
    /// Approval needs a level (students).
    pub requires_level: bool,
    pub level: Option<Level>,
    pub levels: Vec<LevelOption>,
    pub return_to: String,
}

impl ActionPanel {
    #[must_use]
    pub fn new<E: Approvable>(
        store: &EntityStore<E>,
        record: &E,
        base: String,
        level: Option<Level>,
    ) -> Self {
        let running = store.actions().in_flight(record.id());
        Self {
            return_to: base.clone(),
            base,
            pending: record.status().is_pending(),
            approving: running == Some(ActionKind::Approve),
            rejecting: running == Some(ActionKind::Reject),
            requires_level: E::LEVEL_ON_APPROVAL,
            level,
            levels: Level::ALL
                .iter()
                .map(|l| LevelOption {
                    value: l.as_str(),
                    label: l.label(),
                    selected: Some(*l) == level,
                })
                .collect(),
        }
    }

    /// Come back to `path` instead of the detail page.
    #[must_use]
    pub fn returning_to(mut self, path: impl Into<String>) -> Self {
        self.return_to = path.into();
        self
    }

    #[must_use]
    pub const fn busy(&self) -> bool {
        self.approving || self.rejecting
    }

    #[must_use]
    pub const fn can_approve(&self) -> bool {
        self.pending && !self.busy() && (!self.requires_level || self.level.is_some())
    }

    #[must_use]
    pub const fn can_reject(&self) -> bool {
        self.pending && !self.busy()
    }

    /// Value for the hidden level input.
    #[must_use]
    pub fn level_value(&self) -> &'static str {
        self.level.map_or("", Level::as_str)
    }
}

/// Parse the optional level field; blank means none.
fn parse_level(raw: Option<&str>) -> Result<Option<Level>, ActionError> {
    match raw.map(str::trim).filter(|l| !l.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ActionError::InvalidInput(format!("Unknown level: {raw}"))),
    }
}

/// Run a decision and queue the resulting notice.
///
/// Returns the redirect back to the page the form came from. An expired
/// session is left to the session guard, which logs the operator out.
///
/// # Errors
///
/// Returns `AppError::Session` if the notice cannot be stored.
#[instrument(skip(store, ctx, session, form), fields(entity = E::NAME))]
pub async fn decide<E: Approvable>(
    store: &EntityStore<E>,
    ctx: &AdminContext,
    session: &Session,
    id: &str,
    decision: Decision,
    form: ActionForm,
    base: &str,
) -> Result<Redirect, AppError> {
    let detail = format!("{base}/{id}");
    let back = local_dashboard_path(form.return_to.as_deref()).map_or(detail, String::from);
    let kind = ActionKind::from(decision);

    let outcome = match parse_level(form.level.as_deref()) {
        Ok(level) => store.decide(&ctx.api, id, decision, level).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(delta) => {
            tracing::info!(id, status = %delta.status, "Operator decision applied");
            push_notice(session, Notice::success(success_message::<E>(delta.status))).await?;
        }
        Err(e) if e.requires_login() => {
            tracing::info!(id, "Decision abandoned: session expired");
        }
        Err(e) => {
            tracing::warn!(id, error = %e, "Decision failed");
            push_notice(session, Notice::error(e.operator_message(E::NAME, kind))).await?;
        }
    }

    Ok(Redirect::to(&back))
}

fn success_message<E: Approvable>(status: ApprovalStatus) -> String {
    format!(
        "{} {} successfully!",
        capitalize_first(E::NAME),
        status.label().to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use tojumi_core::StudentId;

    use super::*;
    use crate::api::{Guarantor, Student};
    use crate::store::tests::session;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(None).ok(), Some(None));
        assert_eq!(parse_level(Some("  ")).ok(), Some(None));
        assert_eq!(parse_level(Some("SENIOR")).ok(), Some(Some(Level::Senior)));
        assert!(matches!(
            parse_level(Some("EXPERT")),
            Err(ActionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_success_message() {
        assert_eq!(
            success_message::<Guarantor>(ApprovalStatus::Approved),
            "Guarantor approved successfully!"
        );
        assert_eq!(
            success_message::<Student>(ApprovalStatus::Rejected),
            "Student rejected successfully!"
        );
    }

    #[tokio::test]
    async fn test_student_panel_needs_level() {
        let store = crate::store::tests::student_store(vec![Student {
            id: StudentId::new("s1"),
            ..Student::default()
        }]);
        store.fetch_all(&session()).await;
        let record = store.state().items[0].clone();

        let panel = ActionPanel::new(&store, &record, "/dashboard/students/s1".to_string(), None);
        assert!(panel.pending);
        assert!(panel.requires_level);
        assert!(!panel.can_approve());
        assert!(panel.can_reject());

        let panel = ActionPanel::new(
            &store,
            &record,
            "/dashboard/students/s1".to_string(),
            Some(Level::Senior),
        );
        assert!(panel.can_approve());
        assert_eq!(panel.level_value(), "SENIOR");
        assert!(panel.levels.iter().any(|l| l.selected && l.value == "SENIOR"));
    }
}
