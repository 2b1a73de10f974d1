//! In-flight action tracking.
//!
//! Only one action may run against a given record at a time. Pages ask the
//! tracker which action is running so they can disable every control on that
//! record and show a spinner on the active one.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tojumi_core::{ApprovalStatus, Decision};

use crate::api::ApiError;

/// The kind of state-changing request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Approve,
    Reject,
    Create,
    Update,
    Delete,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Past tense for success notices.
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

impl From<Decision> for ActionKind {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => Self::Approve,
            Decision::Reject => Self::Reject,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons an action was refused or failed.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Another action on the same record is still running.
    #[error("another {0} is already in progress for this record")]
    Busy(ActionKind),

    /// The record has already been decided.
    #[error("record is already {0}")]
    NotPending(ApprovalStatus),

    /// A student cannot be approved without a level.
    #[error("a level must be selected before approving")]
    LevelRequired,

    /// Invalid operator input.
    #[error("{0}")]
    InvalidInput(String),

    /// The record does not exist.
    #[error("record not found")]
    NotFound,

    /// The entity has no such action.
    #[error("action not supported for this record type")]
    Unsupported,

    /// The remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ActionError {
    /// Message suitable for an error notice.
    ///
    /// `noun` names the record (`"guarantor"`), `kind` the attempted action.
    #[must_use]
    pub fn operator_message(&self, noun: &str, kind: ActionKind) -> String {
        match self {
            Self::Busy(running) => {
                format!("Please wait: this {noun} is being {}.", running.past_tense())
            }
            Self::NotPending(status) => {
                format!("This {noun} has already been {}.", status.label().to_lowercase())
            }
            Self::LevelRequired => "Select a level before approving.".to_string(),
            Self::InvalidInput(message) => message.clone(),
            Self::NotFound => format!("The {noun} could not be found."),
            Self::Unsupported => format!("Cannot {kind} a {noun}."),
            Self::Api(err) => err.operator_message(&format!("Failed to {kind} {noun}")),
        }
    }

    /// Whether the operator must log in again.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Api(err) if err.requires_login())
    }
}

/// Records which action, if any, is running for each record id.
#[derive(Debug, Clone, Default)]
pub struct ActionTracker {
    in_flight: Arc<Mutex<HashMap<String, ActionKind>>>,
}

impl ActionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kind` as running for `id`.
    ///
    /// The action stays in flight until the returned ticket is dropped.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Busy` if an action is already running for `id`.
    pub fn begin(&self, id: &str, kind: ActionKind) -> Result<ActionTicket, ActionError> {
        let mut in_flight = self.in_flight.lock();
        if let Some(running) = in_flight.get(id) {
            return Err(ActionError::Busy(*running));
        }
        in_flight.insert(id.to_string(), kind);
        Ok(ActionTicket {
            tracker: Arc::clone(&self.in_flight),
            id: id.to_string(),
        })
    }

    /// The action currently running for `id`.
    #[must_use]
    pub fn in_flight(&self, id: &str) -> Option<ActionKind> {
        self.in_flight.lock().get(id).copied()
    }
}

/// Releases the record when dropped.
#[derive(Debug)]
pub struct ActionTicket {
    tracker: Arc<Mutex<HashMap<String, ActionKind>>>,
    id: String,
}

impl Drop for ActionTicket {
    fn drop(&mut self) {
        self.tracker.lock().remove(&self.id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_second_action_on_same_record_is_busy() {
        let tracker = ActionTracker::new();
        let ticket = tracker.begin("s1", ActionKind::Approve).unwrap();
        assert_eq!(tracker.in_flight("s1"), Some(ActionKind::Approve));

        let err = tracker.begin("s1", ActionKind::Reject).unwrap_err();
        assert!(matches!(err, ActionError::Busy(ActionKind::Approve)));

        // Other records are unaffected.
        let _other = tracker.begin("s2", ActionKind::Reject).unwrap();

        drop(ticket);
        assert_eq!(tracker.in_flight("s1"), None);
        assert!(tracker.begin("s1", ActionKind::Reject).is_ok());
    }

    #[test]
    fn test_operator_messages() {
        assert_eq!(
            ActionError::NotPending(ApprovalStatus::Approved)
                .operator_message("guarantor", ActionKind::Reject),
            "This guarantor has already been approved."
        );
        assert_eq!(
            ActionError::Api(ApiError::EmptyResponse)
                .operator_message("care home", ActionKind::Approve),
            "Failed to approve care home"
        );
        assert_eq!(
            ActionError::LevelRequired.operator_message("student", ActionKind::Approve),
            "Select a level before approving."
        );
    }

    #[test]
    fn test_decision_maps_to_kind() {
        assert_eq!(ActionKind::from(Decision::Approve), ActionKind::Approve);
        assert_eq!(ActionKind::from(Decision::Reject).past_tense(), "rejected");
    }
}
