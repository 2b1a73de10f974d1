//! One-shot flash notices.
//!
//! Handlers push a notice before redirecting; the next rendered page takes
//! every pending notice out of the session and shows it once.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "notice notice-success",
            Self::Error => "notice notice-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Queue a notice for the next page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push_notice(
    session: &Session,
    notice: Notice,
) -> Result<(), tower_sessions::session::Error> {
    let mut notices: Vec<Notice> = session
        .get(session_keys::NOTICES)
        .await?
        .unwrap_or_default();
    notices.push(notice);
    session.insert(session_keys::NOTICES, notices).await
}

/// Take every queued notice. A session error yields no notices.
pub async fn take_notices(session: &Session) -> Vec<Notice> {
    match session.remove::<Vec<Notice>>(session_keys::NOTICES).await {
        Ok(notices) => notices.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read notices from session");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_notices_are_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        push_notice(&session, Notice::success("Student approved"))
            .await
            .unwrap();
        push_notice(&session, Notice::error("Failed to reject guarantor"))
            .await
            .unwrap();

        let notices = take_notices(&session).await;
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert_eq!(notices[1].message, "Failed to reject guarantor");

        assert!(take_notices(&session).await.is_empty());
    }
}
