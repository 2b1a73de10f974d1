//! Page chrome: sidebar navigation, operator badge and flash notices.

use tower_sessions::Session;

use crate::models::notice::take_notices;
use crate::models::{CurrentAdmin, Notice};

/// A sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

const NAVIGATION: [(&str, &str); 9] = [
    ("Dashboard", "/dashboard"),
    ("Users", "/dashboard/users"),
    ("Families", "/dashboard/family"),
    ("Dependents", "/dashboard/dependents"),
    ("Care Providers", "/dashboard/providers"),
    ("Care Homes", "/dashboard/carehomes"),
    ("Students", "/dashboard/students"),
    ("Guarantors", "/dashboard/guarantors"),
    ("Settings", "/dashboard/settings"),
];

/// Sidebar entries with the one owning `current_path` marked active.
#[must_use]
pub fn navigation(current_path: &str) -> Vec<NavItem> {
    NAVIGATION
        .iter()
        .map(|&(label, href)| NavItem {
            label,
            href,
            active: if href == "/dashboard" {
                current_path == href
            } else {
                current_path == href || current_path.starts_with(&format!("{href}/"))
            },
        })
        .collect()
}

/// Layout data every authenticated page carries.
#[derive(Debug, Clone)]
pub struct Shell {
    pub title: String,
    pub admin_name: String,
    pub admin_initials: String,
    pub nav: Vec<NavItem>,
    pub notices: Vec<Notice>,
}

impl Shell {
    /// Build the chrome and take any notices queued for this page.
    pub async fn load(
        admin: &CurrentAdmin,
        session: &Session,
        current_path: &str,
        title: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            admin_name: admin.name(),
            admin_initials: admin.initials(),
            nav: navigation(current_path),
            notices: take_notices(session).await,
        }
    }
}
