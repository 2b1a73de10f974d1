//! Dashboard home: platform-wide counters.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::DatabaseOverview;
use crate::components::Shell;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(index))
}

/// One counter tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatTile {
    pub label: &'static str,
    pub value: String,
    pub href: Option<&'static str>,
}

/// Counter tiles in display order.
#[must_use]
pub fn stat_tiles(overview: &DatabaseOverview) -> Vec<StatTile> {
    let tile = |label, value: u64, href| StatTile {
        label,
        value: value.to_string(),
        href,
    };
    vec![
        tile("Users", overview.total_users, Some("/dashboard/users")),
        tile("Families", overview.total_families, Some("/dashboard/family")),
        tile("Care Providers", overview.total_providers, Some("/dashboard/providers")),
        tile("Students", overview.total_students, Some("/dashboard/students")),
        tile("Dependents", overview.total_dependents, Some("/dashboard/dependents")),
        tile("Care Homes", overview.total_care_homes, Some("/dashboard/carehomes")),
        tile("Guarantors", overview.total_guarantors, Some("/dashboard/guarantors")),
        tile("All Contracts", overview.all_contracts, None),
        tile("Active Contracts", overview.active_contracts, None),
        tile("Pending Contracts", overview.pending_contracts, None),
        tile("Cancelled Contracts", overview.cancelled_contracts, None),
        tile("Expired Contracts", overview.expired_contracts, None),
    ]
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub shell: Shell,
    pub tiles: Vec<StatTile>,
    pub revenue: String,
    pub error: Option<String>,
}

/// Dashboard page handler.
#[instrument(skip(ctx, state, session))]
pub async fn index(
    RequireAdminAuth(ctx): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> DashboardTemplate {
    let (overview, error) = match state.overview().overview(&ctx.api).await {
        Ok(overview) => (overview, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch dashboard overview");
            (
                DatabaseOverview::default(),
                Some(e.operator_message("Failed to fetch dashboard overview")),
            )
        }
    };

    DashboardTemplate {
        shell: Shell::load(&ctx.admin, &session, "/dashboard", "Dashboard").await,
        tiles: stat_tiles(&overview),
        revenue: overview.total_revenue.to_string(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_tiles_link_to_lists() {
        let overview = DatabaseOverview {
            total_students: 12,
            ..DatabaseOverview::default()
        };
        let tiles = stat_tiles(&overview);
        let students = tiles.iter().find(|t| t.label == "Students");
        assert_eq!(students.map(|t| t.value.as_str()), Some("12"));
        assert_eq!(students.and_then(|t| t.href), Some("/dashboard/students"));
        assert!(tiles.iter().any(|t| t.label == "Active Contracts" && t.href.is_none()));
    }
}
