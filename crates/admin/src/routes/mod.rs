//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                               - Liveness check
//!
//! # Auth
//! GET  /                                     - Login page (?redirect=)
//! POST /                                     - Log in
//! POST /logout                               - Log out
//!
//! # Dashboard (session required)
//! GET  /dashboard                            - Overview counters
//! GET  /dashboard/users[/{id}]               - Users
//! GET  /dashboard/family[/{id}]              - Families and their dependents
//! GET  /dashboard/dependents[/{id}]          - Dependents, appointments, care logs
//! GET  /dashboard/providers[/{id}]           - Care businesses
//! GET  /dashboard/carehomes[/{id}]           - Care homes
//! GET  /dashboard/students[/{id}]            - Students (?level= on detail)
//! GET  /dashboard/guarantors[/{id}]          - Guarantors
//! POST /dashboard/{entity}/{id}/approve      - Approve a pending record
//! POST /dashboard/{entity}/{id}/reject       - Reject a pending record
//! GET  /dashboard/settings                   - Care service types (?edit=)
//! POST /dashboard/settings/service-types     - Create a service type
//! POST /dashboard/settings/service-types/{id}         - Rename
//! POST /dashboard/settings/service-types/{id}/delete  - Delete
//! ```

pub mod approval;
pub mod auth;
pub mod carehomes;
pub mod dashboard;
pub mod dependents;
pub mod families;
pub mod guarantors;
pub mod providers;
pub mod settings;
pub mod students;
pub mod users;

use axum::{Router, http::StatusCode, middleware::from_fn, routing::get};
use tojumi_core::filter::filter_param;
use tojumi_core::{Pagination, PaginationOptions, StatusFilter};
use tower_http::services::ServeDir;

use crate::api::{Approvable, Entity};
use crate::components::{DataTable, Detail, FilterTab};
use crate::middleware::{
    create_session_layer, request_id_middleware, require_session, security_headers_middleware,
};
use crate::state::AppState;
use crate::store::StoreState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Routes that require a signed-in operator.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .merge(dashboard::router())
        .merge(users::router())
        .merge(families::router())
        .merge(dependents::router())
        .merge(providers::router())
        .merge(carehomes::router())
        .merge(students::router())
        .merge(guarantors::router())
        .merge(settings::router())
        .route_layer(from_fn(require_session))
}

/// The complete admin application, minus the tracing and Sentry layers
/// installed by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(dashboard_routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Does not contact the API.
async fn health() -> &'static str {
    "ok"
}

/// Accept `target` as a post-login or post-action destination only when it
/// is a path inside the dashboard.
#[must_use]
pub fn local_dashboard_path(target: Option<&str>) -> Option<&str> {
    let target = target?.trim();
    let rest = target.strip_prefix("/dashboard")?;
    let well_formed = rest.is_empty() || rest.starts_with('/') || rest.starts_with('?');
    (well_formed && !target.contains("//") && !target.contains('\\')).then_some(target)
}

/// Status code for a detail page: 404 only when the API has no such record.
pub(crate) const fn detail_status<E>(detail: &Detail<E>) -> StatusCode {
    match detail {
        Detail::NotFound => StatusCode::NOT_FOUND,
        Detail::Found(_) | Detail::Failed(_) => StatusCode::OK,
    }
}

/// Table over an approvable collection with the status filter from `query`.
pub(crate) fn status_table<E: Approvable>(
    state: &StoreState<E>,
    query: Option<&str>,
    options: PaginationOptions,
) -> DataTable<E> {
    let filter = StatusFilter::from_query(filter_param(query).as_deref());
    let filtered = filter.apply(&state.items, E::status);
    let pagination = Pagination::from_query(options, query);
    DataTable::new(
        state,
        &filtered,
        FilterTab::status_tabs(query, filter),
        &pagination,
        filter.label(),
    )
}

/// Table over a collection without a filter.
pub(crate) fn plain_table<E: Entity>(
    state: &StoreState<E>,
    query: Option<&str>,
    options: PaginationOptions,
) -> DataTable<E> {
    let all: Vec<&E> = state.items.iter().collect();
    let pagination = Pagination::from_query(options, query);
    DataTable::new(state, &all, Vec::new(), &pagination, "All")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AdminConfig;
    use crate::middleware::REQUEST_ID_HEADER;

    fn test_app() -> Router {
        let config = AdminConfig::from_vars(|key| match key {
            "GRAPHQL_ENDPOINT" => Some("http://127.0.0.1:9/graphql".to_string()),
            "ADMIN_BASE_URL" => Some("http://127.0.0.1:3001".to_string()),
            _ => None,
        })
        .unwrap();
        app(AppState::new(config))
    }

    #[tokio::test]
    async fn test_health_carries_security_headers_and_request_id() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_dashboard_without_session_redirects_to_login() {
        let response = test_app()
            .oneshot(
                Request::get("/dashboard/carehomes?page=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/?redirect=%2Fdashboard%2Fcarehomes%3Fpage%3D2"
        );
    }

    #[test]
    fn test_local_dashboard_path() {
        assert_eq!(
            local_dashboard_path(Some("/dashboard/students?filter=pending")),
            Some("/dashboard/students?filter=pending")
        );
        assert_eq!(local_dashboard_path(Some("/dashboard")), Some("/dashboard"));
        assert_eq!(local_dashboard_path(Some("/dashboardx")), None);
        assert_eq!(local_dashboard_path(Some("https://evil.example/dashboard")), None);
        assert_eq!(local_dashboard_path(Some("/dashboard//evil.example")), None);
        assert_eq!(local_dashboard_path(Some("/dashboard/\\evil")), None);
        assert_eq!(local_dashboard_path(None), None);
    }
}
