//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{
    ApiClient, CareBusiness, Carehome, Dependent, Family, Guarantor, Student, User,
};
use crate::config::AdminConfig;
use crate::repository::{
    Authenticator, GraphQlRepository, GraphQlServiceTypes, OverviewRepository,
};
use crate::store::{EntityStore, ServiceTypeStore};

/// Everything the handlers read from or write through.
///
/// Built once at start-up. Tests replace individual fields with stores over
/// in-memory repositories before handing the set to [`AppState::with_services`].
pub struct Services {
    pub users: EntityStore<User>,
    pub families: EntityStore<Family>,
    pub dependents: EntityStore<Dependent>,
    pub providers: EntityStore<CareBusiness>,
    pub carehomes: EntityStore<Carehome>,
    pub students: EntityStore<Student>,
    pub guarantors: EntityStore<Guarantor>,
    pub service_types: ServiceTypeStore,
    pub overview: Arc<dyn OverviewRepository>,
    pub auth: Arc<dyn Authenticator>,
}

impl Services {
    /// Stores and repositories backed by the GraphQL API.
    #[must_use]
    pub fn graphql(client: &ApiClient) -> Self {
        Self {
            users: EntityStore::new(Arc::new(GraphQlRepository::<User>::new(client.clone()))),
            families: EntityStore::new(Arc::new(GraphQlRepository::<Family>::new(
                client.clone(),
            ))),
            dependents: EntityStore::new(Arc::new(GraphQlRepository::<Dependent>::new(
                client.clone(),
            ))),
            providers: EntityStore::with_approvals(Arc::new(
                GraphQlRepository::<CareBusiness>::new(client.clone()),
            )),
            carehomes: EntityStore::with_approvals(Arc::new(
                GraphQlRepository::<Carehome>::new(client.clone()),
            )),
            students: EntityStore::with_approvals(Arc::new(GraphQlRepository::<Student>::new(
                client.clone(),
            ))),
            guarantors: EntityStore::with_approvals(Arc::new(
                GraphQlRepository::<Guarantor>::new(client.clone()),
            )),
            service_types: ServiceTypeStore::new(Arc::new(GraphQlServiceTypes::new(
                client.clone(),
            ))),
            overview: Arc::new(client.clone()),
            auth: Arc::new(client.clone()),
        }
    }
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    services: Services,
}

impl AppState {
    /// Create application state talking to the configured GraphQL endpoint.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let client = ApiClient::new(config.graphql_endpoint.clone());
        let services = Services::graphql(&client);
        Self::with_services(config, services)
    }

    #[must_use]
    pub fn with_services(config: AdminConfig, services: Services) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, services }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn users(&self) -> &EntityStore<User> {
        &self.inner.services.users
    }

    #[must_use]
    pub fn families(&self) -> &EntityStore<Family> {
        &self.inner.services.families
    }

    #[must_use]
    pub fn dependents(&self) -> &EntityStore<Dependent> {
        &self.inner.services.dependents
    }

    #[must_use]
    pub fn providers(&self) -> &EntityStore<CareBusiness> {
        &self.inner.services.providers
    }

    #[must_use]
    pub fn carehomes(&self) -> &EntityStore<Carehome> {
        &self.inner.services.carehomes
    }

    #[must_use]
    pub fn students(&self) -> &EntityStore<Student> {
        &self.inner.services.students
    }

    #[must_use]
    pub fn guarantors(&self) -> &EntityStore<Guarantor> {
        &self.inner.services.guarantors
    }

    #[must_use]
    pub fn service_types(&self) -> &ServiceTypeStore {
        &self.inner.services.service_types
    }

    /// Dashboard counters.
    #[must_use]
    pub fn overview(&self) -> &dyn OverviewRepository {
        self.inner.services.overview.as_ref()
    }

    /// Credential exchange for the login form.
    #[must_use]
    pub fn authenticator(&self) -> &dyn Authenticator {
        self.inner.services.auth.as_ref()
    }
}
