//! Repository seams between the entity stores and the remote API.
//!
//! Stores depend on these traits only, so tests can inject in-memory fakes.
//! The GraphQL implementations are thin: one declared operation per method.

use std::marker::PhantomData;

use async_trait::async_trait;
use tojumi_core::{ApprovalStatus, Decision, Level};

use crate::api::operations::{
    CreateCareServiceType, DecisionVariables, DeleteCareServiceType, GetAllCareServiceTypes,
    GetDatabaseOverview, IdVariables, Login, LoginVariables, NameVariables, NoVariables,
    RemoteApproval, RemoteEntity, ServiceTypeVariables, UpdateCareServiceType,
};
use crate::api::{
    ApiClient, ApiError, ApiSession, CareServiceType, DatabaseOverview, Entity, LoginPayload,
    StatusDelta,
};

/// Read access to one entity type.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Fetch the full collection.
    async fn list(&self, session: &ApiSession) -> Result<Vec<E>, ApiError>;

    /// Fetch one record; `Ok(None)` when the API has no such record.
    async fn get(&self, session: &ApiSession, id: &str) -> Result<Option<E>, ApiError>;
}

/// Approve/reject for entities with an approval lifecycle.
#[async_trait]
pub trait ApprovalRepository<E: Entity>: Repository<E> {
    /// Record an operator decision. `from` is the status the decision applies to.
    async fn decide(
        &self,
        session: &ApiSession,
        id: &str,
        from: ApprovalStatus,
        decision: Decision,
        level: Option<Level>,
    ) -> Result<StatusDelta, ApiError>;
}

/// Create/update/delete for care service types.
#[async_trait]
pub trait ServiceTypeRepository: Repository<CareServiceType> {
    async fn create(&self, session: &ApiSession, name: &str) -> Result<CareServiceType, ApiError>;

    async fn update(
        &self,
        session: &ApiSession,
        id: &str,
        name: &str,
    ) -> Result<CareServiceType, ApiError>;

    async fn delete(&self, session: &ApiSession, id: &str) -> Result<(), ApiError>;
}

/// Dashboard counters.
#[async_trait]
pub trait OverviewRepository: Send + Sync {
    async fn overview(&self, session: &ApiSession) -> Result<DatabaseOverview, ApiError>;
}

/// Exchanges operator credentials for an API token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginPayload, ApiError>;
}

/// GraphQL-backed repository for any entity bound to remote operations.
pub struct GraphQlRepository<E> {
    client: ApiClient,
    _entity: PhantomData<fn() -> E>,
}

impl<E> GraphQlRepository<E> {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E: RemoteEntity> Repository<E> for GraphQlRepository<E> {
    async fn list(&self, session: &ApiSession) -> Result<Vec<E>, ApiError> {
        let data = self
            .client
            .execute::<E::List>(Some(session), NoVariables {})
            .await?;
        Ok(data.into_inner().unwrap_or_default())
    }

    async fn get(&self, session: &ApiSession, id: &str) -> Result<Option<E>, ApiError> {
        let data = self
            .client
            .execute::<E::Get>(Some(session), IdVariables { id: id.to_string() })
            .await?;
        Ok(data.into_inner())
    }
}

#[async_trait]
impl<E: RemoteApproval> ApprovalRepository<E> for GraphQlRepository<E> {
    async fn decide(
        &self,
        session: &ApiSession,
        id: &str,
        from: ApprovalStatus,
        decision: Decision,
        level: Option<Level>,
    ) -> Result<StatusDelta, ApiError> {
        let level = level.filter(|_| decision == Decision::Approve);
        let variables = DecisionVariables {
            id: id.to_string(),
            level,
        };
        let data = match decision {
            Decision::Approve => {
                self.client
                    .execute::<E::Approve>(Some(session), variables)
                    .await?
            }
            Decision::Reject => {
                self.client
                    .execute::<E::Reject>(Some(session), variables)
                    .await?
            }
        };

        let confirmation = data.into_inner().ok_or(ApiError::EmptyResponse)?;
        if !confirmation.is_confirmed() {
            return Err(ApiError::EmptyResponse);
        }

        // Servers that answer with a bare flag confirm the requested decision.
        let status = confirmation
            .status()
            .filter(|s| !s.is_pending())
            .or_else(|| from.decide(decision).ok())
            .ok_or(ApiError::EmptyResponse)?;

        Ok(StatusDelta {
            status,
            level: confirmation.level().or(level),
        })
    }
}

/// GraphQL-backed care service type catalogue.
///
/// Service types have a list operation but no single-record query.
pub struct GraphQlServiceTypes {
    client: ApiClient,
}

impl GraphQlServiceTypes {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServiceTypeRepository for GraphQlServiceTypes {
    async fn create(&self, session: &ApiSession, name: &str) -> Result<CareServiceType, ApiError> {
        let data = self
            .client
            .execute::<CreateCareServiceType>(
                Some(session),
                NameVariables {
                    name: name.to_string(),
                },
            )
            .await?;
        data.into_inner().ok_or(ApiError::EmptyResponse)
    }

    async fn update(
        &self,
        session: &ApiSession,
        id: &str,
        name: &str,
    ) -> Result<CareServiceType, ApiError> {
        let data = self
            .client
            .execute::<UpdateCareServiceType>(
                Some(session),
                ServiceTypeVariables {
                    id: id.to_string(),
                    name: name.to_string(),
                },
            )
            .await?;
        data.into_inner().ok_or(ApiError::EmptyResponse)
    }

    async fn delete(&self, session: &ApiSession, id: &str) -> Result<(), ApiError> {
        let data = self
            .client
            .execute::<DeleteCareServiceType>(Some(session), IdVariables { id: id.to_string() })
            .await?;
        match data.into_inner() {
            Some(confirmation) if confirmation.is_confirmed() => Ok(()),
            _ => Err(ApiError::EmptyResponse),
        }
    }
}

#[async_trait]
impl Repository<CareServiceType> for GraphQlServiceTypes {
    async fn list(&self, session: &ApiSession) -> Result<Vec<CareServiceType>, ApiError> {
        let data = self
            .client
            .execute::<GetAllCareServiceTypes>(Some(session), NoVariables {})
            .await?;
        Ok(data.into_inner().unwrap_or_default())
    }

    async fn get(&self, session: &ApiSession, id: &str) -> Result<Option<CareServiceType>, ApiError> {
        Ok(self
            .list(session)
            .await?
            .into_iter()
            .find(|t| t.id.as_str() == id))
    }
}

#[async_trait]
impl OverviewRepository for ApiClient {
    async fn overview(&self, session: &ApiSession) -> Result<DatabaseOverview, ApiError> {
        let data = self
            .execute::<GetDatabaseOverview>(Some(session), NoVariables {})
            .await?;
        Ok(data.into_inner().unwrap_or_default())
    }
}

#[async_trait]
impl Authenticator for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginPayload, ApiError> {
        let data = self
            .execute::<Login>(
                None,
                LoginVariables {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;
        data.into_inner().ok_or(ApiError::EmptyResponse)
    }
}
