//! Care service type catalogue: the one collection the panel edits directly.

use std::ops::Deref;
use std::sync::Arc;

use tracing::instrument;

use super::{ActionError, ActionKind, EntityStore};
use crate::api::{ApiSession, CareServiceType};
use crate::repository::ServiceTypeRepository;

/// Tracker key for a create, which has no id yet.
pub const NEW_SERVICE_TYPE: &str = "new";

/// Longest accepted service type name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Fetch state plus create/update/delete for care service types.
#[derive(Clone)]
pub struct ServiceTypeStore {
    store: EntityStore<CareServiceType>,
    repo: Arc<dyn ServiceTypeRepository>,
}

impl Deref for ServiceTypeStore {
    type Target = EntityStore<CareServiceType>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl ServiceTypeStore {
    #[must_use]
    pub fn new<R: ServiceTypeRepository + 'static>(repo: Arc<R>) -> Self {
        let read: Arc<dyn crate::repository::Repository<CareServiceType>> = repo.clone();
        Self {
            store: EntityStore::new(read),
            repo,
        }
    }

    /// Create a service type and add it to the local list.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if the name is invalid, a create is already
    /// running, or the remote call fails.
    #[instrument(skip(self, session))]
    pub async fn create(
        &self,
        session: &ApiSession,
        name: &str,
    ) -> Result<CareServiceType, ActionError> {
        let name = validate_name(name)?;
        let _ticket = self.actions().begin(NEW_SERVICE_TYPE, ActionKind::Create)?;
        let created = self.repo.create(session, name).await?;
        tracing::info!(id = %created.id, "Service type created");
        self.insert_confirmed(created.clone());
        Ok(created)
    }

    /// Rename a service type.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if the name is invalid, another action is
    /// running on the record, or the remote call fails.
    #[instrument(skip(self, session))]
    pub async fn update(
        &self,
        session: &ApiSession,
        id: &str,
        name: &str,
    ) -> Result<CareServiceType, ActionError> {
        let name = validate_name(name)?;
        let _ticket = self.actions().begin(id, ActionKind::Update)?;
        let updated = self.repo.update(session, id, name).await?;
        let confirmed_name = updated.name.clone();
        self.apply_confirmed(id, |service_type| service_type.name.clone_from(&confirmed_name));
        Ok(updated)
    }

    /// Delete a service type.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if another action is running on the record or
    /// the remote call fails.
    #[instrument(skip(self, session))]
    pub async fn delete(&self, session: &ApiSession, id: &str) -> Result<(), ActionError> {
        let _ticket = self.actions().begin(id, ActionKind::Delete)?;
        self.repo.delete(session, id).await?;
        tracing::info!(id, "Service type deleted");
        self.remove_confirmed(id);
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str, ActionError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ActionError::InvalidInput(
            "Service type name cannot be empty.".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ActionError::InvalidInput(format!(
            "Service type name must be at most {MAX_NAME_LENGTH} characters."
        )));
    }
    Ok(name)
}
