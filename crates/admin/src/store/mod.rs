//! Per-entity fetch state.
//!
//! One [`EntityStore`] per entity type is built at start-up and shared
//! through `AppState`. Pages trigger fetches and render the resulting
//! [`StoreState`] snapshot; remote failures end up in `error` and never
//! propagate into rendering.
//!
//! Every fetch takes a ticket from a per-slot generation counter. A result is
//! applied only if no newer fetch for the same slot was started in the
//! meantime, so a slow, older response can never overwrite newer state.

pub mod action;
pub mod catalog;

pub use action::{ActionError, ActionKind, ActionTicket, ActionTracker};
pub use catalog::ServiceTypeStore;

use std::sync::Arc;

use parking_lot::Mutex;
use tojumi_core::{Decision, Level};
use tracing::instrument;

use crate::api::{ApiSession, Approvable, Entity, StatusDelta};
use crate::repository::{ApprovalRepository, Repository};

/// What a page observes about one entity type.
#[derive(Debug, Clone)]
pub struct StoreState<E> {
    pub items: Vec<E>,
    pub current: Option<E>,
    pub loading: bool,
    pub error: Option<String>,
    pub initialized: bool,
}

impl<E> StoreState<E> {
    /// Still waiting for the first collection to arrive.
    #[must_use]
    pub const fn is_first_load(&self) -> bool {
        self.loading && !self.initialized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    List,
    Current,
}

struct Slots<E> {
    items: Vec<E>,
    current: Option<E>,
    error: Option<String>,
    initialized: bool,
    list_generation: u64,
    current_generation: u64,
    list_pending: bool,
    current_pending: bool,
}

impl<E> Slots<E> {
    const fn generation(&self, slot: Slot) -> u64 {
        match slot {
            Slot::List => self.list_generation,
            Slot::Current => self.current_generation,
        }
    }

    fn set_pending(&mut self, slot: Slot, pending: bool) {
        match slot {
            Slot::List => self.list_pending = pending,
            Slot::Current => self.current_pending = pending,
        }
    }
}

impl<E> Default for Slots<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            error: None,
            initialized: false,
            list_generation: 0,
            current_generation: 0,
            list_pending: false,
            current_pending: false,
        }
    }
}

/// A started fetch. Dropping it unsettled counts as a cancellation.
struct FetchTicket<E> {
    slots: Arc<Mutex<Slots<E>>>,
    slot: Slot,
    generation: u64,
    settled: bool,
}

impl<E> FetchTicket<E> {
    /// Apply `update` if this is still the newest fetch for its slot.
    fn settle(mut self, update: impl FnOnce(&mut Slots<E>)) -> bool {
        self.settled = true;
        let mut slots = self.slots.lock();
        if slots.generation(self.slot) != self.generation {
            return false;
        }
        update(&mut slots);
        slots.set_pending(self.slot, false);
        true
    }
}

impl<E> Drop for FetchTicket<E> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut slots = self.slots.lock();
        if slots.generation(self.slot) == self.generation {
            slots.set_pending(self.slot, false);
        }
    }
}

/// Fetch state and confirmed-change application for one entity type.
pub struct EntityStore<E: Entity> {
    repo: Arc<dyn Repository<E>>,
    approvals: Option<Arc<dyn ApprovalRepository<E>>>,
    slots: Arc<Mutex<Slots<E>>>,
    actions: ActionTracker,
}

impl<E: Entity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            approvals: self.approvals.clone(),
            slots: Arc::clone(&self.slots),
            actions: self.actions.clone(),
        }
    }
}

impl<E: Entity> EntityStore<E> {
    /// Read-only store.
    #[must_use]
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        Self {
            repo,
            approvals: None,
            slots: Arc::new(Mutex::new(Slots::default())),
            actions: ActionTracker::new(),
        }
    }

    /// Store whose records can be approved and rejected.
    #[must_use]
    pub fn with_approvals<R: ApprovalRepository<E> + 'static>(repo: Arc<R>) -> Self {
        let read: Arc<dyn Repository<E>> = repo.clone();
        let approvals: Arc<dyn ApprovalRepository<E>> = repo;
        Self {
            approvals: Some(approvals),
            ..Self::new(read)
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> StoreState<E> {
        let slots = self.slots.lock();
        StoreState {
            items: slots.items.clone(),
            current: slots.current.clone(),
            loading: slots.list_pending || slots.current_pending,
            error: slots.error.clone(),
            initialized: slots.initialized,
        }
    }

    /// The action tracker for this entity type.
    #[must_use]
    pub const fn actions(&self) -> &ActionTracker {
        &self.actions
    }

    fn begin(&self, slot: Slot) -> FetchTicket<E> {
        let mut slots = self.slots.lock();
        let generation = match slot {
            Slot::List => {
                slots.list_generation += 1;
                slots.list_generation
            }
            Slot::Current => {
                slots.current_generation += 1;
                slots.current_generation
            }
        };
        slots.set_pending(slot, true);
        slots.error = None;
        FetchTicket {
            slots: Arc::clone(&self.slots),
            slot,
            generation,
            settled: false,
        }
    }

    /// Fetch the full collection.
    ///
    /// Success replaces `items` wholesale. Failure keeps the previous items
    /// and records an operator-facing error.
    #[instrument(skip(self, session), fields(entity = E::PLURAL))]
    pub async fn fetch_all(&self, session: &ApiSession) -> StoreState<E> {
        let ticket = self.begin(Slot::List);
        let result = self.repo.list(session).await;
        let applied = ticket.settle(|slots| match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "Fetched collection");
                slots.items = items;
                slots.initialized = true;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch collection");
                slots.error = Some(e.operator_message(&format!("Failed to fetch {}", E::PLURAL)));
            }
        });
        if !applied {
            tracing::debug!("Discarded stale collection response");
        }
        self.state()
    }

    /// Fetch one record into `current`.
    ///
    /// Returns this request's own outcome: `Ok(None)` when the API has no
    /// such record, `Err` with an operator-facing message when the call
    /// failed. The shared `current` slot is only written when no newer
    /// `fetch_one` was started meanwhile.
    #[instrument(skip(self, session), fields(entity = E::NAME))]
    pub async fn fetch_one(&self, session: &ApiSession, id: &str) -> Result<Option<E>, String> {
        {
            let mut slots = self.slots.lock();
            if slots.current.as_ref().is_some_and(|c| c.id() != id) {
                slots.current = None;
            }
        }
        let ticket = self.begin(Slot::Current);
        let result = self
            .repo
            .get(session, id)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to fetch record");
                e.operator_message(&format!("Failed to load {} details", E::NAME))
            });
        if matches!(result, Ok(None)) {
            tracing::debug!("Record not found");
        }
        let applied = ticket.settle(|slots| match &result {
            Ok(found) => slots.current.clone_from(found),
            Err(message) => slots.error = Some(message.clone()),
        });
        if !applied {
            tracing::debug!("Newer record request owns the shared slot");
        }
        result
    }

    /// Abandon every in-flight fetch; their results will be ignored.
    pub fn cancel_pending(&self) {
        let mut slots = self.slots.lock();
        slots.list_generation += 1;
        slots.current_generation += 1;
        slots.list_pending = false;
        slots.current_pending = false;
    }

    /// Apply a server-confirmed change to every local copy of `id`.
    pub fn apply_confirmed(&self, id: &str, patch: impl Fn(&mut E)) {
        let mut slots = self.slots.lock();
        slots
            .items
            .iter_mut()
            .filter(|item| item.id() == id)
            .for_each(&patch);
        if let Some(current) = slots.current.as_mut().filter(|c| c.id() == id) {
            patch(current);
        }
    }

    /// Add a server-created record, replacing any local copy with the same id.
    pub fn insert_confirmed(&self, entity: E) {
        let mut slots = self.slots.lock();
        if let Some(existing) = slots.items.iter_mut().find(|item| item.id() == entity.id()) {
            *existing = entity;
        } else {
            slots.items.push(entity);
        }
    }

    /// Drop every local copy of a server-deleted record.
    pub fn remove_confirmed(&self, id: &str) {
        let mut slots = self.slots.lock();
        slots.items.retain(|item| item.id() != id);
        if slots.current.as_ref().is_some_and(|c| c.id() == id) {
            slots.current = None;
        }
    }

    fn find_local(&self, id: &str) -> Option<E> {
        let slots = self.slots.lock();
        slots
            .current
            .iter()
            .chain(slots.items.iter())
            .find(|item| item.id() == id)
            .cloned()
    }
}

impl<E: Approvable> EntityStore<E> {
    /// Approve or reject a pending record.
    ///
    /// The record is looked up locally, or fetched if unknown. On success the
    /// confirmed status (and level) is applied to every local copy; on
    /// failure local state is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if the record is unknown or already decided, a
    /// required level is missing, another action is running on it, or the
    /// remote call fails.
    #[instrument(skip(self, session), fields(entity = E::NAME))]
    pub async fn decide(
        &self,
        session: &ApiSession,
        id: &str,
        decision: Decision,
        level: Option<Level>,
    ) -> Result<StatusDelta, ActionError> {
        let approvals = self.approvals.as_ref().ok_or(ActionError::Unsupported)?;

        let record = match self.find_local(id) {
            Some(record) => record,
            None => self
                .repo
                .get(session, id)
                .await
                .map_err(ActionError::Api)?
                .ok_or(ActionError::NotFound)?,
        };

        let from = record.status();
        if !from.is_pending() {
            return Err(ActionError::NotPending(from));
        }
        if decision == Decision::Approve && E::LEVEL_ON_APPROVAL && level.is_none() {
            return Err(ActionError::LevelRequired);
        }

        let _ticket = self.actions.begin(id, decision.into())?;
        // A decision that finished while the record was being looked up.
        let from = self.find_local(id).map_or(from, |record| record.status());
        if !from.is_pending() {
            return Err(ActionError::NotPending(from));
        }
        let delta = approvals
            .decide(session, id, from, decision, level)
            .await
            .map_err(ActionError::Api)?;

        tracing::info!(id, status = %delta.status, "Decision confirmed");
        self.apply_confirmed(id, |record| record.apply_status(&delta));
        Ok(delta)
    }
}
