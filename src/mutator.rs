//! Applies user gestures to cached lists before the server confirms them.
//!
//! The local change is made synchronously, then the remote call runs. If the
//! call fails the change is rolled back and a [`MutationFailed`] event is
//! published; if it succeeds every dependent list is invalidated so it is
//! refetched instead of guessed at.

use crate::cache::RemoteListCache;
use crate::request::ApiError;
use crate::types::events::{EventBus, MutationFailed};
use feedcore::mutation::{Applied, MutationIntent, MutationKind};
use feedcore::{Item, ItemId, QueryIdentity};
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server accepted the change and the cache reflects it.
    Applied,
    /// The server accepted the change; the target list did not hold the item.
    NotCached,
    /// The item already reflected the change; nothing was sent.
    AlreadyApplied,
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{kind} is not supported by item {item_id} in {target}")]
    Unsupported {
        kind: MutationKind,
        item_id: ItemId,
        target: QueryIdentity,
    },
}

pub struct OptimisticMutator<T> {
    cache: Arc<RemoteListCache<T>>,
    event_bus: Arc<EventBus>,
}

impl<T: Item> OptimisticMutator<T> {
    pub fn new(cache: Arc<RemoteListCache<T>>, event_bus: Arc<EventBus>) -> Self {
        Self { cache, event_bus }
    }

    /// Applies `intent` locally, then runs `remote`.
    pub async fn run<F, Fut>(
        &self,
        intent: MutationIntent,
        remote: F,
    ) -> Result<MutationOutcome, MutationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        let undo = match self.cache.apply_intent(&intent) {
            Applied::AlreadyApplied => {
                debug!(target: "Mutator", "{intent} already applied, skipping remote call");
                return Ok(MutationOutcome::AlreadyApplied);
            }
            Applied::Unsupported => {
                return Err(MutationError::Unsupported {
                    kind: intent.kind,
                    item_id: intent.item_id,
                    target: intent.target,
                });
            }
            Applied::Changed(undo) => Some(undo),
            Applied::NotCached | Applied::Deferred => None,
        };
        let cached = undo.is_some() || intent.kind == MutationKind::AcceptRequest;
        debug!(target: "Mutator", "Running {intent}");

        if let Err(error) = remote().await {
            if let Some(undo) = undo
                && !self.cache.revert(&intent.target, undo)
            {
                debug!(target: "Mutator", "Nothing to roll back for {intent}: list was reset");
            }
            warn!(target: "Mutator", "{intent} failed: {error}");
            self.event_bus.publish_mutation_failed(MutationFailed {
                intent,
                message: error.to_string(),
            });
            return Err(error.into());
        }

        for dependent in &intent.dependents {
            self.cache.invalidate(dependent);
        }
        Ok(if cached {
            MutationOutcome::Applied
        } else {
            MutationOutcome::NotCached
        })
    }

    /// Runs `first`, and `second` only once `first` has been confirmed.
    ///
    /// A failed `first` leaves `second` untouched. A failed `second` rolls
    /// back only its own local change.
    pub async fn run_chained<F1, Fut1, F2, Fut2>(
        &self,
        first: MutationIntent,
        first_remote: F1,
        second: MutationIntent,
        second_remote: F2,
    ) -> Result<MutationOutcome, MutationError>
    where
        F1: FnOnce() -> Fut1,
        Fut1: Future<Output = Result<(), ApiError>>,
        F2: FnOnce() -> Fut2,
        Fut2: Future<Output = Result<(), ApiError>>,
    {
        self.run(first, first_remote).await?;
        self.run(second, second_remote).await
    }
}
