//! CRUD orchestration for participants, events, feedback and scores.
//!
//! A single generic [`ResourceService`] handles every record kind; the
//! per-kind rules (how a create body becomes a record, how a patch is
//! applied, which channel announces a change) live in the [`Resource`]
//! impls in [`crate::records`].
//!
//! Mutations follow one sequence: validate, check the referenced
//! participant, persist, then notify the hub. A notification is only ever
//! issued after the store call succeeded, and a failed or unheard
//! notification never fails the mutation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use facilitator_types::{Event, Feedback, Participant, ParticipantId, Score};
use serde::Serialize;
use tracing::{debug, info};
use validator::Validate;

use crate::broadcast::{BroadcastHub, Channel};
use crate::error::CoreError;
use crate::store::{Record, Repository};

/// Per-kind rules for a CRUD resource.
pub trait Resource: Record {
    /// Body accepted by `create`.
    type Create: Validate + Send + 'static;
    /// PATCH body accepted by `update`.
    type Update: Validate + Send + 'static;
    /// Shape returned by reads.
    type View: Serialize + Send + 'static;

    /// Channel announcing a newly created record.
    const CREATED: Option<Channel>;
    /// Channel announcing an updated record.
    const UPDATED: Option<Channel> = None;

    /// Build a new record from a validated create body.
    fn build(input: Self::Create, now: DateTime<Utc>) -> Self;

    /// Apply the provided fields of a validated patch.
    fn apply(&mut self, patch: Self::Update, now: DateTime<Utc>);

    /// Attach the referenced participant for a read.
    ///
    /// `participant` is the record named by [`Record::participant_id`].
    /// Returns `None` when a required participant is missing.
    fn into_view(self, participant: Option<Participant>) -> Option<Self::View>;

    /// Field rules for a create body.
    fn check_create(input: &Self::Create) -> Result<(), CoreError> {
        input.validate()?;
        Ok(())
    }

    /// Field rules for a patch body.
    fn check_update(patch: &Self::Update) -> Result<(), CoreError> {
        patch.validate()?;
        Ok(())
    }
}

/// CRUD service for one resource kind.
pub struct ResourceService<T: Resource> {
    records: Arc<dyn Repository<T>>,
    participants: Arc<dyn Repository<Participant>>,
    hub: Arc<BroadcastHub>,
}

/// Participant CRUD.
pub type ParticipantService = ResourceService<Participant>;
/// Event CRUD.
pub type EventService = ResourceService<Event>;
/// Feedback CRUD.
pub type FeedbackService = ResourceService<Feedback>;
/// Score CRUD.
pub type ScoreService = ResourceService<Score>;

impl<T: Resource> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            participants: Arc::clone(&self.participants),
            hub: Arc::clone(&self.hub),
        }
    }
}

impl<T: Resource> ResourceService<T> {
    /// Create a service over `records`.
    ///
    /// `participants` is consulted to check participant references.
    pub fn new(
        records: Arc<dyn Repository<T>>,
        participants: Arc<dyn Repository<Participant>>,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        Self {
            records,
            participants,
            hub,
        }
    }

    /// Validate and persist a new record.
    pub async fn create(&self, input: T::Create) -> Result<T, CoreError> {
        T::check_create(&input)?;
        let record = T::build(input, Utc::now());
        self.ensure_participant(record.participant_id()).await?;

        let created = self.records.insert(&record).await?;
        info!(kind = T::KIND, id = %created.id(), "Record created");

        if let Some(channel) = T::CREATED {
            self.hub.notify(channel, &created).await;
        }
        Ok(created)
    }

    /// Every record, oldest first.
    pub async fn list(&self) -> Result<Vec<T>, CoreError> {
        Ok(self.records.list().await?)
    }

    /// Records belonging to one participant.
    pub async fn list_for_participant(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<T>, CoreError> {
        Ok(self.records.list_by_participant(participant).await?)
    }

    /// One record by id.
    pub async fn get(&self, id: T::Id) -> Result<T, CoreError> {
        self.records
            .find(id)
            .await?
            .ok_or_else(|| CoreError::not_found(T::KIND, id))
    }

    /// Every record as returned by reads, oldest first.
    pub async fn list_views(&self) -> Result<Vec<T::View>, CoreError> {
        let records = self.records.list().await?;
        if records.iter().all(|record| record.participant_id().is_none()) {
            return Ok(records.into_iter().filter_map(|r| r.into_view(None)).collect());
        }

        let participants: HashMap<ParticipantId, Participant> = self
            .participants
            .list()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let participant = record
                    .participant_id()
                    .and_then(|id| participants.get(&id).cloned());
                record.into_view(participant)
            })
            .collect())
    }

    /// Records belonging to one participant, as returned by reads.
    pub async fn list_views_for_participant(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<T::View>, CoreError> {
        let Some(owner) = self.participants.find(participant).await? else {
            return Ok(Vec::new());
        };
        let records = self.records.list_by_participant(participant).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| record.into_view(Some(owner.clone())))
            .collect())
    }

    /// One record by id, as returned by reads.
    pub async fn view(&self, id: T::Id) -> Result<T::View, CoreError> {
        let record = self.get(id).await?;
        let participant = match record.participant_id() {
            Some(pid) => self.participants.find(pid).await?,
            None => None,
        };
        record
            .into_view(participant)
            .ok_or_else(|| CoreError::not_found(T::KIND, id))
    }

    /// Apply the provided fields of `patch` to an existing record.
    pub async fn update(&self, id: T::Id, patch: T::Update) -> Result<T, CoreError> {
        T::check_update(&patch)?;
        let mut record = self.get(id).await?;
        let before = record.participant_id();
        record.apply(patch, Utc::now());
        if record.participant_id() != before {
            self.ensure_participant(record.participant_id()).await?;
        }

        let updated = self.records.update(&record).await?;
        info!(kind = T::KIND, id = %updated.id(), "Record updated");

        if let Some(channel) = T::UPDATED {
            self.hub.notify(channel, &updated).await;
        }
        Ok(updated)
    }

    /// Delete one record by id.
    pub async fn remove(&self, id: T::Id) -> Result<(), CoreError> {
        if !self.records.delete(id).await? {
            return Err(CoreError::not_found(T::KIND, id));
        }
        info!(kind = T::KIND, %id, "Record deleted");
        Ok(())
    }

    async fn ensure_participant(&self, id: Option<ParticipantId>) -> Result<(), CoreError> {
        let Some(id) = id else {
            return Ok(());
        };
        if self.participants.find(id).await?.is_none() {
            debug!(kind = T::KIND, participant = %id, "Rejected reference to unknown participant");
            return Err(CoreError::not_found("participant", id));
        }
        Ok(())
    }
}
