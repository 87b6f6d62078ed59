//! In-memory engagement repository
//!
//! Deterministic store for tests and local runs, with per-entity and
//! per-kind fault injection.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::domain::{EngagementCounters, EngagementSnapshot, EntityKind, RankedEntity};

use super::{EngagementRepository, RepositoryError};

/// Failure to inject for one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Aggregate reads for the entity fail
    Aggregation,
    /// Writing the entity's score fails
    Persistence,
    /// Aggregate reads for the entity panic
    Panic,
}

#[derive(Debug, Clone)]
struct Record {
    snapshot: EngagementSnapshot,
    parent: Option<Uuid>,
    score: i64,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<(EntityKind, Uuid), Record>,
    faults: HashMap<Uuid, Fault>,
    /// Kinds whose listing and ranking queries fail
    kind_faults: HashSet<EntityKind>,
}

impl Inner {
    fn check_read(&self, id: &Uuid) -> Result<(), RepositoryError> {
        match self.faults.get(id) {
            Some(Fault::Aggregation) => Err(RepositoryError::Query(format!(
                "injected aggregation failure for {}",
                id
            ))),
            Some(Fault::Panic) => panic!("injected panic for {}", id),
            _ => Ok(()),
        }
    }

    fn check_kind(&self, kind: EntityKind) -> Result<(), RepositoryError> {
        if self.kind_faults.contains(&kind) {
            return Err(RepositoryError::Query(format!(
                "injected failure listing {}",
                kind
            )));
        }
        Ok(())
    }
}

/// [`EngagementRepository`] backed by a `HashMap`
#[derive(Debug, Default)]
pub struct InMemoryEngagementRepository {
    inner: RwLock<Inner>,
}

impl InMemoryEngagementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_event(&self, id: Uuid, snapshot: EngagementSnapshot) {
        self.insert(EntityKind::Event, id, snapshot, None);
    }

    pub fn insert_sub_event(&self, id: Uuid, event_id: Uuid, snapshot: EngagementSnapshot) {
        self.insert(EntityKind::SubEvent, id, snapshot, Some(event_id));
    }

    pub fn insert_product(&self, id: Uuid, snapshot: EngagementSnapshot) {
        self.insert(EntityKind::Product, id, snapshot, None);
    }

    /// Seed a stored score directly, bypassing the formula
    pub fn set_score(&self, kind: EntityKind, id: Uuid, score: i64) {
        let mut inner = self.write();
        if let Some(record) = inner.records.get_mut(&(kind, id)) {
            record.score = score;
        }
    }

    pub fn score_of(&self, kind: EntityKind, id: Uuid) -> Option<i64> {
        self.read().records.get(&(kind, id)).map(|r| r.score)
    }

    pub fn remove(&self, kind: EntityKind, id: Uuid) {
        self.write().records.remove(&(kind, id));
    }

    pub fn inject_fault(&self, id: Uuid, fault: Fault) {
        self.write().faults.insert(id, fault);
    }

    pub fn clear_fault(&self, id: Uuid) {
        self.write().faults.remove(&id);
    }

    /// Make `list_ids` and `top_scored` fail for a whole kind
    pub fn inject_kind_fault(&self, kind: EntityKind) {
        self.write().kind_faults.insert(kind);
    }

    pub fn clear_kind_fault(&self, kind: EntityKind) {
        self.write().kind_faults.remove(&kind);
    }

    fn insert(
        &self,
        kind: EntityKind,
        id: Uuid,
        snapshot: EngagementSnapshot,
        parent: Option<Uuid>,
    ) {
        self.write().records.insert(
            (kind, id),
            Record {
                snapshot,
                parent,
                score: 0,
            },
        );
    }

    // A poisoned lock only means another test thread panicked mid-write;
    // the map itself is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot(
        &self,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError> {
        let inner = self.read();
        inner.check_read(&id)?;
        Ok(inner.records.get(&(kind, id)).map(|r| r.snapshot.clone()))
    }
}

#[async_trait]
impl EngagementRepository for InMemoryEngagementRepository {
    async fn event_engagement(
        &self,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError> {
        self.snapshot(EntityKind::Event, id)
    }

    async fn sub_event_rollup(
        &self,
        event_id: Uuid,
    ) -> Result<EngagementCounters, RepositoryError> {
        let inner = self.read();
        let mut total = EngagementCounters::default();
        for ((kind, id), record) in inner.records.iter() {
            if *kind != EntityKind::SubEvent || record.parent != Some(event_id) {
                continue;
            }
            inner.check_read(id)?;
            let c = record.snapshot.counters;
            total = total + EngagementCounters::new(0, c.rsvps, c.media, c.product_engagement);
        }
        Ok(total)
    }

    async fn sub_event_engagement(
        &self,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError> {
        self.snapshot(EntityKind::SubEvent, id)
    }

    async fn product_engagement(
        &self,
        id: Uuid,
    ) -> Result<Option<EngagementSnapshot>, RepositoryError> {
        self.snapshot(EntityKind::Product, id)
    }

    async fn list_ids(&self, kind: EntityKind) -> Result<Vec<Uuid>, RepositoryError> {
        let inner = self.read();
        inner.check_kind(kind)?;
        let mut ids: Vec<Uuid> = inner
            .records
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, id)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn store_score(
        &self,
        kind: EntityKind,
        id: Uuid,
        score: i64,
    ) -> Result<bool, RepositoryError> {
        let mut inner = self.write();
        if inner.faults.get(&id) == Some(&Fault::Persistence) {
            return Err(RepositoryError::Query(format!(
                "injected persistence failure for {}",
                id
            )));
        }
        match inner.records.get_mut(&(kind, id)) {
            Some(record) => {
                record.score = score.max(0);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn top_scored(
        &self,
        kind: EntityKind,
        limit: usize,
    ) -> Result<Vec<RankedEntity>, RepositoryError> {
        let inner = self.read();
        inner.check_kind(kind)?;
        let mut ranked: Vec<RankedEntity> = inner
            .records
            .iter()
            .filter(|((k, _), r)| *k == kind && r.score > 0)
            .map(|((_, id), r)| RankedEntity {
                kind,
                id: *id,
                trending_score: r.score,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.trending_score
                .cmp(&a.trending_score)
                .then(a.id.cmp(&b.id))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }
}
