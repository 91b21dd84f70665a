use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::{Filter, Gateway, Record};

/// In-memory reference implementation of the `Gateway` contract. Each
/// collection is a map of id to JSON value behind one lock, so single-record
/// operations are atomic and conditional updates cannot interleave.
#[derive(Default)]
pub struct MemoryGateway {
    collections: RwLock<HashMap<String, HashMap<Uuid, Value>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole-store image for snapshot persistence.
    pub async fn export(&self) -> Result<Value> {
        let collections = self.collections.read().await;
        Ok(serde_json::to_value(&*collections)?)
    }

    pub fn from_snapshot(snapshot: Value) -> Result<Self> {
        let collections: HashMap<String, HashMap<Uuid, Value>> =
            serde_json::from_value(snapshot)?;
        Ok(Self {
            collections: RwLock::new(collections),
        })
    }

    pub async fn is_empty(&self) -> bool {
        let collections = self.collections.read().await;
        collections.values().all(|table| table.is_empty())
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn insert<R: Record>(&self, record: &R) -> Result<Uuid> {
        let id = record.id();
        let value = serde_json::to_value(record)?;
        let mut collections = self.collections.write().await;
        let table = collections.entry(R::COLLECTION.to_string()).or_default();
        if table.contains_key(&id) {
            return Err(Error::Duplicate {
                collection: R::COLLECTION,
                id,
            });
        }
        table.insert(id, value);
        Ok(id)
    }

    async fn get<R: Record>(&self, id: Uuid) -> Result<R> {
        self.find(id).await?.ok_or(Error::NotFound {
            collection: R::COLLECTION,
            id,
        })
    }

    async fn find<R: Record>(&self, id: Uuid) -> Result<Option<R>> {
        let collections = self.collections.read().await;
        match collections.get(R::COLLECTION).and_then(|table| table.get(&id)) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn update<R, C, P>(&self, id: Uuid, precondition: C, patch: P) -> Result<R>
    where
        R: Record,
        C: Fn(&R) -> bool + Send,
        P: FnOnce(&mut R) + Send,
    {
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(R::COLLECTION)
            .and_then(|table| table.get_mut(&id))
            .ok_or(Error::NotFound {
                collection: R::COLLECTION,
                id,
            })?;

        let mut record: R = serde_json::from_value(slot.clone())?;
        if !precondition(&record) {
            return Err(Error::Conflict {
                collection: R::COLLECTION,
                id,
            });
        }

        patch(&mut record);
        if record.id() != id {
            return Err(Error::Storage(format!(
                "patch changed the id of a {} record",
                R::COLLECTION
            )));
        }

        *slot = serde_json::to_value(&record)?;
        Ok(record)
    }

    async fn delete<R: Record>(&self, id: Uuid) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(R::COLLECTION)
            .and_then(|table| table.remove(&id))
            .map(|_| ())
            .ok_or(Error::NotFound {
                collection: R::COLLECTION,
                id,
            })
    }

    async fn query<R: Record>(&self, filter: Filter) -> Result<Vec<R>> {
        let mut rows: Vec<Value> = {
            let collections = self.collections.read().await;
            collections
                .get(R::COLLECTION)
                .map(|table| {
                    table
                        .values()
                        .filter(|value| filter.matches(value))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        filter.sort(&mut rows);
        rows.into_iter()
            .map(|value| serde_json::from_value(value).map_err(Error::from))
            .collect()
    }
}
