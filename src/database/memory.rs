//! In-process document store for tests and local development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::record::{self, Document, RecordId};
use super::{
    Collection, DeleteResult, DocumentStore, Filter, InsertOneResult, StoreError, UpdateResult,
};

type Records = Vec<(RecordId, Document)>;

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<Collection, Records>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held in `collection`.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|records| {
            records
                .iter()
                .find(|(id, body)| filter.matches(*id, body))
                .map(|(id, body)| record::with_id(*id, body.clone()))
        }))
    }

    async fn find_all(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|(id, body)| filter.matches(*id, body))
                    .map(|(id, body)| record::with_id(*id, body.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        record::strip_id(&mut document);
        let id = RecordId::new();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push((id, document));
        Ok(InsertOneResult::new(id))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        mut update: Document,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError> {
        record::strip_id(&mut update);
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection).or_default();

        if let Some((_, body)) = records.iter_mut().find(|(id, body)| filter.matches(*id, body)) {
            let modified = record::apply_set(body, &update);
            return Ok(UpdateResult::matched(modified));
        }

        if !upsert {
            return Ok(UpdateResult::missed());
        }

        let (seed_id, mut body) = filter.seed();
        let id = seed_id.unwrap_or_default();
        record::apply_set(&mut body, &update);
        records.push((id, body));
        Ok(UpdateResult::upserted(id))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(&collection) else {
            return Ok(DeleteResult::new(0));
        };

        match records.iter().position(|(id, body)| filter.matches(*id, body)) {
            Some(index) => {
                records.remove(index);
                Ok(DeleteResult::new(1))
            }
            None => Ok(DeleteResult::new(0)),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
