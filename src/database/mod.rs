pub mod memory;
pub mod models;
pub mod postgres;
pub mod record;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::{DatabaseConfig, StoreBackend};

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use record::{Document, RecordId, ID_FIELD};

/// Errors from any document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid record id: {0}")]
    InvalidId(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Stored record is not a JSON object: {0}")]
    CorruptRecord(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// The four record collections the storefront keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Watches,
    Orders,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Watches,
        Collection::Orders,
        Collection::Reviews,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Watches => "watches",
            Collection::Orders => "orders",
            Collection::Reviews => "reviews",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field-equality filter. No operators, no joins.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Id(RecordId),
    Field { name: String, value: Value },
}

impl Filter {
    pub fn id(id: RecordId) -> Self {
        Filter::Id(id)
    }

    pub fn field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Field {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, id: RecordId, body: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(wanted) => *wanted == id,
            Filter::Field { name, value } => body.get(name) == Some(value),
        }
    }

    /// Identifier and equality fields an upsert seeds a new record with.
    pub fn seed(&self) -> (Option<RecordId>, Document) {
        let mut body = Document::new();
        match self {
            Filter::All => (None, body),
            Filter::Id(id) => (Some(*id), body),
            Filter::Field { name, value } => {
                body.insert(name.clone(), value.clone());
                (None, body)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: RecordId,
}

impl InsertOneResult {
    pub fn new(inserted_id: RecordId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<RecordId>,
}

impl UpdateResult {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn missed() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn upserted(id: RecordId) -> Self {
        Self {
            upserted_count: 1,
            upserted_id: Some(id),
            ..Self::missed()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Schema-flexible persistence for the storefront collections.
///
/// Every method is a single atomic operation in the backend; nothing here spans
/// operations or collections. Returned documents carry their `_id`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Every matching record in insertion order. Unbounded.
    async fn find_all(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOneResult, StoreError>;

    /// Applies `update` with `$set` semantics to the first match. With `upsert`,
    /// a miss creates a record seeded from the filter plus `update`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError>;

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Release backend resources at process shutdown.
    async fn close(&self) {}
}

pub type SharedStore = Arc<dyn DocumentStore>;

/// Open the configured backend once for the process lifetime.
pub async fn connect(config: &DatabaseConfig) -> Result<SharedStore, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on exit");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PgDocumentStore::connect(config).await?;
            store.ensure_collections().await?;
            Ok(Arc::new(store))
        }
    }
}
