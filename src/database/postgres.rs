//! PostgreSQL backend: one table per collection, JSONB body per row.

use std::time::Duration;

use async_trait::async_trait;
use futures::{future, TryStreamExt};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use super::record::{self, Document, RecordId};
use super::{
    Collection, DeleteResult, DocumentStore, Filter, InsertOneResult, StoreError, UpdateResult,
};
use crate::config::DatabaseConfig;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(Self { pool })
    }

    /// Create collection tables that do not exist yet. Existing tables are left alone.
    pub async fn ensure_collections(&self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id UUID PRIMARY KEY,
                    body JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )",
                table(collection)
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        debug!("Collection tables ready");
        Ok(())
    }
}

/// Quoted table name. Collection names are a closed set, never user input.
fn table(collection: Collection) -> String {
    format!("\"{}\"", collection.name())
}

/// SQL condition for `filter`, using `$param` when the filter needs a bind.
fn condition(filter: &Filter, param: usize) -> String {
    match filter {
        Filter::All => "TRUE".to_string(),
        Filter::Id(_) => format!("id = ${param}"),
        Filter::Field { .. } => format!("body @> ${param}"),
    }
}

fn bind_filter<'q>(query: PgQuery<'q>, filter: &Filter) -> PgQuery<'q> {
    match filter {
        Filter::All => query,
        Filter::Id(id) => query.bind(id.as_uuid()),
        Filter::Field { name, value } => {
            let mut contained = Document::new();
            contained.insert(name.clone(), value.clone());
            query.bind(Json(Value::Object(contained)))
        }
    }
}

fn row_to_document(row: PgRow) -> Result<Document, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let Json(body): Json<Value> = row.try_get("body")?;
    match body {
        Value::Object(map) => Ok(record::with_id(RecordId::from(id), map)),
        other => Err(StoreError::CorruptRecord(other.to_string())),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let sql = format!(
            "SELECT id, body FROM {} WHERE {} ORDER BY created_at, id LIMIT 1",
            table(collection),
            condition(filter, 1)
        );
        let row = bind_filter(sqlx::query(&sql), filter)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_document).transpose()
    }

    async fn find_all(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let sql = format!(
            "SELECT id, body FROM {} WHERE {} ORDER BY created_at, id",
            table(collection),
            condition(filter, 1)
        );
        bind_filter(sqlx::query(&sql), filter)
            .fetch(&self.pool)
            .map_err(StoreError::from)
            .and_then(|row| future::ready(row_to_document(row)))
            .try_collect()
            .await
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        record::strip_id(&mut document);
        let id = RecordId::new();
        let sql = format!("INSERT INTO {} (id, body) VALUES ($1, $2)", table(collection));
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Json(Value::Object(document)))
            .execute(&self.pool)
            .await?;
        debug!("Inserted {} into {}", id, collection);
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
        let table = table(collection);

        // Lock the first match, merge top-level keys, and only count rows whose body changed.
        let sql = format!(
            "WITH target AS (
                SELECT id, body FROM {table} WHERE {cond} ORDER BY created_at, id LIMIT 1 FOR UPDATE
            ), updated AS (
                UPDATE {table} AS d SET body = d.body || $1
                FROM target
                WHERE d.id = target.id AND (target.body || $1) <> target.body
                RETURNING d.id
            )
            SELECT (SELECT COUNT(*) FROM target) AS matched,
                   (SELECT COUNT(*) FROM updated) AS modified",
            cond = condition(filter, 2)
        );
        let query = sqlx::query(&sql).bind(Json(Value::Object(update.clone())));
        let row = bind_filter(query, filter).fetch_one(&self.pool).await?;
        let matched: i64 = row.try_get("matched")?;
        let modified: i64 = row.try_get("modified")?;

        if matched > 0 {
            return Ok(UpdateResult::matched(modified > 0));
        }
        if !upsert {
            return Ok(UpdateResult::missed());
        }

        let (seed_id, mut body) = filter.seed();
        let id = seed_id.unwrap_or_default();
        record::apply_set(&mut body, &update);
        let sql = format!(
            "INSERT INTO {table} (id, body) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING"
        );
        let inserted = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Json(Value::Object(body)))
            .execute(&self.pool)
            .await?
            .rows_affected();

        debug!("Upserted {} into {} (inserted={})", id, collection, inserted);
        if inserted == 0 {
            // A concurrent writer created the same id between the two statements.
            return Ok(UpdateResult::missed());
        }
        Ok(UpdateResult::upserted(id))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let table = table(collection);
        let sql = format!(
            "DELETE FROM {table} WHERE id = (
                SELECT id FROM {table} WHERE {cond} ORDER BY created_at, id LIMIT 1
            )",
            cond = condition(filter, 1)
        );
        let deleted = bind_filter(sqlx::query(&sql), filter)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(DeleteResult::new(deleted))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_follow_filter_kind() {
        assert_eq!(condition(&Filter::All, 1), "TRUE");
        assert_eq!(condition(&Filter::id(RecordId::new()), 2), "id = $2");
        assert_eq!(condition(&Filter::field("email", "a@b.com"), 1), "body @> $1");
    }

    #[test]
    fn tables_are_quoted_collection_names() {
        assert_eq!(table(Collection::Orders), "\"orders\"");
    }
}
