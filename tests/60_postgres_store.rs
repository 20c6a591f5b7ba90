//! Store contract against a real PostgreSQL. Runs only when DATABASE_URL is set.

use anyhow::Result;
use serde_json::{json, Value};
use uuid::Uuid;

use watch_hut_api::config::{DatabaseConfig, StoreBackend};
use watch_hut_api::database::{
    Collection, Document, DocumentStore, Filter, PgDocumentStore, RecordId, ID_FIELD,
};

async fn connect() -> Result<Option<PgDocumentStore>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL store tests");
        return Ok(None);
    };

    let store = PgDocumentStore::connect(&DatabaseConfig {
        backend: StoreBackend::Postgres,
        url: Some(url),
        max_connections: 2,
        connection_timeout: 10,
    })
    .await?;
    store.ensure_collections().await?;
    Ok(Some(store))
}

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

/// Unique per run so repeated runs against one database do not collide.
fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4())
}

#[tokio::test]
async fn upsert_by_email_keeps_one_record() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let email = unique_email("signin");
    let filter = Filter::field("email", email.clone());

    let first = store
        .update_one(
            Collection::Users,
            &filter,
            doc(json!({ "email": email, "displayName": "G" })),
            true,
        )
        .await?;
    assert_eq!(first.upserted_count, 1);
    assert_eq!(first.matched_count, 0);
    assert!(first.upserted_id.is_some());

    let second = store
        .update_one(
            Collection::Users,
            &filter,
            doc(json!({ "email": email, "displayName": "Gee" })),
            true,
        )
        .await?;
    assert_eq!(second.matched_count, 1);
    assert_eq!(second.modified_count, 1);
    assert_eq!(second.upserted_count, 0);

    // Same values again: matched, nothing modified
    let same = store
        .update_one(
            Collection::Users,
            &filter,
            doc(json!({ "email": email, "displayName": "Gee" })),
            true,
        )
        .await?;
    assert_eq!(same.matched_count, 1);
    assert_eq!(same.modified_count, 0);

    let users = store.find_all(Collection::Users, &filter).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["displayName"], "Gee");
    assert_eq!(users[0][ID_FIELD], json!(first.upserted_id.map(|id| id.to_string())));

    store.delete_one(Collection::Users, &filter).await?;
    Ok(())
}

#[tokio::test]
async fn update_without_upsert_misses() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let filter = Filter::field("email", unique_email("ghost"));

    let result = store
        .update_one(Collection::Users, &filter, doc(json!({ "role": "admin" })), false)
        .await?;
    assert_eq!(result.matched_count, 0);
    assert_eq!(result.upserted_count, 0);
    assert!(store.find_one(Collection::Users, &filter).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn status_upsert_by_id_creates_bare_order() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let id = RecordId::new();
    let filter = Filter::id(id);

    let result = store
        .update_one(Collection::Orders, &filter, doc(json!({ "status": "shipped" })), true)
        .await?;
    assert_eq!(result.upserted_id, Some(id));

    let order = store.find_one(Collection::Orders, &filter).await?;
    assert_eq!(
        order.map(Value::Object),
        Some(json!({ "_id": id.to_string(), "status": "shipped" }))
    );

    // A null status still counts as a change
    let result = store
        .update_one(Collection::Orders, &filter, doc(json!({ "status": null })), true)
        .await?;
    assert_eq!(result.matched_count, 1);
    assert_eq!(result.modified_count, 1);

    store.delete_one(Collection::Orders, &filter).await?;
    Ok(())
}

#[tokio::test]
async fn insert_merge_and_delete_round_trip() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };

    let inserted = store
        .insert_one(
            Collection::Watches,
            doc(json!({ "_id": "client-id", "name": "Seamaster", "price": 4200 })),
        )
        .await?;
    let filter = Filter::id(inserted.inserted_id);

    let watch = store
        .find_one(Collection::Watches, &filter)
        .await?
        .expect("inserted watch");
    assert_eq!(watch[ID_FIELD], json!(inserted.inserted_id.to_string()));
    assert_eq!(watch["name"], "Seamaster");

    // $set only touches the named keys
    let result = store
        .update_one(Collection::Watches, &filter, doc(json!({ "price": 3900 })), false)
        .await?;
    assert_eq!(result.modified_count, 1);
    let watch = store
        .find_one(Collection::Watches, &filter)
        .await?
        .expect("updated watch");
    assert_eq!(watch["price"], 3900);
    assert_eq!(watch["name"], "Seamaster");

    let deleted = store.delete_one(Collection::Watches, &filter).await?;
    assert_eq!(deleted.deleted_count, 1);
    assert!(store.find_one(Collection::Watches, &filter).await?.is_none());

    let deleted = store.delete_one(Collection::Watches, &filter).await?;
    assert_eq!(deleted.deleted_count, 0);

    assert!(store.ping().await.is_ok());
    store.close().await;
    Ok(())
}
