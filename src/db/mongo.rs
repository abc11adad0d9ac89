//! MongoDB client and collection wrapper
//!
//! Thin typed wrapper over the driver: connection with short selection
//! timeouts, schema-declared indexes, and the handful of query shapes the
//! activity pipeline needs (sorted window, equality-set, full scan, watch).

use bson::{doc, Document};
use futures_util::StreamExt;
use mongodb::change_stream::event::ChangeStreamEvent;
use mongodb::change_stream::ChangeStream;
use mongodb::options::{FullDocumentType, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::types::{Result, VantageError};

/// Trait for schemas that declare their own index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify with a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // serverSelectionTimeoutMS keeps startup from hanging on an unreachable instance
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| VantageError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| VantageError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection with its indexes applied
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes,
{
    /// Create a new collection handle and apply schema indexes
    pub async fn new(client: &Client, db_name: &str, collection_name: &str) -> Result<Self> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<()> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| VantageError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Find many documents by filter
    pub async fn find_many(&self, filter: Document) -> Result<Vec<T>> {
        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(|e| VantageError::Database(format!("Find failed: {}", e)))?;

        Ok(collect_cursor(cursor).await)
    }

    /// Find documents sorted and truncated, e.g. the most recent N by time
    pub async fn find_sorted(&self, filter: Document, sort: Document, limit: i64) -> Result<Vec<T>> {
        let cursor = self
            .inner
            .find(filter)
            .sort(sort)
            .limit(limit)
            .await
            .map_err(|e| VantageError::Database(format!("Sorted find failed: {}", e)))?;

        Ok(collect_cursor(cursor).await)
    }

    /// Full collection scan, no filter and no projection
    pub async fn scan_all(&self) -> Result<Vec<T>> {
        self.find_many(doc! {}).await
    }

    /// Open a change stream over this collection
    ///
    /// `pipeline` narrows which events are delivered; full documents are
    /// looked up on updates so filters on `fullDocument.*` work.
    pub async fn watch(
        &self,
        pipeline: Vec<Document>,
    ) -> Result<ChangeStream<ChangeStreamEvent<T>>> {
        self.inner
            .watch()
            .pipeline(pipeline)
            .full_document(FullDocumentType::UpdateLookup)
            .await
            .map_err(|e| VantageError::Database(format!("Change stream failed to open: {}", e)))
    }

    /// Get the underlying collection for advanced operations
    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }
}

/// Drain a cursor, logging and skipping documents that fail to decode
async fn collect_cursor<T>(cursor: mongodb::Cursor<T>) -> Vec<T>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    cursor
        .filter_map(|doc| async {
            match doc {
                Ok(d) => Some(d),
                Err(e) => {
                    error!("Error reading document: {}", e);
                    None
                }
            }
        })
        .collect()
        .await
}
