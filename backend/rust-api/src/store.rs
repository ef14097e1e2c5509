//! Thin typed wrapper over the MongoDB record store.
//!
//! The trivia core only needs four operations: find one record, insert one,
//! delete many, and sample N at random without replacement. Records are
//! (de)serialized through their explicit schemas, so a shape mismatch fails
//! the call instead of propagating untyped data.

use std::time::Instant;

use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Database, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::metrics::observe_db_operation;

pub const QUESTIONS: &str = "questions";
pub const DAILY_GAMES: &str = "daily_games";
pub const USER_ANSWERS: &str = "user_answers";

#[derive(Clone)]
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates the unique indexes the core relies on for idempotency:
    /// one daily game per date, one answer per (user, question, date).
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let daily_games = self.db.collection::<Document>(DAILY_GAMES);
        daily_games
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "game_date": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        let user_answers = self.db.collection::<Document>(USER_ANSWERS);
        user_answers
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "question_id": 1, "game_date": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        tracing::info!("Record store indexes ensured");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.db.run_command(doc! { "ping": 1 }).await.map(|_| ())
    }

    pub async fn find_one<T>(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<T>, mongodb::error::Error>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let start = Instant::now();
        let result = self.db.collection::<T>(collection).find_one(filter).await;
        observe_db_operation("find_one", collection, start, result.is_ok());
        result
    }

    pub async fn find_many<T>(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Vec<T>, mongodb::error::Error>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let start = Instant::now();
        let result = async {
            let mut cursor = self.db.collection::<T>(collection).find(filter).await?;
            let mut records = Vec::new();
            while let Some(record) = cursor.try_next().await? {
                records.push(record);
            }
            Ok(records)
        }
        .await;
        observe_db_operation("find_many", collection, start, result.is_ok());
        result
    }

    pub async fn insert_one<T>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<(), mongodb::error::Error>
    where
        T: Serialize + Send + Sync,
    {
        let start = Instant::now();
        let result = self
            .db
            .collection::<T>(collection)
            .insert_one(record)
            .await
            .map(|_| ());
        observe_db_operation("insert_one", collection, start, result.is_ok());
        result
    }

    pub async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, mongodb::error::Error> {
        let start = Instant::now();
        let result = self
            .db
            .collection::<Document>(collection)
            .delete_many(filter)
            .await
            .map(|outcome| outcome.deleted_count);
        observe_db_operation("delete_many", collection, start, result.is_ok());
        result
    }

    /// Samples up to `limit` records at random, without replacement within
    /// this call. Repeats across calls are expected and allowed.
    pub async fn sample<T>(
        &self,
        collection: &str,
        filter: Document,
        limit: usize,
    ) -> Result<Vec<T>, mongodb::error::Error>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let mut pipeline = Vec::new();
        if !filter.is_empty() {
            pipeline.push(doc! { "$match": filter });
        }
        pipeline.push(doc! { "$sample": { "size": limit as i64 } });

        let start = Instant::now();
        let result = async {
            let mut cursor = self
                .db
                .collection::<Document>(collection)
                .aggregate(pipeline)
                .with_type::<T>()
                .await?;
            let mut records = Vec::new();
            while let Some(record) = cursor.try_next().await? {
                records.push(record);
            }
            Ok(records)
        }
        .await;
        observe_db_operation("sample", collection, start, result.is_ok());
        result
    }
}

/// MongoDB reports a violated unique index as write error code 11000.
/// Both creation races in the core (daily game per date, answer per
/// user/question/date) funnel through this check.
pub fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(ref write)) =
        *err.kind
    {
        return write.code == 11000;
    }
    false
}
