use crate::config::Config;
use crate::store::RecordStore;
use mongodb::Client as MongoClient;

pub mod daily_game_service;
pub mod grading;

pub struct AppState {
    pub config: Config,
    pub store: RecordStore,
}

impl AppState {
    pub async fn new(config: Config, mongo_client: MongoClient) -> anyhow::Result<Self> {
        let store = RecordStore::new(mongo_client.database(&config.mongo_database));

        tracing::info!("Checking MongoDB connection...");
        tokio::time::timeout(std::time::Duration::from_secs(5), store.ping())
            .await
            .map_err(|_| anyhow::anyhow!("MongoDB ping timeout after 5s"))??;

        store.ensure_indexes().await?;

        tracing::info!("MongoDB connection established");

        Ok(Self { config, store })
    }
}
