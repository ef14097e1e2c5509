use serde::Deserialize;
use std::env;

const DEFAULT_DAILY_GAME_SIZE: usize = 9;
const DEFAULT_UNLIMITED_BATCH_SIZE: usize = 12;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub daily_game_size: usize,
    pub unlimited_batch_size: usize,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            // Load base config from TOML file, allow missing (fallback to ENV)
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "daily_trivia".to_string());

        let daily_game_size = settings
            .get_int("trivia.daily_game_size")
            .ok()
            .map(|v| v as usize)
            .or_else(|| parse_env_usize("DAILY_GAME_SIZE"))
            .unwrap_or(DEFAULT_DAILY_GAME_SIZE);

        let unlimited_batch_size = settings
            .get_int("trivia.unlimited_batch_size")
            .ok()
            .map(|v| v as usize)
            .or_else(|| parse_env_usize("UNLIMITED_BATCH_SIZE"))
            .unwrap_or(DEFAULT_UNLIMITED_BATCH_SIZE);

        Ok(Config {
            mongo_uri,
            mongo_database,
            daily_game_size,
            unlimited_batch_size,
        })
    }
}

fn parse_env_usize(name: &str) -> Option<usize> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}
