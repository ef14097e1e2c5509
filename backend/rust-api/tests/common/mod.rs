use axum::body::{to_bytes, Body};
use axum::response::Response;
use axum::Router;
use mongodb::bson::doc;
use std::sync::Arc;

use daily_trivia_api::{config::Config, create_router, services::AppState};

/// Number of questions seeded into the test pool.
pub const POOL_SIZE: usize = 20;

pub async fn create_test_app() -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    // Load test environment from .env.test
    dotenvy::from_filename(".env.test").ok();

    let config = Config::load().expect("Failed to load test configuration");

    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri)
        .await
        .expect("Failed to connect to test MongoDB");

    seed_questions(&mongo_client, &config.mongo_database).await;

    let app_state = Arc::new(
        AppState::new(config, mongo_client)
            .await
            .expect("Failed to initialize test app state"),
    );

    create_router(app_state)
}

/// Direct handle to the test database for assertions that look behind the API.
pub async fn test_database() -> mongodb::Database {
    dotenvy::from_filename(".env.test").ok();
    let config = Config::load().expect("Failed to load test configuration");
    let client = mongodb::Client::with_uri_str(&config.mongo_uri)
        .await
        .expect("Failed to connect to test MongoDB");
    client.database(&config.mongo_database)
}

/// Seeds a fixed pool of questions "test-q1".."test-q20" whose answers
/// follow the pattern "Answer {n}", so tests can derive the correct answer
/// from a question id.
pub fn expected_answer(question_id: &str) -> String {
    let n = question_id
        .strip_prefix("test-q")
        .expect("unexpected test question id");
    format!("Answer {}", n)
}

async fn seed_questions(mongo_client: &mongodb::Client, db_name: &str) {
    let db = mongo_client.database(db_name);
    let questions = db.collection::<mongodb::bson::Document>("questions");

    let categories = ["History", "Science", "Geography", "Sports", "Music"];
    let difficulties = ["easy", "medium", "hard"];

    for n in 1..=POOL_SIZE {
        let id = format!("test-q{}", n);

        let exists = questions
            .find_one(doc! { "_id": &id })
            .await
            .expect("Failed to query test questions");
        if exists.is_some() {
            continue;
        }

        let result = questions
            .insert_one(doc! {
                "_id": &id,
                "question": format!("Test question {}?", n),
                "category": categories[n % categories.len()],
                "difficulty": difficulties[n % difficulties.len()],
                "answer": format!("Answer {}", n),
            })
            .await;

        if let Err(e) = result {
            // Parallel test binaries may race on seeding; a duplicate key is fine.
            if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                ref we,
            )) = *e.kind
            {
                if we.code == 11000 {
                    continue;
                }
            }
            panic!("Failed to seed test question {}: {}", id, e);
        }
    }
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
