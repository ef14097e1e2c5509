mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mongodb::bson::doc;
use serial_test::serial;
use std::collections::HashSet;
use tower::ServiceExt;
use uuid::Uuid;

fn daily_uri(user_id: &str) -> String {
    format!("/api/v1/trivia/daily?user_id={}", user_id)
}

#[tokio::test]
async fn test_daily_game_creation_is_idempotent() {
    let app = common::create_test_app().await;
    let user_id = format!("test-user-{}", Uuid::new_v4());

    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(daily_uri(&user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = common::json_body(first).await;

    let second = app
        .oneshot(
            Request::builder()
                .uri(daily_uri(&user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second = common::json_body(second).await;

    let ids = |body: &serde_json::Value| -> Vec<String> {
        body["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["id"].as_str().unwrap().to_string())
            .collect()
    };

    let first_ids = ids(&first);
    let second_ids = ids(&second);

    assert_eq!(first_ids.len(), 9);
    assert_eq!(first_ids, second_ids);

    // Drawn without replacement from the seeded pool
    let distinct: HashSet<&String> = first_ids.iter().collect();
    assert_eq!(distinct.len(), first_ids.len());
    for id in &first_ids {
        assert!(id.starts_with("test-q"), "unexpected question id: {}", id);
    }
}

#[tokio::test]
#[serial]
async fn test_concurrent_requests_create_one_game() {
    let app = common::create_test_app().await;

    let requests = (0..4).map(|n| {
        let app = app.clone();
        let user_id = format!("race-user-{}-{}", n, Uuid::new_v4());
        async move {
            app.oneshot(
                Request::builder()
                    .uri(daily_uri(&user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    });

    let responses = futures::future::join_all(requests).await;

    let mut id_sets = Vec::new();
    for response in responses {
        assert_eq!(response.status(), StatusCode::OK);
        let body = common::json_body(response).await;
        let ids: Vec<String> = body["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["id"].as_str().unwrap().to_string())
            .collect();
        id_sets.push(ids);
    }

    // Every caller saw the same game
    for ids in &id_sets[1..] {
        assert_eq!(ids, &id_sets[0]);
    }

    // And exactly one record exists for today
    let db = common::test_database().await;
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let count = db
        .collection::<mongodb::bson::Document>("daily_games")
        .count_documents(doc! { "game_date": &today })
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_daily_questions_do_not_leak_answers() {
    let app = common::create_test_app().await;
    let user_id = format!("test-user-{}", Uuid::new_v4());

    let response = app
        .oneshot(
            Request::builder()
                .uri(daily_uri(&user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::json_body(response).await;
    for question in body["questions"].as_array().unwrap() {
        assert!(question.get("answer").is_none());
        assert_eq!(question["is_answered"], false);
        assert!(question["question"].as_str().is_some());
        assert!(question["category"].as_str().is_some());
    }
}

#[tokio::test]
async fn test_missing_user_id_is_rejected() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/trivia/daily")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
