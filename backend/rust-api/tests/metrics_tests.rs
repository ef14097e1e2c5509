mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use daily_trivia_api::metrics::ANSWERS_SUBMITTED_TOTAL;

fn submissions_counted() -> u64 {
    ANSWERS_SUBMITTED_TOTAL.with_label_values(&["true"]).get()
        + ANSWERS_SUBMITTED_TOTAL.with_label_values(&["false"]).get()
}

// Kept as the only test in this binary: the counters are process-global and
// other tests submitting answers in parallel would skew the deltas.
#[tokio::test]
async fn test_rejected_duplicate_submission_is_not_counted() {
    let app = common::create_test_app().await;
    let user_id = format!("test-user-{}", Uuid::new_v4());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/trivia/daily?user_id={}", user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let daily = common::json_body(response).await;
    let question_id = daily["questions"][0]["id"].as_str().unwrap().to_string();

    let submit = |answer: &str| {
        let app = app.clone();
        let body = json!({
            "user_id": user_id,
            "question_id": question_id,
            "answer": answer
        });
        async move {
            app.oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/trivia/daily/answers")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    let before = submissions_counted();

    let first = submit("first attempt").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(submissions_counted(), before + 1);

    let second = submit("second attempt").await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(submissions_counted(), before + 1);
}
