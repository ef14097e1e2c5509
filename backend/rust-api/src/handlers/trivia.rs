use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::TriviaError,
    extractors::AppJson,
    metrics::PROGRESS_RESETS_TOTAL,
    models::{
        DailyTriviaResponse, ProgressStatsResponse, QuestionSummary, QuestionWithProgress,
        ResetProgressRequest, ResetProgressResponse, SubmitAnswerRequest, SubmitAnswerResponse,
        UnlimitedBatchResponse, UserQuery,
    },
    services::{
        daily_game_service::{current_game_date, DailyGameService},
        AppState,
    },
};

fn validation_error(err: validator::ValidationErrors) -> TriviaError {
    TriviaError::Validation(err.to_string())
}

/// Today's game with the requesting user's progress merged in.
/// Creates the game on first request of the day.
pub async fn get_daily_trivia(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<DailyTriviaResponse>, TriviaError> {
    if query.user_id.trim().is_empty() {
        return Err(TriviaError::Validation(
            "user_id must not be empty".to_string(),
        ));
    }

    let date = current_game_date();
    tracing::info!("Fetching daily trivia: date={}, user={}", date, query.user_id);

    let service = DailyGameService::new(state.store.clone(), &state.config);
    let game = service.ensure_daily_game(&date).await?;
    let questions = service.load_questions(&game).await?;
    let progress = service.get_user_progress(&game, &query.user_id).await?;

    let questions = questions
        .into_iter()
        .map(|question| {
            let submission = progress.get(&question.id);
            QuestionWithProgress::merge(question, submission)
        })
        .collect();

    Ok(Json(DailyTriviaResponse { date, questions }))
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, TriviaError> {
    req.validate().map_err(validation_error)?;

    let date = current_game_date();
    tracing::info!(
        "Answer submission: date={}, user={}, question={}",
        date,
        req.user_id,
        req.question_id
    );

    let service = DailyGameService::new(state.store.clone(), &state.config);
    let response = service
        .submit_answer(&date, &req.question_id, &req.answer, &req.user_id)
        .await?;

    Ok(Json(response))
}

/// Clears the user's answers for today. A store failure is degraded to a
/// non-persisted success so the client can still reset its local view state.
pub async fn reset_progress(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ResetProgressRequest>,
) -> Result<Json<ResetProgressResponse>, TriviaError> {
    req.validate().map_err(validation_error)?;

    let date = current_game_date();
    let service = DailyGameService::new(state.store.clone(), &state.config);

    let outcome = service.reset_user_progress(&date, &req.user_id).await;
    reset_outcome(&req.user_id, outcome).map(Json)
}

/// Maps a reset result onto the wire response. A failed delete degrades to a
/// non-persisted success (the client clears local state only); every other
/// error propagates unchanged.
fn reset_outcome(
    user_id: &str,
    outcome: Result<u64, TriviaError>,
) -> Result<ResetProgressResponse, TriviaError> {
    match outcome {
        Ok(deleted) => {
            PROGRESS_RESETS_TOTAL.with_label_values(&["true"]).inc();
            Ok(ResetProgressResponse {
                deleted,
                persisted: true,
                warning: None,
            })
        }
        Err(TriviaError::ResetPartialFailure(err)) => {
            tracing::warn!(
                "Stored answers could not be cleared for user {}: {}",
                user_id,
                err
            );
            PROGRESS_RESETS_TOTAL.with_label_values(&["false"]).inc();
            Ok(ResetProgressResponse {
                deleted: 0,
                persisted: false,
                warning: Some(
                    "Stored answers could not be cleared; reset local progress only".to_string(),
                ),
            })
        }
        Err(err) => Err(err),
    }
}

pub async fn get_progress_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ProgressStatsResponse>, TriviaError> {
    if query.user_id.trim().is_empty() {
        return Err(TriviaError::Validation(
            "user_id must not be empty".to_string(),
        ));
    }

    let date = current_game_date();
    let service = DailyGameService::new(state.store.clone(), &state.config);

    let game = service.ensure_daily_game(&date).await?;
    let progress = service.get_user_progress(&game, &query.user_id).await?;

    let correct_count = progress.values().filter(|a| a.is_correct).count();

    Ok(Json(ProgressStatsResponse {
        answered_count: progress.len(),
        correct_count,
        total_questions: game.question_ids.len(),
        date,
    }))
}

/// A fresh random practice batch; nothing is persisted and repeats across
/// calls are expected.
pub async fn get_unlimited_batch(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UnlimitedBatchResponse>, TriviaError> {
    let service = DailyGameService::new(state.store.clone(), &state.config);
    let questions = service.fetch_unlimited_batch().await?;

    Ok(Json(UnlimitedBatchResponse {
        questions: questions.into_iter().map(QuestionSummary::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_reset_is_persisted() {
        let response = reset_outcome("user-1", Ok(3)).unwrap();
        assert_eq!(response.deleted, 3);
        assert!(response.persisted);
        assert!(response.warning.is_none());
    }

    #[test]
    fn failed_delete_degrades_to_local_only_reset() {
        let err = TriviaError::ResetPartialFailure(mongodb::error::Error::custom("delete failed"));
        let response = reset_outcome("user-1", Err(err)).unwrap();
        assert_eq!(response.deleted, 0);
        assert!(!response.persisted);
        assert!(response.warning.is_some());
    }

    #[test]
    fn other_errors_propagate_unchanged() {
        let outcome = reset_outcome("user-1", Err(TriviaError::GameNotFound));
        assert!(matches!(outcome, Err(TriviaError::GameNotFound)));
    }
}
