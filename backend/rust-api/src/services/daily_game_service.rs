//! Daily game lifecycle: idempotent per-date creation of the question set,
//! grading and recording of submissions, per-user progress and reset, and
//! the ephemeral unlimited practice batch.

use std::collections::HashMap;

use chrono::Utc;
use mongodb::bson::doc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::TriviaError;
use crate::metrics::{ANSWERS_SUBMITTED_TOTAL, DAILY_GAMES_CREATED_TOTAL};
use crate::models::{DailyGame, Question, SubmitAnswerResponse, UserAnswer};
use crate::services::grading;
use crate::store::{self, RecordStore, DAILY_GAMES, QUESTIONS, USER_ANSWERS};

pub struct DailyGameService {
    store: RecordStore,
    daily_game_size: usize,
    unlimited_batch_size: usize,
}

/// Game dates are UTC calendar dates, matching the format stored on
/// `DailyGame.game_date`.
pub fn current_game_date() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

impl DailyGameService {
    pub fn new(store: RecordStore, config: &Config) -> Self {
        Self {
            store,
            daily_game_size: config.daily_game_size,
            unlimited_batch_size: config.unlimited_batch_size,
        }
    }

    /// Returns the game for `date`, creating it when absent.
    ///
    /// Creation is idempotent under concurrent first-callers: the unique
    /// index on `game_date` turns the losing insert into a duplicate-key
    /// error, and the loser re-reads the winner's record. A plain
    /// read-then-write would leave a TOCTOU gap here.
    pub async fn ensure_daily_game(&self, date: &str) -> Result<DailyGame, TriviaError> {
        if let Some(game) = self
            .store
            .find_one::<DailyGame>(DAILY_GAMES, doc! { "game_date": date })
            .await?
        {
            return Ok(game);
        }

        let sampled: Vec<Question> = self
            .store
            .sample(QUESTIONS, doc! {}, self.daily_game_size)
            .await?;
        if sampled.len() < self.daily_game_size {
            tracing::error!(
                "Question pool has {} questions, need {} for a daily game",
                sampled.len(),
                self.daily_game_size
            );
            return Err(TriviaError::PoolTooSmall);
        }

        let game = DailyGame {
            id: Uuid::new_v4().to_string(),
            game_date: date.to_string(),
            question_ids: sampled.into_iter().map(|q| q.id).collect(),
            created_at: Utc::now(),
        };

        match self.store.insert_one(DAILY_GAMES, &game).await {
            Ok(()) => {
                DAILY_GAMES_CREATED_TOTAL.inc();
                tracing::info!(
                    "Created daily game for {} with {} questions",
                    date,
                    game.question_ids.len()
                );
                Ok(game)
            }
            Err(err) if store::is_duplicate_key_error(&err) => {
                tracing::info!("Lost creation race for {}, reusing existing game", date);
                self.store
                    .find_one::<DailyGame>(DAILY_GAMES, doc! { "game_date": date })
                    .await?
                    .ok_or(TriviaError::GameNotFound)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Loads the full question records for a game, in the game's order.
    pub async fn load_questions(&self, game: &DailyGame) -> Result<Vec<Question>, TriviaError> {
        let records: Vec<Question> = self
            .store
            .find_many(
                QUESTIONS,
                doc! { "_id": { "$in": game.question_ids.clone() } },
            )
            .await?;

        let mut by_id: HashMap<String, Question> = records
            .into_iter()
            .map(|question| (question.id.clone(), question))
            .collect();

        let mut ordered = Vec::with_capacity(game.question_ids.len());
        for id in &game.question_ids {
            match by_id.remove(id) {
                Some(question) => ordered.push(question),
                // A game referencing a missing question means the pool was
                // mutated after creation; surface it instead of serving a
                // partial set.
                None => return Err(TriviaError::QuestionNotFound(id.clone())),
            }
        }
        Ok(ordered)
    }

    /// Prior submissions for this user, restricted to the game's questions.
    pub async fn get_user_progress(
        &self,
        game: &DailyGame,
        user_id: &str,
    ) -> Result<HashMap<String, UserAnswer>, TriviaError> {
        let answers: Vec<UserAnswer> = self
            .store
            .find_many(
                USER_ANSWERS,
                doc! {
                    "user_id": user_id,
                    "question_id": { "$in": game.question_ids.clone() },
                },
            )
            .await?;

        Ok(answers
            .into_iter()
            .map(|answer| (answer.question_id.clone(), answer))
            .collect())
    }

    /// Grades a submission against the stored answer and records it.
    /// The correct answer is revealed only on a wrong submission.
    pub async fn submit_answer(
        &self,
        date: &str,
        question_id: &str,
        submitted: &str,
        user_id: &str,
    ) -> Result<SubmitAnswerResponse, TriviaError> {
        let game = self.ensure_daily_game(date).await?;
        if !game.question_ids.iter().any(|id| id == question_id) {
            return Err(TriviaError::QuestionNotInGame(question_id.to_string()));
        }

        let question: Question = self
            .store
            .find_one(QUESTIONS, doc! { "_id": question_id })
            .await?
            .ok_or_else(|| TriviaError::QuestionNotFound(question_id.to_string()))?;

        let is_correct = grading::grade(submitted, &question.answer);

        let record = UserAnswer {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            game_date: date.to_string(),
            user_answer: submitted.trim().to_string(),
            is_correct,
            submitted_at: Utc::now(),
        };

        if let Err(err) = self.store.insert_one(USER_ANSWERS, &record).await {
            if store::is_duplicate_key_error(&err) {
                return Err(TriviaError::AlreadyAnswered);
            }
            return Err(err.into());
        }

        // Only submissions that were actually recorded are counted; a
        // rejected duplicate does not move the metric.
        ANSWERS_SUBMITTED_TOTAL
            .with_label_values(&[if is_correct { "true" } else { "false" }])
            .inc();

        tracing::info!(
            "Answer recorded: user={}, question={}, correct={}",
            user_id,
            question_id,
            is_correct
        );

        Ok(SubmitAnswerResponse {
            is_correct,
            correct_answer: if is_correct {
                None
            } else {
                Some(question.answer)
            },
        })
    }

    /// Deletes this user's answers for the day, scoped to the game's actual
    /// question id set rather than a timestamp window. Returns the number of
    /// records removed. A failed delete is reported as `ResetPartialFailure`
    /// so the caller can degrade to a local-only reset.
    pub async fn reset_user_progress(
        &self,
        date: &str,
        user_id: &str,
    ) -> Result<u64, TriviaError> {
        let game = self
            .store
            .find_one::<DailyGame>(DAILY_GAMES, doc! { "game_date": date })
            .await?
            .ok_or(TriviaError::GameNotFound)?;

        let deleted = self
            .store
            .delete_many(
                USER_ANSWERS,
                doc! {
                    "user_id": user_id,
                    "question_id": { "$in": game.question_ids.clone() },
                },
            )
            .await
            .map_err(TriviaError::ResetPartialFailure)?;

        tracing::info!("Reset progress: user={}, deleted={}", user_id, deleted);
        Ok(deleted)
    }

    /// An ephemeral practice batch: random questions, never persisted.
    /// Each call samples independently, so repeats across batches happen.
    pub async fn fetch_unlimited_batch(&self) -> Result<Vec<Question>, TriviaError> {
        let questions: Vec<Question> = self
            .store
            .sample(QUESTIONS, doc! {}, self.unlimited_batch_size)
            .await?;
        if questions.is_empty() {
            return Err(TriviaError::PoolTooSmall);
        }
        Ok(questions)
    }
}
