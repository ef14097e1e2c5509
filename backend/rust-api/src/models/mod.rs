use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod trivia;

pub use trivia::*;

/// A question from the pool. Immutable once seeded; the `answer` field must
/// never leave the backend except through a wrong-submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    pub question: String,
    pub category: String,
    pub difficulty: String,
    pub answer: String,
}

/// The fixed question set assigned to one calendar date. Created at most once
/// per `game_date` (unique index) and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyGame {
    #[serde(rename = "_id")]
    pub id: String,
    pub game_date: String,
    pub question_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One user's graded submission for one question on one date.
/// Unique index on (user_id, question_id, game_date) makes a repeat
/// submission a store-level conflict rather than a silent overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnswer {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub question_id: String,
    pub game_date: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}
