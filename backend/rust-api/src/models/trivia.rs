use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Question, UserAnswer};

/// Public view of a question: everything except the stored answer.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSummary {
    pub id: String,
    pub question: String,
    pub category: String,
    pub difficulty: String,
}

impl From<Question> for QuestionSummary {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            question: question.question,
            category: question.category,
            difficulty: question.difficulty,
        }
    }
}

/// A question merged with the requesting user's progress for the day.
#[derive(Debug, Serialize)]
pub struct QuestionWithProgress {
    #[serde(flatten)]
    pub question: QuestionSummary,
    pub is_answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl QuestionWithProgress {
    pub fn merge(question: Question, submission: Option<&UserAnswer>) -> Self {
        match submission {
            Some(answer) => Self {
                question: question.into(),
                is_answered: true,
                user_answer: Some(answer.user_answer.clone()),
                is_correct: Some(answer.is_correct),
            },
            None => Self {
                question: question.into(),
                is_answered: false,
                user_answer: None,
                is_correct: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct DailyTriviaResponse {
    pub date: String,
    pub questions: Vec<QuestionWithProgress>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub question_id: String,
    #[validate(length(min = 1, max = 512, message = "answer must be 1..=512 characters"))]
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    /// Revealed only when the submission was wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetProgressRequest {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResetProgressResponse {
    pub deleted: u64,
    /// False when the store delete failed and the client should fall back to
    /// clearing its local view state only.
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UnlimitedBatchResponse {
    pub questions: Vec<QuestionSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProgressStatsResponse {
    pub answered_count: usize,
    pub correct_count: usize,
    pub total_questions: usize,
    pub date: String,
}
