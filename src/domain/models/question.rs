//! Question/answer interaction log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// One logged question/answer exchange. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentQuestion {
    pub id: i64,
    pub user_id: UserId,
    pub question: String,
    pub answer: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub created_at: DateTime<Utc>,
}

/// An interaction about to be appended to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudentQuestion {
    pub user_id: UserId,
    pub question: String,
    pub answer: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub created_at: DateTime<Utc>,
}

impl NewStudentQuestion {
    pub fn new(user_id: UserId, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            user_id,
            question: question.into(),
            answer: answer.into(),
            tokens_in: 0,
            tokens_out: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_tokens(mut self, tokens_in: u32, tokens_out: u32) -> Self {
        self.tokens_in = tokens_in;
        self.tokens_out = tokens_out;
        self
    }

    pub fn recorded_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
