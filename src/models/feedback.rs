use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackType {
    Bug,
    Suggestion,
    Complaint,
    #[default]
    Other,
}

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackStatus {
    #[default]
    New,
    InReview,
    Resolved,
    Rejected,
}

impl FeedbackStatus {
    /// Resolved and rejected tickets are frozen for their author.
    pub fn is_final(&self) -> bool {
        matches!(self, FeedbackStatus::Resolved | FeedbackStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::New => "NEW",
            FeedbackStatus::InReview => "IN_REVIEW",
            FeedbackStatus::Resolved => "RESOLVED",
            FeedbackStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct Feedback {
    pub id: i32,
    pub user_id: i32,
    pub feedback_type: FeedbackType,
    pub status: FeedbackStatus,
    pub rating: i32,
    pub text: String,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Default, sqlx::FromRow)]
pub struct FeedbackStats {
    pub total: i64,
    pub new: i64,
    pub in_review: i64,
    pub resolved: i64,
    pub rejected: i64,
    pub average_rating: f64,
}
