use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct Build {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Build row joined with its aggregates, as used by listings and the detail view.
#[derive(Debug, Clone, Serialize, Default, sqlx::FromRow)]
pub struct BuildSummary {
    pub id: i32,
    pub user_id: i32,
    pub author_name: String,
    pub title: String,
    pub description: Option<String>,
    pub average_rating: f64,
    pub ratings_count: i64,
    pub views_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct BuildComment {
    pub id: i32,
    pub build_id: i32,
    pub user_id: i32,
    pub parent_id: Option<i32>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BuildComment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct BuildView {
    pub id: i32,
    pub build_id: i32,
    pub user_id: Option<i32>,
    pub viewer_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Default, sqlx::FromRow)]
pub struct BuildCommentWithAuthor {
    pub id: i32,
    pub build_id: i32,
    pub user_id: i32,
    pub author_name: String,
    pub parent_id: Option<i32>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
