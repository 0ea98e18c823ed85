use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct BuildRating {
    pub id: i32,
    pub build_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Default, sqlx::FromRow)]
pub struct RatingAggregate {
    pub average: f64,
    pub count: i64,
}
