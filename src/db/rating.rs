use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

const COLUMNS: &str = "id, build_id, user_id, rating, created_at, updated_at";

pub async fn fetch_by_build_and_user(
    pool: &PgPool,
    build_id: i32,
    user_id: i32,
) -> Result<Option<models::BuildRating>, sqlx::Error> {
    let query_span = tracing::info_span!("Search for existing vote", build_id, user_id);
    sqlx::query_as::<_, models::BuildRating>(&format!(
        "SELECT {COLUMNS} FROM build_ratings WHERE build_id = $1 AND user_id = $2"
    ))
    .bind(build_id)
    .bind(user_id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
}

pub async fn insert(
    pool: &PgPool,
    build_id: i32,
    user_id: i32,
    rating: i32,
) -> Result<models::BuildRating, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new rating", build_id, user_id);
    sqlx::query_as::<_, models::BuildRating>(&format!(
        "INSERT INTO build_ratings (build_id, user_id, rating) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
    ))
    .bind(build_id)
    .bind(user_id)
    .bind(rating)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn update(
    pool: &PgPool,
    build_id: i32,
    user_id: i32,
    rating: i32,
) -> Result<Option<models::BuildRating>, sqlx::Error> {
    let query_span = tracing::info_span!("Updating rating", build_id, user_id);
    sqlx::query_as::<_, models::BuildRating>(&format!(
        r#"
        UPDATE build_ratings SET rating = $3, updated_at = NOW()
        WHERE build_id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(build_id)
    .bind(user_id)
    .bind(rating)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
}

pub async fn delete(pool: &PgPool, build_id: i32, user_id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query("DELETE FROM build_ratings WHERE build_id = $1 AND user_id = $2")
        .bind(build_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map(|result| result.rows_affected() > 0)
}

pub async fn aggregate(pool: &PgPool, build_id: i32) -> Result<models::RatingAggregate, sqlx::Error> {
    sqlx::query_as::<_, models::RatingAggregate>(
        "SELECT COALESCE(AVG(rating)::float8, 0) AS average, COUNT(*) AS count FROM build_ratings WHERE build_id = $1",
    )
    .bind(build_id)
    .fetch_one(pool)
    .await
}
