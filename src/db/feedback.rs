use crate::forms::{FeedbackFilter, Pagination};
use crate::models;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;

const COLUMNS: &str =
    "id, user_id, feedback_type, status, rating, text, admin_response, created_at, updated_at";

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::Feedback>, sqlx::Error> {
    sqlx::query_as::<_, models::Feedback>(&format!("SELECT {COLUMNS} FROM feedback WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_user(
    pool: &PgPool,
    user_id: i32,
) -> Result<Option<models::Feedback>, sqlx::Error> {
    sqlx::query_as::<_, models::Feedback>(&format!(
        "SELECT {COLUMNS} FROM feedback WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(
    pool: &PgPool,
    feedback: &models::Feedback,
) -> Result<models::Feedback, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new feedback", user_id = feedback.user_id);
    sqlx::query_as::<_, models::Feedback>(&format!(
        r#"
        INSERT INTO feedback (user_id, feedback_type, status, rating, text)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(feedback.user_id)
    .bind(feedback.feedback_type)
    .bind(feedback.status)
    .bind(feedback.rating)
    .bind(&feedback.text)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn update(
    pool: &PgPool,
    feedback: &models::Feedback,
) -> Result<models::Feedback, sqlx::Error> {
    let query_span = tracing::info_span!("Updating feedback", feedback_id = feedback.id);
    sqlx::query_as::<_, models::Feedback>(&format!(
        r#"
        UPDATE feedback
        SET feedback_type = $2, status = $3, rating = $4, text = $5, admin_response = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(feedback.id)
    .bind(feedback.feedback_type)
    .bind(feedback.status)
    .bind(feedback.rating)
    .bind(&feedback.text)
    .bind(&feedback.admin_response)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn delete_by_user(pool: &PgPool, user_id: i32) -> Result<bool, sqlx::Error> {
    let query_span = tracing::info_span!("Deleting feedback", user_id);
    sqlx::query("DELETE FROM feedback WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &FeedbackFilter) {
    builder.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(feedback_type) = filter.feedback_type {
        builder.push(" AND feedback_type = ").push_bind(feedback_type);
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &FeedbackFilter,
    pagination: &Pagination,
) -> Result<(Vec<models::Feedback>, i64), sqlx::Error> {
    let query_span = tracing::info_span!("Listing feedback");

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM feedback");
    push_filter(&mut count, filter);
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .instrument(query_span.clone())
        .await?;

    let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM feedback"));
    push_filter(&mut select, filter);
    select
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let list = select
        .build_query_as::<models::Feedback>()
        .fetch_all(pool)
        .instrument(query_span)
        .await?;

    Ok((list, total))
}

pub async fn stats(pool: &PgPool) -> Result<models::FeedbackStats, sqlx::Error> {
    let query_span = tracing::info_span!("Computing feedback statistics");
    sqlx::query_as::<_, models::FeedbackStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = 'NEW') AS new,
            COUNT(*) FILTER (WHERE status = 'IN_REVIEW') AS in_review,
            COUNT(*) FILTER (WHERE status = 'RESOLVED') AS resolved,
            COUNT(*) FILTER (WHERE status = 'REJECTED') AS rejected,
            COALESCE(AVG(rating)::float8, 0) AS average_rating
        FROM feedback
        "#,
    )
    .fetch_one(pool)
    .instrument(query_span)
    .await
}
