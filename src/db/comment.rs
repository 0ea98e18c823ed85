use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

const COLUMNS: &str = "id, build_id, user_id, parent_id, text, created_at, updated_at";

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::BuildComment>, sqlx::Error> {
    sqlx::query_as::<_, models::BuildComment>(&format!(
        "SELECT {COLUMNS} FROM build_comments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_build(
    pool: &PgPool,
    build_id: i32,
) -> Result<Vec<models::BuildCommentWithAuthor>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetching build comments", build_id);
    sqlx::query_as::<_, models::BuildCommentWithAuthor>(
        r#"
        SELECT c.id, c.build_id, c.user_id, u.name AS author_name, c.parent_id, c.text,
            c.created_at, c.updated_at
        FROM build_comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.build_id = $1
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .bind(build_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}

pub async fn insert(
    pool: &PgPool,
    comment: &models::BuildComment,
) -> Result<models::BuildComment, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new comment", build_id = comment.build_id);
    sqlx::query_as::<_, models::BuildComment>(&format!(
        r#"
        INSERT INTO build_comments (build_id, user_id, parent_id, text)
        VALUES ($1, $2, $3, $4)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(comment.build_id)
    .bind(comment.user_id)
    .bind(comment.parent_id)
    .bind(&comment.text)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn update_text(
    pool: &PgPool,
    id: i32,
    text: &str,
) -> Result<models::BuildComment, sqlx::Error> {
    sqlx::query_as::<_, models::BuildComment>(&format!(
        "UPDATE build_comments SET text = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(text)
    .fetch_one(pool)
    .await
}

/// Replies go with their parent through the cascading foreign key.
pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let query_span = tracing::info_span!("Deleting comment", comment_id = id);
    sqlx::query("DELETE FROM build_comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
}
