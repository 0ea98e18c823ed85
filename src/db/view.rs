use sqlx::PgPool;

pub async fn insert(
    pool: &PgPool,
    build_id: i32,
    user_id: Option<i32>,
    viewer_key: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO build_views (build_id, user_id, viewer_key) VALUES ($1, $2, $3)")
        .bind(build_id)
        .bind(user_id)
        .bind(viewer_key)
        .execute(pool)
        .await
        .map(|_| ())
}
