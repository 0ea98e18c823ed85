use crate::forms::{BuildFilter, Pagination};
use crate::models;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;

const COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";

const SUMMARY_SELECT: &str = r#"
    SELECT b.id, b.user_id, u.name AS author_name, b.title, b.description,
        COALESCE((SELECT AVG(r.rating)::float8 FROM build_ratings r WHERE r.build_id = b.id), 0) AS average_rating,
        (SELECT COUNT(*) FROM build_ratings r WHERE r.build_id = b.id) AS ratings_count,
        (SELECT COUNT(*) FROM build_views v WHERE v.build_id = b.id) AS views_count,
        (SELECT COUNT(*) FROM build_comments c WHERE c.build_id = b.id) AS comments_count,
        b.created_at, b.updated_at
    FROM builds b
    JOIN users u ON u.id = b.user_id
"#;

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::Build>, sqlx::Error> {
    sqlx::query_as::<_, models::Build>(&format!("SELECT {COLUMNS} FROM builds WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_summary(
    pool: &PgPool,
    id: i32,
) -> Result<Option<models::BuildSummary>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetching build summary", build_id = id);
    sqlx::query_as::<_, models::BuildSummary>(&format!("{SUMMARY_SELECT} WHERE b.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &BuildFilter) {
    builder.push(" WHERE TRUE");
    if let Some(author_id) = filter.author_id {
        builder.push(" AND b.user_id = ").push_bind(author_id);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = super::like_pattern(search);
        builder
            .push(" AND (b.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &BuildFilter,
    pagination: &Pagination,
) -> Result<(Vec<models::BuildSummary>, i64), sqlx::Error> {
    let query_span = tracing::info_span!("Listing builds");

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM builds b");
    push_filter(&mut count, filter);
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .instrument(query_span.clone())
        .await?;

    let mut select = QueryBuilder::new(SUMMARY_SELECT);
    push_filter(&mut select, filter);
    select
        .push(" ORDER BY ")
        .push(filter.sort.unwrap_or_default().order_by())
        .push(" LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let list = select
        .build_query_as::<models::BuildSummary>()
        .fetch_all(pool)
        .instrument(query_span)
        .await?;

    Ok((list, total))
}

pub async fn components(
    pool: &PgPool,
    build_id: i32,
) -> Result<Vec<models::Component>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetching build components", build_id);
    sqlx::query_as::<_, models::Component>(
        r#"
        SELECT c.id, c.name, c.link, c.price, c.image, c.category, c.created_at, c.updated_at
        FROM components c
        JOIN build_components bc ON bc.component_id = c.id
        WHERE bc.build_id = $1
        ORDER BY c.category, c.id
        "#,
    )
    .bind(build_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}

async fn replace_components(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    build_id: i32,
    component_ids: &[i32],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM build_components WHERE build_id = $1")
        .bind(build_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        "INSERT INTO build_components (build_id, component_id) SELECT $1, UNNEST($2::int4[])",
    )
    .bind(build_id)
    .bind(component_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Saves the build and its component links in one transaction.
pub async fn insert(
    pool: &PgPool,
    build: &models::Build,
    component_ids: &[i32],
) -> Result<models::Build, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new build", user_id = build.user_id);
    let mut tx = pool.begin().await?;

    let saved = sqlx::query_as::<_, models::Build>(&format!(
        "INSERT INTO builds (user_id, title, description) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
    ))
    .bind(build.user_id)
    .bind(&build.title)
    .bind(&build.description)
    .fetch_one(&mut *tx)
    .instrument(query_span.clone())
    .await?;

    replace_components(&mut tx, saved.id, component_ids)
        .instrument(query_span)
        .await?;

    tx.commit().await?;
    Ok(saved)
}

pub async fn update(
    pool: &PgPool,
    build: &models::Build,
    component_ids: &[i32],
) -> Result<models::Build, sqlx::Error> {
    let query_span = tracing::info_span!("Updating build", build_id = build.id);
    let mut tx = pool.begin().await?;

    let saved = sqlx::query_as::<_, models::Build>(&format!(
        r#"
        UPDATE builds SET title = $2, description = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(build.id)
    .bind(&build.title)
    .bind(&build.description)
    .fetch_one(&mut *tx)
    .instrument(query_span.clone())
    .await?;

    replace_components(&mut tx, saved.id, component_ids)
        .instrument(query_span)
        .await?;

    tx.commit().await?;
    Ok(saved)
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let query_span = tracing::info_span!("Deleting build", build_id = id);
    sqlx::query("DELETE FROM builds WHERE id = $1")
        .bind(id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
}
