use crate::forms::{ComponentFilter, Pagination};
use crate::models;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;

const COLUMNS: &str = "id, name, link, price, image, category, created_at, updated_at";

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::Component>, sqlx::Error> {
    sqlx::query_as::<_, models::Component>(&format!(
        "SELECT {COLUMNS} FROM components WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Components with the given ids. Unknown ids are silently missing from the result.
pub async fn fetch_many(pool: &PgPool, ids: &[i32]) -> Result<Vec<models::Component>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetching components by ids", count = ids.len());
    sqlx::query_as::<_, models::Component>(&format!(
        "SELECT {COLUMNS} FROM components WHERE id = ANY($1) ORDER BY category, id"
    ))
    .bind(ids)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &ComponentFilter) {
    builder.push(" WHERE TRUE");
    if let Some(category) = filter.category {
        builder.push(" AND category = ").push_bind(category);
    }
    if let Some(min_price) = filter.min_price {
        builder.push(" AND price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        builder.push(" AND price <= ").push_bind(max_price);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        builder
            .push(" AND name ILIKE ")
            .push_bind(super::like_pattern(search));
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &ComponentFilter,
    pagination: &Pagination,
) -> Result<(Vec<models::Component>, i64), sqlx::Error> {
    let query_span = tracing::info_span!("Listing components");

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM components");
    push_filter(&mut count, filter);
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .instrument(query_span.clone())
        .await?;

    let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM components"));
    push_filter(&mut select, filter);
    select
        .push(" ORDER BY ")
        .push(filter.sort.unwrap_or_default().order_by())
        .push(" LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let list = select
        .build_query_as::<models::Component>()
        .fetch_all(pool)
        .instrument(query_span)
        .await?;

    Ok((list, total))
}

pub async fn category_counts(pool: &PgPool) -> Result<Vec<models::CategoryCount>, sqlx::Error> {
    sqlx::query_as::<_, models::CategoryCount>(
        "SELECT category, COUNT(*) AS count FROM components GROUP BY category ORDER BY category",
    )
    .fetch_all(pool)
    .await
}

pub async fn insert(
    pool: &PgPool,
    component: &models::Component,
) -> Result<models::Component, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new component");
    sqlx::query_as::<_, models::Component>(&format!(
        r#"
        INSERT INTO components (name, link, price, image, category)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&component.name)
    .bind(&component.link)
    .bind(component.price)
    .bind(&component.image)
    .bind(component.category)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn update(
    pool: &PgPool,
    component: &models::Component,
) -> Result<models::Component, sqlx::Error> {
    let query_span = tracing::info_span!("Updating component", component_id = component.id);
    sqlx::query_as::<_, models::Component>(&format!(
        r#"
        UPDATE components
        SET name = $2, link = $3, price = $4, image = $5, category = $6, updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(component.id)
    .bind(&component.name)
    .bind(&component.link)
    .bind(component.price)
    .bind(&component.image)
    .bind(component.category)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

/// Fails with a foreign key violation while a build still references the component.
pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let query_span = tracing::info_span!("Deleting component", component_id = id);
    sqlx::query("DELETE FROM components WHERE id = $1")
        .bind(id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
}

pub async fn is_in_use(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM build_components WHERE component_id = $1)",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Inserts a scraped component or refreshes the row with the same link.
pub async fn upsert_scraped(
    pool: &PgPool,
    component: &models::ScrapedComponent,
) -> Result<models::Component, sqlx::Error> {
    sqlx::query_as::<_, models::Component>(&format!(
        r#"
        INSERT INTO components (name, link, price, image, category)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (link) DO UPDATE
        SET name = EXCLUDED.name,
            price = EXCLUDED.price,
            image = COALESCE(EXCLUDED.image, components.image),
            category = EXCLUDED.category,
            updated_at = NOW()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&component.name)
    .bind(&component.link)
    .bind(component.price)
    .bind(&component.image)
    .bind(component.category)
    .fetch_one(pool)
    .await
}
