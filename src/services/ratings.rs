use crate::db;
use crate::models::{BuildRating, User};
use crate::services::{builds, ServiceError};
use crate::views::rating::Summary;
use sqlx::PgPool;

pub async fn summary(
    pool: &PgPool,
    build_id: i32,
    user: Option<&User>,
) -> Result<Summary, ServiceError> {
    builds::fetch(pool, build_id).await?;
    let aggregate = db::rating::aggregate(pool, build_id).await?;
    let my_rating = match user {
        Some(user) => db::rating::fetch_by_build_and_user(pool, build_id, user.id)
            .await?
            .map(|rating| rating.rating),
        None => None,
    };

    Ok(Summary {
        build_id,
        average: aggregate.average,
        count: aggregate.count,
        my_rating,
    })
}

pub async fn create(
    pool: &PgPool,
    user: &User,
    build_id: i32,
    rating: i32,
) -> Result<BuildRating, ServiceError> {
    builds::fetch(pool, build_id).await?;
    if db::rating::fetch_by_build_and_user(pool, build_id, user.id)
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict(
            "You have already rated this build".to_string(),
        ));
    }

    db::rating::insert(pool, build_id, user.id, rating)
        .await
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict("You have already rated this build".to_string())
            }
            other => other,
        })
}

pub async fn update(
    pool: &PgPool,
    user: &User,
    build_id: i32,
    rating: i32,
) -> Result<BuildRating, ServiceError> {
    db::rating::update(pool, build_id, user.id, rating)
        .await?
        .ok_or_else(|| ServiceError::not_found("Rating"))
}

pub async fn delete(pool: &PgPool, user: &User, build_id: i32) -> Result<(), ServiceError> {
    if !db::rating::delete(pool, build_id, user.id).await? {
        return Err(ServiceError::not_found("Rating"));
    }
    Ok(())
}
