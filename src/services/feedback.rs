use crate::db;
use crate::forms::{AdminEditFeedback, FeedbackFilter, NewFeedback, Pagination, UserEditFeedback};
use crate::models::{Feedback, FeedbackStats, FeedbackStatus, User};
use crate::services::{Notifier, ServiceError};
use sqlx::PgPool;

pub async fn create(pool: &PgPool, user: &User, form: NewFeedback) -> Result<Feedback, ServiceError> {
    if db::feedback::fetch_by_user(pool, user.id).await?.is_some() {
        return Err(ServiceError::Conflict(
            "You have already left feedback".to_string(),
        ));
    }

    let feedback = Feedback {
        user_id: user.id,
        feedback_type: form.feedback_type,
        status: FeedbackStatus::New,
        rating: form.rating,
        text: form.text,
        ..Default::default()
    };

    // the unique index settles a race between two concurrent submissions
    db::feedback::insert(pool, &feedback)
        .await
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict("You have already left feedback".to_string())
            }
            other => other,
        })
}

pub async fn get_mine(pool: &PgPool, user: &User) -> Result<Feedback, ServiceError> {
    db::feedback::fetch_by_user(pool, user.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Feedback"))
}

pub async fn update_mine(
    pool: &PgPool,
    user: &User,
    form: UserEditFeedback,
) -> Result<Feedback, ServiceError> {
    let mut feedback = get_mine(pool, user).await?;
    if feedback.status.is_final() {
        return Err(ServiceError::Conflict(
            "Feedback is already processed".to_string(),
        ));
    }

    form.update(&mut feedback);
    Ok(db::feedback::update(pool, &feedback).await?)
}

pub async fn delete_mine(pool: &PgPool, user: &User) -> Result<(), ServiceError> {
    if !db::feedback::delete_by_user(pool, user.id).await? {
        return Err(ServiceError::not_found("Feedback"));
    }
    Ok(())
}

pub async fn list(
    pool: &PgPool,
    filter: &FeedbackFilter,
    pagination: &Pagination,
) -> Result<(Vec<Feedback>, i64), ServiceError> {
    Ok(db::feedback::list(pool, filter, pagination).await?)
}

pub async fn stats(pool: &PgPool) -> Result<FeedbackStats, ServiceError> {
    Ok(db::feedback::stats(pool).await?)
}

pub async fn get(pool: &PgPool, id: i32) -> Result<Feedback, ServiceError> {
    db::feedback::fetch(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Feedback"))
}

/// Applies an admin decision and emails the author when a response was written.
pub async fn review(
    pool: &PgPool,
    notifier: &Notifier,
    id: i32,
    form: AdminEditFeedback,
) -> Result<Feedback, ServiceError> {
    let mut feedback = get(pool, id).await?;
    let responded = form.admin_response.is_some();
    form.update(&mut feedback);
    let feedback = db::feedback::update(pool, &feedback).await?;

    if responded {
        if let Some(author) = db::user::fetch(pool, feedback.user_id).await? {
            notifier.send(
                author.email.as_deref(),
                "Your feedback was reviewed",
                format!(
                    "Hello {},\n\nStatus: {}\n\n{}\n",
                    author.name,
                    feedback.status,
                    feedback.admin_response.as_deref().unwrap_or_default()
                ),
            );
        }
    }

    Ok(feedback)
}
