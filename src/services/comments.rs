use crate::db;
use crate::forms::CommentForm;
use crate::models::{BuildComment, User};
use crate::services::{builds, ServiceError};
use crate::views::comment::{self, CommentNode};
use sqlx::PgPool;

pub async fn tree(pool: &PgPool, build_id: i32) -> Result<Vec<CommentNode>, ServiceError> {
    builds::fetch(pool, build_id).await?;
    let comments = db::comment::list_by_build(pool, build_id).await?;
    Ok(comment::tree(comments))
}

/// A reply must target a top-level comment of the same build.
pub fn check_parent(parent: &BuildComment, build_id: i32) -> Result<(), ServiceError> {
    if parent.build_id != build_id {
        return Err(ServiceError::Validation(
            "Parent comment belongs to another build".to_string(),
        ));
    }
    if parent.is_reply() {
        return Err(ServiceError::Validation(
            "Replies to replies are not allowed".to_string(),
        ));
    }
    Ok(())
}

pub async fn create(
    pool: &PgPool,
    user: &User,
    build_id: i32,
    form: CommentForm,
) -> Result<BuildComment, ServiceError> {
    builds::fetch(pool, build_id).await?;

    if let Some(parent_id) = form.parent_id {
        let parent = db::comment::fetch(pool, parent_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Parent comment"))?;
        check_parent(&parent, build_id)?;
    }

    let comment = BuildComment {
        build_id,
        user_id: user.id,
        parent_id: form.parent_id,
        text: form.text,
        ..Default::default()
    };
    Ok(db::comment::insert(pool, &comment).await?)
}

async fn fetch_in_build(
    pool: &PgPool,
    build_id: i32,
    id: i32,
) -> Result<BuildComment, ServiceError> {
    db::comment::fetch(pool, id)
        .await?
        .filter(|comment| comment.build_id == build_id)
        .ok_or_else(|| ServiceError::not_found("Comment"))
}

pub async fn edit(
    pool: &PgPool,
    user: &User,
    build_id: i32,
    id: i32,
    text: &str,
) -> Result<BuildComment, ServiceError> {
    let comment = fetch_in_build(pool, build_id, id).await?;
    if comment.user_id != user.id {
        return Err(ServiceError::Forbidden("Not your comment".to_string()));
    }
    Ok(db::comment::update_text(pool, comment.id, text).await?)
}

pub async fn delete(pool: &PgPool, user: &User, build_id: i32, id: i32) -> Result<(), ServiceError> {
    let comment = fetch_in_build(pool, build_id, id).await?;
    if comment.user_id != user.id && !user.is_admin() {
        return Err(ServiceError::Forbidden("Not your comment".to_string()));
    }
    db::comment::delete(pool, comment.id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_to_top_level_comment_is_allowed() {
        let parent = BuildComment {
            id: 1,
            build_id: 3,
            parent_id: None,
            ..Default::default()
        };
        assert!(check_parent(&parent, 3).is_ok());
    }

    #[test]
    fn third_level_is_rejected() {
        let parent = BuildComment {
            id: 2,
            build_id: 3,
            parent_id: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            check_parent(&parent, 3),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn parent_from_other_build_is_rejected() {
        let parent = BuildComment {
            id: 1,
            build_id: 4,
            ..Default::default()
        };
        assert!(check_parent(&parent, 3).is_err());
    }
}
