use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::routes::validated;
use crate::services;
use actix_web::{delete, get, post, put, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "List build comments.", skip(pg_pool))]
#[get("/{id}/comments")]
pub async fn comment_list(
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let comments = services::comments::tree(pg_pool.get_ref(), path.0).await?;

    Ok(JsonResponse::build().set_list(comments).ok("OK"))
}

#[tracing::instrument(name = "Comment build.", skip(user, pg_pool))]
#[post("/{id}/comments")]
pub async fn comment_add(
    user: CurrentUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::build::CommentForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let comment = services::comments::create(pg_pool.get_ref(), &user, path.0, form).await?;

    Ok(JsonResponse::build()
        .set_id(comment.id)
        .set_item(comment)
        .created("Comment added"))
}

#[tracing::instrument(name = "Edit build comment.", skip(user, pg_pool))]
#[put("/{id}/comments/{comment_id}")]
pub async fn comment_update(
    user: CurrentUser,
    path: web::Path<(i32, i32)>,
    form: web::Json<forms::build::EditComment>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (build_id, comment_id) = path.into_inner();
    let form = validated(form)?;
    let comment =
        services::comments::edit(pg_pool.get_ref(), &user, build_id, comment_id, &form.text)
            .await?;

    Ok(JsonResponse::build()
        .set_id(comment.id)
        .set_item(comment)
        .ok("Updated"))
}

#[tracing::instrument(name = "Delete build comment.", skip(user, pg_pool))]
#[delete("/{id}/comments/{comment_id}")]
pub async fn comment_delete(
    user: CurrentUser,
    path: web::Path<(i32, i32)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (build_id, comment_id) = path.into_inner();
    services::comments::delete(pg_pool.get_ref(), &user, build_id, comment_id).await?;

    Ok(JsonResponse::<()>::build().set_id(comment_id).ok("Deleted"))
}
