use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::models;
use actix_web::{get, Responder, Result};

#[tracing::instrument(name = "Current user.", skip_all)]
#[get("/me")]
pub async fn me_handler(user: CurrentUser) -> Result<impl Responder> {
    let user: models::User = user.0.as_ref().clone();
    Ok(JsonResponse::build().set_id(user.id).set_item(user).ok("OK"))
}
