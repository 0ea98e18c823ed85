pub(crate) mod auth;
pub(crate) mod balance;
pub(crate) mod build;
pub(crate) mod chat;
pub(crate) mod component;
pub(crate) mod feedback;
pub mod health_checks;
pub(crate) mod scraper;
pub(crate) mod user;

pub use health_checks::*;

use crate::helpers::JsonResponse;
use actix_web::web;
use serde_valid::Validate;

/// Unwraps a JSON body, rejecting it with a 400 envelope when validation fails.
pub(crate) fn validated<T: Validate>(form: web::Json<T>) -> Result<T, actix_web::Error> {
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<()>::build().form_error(errors.to_string()));
    }
    Ok(form)
}
