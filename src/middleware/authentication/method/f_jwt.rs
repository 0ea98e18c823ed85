use crate::configuration::Settings;
use crate::helpers::Cache;
use crate::middleware::authentication::get_header;
use crate::services::auth::{session, JwtService};
use crate::services::ServiceError;
use actix_web::{dev::ServiceRequest, web, HttpMessage};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

fn try_extract_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn unauthorized(msg: &str) -> ServiceError {
    ServiceError::Unauthorized(msg.to_string())
}

#[tracing::instrument(name = "Authenticate with bearer JWT", skip(req))]
pub async fn try_jwt(req: &mut ServiceRequest) -> Result<bool, ServiceError> {
    let authorization = get_header::<String>(req, "authorization").map_err(|err| unauthorized(&err))?;
    let authorization = match authorization {
        Some(authorization) => authorization,
        None => return Ok(false),
    };
    let token = try_extract_token(&authorization).ok_or_else(|| unauthorized("Bearer token is missing"))?;

    let internal = || ServiceError::Internal("Authentication is not configured".to_string());
    let jwt = req.app_data::<web::Data<JwtService>>().ok_or_else(internal)?;
    let pool = req.app_data::<web::Data<PgPool>>().ok_or_else(internal)?;
    let cache = req.app_data::<web::Data<Arc<dyn Cache>>>().ok_or_else(internal)?;
    let settings = req.app_data::<web::Data<Settings>>().ok_or_else(internal)?;

    let claims = jwt.verify(token)?;
    let user_id = claims.user_id().ok_or_else(|| unauthorized("Invalid token subject"))?;

    let ttl = Duration::from_secs(settings.auth.session_cache_ttl_secs);
    let user = session::load_user(pool.get_ref(), cache.get_ref().as_ref(), ttl, user_id)
        .await?
        .ok_or_else(|| unauthorized("User not found"))?;

    if !user.is_active {
        tracing::info!("Rejected token of deactivated user {}", user.id);
        return Err(unauthorized("User is deactivated"));
    }

    tracing::debug!("Authenticated user {} ({})", user.id, user.role);
    if req.extensions_mut().insert(Arc::new(user)).is_some() {
        return Err(ServiceError::Internal("user already logged".to_string()));
    }

    Ok(true)
}
