//! Request extractors that state what a handler requires of its caller.
//! They read what the authentication middleware left in the extensions.

use crate::middleware::authentication::BotCaller;
use crate::models::{Role, User};
use crate::services::ServiceError;
use actix_web::{dev::Payload, Error, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::ops::Deref;
use std::sync::Arc;

fn current_user(req: &HttpRequest) -> Option<Arc<User>> {
    req.extensions().get::<Arc<User>>().cloned()
}

fn authenticated(req: &HttpRequest) -> Result<Arc<User>, ServiceError> {
    current_user(req).ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))
}

fn with_role(req: &HttpRequest, allowed: fn(Role) -> bool) -> Result<Arc<User>, ServiceError> {
    let user = authenticated(req)?;
    if allowed(user.role) {
        Ok(user)
    } else {
        Err(ServiceError::Forbidden("Insufficient permissions".to_string()))
    }
}

macro_rules! user_extractor {
    ($name:ident, $resolve:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub Arc<User>);

        impl Deref for $name {
            type Target = User;

            fn deref(&self) -> &User {
                &self.0
            }
        }

        impl FromRequest for $name {
            type Error = Error;
            type Future = Ready<Result<Self, Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                let resolve: fn(&HttpRequest) -> Result<Arc<User>, ServiceError> = $resolve;
                ready(resolve(req).map($name).map_err(Error::from))
            }
        }
    };
}

user_extractor!(CurrentUser, authenticated);
user_extractor!(AdminUser, |req| with_role(req, |role| role.is_admin()));
user_extractor!(SuperAdminUser, |req| with_role(req, |role| role == Role::SuperAdmin));

/// Caller when one is authenticated; never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Arc<User>>);

impl MaybeUser {
    pub fn as_deref(&self) -> Option<&User> {
        self.0.as_deref()
    }
}

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(current_user(req))))
    }
}

/// Request signed by the companion bot.
#[derive(Debug, Clone, Copy)]
pub struct SignedByBot;

impl FromRequest for SignedByBot {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let signed = req.extensions().get::<BotCaller>().is_some();
        ready(if signed {
            Ok(SignedByBot)
        } else {
            Err(ServiceError::Unauthorized("Bot signature required".to_string()).into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    fn request_as(role: Option<Role>) -> HttpRequest {
        let req = TestRequest::default().to_http_request();
        if let Some(role) = role {
            req.extensions_mut().insert(Arc::new(User {
                id: 7,
                role,
                is_active: true,
                ..Default::default()
            }));
        }
        req
    }

    async fn status_of<T: FromRequest>(req: &HttpRequest) -> Option<StatusCode> {
        match T::extract(req).await {
            Ok(_) => None,
            Err(err) => {
                let err: Error = err.into();
                Some(err.as_response_error().status_code())
            }
        }
    }

    #[actix_web::test]
    async fn anonymous_callers_get_401() {
        let req = request_as(None);
        assert_eq!(status_of::<CurrentUser>(&req).await, Some(StatusCode::UNAUTHORIZED));
        assert_eq!(status_of::<AdminUser>(&req).await, Some(StatusCode::UNAUTHORIZED));
        assert!(MaybeUser::extract(&req).await.unwrap().0.is_none());
    }

    #[actix_web::test]
    async fn roles_are_enforced() {
        let user = request_as(Some(Role::User));
        assert_eq!(status_of::<CurrentUser>(&user).await, None);
        assert_eq!(status_of::<AdminUser>(&user).await, Some(StatusCode::FORBIDDEN));

        let admin = request_as(Some(Role::Admin));
        assert_eq!(status_of::<AdminUser>(&admin).await, None);
        assert_eq!(status_of::<SuperAdminUser>(&admin).await, Some(StatusCode::FORBIDDEN));

        let root = request_as(Some(Role::SuperAdmin));
        assert_eq!(status_of::<SuperAdminUser>(&root).await, None);
        assert_eq!(AdminUser::extract(&root).await.unwrap().id, 7);
    }

    #[actix_web::test]
    async fn unsigned_requests_are_not_bot_calls() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(status_of::<SignedByBot>(&req).await, Some(StatusCode::UNAUTHORIZED));
        req.extensions_mut().insert(BotCaller);
        assert_eq!(status_of::<SignedByBot>(&req).await, None);
    }
}
