use crate::configuration::AuthSettings;
use crate::models::{Role, User};
use crate::services::ServiceError;
use crate::views::auth::AccessToken;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl JwtService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            lifetime: Duration::minutes(settings.token_lifetime_mins),
        }
    }

    pub fn issue(&self, user: &User) -> Result<AccessToken, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| {
                tracing::error!("Failed to encode access token: {}", err);
                ServiceError::Internal("Failed to issue access token".to_string())
            })?;

        Ok(AccessToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.lifetime.num_seconds(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ServiceError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!("JWT rejected: {}", err);
                ServiceError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, lifetime_mins: i64) -> JwtService {
        JwtService::new(&AuthSettings {
            jwt_secret: secret.to_string(),
            token_lifetime_mins: lifetime_mins,
            ..Default::default()
        })
    }

    #[test]
    fn issued_token_verifies() {
        let jwt = service("test-secret", 60);
        let user = User {
            id: 7,
            role: Role::Admin,
            ..Default::default()
        };

        let token = jwt.issue(&user).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);

        let claims = jwt.verify(&token.access_token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = service("one", 60).issue(&User::default()).unwrap();
        assert!(matches!(
            service("two", 60).verify(&token.access_token),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = service("test-secret", -10);
        let token = jwt.issue(&User::default()).unwrap();
        assert!(jwt.verify(&token.access_token).is_err());
    }
}
