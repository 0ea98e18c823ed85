use crate::connectors::ConnectorError;
use crate::helpers::cache::CacheError;
use crate::helpers::JsonResponse;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    External(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::External(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(JsonResponse::error_body(status, self.to_string()))
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => return Self::NotFound("Not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => return Self::Conflict("Already exists".to_string()),
                Some("23503") => {
                    return Self::Conflict("Referenced by other records".to_string())
                }
                Some("23514") => return Self::Validation("Constraint violated".to_string()),
                _ => {}
            },
            _ => {}
        }

        tracing::error!("Failed to execute query: {:?}", err);
        Self::Internal("Internal Server Error".to_string())
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        tracing::error!("Cache failure: {}", err);
        Self::Internal("Internal Server Error".to_string())
    }
}

impl From<ConnectorError> for ServiceError {
    fn from(err: ConnectorError) -> Self {
        tracing::error!("External service failure: {}", err);
        match err {
            ConnectorError::Unauthorized(msg) => Self::Unauthorized(msg),
            ConnectorError::NotFound(msg) => Self::NotFound(msg),
            ConnectorError::Internal(msg) => Self::Internal(msg),
            other => Self::External(other.to_string()),
        }
    }
}

impl From<serde_valid::validation::Errors> for ServiceError {
    fn from(errors: serde_valid::validation::Errors) -> Self {
        Self::Validation(errors.to_string())
    }
}
