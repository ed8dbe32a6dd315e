use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::{BearerError, CryptError},
    error::log_error,
    model::{DatabaseError, ResourceType},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationBearer: {0}")]
    AuthenticationBearer(#[from] BearerError),

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceConflict: {resource_type:?}. Error: {error}")]
    ResourceConflict {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceLimitReached: {resource_type:?}. Error: {error}")]
    ResourceLimitReached {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type:?}")]
    ResourceBadRequest { resource_type: ResourceType },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] CryptError),

    #[error("ServerUnavailable: {0}")]
    ServerUnavailable(DatabaseError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerCryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ServerCryptError(_) => String::from("Internal server error."),
            Self::ServerUnavailable(_) => {
                String::from("Service temporarily unavailable, try again later.")
            }
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationBearer(e) => e.to_string(),
            Self::AuthenticationInvalidCredentials => String::from("Invalid credentials"),
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
            Self::ResourceLimitReached { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("Resource error, resource not found."),
            Self::ResourceConflict { .. } => {
                String::from("Resource error, resource already exists.")
            }
            Self::ResourceLimitReached { .. } => {
                String::from("Resource error, limit reached. Try again later.")
            }
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
            Self::ResourceBadRequest { .. } => String::from("Resource error, bad request."),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    /// Maps a facade failure onto a response class.
    pub fn database(r#type: ResourceType, error: DatabaseError) -> Self {
        if error.is_retryable() {
            return Self::ServerError(ServerError::ServerUnavailable(error));
        }

        let resource_type = r#type;
        let e = match error {
            e @ DatabaseError::BusinessRule(_) => {
                ResourceError::ResourceLimitReached { resource_type, error: e }
            }
            e if e.is_unique_violation() => ResourceError::ResourceConflict { resource_type, error: e },
            // referenced user or post is gone
            e if e.is_foreign_key_violation() => ResourceError::ResourceNotFound { resource_type },
            e => ResourceError::ResourceFetchError { resource_type, error: e },
        };
        Self::ResourceError(e)
    }

    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_bad_request(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
        })
    }

    pub fn auth_bearer(error: BearerError) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationBearer(error))
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::BusinessRuleViolation;

    #[test]
    fn overload_maps_to_service_unavailable() {
        let e = WebError::database(ResourceType::Post, DatabaseError::PoolExhausted);
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let e = WebError::database(ResourceType::User, DatabaseError::NotConnected);
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn post_limit_maps_to_too_many_requests() {
        let violation = BusinessRuleViolation::PostLimitReached {
            limit: 7,
            window_days: 7,
        };
        let e = WebError::database(ResourceType::Post, violation.into());
        assert_eq!(e.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn other_sql_errors_are_internal() {
        let e = WebError::database(
            ResourceType::Comment,
            DatabaseError::sql("SELECT 1", sqlx::Error::RowNotFound),
        );
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bearer_errors_keep_their_message() {
        let e = WebError::auth_bearer(BearerError::InvalidToken);
        assert_eq!(e.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(e.client_display(), "Invalid token");
    }
}
