use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use std::fmt;

use crate::constants::{
    CODE_BAD_REQUEST, CODE_CONFLICT, CODE_INTERNAL_ERROR, CODE_NOT_FOUND, CODE_UNAUTHORIZED,
    CODE_VALIDATION_FAILED, ERR_DATABASE,
};
use crate::models::ErrorResponse;
use crate::repositories::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    InternalServerError(String),
    ValidationError(Vec<String>),
}

impl ApiError {
    /// Machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => CODE_BAD_REQUEST,
            ApiError::Unauthorized(_) => CODE_UNAUTHORIZED,
            ApiError::NotFound(_) => CODE_NOT_FOUND,
            ApiError::Conflict(_) => CODE_CONFLICT,
            ApiError::InternalServerError(_) => CODE_INTERNAL_ERROR,
            ApiError::ValidationError(_) => CODE_VALIDATION_FAILED,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ValidationError(errors) => write!(f, "Validation Error: {:?}", errors),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (message, errors) = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg) => (msg.clone(), None),
            ApiError::ValidationError(errors) => {
                ("Validation failed".to_string(), Some(errors.clone()))
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            code: self.code().to_string(),
            message,
            errors,
        })
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity } => ApiError::NotFound(format!("{} not found", entity)),
            RepositoryError::ConstraintViolation { message } => ApiError::Conflict(message),
            RepositoryError::Backend { message } => {
                // Driver details stay in the log, not in the response body.
                error!("Record store failure: {}", message);
                ApiError::InternalServerError(ERR_DATABASE.to_string())
            }
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}
