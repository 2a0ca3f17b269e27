use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bibrec_common::Locale;
use serde::Serialize;

use crate::domain::{
    error::{ErrorCode, ServiceError},
    repository::RepositoryError,
};

// ApiSuccess is a wrapper around a response that includes a status code.

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub(crate) fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

// ApiError is a wrapper around a response that includes a status code.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(ApiErrorData),
    ConflictWithServerState(ApiErrorData),
    Forbidden(ApiErrorData),
    Unauthorized(String),
    NotFound(ApiErrorData),
}

impl ApiError {
    /// Converts a domain error, rendering its message in `locale`
    pub fn localized(error: ServiceError, locale: Locale) -> Self {
        let data = ApiErrorData {
            code: error.code(),
            msg: error.message(locale),
            errors: error.errors().to_vec(),
        };
        match error {
            ServiceError::Object { .. } => Self::NotFound(data),
            ServiceError::Validation { .. } => Self::UnprocessableEntity(data),
            ServiceError::Permission { .. } => Self::Forbidden(data),
            ServiceError::Repository(cause) => Self::from(cause),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::localized(e, Locale::default())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => {
                Self::NotFound(ApiErrorData::new(ErrorCode::ObjectError, "Not found"))
            }
            RepositoryError::ValidationFailed(cause) => {
                Self::UnprocessableEntity(ApiErrorData::new(ErrorCode::ValidationError, cause))
            }
            RepositoryError::UniqueViolation(cause) => {
                Self::ConflictWithServerState(ApiErrorData::new(ErrorCode::ObjectError, cause))
            }
            RepositoryError::DatabaseError(cause) => Self::InternalServerError(cause),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        let (status, data) = match self {
            InternalServerError(e) => {
                tracing::error!("{}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorData::new(ErrorCode::ObjectError, "Internal server error"),
                )
            }
            UnprocessableEntity(data) => (StatusCode::UNPROCESSABLE_ENTITY, data),
            ConflictWithServerState(data) => (StatusCode::CONFLICT, data),
            Forbidden(data) => (StatusCode::FORBIDDEN, data),
            Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ApiErrorData::new(ErrorCode::PermissionError, message),
            ),
            NotFound(data) => (StatusCode::NOT_FOUND, data),
        };

        (status, Json(ApiResponseBody::new_error(status, data))).into_response()
    }
}

// Generic response structure shared by all API error responses.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    pub status_code: u16,
    pub error: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, error: ApiErrorData) -> Self {
        Self {
            status_code: status_code.as_u16(),
            error,
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub code: ErrorCode,
    pub msg: String,
    pub errors: Vec<String>,
}

impl ApiErrorData {
    pub fn new(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            errors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::messages::Message;

    #[test]
    fn domain_errors_map_to_statuses() {
        let err = ApiError::localized(
            ServiceError::not_found(Message::PublicationNotFound, 3),
            Locale::Sv,
        );
        assert_eq!(
            err,
            ApiError::NotFound(ApiErrorData::new(
                ErrorCode::ObjectError,
                "Publikationen hittades inte: 3"
            ))
        );

        let err = ApiError::from(ServiceError::Permission {
            message: Message::CannotDeletePublished,
        });
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = ApiError::from(ServiceError::from(RepositoryError::DatabaseError(
            "connection reset".to_string(),
        )));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_details_are_kept() {
        let err = ApiError::from(ServiceError::validation(
            Message::InvalidFile,
            vec!["unexpected end of file".to_string()],
        ));
        let ApiError::UnprocessableEntity(data) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(data.code, ErrorCode::ValidationError);
        assert_eq!(data.errors, vec!["unexpected end of file"]);
    }
}
