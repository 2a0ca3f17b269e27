use bibrec_common::Locale;
use serde::Serialize;

use crate::domain::{messages::Message, repository::RepositoryError};

/// Error codes reported to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ObjectError,
    ValidationError,
    PermissionError,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Referenced entity not found, or a non-validation domain failure
    #[error("{}", .message.render(Locale::En, .subject.as_deref()))]
    Object {
        message: Message,
        subject: Option<String>,
    },
    /// Malformed or rejected input, `errors` holds the details
    #[error("{}", .message.render(Locale::En, .subject.as_deref()))]
    Validation {
        message: Message,
        subject: Option<String>,
        errors: Vec<String>,
    },
    #[error("{}", .message.text(Locale::En))]
    Permission { message: Message },
    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn not_found(message: Message, subject: impl ToString) -> Self {
        Self::Object {
            message,
            subject: Some(subject.to_string()),
        }
    }

    pub fn validation(message: Message, errors: Vec<String>) -> Self {
        Self::Validation {
            message,
            subject: None,
            errors,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Object { .. } | ServiceError::Repository(_) => ErrorCode::ObjectError,
            ServiceError::Validation { .. } => ErrorCode::ValidationError,
            ServiceError::Permission { .. } => ErrorCode::PermissionError,
        }
    }

    /// Localized message; repository failures are not exposed
    pub fn message(&self, locale: Locale) -> String {
        match self {
            ServiceError::Object { message, subject }
            | ServiceError::Validation {
                message, subject, ..
            } => message.render(locale, subject.as_deref()),
            ServiceError::Permission { message } => message.text(locale).to_string(),
            ServiceError::Repository(_) => "Internal server error".to_string(),
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            ServiceError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}
