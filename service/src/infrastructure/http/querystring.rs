use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;
use serde_querystring::ParseMode;

use crate::{
    domain::error::ErrorCode,
    infrastructure::http::api::{ApiError, ApiErrorData},
};

/// Query string extractor, repeated keys deserialize into sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryString<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryString<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let value = serde_querystring::from_str(query, ParseMode::Duplicate).map_err(|e| {
            tracing::debug!("Rejected query string '{}': {}", query, e);
            let mut data = ApiErrorData::new(
                ErrorCode::ValidationError,
                "Failed to deserialize query string",
            );
            data.errors.push(e.to_string());
            ApiError::UnprocessableEntity(data)
        })?;
        Ok(QueryString(value))
    }
}

impl<T> Deref for QueryString<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
