use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{domain::user::CurrentUser, infrastructure::http::api::ApiError};

/// Name of the authenticated user, set by the authenticating proxy
pub const USERNAME_HEADER: &str = "x-username";
/// Comma separated rights of the authenticated user
pub const RIGHTS_HEADER: &str = "x-user-rights";

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(USERNAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing authenticated user".to_string()))?;

        let rights = parts
            .headers
            .get(RIGHTS_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|right| !right.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(CurrentUser::new(username, rights))
    }
}
