//! `ActingUser` extractor: the username forwarded by the authenticating
//! gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use termset_core::error::AppError;
use termset_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the authenticated username.
pub const USERNAME_HEADER: &str = "x-username";

/// Request context of the calling user.
#[derive(Debug, Clone)]
pub struct ActingUser(pub RequestContext);

impl std::ops::Deref for ActingUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(USERNAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::validation("Missing X-Username header"))?;
        Ok(Self(RequestContext::new(username)))
    }
}
