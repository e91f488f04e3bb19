//! Caller identity extractor.
//!
//! Requests are attributed to a user by the `x-user-id` header, which the
//! API gateway sets after authenticating the caller. This service trusts
//! the header; it never sees credentials.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use cartload_core::UserId;

use crate::error::set_sentry_user;

/// The HTTP header naming the authenticated user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user_id): CurrentUser) -> impl IntoResponse {
///     format!("user {user_id}")
/// }
/// ```
pub struct CurrentUser(pub UserId);

/// Error returned when the user header is missing or unusable.
#[derive(Debug)]
pub enum IdentityRejection {
    /// No `x-user-id` header on the request.
    Missing,
    /// Header present but not a valid user id.
    Malformed,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Missing => "missing x-user-id header",
            Self::Malformed => "invalid x-user-id header",
        };
        (StatusCode::UNAUTHORIZED, message).into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(IdentityRejection::Missing)?;

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i32>().ok())
            .map(UserId::new)
            .ok_or(IdentityRejection::Malformed)?;

        set_sentry_user(user_id);

        Ok(Self(user_id))
    }
}
