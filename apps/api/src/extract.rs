//! Request extractors.
//!
//! Authentication is done upstream; the gateway forwards the verified
//! identity as `X-Actor-*` headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use medpos_core::Actor;

use crate::error::ApiError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Role recorded when the gateway does not send one.
pub const DEFAULT_ROLE: &str = "cashier";

/// The authenticated user performing the request.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_str(&parts.headers, ACTOR_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Missing actor identity"))?;
        let name = header_str(&parts.headers, ACTOR_NAME_HEADER).unwrap_or(id);
        let role = header_str(&parts.headers, ACTOR_ROLE_HEADER).unwrap_or(DEFAULT_ROLE);

        Ok(CurrentActor(Actor {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
        }))
    }
}

/// Trimmed, non-empty UTF-8 header value.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
