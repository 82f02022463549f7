//! Session identity carried by cookies.
//!
//! The pair `(playerId, roomId)` is the sole authorization input server-side;
//! services re-read the player row on every call instead of trusting any
//! cached privilege. The context is an explicit value passed into every
//! coordinator call, never ambient state.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
};
use uuid::Uuid;

use crate::error::AppError;

/// Cookie carrying the player id.
pub const PLAYER_COOKIE: &str = "playerId";
/// Cookie carrying the room id.
pub const ROOM_COOKIE: &str = "roomId";
/// Cookie carrying the display name; informational only, never trusted.
pub const NAME_COOKIE: &str = "playerName";

/// Authenticated request identity resolved from the session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    /// Caller's player id.
    pub player_id: Uuid,
    /// Room the caller claims to belong to.
    pub room_id: Uuid,
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let player_id = require_uuid_cookie(&parts.headers, PLAYER_COOKIE)?;
        let room_id = require_uuid_cookie(&parts.headers, ROOM_COOKIE)?;
        Ok(SessionContext { player_id, room_id })
    }
}

fn require_uuid_cookie(headers: &HeaderMap, name: &str) -> Result<Uuid, AppError> {
    let raw = cookie_value(headers, name)
        .ok_or_else(|| AppError::Unauthenticated(format!("missing `{name}` cookie")))?;
    raw.parse::<Uuid>()
        .map_err(|_| AppError::Unauthenticated(format!("malformed `{name}` cookie")))
}

/// Find a cookie's value across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
