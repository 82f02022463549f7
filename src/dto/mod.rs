use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Health check response.
pub mod health;
/// Room-level requests, responses, and snapshots.
pub mod room;
/// Realtime event contract shared by emitters and the client reconciler.
pub mod sse;
/// Story requests and projections.
pub mod story;
/// Vote requests and tallies.
pub mod vote;
/// Validation helpers for DTOs.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
