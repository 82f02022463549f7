/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Room session coordination: membership, host handover, settings.
pub mod room_service;
/// Vote tallying and the final-score rule.
pub mod scoring;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Record store supervision and degraded-mode handling.
pub mod storage_supervisor;
/// Story backlog and lifecycle transitions.
pub mod story_service;
/// Vote ledger operations.
pub mod vote_service;
