//! Client-side view state.
//!
//! Each connected browser keeps a [`reconciler::RoomView`] seeded from a full
//! snapshot and patched by bus events through a pure reducer, so the
//! tolerance to out-of-order delivery is unit-testable without a live bus.

/// Optimistic local mutations with rollback.
pub mod optimistic;
/// Pure event reducer over the local room view.
pub mod reconciler;
