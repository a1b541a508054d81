//! Wire protocol for the hub's realtime event bus.
//!
//! Defines the [`Envelope`] every frame travels in, the well-known
//! message kind tags, and typed views of pushed events. Pure data
//! transforms only — no I/O lives in this crate.

pub mod constants;
pub mod envelope;
pub mod event;

pub use envelope::{DecodeError, Envelope};
pub use event::{Context, Event, EventFrame};
