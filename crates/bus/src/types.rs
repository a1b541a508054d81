//! Public types for the bus client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use hearth_protocol::constants::{DEFAULT_MAX_RECONNECT_ATTEMPTS, RECONNECT_BACKOFF_STEP};

/// Lifecycle state of the client's single connection.
///
/// Exactly one value holds at any instant; transitions happen only
/// through the client's connect/close paths and the reconnection
/// supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport open and no activity in flight.
    Disconnected,
    /// Transport dial in progress.
    Connecting,
    /// Transport open, handshake in flight. No other traffic yet.
    Authenticating,
    /// Handshake accepted; the receive loop is running.
    Connected,
    /// Connection lost; the supervisor is retrying.
    Reconnecting { attempt: u32 },
    /// Terminal. A closed client must be reconstructed, not reused.
    Closed,
}

/// Bounded-retry reconnection policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts before the client gives up and closes.
    pub max_attempts: u32,
    /// Attempt `i` (1-based) waits `i * backoff_step` before dialing.
    /// The wait is unconditional and carries no jitter.
    pub backoff_step: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            backoff_step: RECONNECT_BACKOFF_STEP,
        }
    }
}

impl RetryConfig {
    /// Linear backoff: `backoff_step * attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt.max(1))
    }
}

/// Client-side record of one active event subscription.
///
/// Bookkeeping is optimistic: the record reflects client intent from
/// the moment the subscribe command is sent, not confirmed server
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    /// Correlation ID the subscribe command was sent with. Stays the
    /// caller's handle for the whole subscription lifetime, including
    /// across reconnect replays.
    pub id: u64,
    /// Event-type filter; `None` subscribes to all events.
    pub event_type: Option<String>,
    pub created_at: DateTime<Utc>,
}
