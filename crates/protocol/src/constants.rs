use std::time::Duration;

// Kinds the client sends.

/// Authentication command — the first frame on every connection, sent
/// without an `id`.
pub const KIND_AUTH: &str = "auth";
/// Subscribes to pushed events, optionally filtered by `event_type`.
pub const KIND_SUBSCRIBE_EVENTS: &str = "subscribe_events";
/// Cancels an event subscription by its creating correlation ID.
pub const KIND_UNSUBSCRIBE_EVENTS: &str = "unsubscribe_events";

// Kinds the hub sends.

/// Handshake accepted.
pub const KIND_AUTH_OK: &str = "auth_ok";
/// Handshake rejected; carries a `message` field with the reason.
pub const KIND_AUTH_INVALID: &str = "auth_invalid";
/// A pushed event for an active subscription.
pub const KIND_EVENT: &str = "event";
/// Acknowledgment of a command, correlated by `id`.
pub const KIND_RESULT: &str = "result";

/// Reconnect attempts before the client gives up and closes.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Backoff unit: reconnect attempt `i` (1-based) waits `i` times this
/// before dialing. No jitter.
pub const RECONNECT_BACKOFF_STEP: Duration = Duration::from_secs(3);
