//! Persistent client for a home-automation hub's realtime event bus.
//!
//! Maintains one authenticated WebSocket connection to the hub, pushes
//! inbound frames to registered handlers, keeps subscription bookkeeping
//! across the connection's lifetime, and reconnects automatically with
//! bounded, increasing backoff when the link drops.
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth_bus::HubClient;
//!
//! let client = HubClient::new("ws://hub.local:8123/api/websocket", token);
//! client.on_message("event", |frame| {
//!     println!("got {}", frame.kind);
//! });
//!
//! client.connect().await?;
//! let sub = client.subscribe_events(Some("state_changed")).await?;
//! // ... later ...
//! client.unsubscribe_events(sub.id).await?;
//! client.close().await;
//! ```

mod client;
mod dispatch;
mod error;
mod handshake;
mod read;
mod reconnect;
mod subscriptions;
mod transport;
mod types;

pub use client::HubClient;
pub use error::ClientError;
pub use types::{ConnectionState, RetryConfig, Subscription};

pub use hearth_protocol::{Envelope, Event, EventFrame};
