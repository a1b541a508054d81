//! The public client and the state shared with its background tasks.

use std::sync::Arc;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hearth_protocol::Envelope;
use hearth_protocol::constants::{KIND_SUBSCRIBE_EVENTS, KIND_UNSUBSCRIBE_EVENTS};

use crate::dispatch::{HandlerRegistry, MessageHandler};
use crate::error::ClientError;
use crate::subscriptions::SubscriptionTable;
use crate::transport::{self, WsSink};
use crate::types::{ConnectionState, RetryConfig, Subscription};
use crate::{handshake, reconnect};

/// Writer half plus the command-ID counter, guarded together so an ID
/// is never observed on the wire out of order with its assignment.
pub(crate) struct ConnState {
    pub(crate) writer: Option<WsSink>,
    pub(crate) next_id: u64,
}

/// Everything the client and its background tasks both touch.
pub(crate) struct Shared {
    pub(crate) endpoint: String,
    pub(crate) access_token: String,
    pub(crate) retry: RetryConfig,
    pub(crate) conn: Mutex<ConnState>,
    pub(crate) registry: HandlerRegistry,
    pub(crate) subscriptions: SubscriptionTable,
    state_tx: watch::Sender<ConnectionState>,
    pub(crate) cancel: CancellationToken,
}

impl Shared {
    pub(crate) fn state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Publishes a state transition. Closed is terminal: once reached,
    /// every later transition is refused, which keeps a concurrent
    /// supervisor from reviving a client that was closed under it.
    pub(crate) fn set_state(&self, next: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == ConnectionState::Closed || *current == next {
                return false;
            }
            debug!(from = ?current, to = ?next, "connection state change");
            *current = next.clone();
            true
        });
    }

    pub(crate) fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Atomically claims the right to run a connection attempt by
    /// moving Disconnected to Connecting. `Ok(false)` means already
    /// connected, nothing to do.
    pub(crate) fn begin_connect(&self) -> Result<bool, ClientError> {
        let mut verdict = Ok(true);
        self.state_tx.send_if_modified(|current| match current {
            ConnectionState::Disconnected => {
                *current = ConnectionState::Connecting;
                true
            }
            ConnectionState::Connected => {
                verdict = Ok(false);
                false
            }
            ConnectionState::Closed => {
                verdict = Err(ClientError::ConnectFailed(
                    "client is closed; construct a new one".into(),
                ));
                false
            }
            _ => {
                verdict = Err(ClientError::ConnectFailed(
                    "connection attempt already in progress".into(),
                ));
                false
            }
        });
        verdict
    }

    /// Assigns the next command ID and writes one envelope.
    pub(crate) async fn send_envelope(
        &self,
        kind: &str,
        payload: Map<String, Value>,
    ) -> Result<u64, ClientError> {
        if self.state() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }

        let mut conn = self.conn.lock().await;
        if conn.writer.is_none() {
            return Err(ClientError::NotConnected);
        }

        conn.next_id += 1;
        let id = conn.next_id;
        let envelope = Envelope::new(kind).with_id(id).with_payload(payload);
        let text = envelope
            .encode()
            .map_err(|e| ClientError::SendFailed(e.to_string()))?;

        let result = match conn.writer.as_mut() {
            Some(writer) => writer.send(Message::Text(text.into())).await,
            None => return Err(ClientError::NotConnected),
        };
        if let Err(e) = result {
            // The read loop observes the dead socket and drives recovery.
            conn.writer = None;
            return Err(ClientError::SendFailed(e.to_string()));
        }
        Ok(id)
    }

    pub(crate) async fn drop_writer(&self) {
        let mut conn = self.conn.lock().await;
        conn.writer = None;
    }

    /// Installs a fresh writer half, unless shutdown has begun. The
    /// cancellation check happens under the connection lock, and
    /// `close()` raises the signal before taking that lock, so exactly
    /// one side ends up owning (and closing) the transport. A refused
    /// install hands the writer back for the caller to tear down.
    pub(crate) async fn install_writer(&self, writer: WsSink) -> Result<(), WsSink> {
        let mut conn = self.conn.lock().await;
        if self.cancel.is_cancelled() {
            return Err(writer);
        }
        conn.writer = Some(writer);
        Ok(())
    }

    /// Re-issues every tracked subscription on a fresh connection.
    ///
    /// Each replay goes out under a new command ID; the table keeps the
    /// creating ID as the caller's handle and records the new wire ID
    /// underneath it.
    pub(crate) async fn replay_subscriptions(&self) {
        for (handle, event_type) in self.subscriptions.snapshot() {
            let mut payload = Map::new();
            if let Some(filter) = &event_type {
                payload.insert("event_type".into(), Value::String(filter.clone()));
            }
            match self.send_envelope(KIND_SUBSCRIBE_EVENTS, payload).await {
                Ok(wire_id) => {
                    self.subscriptions.set_wire_id(handle, wire_id);
                    debug!(handle, wire_id, "subscription replayed");
                }
                Err(e) => {
                    // The read loop will notice the dead connection and
                    // retry; the next replay starts over from the table.
                    warn!(handle, error = %e, "subscription replay failed");
                    return;
                }
            }
        }
    }
}

/// Persistent, authenticated connection to the hub's event bus.
///
/// One client owns one connection. All methods take `&self`; the client
/// is cheap to share behind an `Arc` if multiple tasks need it.
pub struct HubClient {
    shared: Arc<Shared>,
}

impl HubClient {
    /// Creates a client with the default retry policy. No I/O happens
    /// until [`connect`](Self::connect).
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_retry(endpoint, access_token, RetryConfig::default())
    }

    pub fn with_retry(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        retry: RetryConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                endpoint: endpoint.into(),
                access_token: access_token.into(),
                retry,
                conn: Mutex::new(ConnState {
                    writer: None,
                    next_id: 0,
                }),
                registry: HandlerRegistry::default(),
                subscriptions: SubscriptionTable::default(),
                state_tx,
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Dials the hub, authenticates, and starts the receive loop.
    ///
    /// Idempotent while connected. Fails fast when the client is closed
    /// or another connection attempt is already in flight.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let shared = &self.shared;
        if !shared.begin_connect()? {
            return Ok(());
        }

        // Dial and authenticate without holding the connection lock, so
        // close() stays responsive while either is in flight. Dropping
        // the in-flight attempt on cancellation closes the socket.
        let attempt = async {
            let mut stream = transport::open(&shared.endpoint).await?;
            shared.set_state(ConnectionState::Authenticating);
            if let Err(e) = handshake::authenticate(&mut stream, &shared.access_token).await {
                let _ = stream.close(None).await;
                return Err(e);
            }
            Ok(stream)
        };
        let stream = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => {
                return Err(ClientError::ConnectFailed("client closed during connect".into()));
            }
            result = attempt => match result {
                Ok(stream) => stream,
                Err(e) => {
                    shared.set_state(ConnectionState::Disconnected);
                    return Err(e);
                }
            },
        };

        let (sink, source) = stream.split();
        if let Err(mut sink) = shared.install_writer(sink).await {
            let _ = sink.close().await;
            return Err(ClientError::ConnectFailed("client closed during connect".into()));
        }
        shared.set_state(ConnectionState::Connected);

        info!(endpoint = %shared.endpoint, "connected to hub");
        tokio::spawn(reconnect::run_connection(Arc::clone(shared), source));
        Ok(())
    }

    /// Shuts the client down for good. Safe to call more than once.
    pub async fn close(&self) {
        let shared = &self.shared;
        shared.cancel.cancel();

        let mut conn = shared.conn.lock().await;
        if let Some(mut writer) = conn.writer.take() {
            let _ = writer.send(Message::Close(None)).await;
            let _ = writer.close().await;
        }
        drop(conn);

        shared.subscriptions.clear();
        shared.set_state(ConnectionState::Closed);
    }

    /// Sends one command frame and returns the ID it went out under.
    ///
    /// IDs are unique for the life of the client and strictly increasing
    /// in wire order, even under concurrent callers. The counter is not
    /// reset by reconnects.
    pub async fn send(&self, kind: &str, payload: Map<String, Value>) -> Result<u64, ClientError> {
        self.shared.send_envelope(kind, payload).await
    }

    /// Subscribes to hub events, optionally filtered to one event type.
    ///
    /// The returned record's `id` is the caller's handle for later
    /// unsubscription and stays valid across reconnects.
    pub async fn subscribe_events(
        &self,
        event_type: Option<&str>,
    ) -> Result<Subscription, ClientError> {
        let mut payload = Map::new();
        if let Some(filter) = event_type {
            payload.insert("event_type".into(), Value::String(filter.to_owned()));
        }
        let id = self
            .shared
            .send_envelope(KIND_SUBSCRIBE_EVENTS, payload)
            .await?;

        let subscription = Subscription {
            id,
            event_type: event_type.map(str::to_owned),
            created_at: Utc::now(),
        };
        self.shared.subscriptions.insert(subscription.clone());
        Ok(subscription)
    }

    /// Cancels a subscription by the handle `subscribe_events` returned.
    pub async fn unsubscribe_events(&self, id: u64) -> Result<(), ClientError> {
        let wire_id = self
            .shared
            .subscriptions
            .wire_id(id)
            .ok_or(ClientError::UnknownSubscription(id))?;

        let mut payload = Map::new();
        payload.insert("subscription".into(), Value::from(wire_id));
        self.shared
            .send_envelope(KIND_UNSUBSCRIBE_EVENTS, payload)
            .await?;

        self.shared.subscriptions.remove(id);
        Ok(())
    }

    /// Registers a handler for every inbound frame of the given kind.
    ///
    /// Handlers may be registered at any time, including before the
    /// first connect. Several handlers may share a kind; each inbound
    /// frame is delivered to all of them.
    pub fn on_message(&self, kind: &str, handler: impl Fn(Envelope) + Send + Sync + 'static) {
        let handler: MessageHandler = Arc::new(handler);
        self.shared.registry.register(kind, handler);
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// A watch receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.watch_state()
    }
}

impl Drop for HubClient {
    fn drop(&mut self) {
        // Background tasks hold their own Arc; cancelling here is what
        // actually lets them wind down.
        self.shared.cancel.cancel();
    }
}
