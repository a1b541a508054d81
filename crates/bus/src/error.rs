use hearth_protocol::DecodeError;

/// Errors surfaced by the bus client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level open failure. Each dial is a single attempt;
    /// retrying is the reconnection supervisor's job.
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// The handshake was rejected, or produced anything other than the
    /// success tag. Carries the server-supplied reason when present.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Write failure on an established connection.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Read failure on an established connection, including the peer
    /// closing it. Triggers the reconnecting transition.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// An inbound frame could not be decoded. The read loop logs and
    /// skips these; they never tear down the connection.
    #[error("malformed message: {0}")]
    Malformed(#[from] DecodeError),

    /// The operation requires the connected state. No I/O was attempted.
    #[error("not connected")]
    NotConnected,

    /// No subscription is tracked under this ID.
    #[error("unknown subscription: {0}")]
    UnknownSubscription(u64),

    /// The retry budget ran out. The client is closed and must be
    /// reconstructed.
    #[error("reconnect attempts exhausted after {0} tries")]
    ReconnectExhausted(u32),
}
