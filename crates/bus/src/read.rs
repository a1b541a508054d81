//! Receive loop: the sole reader of an established connection.

use futures_util::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use hearth_protocol::Envelope;

use crate::dispatch::HandlerRegistry;
use crate::error::ClientError;

/// Why the receive loop returned.
pub(crate) enum ReadOutcome {
    /// Cooperative shutdown; the connection is being closed on purpose.
    Shutdown,
    /// The transport died underneath us.
    ConnectionLost(ClientError),
}

/// Pulls frames until cancellation or transport failure.
///
/// Malformed payloads are logged and skipped; only transport-level
/// failures end the loop.
pub(crate) async fn read_frames<S>(
    source: &mut S,
    registry: &HandlerRegistry,
    cancel: &CancellationToken,
) -> ReadOutcome
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => return ReadOutcome::Shutdown,

            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_text(&text, registry),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    // Pongs are answered by the protocol layer.
                    trace!("keepalive frame");
                }
                Some(Ok(Message::Close(_))) => {
                    return ReadOutcome::ConnectionLost(ClientError::ReceiveFailed(
                        "connection closed by peer".into(),
                    ));
                }
                // The bus is text-only; anything else is noise.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    return ReadOutcome::ConnectionLost(ClientError::ReceiveFailed(
                        e.to_string(),
                    ));
                }
                None => {
                    return ReadOutcome::ConnectionLost(ClientError::ReceiveFailed(
                        "stream ended".into(),
                    ));
                }
            },
        }
    }
}

fn handle_text(text: &str, registry: &HandlerRegistry) {
    match Envelope::decode(text) {
        Ok(envelope) => registry.dispatch(envelope),
        Err(e) => warn!(error = %e, "skipping malformed frame"),
    }
}
