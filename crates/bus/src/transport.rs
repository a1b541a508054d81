//! WebSocket transport aliases and the single-shot dial.

use futures_util::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::error::ClientError;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
pub(crate) type WsSource = SplitStream<WsStream>;

/// Dials the hub endpoint once.
///
/// No retry here; that is the reconnection supervisor's job.
pub(crate) async fn open(endpoint: &str) -> Result<WsStream, ClientError> {
    debug!(%endpoint, "dialing hub");
    let (stream, _response) = connect_async(endpoint)
        .await
        .map_err(|e| ClientError::ConnectFailed(e.to_string()))?;
    Ok(stream)
}
