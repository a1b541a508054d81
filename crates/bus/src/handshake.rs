//! Authentication handshake, performed before any other traffic.

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::debug;

use hearth_protocol::Envelope;
use hearth_protocol::constants::{KIND_AUTH, KIND_AUTH_OK};

use crate::error::ClientError;

/// Runs the auth exchange on a freshly opened socket.
///
/// Sends the credential frame, then reads until one decisive data frame
/// arrives. Anything other than the success tag fails the handshake;
/// control frames in between are tolerated and skipped.
pub(crate) async fn authenticate<S>(socket: &mut S, access_token: &str) -> Result<(), ClientError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin,
{
    // The auth frame is the only command sent without a correlation ID.
    let auth = Envelope::new(KIND_AUTH).with_field("access_token", access_token);
    let text = auth
        .encode()
        .map_err(|e| ClientError::AuthenticationFailed(e.to_string()))?;
    socket
        .send(Message::Text(text.into()))
        .await
        .map_err(|e| ClientError::AuthenticationFailed(e.to_string()))?;

    loop {
        return match socket.next().await {
            Some(Ok(Message::Text(text))) => {
                // During the handshake even a decode failure is an auth
                // failure; nothing else may consume this frame.
                let reply = Envelope::decode(&text)
                    .map_err(|e| ClientError::AuthenticationFailed(e.to_string()))?;
                if reply.kind == KIND_AUTH_OK {
                    debug!("hub accepted credentials");
                    Ok(())
                } else {
                    Err(ClientError::AuthenticationFailed(rejection_reason(&reply)))
                }
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(frame)) => Err(ClientError::AuthenticationFailed(format!(
                "unexpected {} frame during handshake",
                frame_name(&frame)
            ))),
            Some(Err(e)) => Err(ClientError::AuthenticationFailed(e.to_string())),
            None => Err(ClientError::AuthenticationFailed(
                "connection closed during handshake".into(),
            )),
        };
    }
}

/// Folds the server's reply into a displayable reason, preferring its
/// own `message` text when present.
fn rejection_reason(reply: &Envelope) -> String {
    match reply.field("message").and_then(|v| v.as_str()) {
        Some(message) => format!("{}: {}", reply.kind, message),
        None => format!("hub replied `{}`", reply.kind),
    }
}

fn frame_name(frame: &Message) -> &'static str {
    match frame {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "raw",
    }
}
