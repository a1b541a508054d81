//! Connection lifetime task and the bounded-retry supervisor.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tracing::{error, info, warn};

use crate::client::Shared;
use crate::error::ClientError;
use crate::handshake;
use crate::read::{self, ReadOutcome};
use crate::transport::{self, WsSource, WsStream};
use crate::types::ConnectionState;

/// Owns the read half for as long as the client lives. Runs the receive
/// loop, and on transport loss hands control to the supervisor until it
/// either produces a fresh connection or exhausts the retry budget.
pub(crate) async fn run_connection(shared: Arc<Shared>, mut source: WsSource) {
    loop {
        match read::read_frames(&mut source, &shared.registry, &shared.cancel).await {
            ReadOutcome::Shutdown => return,
            ReadOutcome::ConnectionLost(err) => {
                if shared.cancel.is_cancelled() {
                    return;
                }
                warn!(error = %err, "connection lost");
                shared.drop_writer().await;
                match supervise(&shared).await {
                    Some(next) => source = next,
                    None => return,
                }
            }
        }
    }
}

/// Retries with linear backoff until a connection is re-established or
/// the budget runs out. Exhaustion closes the client.
async fn supervise(shared: &Arc<Shared>) -> Option<WsSource> {
    let max = shared.retry.max_attempts;
    for attempt in 1..=max {
        shared.set_state(ConnectionState::Reconnecting { attempt });

        let delay = shared.retry.delay_for_attempt(attempt);
        tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        // Racing the attempt against cancellation drops any in-flight
        // dial or handshake, which closes its socket.
        let outcome = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => return None,
            outcome = establish(shared) => outcome,
        };

        match outcome {
            Ok(stream) => {
                let (sink, source) = stream.split();
                match shared.install_writer(sink).await {
                    Ok(()) => {
                        shared.set_state(ConnectionState::Connected);
                        info!(attempt, "reconnected");
                        shared.replay_subscriptions().await;
                        return Some(source);
                    }
                    Err(mut sink) => {
                        // Closed out from under us after the handshake;
                        // the fresh transport must not outlive the client.
                        let _ = sink.close().await;
                        return None;
                    }
                }
            }
            Err(e) => warn!(attempt, max, error = %e, "reconnect attempt failed"),
        }
    }

    error!("{}", ClientError::ReconnectExhausted(max));
    shared.set_state(ConnectionState::Closed);
    None
}

/// One dial-and-authenticate attempt.
async fn establish(shared: &Arc<Shared>) -> Result<WsStream, ClientError> {
    let mut stream = transport::open(&shared.endpoint).await?;
    if let Err(e) = handshake::authenticate(&mut stream, &shared.access_token).await {
        let _ = stream.close(None).await;
        return Err(e);
    }
    Ok(stream)
}
