//! Handler registry and fan-out delivery of inbound envelopes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::trace;

use hearth_protocol::Envelope;

/// Callback registered for a message kind.
pub(crate) type MessageHandler = Arc<dyn Fn(Envelope) + Send + Sync>;

/// Maps message kinds to ordered handler lists.
///
/// Registration order is delivery order and duplicates are both kept.
/// Dispatch spawns one task per matched handler, so a slow or panicking
/// handler cannot stall frame reading or delivery to other handlers.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: Mutex<HashMap<String, Vec<MessageHandler>>>,
}

impl HandlerRegistry {
    /// Appends a handler to the list for `kind`.
    pub(crate) fn register(&self, kind: impl Into<String>, handler: MessageHandler) {
        let mut map = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(kind.into()).or_default().push(handler);
    }

    /// Delivers an envelope to every handler registered for its kind.
    ///
    /// Envelopes with no registered handler are dropped silently;
    /// unrecognized kinds are expected and harmless.
    pub(crate) fn dispatch(&self, envelope: Envelope) {
        let matched = {
            let map = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
            map.get(&envelope.kind).cloned()
        };

        let Some(matched) = matched else {
            trace!(kind = %envelope.kind, "no handlers registered, dropping frame");
            return;
        };

        for handler in matched {
            let frame = envelope.clone();
            tokio::spawn(async move {
                handler(frame);
            });
        }
    }
}
