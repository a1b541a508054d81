use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provenance attached to events by the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A pushed event from the realtime bus.
///
/// `data` stays a free-form mapping; its shape depends entirely on
/// `event_type` (a `state_changed` event carries old/new states, a
/// `call_service` event carries the service call, and so on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_fired: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

/// Payload of an `event` frame: `{"type":"event","id":n,"event":{...}}`.
///
/// Extract it from an [`Envelope`](crate::Envelope) with
/// `envelope.parse_payload::<EventFrame>()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: Event,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Envelope;

    const STATE_CHANGED: &str = r#"{
        "type": "event",
        "id": 11,
        "event": {
            "event_type": "state_changed",
            "data": {
                "entity_id": "light.kitchen",
                "new_state": {"state": "on"}
            },
            "origin": "LOCAL",
            "time_fired": "2026-08-01T18:23:05.346712+00:00",
            "context": {"id": "01J1ABCDEF", "parent_id": null, "user_id": null}
        }
    }"#;

    #[test]
    fn parse_state_changed_event() {
        let env = Envelope::decode(STATE_CHANGED).unwrap();
        assert_eq!(env.kind, "event");
        assert_eq!(env.id, Some(11));

        let frame: EventFrame = env.parse_payload().unwrap();
        assert_eq!(frame.event.event_type, "state_changed");
        assert_eq!(frame.event.origin, "LOCAL");
        assert_eq!(frame.event.data["entity_id"], "light.kitchen");
        assert!(frame.event.time_fired.is_some());
        assert_eq!(frame.event.context.unwrap().id, "01J1ABCDEF");
    }

    #[test]
    fn minimal_event_parses_with_defaults() {
        let event: Event =
            serde_json::from_str(r#"{"event_type":"homeassistant_started"}"#).unwrap();
        assert_eq!(event.event_type, "homeassistant_started");
        assert!(event.data.is_empty());
        assert!(event.origin.is_empty());
        assert!(event.time_fired.is_none());
        assert!(event.context.is_none());
    }

    #[test]
    fn context_omits_empty_optionals() {
        let ctx = Context {
            id: "ctx-1".into(),
            parent_id: None,
            user_id: None,
        };
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"id":"ctx-1"}"#);
    }
}
