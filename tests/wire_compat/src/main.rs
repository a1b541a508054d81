fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use hearth_protocol::constants::*;
    use hearth_protocol::{Envelope, EventFrame};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Decodes a fixture as an envelope, re-encodes it, and compares the
    /// JSON values. Payload fields are passthrough, so the roundtrip must
    /// preserve every field the hub sent, including ones the client does
    /// not model.
    fn envelope_roundtrip(name: &str) -> Envelope {
        let fixture = load_fixture(name);
        let envelope = Envelope::decode(&fixture.to_string())
            .unwrap_or_else(|e| panic!("failed to decode fixture {name}: {e}"));
        let encoded: serde_json::Value = serde_json::from_str(&envelope.encode().unwrap())
            .unwrap_or_else(|e| panic!("failed to re-encode fixture {name}: {e}"));
        assert_eq!(encoded, fixture, "roundtrip mismatch for {name}");
        envelope
    }

    #[test]
    fn auth_frame() {
        let envelope = envelope_roundtrip("auth.json");
        assert_eq!(envelope.kind, KIND_AUTH);
        assert!(envelope.id.is_none(), "auth carries no command ID");
        assert!(envelope.field("access_token").is_some());
    }

    #[test]
    fn auth_ok_frame() {
        let envelope = envelope_roundtrip("auth_ok.json");
        assert_eq!(envelope.kind, KIND_AUTH_OK);
    }

    #[test]
    fn auth_invalid_frame() {
        let envelope = envelope_roundtrip("auth_invalid.json");
        assert_eq!(envelope.kind, KIND_AUTH_INVALID);
        assert_eq!(
            envelope.field("message").and_then(|v| v.as_str()),
            Some("Invalid access token")
        );
    }

    #[test]
    fn subscribe_events_frame() {
        let envelope = envelope_roundtrip("subscribe_events.json");
        assert_eq!(envelope.kind, KIND_SUBSCRIBE_EVENTS);
        assert_eq!(envelope.id, Some(18));
        assert_eq!(
            envelope.field("event_type").and_then(|v| v.as_str()),
            Some("state_changed")
        );
    }

    #[test]
    fn unsubscribe_events_frame() {
        let envelope = envelope_roundtrip("unsubscribe_events.json");
        assert_eq!(envelope.kind, KIND_UNSUBSCRIBE_EVENTS);
        assert_eq!(envelope.id, Some(19));
        assert_eq!(
            envelope.field("subscription").and_then(|v| v.as_u64()),
            Some(18)
        );
    }

    #[test]
    fn result_frame() {
        let envelope = envelope_roundtrip("result.json");
        assert_eq!(envelope.kind, KIND_RESULT);
        assert_eq!(envelope.id, Some(18));
        assert_eq!(
            envelope.field("success").and_then(|v| v.as_bool()),
            Some(true)
        );
    }

    #[test]
    fn event_frame_roundtrips_as_envelope() {
        let envelope = envelope_roundtrip("event_state_changed.json");
        assert_eq!(envelope.kind, KIND_EVENT);
        assert_eq!(envelope.id, Some(18));
    }

    #[test]
    fn event_frame_parses_into_the_typed_model() {
        let fixture = load_fixture("event_state_changed.json");
        let frame: EventFrame = serde_json::from_value(fixture).unwrap();

        let event = frame.event;
        assert_eq!(event.event_type, "state_changed");
        assert_eq!(event.origin, "LOCAL");
        assert_eq!(event.data["entity_id"], "light.kitchen");
        assert_eq!(event.data["new_state"]["state"], "on");

        let fired = event.time_fired.expect("time_fired present");
        assert_eq!(fired.timestamp(), 1785608588);

        let context = event.context.expect("context present");
        assert_eq!(context.id, "01J4R8Y0M3T5C8Z9Q2W1X0V7N6");
        assert_eq!(context.parent_id, None);
        assert_eq!(
            context.user_id.as_deref(),
            Some("9c5bd63de8e44eb8b4f728cd62a90b22")
        );
    }

    #[test]
    fn typed_event_survives_the_envelope_payload() {
        let envelope = envelope_roundtrip("event_state_changed.json");
        let frame: EventFrame = envelope.parse_payload().unwrap();
        assert_eq!(frame.event.event_type, "state_changed");
    }
}
