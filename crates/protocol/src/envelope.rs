use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Failure to decode an inbound frame.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame has no string `type` field")]
    MissingKind,
}

/// Envelope for every frame on the realtime bus.
///
/// The wire shape is a flat JSON object: a mandatory `type` tag, an
/// optional numeric `id` (present on command/response pairs, absent on
/// the auth exchange), and arbitrary remaining fields captured via
/// `#[serde(flatten)]`. Payload shape is not validated beyond that;
/// downstream consumers interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    /// Creates an envelope with no correlation ID and an empty payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            payload: Map::new(),
        }
    }

    /// Sets the correlation ID.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds one payload field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole payload mapping.
    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Returns a payload field, if present.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Serializes the envelope to its wire text.
    ///
    /// Cannot fail for well-formed envelopes (string keys, tree-shaped
    /// values); the `Result` only surfaces serializer edge cases.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses wire text into an envelope.
    ///
    /// Fails if the text is not valid JSON or lacks a string `type`
    /// field. Payload fields pass through uninterpreted.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.get("type").is_some_and(Value::is_string) {
            return Err(DecodeError::MissingKind);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Deserializes the payload mapping into a typed view.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.payload.clone()))
    }
}
