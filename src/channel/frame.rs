//! Wire envelope shared by both directions of the channel.
//!
//! Every frame is a single JSON object `{"event": <name>, "data": <payload>}`.
//! Inbound frames are decoded in two steps so an unrecognised event name and a
//! malformed payload for a known event can be told apart.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChatError, Result};

pub const EVENT_MESSAGE: &str = "message";
pub const EVENT_STATE: &str = "state";
pub const EVENT_STATE_UPDATE_ACCURACY: &str = "stateUpdateAccuracy";
pub const EVENT_STATE_UPDATE_FEEDBACK: &str = "stateUpdateFeedback";

/// `type` value marking a transient status message.
pub const PROGRESS_TYPE: &str = "progress";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Payload of an inbound `message` event.
///
/// The assistant sends either a single `text` or a list of `lines`
/// (greetings and search answers); anything else is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl MessageEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn progress(text: impl Into<String>) -> Self {
        Self {
            kind: Some(PROGRESS_TYPE.to_string()),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn is_progress(&self) -> bool {
        self.kind.as_deref() == Some(PROGRESS_TYPE)
    }

    /// Display text: `text` if present, otherwise the joined `lines`.
    pub fn body(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.lines.join("\n"),
        }
    }
}

/// One `[value, score]` pair of a state event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePair(pub Value, pub f64);

impl StatePair {
    pub fn new(value: impl Into<Value>, score: f64) -> Self {
        Self(value.into(), score)
    }

    pub fn value_text(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn score(&self) -> f64 {
        self.1
    }
}

/// Categories keep the order they appear in the frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateEvent(pub IndexMap<String, Vec<StatePair>>);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyUpdate {
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Message(MessageEvent),
    State(StateEvent),
    StateUpdateAccuracy(AccuracyUpdate),
}

impl InboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::Message(_) => EVENT_MESSAGE,
            InboundEvent::State(_) => EVENT_STATE,
            InboundEvent::StateUpdateAccuracy(_) => EVENT_STATE_UPDATE_ACCURACY,
        }
    }

    pub fn from_raw(frame: RawFrame) -> Result<Self> {
        let RawFrame { event, data } = frame;
        let decoded = match event.as_str() {
            EVENT_MESSAGE => serde_json::from_value(data).map(InboundEvent::Message),
            EVENT_STATE => serde_json::from_value(data).map(InboundEvent::State),
            EVENT_STATE_UPDATE_ACCURACY => {
                serde_json::from_value(data).map(InboundEvent::StateUpdateAccuracy)
            }
            _ => return Err(ChatError::UnknownEvent(event)),
        };
        decoded.map_err(|source| ChatError::Decode { event, source })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundEvent {
    #[serde(rename = "message")]
    Message { query: String },
    #[serde(rename = "stateUpdateFeedback")]
    StateUpdateFeedback { positive: bool },
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Message { .. } => EVENT_MESSAGE,
            OutboundEvent::StateUpdateFeedback { .. } => EVENT_STATE_UPDATE_FEEDBACK,
        }
    }
}

pub fn decode_frame(line: &str) -> Result<InboundEvent> {
    let raw: RawFrame = serde_json::from_str(line).map_err(ChatError::Frame)?;
    InboundEvent::from_raw(raw)
}

pub fn encode_frame(event: &OutboundEvent) -> Result<String> {
    serde_json::to_string(event).map_err(ChatError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decode_text_message() {
        let event = decode_frame(r#"{"event":"message","data":{"text":"Hi there"}}"#).unwrap();
        assert_eq!(event, InboundEvent::Message(MessageEvent::text("Hi there")));
    }

    #[test]
    fn test_decode_lines_message_keeps_type_and_extra() {
        let line = r#"{"event":"message","data":{"type":"answer","lines":["Here are 2 flights:","LHR → JFK"],"id":7}}"#;
        let InboundEvent::Message(msg) = decode_frame(line).unwrap() else {
            panic!("Expected Message");
        };
        assert_eq!(msg.kind.as_deref(), Some("answer"));
        assert!(!msg.is_progress());
        assert_eq!(msg.body(), "Here are 2 flights:\nLHR → JFK");
        assert_eq!(msg.extra.get("id"), Some(&json!(7)));
    }

    #[test]
    fn test_decode_state_preserves_pair_order() {
        let line = r#"{"event":"state","data":{"origin":[["LHR",0.9],["LGW",0.05]]}}"#;
        let InboundEvent::State(state) = decode_frame(line).unwrap() else {
            panic!("Expected State");
        };
        let pairs = &state.0["origin"];
        assert_eq!(pairs[0].value_text(), "LHR");
        assert_eq!(pairs[1].value_text(), "LGW");
        assert_eq!(pairs[1].score(), 0.05);
    }

    #[test]
    fn test_decode_state_keeps_category_order() {
        let line = r#"{"event":"state","data":{"origin":[["LHR",0.91]],"destination":[["JFK",0.5]],"airline":[["BA",0.7]]}}"#;
        let InboundEvent::State(state) = decode_frame(line).unwrap() else {
            panic!("Expected State");
        };
        let keys: Vec<&str> = state.0.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["origin", "destination", "airline"]);
    }

    #[test]
    fn test_non_string_state_value_uses_json_text() {
        let pair = StatePair::new(json!(2), 0.5);
        assert_eq!(pair.value_text(), "2");
    }

    #[test]
    fn test_state_pair_missing_score_is_decode_error() {
        let err = decode_frame(r#"{"event":"state","data":{"origin":[["LHR"]]}}"#).unwrap_err();
        match err {
            ChatError::Decode { event, .. } => assert_eq!(event, "state"),
            other => panic!("Expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_accuracy() {
        let event =
            decode_frame(r#"{"event":"stateUpdateAccuracy","data":{"accuracy":0.75}}"#).unwrap();
        assert_eq!(
            event,
            InboundEvent::StateUpdateAccuracy(AccuracyUpdate { accuracy: 0.75 })
        );
    }

    #[test]
    fn test_unknown_event() {
        let err = decode_frame(r#"{"event":"my broadcast event","data":{}}"#).unwrap_err();
        assert!(matches!(err, ChatError::UnknownEvent(name) if name == "my broadcast event"));
    }

    #[test]
    fn test_not_json_is_frame_error() {
        assert!(matches!(decode_frame("hello"), Err(ChatError::Frame(_))));
    }

    #[test]
    fn test_encode_outbound() {
        let query = encode_frame(&OutboundEvent::Message {
            query: "LHR to JFK".into(),
        })
        .unwrap();
        assert_eq!(query, r#"{"event":"message","data":{"query":"LHR to JFK"}}"#);

        let feedback = encode_frame(&OutboundEvent::StateUpdateFeedback { positive: false }).unwrap();
        assert_eq!(
            feedback,
            r#"{"event":"stateUpdateFeedback","data":{"positive":false}}"#
        );
    }
}
