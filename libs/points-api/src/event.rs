use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PointsError;

/// Result of one scoring computation: named integer scores, published
/// downstream under the record's decoded string key.
pub type ScoreResult = HashMap<String, i64>;

/// Decoded record value.
///
/// `user_id`, `ex_id` and `label` are required — they identify which
/// prior state the message builds on. Everything else in the document is
/// collected into `payload` and handed to the scoring model untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsEvent {
    pub user_id: i64,
    pub ex_id: i64,
    pub label: String,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl PointsEvent {
    /// Decode a raw record value. Missing required fields or malformed
    /// JSON is a `Decode` error.
    pub fn decode(raw: &[u8]) -> Result<Self, PointsError> {
        serde_json::from_slice(raw)
            .map_err(|e| PointsError::decode(format!("record value: {e}")))
    }

    /// History key for this event. Deterministic — every message with
    /// the same user/exercise/label triple threads through the same
    /// stored state.
    pub fn history_key(&self) -> String {
        format!("{}|{}|{}", self.user_id, self.ex_id, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_and_derive_history_key() {
        let event =
            PointsEvent::decode(br#"{"user_id":42,"ex_id":7,"label":"A","reps":12}"#).unwrap();
        assert_eq!(event.history_key(), "42|7|A");
        assert_eq!(event.payload.get("reps"), Some(&serde_json::json!(12)));
    }

    #[test]
    fn missing_required_field_is_decode_error() {
        let err = PointsEvent::decode(br#"{"user_id":42,"label":"A"}"#).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Decode);
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = PointsEvent::decode(b"not json").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Decode);
    }
}
