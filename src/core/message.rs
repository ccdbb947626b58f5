//! Chat message type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message as stored in its record.
///
/// Field names on the wire are `senderId`, `message` and `timestamp`, the
/// last one an RFC 3339 instant in UTC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Nickname of the author.
    #[serde(rename = "senderId")]
    pub sender: String,

    /// Message text. May be empty.
    #[serde(rename = "message")]
    pub body: String,

    /// When the server accepted the message.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current server time.
    #[must_use]
    pub fn new(sender: &str, body: &str) -> Self {
        Self {
            sender: sender.to_string(),
            body: body.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_stamps_current_time() {
        let before = Utc::now();
        let message = Message::new("anon1234", "hello");
        let after = Utc::now();

        assert!(message.timestamp >= before && message.timestamp <= after);
        assert_eq!(message.sender, "anon1234");
        assert_eq!(message.body, "hello");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let message = Message {
            sender: "anonabcd".to_string(),
            body: "hi".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["senderId"], "anonabcd");
        assert_eq!(json["message"], "hi");
        assert_eq!(json["timestamp"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn parses_iso_instants() {
        let json = r#"{"senderId":"a","message":"b","timestamp":"2024-05-01T12:30:00.123Z"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.timestamp.timestamp_subsec_millis(), 123);
    }
}
