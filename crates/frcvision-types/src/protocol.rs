//! Wire protocol spoken over the `frcvision` WebSocket subprotocol.
//!
//! Every frame is a JSON object tagged by its `type` field.  Inbound frames
//! decode into [`InboundMessage`]; the console matches on it exhaustively, so
//! adding a server message kind is a compile error until it is handled.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::settings::{DetectedDevice, StreamStats, VisionSettings};

/// WebSocket subprotocol identifying console connections.
pub const SUBPROTOCOL: &str = "frcvision";

/// Messages pushed by the vision service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Source enumeration; informational only.
    SourceList {
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
    ServerStreams {
        #[serde(default)]
        streams: Vec<StreamStats>,
    },
    UsbCameraList {
        #[serde(default)]
        cameras: Vec<DetectedDevice>,
    },
    /// Named system metrics (memory, CPU, network).
    SystemStatus {
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    VisionStatus {
        #[serde(default)]
        vision_service_status: Option<String>,
        #[serde(default)]
        vision_service_enabled: bool,
    },
    VisionSettings { settings: VisionSettings },
    Status {
        #[serde(default)]
        message: String,
    },
}

impl InboundMessage {
    /// Decode one text frame.
    ///
    /// Returns `None` for anything that is not a usable message: invalid
    /// JSON, `null`, a payload without a string `type`, an unknown `type`, or
    /// a known `type` whose fields do not match.  None of these are errors.
    pub fn decode(text: &str) -> Option<Self> {
        let value: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "dropping unparseable frame");
                return None;
            }
        };
        let kind = value.get("type").and_then(Value::as_str)?.to_string();
        match serde_json::from_value(value) {
            Ok(msg) => Some(msg),
            Err(e) => {
                debug!(kind = %kind, error = %e, "dropping unrecognised frame");
                None
            }
        }
    }

    /// The `type` tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::SourceList { .. } => "sourceList",
            InboundMessage::ServerStreams { .. } => "serverStreams",
            InboundMessage::UsbCameraList { .. } => "usbCameraList",
            InboundMessage::SystemStatus { .. } => "systemStatus",
            InboundMessage::VisionStatus { .. } => "visionStatus",
            InboundMessage::VisionSettings { .. } => "visionSettings",
            InboundMessage::Status { .. } => "status",
        }
    }
}

/// Messages sent by the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    GetSourceList,
    /// Subscribe to `serverStreams` pushes every `period` seconds.
    GetServerStreamsPeriodic { period: f64 },
    VisionSave { settings: VisionSettings },
}

impl OutboundMessage {
    /// Serialise to a JSON text frame.
    pub fn encode(&self) -> Result<String, crate::VisionError> {
        serde_json::to_string(self).map_err(|e| crate::VisionError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_drops_null_and_garbage() {
        assert_eq!(InboundMessage::decode("null"), None);
        assert_eq!(InboundMessage::decode("{not json"), None);
        assert_eq!(InboundMessage::decode(r#"{"message":"no type"}"#), None);
        assert_eq!(InboundMessage::decode(r#"{"type":"futureThing","x":1}"#), None);
    }

    #[test]
    fn decode_vision_status() {
        let msg = InboundMessage::decode(
            r#"{"type":"visionStatus","visionServiceStatus":"up (pid 123)","visionServiceEnabled":true}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            InboundMessage::VisionStatus {
                vision_service_status: Some("up (pid 123)".to_string()),
                vision_service_enabled: true,
            }
        );
        assert_eq!(msg.kind(), "visionStatus");
    }

    #[test]
    fn decode_system_status_collects_named_fields() {
        let msg = InboundMessage::decode(
            r#"{"type":"systemStatus","systemMemoryFree1s":"512","systemCpuUser1s":3.5}"#,
        )
        .unwrap();
        let InboundMessage::SystemStatus { fields } = msg else {
            panic!("expected SystemStatus");
        };
        assert_eq!(fields["systemMemoryFree1s"], json!("512"));
        assert_eq!(fields["systemCpuUser1s"], json!(3.5));
        assert!(!fields.contains_key("type"));
    }

    #[test]
    fn decode_usb_camera_list_and_settings() {
        let msg = InboundMessage::decode(
            r#"{"type":"usbCameraList","cameras":[{"name":"cam","path":"/dev/video0","otherPaths":[]}]}"#,
        )
        .unwrap();
        assert!(matches!(msg, InboundMessage::UsbCameraList { ref cameras } if cameras.len() == 1));

        let msg = InboundMessage::decode(
            r#"{"type":"visionSettings","settings":{"team":294,"cameras":[],"switched cameras":[]}}"#,
        )
        .unwrap();
        let InboundMessage::VisionSettings { settings } = msg else {
            panic!("expected VisionSettings");
        };
        assert_eq!(settings.team, Some(294));
    }

    #[test]
    fn outbound_frames_match_wire_shape() {
        assert_eq!(
            serde_json::to_value(OutboundMessage::GetSourceList).unwrap(),
            json!({"type": "getSourceList"})
        );
        assert_eq!(
            serde_json::to_value(OutboundMessage::GetServerStreamsPeriodic { period: 1.0 }).unwrap(),
            json!({"type": "getServerStreamsPeriodic", "period": 1.0})
        );
        let save = OutboundMessage::VisionSave {
            settings: VisionSettings {
                team: Some(1),
                ..Default::default()
            },
        };
        assert_eq!(
            serde_json::to_value(save).unwrap(),
            json!({"type": "visionSave", "settings": {"team": 1, "cameras": [], "switched cameras": []}})
        );
    }
}
