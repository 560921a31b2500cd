//! The vision settings document exchanged with the vision service.
//!
//! Field names follow the service's JSON keys exactly, including the ones
//! containing spaces (`"pixel format"`, `"switched cameras"`, …).  Every key
//! is optional: the console never invents a value the operator did not enter,
//! so an absent field stays absent on save and the service applies its own
//! default.  Keys the console does not understand are kept in `extra` and
//! written back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// NetworkTables mode of the vision service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NtMode {
    Client,
    Server,
}

/// Complete vision configuration as owned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntmode: Option<NtMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<i64>,
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
    #[serde(rename = "switched cameras", default)]
    pub switched_cameras: Vec<SwitchedCameraConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VisionSettings {
    /// `true` unless the document explicitly selects server mode.
    pub fn is_client_mode(&self) -> bool {
        self.ntmode != Some(NtMode::Server)
    }
}

/// A single `{name, value}` device control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyKv {
    pub name: String,
    pub value: Value,
}

impl PropertyKv {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Find the value of the control called `name` in a property list.
pub fn property_value<'a>(properties: &'a [PropertyKv], name: &str) -> Option<&'a Value> {
    properties.iter().find(|p| p.name == name).map(|p| &p.value)
}

/// Value of an image control that may be numeric or a keyword such as
/// `"auto"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ControlValue {
    /// The keyword the service uses for automatic white balance / exposure.
    pub fn auto() -> Self {
        ControlValue::Text("auto".to_string())
    }

    /// Convert a raw JSON control value.  Returns `None` for values that
    /// cannot be expressed as a control (null, bool, arrays, objects).
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(ControlValue::Integer(i)),
                None => n.as_f64().map(ControlValue::Float),
            },
            Value::String(s) => Some(ControlValue::Text(s.clone())),
            _ => None,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, ControlValue::Text(s) if s == "auto")
    }
}

impl std::fmt::Display for ControlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlValue::Integer(i) => write!(f, "{i}"),
            ControlValue::Float(x) => write!(f, "{x}"),
            ControlValue::Text(s) => f.write_str(s),
        }
    }
}

/// Stream (MJPEG server) settings attached to a camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub properties: Vec<PropertyKv>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Configuration of one physical (USB) camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "pixel format", default, skip_serializing_if = "Option::is_none")]
    pub pixel_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<ControlValue>,
    #[serde(rename = "white balance", default, skip_serializing_if = "Option::is_none")]
    pub white_balance: Option<ControlValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<ControlValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyKv>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CameraConfig {
    /// A new camera entry pointing at `path`, everything else unset.
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Value of a stream property (`width`, `fps`, `compression`, …).
    pub fn stream_property(&self, name: &str) -> Option<&Value> {
        self.stream
            .as_ref()
            .and_then(|s| property_value(&s.properties, name))
    }
}

/// A virtual camera that re-points to a physical one selected by `key`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchedCameraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A USB camera currently enumerated by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedDevice {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "otherPaths", default)]
    pub other_paths: Vec<String>,
}

impl DetectedDevice {
    /// Primary path first, then every alternate path.
    pub fn candidate_paths(&self) -> Vec<String> {
        std::iter::once(self.path.clone())
            .chain(self.other_paths.iter().cloned())
            .collect()
    }
}

/// Per-client statistics for one MJPEG stream served by the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStats {
    #[serde(default)]
    pub source_id: Value,
    #[serde(default)]
    pub remote_ip: String,
    #[serde(default)]
    pub remote_port: u16,
    #[serde(default)]
    pub actual_fps: f64,
    /// Bytes per second.
    #[serde(default)]
    pub actual_data_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_keep_spaced_keys_and_unknown_fields() {
        let raw = json!({
            "team": 1234,
            "ntmode": "server",
            "cameras": [{"name": "front", "pixel format": "mjpeg", "white balance": "auto", "vendor": 7}],
            "switched cameras": [{"name": "sw", "key": "/sw/selected"}],
            "hostname": "frcvision"
        });
        let settings: VisionSettings = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(settings.team, Some(1234));
        assert!(!settings.is_client_mode());
        assert_eq!(settings.cameras[0].pixel_format.as_deref(), Some("mjpeg"));
        assert!(settings.cameras[0].white_balance.as_ref().unwrap().is_auto());
        assert_eq!(settings.cameras[0].extra["vendor"], json!(7));
        assert_eq!(settings.switched_cameras[0].key.as_deref(), Some("/sw/selected"));

        let back = serde_json::to_value(&settings).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn unset_camera_fields_are_not_serialized() {
        let camera = CameraConfig::with_path("/dev/video0");
        let json = serde_json::to_value(&camera).unwrap();
        assert_eq!(json, json!({"path": "/dev/video0"}));
    }

    #[test]
    fn control_value_accepts_numbers_and_keywords() {
        assert_eq!(ControlValue::from_json(&json!(40)), Some(ControlValue::Integer(40)));
        assert_eq!(ControlValue::from_json(&json!(2.5)), Some(ControlValue::Float(2.5)));
        assert!(ControlValue::from_json(&json!("auto")).unwrap().is_auto());
        assert_eq!(ControlValue::from_json(&json!(true)), None);
        assert_eq!(ControlValue::Integer(4500).to_string(), "4500");
    }

    #[test]
    fn detected_device_candidates_start_with_primary_path() {
        let device: DetectedDevice = serde_json::from_value(json!({
            "name": "HD Webcam",
            "path": "/dev/video0",
            "otherPaths": ["/dev/v4l/by-id/usb-hd-video-index0"]
        }))
        .unwrap();
        assert_eq!(
            device.candidate_paths(),
            vec!["/dev/video0", "/dev/v4l/by-id/usb-hd-video-index0"]
        );
    }

    #[test]
    fn stream_property_lookup_by_name() {
        let camera = CameraConfig {
            stream: Some(StreamConfig {
                properties: vec![PropertyKv::new("fps", 15), PropertyKv::new("width", 320)],
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(camera.stream_property("width"), Some(&json!(320)));
        assert_eq!(camera.stream_property("compression"), None);
    }
}
