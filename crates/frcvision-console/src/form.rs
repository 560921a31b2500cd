//! The editable form: every control the operator can type into, as text.
//!
//! A [`SettingsForm`] is what a view binds its input fields to.  It is
//! projected from the display document when settings are rendered and read
//! back into the document on save, where the text is coerced to the
//! document's types.

use frcvision_types::{
    CameraConfig, ControlValue, NtMode, PropertyKv, StreamConfig, SwitchedCameraConfig,
    VisionSettings,
};
use serde_json::Value;

/// Names accepted by [`CameraForm::field_mut`].
pub const CAMERA_FIELDS: [&str; 15] = [
    "name",
    "path",
    "pixel-format",
    "width",
    "height",
    "fps",
    "brightness",
    "white-balance",
    "exposure",
    "properties",
    "stream-width",
    "stream-height",
    "stream-fps",
    "stream-compression",
    "stream-default-compression",
];

/// Names accepted by [`SwitchedCameraForm::field_mut`].
pub const SWITCHED_CAMERA_FIELDS: [&str; 2] = ["name", "key"];

/// Leading-integer parse: optional whitespace and sign, then as many digits
/// as are present (`"640px"` is 640).  `None` when no digit leads.
pub fn parse_int(text: &str) -> Option<i64> {
    let t = text.trim_start();
    let (negative, digits) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Blank → unset, integer → number, anything else kept as text (`auto`).
fn parse_control(text: &str) -> Option<ControlValue> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    Some(match parse_int(t) {
        Some(i) => ControlValue::Integer(i),
        None => ControlValue::Text(t.to_string()),
    })
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn opt_text<T: ToString>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Form fields of one camera.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraForm {
    pub name: String,
    pub path: String,
    pub pixel_format: String,
    pub width: String,
    pub height: String,
    pub fps: String,
    pub brightness: String,
    pub white_balance: String,
    pub exposure: String,
    /// JSON text of the `properties` list.
    pub properties: String,
    pub stream_width: String,
    pub stream_height: String,
    pub stream_fps: String,
    pub stream_compression: String,
    pub stream_default_compression: String,
}

impl CameraForm {
    pub fn from_camera(camera: &CameraConfig) -> Self {
        let properties = camera
            .properties
            .as_ref()
            .and_then(|p| serde_json::to_string(p).ok())
            .unwrap_or_default();
        Self {
            name: camera.name.clone().unwrap_or_default(),
            path: camera.path.clone().unwrap_or_default(),
            pixel_format: camera.pixel_format.clone().unwrap_or_default(),
            width: opt_text(camera.width.as_ref()),
            height: opt_text(camera.height.as_ref()),
            fps: opt_text(camera.fps.as_ref()),
            brightness: opt_text(camera.brightness.as_ref()),
            white_balance: opt_text(camera.white_balance.as_ref()),
            exposure: opt_text(camera.exposure.as_ref()),
            properties,
            stream_width: value_text(camera.stream_property("width")),
            stream_height: value_text(camera.stream_property("height")),
            stream_fps: value_text(camera.stream_property("fps")),
            stream_compression: value_text(camera.stream_property("compression")),
            stream_default_compression: value_text(camera.stream_property("default_compression")),
        }
    }

    /// Bind a named field.  See [`CAMERA_FIELDS`].
    pub fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        Some(match name {
            "name" => &mut self.name,
            "path" => &mut self.path,
            "pixel-format" => &mut self.pixel_format,
            "width" => &mut self.width,
            "height" => &mut self.height,
            "fps" => &mut self.fps,
            "brightness" => &mut self.brightness,
            "white-balance" => &mut self.white_balance,
            "exposure" => &mut self.exposure,
            "properties" => &mut self.properties,
            "stream-width" => &mut self.stream_width,
            "stream-height" => &mut self.stream_height,
            "stream-fps" => &mut self.stream_fps,
            "stream-compression" => &mut self.stream_compression,
            "stream-default-compression" => &mut self.stream_default_compression,
            _ => return None,
        })
    }

    /// Write the form back into `camera`.
    ///
    /// Unparseable numeric fields and invalid `properties` JSON remove the
    /// corresponding key; the stream section is rebuilt from scratch.
    pub fn apply_to(&self, camera: &mut CameraConfig) {
        camera.name = Some(self.name.clone());
        camera.path = Some(self.path.clone());
        camera.pixel_format = Some(self.pixel_format.clone());
        camera.width = parse_int(&self.width);
        camera.height = parse_int(&self.height);
        camera.fps = parse_int(&self.fps);
        camera.brightness = parse_control(&self.brightness);
        camera.white_balance = parse_control(&self.white_balance);
        camera.exposure = parse_control(&self.exposure);
        camera.properties = serde_json::from_str::<Vec<PropertyKv>>(&self.properties).ok();

        let stream_fields = [
            ("width", &self.stream_width),
            ("height", &self.stream_height),
            ("fps", &self.stream_fps),
            ("compression", &self.stream_compression),
            ("default_compression", &self.stream_default_compression),
        ];
        let properties = stream_fields
            .into_iter()
            .filter_map(|(name, text)| parse_int(text).map(|v| PropertyKv::new(name, v)))
            .collect();
        camera.stream = Some(StreamConfig {
            properties,
            ..Default::default()
        });
    }
}

/// Form fields of one switched camera.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchedCameraForm {
    pub name: String,
    pub key: String,
}

impl SwitchedCameraForm {
    pub fn from_switched(camera: &SwitchedCameraConfig) -> Self {
        Self {
            name: camera.name.clone().unwrap_or_default(),
            key: camera.key.clone().unwrap_or_default(),
        }
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "name" => Some(&mut self.name),
            "key" => Some(&mut self.key),
            _ => None,
        }
    }

    pub fn apply_to(&self, camera: &mut SwitchedCameraConfig) {
        camera.name = Some(self.name.clone());
        camera.key = Some(self.key.clone());
    }
}

/// The whole settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    /// NetworkTables client mode toggle; off means server mode.
    pub client_mode: bool,
    pub team: String,
    pub cameras: Vec<CameraForm>,
    pub switched_cameras: Vec<SwitchedCameraForm>,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            client_mode: true,
            team: String::new(),
            cameras: Vec::new(),
            switched_cameras: Vec::new(),
        }
    }
}

impl SettingsForm {
    pub fn from_settings(settings: &VisionSettings) -> Self {
        Self {
            client_mode: settings.is_client_mode(),
            team: opt_text(settings.team.as_ref()),
            cameras: settings.cameras.iter().map(CameraForm::from_camera).collect(),
            switched_cameras: settings
                .switched_cameras
                .iter()
                .map(SwitchedCameraForm::from_switched)
                .collect(),
        }
    }

    /// Write the form into `settings`.  Entries are matched by index.
    pub fn apply_to(&self, settings: &mut VisionSettings) {
        settings.ntmode = Some(if self.client_mode {
            NtMode::Client
        } else {
            NtMode::Server
        });
        settings.team = parse_int(&self.team);
        for (camera, form) in settings.cameras.iter_mut().zip(&self.cameras) {
            form.apply_to(camera);
        }
        for (camera, form) in settings
            .switched_cameras
            .iter_mut()
            .zip(&self.switched_cameras)
        {
            form.apply_to(camera);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_int_follows_leading_digits() {
        assert_eq!(parse_int("640"), Some(640));
        assert_eq!(parse_int("  -5"), Some(-5));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("320px"), Some(320));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("auto"), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn blank_width_removes_key() {
        let mut camera = CameraConfig {
            width: Some(640),
            ..Default::default()
        };
        let mut form = CameraForm::from_camera(&camera);
        form.width.clear();
        form.apply_to(&mut camera);

        let json = serde_json::to_value(&camera).unwrap();
        assert!(json.get("width").is_none(), "width must be removed, got {json}");
    }

    #[test]
    fn non_numeric_fields_are_dropped_but_keywords_kept() {
        let mut camera = CameraConfig::default();
        let form = CameraForm {
            height: "tall".to_string(),
            fps: "30".to_string(),
            brightness: "".to_string(),
            white_balance: "auto".to_string(),
            exposure: "50".to_string(),
            ..Default::default()
        };
        form.apply_to(&mut camera);
        assert_eq!(camera.height, None);
        assert_eq!(camera.fps, Some(30));
        assert_eq!(camera.brightness, None);
        assert_eq!(camera.white_balance, Some(ControlValue::auto()));
        assert_eq!(camera.exposure, Some(ControlValue::Integer(50)));
    }

    #[test]
    fn invalid_properties_json_drops_the_key() {
        let mut camera = CameraConfig {
            properties: Some(vec![PropertyKv::new("contrast", 10)]),
            ..Default::default()
        };
        let mut form = CameraForm::from_camera(&camera);
        assert_eq!(form.properties, r#"[{"name":"contrast","value":10}]"#);

        form.properties = "[{broken".to_string();
        form.apply_to(&mut camera);
        assert_eq!(camera.properties, None);
    }

    #[test]
    fn stream_properties_rebuilt_from_present_fields() {
        let mut camera = CameraConfig::default();
        let form = CameraForm {
            stream_width: "320".to_string(),
            stream_fps: "15".to_string(),
            stream_compression: "".to_string(),
            stream_default_compression: "x".to_string(),
            ..Default::default()
        };
        form.apply_to(&mut camera);
        assert_eq!(
            serde_json::to_value(camera.stream.unwrap()).unwrap(),
            json!({"properties": [{"name": "width", "value": 320}, {"name": "fps", "value": 15}]})
        );
    }

    #[test]
    fn projection_renders_stream_and_controls_as_text() {
        let camera: CameraConfig = serde_json::from_value(json!({
            "name": "front",
            "width": 320,
            "white balance": "auto",
            "stream": {"properties": [{"name": "compression", "value": 30}]}
        }))
        .unwrap();
        let form = CameraForm::from_camera(&camera);
        assert_eq!(form.name, "front");
        assert_eq!(form.width, "320");
        assert_eq!(form.white_balance, "auto");
        assert_eq!(form.stream_compression, "30");
        assert_eq!(form.stream_width, "");
        assert_eq!(form.properties, "");
    }

    #[test]
    fn field_binding_by_name() {
        let mut form = CameraForm::default();
        for name in CAMERA_FIELDS {
            assert!(form.field_mut(name).is_some(), "{name} must be bindable");
        }
        *form.field_mut("pixel-format").unwrap() = "yuyv".to_string();
        assert_eq!(form.pixel_format, "yuyv");
        assert!(form.field_mut("colour").is_none());

        let mut switched = SwitchedCameraForm::default();
        *switched.field_mut("key").unwrap() = "/sw".to_string();
        assert_eq!(switched.key, "/sw");
    }

    #[test]
    fn settings_form_writes_mode_and_team() {
        let mut settings = VisionSettings {
            team: Some(1),
            switched_cameras: vec![SwitchedCameraConfig::default()],
            ..Default::default()
        };
        let mut form = SettingsForm::from_settings(&settings);
        assert!(form.client_mode);
        form.client_mode = false;
        form.team = "not a team".to_string();
        form.switched_cameras[0].name = "driver".to_string();
        form.apply_to(&mut settings);

        assert_eq!(settings.ntmode, Some(NtMode::Server));
        assert_eq!(settings.team, None);
        assert_eq!(settings.switched_cameras[0].name.as_deref(), Some("driver"));
    }
}
