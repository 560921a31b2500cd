//! Two-document settings model.
//!
//! The *server* document is the last configuration pushed by the vision
//! service; the *display* document is the operator's work in progress.  The
//! display document is always an independent deep copy, so edits never leak
//! into the server copy and [`SettingsModel::discard`] can restore it.

use frcvision_types::{
    CameraConfig, OutboundMessage, SwitchedCameraConfig, VisionError, VisionSettings,
};
use serde_json::Value;
use tracing::debug;

use crate::form::SettingsForm;
use crate::normalize::normalize_camera;

#[derive(Debug, Clone, Default)]
pub struct SettingsModel {
    server: VisionSettings,
    display: VisionSettings,
}

impl SettingsModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the server document; the display document becomes a fresh
    /// copy of it and any unsaved edits are lost.
    pub fn load_from_server(&mut self, settings: VisionSettings) {
        debug!(
            cameras = settings.cameras.len(),
            switched = settings.switched_cameras.len(),
            "settings loaded from server"
        );
        self.display = settings.clone();
        self.server = settings;
    }

    /// Throw away unsaved edits.
    pub fn discard(&mut self) {
        self.display = self.server.clone();
    }

    pub fn server(&self) -> &VisionSettings {
        &self.server
    }

    pub fn display(&self) -> &VisionSettings {
        &self.display
    }

    pub fn camera(&self, index: usize) -> Result<&CameraConfig, VisionError> {
        self.display
            .cameras
            .get(index)
            .ok_or(VisionError::InvalidCameraIndex(index))
    }

    /// Append a camera to the display document and return its index.
    pub fn add_camera(&mut self, camera: CameraConfig) -> usize {
        self.display.cameras.push(camera);
        self.display.cameras.len() - 1
    }

    pub fn remove_camera(&mut self, index: usize) -> Result<CameraConfig, VisionError> {
        if index >= self.display.cameras.len() {
            return Err(VisionError::InvalidCameraIndex(index));
        }
        Ok(self.display.cameras.remove(index))
    }

    /// Append an empty switched camera and return its index.
    pub fn add_switched_camera(&mut self) -> usize {
        self.display
            .switched_cameras
            .push(SwitchedCameraConfig::default());
        self.display.switched_cameras.len() - 1
    }

    pub fn remove_switched_camera(
        &mut self,
        index: usize,
    ) -> Result<SwitchedCameraConfig, VisionError> {
        if index >= self.display.switched_cameras.len() {
            return Err(VisionError::InvalidCameraIndex(index));
        }
        Ok(self.display.switched_cameras.remove(index))
    }

    /// Point camera `index` at a different device path.
    pub fn set_camera_path(&mut self, index: usize, path: &str) -> Result<(), VisionError> {
        let camera = self
            .display
            .cameras
            .get_mut(index)
            .ok_or(VisionError::InvalidCameraIndex(index))?;
        camera.path = Some(path.to_string());
        Ok(())
    }

    /// Replace display camera `index` with the canonical form of a raw
    /// camera configuration (a `config.json` file or live peer config).
    ///
    /// # Errors
    ///
    /// [`VisionError::InvalidCameraIndex`] when no such camera exists, and
    /// [`VisionError::Serialization`] when `raw` is not a camera object.
    pub fn normalize_camera_properties(
        &mut self,
        index: usize,
        raw: Value,
    ) -> Result<&CameraConfig, VisionError> {
        let slot = self
            .display
            .cameras
            .get_mut(index)
            .ok_or(VisionError::InvalidCameraIndex(index))?;
        let data: CameraConfig = serde_json::from_value(raw)?;
        *slot = normalize_camera(data, slot);
        Ok(slot)
    }

    /// Project the operator's form into the display document.
    pub fn apply_form(&mut self, form: &SettingsForm) {
        form.apply_to(&mut self.display);
    }

    /// The message that pushes the display document to the service.
    pub fn save_message(&self) -> OutboundMessage {
        OutboundMessage::VisionSave {
            settings: self.display.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frcvision_types::ControlValue;
    use serde_json::json;

    fn sample() -> VisionSettings {
        serde_json::from_value(json!({
            "team": 294,
            "ntmode": "client",
            "cameras": [{"name": "front", "path": "/dev/video0", "width": 640}],
            "switched cameras": [{"name": "driver", "key": "/cam"}]
        }))
        .unwrap()
    }

    #[test]
    fn display_edits_do_not_touch_server_copy() {
        let mut model = SettingsModel::new();
        model.load_from_server(sample());
        model.set_camera_path(0, "/dev/video9").unwrap();
        model.add_camera(CameraConfig::default());

        assert_eq!(model.server().cameras.len(), 1);
        assert_eq!(model.server().cameras[0].path.as_deref(), Some("/dev/video0"));
        assert_eq!(model.display().cameras.len(), 2);
    }

    #[test]
    fn discard_restores_server_copy_and_is_idempotent() {
        let mut model = SettingsModel::new();
        model.load_from_server(sample());
        model.remove_camera(0).unwrap();
        model.add_switched_camera();

        model.discard();
        assert_eq!(model.display(), model.server());
        model.discard();
        assert_eq!(model.display(), &sample());
    }

    #[test]
    fn reload_drops_unsaved_edits() {
        let mut model = SettingsModel::new();
        model.load_from_server(sample());
        model.add_camera(CameraConfig::with_path("/dev/video1"));
        model.load_from_server(sample());
        assert_eq!(model.display().cameras.len(), 1);
    }

    #[test]
    fn index_errors() {
        let mut model = SettingsModel::new();
        model.load_from_server(sample());
        assert_eq!(model.remove_camera(3), Err(VisionError::InvalidCameraIndex(3)));
        assert_eq!(
            model.remove_switched_camera(1),
            Err(VisionError::InvalidCameraIndex(1))
        );
        assert_eq!(
            model.set_camera_path(1, "/dev/x"),
            Err(VisionError::InvalidCameraIndex(1))
        );
        assert!(matches!(
            model.normalize_camera_properties(5, json!({})),
            Err(VisionError::InvalidCameraIndex(5))
        ));
    }

    #[test]
    fn normalization_replaces_display_entry() {
        let mut model = SettingsModel::new();
        model.load_from_server(sample());
        let camera = model
            .normalize_camera_properties(
                0,
                json!({"fps": 15, "properties": [{"name": "brightness", "value": 40}]}),
            )
            .unwrap();
        assert_eq!(camera.name.as_deref(), Some("front"));
        assert_eq!(camera.brightness, Some(ControlValue::Integer(40)));
        assert_eq!(camera.width, None);
        assert_eq!(model.display().cameras[0].fps, Some(15));
        assert_eq!(model.server().cameras[0].fps, None);
    }

    #[test]
    fn normalization_rejects_non_objects() {
        let mut model = SettingsModel::new();
        model.load_from_server(sample());
        assert!(matches!(
            model.normalize_camera_properties(0, json!([1, 2])),
            Err(VisionError::Serialization(_))
        ));
        assert_eq!(model.display(), model.server());
    }

    #[test]
    fn save_carries_the_form_projection() {
        let mut model = SettingsModel::new();
        model.load_from_server(sample());
        let mut form = SettingsForm::from_settings(model.display());
        form.cameras[0].width.clear();
        form.team = "1234".to_string();
        model.apply_form(&form);

        let OutboundMessage::VisionSave { settings } = model.save_message() else {
            panic!("expected visionSave");
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["team"], 1234);
        assert!(json["cameras"][0].get("width").is_none());
        assert_eq!(json["switched cameras"][0]["key"], "/cam");
    }
}
