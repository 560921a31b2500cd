//! The rendering surface the console drives.
//!
//! A renderer owns the on-screen form ([`SettingsForm`]) and keeps its camera
//! entries in step with the display document: the console calls
//! [`ViewRenderer::append_camera`] / [`ViewRenderer::remove_camera`] exactly
//! when it adds or removes a display camera.

use frcvision_types::{CameraConfig, ConnectionState, SwitchedCameraConfig, VisionSettings};

use crate::camera_sync::CameraListView;
use crate::form::SettingsForm;
use crate::status::{Notification, StreamRow, SystemStatus, VisionStatusBadge};

pub trait ViewRenderer {
    fn render_connection(&mut self, state: ConnectionState);

    fn render_streams(&mut self, rows: &[StreamRow]);

    /// `updated` lists the metrics the last message changed.
    fn render_system_status(&mut self, status: &SystemStatus, updated: &[&'static str]);

    fn render_vision_status(&mut self, badge: &VisionStatusBadge);

    /// Rebuild every settings control from the display document.
    fn render_settings(&mut self, settings: &VisionSettings);

    /// Add the entry for a new camera at `index` (always the last slot).
    fn append_camera(&mut self, index: usize, camera: &CameraConfig);

    fn remove_camera(&mut self, index: usize);

    fn append_switched_camera(&mut self, index: usize, camera: &SwitchedCameraConfig);

    fn remove_switched_camera(&mut self, index: usize);

    /// Refresh the controls of camera `index` after it was replaced.
    fn render_camera(&mut self, index: usize, camera: &CameraConfig);

    fn set_camera_path(&mut self, index: usize, path: &str);

    fn render_camera_list(&mut self, list: &CameraListView);

    fn notify(&mut self, notification: &Notification);

    /// Current contents of the form.
    fn form(&self) -> &SettingsForm;
}
