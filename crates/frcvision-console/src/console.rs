//! The console: all client-side state in one place.
//!
//! [`Console`] owns the settings model, the detected device list, the badge
//! and the status panels, and drives a [`ViewRenderer`].  It performs no I/O
//! towards the service: inbound messages are handed to [`Console::handle`],
//! and [`Console::save`] returns the message to send.

use std::path::Path;

use frcvision_types::{
    CameraConfig, ConnectionState, ConsoleEvent, DetectedDevice, EventPayload, InboundMessage,
    OutboundMessage, VisionError, VisionSettings,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::camera_sync::{CameraListView, sync_camera_list};
use crate::settings::SettingsModel;
use crate::status::{Notification, StreamRow, SystemStatus, VisionStatusBadge};
use crate::view::ViewRenderer;

pub struct Console<V: ViewRenderer> {
    model: SettingsModel,
    devices: Vec<DetectedDevice>,
    badge: VisionStatusBadge,
    system: SystemStatus,
    streams: Vec<StreamRow>,
    state: ConnectionState,
    view: V,
}

impl<V: ViewRenderer> Console<V> {
    /// A disconnected console with empty settings.
    pub fn new(view: V) -> Self {
        let mut console = Self {
            model: SettingsModel::new(),
            devices: Vec::new(),
            badge: VisionStatusBadge::default(),
            system: SystemStatus::default(),
            streams: Vec::new(),
            state: ConnectionState::Disconnected,
            view,
        };
        console.view.render_settings(console.model.display());
        console
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn model(&self) -> &SettingsModel {
        &self.model
    }

    pub fn settings(&self) -> &VisionSettings {
        self.model.display()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn devices(&self) -> &[DetectedDevice] {
        &self.devices
    }

    pub fn badge(&self) -> &VisionStatusBadge {
        &self.badge
    }

    pub fn system_status(&self) -> &SystemStatus {
        &self.system
    }

    pub fn streams(&self) -> &[StreamRow] {
        &self.streams
    }

    /// Route one event from the client's bus.
    pub fn handle_event(&mut self, event: ConsoleEvent) {
        match event.payload {
            EventPayload::Connection(state) => self.on_connection(state),
            EventPayload::Message(msg) => self.handle(msg),
        }
    }

    pub fn on_connection(&mut self, state: ConnectionState) {
        let was_open = self.state.is_open();
        self.state = state;
        self.view.render_connection(state);
        if was_open && !state.is_open() {
            self.badge.reset();
            self.view.render_vision_status(&self.badge);
            self.streams.clear();
            self.view.render_streams(&self.streams);
        }
        self.refresh_camera_list();
    }

    /// Apply one message pushed by the vision service.
    pub fn handle(&mut self, msg: InboundMessage) {
        match msg {
            InboundMessage::SourceList { fields } => {
                debug!(keys = fields.len(), "source list received");
            }
            InboundMessage::ServerStreams { streams } => {
                self.streams = streams.iter().map(StreamRow::from_stats).collect();
                self.view.render_streams(&self.streams);
            }
            InboundMessage::SystemStatus { fields } => {
                let updated = self.system.apply(&fields);
                self.view.render_system_status(&self.system, &updated);
            }
            InboundMessage::VisionStatus {
                vision_service_status,
                vision_service_enabled,
            } => {
                let change = self
                    .badge
                    .apply(vision_service_status.as_deref(), vision_service_enabled);
                if change.any() {
                    self.view.render_vision_status(&self.badge);
                }
            }
            InboundMessage::VisionSettings { settings } => {
                info!(cameras = settings.cameras.len(), "vision settings received");
                self.model.load_from_server(settings);
                self.view.render_settings(self.model.display());
                self.refresh_camera_list();
            }
            InboundMessage::Status { message } => {
                self.view.notify(&Notification::warning(message));
            }
            InboundMessage::UsbCameraList { cameras } => {
                debug!(devices = cameras.len(), "usb camera list received");
                self.devices = cameras;
                self.refresh_camera_list();
            }
        }
    }

    /// Recompute connection badges, alternate paths and addable devices.
    pub fn refresh_camera_list(&mut self) {
        let cameras = &self.model.display().cameras;
        let list = if self.state.is_open() {
            sync_camera_list(&self.devices, cameras)
        } else {
            CameraListView::unknown(cameras.len())
        };
        self.view.render_camera_list(&list);
    }

    /// Add an empty camera; returns its index.
    pub fn add_camera(&mut self) -> usize {
        self.push_camera(CameraConfig::default())
    }

    /// Add a camera for a detected device path; returns its index.
    pub fn add_connected_camera(&mut self, path: &str) -> usize {
        self.push_camera(CameraConfig::with_path(path))
    }

    fn push_camera(&mut self, camera: CameraConfig) -> usize {
        let index = self.model.add_camera(camera);
        if let Ok(camera) = self.model.camera(index) {
            self.view.append_camera(index, camera);
        }
        self.refresh_camera_list();
        index
    }

    pub fn remove_camera(&mut self, index: usize) -> Result<(), VisionError> {
        self.model.remove_camera(index)?;
        self.view.remove_camera(index);
        self.refresh_camera_list();
        Ok(())
    }

    pub fn add_switched_camera(&mut self) -> usize {
        let index = self.model.add_switched_camera();
        if let Some(camera) = self.model.display().switched_cameras.get(index) {
            self.view.append_switched_camera(index, camera);
        }
        index
    }

    pub fn remove_switched_camera(&mut self, index: usize) -> Result<(), VisionError> {
        self.model.remove_switched_camera(index)?;
        self.view.remove_switched_camera(index);
        Ok(())
    }

    /// Point camera `index` at one of its device's alternate paths.
    pub fn select_alternate_path(&mut self, index: usize, path: &str) -> Result<(), VisionError> {
        self.model.set_camera_path(index, path)?;
        self.view.set_camera_path(index, path);
        self.refresh_camera_list();
        Ok(())
    }

    /// Replace camera `index` with the configuration stored in a JSON file.
    /// Failures are reported as a warning notification.
    pub fn load_camera_file(&mut self, index: usize, path: &Path) {
        match std::fs::read_to_string(path) {
            Ok(text) => self.apply_camera_json(index, &text),
            Err(e) => self.apply_camera_result(index, Err(VisionError::from(e))),
        }
    }

    /// Replace camera `index` with JSON text exported from a camera.
    pub fn apply_camera_json(&mut self, index: usize, text: &str) {
        let parsed = serde_json::from_str::<Value>(text).map_err(VisionError::from);
        self.apply_camera_result(index, parsed);
    }

    /// Replace camera `index` with the outcome of a live `config.json` fetch.
    pub fn apply_peer_config(&mut self, index: usize, fetched: Result<Value, VisionError>) {
        self.apply_camera_result(index, fetched);
    }

    fn apply_camera_result(&mut self, index: usize, raw: Result<Value, VisionError>) {
        let result = raw.and_then(|raw| self.model.normalize_camera_properties(index, raw).cloned());
        match result {
            Ok(camera) => {
                debug!(index, "camera config replaced");
                self.view.render_camera(index, &camera);
                self.refresh_camera_list();
            }
            Err(e) => {
                warn!(index, error = %e, "camera config rejected");
                self.view
                    .notify(&Notification::warning(format!("error reading camera config: {e}")));
            }
        }
    }

    /// Drop unsaved edits and re-render from the server copy.
    pub fn discard(&mut self) {
        self.model.discard();
        self.view.render_settings(self.model.display());
        self.refresh_camera_list();
    }

    /// Fold the form into the display document and build the save message.
    ///
    /// # Errors
    ///
    /// [`VisionError::NotConnected`] while the channel is down; the form is
    /// still folded in so the edits are not lost.
    pub fn save(&mut self) -> Result<OutboundMessage, VisionError> {
        self.model.apply_form(self.view.form());
        if !self.state.is_open() {
            return Err(VisionError::NotConnected);
        }
        info!(cameras = self.model.display().cameras.len(), "saving vision settings");
        Ok(self.model.save_message())
    }
}
