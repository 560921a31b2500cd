//! Terminal rendering of the console.
//!
//! Events that need the operator's attention (connection changes, the vision
//! service badge, notifications) are printed as they arrive.  High-rate data
//! (stream statistics, system metrics) and the settings form are kept and
//! printed on demand by the REPL.
//!
//! Text that originates from the service goes through
//! [`sanitize_terminal`] before it is printed.

use std::collections::VecDeque;

use colored::Colorize;
use frcvision_console::{
    BadgeStyle, CameraForm, CameraLink, CameraLinkStatus, CameraListView,
    Notification, NotificationLevel, SettingsForm, StreamRow, SwitchedCameraForm, SystemStatus,
    ViewRenderer, VisionStatusBadge, sanitize_terminal,
};
use frcvision_middleware::Endpoint;
use frcvision_types::{CameraConfig, ConnectionState, SwitchedCameraConfig, VisionSettings};

pub struct TerminalView {
    endpoint: Endpoint,
    form: SettingsForm,
    camera_list: CameraListView,
    /// Last connection state printed; reconnect attempts are not echoed.
    shown_state: Option<ConnectionState>,
    notes: VecDeque<Notification>,
}

/// Notifications kept for `/report`.
const KEPT_NOTIFICATIONS: usize = 16;

impl TerminalView {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            form: SettingsForm::default(),
            camera_list: CameraListView::default(),
            shown_state: None,
            notes: VecDeque::with_capacity(KEPT_NOTIFICATIONS),
        }
    }

    /// Most recent notifications, oldest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notes.iter()
    }

    pub fn form_mut(&mut self) -> &mut SettingsForm {
        &mut self.form
    }

    /// The whole settings form, one block per camera.
    pub fn settings_text(&self) -> String {
        let mut out = String::new();
        let mode = if self.form.client_mode { "client" } else { "server" };
        out.push_str(&format!("{}\n", "Vision Settings".bold().underline()));
        out.push_str(&format!("  ntmode : {}\n", mode.yellow()));
        out.push_str(&format!("  team   : {}\n", sanitize_terminal(&self.form.team).yellow()));

        let cameras = self.form.cameras.len();
        for (i, camera) in self.form.cameras.iter().enumerate() {
            let link = self.camera_list.cameras.get(i).cloned().unwrap_or_default();
            out.push_str(&camera_text(i, camera, &link, &self.endpoint.camera_stream_url(i)));
        }
        for (j, camera) in self.form.switched_cameras.iter().enumerate() {
            let port = Endpoint::stream_port(cameras + j);
            out.push_str(&switched_camera_text(j, camera, port));
        }

        if !self.camera_list.addable.is_empty() {
            out.push_str(&format!("{}\n", "Connected cameras not configured".bold()));
            for device in &self.camera_list.addable {
                out.push_str(&format!("  {}\n", sanitize_terminal(&device.name).bold()));
                for path in &device.paths {
                    out.push_str(&format!("    {}\n", sanitize_terminal(path)));
                }
            }
        }
        out
    }
}

fn link_label(status: CameraLinkStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        CameraLinkStatus::Connected => label.green(),
        CameraLinkStatus::Disconnected => label.yellow(),
        CameraLinkStatus::Unknown => label.dimmed(),
    }
}

fn camera_text(index: usize, camera: &CameraForm, link: &CameraLink, stream_url: &str) -> String {
    let title = if camera.name.is_empty() {
        format!("Camera {index}")
    } else {
        format!("Camera {index}: {}", sanitize_terminal(&camera.name))
    };
    let mut out = format!("{} [{}]\n", title.bold().cyan(), link_label(link.status));
    out.push_str(&format!("  stream : {}\n", stream_url.dimmed()));
    let fields: [(&str, &str); 15] = [
        ("name", camera.name.as_str()),
        ("path", camera.path.as_str()),
        ("pixel-format", camera.pixel_format.as_str()),
        ("width", camera.width.as_str()),
        ("height", camera.height.as_str()),
        ("fps", camera.fps.as_str()),
        ("brightness", camera.brightness.as_str()),
        ("white-balance", camera.white_balance.as_str()),
        ("exposure", camera.exposure.as_str()),
        ("properties", camera.properties.as_str()),
        ("stream-width", camera.stream_width.as_str()),
        ("stream-height", camera.stream_height.as_str()),
        ("stream-fps", camera.stream_fps.as_str()),
        ("stream-compression", camera.stream_compression.as_str()),
        ("stream-default-compression", camera.stream_default_compression.as_str()),
    ];
    for (name, value) in fields.into_iter().filter(|(_, v)| !v.is_empty()) {
        out.push_str(&format!("  {name:<27}: {}\n", sanitize_terminal(value)));
    }
    if link.alternate_paths.len() > 1 {
        out.push_str("  alternate paths:\n");
        for path in &link.alternate_paths {
            out.push_str(&format!("    {}\n", sanitize_terminal(path)));
        }
    }
    out
}

fn switched_camera_text(index: usize, camera: &SwitchedCameraForm, port: u16) -> String {
    format!(
        "{} (port {port})\n  name : {}\n  key  : {}\n",
        format!("Switched Camera {index}").bold().cyan(),
        sanitize_terminal(&camera.name),
        sanitize_terminal(&camera.key)
    )
}

/// Stream table with a header row.
pub fn streams_text(rows: &[StreamRow]) -> String {
    if rows.is_empty() {
        return format!("  {}\n", "no active streams".dimmed());
    }
    let mut out = format!(
        "  {:<24} {:<16} {:>6} {:>6} {:>6}\n",
        "source", "client", "port", "fps", "Mbps"
    );
    for row in rows {
        out.push_str(&format!(
            "  {:<24} {:<16} {:>6} {:>6} {:>6}\n",
            sanitize_terminal(&row.source_id),
            sanitize_terminal(&row.remote_ip),
            row.remote_port,
            row.fps,
            row.mbps
        ));
    }
    out
}

pub fn status_text(badge: &VisionStatusBadge, system: &SystemStatus) -> String {
    let mut out = format!("  vision service : {}\n", badge_label(badge));
    for (name, value) in system.iter() {
        out.push_str(&format!("  {name:<20}: {}\n", sanitize_terminal(value)));
    }
    out
}

fn badge_label(badge: &VisionStatusBadge) -> colored::ColoredString {
    let text = sanitize_terminal(&badge.text);
    match badge.style {
        BadgeStyle::Enabled => text.green(),
        BadgeStyle::Disabled => text.yellow(),
        BadgeStyle::Unknown => text.dimmed(),
    }
}

fn notification_line(notification: &Notification) -> String {
    let message = notification.terminal_message();
    match notification.level {
        NotificationLevel::Warning => format!("  {} {}", "⚠".yellow().bold(), message.yellow()),
        NotificationLevel::Success => format!("  {} {}", "✓".green().bold(), message.green()),
    }
}

impl ViewRenderer for TerminalView {
    fn render_connection(&mut self, state: ConnectionState) {
        if state == ConnectionState::Connecting || self.shown_state == Some(state) {
            return;
        }
        self.shown_state = Some(state);
        let label = match state {
            ConnectionState::Open => state.to_string().green(),
            _ => state.to_string().red(),
        };
        println!("  {} {}", "●".bold(), label);
    }

    fn render_streams(&mut self, _rows: &[StreamRow]) {}

    fn render_system_status(&mut self, _status: &SystemStatus, _updated: &[&'static str]) {}

    fn render_vision_status(&mut self, badge: &VisionStatusBadge) {
        println!("  vision service: {}", badge_label(badge));
    }

    fn render_settings(&mut self, settings: &VisionSettings) {
        self.form = SettingsForm::from_settings(settings);
        println!(
            "  settings loaded: {} camera(s), {} switched",
            settings.cameras.len(),
            settings.switched_cameras.len()
        );
    }

    fn append_camera(&mut self, index: usize, camera: &CameraConfig) {
        self.form.cameras.push(CameraForm::from_camera(camera));
        println!("  {} camera {index}", "+".green().bold());
    }

    fn remove_camera(&mut self, index: usize) {
        if index < self.form.cameras.len() {
            self.form.cameras.remove(index);
        }
        println!("  {} camera {index}", "-".red().bold());
    }

    fn append_switched_camera(&mut self, index: usize, camera: &SwitchedCameraConfig) {
        self.form
            .switched_cameras
            .push(SwitchedCameraForm::from_switched(camera));
        println!("  {} switched camera {index}", "+".green().bold());
    }

    fn remove_switched_camera(&mut self, index: usize) {
        if index < self.form.switched_cameras.len() {
            self.form.switched_cameras.remove(index);
        }
        println!("  {} switched camera {index}", "-".red().bold());
    }

    fn render_camera(&mut self, index: usize, camera: &CameraConfig) {
        if let Some(slot) = self.form.cameras.get_mut(index) {
            *slot = CameraForm::from_camera(camera);
        }
        println!("  camera {index} updated");
    }

    fn set_camera_path(&mut self, index: usize, path: &str) {
        if let Some(slot) = self.form.cameras.get_mut(index) {
            slot.path = path.to_string();
        }
    }

    fn render_camera_list(&mut self, list: &CameraListView) {
        self.camera_list = list.clone();
    }

    fn notify(&mut self, notification: &Notification) {
        println!("{}", notification_line(notification));
        if self.notes.len() == KEPT_NOTIFICATIONS {
            self.notes.pop_front();
        }
        self.notes.push_back(notification.clone());
    }

    fn form(&self) -> &SettingsForm {
        &self.form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frcvision_console::sync_camera_list;
    use frcvision_types::DetectedDevice;
    use serde_json::json;

    fn view_with_settings() -> TerminalView {
        colored::control::set_override(false);
        let settings: VisionSettings = serde_json::from_value(json!({
            "ntmode": "server",
            "team": 294,
            "cameras": [{"name": "front", "path": "/dev/video0", "fps": 30}],
            "switched cameras": [{"name": "driver", "key": "/cam"}]
        }))
        .unwrap();
        let mut view = TerminalView::new(Endpoint::new("frcvision.local", None, false));
        view.render_settings(&settings);
        view
    }

    #[test]
    fn settings_text_lists_cameras_and_ports() {
        let view = view_with_settings();
        let text = view.settings_text();
        assert!(text.contains("ntmode : server"));
        assert!(text.contains("Camera 0: front"));
        assert!(text.contains("http://frcvision.local:1181/"));
        assert!(text.contains("Switched Camera 0 (port 1182)"));
        assert!(text.contains("/cam"));
        assert!(!text.contains("brightness"), "blank fields are not listed");
    }

    #[test]
    fn camera_list_is_shown() {
        let mut view = view_with_settings();
        let devices = [
            DetectedDevice {
                name: "front".into(),
                path: "/dev/video0".into(),
                other_paths: vec!["/dev/v4l/by-id/front".into()],
            },
            DetectedDevice {
                name: "spare".into(),
                path: "/dev/video2".into(),
                other_paths: vec![],
            },
        ];
        let cameras = [CameraConfig::with_path("/dev/video0")];
        view.render_camera_list(&sync_camera_list(&devices, &cameras));

        let text = view.settings_text();
        assert!(text.contains("[Connected]"));
        assert!(text.contains("/dev/v4l/by-id/front"));
        assert!(text.contains("Connected cameras not configured"));
        assert!(text.contains("spare"));
    }

    #[test]
    fn form_mirrors_camera_add_and_remove() {
        let mut view = view_with_settings();
        view.append_camera(1, &CameraConfig::with_path("/dev/video3"));
        assert_eq!(view.form().cameras[1].path, "/dev/video3");
        view.remove_camera(0);
        assert_eq!(view.form().cameras.len(), 1);
        view.set_camera_path(0, "/dev/video4");
        assert_eq!(view.form().cameras[0].path, "/dev/video4");
    }

    #[test]
    fn stream_table_formats_rows() {
        colored::control::set_override(false);
        assert!(streams_text(&[]).contains("no active streams"));
        let row = StreamRow {
            source_id: "front".into(),
            remote_ip: "10.2.94.5".into(),
            remote_port: 5800,
            fps: 30.0,
            mbps: "2.4".into(),
        };
        let text = streams_text(&[row]);
        assert!(text.contains("front"));
        assert!(text.contains("2.4"));
    }

    #[test]
    fn server_text_cannot_drive_the_terminal() {
        colored::control::set_override(false);
        let line = notification_line(&Notification::warning("\u{1b}[2Jwiped"));
        assert!(!line.contains('\u{1b}'));
        assert!(line.contains("?[2Jwiped"));

        let row = StreamRow {
            source_id: "cam\u{1b}]0;title\u{7}".into(),
            ..Default::default()
        };
        assert!(!streams_text(&[row]).contains('\u{1b}'));
    }

    #[test]
    fn only_recent_notifications_are_kept() {
        let mut view = view_with_settings();
        for i in 0..KEPT_NOTIFICATIONS + 3 {
            view.notify(&Notification::warning(format!("note {i}")));
        }
        let kept: Vec<_> = view.notifications().map(|n| n.message.as_str()).collect();
        assert_eq!(kept.len(), KEPT_NOTIFICATIONS);
        assert_eq!(kept[0], "note 3");
    }
}
