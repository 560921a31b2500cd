//! Status projections: system metrics, the vision service badge, the
//! stream table and operator notifications.

use std::collections::BTreeMap;

use frcvision_types::StreamStats;
use serde_json::{Map, Value};

use crate::escape::{escape_html, sanitize_terminal};

/// Metric names rendered on the system status panel, in display order.
pub const SYSTEM_STATUS_FIELDS: [&str; 12] = [
    "systemMemoryFree1s",
    "systemMemoryFree5s",
    "systemMemoryAvail1s",
    "systemMemoryAvail5s",
    "systemCpuUser1s",
    "systemCpuUser5s",
    "systemCpuSystem1s",
    "systemCpuSystem5s",
    "systemCpuIdle1s",
    "systemCpuIdle5s",
    "systemNetwork1s",
    "systemNetwork5s",
];

/// Last known value of every system metric, as display text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemStatus {
    values: BTreeMap<&'static str, String>,
}

impl SystemStatus {
    /// Take the known metrics from a `systemStatus` message.  Metrics the
    /// message omits keep their previous value.  Returns the names that
    /// were updated.
    pub fn apply(&mut self, fields: &Map<String, Value>) -> Vec<&'static str> {
        let mut updated = Vec::new();
        for name in SYSTEM_STATUS_FIELDS {
            let Some(value) = fields.get(name) else {
                continue;
            };
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.values.insert(name, text);
            updated.push(name);
        }
        updated
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Known metrics in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        SYSTEM_STATUS_FIELDS
            .into_iter()
            .filter_map(|name| self.get(name).map(|v| (name, v)))
    }
}

/// Visual style of the vision service badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeStyle {
    #[default]
    Unknown,
    Enabled,
    Disabled,
}

/// What a `visionStatus` message changed on the badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BadgeChange {
    pub text: bool,
    pub style: bool,
}

impl BadgeChange {
    pub fn any(self) -> bool {
        self.text || self.style
    }
}

pub const UNKNOWN_STATUS: &str = "Unknown Status";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionStatusBadge {
    pub text: String,
    pub style: BadgeStyle,
}

impl Default for VisionStatusBadge {
    fn default() -> Self {
        Self {
            text: UNKNOWN_STATUS.to_string(),
            style: BadgeStyle::Unknown,
        }
    }
}

impl VisionStatusBadge {
    /// Text is only replaced by a non-empty status; the style is only
    /// written when it differs from the current one.
    pub fn apply(&mut self, status: Option<&str>, enabled: bool) -> BadgeChange {
        let mut change = BadgeChange::default();
        if let Some(text) = status.filter(|s| !s.is_empty()) {
            self.text = text.to_string();
            change.text = true;
        }
        let style = if enabled {
            BadgeStyle::Enabled
        } else {
            BadgeStyle::Disabled
        };
        if self.style != style {
            self.style = style;
            change.style = true;
        }
        change
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One row of the stream table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamRow {
    pub source_id: String,
    pub remote_ip: String,
    pub remote_port: u16,
    pub fps: f64,
    /// Megabits per second, one decimal.
    pub mbps: String,
}

impl StreamRow {
    pub fn from_stats(stats: &StreamStats) -> Self {
        let source_id = match &stats.source_id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            source_id,
            remote_ip: stats.remote_ip.clone(),
            remote_port: stats.remote_port,
            fps: stats.actual_fps,
            mbps: format!("{:.1}", stats.actual_data_rate * 8.0e-6),
        }
    }

    /// Table row markup; every cell is escaped.
    pub fn to_html(&self) -> String {
        let cells = [
            self.source_id.clone(),
            self.remote_ip.clone(),
            self.remote_port.to_string(),
            self.fps.to_string(),
            self.mbps.clone(),
        ];
        let mut out = String::from("<tr>");
        for cell in &cells {
            out.push_str("<td>");
            out.push_str(&escape_html(cell));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Warning,
    Success,
}

/// Banner shown to the operator.  `message` is raw text; escape it before
/// embedding it in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn escaped_message(&self) -> String {
        escape_html(&self.message)
    }

    /// The message with control characters neutralised for a terminal.
    pub fn terminal_message(&self) -> String {
        sanitize_terminal(&self.message)
    }

    pub fn to_html(&self) -> String {
        let class = match self.level {
            NotificationLevel::Warning => "alert-warning",
            NotificationLevel::Success => "alert-success",
        };
        format!(
            r#"<div class="alert {class}" role="alert"><span>{}</span></div>"#,
            self.escaped_message()
        )
    }
}
