//! `frcvision-types` – shared vocabulary of the FRCVision console.
//!
//! - [`settings`] – the vision settings document and device/stream records.
//! - [`protocol`] – the tagged JSON messages carried over the `frcvision`
//!   WebSocket subprotocol.

pub mod protocol;
pub mod settings;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use protocol::{InboundMessage, OutboundMessage, SUBPROTOCOL};
pub use settings::{
    CameraConfig, ControlValue, DetectedDevice, NtMode, PropertyKv, StreamConfig, StreamStats,
    SwitchedCameraConfig, VisionSettings, property_value,
};

/// State of the single message channel to the vision service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
}

impl ConnectionState {
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Connected"),
        }
    }
}

/// Event wrapper routed over the console's internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"frcvision-middleware::client"`
    pub source: String,
    pub payload: EventPayload,
}

impl ConsoleEvent {
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// The channel to the vision service changed state.
    Connection(ConnectionState),
    /// A decoded message pushed by the vision service.
    Message(InboundMessage),
}

/// Error type shared by every console crate.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VisionError {
    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("HTTP Error: {0}")]
    Http(String),

    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("No camera at index {0}")]
    InvalidCameraIndex(usize),

    #[error("Not connected to the vision service")]
    NotConnected,

    #[error("Channel Error: {0}")]
    Channel(String),
}

impl From<serde_json::Error> for VisionError {
    fn from(e: serde_json::Error) -> Self {
        VisionError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for VisionError {
    fn from(e: std::io::Error) -> Self {
        VisionError::Io(e.to_string())
    }
}
