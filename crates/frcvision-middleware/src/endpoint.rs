//! Connection target derived from the console's own origin.
//!
//! The vision service serves the console page and the WebSocket on the same
//! host and port, and exposes each camera's MJPEG server on its own port
//! starting at [`FIRST_STREAM_PORT`].

use frcvision_types::VisionError;
use reqwest::Url;

/// Port of the first camera stream; camera `i` streams on `1181 + i`.
pub const FIRST_STREAM_PORT: u16 = 1181;

/// Host/port of the vision service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    secure: bool,
    host: String,
    port: Option<u16>,
}

impl Endpoint {
    /// Build an endpoint from explicit parts.  `port` is `None` when the
    /// scheme default applies.
    pub fn new(host: impl Into<String>, port: Option<u16>, secure: bool) -> Self {
        Self {
            secure,
            host: host.into(),
            port,
        }
    }

    /// Derive the endpoint from a page origin such as `http://frcvision.local`
    /// or `https://10.2.94.11:8443`.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Config`] when the origin is not an absolute
    /// http(s) URL with a host.
    pub fn from_origin(origin: &str) -> Result<Self, VisionError> {
        let url = Url::parse(origin)
            .map_err(|e| VisionError::Config(format!("invalid origin '{origin}': {e}")))?;
        let secure = match url.scheme() {
            "http" | "ws" => false,
            "https" | "wss" => true,
            other => {
                return Err(VisionError::Config(format!(
                    "unsupported scheme '{other}' in origin '{origin}'"
                )));
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| VisionError::Config(format!("origin '{origin}' has no host")))?;
        Ok(Self::new(host, url.port(), secure))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// `ws(s)://<host>[:<port>]`
    pub fn ws_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        match self.port {
            Some(port) => format!("{scheme}://{}:{port}", self.host),
            None => format!("{scheme}://{}", self.host),
        }
    }

    /// Port of the MJPEG server for stream slot `index`.
    ///
    /// Physical cameras occupy slots `0..cameras.len()`; switched camera `j`
    /// uses slot `cameras.len() + j`.
    pub fn stream_port(index: usize) -> u16 {
        FIRST_STREAM_PORT.saturating_add(u16::try_from(index).unwrap_or(u16::MAX))
    }

    /// Browser URL of the MJPEG stream in slot `index`.
    pub fn camera_stream_url(&self, index: usize) -> String {
        format!("http://{}:{}/", self.host, Self::stream_port(index))
    }

    /// URL of the live configuration of the camera in slot `index`.
    pub fn camera_config_url(&self, index: usize) -> String {
        format!("http://{}:{}/config.json", self.host, Self::stream_port(index))
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new("localhost", None, false)
    }
}
