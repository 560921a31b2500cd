//! Matching of configured cameras against the devices the service sees.

use frcvision_types::{CameraConfig, DetectedDevice};

/// Whether a configured camera is currently plugged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraLinkStatus {
    /// The console is not connected, so nothing is known.
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl std::fmt::Display for CameraLinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraLinkStatus::Unknown => write!(f, "Unknown Status"),
            CameraLinkStatus::Connected => write!(f, "Connected"),
            CameraLinkStatus::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Per-camera result of a sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraLink {
    pub status: CameraLinkStatus,
    /// Every path of the matching device, primary first.  Empty unless
    /// connected.
    pub alternate_paths: Vec<String>,
}

/// A detected device no configured camera refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddableDevice {
    pub name: String,
    pub paths: Vec<String>,
}

/// Outcome of [`sync_camera_list`]: one link per display camera, in order,
/// plus the devices offered in the "add connected camera" list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraListView {
    pub cameras: Vec<CameraLink>,
    pub addable: Vec<AddableDevice>,
}

impl CameraListView {
    /// Every camera shown as unknown; used while disconnected.
    pub fn unknown(camera_count: usize) -> Self {
        Self {
            cameras: vec![CameraLink::default(); camera_count],
            addable: Vec::new(),
        }
    }
}

/// Match `devices` against `cameras` by path.
///
/// A camera is connected when its `path` equals the primary or any alternate
/// path of a device.  Devices matching no camera are listed once each as
/// addable, keyed by name.
pub fn sync_camera_list(devices: &[DetectedDevice], cameras: &[CameraConfig]) -> CameraListView {
    let mut links = vec![
        CameraLink {
            status: CameraLinkStatus::Disconnected,
            alternate_paths: Vec::new(),
        };
        cameras.len()
    ];
    let mut addable: Vec<AddableDevice> = Vec::new();

    for device in devices {
        let paths = device.candidate_paths();
        let mut matched = false;
        for (camera, link) in cameras.iter().zip(links.iter_mut()) {
            let Some(path) = camera.path.as_deref() else {
                continue;
            };
            if paths.iter().any(|p| p == path) {
                matched = true;
                link.status = CameraLinkStatus::Connected;
                link.alternate_paths = paths.clone();
            }
        }
        if !matched && !addable.iter().any(|a| a.name == device.name) {
            addable.push(AddableDevice {
                name: device.name.clone(),
                paths,
            });
        }
    }

    CameraListView {
        cameras: links,
        addable,
    }
}
