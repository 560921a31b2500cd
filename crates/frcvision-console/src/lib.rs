//! `frcvision-console` – client-side state of the FRCVision console.
//!
//! Everything here is synchronous and free of network I/O; the CLI feeds it
//! events from the middleware bus and sends what it returns.
//!
//! # Modules
//!
//! - [`console`] – [`Console`], the single owner of client state.
//! - [`settings`] – server/display settings documents with discard and save.
//! - [`normalize`] – canonicalisation of raw camera `config.json` data.
//! - [`form`] – the text form bound to the settings controls.
//! - [`camera_sync`] – configured cameras vs. detected USB devices.
//! - [`status`] – system status, vision service badge, stream table and
//!   notifications.
//! - [`view`] – the [`ViewRenderer`] trait implemented by front-ends.
//! - [`escape`] – HTML and terminal escaping.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut console = Console::new(my_view);
//! console.handle_event(event);          // from EventBus::subscribe()
//! let msg = console.save()?;            // send through ClientHandle
//! ```

pub mod camera_sync;
pub mod console;
pub mod escape;
pub mod form;
pub mod normalize;
pub mod settings;
pub mod status;
pub mod view;

pub use camera_sync::{AddableDevice, CameraLink, CameraLinkStatus, CameraListView, sync_camera_list};
pub use console::Console;
pub use escape::{escape_html, sanitize_terminal};
pub use form::{CameraForm, SettingsForm, SwitchedCameraForm};
pub use normalize::normalize_camera;
pub use settings::SettingsModel;
pub use status::{
    BadgeStyle, Notification, NotificationLevel, StreamRow, SystemStatus, VisionStatusBadge,
};
pub use view::ViewRenderer;
