//! `frcvision-middleware` – the console's connection to the vision service.
//!
//! # Modules
//!
//! - [`connection`] – sans-IO state machine: connect, open, close,
//!   reconnect scheduling, frame decoding.
//! - [`connector`] – [`Connector`] seam plus the tokio-tungstenite
//!   implementation speaking the `frcvision` subprotocol.
//! - [`client`] – tokio task driving the state machine against a connector.
//! - [`bus`] – broadcast event bus carrying connection transitions and
//!   server messages to the console.
//! - [`endpoint`] – WebSocket/stream URLs derived from the page origin.
//! - [`peer_config`] – HTTP fetch of a camera's live `config.json`.

pub mod bus;
pub mod client;
pub mod connection;
pub mod connector;
pub mod endpoint;
pub mod peer_config;

pub use bus::{EventBus, TopicSubscriber};
pub use client::{CLIENT_SOURCE, ClientConfig, ClientHandle, VisionClient};
pub use connection::{Action, ConnectionManager};
pub use connector::{ChannelHandle, Connector, WsConnector};
pub use endpoint::Endpoint;
pub use peer_config::{FetchedConfig, fetch_config_json, spawn_camera_config_fetch};
