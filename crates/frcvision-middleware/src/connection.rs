//! Sans-IO connection state machine.
//!
//! [`ConnectionManager`] owns the channel state and the reconnect-timer
//! sentinel.  It never touches a socket or a clock: every transport event is
//! fed in through an `on_*` method and the manager answers with the
//! [`Action`]s the driver must perform.  The driver in
//! [`client`](crate::client) executes them against a real
//! [`Connector`](crate::connector::Connector).
//!
//! ```text
//!              connect()                 on_open()
//! Disconnected ─────────▶ Connecting ─────────────▶ Open
//!      ▲                      │                      │
//!      └──────── on_close() ──┴──────────────────────┘
//!           (starts the reconnect timer once)
//! ```

use std::time::Duration;

use frcvision_types::{ConnectionState, InboundMessage, OutboundMessage};
use tracing::{debug, info, warn};

/// Delay between reconnection attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(2000);

/// Period, in seconds, requested for `serverStreams` pushes.
pub const DEFAULT_STREAM_STATS_PERIOD: f64 = 1.0;

/// Side effect requested by the [`ConnectionManager`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Open the message channel at `url`.
    OpenChannel { url: String },
    /// Write a frame on the open channel.
    Send(OutboundMessage),
    /// Start the repeating reconnect timer.
    StartReconnectTimer(Duration),
    /// Stop the reconnect timer.
    CancelReconnectTimer,
    /// Hand a decoded server message to the console.
    Deliver(InboundMessage),
    /// Announce a state transition.
    StateChanged(ConnectionState),
}

/// Connection state plus the reconnect-timer sentinel.
#[derive(Debug)]
pub struct ConnectionManager {
    url: String,
    state: ConnectionState,
    reconnect_timer_active: bool,
    reconnect_interval: Duration,
    stream_stats_period: f64,
}

impl ConnectionManager {
    /// Create a manager targeting `url` (a `ws://` or `wss://` URL).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: ConnectionState::Disconnected,
            reconnect_timer_active: false,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            stream_stats_period: DEFAULT_STREAM_STATS_PERIOD,
        }
    }

    /// Override the reconnect delay (builder-style).
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Override the requested `serverStreams` period (builder-style).
    pub fn with_stream_stats_period(mut self, period_secs: f64) -> Self {
        self.stream_stats_period = period_secs;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn reconnect_timer_active(&self) -> bool {
        self.reconnect_timer_active
    }

    /// Begin opening the channel.  A no-op while a channel is open or
    /// connecting.
    pub fn connect(&mut self) -> Vec<Action> {
        if self.state != ConnectionState::Disconnected {
            debug!(state = ?self.state, "connect ignored; channel already active");
            return Vec::new();
        }
        self.state = ConnectionState::Connecting;
        debug!(url = %self.url, "opening channel");
        vec![
            Action::StateChanged(ConnectionState::Connecting),
            Action::OpenChannel {
                url: self.url.clone(),
            },
        ]
    }

    /// The channel finished opening.
    pub fn on_open(&mut self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(4);
        if self.reconnect_timer_active {
            self.reconnect_timer_active = false;
            actions.push(Action::CancelReconnectTimer);
        }
        self.state = ConnectionState::Open;
        info!(url = %self.url, "connected to vision service");
        actions.push(Action::StateChanged(ConnectionState::Open));
        actions.push(Action::Send(OutboundMessage::GetSourceList));
        actions.push(Action::Send(OutboundMessage::GetServerStreamsPeriodic {
            period: self.stream_stats_period,
        }));
        actions
    }

    /// The channel closed or failed to open.  Both look the same.
    pub fn on_close(&mut self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2);
        if self.state.is_open() {
            warn!(url = %self.url, "connection to vision service lost");
        }
        self.state = ConnectionState::Disconnected;
        actions.push(Action::StateChanged(ConnectionState::Disconnected));
        if !self.reconnect_timer_active {
            self.reconnect_timer_active = true;
            debug!(interval_ms = self.reconnect_interval.as_millis() as u64, "scheduling reconnect");
            actions.push(Action::StartReconnectTimer(self.reconnect_interval));
        }
        actions
    }

    /// The reconnect timer fired.
    pub fn on_reconnect_tick(&mut self) -> Vec<Action> {
        self.connect()
    }

    /// A text frame arrived.  Undecodable frames produce no action.
    pub fn on_message(&mut self, text: &str) -> Vec<Action> {
        match InboundMessage::decode(text) {
            Some(msg) => vec![Action::Deliver(msg)],
            None => Vec::new(),
        }
    }

    /// Queue `msg` for sending.  Dropped while the channel is not open.
    pub fn send(&mut self, msg: OutboundMessage) -> Vec<Action> {
        if !self.state.is_open() {
            warn!(state = ?self.state, "dropping outbound message; not connected");
            return Vec::new();
        }
        vec![Action::Send(msg)]
    }
}
