//! Async driver for the [`ConnectionManager`].
//!
//! [`VisionClient::spawn`] starts one tokio task that owns the channel, the
//! state machine and the single reconnect interval.  It multiplexes three
//! inputs in one `select!` loop:
//!
//! 1. commands from [`ClientHandle`] (send, shutdown),
//! 2. inbound frames from the open channel (end of stream = close),
//! 3. reconnect timer ticks.
//!
//! Connection transitions and decoded server messages are published on the
//! [`EventBus`] with source [`CLIENT_SOURCE`].
//!
//! A connect attempt in flight keeps polling commands, so a shutdown is never
//! held up by an unresponsive host.

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::time::Duration;

use frcvision_types::{ConsoleEvent, EventPayload, OutboundMessage, SUBPROTOCOL, VisionError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::bus::EventBus;
use crate::connection::{
    Action, ConnectionManager, DEFAULT_RECONNECT_INTERVAL, DEFAULT_STREAM_STATS_PERIOD,
};
use crate::connector::{ChannelHandle, Connector};
use crate::endpoint::Endpoint;

/// `source` of every event the client publishes.
pub const CLIENT_SOURCE: &str = "frcvision-middleware::client";

/// Client tuning.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    pub reconnect_interval: Duration,
    /// Seconds between `serverStreams` pushes.
    pub stream_stats_period: f64,
}

impl ClientConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            stream_stats_period: DEFAULT_STREAM_STATS_PERIOD,
        }
    }
}

#[derive(Debug)]
enum ClientCommand {
    Send(OutboundMessage),
    Shutdown,
}

/// Cloneable handle used by the console to talk to the client task.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    commands: mpsc::UnboundedSender<ClientCommand>,
}

impl ClientHandle {
    /// Fire-and-forget send.  The frame is dropped by the client if the
    /// channel is not open when it is processed.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Channel`] if the client task has stopped.
    pub fn send(&self, msg: OutboundMessage) -> Result<(), VisionError> {
        self.commands
            .send(ClientCommand::Send(msg))
            .map_err(|_| VisionError::Channel("vision client has stopped".to_string()))
    }

    /// Ask the client task to close the channel and exit.
    pub fn shutdown(&self) {
        let _ = self.commands.send(ClientCommand::Shutdown);
    }
}

enum Step {
    Command(Option<ClientCommand>),
    Frame(Option<String>),
    Tick,
}

/// The client task state.
pub struct VisionClient<C> {
    connector: C,
    manager: ConnectionManager,
    bus: EventBus,
    commands: mpsc::UnboundedReceiver<ClientCommand>,
    channel: Option<ChannelHandle>,
    reconnect: Option<Interval>,
}

impl<C: Connector + 'static> VisionClient<C> {
    /// Start the client on the current tokio runtime and immediately begin
    /// connecting.
    pub fn spawn(config: ClientConfig, connector: C, bus: EventBus) -> (ClientHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let manager = ConnectionManager::new(config.endpoint.ws_url())
            .with_reconnect_interval(config.reconnect_interval)
            .with_stream_stats_period(config.stream_stats_period);
        let client = Self {
            connector,
            manager,
            bus,
            commands: rx,
            channel: None,
            reconnect: None,
        };
        let task = tokio::spawn(client.run());
        (ClientHandle { commands: tx }, task)
    }

    async fn run(mut self) {
        let initial = self.manager.connect();
        if self.execute(initial).await.is_continue() {
            self.event_loop().await;
        }

        self.channel = None;
        self.reconnect = None;
        info!(url = %self.manager.url(), "vision client stopped");
    }

    async fn event_loop(&mut self) {
        loop {
            let step = tokio::select! {
                cmd = self.commands.recv() => Step::Command(cmd),
                frame = next_frame(self.channel.as_mut()) => Step::Frame(frame),
                _ = next_tick(self.reconnect.as_mut()) => Step::Tick,
            };

            let actions = match step {
                Step::Command(Some(ClientCommand::Send(msg))) => self.manager.send(msg),
                Step::Command(Some(ClientCommand::Shutdown)) | Step::Command(None) => break,
                Step::Frame(Some(text)) => self.manager.on_message(&text),
                Step::Frame(None) => {
                    self.channel = None;
                    self.manager.on_close()
                }
                Step::Tick => self.manager.on_reconnect_tick(),
            };
            if self.execute(actions).await.is_break() {
                break;
            }
        }
    }

    /// Run `actions` in order.  Breaks when a shutdown arrives while a
    /// connect attempt is in flight.
    async fn execute(&mut self, actions: Vec<Action>) -> ControlFlow<()> {
        let mut queue: VecDeque<Action> = actions.into();
        while let Some(action) = queue.pop_front() {
            match action {
                Action::OpenChannel { url } => match self.open_channel(&url).await {
                    Some(Ok(channel)) => {
                        self.channel = Some(channel);
                        queue.extend(self.manager.on_open());
                    }
                    Some(Err(e)) => {
                        debug!(url = %url, error = %e, "connect attempt failed");
                        queue.extend(self.manager.on_close());
                    }
                    None => return ControlFlow::Break(()),
                },
                Action::Send(msg) => self.write(&msg),
                Action::StartReconnectTimer(period) => {
                    let mut interval = interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.reconnect = Some(interval);
                }
                Action::CancelReconnectTimer => self.reconnect = None,
                Action::Deliver(msg) => self.publish(EventPayload::Message(msg)),
                Action::StateChanged(state) => self.publish(EventPayload::Connection(state)),
            }
        }
        ControlFlow::Continue(())
    }

    /// Await the connector while still serving commands.  `None` means a
    /// shutdown was requested before the attempt finished.
    async fn open_channel(&mut self, url: &str) -> Option<Result<ChannelHandle, VisionError>> {
        let open = self.connector.open(url, SUBPROTOCOL);
        tokio::pin!(open);
        loop {
            tokio::select! {
                result = &mut open => return Some(result),
                cmd = self.commands.recv() => match cmd {
                    Some(ClientCommand::Send(msg)) => {
                        // Not open yet: the manager drops the frame.
                        let _ = self.manager.send(msg);
                    }
                    Some(ClientCommand::Shutdown) | None => {
                        debug!(url = %url, "connect attempt abandoned");
                        return None;
                    }
                },
            }
        }
    }

    fn write(&self, msg: &OutboundMessage) {
        let Some(channel) = self.channel.as_ref() else {
            warn!("no open channel; frame dropped");
            return;
        };
        match msg.encode() {
            Ok(text) => {
                if channel.outbound.send(text).is_err() {
                    debug!("channel writer gone; frame dropped");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode outbound message"),
        }
    }

    fn publish(&self, payload: EventPayload) {
        if let Err(e) = self.bus.publish(ConsoleEvent::new(CLIENT_SOURCE, payload)) {
            debug!(error = %e, "no bus subscribers");
        }
    }
}

async fn next_frame(channel: Option<&mut ChannelHandle>) -> Option<String> {
    match channel {
        Some(channel) => channel.inbound.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
