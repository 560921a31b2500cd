//! The transport seam.
//!
//! The client driver never speaks WebSocket directly.  It asks a
//! [`Connector`] for a [`ChannelHandle`]: a pair of text-frame queues.  The
//! channel is closed when the inbound queue ends, whatever the cause.
//!
//! - [`WsConnector`] – the production implementation over
//!   `tokio-tungstenite`.
//! - Tests plug in an in-memory connector instead.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use frcvision_types::VisionError;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tracing::{debug, warn};

/// An open message channel: outbound and inbound text frames.
#[derive(Debug)]
pub struct ChannelHandle {
    /// Frames written here are sent to the server.
    pub outbound: mpsc::UnboundedSender<String>,
    /// Frames received from the server.  `None` from `recv` means closed.
    pub inbound: mpsc::UnboundedReceiver<String>,
}

/// Opens message channels to the vision service.
///
/// # Contract
///
/// * `open` resolves once the channel is usable, or fails.  A failure is
///   handled exactly like a close.
/// * The returned channel reports closure by ending its inbound queue.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, url: &str, subprotocol: &str) -> Result<ChannelHandle, VisionError>;
}

/// [`Connector`] over a real WebSocket.  `wss://` URLs are secured with
/// the platform TLS stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self, url: &str, subprotocol: &str) -> Result<ChannelHandle, VisionError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| VisionError::Transport(format!("invalid request for {url}: {e}")))?;
        let protocol = HeaderValue::from_str(subprotocol)
            .map_err(|e| VisionError::Transport(format!("invalid subprotocol: {e}")))?;
        request
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", protocol);

        let (ws_stream, _response) = connect_async(request)
            .await
            .map_err(|e| VisionError::Transport(format!("ws connect to {url}: {e}")))?;
        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

        // Writer: ends when the driver drops its sender.
        tokio::spawn(async move {
            while let Some(text) = out_rx.recv().await {
                if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                    warn!(error = %e, "ws write failed");
                    break;
                }
            }
            let _ = ws_tx.close().await;
        });

        // Reader: dropping `in_tx` signals the close to the driver.
        tokio::spawn(async move {
            while let Some(frame) = ws_rx.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if in_tx.send(text.as_str().to_owned()).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!(error = %e, "ws read failed");
                        break;
                    }
                }
            }
        });

        Ok(ChannelHandle {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}
