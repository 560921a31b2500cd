//! HTTP side-channel: read a camera's live configuration from its MJPEG
//! server (`GET http://<host>:<1181+i>/config.json`).

use std::time::Duration;

use frcvision_types::VisionError;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::endpoint::Endpoint;

/// Upper bound on a whole `config.json` request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a background fetch for stream slot `index`.
#[derive(Debug)]
pub struct FetchedConfig {
    pub index: usize,
    pub result: Result<Value, VisionError>,
}

/// Fetch camera `index`'s live configuration on a separate task and deliver
/// the outcome on `done`, so the caller keeps serving other input meanwhile.
pub fn spawn_camera_config_fetch(
    endpoint: &Endpoint,
    index: usize,
    done: mpsc::UnboundedSender<FetchedConfig>,
) -> JoinHandle<()> {
    spawn_fetch(endpoint.camera_config_url(index), index, FETCH_TIMEOUT, done)
}

fn spawn_fetch(
    url: String,
    index: usize,
    timeout: Duration,
    done: mpsc::UnboundedSender<FetchedConfig>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = fetch_config_json(&url, timeout).await;
        if done.send(FetchedConfig { index, result }).is_err() {
            debug!(index, "fetch result discarded; receiver gone");
        }
    })
}

/// Fetch and parse a `config.json` document from `url`, giving up after
/// `timeout`.
///
/// # Errors
///
/// Returns [`VisionError::Http`] when the server is unreachable, does not
/// answer in time, answers with a non-success status, or the body is not
/// JSON.
pub async fn fetch_config_json(url: &str, timeout: Duration) -> Result<Value, VisionError> {
    debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "fetching camera config");
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VisionError::Http(format!("http client: {e}")))?;
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            VisionError::Http(format!("{url} timed out after {}ms", timeout.as_millis()))
        } else {
            VisionError::Http(format!("{url} unreachable: {e}"))
        }
    })?;

    if !response.status().is_success() {
        return Err(VisionError::Http(format!(
            "{url} returned HTTP {}",
            response.status()
        )));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                VisionError::Http(format!("{url} timed out after {}ms", timeout.as_millis()))
            } else {
                VisionError::Http(format!("invalid config from {url}: {e}"))
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on an ephemeral port.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
        });
        format!("http://{addr}/config.json")
    }

    #[tokio::test]
    async fn fetch_parses_json_body() {
        let url = serve_once("200 OK", r#"{"name":"front","properties":[]}"#).await;
        let config = fetch_config_json(&url, FETCH_TIMEOUT).await.unwrap();
        assert_eq!(config["name"], "front");
    }

    #[tokio::test]
    async fn fetch_reports_http_status() {
        let url = serve_once("404 Not Found", "{}").await;
        let err = fetch_config_json(&url, FETCH_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, VisionError::Http(ref m) if m.contains("404")));
    }

    #[tokio::test]
    async fn fetch_reports_invalid_body() {
        let url = serve_once("200 OK", "not json").await;
        assert!(matches!(
            fetch_config_json(&url, FETCH_TIMEOUT).await,
            Err(VisionError::Http(_))
        ));
    }

    #[tokio::test]
    async fn fetch_reports_unreachable_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = fetch_config_json(&format!("http://{addr}/config.json"), FETCH_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, VisionError::Http(_)));
    }

    #[tokio::test]
    async fn spawned_fetch_reports_back_with_its_index() {
        let url = serve_once("200 OK", r#"{"name":"rear"}"#).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_fetch(url, 2, FETCH_TIMEOUT, tx).await.unwrap();

        let fetched = rx.recv().await.unwrap();
        assert_eq!(fetched.index, 2);
        assert_eq!(fetched.result.unwrap()["name"], "rear");
    }

    #[tokio::test]
    async fn fetch_gives_up_on_a_silent_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // Read the request and never answer.
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let started = std::time::Instant::now();
        let err = fetch_config_json(
            &format!("http://{addr}/config.json"),
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, VisionError::Http(ref m) if m.contains("timed out")));
        server.abort();
    }
}
