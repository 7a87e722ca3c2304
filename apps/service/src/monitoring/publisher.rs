use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use settings::{PublisherConfig, Secret};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::PushParams;

/// Timeout for the remote push request.
const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers a result to a sink without ever failing the pipeline. Failures
/// are logged and swallowed here so a dead monitoring endpoint cannot take
/// the scheduler down with it.
#[async_trait]
pub trait Publish: Send + Sync {
    async fn publish(&self, params: &PushParams);
}

/// Internal error for the remote push; never leaves the publisher.
#[derive(Debug, Error)]
enum PushError {
    #[error("{0}")]
    Rejected(String),
    #[error("request failed: {0}")]
    Request(reqwest::Error),
}

/// Build the publisher for a check from its closed config variant.
pub fn for_check(config: &PublisherConfig) -> Result<Arc<dyn Publish>, reqwest::Error> {
    match config {
        PublisherConfig::Stdout => Ok(Arc::new(StdoutPublisher)),
        PublisherConfig::UptimeKuma { url, push_token } => {
            Ok(Arc::new(KumaPublisher::new(url.clone(), push_token.clone())?))
        }
    }
}

/// Prints one single-line JSON object per published result.
pub struct StdoutPublisher;

#[async_trait]
impl Publish for StdoutPublisher {
    async fn publish(&self, params: &PushParams) {
        match serde_json::to_string(params) {
            Ok(line) => println!("{line}"),
            Err(error) => warn!(id = %params.id, %error, "failed to serialize check result"),
        }
    }
}

/// Pushes results to an Uptime Kuma push endpoint.
///
/// The push token is part of the URL and therefore sensitive; it is held as
/// a [`Secret`] and any transport error is stripped of its URL before being
/// logged.
pub struct KumaPublisher {
    base_url: String,
    push_token: Secret,
    client: Client,
}

impl KumaPublisher {
    pub fn new(base_url: String, push_token: Secret) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(PUSH_TIMEOUT).build()?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), push_token, client })
    }

    async fn try_push(&self, params: &PushParams) -> Result<(), PushError> {
        let url = format!("{}/api/push/{}", self.base_url, self.push_token.expose());
        let mut query: Vec<(&str, String)> =
            vec![("status", params.status.to_string()), ("msg", params.msg.clone())];
        if let Some(ping) = params.ping {
            query.push(("ping", ping.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| PushError::Request(e.without_url()))?;

        let status = response.status();
        if status.is_success() {
            debug!(id = %params.id, "pushed check result");
            return Ok(());
        }

        // Prefer the server's own message when the body carries one.
        let msg = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("msg").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| format!("server returned error: {status}"));
        Err(PushError::Rejected(msg))
    }
}

#[async_trait]
impl Publish for KumaPublisher {
    async fn publish(&self, params: &PushParams) {
        if let Err(error) = self.try_push(params).await {
            warn!(id = %params.id, %error, "failed to push check result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::PushStatus;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP server: accepts a single connection, returns the
    /// request head and sends the canned response.
    async fn serve_once(listener: TcpListener, response: &'static str) -> String {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut buf = vec![0u8; 4096];
        let n = stream.read(&mut buf).await.expect("read");
        stream.write_all(response.as_bytes()).await.expect("write");
        String::from_utf8_lossy(&buf[..n]).to_string()
    }

    fn params(ping: Option<u64>) -> PushParams {
        PushParams { id: "disk".into(), status: PushStatus::Up, msg: "DISK OK".into(), ping }
    }

    #[tokio::test]
    async fn pushes_status_msg_and_ping_as_query() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = tokio::spawn(serve_once(
            listener,
            "HTTP/1.1 200 OK\r\ncontent-length: 11\r\ncontent-type: application/json\r\n\r\n{\"ok\":true}",
        ));

        let publisher =
            KumaPublisher::new(format!("http://{addr}/"), Secret::new("tok123")).expect("client");
        publisher.publish(&params(Some(12))).await;

        let request = server.await.expect("server");
        let request_line = request.lines().next().expect("request line");
        assert!(request_line.starts_with("GET /api/push/tok123?"));
        assert!(request_line.contains("status=up"));
        assert!(request_line.contains("msg=DISK+OK"));
        assert!(request_line.contains("ping=12"));
        assert!(request.contains("accept: application/json"));
    }

    #[tokio::test]
    async fn ping_is_omitted_when_absent() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = tokio::spawn(serve_once(
            listener,
            "HTTP/1.1 200 OK\r\ncontent-length: 11\r\ncontent-type: application/json\r\n\r\n{\"ok\":true}",
        ));

        let publisher =
            KumaPublisher::new(format!("http://{addr}"), Secret::new("tok123")).expect("client");
        publisher.publish(&params(None)).await;

        let request = server.await.expect("server");
        assert!(!request.lines().next().expect("request line").contains("ping="));
    }

    #[tokio::test]
    async fn server_rejection_is_contained() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = tokio::spawn(serve_once(
            listener,
            "HTTP/1.1 404 Not Found\r\ncontent-length: 38\r\ncontent-type: application/json\r\n\r\n{\"ok\":false,\"msg\":\"monitor not found\"}",
        ));

        let publisher =
            KumaPublisher::new(format!("http://{addr}"), Secret::new("tok123")).expect("client");
        // Must return normally; the failure is logged, not raised.
        publisher.publish(&params(None)).await;
        server.await.expect("server");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_contained() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let publisher =
            KumaPublisher::new(format!("http://{addr}"), Secret::new("tok123")).expect("client");
        publisher.publish(&params(None)).await;
    }
}
