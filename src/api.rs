//! Health & status endpoints
//!
//! Provides HTTP endpoints for monitoring:
//! - GET /health - simple health check
//! - GET /metrics - Prometheus metrics
//! - GET /status - uptime

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Instant;

use eyre::Result;
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use crate::metrics;

/// Server start time for uptime calculation
static START_TIME: OnceLock<Instant> = OnceLock::new();

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    uptime_seconds: u64,
}

/// Start the API server (combines metrics and status endpoints)
pub async fn start_api_server(addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server started");

    START_TIME.get_or_init(Instant::now);
    metrics::UP.set(1.0);

    loop {
        let (mut socket, _) = listener.accept().await?;

        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            if socket.readable().await.is_ok() {
                let _ = socket.try_read(&mut buf);
            }

            let request = String::from_utf8_lossy(&buf);

            if request.contains("GET /metrics") {
                let encoder = TextEncoder::new();
                let metric_families = prometheus::gather();
                let mut buffer = Vec::new();
                let _ = encoder.encode(&metric_families, &mut buffer);

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n",
                    buffer.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.write_all(&buffer).await;
            } else if request.contains("GET /health") {
                let response =
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nOK";
                let _ = socket.write_all(response.as_bytes()).await;
            } else if request.contains("GET /status") {
                let status = StatusResponse {
                    status: "ok".to_string(),
                    uptime_seconds: START_TIME
                        .get()
                        .map(|t| t.elapsed().as_secs())
                        .unwrap_or(0),
                };
                let body = serde_json::to_string(&status).unwrap_or_else(|_| "{}".to_string());
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            } else {
                let response = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n";
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
    }
}
