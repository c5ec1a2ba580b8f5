//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use sitekit::config::ServerConfig;
use sitekit::http::HttpServer;
use sitekit::lifecycle::Shutdown;
use sitekit::reload::ReloadBroadcaster;

/// An HTTP client that ignores proxy environment variables.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Spawn the server on an ephemeral port.
///
/// Returns the base URL, the reload broadcaster, and the shutdown handle
/// (kept alive by the caller; dropping it does not stop the server).
pub async fn spawn_server(config: ServerConfig) -> (String, ReloadBroadcaster, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let broadcaster = server.broadcaster();
    let shutdown_rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, shutdown_rx).await;
    });

    (format!("http://{}", addr), broadcaster, shutdown)
}

/// Create a scratch directory under the system temp dir.
#[allow(dead_code)]
pub fn scratch_dir(label: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("sitekit-test-{}-{}", label, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Start a mock CDN that answers per-path.
///
/// The handler returns `(status, content_type, body)` for a path, or `None`
/// for a plain 404.
#[allow(dead_code)]
pub async fn start_mock_cdn<F>(handler: F) -> SocketAddr
where
    F: Fn(&str) -> Option<(u16, String, Vec<u8>)> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let mut read_total = 0;
                        loop {
                            match socket.read(&mut buf[read_total..]).await {
                                Ok(0) => break,
                                Ok(n) => {
                                    read_total += n;
                                    if buf[..read_total].windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                    if read_total == buf.len() {
                                        break;
                                    }
                                }
                                Err(_) => return,
                            }
                        }

                        let head = String::from_utf8_lossy(&buf[..read_total]);
                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let response = match handler(&path) {
                            Some((status, content_type, body)) => {
                                let status_text = match status {
                                    200 => "200 OK",
                                    404 => "404 Not Found",
                                    500 => "500 Internal Server Error",
                                    502 => "502 Bad Gateway",
                                    _ => "200 OK",
                                };
                                // An empty content type omits the header.
                                let content_type_line = if content_type.is_empty() {
                                    String::new()
                                } else {
                                    format!("Content-Type: {}\r\n", content_type)
                                };
                                let mut response = format!(
                                    "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n",
                                    status_text,
                                    content_type_line,
                                    body.len()
                                )
                                .into_bytes();
                                response.extend_from_slice(&body);
                                response
                            }
                            None => {
                                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                                    .to_vec()
                            }
                        };

                        let _ = socket.write_all(&response).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
