//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sticky_probe::EngineConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the mock backend does with one request.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    },
    /// Close the socket without answering.
    Drop,
    /// Keep the socket open and never answer.
    Hang,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Respond {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    /// 200 with the identity header set.
    pub fn origin(id: &str) -> Self {
        Reply::Respond {
            status: 200,
            headers: vec![("x-origin-id".to_string(), id.to_string())],
            body: "{\"message\":\"ok\"}".to_string(),
        }
    }
}

/// Request line and lowercased headers seen by the mock.
#[derive(Debug, Clone, Default)]
pub struct SeenRequest {
    pub path: String,
    pub headers: HashMap<String, String>,
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(SeenRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut socket = socket;
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                match f(request).await {
                    Reply::Respond {
                        status,
                        headers,
                        body,
                    } => {
                        let mut response = format!(
                            "HTTP/1.1 {} Mock\r\nContent-Length: {}\r\nConnection: close\r\n",
                            status,
                            body.len()
                        );
                        for (name, value) in headers {
                            response.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        response.push_str("\r\n");
                        response.push_str(&body);
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    Reply::Drop => drop(socket),
                    Reply::Hang => {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        drop(socket);
                    }
                }
            });
        }
    });

    addr
}

/// Start a mock backend that always gives the same reply.
pub async fn start_mock_backend(reply: Reply) -> SocketAddr {
    start_programmable_backend(move |_| {
        let reply = reply.clone();
        async move { reply }
    })
    .await
}

async fn read_request(socket: &mut TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let text = String::from_utf8_lossy(&buf);
    let mut lines = text.split("\r\n");
    let path = lines
        .next()?
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    Some(SeenRequest { path, headers })
}

/// Configuration probing `addr` directly, bypassing any system proxy.
pub fn config_for(addr: SocketAddr) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.probe.endpoint_override = Some(format!("http://{}/api", addr));
    config.probe.system_proxy = false;
    config.probe.timeout_ms = 2_000;
    config
}
