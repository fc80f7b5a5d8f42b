//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One JSON-RPC request as the mock node saw it.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct ReceivedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

impl ReceivedRequest {
    #[allow(dead_code)]
    pub fn method(&self) -> &str {
        self.body["method"].as_str().unwrap_or_default()
    }

    #[allow(dead_code)]
    pub fn params(&self) -> &Value {
        &self.body["params"]
    }
}

/// Requests recorded by a running mock node.
pub type RequestLog = Arc<Mutex<Vec<ReceivedRequest>>>;

/// Build a bitcoind-style success body.
#[allow(dead_code)]
pub fn rpc_ok(result: Value) -> String {
    json!({ "result": result, "error": null, "id": 1 }).to_string()
}

/// Build a bitcoind-style error body.
#[allow(dead_code)]
pub fn rpc_err(code: i64, message: &str) -> String {
    json!({ "result": null, "error": { "code": code, "message": message }, "id": 1 }).to_string()
}

/// Start a programmable mock node on an ephemeral port.
///
/// `f` maps each parsed request to an HTTP status and body.
pub async fn start_mock_node<F>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(&ReceivedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let server_log = log.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    let log = server_log.clone();
                    tokio::spawn(async move {
                        let _ = serve_one(socket, f.as_ref(), &log).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn serve_one<F>(mut socket: TcpStream, f: &F, log: &RequestLog) -> std::io::Result<()>
where
    F: Fn(&ReceivedRequest) -> (u16, String),
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut content_length = 0usize;
    let mut authorization = None;
    for line in head.lines().skip(1) {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "authorization" => authorization = Some(value.to_string()),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);
    let request = ReceivedRequest {
        authorization,
        body,
    };
    let (status, body) = f(&request);
    log.lock().unwrap().push(request);

    let status_text = match status {
        200 => "200 OK",
        401 => "401 Unauthorized",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
