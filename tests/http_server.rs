use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use card_vault::server::{create_reusable_listener, start_server_loop};
use card_vault::{AppState, Config};

struct RunningServer {
    addr: SocketAddr,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
    _dir: TempDir,
}

impl RunningServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Card Vault</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "init();").unwrap();

        let env = HashMap::from([
            ("STATIC_DIR".to_string(), dir.path().to_string_lossy().into_owned()),
            ("CARD_VAULT__LOGGING__ACCESS_LOG".to_string(), "false".to_string()),
        ]);
        let config = Config::load_with_env("nonexistent/card-vault", env).unwrap();

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(start_server_loop(
            listener,
            Arc::new(AppState::new(config)),
            Arc::clone(&shutdown),
        ));

        Self { addr, shutdown, task, _dir: dir }
    }

    /// Send one request with `Connection: close` and return the raw response
    async fn request(&self, method: &str, path: &str) -> String {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        let raw =
            format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(raw.as_bytes()).await.unwrap();

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        String::from_utf8(buf).unwrap()
    }

    async fn stop(self) {
        self.shutdown.notify_one();
        self.task.await.unwrap();
    }
}

fn split(response: &str) -> (String, &str) {
    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    (head.to_ascii_lowercase(), body)
}

#[tokio::test]
async fn test_serves_index_with_security_headers() {
    let server = RunningServer::start().await;

    let response = server.request("GET", "/").await;
    let (head, body) = split(&response);
    assert!(head.starts_with("http/1.1 200 ok"));
    assert!(head.contains("content-type: text/html"));
    assert!(head.contains("x-content-type-options: nosniff"));
    assert!(head.contains("x-frame-options: deny"));
    assert!(head.contains("x-xss-protection: 1; mode=block"));
    assert_eq!(body, "<h1>Card Vault</h1>");

    server.stop().await;
}

#[tokio::test]
async fn test_status_endpoints() {
    let server = RunningServer::start().await;

    let response = server.request("GET", "/health").await;
    let (head, body) = split(&response);
    assert!(head.starts_with("http/1.1 200 ok"));
    assert!(head.contains("content-type: application/json"));
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "Card Vault");

    let response = server.request("GET", "/api/status").await;
    let (_, body) = split(&response);
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["api_status"], "active");
    assert_eq!(json["storage"], "client-side only");

    server.stop().await;
}

#[tokio::test]
async fn test_script_content_type() {
    let server = RunningServer::start().await;

    let response = server.request("GET", "/app.js").await;
    let (head, body) = split(&response);
    assert!(head.starts_with("http/1.1 200 ok"));
    assert!(head.contains("content-type: application/javascript"));
    assert_eq!(body, "init();");

    server.stop().await;
}

#[tokio::test]
async fn test_missing_and_traversal_return_json_404() {
    let server = RunningServer::start().await;

    for path in ["/missing.txt", "/../../etc/passwd", "/static/..%2f..%2fetc%2fpasswd"] {
        let response = server.request("GET", path).await;
        let (head, body) = split(&response);
        assert!(head.starts_with("http/1.1 404 not found"), "{path}: {head}");
        assert!(head.contains("x-frame-options: deny"));
        assert_eq!(body, r#"{"error":"Resource not found"}"#);
    }

    server.stop().await;
}

#[tokio::test]
async fn test_unsupported_method() {
    let server = RunningServer::start().await;

    let response = server.request("DELETE", "/health").await;
    let (head, _) = split(&response);
    assert!(head.starts_with("http/1.1 405 method not allowed"));
    assert!(head.contains("allow: get, head, options"));

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_with_no_connections_returns() {
    let server = RunningServer::start().await;
    server.stop().await;
}
