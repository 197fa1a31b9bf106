//! End-to-end tests against an in-process server on an ephemeral port

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cors_file_server::cli::Args;
use cors_file_server::config::{AppState, Config, ServeRoot};
use cors_file_server::server::{create_reusable_listener, Server, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

struct RawResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RawResponse {
    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().copied()
    }

    fn assert_fixed_headers(&self) {
        assert_eq!(self.header_values("access-control-allow-origin"), vec!["*"]);
        assert_eq!(self.header_values("access-control-allow-methods"), vec!["GET"]);
        assert_eq!(
            self.header_values("cache-control"),
            vec!["no-store, no-cache, must-revalidate"]
        );
    }
}

struct TestServer {
    addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

async fn start(root: &Path) -> TestServer {
    let config = Config::load(&Args {
        port: 0,
        dir: Some(root.to_path_buf()),
        host: Some("127.0.0.1".to_string()),
        config: None,
        quiet: true,
    })
    .unwrap();
    let root = ServeRoot::resolve(&config.server.dir).unwrap();
    let state = Arc::new(AppState::new(config, root));

    let server = Server::bind(state).unwrap();
    let addr = server.local_addr();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(shutdown.clone()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

async fn request(addr: SocketAddr, method: &str, target: &str) -> RawResponse {
    let req = format!("{method} {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    send_raw(addr, req.as_bytes()).await
}

async fn send_raw(addr: SocketAddr, req: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(req).await.unwrap();

    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("response timed out")
        .unwrap();
    parse_response(&raw)
}

fn parse_response(raw: &[u8]) -> RawResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).into_owned();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap();
    let status = status_line
        .split(' ')
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    RawResponse {
        status,
        headers,
        body,
    }
}

fn site() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("index.html"), "<h1>alice</h1>").unwrap();
    std::fs::create_dir(tmp.path().join("audio")).unwrap();
    std::fs::write(tmp.path().join("audio/clip.wav"), b"RIFF....WAVE").unwrap();
    tmp
}

#[tokio::test]
async fn test_index_served_with_fixed_headers() {
    let tmp = site();
    let server = start(tmp.path()).await;

    let resp = request(server.addr, "GET", "/").await;
    assert_eq!(resp.status, 200);
    resp.assert_fixed_headers();
    assert_eq!(resp.header("content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(resp.body, b"<h1>alice</h1>");
}

#[tokio::test]
async fn test_directory_listing_when_no_index() {
    let tmp = site();
    let server = start(tmp.path()).await;

    let resp = request(server.addr, "GET", "/audio/").await;
    assert_eq!(resp.status, 200);
    resp.assert_fixed_headers();
    let html = String::from_utf8(resp.body).unwrap();
    assert!(html.contains("Directory listing for /audio/"));
    assert!(html.contains("clip.wav"));
}

#[tokio::test]
async fn test_directory_redirect() {
    let tmp = site();
    let server = start(tmp.path()).await;

    let resp = request(server.addr, "GET", "/audio").await;
    assert_eq!(resp.status, 301);
    assert_eq!(resp.header("location"), Some("/audio/"));
    resp.assert_fixed_headers();
}

#[tokio::test]
async fn test_directory_redirect_never_leaves_host() {
    let tmp = site();
    std::fs::create_dir(tmp.path().join("evil.example")).unwrap();
    let server = start(tmp.path()).await;

    for target in ["//evil.example", "///evil.example", "//audio"] {
        let resp = request(server.addr, "GET", target).await;
        assert_eq!(resp.status, 301, "{target}");
        let location = resp.header("location").unwrap();
        assert!(location.starts_with('/'), "{target} -> {location}");
        assert!(!location.starts_with("//"), "{target} -> {location}");
        resp.assert_fixed_headers();
    }
}

#[tokio::test]
async fn test_missing_file_is_404_with_headers() {
    let tmp = site();
    let server = start(tmp.path()).await;

    let resp = request(server.addr, "GET", "/nope.js").await;
    assert_eq!(resp.status, 404);
    resp.assert_fixed_headers();
}

#[tokio::test]
async fn test_traversal_never_leaves_root() {
    let outer = tempfile::tempdir().unwrap();
    std::fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
    let root = outer.path().join("public");
    std::fs::create_dir(&root).unwrap();
    let server = start(&root).await;

    for target in [
        "/../secret.txt",
        "/%2e%2e/secret.txt",
        "/../../etc/passwd",
        "/..%2f..%2fetc%2fpasswd",
        "//etc/passwd",
        "//secret.txt",
        "//../secret.txt",
        "/%2f%2fetc%2fpasswd",
    ] {
        let resp = request(server.addr, "GET", target).await;
        assert_eq!(resp.status, 404, "{target}");
        resp.assert_fixed_headers();
        let body = String::from_utf8_lossy(&resp.body);
        assert!(!body.contains("top secret"), "{target}");
        assert!(!body.contains("root:"), "{target}");
    }
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let tmp = site();
    let server = start(tmp.path()).await;

    let first = request(server.addr, "GET", "/audio/clip.wav").await;
    let second = request(server.addr, "GET", "/audio/clip.wav").await;
    assert_eq!(first.status, 200);
    assert_eq!(first.body, second.body);
    assert_eq!(first.header("content-type"), Some("audio/wav"));
    for name in [
        "access-control-allow-origin",
        "access-control-allow-methods",
        "cache-control",
        "content-length",
        "last-modified",
    ] {
        assert_eq!(first.header_values(name), second.header_values(name), "{name}");
    }
}

#[tokio::test]
async fn test_unsupported_method_is_501() {
    let tmp = site();
    let server = start(tmp.path()).await;

    let resp = request(server.addr, "POST", "/").await;
    assert_eq!(resp.status, 501);
    resp.assert_fixed_headers();
}

#[tokio::test]
async fn test_malformed_request_is_rejected_by_hyper() {
    let tmp = site();
    let server = start(tmp.path()).await;

    let resp = send_raw(server.addr, b"GET / HTTP/1.1\r\nBad Header\r\n\r\n").await;
    assert_eq!(resp.status, 400);
    // hyper writes this response itself, before any handler runs
    assert!(resp.header("access-control-allow-origin").is_none());
    assert!(resp.body.is_empty());

    // The server keeps serving afterwards
    assert_eq!(request(server.addr, "GET", "/").await.status, 200);
}

#[tokio::test]
async fn test_head_has_no_body() {
    let tmp = site();
    let server = start(tmp.path()).await;

    let resp = request(server.addr, "HEAD", "/").await;
    assert_eq!(resp.status, 200);
    resp.assert_fixed_headers();
    assert_eq!(resp.header("content-length"), Some("14"));
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_shutdown_stops_accepting_and_releases_port() {
    let tmp = site();
    let server = start(tmp.path()).await;
    assert_eq!(request(server.addr, "GET", "/").await.status, 200);

    server.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap();

    assert!(TcpStream::connect(server.addr).await.is_err());
    assert!(create_reusable_listener(server.addr, 16).is_ok());
}

#[tokio::test]
async fn test_shutdown_closes_idle_keep_alive_connection() {
    let tmp = site();
    let server = start(tmp.path()).await;

    // Keep-alive connection that stays open after its first response
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let mut buf = [0u8; 1024];
    let n = stream.read(&mut buf).await.unwrap();
    assert!(buf[..n].starts_with(b"HTTP/1.1 200"));

    server.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not drain")
        .unwrap();

    // The server side closed the idle connection
    let mut rest = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut rest)).await;
    assert!(read.is_ok());
}
