//! Exercises the real fetcher worker pool and [`sigmai::fetcher::MispClient`]
//! wire format against a minimal hand-rolled HTTP/1.1 server, rather than
//! mocking at the `reqwest` layer — there is no call-recording mock-HTTP
//! crate in the teacher's dependency stack, so this stands up a
//! `tokio::net::TcpListener` that understands just enough of HTTP/1.1 POST
//! to serve the three MISP endpoints (§6 "Remote API (consumed)").

use std::net::SocketAddr;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use sigmai_core::config::{FetchFilters, FetcherOptions};

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Reads one HTTP/1.1 request off `socket` and returns its path and
/// parsed JSON body.
async fn read_request(socket: &mut TcpStream) -> (String, Value) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.expect("read request headers");
        assert!(n > 0, "client closed the connection before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
    let content_length: usize = lines
        .find_map(|line| {
            line.to_ascii_lowercase()
                .strip_prefix("content-length:")
                .map(|v| v.trim().to_string())
        })
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await.expect("read request body");
        assert!(n > 0, "client closed the connection before sending the full body");
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = &buf[body_start..body_start + content_length];
    let json: Value = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(body).expect("request body is valid JSON")
    };
    (path, json)
}

async fn write_json_response(socket: &mut TcpStream, body: &Value) {
    let payload = serde_json::to_vec(body).expect("response body serializes");
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        payload.len()
    );
    socket.write_all(response.as_bytes()).await.expect("write response headers");
    socket.write_all(&payload).await.expect("write response body");
    socket.shutdown().await.ok();
}

/// Spawns a mock MISP server serving exactly one event with one attribute
/// attached directly to it (`object_id: "0"`, per §4.2's linkage rule) and
/// no objects.
async fn spawn_mock_misp() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock MISP server");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => return,
            };
            tokio::spawn(async move {
                let (path, request) = read_request(&mut socket).await;
                let page = request.get("page").and_then(Value::as_i64).unwrap_or(1);
                let body = if path.starts_with("/events/restSearch") {
                    if page == 1 {
                        json!({ "response": [{ "Event": {
                            "id": "1", "uuid": "u1", "info": "t", "threat_level_id": "3",
                            "Orgc": { "name": "o" }
                        }}]})
                    } else {
                        json!({ "response": [] })
                    }
                } else if path.starts_with("/objects/restSearch") {
                    json!({ "response": [] })
                } else if path.starts_with("/attributes/restSearch") {
                    if page == 1 {
                        json!({ "response": { "Attribute": [{
                            "id": "5", "uuid": "u5", "type": "md5", "value": "abc",
                            "object_id": "0"
                        }]}})
                    } else {
                        json!({ "response": { "Attribute": [] } })
                    }
                } else {
                    json!({ "response": [] })
                };
                write_json_response(&mut socket, &body).await;
            });
        }
    });
    addr
}

#[tokio::test]
async fn fetcher_pool_enriches_the_single_event_it_lists() {
    let addr = spawn_mock_misp().await;
    let options = FetcherOptions {
        url: format!("http://{addr}"),
        key: "test-key".to_string(),
        insecure: false,
        buffer: 10,
        workers: 2,
        filters: FetchFilters::default(),
    };

    let mut handle = sigmai::fetcher::spawn(options);
    let mut received = Vec::new();
    while let Some(event) = handle.events.recv().await {
        received.push(event);
    }
    handle.join().await;

    assert!(handle.error().is_none(), "unexpected fetcher error: {:?}", handle.error());
    assert_eq!(received.len(), 1);
    let event = &received[0];
    assert_eq!(event.id, "1");
    assert_eq!(event.attribute.len(), 1);
    assert_eq!(event.attribute[0].attribute_type, "md5");
    assert!(event.object.is_empty());
}

#[tokio::test]
async fn fetcher_reports_the_transport_error_when_the_server_is_unreachable() {
    // Port 1 is reserved and nothing listens there; reqwest fails to connect.
    let options = FetcherOptions {
        url: "http://127.0.0.1:1".to_string(),
        key: "test-key".to_string(),
        insecure: false,
        buffer: 10,
        workers: 2,
        filters: FetchFilters::default(),
    };

    let mut handle = sigmai::fetcher::spawn(options);
    while handle.events.recv().await.is_some() {}
    handle.join().await;

    assert!(handle.error().is_some());
}
