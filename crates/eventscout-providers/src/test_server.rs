//! Loopback HTTP server serving canned responses to adapter tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub(crate) struct TestServer {
    listener: TcpListener,
    base_url: String,
}

impl TestServer {
    pub(crate) async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        Self { listener, base_url }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answers one connection per canned `(status, body)` pair, in order.
    ///
    /// The handle resolves to the request heads that were received.
    pub(crate) fn serve(self, responses: Vec<(u16, String)>) -> JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let mut heads = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = self.listener.accept().await.unwrap();

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                heads.push(String::from_utf8_lossy(&request).into_owned());

                let response = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            heads
        })
    }
}

/// Extracts the request target (path and query) from a request head.
pub(crate) fn request_target(head: &str) -> &str {
    head.split_whitespace().nth(1).unwrap_or_default()
}

/// Decodes the query string of a request head.
pub(crate) fn query_pairs(head: &str) -> std::collections::HashMap<String, String> {
    let url = url::Url::parse(&format!("http://localhost{}", request_target(head))).unwrap();
    url.query_pairs().into_owned().collect()
}

/// Returns the value of a request header, matched case-insensitively.
pub(crate) fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}
