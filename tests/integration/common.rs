use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a HEAD handler for `route` answering `status` with a body of
/// `size` bytes advertised in `Content-Length`
pub async fn mount_head(server: &MockServer, route: &str, status: u16, size: usize) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-length", size.to_string().as_str())
                .set_body_bytes(vec![b'x'; size]),
        )
        .mount(server)
        .await;
}

/// Mounts a GET handler for `route` serving `html`
pub async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// A chat-completions reply whose message content is `content`
pub fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

/// Starts a bare HTTP/1.1 responder answering each path with a fixed status
///
/// Covers codes such as 399 and 499 that the mock server's status type
/// rejects. Unknown paths answer 404. Returns the base URL.
pub async fn spawn_status_server(routes: Vec<(&'static str, u16)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind status server");
    let addr = listener.local_addr().expect("Failed to read local address");
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let target = request.split_whitespace().nth(1).unwrap_or("/");
                let status = routes
                    .iter()
                    .find(|(route, _)| *route == target)
                    .map_or(404, |(_, status)| *status);

                let response = format!(
                    "HTTP/1.1 {} Status\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    status
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}
