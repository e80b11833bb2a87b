use std::time::Duration;

use crate::error::SourceError;

/// Browser-like identity; RemoteOK rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(user_agent)
        .build()
        .map_err(SourceError::from)
}

/// GET `url` and return the body, treating any non-2xx status as an error.
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, SourceError> {
    let resp = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SourceError::Http {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    Ok(resp.text().await?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer a single request with `status` and `body`, returning the url.
    pub(crate) async fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}/api", addr)
    }

    /// Client for the loopback server; ignores any proxy set in the environment.
    pub(crate) fn test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .user_agent(DEFAULT_USER_AGENT)
            .no_proxy()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_text_returns_body_on_success() {
        let url = serve_once("200 OK", r#"{"jobs": []}"#).await;
        let body = get_text(&test_client(), &url).await.unwrap();
        assert_eq!(body, r#"{"jobs": []}"#);
    }

    #[tokio::test]
    async fn test_get_text_non_success_status_is_http_error() {
        let url = serve_once("503 Service Unavailable", "down for maintenance").await;
        match get_text(&test_client(), &url).await {
            Err(SourceError::Http { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "down for maintenance");
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_text_truncates_long_error_body() {
        let body = "x".repeat(500);
        let url = serve_once("500 Internal Server Error", &body).await;
        match get_text(&test_client(), &url).await {
            Err(SourceError::Http { status: 500, message }) => assert_eq!(message.len(), 200),
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_text_refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = get_text(&test_client(), &format!("http://{}/api", addr)).await;
        assert!(matches!(result, Err(SourceError::Network(_))));
    }

    #[test]
    fn test_build_client_rejects_invalid_user_agent() {
        assert!(build_client(Duration::from_secs(5), "bad\nagent").is_err());
    }
}
