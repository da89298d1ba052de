//! HTTP transport used by every platform client.
//!
//! A [`Transport`] executes one [`HttpRequest`] and yields the response body
//! as text. Failures are returned as values and never panic, so callers can
//! treat them as "no data" and move on.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method};
use tracing::{debug, warn};

use crate::error::PlatformError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A fully described outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, content_type: &str, body: impl Into<String>) -> Self {
        self.headers
            .push((reqwest::header::CONTENT_TYPE.to_string(), content_type.to_string()));
        self.body = Some(body.into());
        self
    }

    /// Look up a header value, ignoring ASCII case of the name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode a form-encoded body into key/value pairs.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.body
            .as_deref()
            .map(|body| {
                url::form_urlencoded::parse(body.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a single form field from the body.
    pub fn form_field(&self, key: &str) -> Option<String> {
        self.form_fields()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<String, PlatformError>;
}

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Client builder preconfigured with the transport defaults.
pub fn create_client_builder(timeout: Duration) -> ClientBuilder {
    install_rustls_provider();

    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if timeout > Duration::ZERO {
        builder = builder.connect_timeout(timeout).timeout(timeout);
    }
    builder
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = create_client_builder(timeout).build().unwrap_or_else(|error| {
            warn!(error = %error, "Failed to create HTTP client; falling back to reqwest defaults");
            Client::new()
        });
        Self::new(client)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<String, PlatformError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(reqwest::header::CONNECTION, "close");
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.inspect_err(|e| {
            if e.is_timeout() {
                warn!(%method, %url, "Timeout while requesting URL");
            } else {
                warn!(%method, %url, error = %e, "Couldn't request URL");
            }
        })?;

        let status = response.status();
        // Updates report their outcome in the body, so only reads insist on success.
        if method == Method::GET && !status.is_success() {
            warn!(%method, %url, status = status.as_u16(), "Unexpected response status");
            return Err(PlatformError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let text = response.text().await?;
        debug!(%method, %url, status = status.as_u16(), bytes = text.len(), "Request finished");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Read one request, headers and body, off the socket.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&raw);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    /// Serve every connection with the same canned response.
    async fn serve(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}/x")
    }

    #[tokio::test]
    async fn get_rejects_error_status() {
        let url = serve("500 Internal Server Error", "err-body").await;
        let transport = ReqwestTransport::default();

        let result = transport.execute(HttpRequest::new(Method::GET, url.as_str())).await;
        assert!(matches!(
            result,
            Err(PlatformError::Status { status: 500, url: ref failed }) if *failed == url
        ));
    }

    #[tokio::test]
    async fn updates_return_body_of_any_status() {
        let url = serve("500 Internal Server Error", "err-body").await;
        let transport = ReqwestTransport::default();

        let put = HttpRequest::new(Method::PUT, url.as_str()).body(FORM_CONTENT_TYPE, "a=1");
        assert_eq!(transport.execute(put).await.unwrap(), "err-body");

        let post = HttpRequest::new(Method::POST, url.as_str()).body(JSON_CONTENT_TYPE, "{}");
        assert_eq!(transport.execute(post).await.unwrap(), "err-body");
    }

    #[tokio::test]
    async fn get_returns_body_on_success() {
        let url = serve("200 OK", "Bob\nGame: Doom").await;
        let transport = ReqwestTransport::default();

        let body = transport
            .execute(HttpRequest::new(Method::GET, url.as_str()))
            .await
            .unwrap();
        assert_eq!(body, "Bob\nGame: Doom");
    }

    #[tokio::test]
    async fn stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/x", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let transport = ReqwestTransport::with_timeout(Duration::from_millis(200));
        let result = transport.execute(HttpRequest::new(Method::GET, url.as_str())).await;
        assert!(matches!(result, Err(PlatformError::Http(ref e)) if e.is_timeout()));
        server.abort();
    }

    #[test]
    fn form_fields_decode_percent_and_plus() {
        let request = HttpRequest::new(Method::PUT, "http://localhost/").body(
            FORM_CONTENT_TYPE,
            "channel%5Bstatus%5D=%5BBob%5D+Doom+%7C+hi&channel%5Bgame%5D=Doom",
        );

        assert_eq!(
            request.form_field("channel[status]").as_deref(),
            Some("[Bob] Doom | hi")
        );
        assert_eq!(request.form_field("channel[game]").as_deref(), Some("Doom"));
        assert_eq!(request.header_value("content-type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn missing_body_has_no_fields() {
        let request = HttpRequest::new(Method::GET, "http://localhost/");
        assert!(request.form_fields().is_empty());
        assert_eq!(request.form_field("anything"), None);
    }
}
