use std::sync::Arc;

use reqwest::Method;
use tracing::trace;
use url::Url;

use crate::error::PlatformError;
use crate::http::{FORM_CONTENT_TYPE, HttpRequest, JSON_CONTENT_TYPE, Transport};

/// Per-platform request builder on top of a shared [`Transport`].
#[derive(Clone)]
pub struct ApiClient {
    // name of the platform, e.g., "Twitch", "Hitbox"
    pub platform_name: &'static str,
    // base url of the platform api, without a trailing slash
    pub base_url: String,
    transport: Arc<dyn Transport>,
    // platform-specific headers sent with every request
    platform_headers: Vec<(String, String)>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("platform_name", &self.platform_name)
            .field("base_url", &self.base_url)
            .field("platform_headers", &self.platform_headers)
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        platform_name: &'static str,
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            platform_name,
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            platform_headers: Vec::new(),
        }
    }

    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.platform_headers.push((key.into(), value.into()));
    }

    /// Build an absolute endpoint url from a path and query parameters.
    pub fn endpoint<'a, I>(&self, path: &str, params: I) -> Result<Url, PlatformError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut url = self.url(path)?;
        let mut params = params.into_iter().peekable();
        if params.peek().is_some() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Absolute endpoint url without a query string.
    pub fn url(&self, path: &str) -> Result<Url, PlatformError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Ok(Url::parse(&raw)?)
    }

    pub fn request(&self, method: Method, url: &str) -> HttpRequest {
        self.platform_headers.iter().fold(
            HttpRequest::new(method, url),
            |request, (key, value)| request.header(key.clone(), value.clone()),
        )
    }

    pub async fn get(&self, url: &str) -> Result<String, PlatformError> {
        self.send(self.request(Method::GET, url)).await
    }

    pub async fn put_form(&self, url: &str, form: &str) -> Result<String, PlatformError> {
        self.send(self.request(Method::PUT, url).body(FORM_CONTENT_TYPE, form))
            .await
    }

    pub async fn put_json(&self, url: &str, json: &str) -> Result<String, PlatformError> {
        self.send(self.request(Method::PUT, url).body(JSON_CONTENT_TYPE, json))
            .await
    }

    pub async fn post_form(&self, url: &str, form: &str) -> Result<String, PlatformError> {
        self.send(self.request(Method::POST, url).body(FORM_CONTENT_TYPE, form))
            .await
    }

    async fn send(&self, request: HttpRequest) -> Result<String, PlatformError> {
        trace!(platform = self.platform_name, method = %request.method, url = %request.url, "API request");
        self.transport.execute(request).await
    }
}

/// Form-encode key/value pairs the way the platform update endpoints expect.
pub fn encode_form<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedTransport;

    #[test]
    fn endpoint_joins_and_encodes() {
        let client = ApiClient::new(
            "Test",
            "https://api.example.com/kraken/",
            Arc::new(ScriptedTransport::empty()),
        );
        let url = client
            .endpoint("/search/games", [("q", "Foo & Bar"), ("type", "suggest")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/kraken/search/games?q=Foo+%26+Bar&type=suggest"
        );
    }

    #[tokio::test]
    async fn platform_headers_are_attached() {
        let transport = Arc::new(ScriptedTransport::new(|_| Ok(String::new())));
        let mut client = ApiClient::new("Test", "http://localhost", transport.clone());
        client.add_header("Accept", "application/vnd.test+json");

        client.put_form("http://localhost/x", "a=1").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].header_value("accept"),
            Some("application/vnd.test+json")
        );
        assert_eq!(requests[0].header_value("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(requests[0].method, Method::PUT);
    }

    #[test]
    fn encode_form_escapes_brackets_and_spaces() {
        let form = encode_form([("channel[status]", "a b"), ("channel[game]", "")]);
        assert_eq!(form, "channel%5Bstatus%5D=a+b&channel%5Bgame%5D=");
    }
}
