//! In-memory [`Transport`] for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Method;

use crate::error::PlatformError;
use crate::http::{HttpRequest, Transport};

type Handler = Box<dyn Fn(&HttpRequest) -> Result<String, PlatformError> + Send + Sync>;

/// Transport that answers every request with a scripted handler and records
/// what was sent.
pub struct ScriptedTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<String, PlatformError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A transport on which every request fails.
    pub fn empty() -> Self {
        Self::new(|request| {
            Err(PlatformError::transport(format!(
                "no route for {} {}",
                request.method, request.url
            )))
        })
    }

    /// All requests seen so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Requests with the given method whose url contains `needle`.
    pub fn matching(&self, method: &Method, needle: &str) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| &r.method == method && r.url.contains(needle))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.requests.lock().clear();
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<String, PlatformError> {
        let response = (self.handler)(&request);
        self.requests.lock().push(request);
        response
    }
}
