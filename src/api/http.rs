use reqwest::{Client, Method, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default CLI version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the User-Agent string sent to both APIs
pub(super) fn build_user_agent() -> String {
    format!("codeday/{}", DEFAULT_VERSION)
}

/// Bearer-authenticated HTTP client shared by the API clients.
///
/// Requests are sent once. A failed call is reported to the caller, which
/// decides whether the run can continue.
pub(super) struct HttpClient {
    client: Client,
    user_agent: String,
    token: String,
}

impl HttpClient {
    pub fn new(token: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            user_agent: build_user_agent(),
            token: token.into(),
        })
    }

    pub fn build_url(base_url: &str, endpoint: &str) -> Result<Url, url::ParseError> {
        Url::parse(base_url)?.join(endpoint)
    }

    /// Start a request with the common headers applied.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("=== API Request ===");
        debug!("{} {}", method, url);

        self.client
            .request(method, url)
            .header("User-Agent", &self.user_agent)
            .header("Authorization", format!("Bearer {}", self.token))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("user_agent", &self.user_agent)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Read a response body as text, for error reporting.
pub(super) async fn error_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}
