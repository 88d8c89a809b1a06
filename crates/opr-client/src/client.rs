//! Main Oprand API client implementation.

use crate::api::{AsnApi, DomainsApi, ResultsApi};
use crate::credentials::CredentialSource;
use crate::signing::{ApiRequest, RequestSigner};
use opr_core::{Clock, OprError, Result, SystemClock};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Base URL of the authenticated API
const DEFAULT_API_BASE_URL: &str = "https://api.oprand.com";

/// Base URL of the public ASN lookup
const DEFAULT_ASN_BASE_URL: &str = "https://oprand.com/asn";

/// User-Agent the API expects from the CLI
pub const DEFAULT_USER_AGENT: &str = "Oprand CLI Tool";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Main Oprand API client
#[derive(Clone)]
pub struct OprClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    api_base_url: String,
    asn_base_url: String,
    credentials: Option<Arc<dyn CredentialSource>>,
    signer: RequestSigner,
}

impl OprClient {
    /// Create a client for the public endpoints only
    pub fn public() -> Result<Self> {
        OprClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> OprClientBuilder {
        OprClientBuilder::new()
    }

    /// Access the public ASN lookup
    #[must_use]
    pub const fn asn(&self) -> AsnApi<'_> {
        AsnApi::new(self)
    }

    /// Access scan results of verified domains (signed)
    #[must_use]
    pub const fn results(&self) -> ResultsApi<'_> {
        ResultsApi::new(self)
    }

    /// Access the verified domain list (signed)
    #[must_use]
    pub const fn domains(&self) -> DomainsApi<'_> {
        DomainsApi::new(self)
    }

    /// Send an unsigned request to the public ASN host
    pub(crate) async fn fetch_public(&self, request: ApiRequest) -> Result<Vec<u8>> {
        self.send(&self.inner.asn_base_url, &request).await
    }

    /// Load credentials, sign and send a request to the API host.
    ///
    /// Credentials are read once per call; nothing goes on the wire if that fails.
    pub(crate) async fn fetch_signed(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let source = self.inner.credentials.as_ref().ok_or_else(|| {
            OprError::CredentialUnavailable("no credentials configured, run `opr config setup`".into())
        })?;
        let credential = source.load()?;
        let signed = self.inner.signer.sign(request, &credential);
        self.send(&self.inner.api_base_url, signed.request()).await
    }

    /// Decode a JSON payload
    pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
        serde_json::from_slice(body).map_err(OprError::Json)
    }

    async fn send(&self, base_url: &str, request: &ApiRequest) -> Result<Vec<u8>> {
        let url = build_url(base_url, request);
        debug!(method = %request.method, url = %url, "request");

        let mut builder = self.inner.http.request(request.method.clone(), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| OprError::Transport(e.to_string()))?;

        Self::handle_response(response).await
    }

    /// Return the body of a 2xx response, map anything else to an error
    async fn handle_response(response: reqwest::Response) -> Result<Vec<u8>> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| OprError::Transport(e.to_string()))?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        let text = String::from_utf8_lossy(&body).into_owned();
        let message = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("meta").and_then(|m| m.get("error")))
                    .and_then(serde_json::Value::as_str)
                    .map(String::from)
            })
            .unwrap_or(text);

        warn!(status = status.as_u16(), message = %message, "API returned an error");
        Err(OprError::Api {
            code: Some(status.as_u16()),
            message,
        })
    }
}

fn build_url(base_url: &str, request: &ApiRequest) -> String {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), request.path);
    if !request.query.is_empty() {
        url.push('?');
        url.push_str(&request.query_string());
    }
    url
}

/// Builder for configuring an [`OprClient`]
pub struct OprClientBuilder {
    api_base_url: String,
    asn_base_url: String,
    timeout: Duration,
    user_agent: String,
    credentials: Option<Arc<dyn CredentialSource>>,
    clock: Arc<dyn Clock>,
}

impl OprClientBuilder {
    /// Create a builder with production defaults and no credentials
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            asn_base_url: DEFAULT_ASN_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the authenticated API base URL (useful for testing)
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the public ASN lookup base URL
    #[must_use]
    pub fn asn_base_url(mut self, url: impl Into<String>) -> Self {
        self.asn_base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set where signed requests get their credentials
    #[must_use]
    pub fn credentials(mut self, source: impl CredentialSource + 'static) -> Self {
        self.credentials = Some(Arc::new(source));
        self
    }

    /// Set the clock used for nonces
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<OprClient> {
        for base in [&self.api_base_url, &self.asn_base_url] {
            Url::parse(base).map_err(|e| OprError::Config(format!("invalid base URL {base}: {e}")))?;
        }

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| OprError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(OprClient {
            inner: Arc::new(ClientInner {
                http,
                api_base_url: self.api_base_url,
                asn_base_url: self.asn_base_url,
                credentials: self.credentials,
                signer: RequestSigner::new(self.user_agent, self.clock),
            }),
        })
    }
}

impl Default for OprClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_keeps_canonical_query() {
        let req = ApiRequest::get("/v1/domains")
            .param("format", "csv")
            .param("nonce", "1");
        assert_eq!(
            build_url("https://api.oprand.com/", &req),
            "https://api.oprand.com/v1/domains?format=csv&nonce=1"
        );
        assert_eq!(
            build_url("https://oprand.com/asn", &ApiRequest::get("/AS3")),
            "https://oprand.com/asn/AS3"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = OprClient::builder().api_base_url("not a url").build().err();
        assert!(matches!(err, Some(OprError::Config(_))));
    }
}
