//! Scan results of verified domains.

use crate::signing::ApiRequest;
use crate::OprClient;
use opr_core::{OprError, PayloadFormat, Result, ResultsResponse};

/// Scan results endpoint (signed)
pub struct ResultsApi<'a> {
    client: &'a OprClient,
}

impl<'a> ResultsApi<'a> {
    pub(crate) const fn new(client: &'a OprClient) -> Self {
        Self { client }
    }

    /// Results for the fuzzed variants of `domain`
    #[must_use]
    pub fn domain(&self, domain: impl Into<String>) -> ResultsRequestBuilder<'a> {
        ResultsRequestBuilder::new(self.client, domain.into())
    }
}

/// Builder for result queries
pub struct ResultsRequestBuilder<'a> {
    client: &'a OprClient,
    domain: String,
    query: Vec<String>,
    format: PayloadFormat,
}

impl<'a> ResultsRequestBuilder<'a> {
    fn new(client: &'a OprClient, domain: String) -> Self {
        Self {
            client,
            domain,
            query: Vec::new(),
            format: PayloadFormat::Json,
        }
    }

    /// Filter keywords, e.g. `web`, `whois`, `-mx`
    #[must_use]
    pub fn query<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// Payload format for [`Self::raw`]
    #[must_use]
    pub const fn format(mut self, format: PayloadFormat) -> Self {
        self.format = format;
        self
    }

    fn request(&self, format: PayloadFormat) -> Result<ApiRequest> {
        if self.domain.trim().is_empty() {
            return Err(OprError::InvalidInput("missing domain".into()));
        }
        Ok(ApiRequest::get("/v1/results")
            .param("domain", self.domain.trim())
            .param("format", format.as_str())
            .param("query", self.query.join(",")))
    }

    /// Fetch the payload as the server sent it, in the chosen format
    pub async fn raw(self) -> Result<Vec<u8>> {
        let request = self.request(self.format)?;
        self.client.fetch_signed(request).await
    }

    /// Fetch and decode the JSON envelope, surfacing `meta.error`
    pub async fn send(self) -> Result<ResultsResponse> {
        let request = self.request(PayloadFormat::Json)?;
        let body = self.client.fetch_signed(request).await?;
        OprClient::decode::<ResultsResponse>(&body)?.into_result()
    }
}
