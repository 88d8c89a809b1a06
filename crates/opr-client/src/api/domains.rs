//! Verified domains of the account.

use crate::signing::ApiRequest;
use crate::OprClient;
use opr_core::{DomainsResponse, PayloadFormat, Result};

/// Verified domains endpoint (signed)
pub struct DomainsApi<'a> {
    client: &'a OprClient,
}

impl<'a> DomainsApi<'a> {
    pub(crate) const fn new(client: &'a OprClient) -> Self {
        Self { client }
    }

    fn request(format: PayloadFormat) -> ApiRequest {
        ApiRequest::get("/v1/domains").param("format", format.as_str())
    }

    /// List verified domains
    pub async fn list(&self) -> Result<DomainsResponse> {
        let body = self
            .client
            .fetch_signed(Self::request(PayloadFormat::Json))
            .await?;
        OprClient::decode::<DomainsResponse>(&body)?.into_result()
    }

    /// Fetch the listing as the server sent it
    pub async fn raw(&self, format: PayloadFormat) -> Result<Vec<u8>> {
        self.client.fetch_signed(Self::request(format)).await
    }
}
