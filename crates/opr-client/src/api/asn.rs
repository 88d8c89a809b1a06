//! Public ASN lookup.

use crate::signing::ApiRequest;
use crate::OprClient;
use opr_core::{AsnResponse, OprError, Result};

/// ASN lookup endpoint. No credentials needed.
pub struct AsnApi<'a> {
    client: &'a OprClient,
}

impl<'a> AsnApi<'a> {
    pub(crate) const fn new(client: &'a OprClient) -> Self {
        Self { client }
    }

    /// Look up Autonomous System records.
    ///
    /// Each input may be an AS number (`AS3`), an IPv4 address, a domain,
    /// a registrant email domain (`@mit.edu`) or `me`. The response holds one
    /// item per input; failed inputs carry an `error` and no `output`.
    pub async fn lookup<S: AsRef<str>>(&self, inputs: &[S]) -> Result<AsnResponse> {
        let body = self.lookup_raw(inputs).await?;
        OprClient::decode(&body)
    }

    /// Same as [`Self::lookup`] but returns the payload untouched
    pub async fn lookup_raw<S: AsRef<str>>(&self, inputs: &[S]) -> Result<Vec<u8>> {
        let joined = inputs
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if joined.is_empty() {
            return Err(OprError::InvalidInput("no input found".into()));
        }

        let request = ApiRequest::get(format!("/{joined}")).header("Accept", "application/json");
        self.client.fetch_public(request).await
    }
}
