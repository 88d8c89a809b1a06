//! Command implementations.

pub mod asn;
pub mod config;
pub mod domains;
pub mod results;

use std::path::PathBuf;

use crate::output::OutputFormat;
use opr::{FileCredentials, OprClient, OprClientBuilder};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Where API credentials are read from and written to
    pub credentials_path: PathBuf,

    /// Override for the private API base URL
    pub api_url: Option<String>,

    /// Override for the ASN lookup base URL
    pub asn_url: Option<String>,
}

impl Context {
    fn builder(&self) -> OprClientBuilder {
        let mut builder = OprClient::builder();
        if let Some(url) = &self.api_url {
            builder = builder.api_base_url(url.clone());
        }
        if let Some(url) = &self.asn_url {
            builder = builder.asn_base_url(url.clone());
        }
        builder
    }

    /// Client for the private endpoints; credentials are read on each request.
    pub fn client(&self) -> anyhow::Result<OprClient> {
        Ok(self
            .builder()
            .credentials(FileCredentials::new(self.credentials_path.clone()))
            .build()?)
    }

    /// Anonymous client for the public endpoints.
    pub fn public_client(&self) -> anyhow::Result<OprClient> {
        Ok(self.builder().build()?)
    }
}
