//! Signed HTTP client for the Oprand API.
//!
//! This crate provides the main [`OprClient`], the [`signing`] scheme used by
//! the private endpoints, and the [`CredentialSource`] seam through which API
//! keys reach it.

#![doc(html_root_url = "https://docs.rs/opr-client/0.3.0")]

pub mod api;
mod client;
mod credentials;
pub mod signing;

pub use client::{OprClient, OprClientBuilder, DEFAULT_USER_AGENT};
pub use credentials::{
    Credential, CredentialSource, CredentialsFile, FileCredentials, StaticCredentials,
};
pub use opr_core::{OprError, Result};
pub use signing::{ApiRequest, RequestSigner, SignedRequest};
